use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand, ValueEnum};

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug, PartialEq)]
#[command(
    about,
    version,
    after_help = "Use RUST_LOG environment variable to control logging level, e.g. RUST_LOG=debug or RUST_LOG=geostore=debug. Use GEOSTORE_FORMAT to pick the log format (full, compact, bare, pretty or json).",
    styles = HELP_STYLES
)]
pub struct Args {
    /// Path to the catalog config file.
    #[arg(short, long)]
    pub config: PathBuf,
    /// Save the effective config to a file or use "-" to print to stdout.
    #[arg(long)]
    pub save_config: Option<PathBuf>,
    /// Report format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the stores of a workspace, with their medium, content kind and source.
    List {
        /// Workspace name.
        workspace: String,
    },
    /// Show a single store, its connection parameters, layers, and native resources.
    Show {
        /// Workspace name.
        workspace: String,
        /// Store name.
        store: String,
        /// Do not open the store to list its native resources.
        #[arg(long)]
        no_resources: bool,
    },
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
