use std::env;

use clap::Parser;
use geostore::GeostoreResult;
use geostore::args::Args;
use geostore::commands::run;
use geostore::config::{OsEnv, read_config};
use geostore::connectors::LocalConnector;
use geostore::logging::{ensure_core_log_level_matches, init_tracing};
use log::log_enabled;
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn start(args: &Args) -> GeostoreResult<()> {
    info!("Starting geostore v{VERSION}");

    let env = OsEnv::default();
    info!("Using {}", args.config.display());
    let mut config = read_config(&args.config, &env)?;
    config.finalize(&args.config, &env)?;

    if let Some(file_name) = &args.save_config {
        config.save_to_file(file_name)?;
    }

    let catalog = config.to_catalog();
    let connector = LocalConnector::new(config.data_dir());
    let report = run(&args.command, &config, &catalog, &connector, args.output)?;
    println!("{report}");
    Ok(())
}

fn main() {
    let filter = ensure_core_log_level_matches(env::var("RUST_LOG").ok(), "geostore=");
    init_tracing(&filter, env::var("GEOSTORE_FORMAT").ok());

    let args = Args::parse();
    if let Err(e) = start(&args) {
        // Ensure the message is printed, even if the logging is disabled
        if log_enabled!(log::Level::Error) {
            error!("{e}");
        } else {
            eprintln!("{e}");
        }
        std::process::exit(1);
    }
}
