//! Runs the inspection commands and renders their reports.

use geostore_core::catalog::Catalog;
use geostore_core::inspect::{InspectOptions, details, get_store, list_stores};
use geostore_core::resources::StoreConnector;
use serde::Serialize;
use tracing::{debug, info};

use crate::args::{Command, OutputFormat};
use crate::config::Config;
use crate::{GeostoreError, GeostoreResult};

/// Runs one command against the configured catalog and returns the rendered report.
pub fn run(
    command: &Command,
    config: &Config,
    catalog: &dyn Catalog,
    connector: &dyn StoreConnector,
    output: OutputFormat,
) -> GeostoreResult<String> {
    let data_dir = config.data_dir();
    match command {
        Command::List { workspace } => {
            if !config.workspaces.contains_key(workspace) {
                return Err(GeostoreError::WorkspaceNotFound(workspace.clone()));
            }
            let stores = list_stores(workspace, catalog, data_dir)?;
            info!("Workspace {workspace} has {} stores", stores.len());
            render(&stores, output)
        }
        Command::Show {
            workspace,
            store,
            no_resources,
        } => {
            let store = get_store(workspace, store, catalog)?;
            let options = InspectOptions {
                list_resources: !no_resources,
            };
            debug!("Inspecting store {} with {options:?}", store.store_ref());
            let report = details(&store, catalog, connector, data_dir, options)?;
            render(&report, output)
        }
    }
}

fn render(report: &impl Serialize, output: OutputFormat) -> GeostoreResult<String> {
    Ok(match output {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
    })
}
