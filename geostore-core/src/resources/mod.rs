//! Listing of the native datasets exposed by a store.
//!
//! This is the only part of the crate doing I/O, always through a [`StoreConnector`].
//! A failed listing is reported as a single error, never as partial results.

mod handles;
pub use handles::{
    Capabilities, CoverageReader, DatasetNamespace, QualifiedName, ServiceLayer, StoreConnector,
    WebMapServer,
};
use tracing::{debug, trace};

use crate::error::{BoxedError, StoreError, StoreResult};
use crate::store::{StoreDescriptor, StoreKind};

/// Lists the native dataset names of a store.
///
/// - vector stores: the local part of every dataset name
/// - raster stores: every coverage name
/// - WMS stores: the name of every advertised layer, skipping unnamed container layers
///
/// Any other kind fails with [`StoreError::UnsupportedStoreKind`].
pub fn list_native_resources(
    store: &StoreDescriptor,
    connector: &dyn StoreConnector,
) -> StoreResult<Vec<String>> {
    let result = match store.kind {
        StoreKind::DataStore => list_datasets(store, connector),
        StoreKind::CoverageStore => list_coverages(store, connector),
        StoreKind::WmsStore => list_service_layers(store, connector),
        StoreKind::Other => {
            return Err(StoreError::UnsupportedStoreKind {
                store: store.store_ref(),
                kind: store.kind,
            });
        }
    };
    let names = result.map_err(|source| StoreError::Enumeration {
        store: store.store_ref(),
        source,
    })?;
    debug!("Store {} exposes {} resources", store.store_ref(), names.len());
    Ok(names)
}

fn list_datasets(
    store: &StoreDescriptor,
    connector: &dyn StoreConnector,
) -> Result<Vec<String>, BoxedError> {
    let mut handle = connector.open_data_store(store)?;
    Ok(handle
        .names()?
        .into_iter()
        .map(|name| name.local_part)
        .collect())
}

fn list_coverages(
    store: &StoreDescriptor,
    connector: &dyn StoreConnector,
) -> Result<Vec<String>, BoxedError> {
    let mut reader = connector.open_coverage_reader(store)?;
    reader.coverage_names()
}

fn list_service_layers(
    store: &StoreDescriptor,
    connector: &dyn StoreConnector,
) -> Result<Vec<String>, BoxedError> {
    let mut server = connector.open_web_map_server(store)?;
    let capabilities = server.capabilities()?;
    Ok(capabilities
        .layers
        .into_iter()
        .filter_map(|layer| {
            if layer.name.is_none() {
                trace!(
                    "Skipping unnamed layer {:?} of store {}",
                    layer.title,
                    store.store_ref()
                );
            }
            layer.name
        })
        .collect())
}
