//! Presentation records of stores, as listed per workspace or shown one at a time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{
    Catalog, LayerRef, ResourceRecord, layers_attached_to_store, resources_with_layers,
};
use crate::classify::{ContentKind, MediumType, classify};
use crate::error::{StoreError, StoreResult};
use crate::resources::StoreConnector;
use crate::source::resolve_source;
use crate::store::{StoreDescriptor, StoreFault, StoreKind, StoreRef};

/// One line of a workspace store listing.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    /// Store name.
    pub name: String,
    /// Owning workspace.
    pub workspace: String,
    /// Whether the store is enabled.
    pub enabled: bool,
    /// Free-form description.
    pub description: Option<String>,
    /// Driver name.
    pub format: Option<String>,
    /// Normalized location of the data.
    pub source: String,
    /// Storage medium.
    #[serde(rename = "type")]
    pub medium_type: MediumType,
    /// Content category.
    #[serde(rename = "kind")]
    pub content_kind: ContentKind,
}

/// Everything known about a single store.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDetails {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: StoreSummary,
    /// Every connection parameter as text. Coverage stores also get `raster`.
    pub connection: BTreeMap<String, String>,
    /// Capabilities URL of a WMS store.
    pub wms: Option<String>,
    /// Fault from the last connection attempt.
    pub error: Option<StoreFault>,
    /// Layers published from the store.
    pub layers: Vec<LayerRef>,
    /// Native datasets of the store. Absent when they were not listed.
    pub resources: Option<Vec<ResourceRecord>>,
}

/// Controls how much work [`details`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectOptions {
    /// Open the store and list its native datasets. Ignored for disabled stores.
    pub list_resources: bool,
}

impl InspectOptions {
    /// Options that list native datasets of enabled stores.
    #[must_use]
    pub fn with_resources() -> Self {
        Self {
            list_resources: true,
        }
    }
}

/// Builds the listing record of a store.
#[must_use]
pub fn summarize(store: &StoreDescriptor, base_dir: &Path) -> StoreSummary {
    let classification = classify(store);
    StoreSummary {
        name: store.name.clone(),
        workspace: store.workspace.clone(),
        enabled: store.enabled,
        description: store.description.clone(),
        format: store.format.clone(),
        source: resolve_source(store, base_dir),
        medium_type: classification.medium_type,
        content_kind: classification.content_kind,
    }
}

/// Builds the detailed record of a store.
///
/// The connector is only used when `options.list_resources` is set and the store is enabled.
pub fn details(
    store: &StoreDescriptor,
    catalog: &dyn Catalog,
    connector: &dyn StoreConnector,
    base_dir: &Path,
    options: InspectOptions,
) -> StoreResult<StoreDetails> {
    let mut connection: BTreeMap<_, _> = store
        .connection_parameters
        .iter()
        .map(|(key, value)| (key.clone(), value.to_text()))
        .collect();
    if store.kind == StoreKind::CoverageStore
        && let Some(url) = &store.raster_url
    {
        connection.insert("raster".to_string(), url.clone());
    }
    let wms = match store.kind {
        StoreKind::WmsStore => store.capabilities_url.clone(),
        _ => None,
    };

    let layers = layers_attached_to_store(store, catalog)?;
    let resources = if !options.list_resources {
        None
    } else if store.enabled {
        Some(resources_with_layers(store, catalog, connector)?)
    } else {
        debug!("Not listing resources of disabled store {}", store.store_ref());
        None
    };

    Ok(StoreDetails {
        summary: summarize(store, base_dir),
        connection,
        wms,
        error: store.last_error.clone(),
        layers,
        resources,
    })
}

/// Listing records of every store of a workspace, in catalog order.
pub fn list_stores(
    workspace: &str,
    catalog: &dyn Catalog,
    base_dir: &Path,
) -> StoreResult<Vec<StoreSummary>> {
    Ok(catalog
        .stores_by_workspace(workspace)?
        .iter()
        .map(|store| summarize(store, base_dir))
        .collect())
}

/// Looks up a store of a workspace.
pub fn get_store(workspace: &str, name: &str, catalog: &dyn Catalog) -> StoreResult<StoreDescriptor> {
    catalog
        .store(workspace, name)?
        .ok_or_else(|| StoreError::StoreNotFound(StoreRef::new(workspace, name)))
}
