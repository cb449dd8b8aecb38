//! Read-only snapshot of a configured store.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::params::ParameterBag;

/// The kind of a store, deciding which classifier and enumerator branch applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Vector data (shapefiles, database tables, ...).
    DataStore,
    /// Raster data (GeoTIFF, mosaics, ...).
    CoverageStore,
    /// A remote Web Map Service.
    WmsStore,
    /// Any store type without a listing strategy.
    #[serde(other)]
    Other,
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DataStore => "data store",
            Self::CoverageStore => "coverage store",
            Self::WmsStore => "WMS store",
            Self::Other => "unknown store",
        })
    }
}

/// A fault captured during the last connection attempt of a store.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFault {
    /// Short error message.
    pub message: String,
    /// Full cause chain, if one was recorded.
    pub trace: Option<String>,
}

/// Identifies a store within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreRef {
    /// Workspace owning the store.
    pub workspace: String,
    /// Store name, unique within the workspace.
    pub name: String,
}

impl StoreRef {
    /// Creates a reference to `workspace:name`.
    #[must_use]
    pub fn new(workspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            name: name.into(),
        }
    }
}

impl Display for StoreRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.workspace, self.name)
    }
}

/// Immutable view of one configured data store.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDescriptor {
    /// Store name.
    pub name: String,
    /// Workspace name, also the namespace prefix of its published resources.
    pub workspace: String,
    /// Kind of the store.
    pub kind: StoreKind,
    /// Free-form description.
    pub description: Option<String>,
    /// Driver name, e.g. `Shapefile` or `PostGIS`.
    pub format: Option<String>,
    /// Disabled stores may be unreachable and are never enumerated.
    pub enabled: bool,
    /// Driver-specific connection parameters.
    pub connection_parameters: ParameterBag,
    /// Location of the raster data, coverage stores only.
    pub raster_url: Option<String>,
    /// Capabilities document URL, WMS stores only.
    pub capabilities_url: Option<String>,
    /// Fault from the last connection attempt.
    pub last_error: Option<StoreFault>,
}

impl StoreDescriptor {
    /// Creates an enabled store without parameters.
    #[must_use]
    pub fn new(workspace: impl Into<String>, name: impl Into<String>, kind: StoreKind) -> Self {
        Self {
            name: name.into(),
            workspace: workspace.into(),
            kind,
            description: None,
            format: None,
            enabled: true,
            connection_parameters: ParameterBag::new(),
            raster_url: None,
            capabilities_url: None,
            last_error: None,
        }
    }

    /// Reference to this store for catalog queries.
    #[must_use]
    pub fn store_ref(&self) -> StoreRef {
        StoreRef::new(&self.workspace, &self.name)
    }

    /// Sets the connection parameters.
    #[must_use]
    pub fn with_params(mut self, params: ParameterBag) -> Self {
        self.connection_parameters = params;
        self
    }

    /// Sets the raster URL of a coverage store.
    #[must_use]
    pub fn with_raster_url(mut self, url: impl Into<String>) -> Self {
        self.raster_url = Some(url.into());
        self
    }

    /// Sets the capabilities URL of a WMS store.
    #[must_use]
    pub fn with_capabilities_url(mut self, url: impl Into<String>) -> Self {
        self.capabilities_url = Some(url.into());
        self
    }

    /// Enables or disables the store.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
