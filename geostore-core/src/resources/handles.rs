use std::fmt::Debug;

use crate::error::BoxedError;
use crate::store::StoreDescriptor;

/// A qualified dataset name as exposed by a vector driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Namespace URI or schema, if the driver has one.
    pub namespace: Option<String>,
    /// Unqualified dataset name.
    pub local_part: String,
}

impl QualifiedName {
    /// A name without namespace.
    #[must_use]
    pub fn local(local_part: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_part: local_part.into(),
        }
    }

    /// A name within a namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_part: local_part.into(),
        }
    }
}

/// A layer advertised in a capabilities document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceLayer {
    /// Layer name. Container layers may have none.
    pub name: Option<String>,
    /// Human-readable title.
    pub title: Option<String>,
}

/// The parts of a capabilities document needed for listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Every advertised layer, in document order.
    pub layers: Vec<ServiceLayer>,
}

/// An open vector dataset namespace. Released when dropped.
pub trait DatasetNamespace: Debug {
    /// Names of every dataset in the namespace.
    fn names(&mut self) -> Result<Vec<QualifiedName>, BoxedError>;
}

/// An open grid coverage reader. Released when dropped.
pub trait CoverageReader: Debug {
    /// Names of every coverage the reader exposes.
    fn coverage_names(&mut self) -> Result<Vec<String>, BoxedError>;
}

/// A client of a remote map service. Released when dropped.
pub trait WebMapServer: Debug {
    /// Fetches the capabilities document of the service.
    fn capabilities(&mut self) -> Result<Capabilities, BoxedError>;
}

/// Opens the underlying handles of stores.
///
/// Every call opens a fresh handle, nothing is pooled or cached.
pub trait StoreConnector {
    /// Opens the dataset namespace of a vector store.
    fn open_data_store(&self, store: &StoreDescriptor) -> Result<Box<dyn DatasetNamespace>, BoxedError>;

    /// Opens the coverage reader of a raster store.
    fn open_coverage_reader(
        &self,
        store: &StoreDescriptor,
    ) -> Result<Box<dyn CoverageReader>, BoxedError>;

    /// Connects to the service behind a WMS store.
    fn open_web_map_server(
        &self,
        store: &StoreDescriptor,
    ) -> Result<Box<dyn WebMapServer>, BoxedError>;
}
