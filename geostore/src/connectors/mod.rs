//! Store connectors for local files, PostGIS databases and remote WMS services.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use geostore_core::BoxedError;
use geostore_core::params::ParamValue;
use geostore_core::resources::{CoverageReader, DatasetNamespace, StoreConnector, WebMapServer};
use geostore_core::source::file_url_path;
use geostore_core::store::StoreDescriptor;

mod error;
pub use error::{ConnectorError, ConnectorResult};

mod vector;
pub use vector::{DirectoryNamespace, FileNamespace, VECTOR_EXTENSIONS};

#[cfg(feature = "postgres")]
mod postgis;
#[cfg(feature = "postgres")]
pub use postgis::{DEFAULT_SCHEMA, PostgisNamespace};

#[cfg(feature = "raster")]
mod raster;
#[cfg(feature = "raster")]
pub use raster::{GeoTiffReader, MosaicReader, TIFF_EXTENSIONS};

#[cfg(feature = "wms")]
mod wms;
#[cfg(feature = "wms")]
pub use wms::{HttpWebMapServer, parse_capabilities};

/// Opens stores whose relative locations live under a data directory.
#[derive(Debug, Clone)]
pub struct LocalConnector {
    data_dir: PathBuf,
}

impl LocalConnector {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Local path of a location parameter, `None` for remote URLs.
    fn local_path(&self, value: &ParamValue) -> Option<PathBuf> {
        match value {
            ParamValue::Path(path) => Some(self.data_dir.join(path)),
            ParamValue::Url(url) if url.scheme() == "file" => url.to_file_path().ok(),
            ParamValue::Url(_) => None,
            ParamValue::Str(text) | ParamValue::Other(text) => self.location_path(text),
        }
    }

    /// Accepts `file:` URLs, relative or absolute, and bare paths.
    fn location_path(&self, location: &str) -> Option<PathBuf> {
        file_url_path(location).map(|path| self.data_dir.join(path))
    }
}

impl StoreConnector for LocalConnector {
    fn open_data_store(&self, store: &StoreDescriptor) -> Result<Box<dyn DatasetNamespace>, BoxedError> {
        let params = &store.connection_parameters;
        if let Some(dbtype) = params.get_str("dbtype") {
            return match dbtype.as_str() {
                "postgis" => open_postgis(store),
                _ => Err(ConnectorError::UnsupportedDriver(dbtype).into()),
            };
        }

        if let Some(value) = params.get("directory") {
            let dir = self
                .local_path(value)
                .ok_or_else(|| ConnectorError::RemoteLocation(value.to_text()))?;
            return Ok(Box::new(DirectoryNamespace::open(dir)?));
        }
        if let Some(value) = params.get("file").or_else(|| params.get("url")) {
            let path = self
                .local_path(value)
                .ok_or_else(|| ConnectorError::RemoteLocation(value.to_text()))?;
            return Ok(Box::new(FileNamespace::open(path)?));
        }
        Err(ConnectorError::NoLocation(store.store_ref()).into())
    }

    fn open_coverage_reader(
        &self,
        store: &StoreDescriptor,
    ) -> Result<Box<dyn CoverageReader>, BoxedError> {
        let url = store
            .raster_url
            .as_deref()
            .ok_or_else(|| ConnectorError::NoLocation(store.store_ref()))?;
        let path = self
            .location_path(url)
            .ok_or_else(|| ConnectorError::RemoteLocation(url.to_string()))?;
        open_raster(path)
    }

    fn open_web_map_server(
        &self,
        store: &StoreDescriptor,
    ) -> Result<Box<dyn WebMapServer>, BoxedError> {
        let url = store
            .capabilities_url
            .clone()
            .ok_or_else(|| ConnectorError::NoLocation(store.store_ref()))?;
        open_wms(url)
    }
}

#[cfg(feature = "postgres")]
fn open_postgis(store: &StoreDescriptor) -> Result<Box<dyn DatasetNamespace>, BoxedError> {
    Ok(Box::new(PostgisNamespace::connect(&store.connection_parameters)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgis(_store: &StoreDescriptor) -> Result<Box<dyn DatasetNamespace>, BoxedError> {
    Err(ConnectorError::FeatureDisabled {
        what: "PostGIS",
        feature: "postgres",
    }
    .into())
}

#[cfg(feature = "raster")]
fn open_raster(path: PathBuf) -> Result<Box<dyn CoverageReader>, BoxedError> {
    if path.is_dir() {
        Ok(Box::new(MosaicReader::open(path)?))
    } else {
        Ok(Box::new(GeoTiffReader::open(&path)?))
    }
}

#[cfg(not(feature = "raster"))]
fn open_raster(_path: PathBuf) -> Result<Box<dyn CoverageReader>, BoxedError> {
    Err(ConnectorError::FeatureDisabled {
        what: "GeoTIFF",
        feature: "raster",
    }
    .into())
}

#[cfg(feature = "wms")]
fn open_wms(url: String) -> Result<Box<dyn WebMapServer>, BoxedError> {
    Ok(Box::new(HttpWebMapServer::new(url)?))
}

#[cfg(not(feature = "wms"))]
fn open_wms(_url: String) -> Result<Box<dyn WebMapServer>, BoxedError> {
    Err(ConnectorError::FeatureDisabled {
        what: "WMS",
        feature: "wms",
    }
    .into())
}

/// Case-insensitive extension check.
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().to_string())
}
