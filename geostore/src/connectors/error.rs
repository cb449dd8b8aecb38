use std::io;
use std::path::PathBuf;

use geostore_core::store::StoreRef;

pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[derive(thiserror::Error, Debug)]
pub enum ConnectorError {
    #[error("Store {0} has no location to read from")]
    NoLocation(StoreRef),

    #[error("{0} is not a local path")]
    RemoteLocation(String),

    #[error("Unable to read {1}: {0}")]
    IoError(#[source] io::Error, PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("{0} is not a file")]
    NotAFile(PathBuf),

    #[error("No GeoTIFF file found in {0}")]
    NoCoverage(PathBuf),

    #[error("Unsupported vector store type {0}")]
    UnsupportedDriver(String),

    #[error("Invalid value {value} of connection parameter {key}")]
    InvalidParameter { key: &'static str, value: String },

    #[error("{what} stores are not supported by this build, enable the `{feature}` feature")]
    FeatureDisabled {
        what: &'static str,
        feature: &'static str,
    },

    #[cfg(feature = "raster")]
    #[error("Unable to decode GeoTIFF {1}: {0}")]
    TiffError(#[source] tiff::TiffError, PathBuf),

    #[cfg(feature = "postgres")]
    #[error("PostGIS query failed: {0}")]
    PostgresError(#[from] postgres::Error),

    #[cfg(feature = "wms")]
    #[error("Unable to fetch capabilities from {1}: {0}")]
    HttpError(#[source] reqwest::Error, String),

    #[cfg(feature = "wms")]
    #[error("Invalid capabilities document: {0}")]
    CapabilitiesError(#[from] quick_xml::Error),
}
