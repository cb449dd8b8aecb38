use std::io;

use geostore_core::StoreError;

use crate::config::ConfigFileError;

/// A convenience [`Result`] for the geostore crate.
pub type GeostoreResult<T> = Result<T, GeostoreError>;

#[derive(thiserror::Error, Debug)]
pub enum GeostoreError {
    #[error("Workspace {0} is not configured")]
    WorkspaceNotFound(String),

    #[error(transparent)]
    ConfigFileError(#[from] ConfigFileError),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error("Unable to serialize the report: {0}")]
    JsonOutputError(#[from] serde_json::Error),

    #[error("Unable to serialize the report: {0}")]
    YamlOutputError(#[from] serde_yaml::Error),

    #[error(transparent)]
    IoError(#[from] io::Error),
}
