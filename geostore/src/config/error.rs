use std::path::PathBuf;

pub type ConfigFileResult<T> = Result<T, ConfigFileError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigFileError {
    #[error("Unable to load config file {1}: {0}")]
    ConfigLoadError(#[source] std::io::Error, PathBuf),

    #[error("Unable to parse config file {1}: {0}")]
    ConfigParseError(#[source] subst::yaml::Error, PathBuf),

    #[error("Unable to write config file {1}: {0}")]
    ConfigWriteError(#[source] std::io::Error, PathBuf),

    #[error("Unable to serialize the configuration: {0}")]
    ConfigSerializeError(#[source] serde_yaml::Error),

    #[error("Unable to resolve the data directory {1}: {0}")]
    DataDirError(#[source] std::io::Error, PathBuf),

    #[error("No workspaces are configured in {0}")]
    NoWorkspaces(PathBuf),

    #[error("Layer {workspace}:{layer} is published from store {store}, which is not configured in workspace {workspace}")]
    UnknownLayerStore {
        workspace: String,
        layer: String,
        store: String,
    },
}
