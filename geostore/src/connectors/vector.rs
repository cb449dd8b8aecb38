use std::fs;
use std::path::PathBuf;

use geostore_core::BoxedError;
use geostore_core::resources::{DatasetNamespace, QualifiedName};
use tracing::trace;

use crate::connectors::{ConnectorError, ConnectorResult, file_stem, has_extension};

/// Files recognized as vector datasets inside a directory store.
pub const VECTOR_EXTENSIONS: &[&str] = &["shp", "geojson"];

/// A directory of shapefiles and GeoJSON files, one dataset per file.
#[derive(Debug)]
pub struct DirectoryNamespace {
    dir: PathBuf,
}

impl DirectoryNamespace {
    pub fn open(dir: PathBuf) -> ConnectorResult<Self> {
        let meta = fs::metadata(&dir).map_err(|e| ConnectorError::IoError(e, dir.clone()))?;
        if !meta.is_dir() {
            return Err(ConnectorError::NotADirectory(dir));
        }
        Ok(Self { dir })
    }
}

impl DatasetNamespace for DirectoryNamespace {
    fn names(&mut self) -> Result<Vec<QualifiedName>, BoxedError> {
        let io_err = |e| ConnectorError::IoError(e, self.dir.clone());
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || !has_extension(&path, VECTOR_EXTENSIONS) {
                trace!("Skipping {}", path.display());
                continue;
            }
            if let Some(stem) = file_stem(&path) {
                names.push(stem);
            }
        }
        // `roads.shp` and `roads.geojson` are the same dataset name
        names.sort();
        names.dedup();
        Ok(names.into_iter().map(QualifiedName::local).collect())
    }
}

/// A single dataset file, named after the file.
#[derive(Debug)]
pub struct FileNamespace {
    name: String,
}

impl FileNamespace {
    pub fn open(path: PathBuf) -> ConnectorResult<Self> {
        let meta = fs::metadata(&path).map_err(|e| ConnectorError::IoError(e, path.clone()))?;
        match file_stem(&path) {
            Some(name) if meta.is_file() => Ok(Self { name }),
            _ => Err(ConnectorError::NotAFile(path)),
        }
    }
}

impl DatasetNamespace for FileNamespace {
    fn names(&mut self) -> Result<Vec<QualifiedName>, BoxedError> {
        Ok(vec![QualifiedName::local(self.name.clone())])
    }
}
