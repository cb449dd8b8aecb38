use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geostore_core::BoxedError;
use geostore_core::resources::CoverageReader;
use tiff::decoder::Decoder;
use tracing::debug;

use crate::connectors::{ConnectorError, ConnectorResult, file_stem, has_extension};

pub const TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// A single GeoTIFF, exposing one coverage named after the file.
#[derive(Debug)]
pub struct GeoTiffReader {
    name: String,
}

impl GeoTiffReader {
    /// Opens the file and decodes its header.
    pub fn open(path: &Path) -> ConnectorResult<Self> {
        let tiff_err = |e| ConnectorError::TiffError(e, path.to_path_buf());
        let file = File::open(path).map_err(|e| ConnectorError::IoError(e, path.to_path_buf()))?;
        let mut decoder = Decoder::new(BufReader::new(file)).map_err(tiff_err)?;
        let (width, height) = decoder.dimensions().map_err(tiff_err)?;
        let name = file_stem(path).ok_or_else(|| ConnectorError::NotAFile(path.to_path_buf()))?;
        debug!("Opened {width}x{height} GeoTIFF {}", path.display());
        Ok(Self { name })
    }
}

impl CoverageReader for GeoTiffReader {
    fn coverage_names(&mut self) -> Result<Vec<String>, BoxedError> {
        Ok(vec![self.name.clone()])
    }
}

/// A directory of GeoTIFF granules, exposing one coverage named after the directory.
#[derive(Debug)]
pub struct MosaicReader {
    name: String,
}

impl MosaicReader {
    pub fn open(dir: PathBuf) -> ConnectorResult<Self> {
        let io_err = |e| ConnectorError::IoError(e, dir.clone());
        let mut granules = 0_usize;
        for entry in fs::read_dir(&dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && has_extension(&path, TIFF_EXTENSIONS) {
                granules += 1;
            }
        }
        if granules == 0 {
            return Err(ConnectorError::NoCoverage(dir));
        }
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| ConnectorError::NoCoverage(dir.clone()))?;
        debug!("Mosaic {} has {granules} granules", dir.display());
        Ok(Self { name })
    }
}

impl CoverageReader for MosaicReader {
    fn coverage_names(&mut self) -> Result<Vec<String>, BoxedError> {
        Ok(vec![self.name.clone()])
    }
}
