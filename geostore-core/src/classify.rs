//! Storage medium and content classification of stores.
//!
//! Both classifiers are total: unusual parameter shapes degrade to
//! [`MediumType::Generic`] or [`ContentKind::Unknown`] instead of failing.

use serde::{Deserialize, Serialize};

use crate::params::ParamValue;
use crate::store::{StoreDescriptor, StoreKind};

/// Where the data of a store physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediumType {
    /// Local files or directories.
    File,
    /// A database server.
    Database,
    /// A remote web service.
    Web,
    /// Nothing recognizable.
    Generic,
}

/// What kind of data a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    /// Grid coverages.
    Raster,
    /// Features.
    Vector,
    /// A remote map service.
    Service,
    /// Anything else.
    Unknown,
}

/// Medium and content classification of one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Storage medium.
    #[serde(rename = "type")]
    pub medium_type: MediumType,
    /// Content category.
    #[serde(rename = "kind")]
    pub content_kind: ContentKind,
}

/// Classifies both the medium and the content of a store.
#[must_use]
pub fn classify(store: &StoreDescriptor) -> ClassificationResult {
    ClassificationResult {
        medium_type: classify_medium(store),
        content_kind: classify_kind(store.kind),
    }
}

/// Maps the kind of a store to its content category.
#[must_use]
pub fn classify_kind(kind: StoreKind) -> ContentKind {
    match kind {
        StoreKind::CoverageStore => ContentKind::Raster,
        StoreKind::DataStore => ContentKind::Vector,
        StoreKind::WmsStore => ContentKind::Service,
        StoreKind::Other => ContentKind::Unknown,
    }
}

/// Determines the storage medium of a store.
///
/// The first matching rule wins:
/// 1. the raster URL scheme of a coverage store (`file`, or `http`/`https`/`ftp`/`sftp`)
/// 2. a `dbtype` parameter
/// 3. WMS stores
/// 4. a `directory` or `file` parameter
/// 5. the first parameter value, in key order, that looks like a file, an `http` location,
///    or a JDBC connection string
#[must_use]
pub fn classify_medium(store: &StoreDescriptor) -> MediumType {
    if store.kind == StoreKind::CoverageStore
        && let Some(url) = &store.raster_url
    {
        match url_scheme(url).as_deref() {
            Some("file") => return MediumType::File,
            Some("http" | "https" | "ftp" | "sftp") => return MediumType::Web,
            _ => {}
        }
    }

    let params = &store.connection_parameters;
    if params.contains_key("dbtype") {
        return MediumType::Database;
    }
    if store.kind == StoreKind::WmsStore {
        return MediumType::Web;
    }
    if params.contains_key("directory") || params.contains_key("file") {
        return MediumType::File;
    }

    params
        .values()
        .find_map(medium_of_value)
        .unwrap_or(MediumType::Generic)
}

fn medium_of_value(value: &ParamValue) -> Option<MediumType> {
    match value {
        ParamValue::Path(_) => Some(MediumType::File),
        ParamValue::Url(url) => match url.scheme() {
            "file" => Some(MediumType::File),
            "http" => Some(MediumType::Web),
            _ => None,
        },
        ParamValue::Str(text) => {
            if text.starts_with("file:") {
                Some(MediumType::File)
            } else if text.starts_with("http:") {
                Some(MediumType::Web)
            } else if text.starts_with("jdbc:") {
                Some(MediumType::Database)
            } else {
                None
            }
        }
        ParamValue::Other(_) => None,
    }
}

/// Lower-cased scheme of a URL-like string, without requiring it to parse as a URL.
pub(crate) fn url_scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    // a single letter is a windows drive, not a scheme
    (valid && scheme.len() > 1).then(|| scheme.to_ascii_lowercase())
}
