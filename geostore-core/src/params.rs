//! Loosely-typed connection parameters of a store.
//!
//! Every store driver keeps its own set of connection keys, so nothing here is
//! validated. Values keep just enough type information to tell plain strings,
//! filesystem paths and URLs apart, which is what the classifiers need.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// A single connection parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A plain string, which may still look like a URL or a JDBC connection string.
    Str(String),
    /// A filesystem path, absolute or relative to the data directory.
    Path(PathBuf),
    /// A parsed URL.
    Url(Url),
    /// Any other value (numbers, booleans, ...), kept as its display text.
    Other(String),
}

impl ParamValue {
    /// The string form of this value, the way a loose converter would render it.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Str(v) | Self::Other(v) => v.clone(),
            Self::Path(v) => v.display().to_string(),
            Self::Url(v) => v.to_string(),
        }
    }

    /// Returns the raw string if this is a [`ParamValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::Str(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(v) | Self::Other(v) => f.write_str(v),
            Self::Path(v) => write!(f, "{}", v.display()),
            Self::Url(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<PathBuf> for ParamValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<Url> for ParamValue {
    fn from(value: Url) -> Self {
        Self::Url(value)
    }
}

/// On-disk representation: scalars stay scalars, typed values are tagged maps.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ParamRepr {
    Path { path: PathBuf },
    Url { url: Url },
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Str(v) => ParamRepr::Str(v.clone()),
            Self::Other(v) => scalar_repr(v),
            Self::Path(v) => ParamRepr::Path { path: v.clone() },
            Self::Url(v) => ParamRepr::Url { url: v.clone() },
        };
        repr.serialize(serializer)
    }
}

/// Restores the scalar kind a [`ParamValue::Other`] was read from.
fn scalar_repr(text: &str) -> ParamRepr {
    if let Ok(v) = text.parse::<bool>() {
        ParamRepr::Bool(v)
    } else if let Ok(v) = text.parse::<i64>() {
        ParamRepr::Int(v)
    } else if let Ok(v) = text.parse::<f64>() {
        ParamRepr::Float(v)
    } else {
        ParamRepr::Str(text.to_string())
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ParamRepr::deserialize(deserializer)? {
            ParamRepr::Path { path } => Self::Path(path),
            ParamRepr::Url { url } => Self::Url(url),
            ParamRepr::Str(v) => Self::Str(v),
            ParamRepr::Bool(v) => Self::Other(v.to_string()),
            ParamRepr::Int(v) => Self::Other(v.to_string()),
            ParamRepr::Float(v) => Self::Other(v.to_string()),
        })
    }
}

/// Connection parameters of a store, iterated in lexicographic key order.
///
/// The fixed order makes the value-scanning fallbacks of the classifiers
/// deterministic when more than one value would match.
///
/// Parameters set to null are dropped when a bag is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterBag(BTreeMap<String, ParamValue>);

impl<'de> Deserialize<'de> for ParameterBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = BTreeMap::<String, Option<ParamValue>>::deserialize(deserializer)?;
        Ok(Self(
            values
                .into_iter()
                .filter_map(|(key, value)| Some((key, value?)))
                .collect(),
        ))
    }
}

impl ParameterBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Looks up a parameter and converts it to a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(ParamValue::to_text)
    }

    /// Whether the key is present, regardless of its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// All parameters in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    /// All values in key order.
    pub fn values(&self) -> btree_map::Values<'_, String, ParamValue> {
        self.0.values()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a ParameterBag {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
