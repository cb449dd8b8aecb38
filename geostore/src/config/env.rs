//! Environment variables available to `${VAR}` substitution in the config file.
//!
//! - [`OsEnv`]: the process environment
//! - [`FauxEnv`]: a fixed map, for tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::env::var_os;
use std::ffi::OsString;

use subst::VariableMap;
use tracing::warn;

/// Environment variable access that can be faked in tests.
pub trait Env<'a>: VariableMap<'a> {
    /// Gets a variable without Unicode validation.
    fn var_os(&self, key: &str) -> Option<OsString>;

    /// Gets a variable as UTF-8. Warns and returns `None` if it is not valid Unicode.
    #[must_use]
    fn get_env_str(&self, key: &str) -> Option<String> {
        let value = self.var_os(key)?;
        match value.into_string() {
            Ok(v) => Some(v),
            Err(v) => {
                let v = v.to_string_lossy();
                warn!("Environment variable {key} has invalid unicode. Lossy representation: {v}");
                None
            }
        }
    }

    /// Whether a variable is set but was never used by substitution.
    #[must_use]
    fn has_unused_var(&self, key: &str) -> bool;
}

/// The process environment, remembering which variables substitution looked up.
#[derive(Debug, Default)]
pub struct OsEnv(RefCell<HashSet<String>>);

impl Env<'_> for OsEnv {
    fn var_os(&self, key: &str) -> Option<OsString> {
        var_os(key)
    }

    fn has_unused_var(&self, key: &str) -> bool {
        !self.0.borrow().contains(key) && var_os(key).is_some()
    }
}

impl<'a> VariableMap<'a> for OsEnv {
    type Value = String;

    fn get(&'a self, key: &str) -> Option<Self::Value> {
        self.0.borrow_mut().insert(key.to_string());
        std::env::var(key).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Default)]
pub struct FauxEnv(pub HashMap<&'static str, OsString>);

impl<'a> VariableMap<'a> for FauxEnv {
    type Value = String;

    fn get(&'a self, key: &str) -> Option<Self::Value> {
        self.0.get(key).map(|s| s.to_string_lossy().to_string())
    }
}

impl Env<'_> for FauxEnv {
    fn var_os(&self, key: &str) -> Option<OsString> {
        self.0.get(key).cloned()
    }

    fn has_unused_var(&self, key: &str) -> bool {
        self.var_os(key).is_some()
    }
}
