use std::collections::{BTreeMap, HashMap, HashSet};
use std::env::current_dir;
use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::path::{self, Path, PathBuf};

use geostore_core::catalog::{MemoryCatalog, PublishedResource};
use geostore_core::params::ParameterBag;
use geostore_core::store::{StoreDescriptor, StoreKind, StoreRef};
use serde::{Deserialize, Serialize};
use subst::VariableMap;
use tracing::{debug, info, warn};

use crate::config::{ConfigFileError, ConfigFileResult, Env};

pub type UnrecognizedValues = HashMap<String, serde_yaml::Value>;
pub type UnrecognizedKeys = HashSet<String>;

/// Variable used as the data directory when the config file does not set one.
pub const DATA_DIR_VAR: &str = "GEOSTORE_DATA_DIR";

fn copy_unrecognized_keys(result: &mut UnrecognizedKeys, prefix: &str, unrecognized: &UnrecognizedValues) {
    result.extend(unrecognized.keys().map(|k| format!("{prefix}{k}")));
}

fn default_enabled() -> bool {
    true
}

#[expect(clippy::trivially_copy_pass_by_ref, reason = "serde skip_serializing_if signature")]
fn is_enabled(enabled: &bool) -> bool {
    *enabled
}

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base directory of file-based stores. Relative paths are resolved against the config file.
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub workspaces: BTreeMap<String, WorkspaceConfig>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stores: BTreeMap<String, StoreConfig>,

    /// Published layers, by published name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layers: BTreeMap<String, LayerConfig>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub description: Option<String>,
    /// Driver name, e.g. `Shapefile`, `PostGIS` or `GeoTIFF`
    pub format: Option<String>,
    #[serde(default = "default_enabled", skip_serializing_if = "is_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "ParameterBag::is_empty")]
    pub connection: ParameterBag,
    /// Raster location of a coverage store, a `file:` URL, a path, or a remote URL
    pub raster_url: Option<String>,
    /// Capabilities document of a WMS store
    pub capabilities_url: Option<String>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Store of the same workspace the layer is published from
    pub store: String,
    /// Dataset name within the store, defaults to the layer name
    pub native_name: Option<String>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

impl Config {
    /// Resolves the data directory, checks layer references, and warns about unknown keys.
    ///
    /// Without a `data_dir`, the [`DATA_DIR_VAR`] variable or the directory of the config
    /// file is used. Relative directories are taken relative to the config file, and the
    /// result is made absolute against the current directory.
    pub fn finalize<'a>(
        &mut self,
        config_path: &Path,
        env: &impl Env<'a>,
    ) -> ConfigFileResult<UnrecognizedKeys> {
        let mut res = UnrecognizedKeys::new();
        copy_unrecognized_keys(&mut res, "", &self.unrecognized);
        for (ws_name, ws) in &self.workspaces {
            copy_unrecognized_keys(&mut res, &format!("workspaces.{ws_name}."), &ws.unrecognized);
            for (name, store) in &ws.stores {
                let prefix = format!("workspaces.{ws_name}.stores.{name}.");
                copy_unrecognized_keys(&mut res, &prefix, &store.unrecognized);
            }
            for (name, layer) in &ws.layers {
                let prefix = format!("workspaces.{ws_name}.layers.{name}.");
                copy_unrecognized_keys(&mut res, &prefix, &layer.unrecognized);
                if !ws.stores.contains_key(&layer.store) {
                    return Err(ConfigFileError::UnknownLayerStore {
                        workspace: ws_name.clone(),
                        layer: name.clone(),
                        store: layer.store.clone(),
                    });
                }
            }
        }

        for key in &res {
            warn!(
                "Ignoring unrecognized configuration key '{key}'. Please check your configuration file for typos."
            );
        }

        if self.workspaces.is_empty() {
            return Err(ConfigFileError::NoWorkspaces(config_path.to_path_buf()));
        }

        let config_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        let data_dir = match self.data_dir.take() {
            Some(dir) => {
                if env.has_unused_var(DATA_DIR_VAR) {
                    warn!(
                        "Environment variable {DATA_DIR_VAR} is ignored because the config file sets data_dir. Use data_dir: ${{{DATA_DIR_VAR}}} to use it."
                    );
                }
                dir
            }
            None => env
                .get_env_str(DATA_DIR_VAR)
                .map_or_else(|| config_dir.to_path_buf(), PathBuf::from),
        };
        let data_dir = config_dir.join(data_dir);
        let data_dir = if data_dir.as_os_str().is_empty() {
            current_dir()
        } else {
            path::absolute(&data_dir)
        }
        .map_err(|e| ConfigFileError::DataDirError(e, data_dir))?;
        debug!("Using data directory {}", data_dir.display());
        self.data_dir = Some(data_dir);

        Ok(res)
    }

    /// The base directory stores are resolved against.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Builds the catalog of every configured store and layer.
    #[must_use]
    pub fn to_catalog(&self) -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        for (ws_name, ws) in &self.workspaces {
            for (name, store) in &ws.stores {
                catalog.add_store(store.to_descriptor(ws_name, name));
            }
            for (name, layer) in &ws.layers {
                catalog.add_resource(PublishedResource {
                    name: name.clone(),
                    native_name: layer.native_name.clone().unwrap_or_else(|| name.clone()),
                    namespace_prefix: ws_name.clone(),
                    store: StoreRef::new(ws_name, &layer.store),
                });
            }
        }
        catalog
    }

    pub fn save_to_file(&self, file_name: &Path) -> ConfigFileResult<()> {
        let yaml = serde_yaml::to_string(&self).map_err(ConfigFileError::ConfigSerializeError)?;
        if file_name.as_os_str() == OsStr::new("-") {
            info!("Current system configuration:");
            println!("\n\n{yaml}\n");
            Ok(())
        } else {
            info!(
                "Saving config to {}, use --config to load it",
                file_name.display()
            );
            File::create(file_name)
                .map_err(|e| ConfigFileError::ConfigWriteError(e, file_name.to_path_buf()))?
                .write_all(yaml.as_bytes())
                .map_err(|e| ConfigFileError::ConfigWriteError(e, file_name.to_path_buf()))?;
            Ok(())
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn to_descriptor(&self, workspace: &str, name: &str) -> StoreDescriptor {
        let mut store = StoreDescriptor::new(workspace, name, self.kind)
            .with_params(self.connection.clone())
            .with_enabled(self.enabled);
        store.description.clone_from(&self.description);
        store.format.clone_from(&self.format);
        store.raster_url.clone_from(&self.raster_url);
        store.capabilities_url.clone_from(&self.capabilities_url);
        store
    }
}

/// Read config from a file
pub fn read_config<'a, M>(file_name: &Path, env: &'a M) -> ConfigFileResult<Config>
where
    M: VariableMap<'a>,
    M::Value: AsRef<str>,
{
    let mut file =
        File::open(file_name).map_err(|e| ConfigFileError::ConfigLoadError(e, file_name.into()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| ConfigFileError::ConfigLoadError(e, file_name.into()))?;
    parse_config(&contents, env, file_name)
}

pub fn parse_config<'a, M>(contents: &str, env: &'a M, file_name: &Path) -> ConfigFileResult<Config>
where
    M: VariableMap<'a>,
    M::Value: AsRef<str>,
{
    subst::yaml::from_str(contents, env)
        .map_err(|e| ConfigFileError::ConfigParseError(e, file_name.into()))
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use geostore_core::catalog::{Catalog as _, ResourceQuery};
    use geostore_core::inspect::list_stores;
    use geostore_core::params::ParamValue;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tracing_test::traced_test;

    use super::*;
    use crate::config::FauxEnv;

    const CONFIG: &str = indoc! {"
        data_dir: data
        workspaces:
          topp:
            stores:
              states:
                kind: data_store
                format: Shapefile
                connection:
                  url: file:data/shapefiles/states.shp
                  memory mapped buffer: false
              db:
                kind: data_store
                enabled: false
                connection:
                  dbtype: postgis
                  host: ${PGHOST}
                  port: 5432
              dem:
                kind: coverage_store
                raster_url: file:coverages/dem.tif
            layers:
              states:
                store: states
              usa:
                store: states
                native_name: states
    "};

    fn parse(yaml: &str) -> Config {
        let env = FauxEnv([("PGHOST", OsString::from("db.example.com"))].into_iter().collect());
        parse_config(yaml, &env, Path::new("/etc/geostore/config.yaml")).unwrap()
    }

    #[test]
    fn parse_stores_and_layers() {
        let config = parse(CONFIG);
        let topp = &config.workspaces["topp"];
        let db = &topp.stores["db"];
        assert!(!db.enabled);
        assert_eq!(db.connection.get_str("host").as_deref(), Some("db.example.com"));
        assert_eq!(db.connection.get("port"), Some(&ParamValue::Other("5432".to_string())));
        assert_eq!(
            topp.stores["states"].connection.get("memory mapped buffer"),
            Some(&ParamValue::Other("false".to_string()))
        );
        assert_eq!(topp.stores["dem"].kind, StoreKind::CoverageStore);
        assert_eq!(topp.layers["usa"].native_name.as_deref(), Some("states"));
    }

    #[test]
    fn null_connection_parameters_are_ignored() {
        let config = parse(indoc! {"
            workspaces:
              topp:
                stores:
                  states:
                    kind: data_store
                    connection:
                      namespace: ~
                      url: file:data/shapefiles/states.shp
        "});
        let connection = &config.workspaces["topp"].stores["states"].connection;
        assert!(!connection.contains_key("namespace"));
        assert!(connection.contains_key("url"));
    }

    #[test]
    fn finalize_resolves_data_dir_against_config_file() {
        let mut config = parse(CONFIG);
        let unrecognized = config
            .finalize(Path::new("/etc/geostore/config.yaml"), &FauxEnv::default())
            .unwrap();
        assert!(unrecognized.is_empty());
        assert_eq!(config.data_dir(), Path::new("/etc/geostore/data"));
    }

    #[test]
    fn data_dir_from_env() {
        let mut config = parse("workspaces: { topp: {} }");
        let env = FauxEnv([(DATA_DIR_VAR, OsString::from("/srv/gis"))].into_iter().collect());
        config.finalize(Path::new("config.yaml"), &env).unwrap();
        assert_eq!(config.data_dir(), Path::new("/srv/gis"));

        let mut config = parse("workspaces: { topp: {} }");
        config
            .finalize(Path::new("/etc/geostore/config.yaml"), &FauxEnv::default())
            .unwrap();
        assert_eq!(config.data_dir(), Path::new("/etc/geostore"));
    }

    #[rstest]
    #[case::no_data_dir("workspaces: { topp: {} }", "")]
    #[case::current_dir("data_dir: .\nworkspaces: { topp: {} }", "")]
    #[case::relative_dir("data_dir: data\nworkspaces: { topp: {} }", "data")]
    fn data_dir_next_to_a_relative_config(#[case] yaml: &str, #[case] expected: &str) {
        let mut config = parse(yaml);
        config
            .finalize(Path::new("catalog.yaml"), &FauxEnv::default())
            .unwrap();
        let cwd = current_dir().unwrap();
        assert!(config.data_dir().is_absolute());
        assert_eq!(without_dots(config.data_dir()), without_dots(&cwd.join(expected)));
    }

    fn without_dots(path: &Path) -> Vec<String> {
        path.components()
            .filter(|c| !matches!(c, path::Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn sources_outside_a_relative_config_dir() {
        let mut config = parse(indoc! {"
            workspaces:
              topp:
                stores:
                  shapes:
                    kind: data_store
                    connection:
                      directory: /srv/gis/shapefiles
        "});
        config
            .finalize(Path::new("catalog.yaml"), &FauxEnv::default())
            .unwrap();
        let stores = list_stores("topp", &config.to_catalog(), config.data_dir()).unwrap();
        assert_eq!(stores[0].source, "/srv/gis/shapefiles");
    }

    #[test]
    #[traced_test]
    fn unrecognized_keys_are_reported() {
        let mut config = parse(indoc! {"
            data_dir: /data
            cache_size_mb: 10
            workspaces:
              topp:
                stores:
                  states:
                    kind: data_store
                    conection: {}
                layers:
                  states:
                    store: states
                    styles: [polygon]
        "});
        let unrecognized = config
            .finalize(Path::new("config.yaml"), &FauxEnv::default())
            .unwrap();
        let expected: UnrecognizedKeys = [
            "cache_size_mb",
            "workspaces.topp.stores.states.conection",
            "workspaces.topp.layers.states.styles",
        ]
        .into_iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(unrecognized, expected);
        assert!(logs_contain(
            "Ignoring unrecognized configuration key 'workspaces.topp.stores.states.conection'"
        ));
    }

    #[test]
    fn layers_must_reference_configured_stores() {
        let mut config = parse(indoc! {"
            workspaces:
              topp:
                layers:
                  states:
                    store: missing
        "});
        let err = config
            .finalize(Path::new("config.yaml"), &FauxEnv::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Layer topp:states is published from store missing, which is not configured in workspace topp"
        );
    }

    #[test]
    fn empty_config_is_rejected() {
        let mut config = parse("data_dir: /data");
        let err = config
            .finalize(Path::new("config.yaml"), &FauxEnv::default())
            .unwrap_err();
        assert!(matches!(err, ConfigFileError::NoWorkspaces(_)));
    }

    #[test]
    fn catalog_from_config() {
        let catalog = parse(CONFIG).to_catalog();
        let stores = catalog.stores_by_workspace("topp").unwrap();
        let names: Vec<_> = stores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["db", "dem", "states"]);
        assert_eq!(
            stores[1].raster_url.as_deref(),
            Some("file:coverages/dem.tif")
        );

        let published: Vec<_> = catalog
            .list_resources(&ResourceQuery::new().native_name("states"))
            .unwrap()
            .map(|r| r.unwrap().name)
            .collect();
        assert_eq!(published, ["states", "usa"]);
    }

    #[test]
    fn save_round_trip() {
        let mut config = parse(CONFIG);
        config
            .finalize(Path::new("/etc/geostore/config.yaml"), &FauxEnv::default())
            .unwrap();
        insta::assert_yaml_snapshot!(config, @r#"
        data_dir: /etc/geostore/data
        workspaces:
          topp:
            stores:
              db:
                kind: data_store
                enabled: false
                connection:
                  dbtype: postgis
                  host: db.example.com
                  port: 5432
              dem:
                kind: coverage_store
                raster_url: "file:coverages/dem.tif"
              states:
                kind: data_store
                format: Shapefile
                connection:
                  memory mapped buffer: false
                  url: "file:data/shapefiles/states.shp"
            layers:
              states:
                store: states
              usa:
                store: states
                native_name: states
        "#);
    }
}
