//! Human-readable location of the data behind a store.
//!
//! Locations inside the base data directory are reported relative to it with `/`
//! separators, anything else is reported as configured. Resolution is purely lexical,
//! it never touches the filesystem.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

use crate::classify::url_scheme;
use crate::params::{ParamValue, ParameterBag};
use crate::store::{StoreDescriptor, StoreKind};

/// Returned when a store has no recognizable location.
pub const UNDETERMINED: &str = "undetermined";

/// Computes the normalized source location of a store.
///
/// The first applicable rule wins:
/// 1. the raster URL of a coverage store
/// 2. `host[:port]/dbtype/database[/schema]` for stores with a `dbtype` parameter
/// 3. the capabilities URL of a WMS store, verbatim
/// 4. the `directory` or `file` parameter
/// 5. the `url` parameter
/// 6. the first URL, path, `file:` or `http:`/`https:`/`ftp:` value in key order
///
/// Falls back to [`UNDETERMINED`].
#[must_use]
pub fn resolve_source(store: &StoreDescriptor, base_dir: &Path) -> String {
    resolve_int(store, base_dir).unwrap_or_else(|| {
        debug!("Unable to determine the source of store {}", store.store_ref());
        UNDETERMINED.to_string()
    })
}

fn resolve_int(store: &StoreDescriptor, base_dir: &Path) -> Option<String> {
    if store.kind == StoreKind::CoverageStore {
        return store
            .raster_url
            .as_deref()
            .map(|url| source_url(url, base_dir));
    }

    let params = &store.connection_parameters;
    if params.contains_key("dbtype") {
        return Some(database_source(params));
    }
    if store.kind == StoreKind::WmsStore {
        return store.capabilities_url.clone();
    }
    if let Some(value) = params.get("directory").or_else(|| params.get("file")) {
        return Some(source_location(value, base_dir));
    }
    if let Some(value) = params.get("url") {
        return Some(source_url(&value.to_text(), base_dir));
    }

    params.values().find_map(|value| match value {
        ParamValue::Url(url) => Some(source_url(url.as_str(), base_dir)),
        ParamValue::Path(path) => Some(source_file(path, base_dir)),
        ParamValue::Str(text) if text.starts_with("file:") => Some(source_url(text, base_dir)),
        ParamValue::Str(text)
            if ["http:", "https:", "ftp:"]
                .iter()
                .any(|prefix| text.starts_with(prefix)) =>
        {
            Some(text.clone())
        }
        ParamValue::Str(_) | ParamValue::Other(_) => None,
    })
}

/// Builds `host[:port]/dbtype/database[/schema]`, leaving out absent or empty parts.
fn database_source(params: &ParameterBag) -> String {
    let param = |key: &str| params.get_str(key).filter(|v| !v.is_empty());

    let mut source = String::new();
    if let Some(host) = param("host") {
        source.push_str(&host);
        if let Some(port) = param("port") {
            source.push(':');
            source.push_str(&port);
        }
        source.push('/');
    }
    let segments: Vec<String> = ["dbtype", "database", "schema"]
        .into_iter()
        .filter_map(param)
        .collect();
    source.push_str(&segments.join("/"));
    source
}

/// A `directory` or `file` parameter may hold a path, a `file:` URL, or a remote URL.
fn source_location(value: &ParamValue, base_dir: &Path) -> String {
    match value {
        ParamValue::Path(path) => source_file(path, base_dir),
        ParamValue::Url(url) => source_url(url.as_str(), base_dir),
        ParamValue::Str(text) | ParamValue::Other(text) => {
            if url_scheme(text).is_some() {
                source_url(text, base_dir)
            } else {
                source_file(Path::new(text), base_dir)
            }
        }
    }
}

/// Filesystem rule: base-relative when possible, otherwise the path as given.
fn source_file(path: &Path, base_dir: &Path) -> String {
    base_relative(path, base_dir).unwrap_or_else(|| path.display().to_string())
}

/// URL rule: `file` URLs (or bare paths) inside the base directory become base-relative
/// paths, everything else is returned unchanged.
fn source_url(url: &str, base_dir: &Path) -> String {
    file_url_path(url)
        .and_then(|path| base_relative(&path, base_dir))
        .unwrap_or_else(|| url.to_string())
}

/// Maps a `file:` URL onto a percent-decoded path, `None` for any other scheme.
///
/// Relative forms such as `file:data/roads.shp` are kept relative.
/// A string without a scheme is already a path.
#[must_use]
pub fn file_url_path(url: &str) -> Option<PathBuf> {
    match url_scheme(url).as_deref() {
        None => return Some(PathBuf::from(url)),
        Some("file") => {}
        Some(_) => return None,
    }
    let rest = &url["file:".len()..];
    if rest.starts_with("//") {
        Url::parse(url).ok()?.to_file_path().ok()
    } else {
        Some(PathBuf::from(percent_decode_str(rest).decode_utf8_lossy().as_ref()))
    }
}

/// A relative path is taken to be relative to `base_dir` already. An absolute path is
/// re-expressed relative to `base_dir` if it lies inside it.
fn base_relative(path: &Path, base_dir: &Path) -> Option<String> {
    let path = normalize(path);
    if !path.is_absolute() {
        return Some(to_slash(&path));
    }
    let base_dir = normalize(base_dir);
    // nothing absolute can be shown to lie inside a relative base
    if !base_dir.is_absolute() {
        return None;
    }
    let rel = path.strip_prefix(base_dir).ok()?;
    if rel.as_os_str().is_empty() {
        Some(".".to_string())
    } else {
        Some(to_slash(rel))
    }
}

/// Lexically removes `.` and resolves `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => result.push(".."),
            },
            c => result.push(c),
        }
    }
    result
}

fn to_slash(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(all(test, unix))]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::params::ParameterBag;

    const BASE: &str = "/data";

    fn base() -> &'static Path {
        Path::new(BASE)
    }

    fn data_store(params: ParameterBag) -> StoreDescriptor {
        StoreDescriptor::new("topp", "s", StoreKind::DataStore).with_params(params)
    }

    fn bag(values: &[(&str, &str)]) -> ParameterBag {
        values.iter().copied().collect()
    }

    #[rstest]
    #[case::with_schema(&[("host", "localhost"), ("port", "5432"), ("dbtype", "postgis"), ("database", "gis"), ("schema", "public")], "localhost:5432/postgis/gis/public")]
    #[case::without_schema(&[("host", "localhost"), ("port", "5432"), ("dbtype", "postgis"), ("database", "gis")], "localhost:5432/postgis/gis")]
    #[case::without_port(&[("host", "localhost"), ("dbtype", "postgis"), ("database", "gis"), ("schema", "public")], "localhost/postgis/gis/public")]
    #[case::empty_schema(&[("host", "db"), ("port", "5432"), ("dbtype", "postgis"), ("database", "gis"), ("schema", "")], "db:5432/postgis/gis")]
    #[case::no_host(&[("dbtype", "h2"), ("database", "gis")], "h2/gis")]
    fn database(#[case] params: &[(&str, &str)], #[case] expected: &str) {
        assert_eq!(resolve_source(&data_store(bag(params)), base()), expected);
    }

    #[test]
    fn database_dominates_files() {
        let params = bag(&[
            ("dbtype", "postgis"),
            ("host", "localhost"),
            ("database", "gis"),
            ("directory", "/data/shapefiles"),
        ]);
        assert_eq!(resolve_source(&data_store(params), base()), "localhost/postgis/gis");
    }

    #[test]
    fn database_port_may_be_a_number() {
        let mut params = bag(&[("dbtype", "postgis"), ("host", "h"), ("database", "gis")]);
        params.insert("port", ParamValue::Other("5433".to_string()));
        assert_eq!(resolve_source(&data_store(params), base()), "h:5433/postgis/gis");
    }

    #[rstest]
    #[case::under_base("/data/shapefiles/roads.shp", "shapefiles/roads.shp")]
    #[case::outside_base("/srv/gis/roads.shp", "/srv/gis/roads.shp")]
    #[case::relative("shapefiles/roads.shp", "shapefiles/roads.shp")]
    #[case::relative_dot("./shapefiles/../shapefiles/roads.shp", "shapefiles/roads.shp")]
    #[case::relative_escaping("../other/roads.shp", "../other/roads.shp")]
    #[case::sibling_prefix("/database/roads.shp", "/database/roads.shp")]
    #[case::base_itself("/data", ".")]
    #[case::file_url_under_base("file:///data/shapefiles", "shapefiles")]
    #[case::file_url_relative("file:data/shapefiles", "data/shapefiles")]
    #[case::file_url_outside("file:///srv/gis", "file:///srv/gis")]
    fn file_parameter(#[case] file: &str, #[case] expected: &str) {
        let store = data_store(bag(&[("file", file)]));
        assert_eq!(resolve_source(&store, base()), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::current(".")]
    #[case::relative("data")]
    #[case::relative_dot("./data/")]
    fn relative_base(#[case] base_dir: &str) {
        let store = data_store(bag(&[("file", "/srv/gis/roads.shp")]));
        assert_eq!(resolve_source(&store, Path::new(base_dir)), "/srv/gis/roads.shp");

        let store = data_store(bag(&[("url", "file:///srv/gis/roads.shp")]));
        assert_eq!(resolve_source(&store, Path::new(base_dir)), "file:///srv/gis/roads.shp");

        let store = data_store(bag(&[("directory", "shapefiles/./roads")]));
        assert_eq!(resolve_source(&store, Path::new(base_dir)), "shapefiles/roads");
    }

    #[rstest]
    #[case::relative("file:data/my%20dir", "data/my dir")]
    #[case::absolute("file:///data/my%20dir", "my dir")]
    #[case::single_slash("file:/data/my%20dir/a%2Bb.shp", "my dir/a+b.shp")]
    fn file_urls_are_percent_decoded(#[case] url: &str, #[case] expected: &str) {
        let store = data_store(bag(&[("url", url)]));
        assert_eq!(resolve_source(&store, base()), expected);
    }

    #[rstest]
    #[case::relative("file:coverages/dem%201.tif", Some("coverages/dem 1.tif"))]
    #[case::absolute("file:///srv/dem.tif", Some("/srv/dem.tif"))]
    #[case::bare("coverages/dem.tif", Some("coverages/dem.tif"))]
    #[case::remote("https://example.com/dem.tif", None)]
    fn file_url_to_path(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(file_url_path(url), expected.map(PathBuf::from));
    }

    #[test]
    fn directory_before_file() {
        let store = data_store(bag(&[("directory", "/data/a"), ("file", "/data/b.shp")]));
        assert_eq!(resolve_source(&store, base()), "a");
    }

    #[test]
    fn path_typed_parameter() {
        let mut params = ParameterBag::new();
        params.insert("directory", PathBuf::from("/data/shapefiles"));
        assert_eq!(resolve_source(&data_store(params), base()), "shapefiles");
    }

    #[rstest]
    #[case::file_relative("file:data/sf/streams.shp", "data/sf/streams.shp")]
    #[case::file_absolute("file:///data/sf/streams.shp", "sf/streams.shp")]
    #[case::file_single_slash("file:/data/sf/streams.shp", "sf/streams.shp")]
    #[case::file_outside("file:///tmp/streams.shp", "file:///tmp/streams.shp")]
    #[case::http("http://example.com/wfs?request=GetCapabilities", "http://example.com/wfs?request=GetCapabilities")]
    fn url_parameter(#[case] url: &str, #[case] expected: &str) {
        let store = data_store(bag(&[("url", url)]));
        assert_eq!(resolve_source(&store, base()), expected);
    }

    #[rstest]
    #[case::relative("file:data/sf/sfdem.tif", "data/sf/sfdem.tif")]
    #[case::inside("file:///data/sf/sfdem.tif", "sf/sfdem.tif")]
    #[case::remote("https://example.com/cog/dem.tif", "https://example.com/cog/dem.tif")]
    #[case::unparsable("file://[bad/dem.tif", "file://[bad/dem.tif")]
    #[case::bare_path("/data/sf/sfdem.tif", "sf/sfdem.tif")]
    #[case::bare_path_outside("/srv/dem.tif", "/srv/dem.tif")]
    fn coverage(#[case] url: &str, #[case] expected: &str) {
        let store = StoreDescriptor::new("nurc", "dem", StoreKind::CoverageStore)
            .with_raster_url(url)
            .with_params(bag(&[("dbtype", "postgis")]));
        assert_eq!(resolve_source(&store, base()), expected);
    }

    #[test]
    fn coverage_without_url() {
        let store = StoreDescriptor::new("nurc", "dem", StoreKind::CoverageStore)
            .with_params(bag(&[("file", "dem.tif")]));
        assert_eq!(resolve_source(&store, base()), UNDETERMINED);
    }

    #[test]
    fn wms_is_verbatim() {
        let url = "file:///data/not-normalized?service=WMS";
        let store =
            StoreDescriptor::new("ws", "remote", StoreKind::WmsStore).with_capabilities_url(url);
        assert_eq!(resolve_source(&store, base()), url);
    }

    #[test]
    fn value_scan() {
        let mut params = bag(&[("charset", "UTF-8"), ("namespace", "http://topp")]);
        assert_eq!(resolve_source(&data_store(params.clone()), base()), "http://topp");

        params.insert("b_archive", ParamValue::Url(Url::parse("file:///data/zip/a.zip").unwrap()));
        assert_eq!(resolve_source(&data_store(params.clone()), base()), "zip/a.zip");

        params.insert("a_cache", PathBuf::from("/var/cache/x"));
        assert_eq!(resolve_source(&data_store(params), base()), "/var/cache/x");
    }

    #[rstest]
    #[case::file_str("file:/data/sf/archsites.shp", "sf/archsites.shp")]
    #[case::https("https://example.com/x", "https://example.com/x")]
    #[case::ftp("ftp://example.com/x", "ftp://example.com/x")]
    fn value_scan_strings(#[case] value: &str, #[case] expected: &str) {
        let store = data_store(bag(&[("location", value)]));
        assert_eq!(resolve_source(&store, base()), expected);
    }

    #[test]
    fn undetermined() {
        let store = data_store(bag(&[("charset", "UTF-8"), ("create spatial index", "true")]));
        assert_eq!(resolve_source(&store, base()), "undetermined");
        let store = StoreDescriptor::new("ws", "remote", StoreKind::WmsStore);
        assert_eq!(resolve_source(&store, base()), UNDETERMINED);
    }

    #[test]
    fn idempotent() {
        let stores = [
            data_store(bag(&[("url", "file:data/sf/streams.shp")])),
            data_store(bag(&[("directory", "/data/./shapefiles/")])),
            data_store(bag(&[("dbtype", "postgis"), ("host", "h"), ("database", "d")])),
        ];
        for store in &stores {
            let first = resolve_source(store, base());
            assert_eq!(first, resolve_source(store, base()));
        }
    }

    #[test]
    fn normalize_lexically() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(normalize(Path::new("a/../..")), PathBuf::from(".."));
    }
}
