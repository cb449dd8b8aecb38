use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, ResourceQuery};
use crate::error::StoreResult;
use crate::resources::{StoreConnector, list_native_resources};
use crate::store::StoreDescriptor;

/// A published layer, as shown next to its store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRef {
    /// Published name.
    pub name: String,
    /// Workspace it is published in.
    pub workspace: String,
}

/// A native dataset of a store and the layers publishing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Native dataset name.
    pub name: String,
    /// Layers publishing this dataset, empty if it is not published yet.
    pub layers: Vec<LayerRef>,
}

/// Layers registered against the store, whether or not their dataset still exists.
pub fn layers_attached_to_store(
    store: &StoreDescriptor,
    catalog: &dyn Catalog,
) -> StoreResult<Vec<LayerRef>> {
    let query = ResourceQuery::new()
        .store(store.store_ref())
        .namespace_prefix(&store.workspace);
    query_layers(store, catalog, &query)
}

/// Every native dataset of the store, in listing order, with the layers publishing it.
///
/// Opens the store through `connector`. Fails as a whole if either the listing
/// or any of the catalog lookups fails.
pub fn resources_with_layers(
    store: &StoreDescriptor,
    catalog: &dyn Catalog,
    connector: &dyn StoreConnector,
) -> StoreResult<Vec<ResourceRecord>> {
    list_native_resources(store, connector)?
        .into_iter()
        .map(|name| -> StoreResult<ResourceRecord> {
            let query = ResourceQuery::new()
                .namespace_prefix(&store.workspace)
                .native_name(&name);
            let layers = query_layers(store, catalog, &query)?;
            if layers.is_empty() {
                debug!("Resource {name} of store {} is not published", store.store_ref());
            }
            Ok(ResourceRecord { name, layers })
        })
        .collect()
}

fn query_layers(
    store: &StoreDescriptor,
    catalog: &dyn Catalog,
    query: &ResourceQuery,
) -> StoreResult<Vec<LayerRef>> {
    // the cursor is released when it goes out of scope, including on `?`
    let cursor = catalog.list_resources(query)?;
    let mut layers = Vec::new();
    for resource in cursor {
        layers.push(LayerRef {
            name: resource?.name,
            workspace: store.workspace.clone(),
        });
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::{MemoryCatalog, PublishedResource, ResourceCursor};
    use crate::error::{CatalogError, CatalogResult, StoreError};
    use crate::resources::tests::{FakeConnector, Listing};
    use crate::store::{StoreKind, StoreRef};

    fn published(store: &StoreRef, name: &str, native_name: &str) -> PublishedResource {
        PublishedResource {
            name: name.to_string(),
            native_name: native_name.to_string(),
            namespace_prefix: store.workspace.clone(),
            store: store.clone(),
        }
    }

    fn layer(name: &str) -> LayerRef {
        LayerRef {
            name: name.to_string(),
            workspace: "topp".to_string(),
        }
    }

    fn fixture() -> (StoreDescriptor, MemoryCatalog) {
        let store = StoreDescriptor::new("topp", "shapes", StoreKind::DataStore);
        let other = StoreRef::new("topp", "other");
        let mut catalog = MemoryCatalog::new();
        catalog.add_store(store.clone());
        catalog.add_resource(published(&store.store_ref(), "roads", "roads"));
        catalog.add_resource(published(&store.store_ref(), "main_roads", "roads"));
        catalog.add_resource(published(&store.store_ref(), "lost", "deleted_table"));
        catalog.add_resource(published(&other, "rivers", "rivers"));
        catalog.add_resource(published(&other, "other_roads", "roads"));
        catalog.add_resource(published(&StoreRef::new("sf", "shapes"), "sf_roads", "roads"));
        (store, catalog)
    }

    #[test]
    fn attached_layers_are_filtered_by_store_and_workspace() {
        let (store, catalog) = fixture();
        let layers = layers_attached_to_store(&store, &catalog).unwrap();
        assert_eq!(layers, [layer("roads"), layer("main_roads"), layer("lost")]);
        assert_eq!(catalog.open_cursors(), 0);
    }

    #[test]
    fn resources_keep_listing_order_and_unpublished_entries() {
        let (store, catalog) = fixture();
        let connector = FakeConnector::default().with(
            &store,
            Listing::Names(vec!["streams".to_string(), "roads".to_string()]),
        );

        let records = resources_with_layers(&store, &catalog, &connector).unwrap();
        insta::assert_json_snapshot!(records, @r#"
        [
          {
            "name": "streams",
            "layers": []
          },
          {
            "name": "roads",
            "layers": [
              {
                "name": "roads",
                "workspace": "topp"
              },
              {
                "name": "main_roads",
                "workspace": "topp"
              },
              {
                "name": "other_roads",
                "workspace": "topp"
              }
            ]
          }
        ]
        "#);
        assert_eq!(catalog.open_cursors(), 0);
        assert_eq!(*connector.released.borrow(), 1);
    }

    #[test]
    fn no_records_for_names_the_store_does_not_list() {
        let (store, catalog) = fixture();
        let connector = FakeConnector::default().with(&store, Listing::Names(vec![]));
        assert!(resources_with_layers(&store, &catalog, &connector).unwrap().is_empty());
    }

    #[test]
    fn enumeration_failure_propagates() {
        let (store, catalog) = fixture();
        let connector = FakeConnector::default().with(&store, Listing::FailRead("connection refused"));
        let err = resources_with_layers(&store, &catalog, &connector).unwrap_err();
        assert!(matches!(err, StoreError::Enumeration { .. }));
    }

    /// Yields one resource, then fails.
    struct FailingCatalog {
        open: Cell<usize>,
    }

    impl Catalog for FailingCatalog {
        fn stores_by_workspace(&self, _: &str) -> CatalogResult<Vec<StoreDescriptor>> {
            Ok(vec![])
        }

        fn store(&self, _: &str, _: &str) -> CatalogResult<Option<StoreDescriptor>> {
            Ok(None)
        }

        fn list_resources(&self, query: &ResourceQuery) -> CatalogResult<ResourceCursor<'_>> {
            self.open.set(self.open.get() + 1);
            let store = StoreRef::new("topp", "shapes");
            let items = vec![
                Ok(published(&store, "roads", "roads")),
                Err(CatalogError::QueryFailed {
                    query: query.to_string(),
                    source: Box::new(io::Error::other("connection reset")),
                }),
            ];
            Ok(ResourceCursor::new(items.into_iter())
                .on_close(|| self.open.set(self.open.get() - 1)))
        }
    }

    #[test]
    fn catalog_failure_releases_cursor_and_returns_no_partial_result() {
        let store = StoreDescriptor::new("topp", "shapes", StoreKind::DataStore);
        let catalog = FailingCatalog { open: Cell::new(0) };

        let err = layers_attached_to_store(&store, &catalog).unwrap_err();
        assert!(matches!(err, StoreError::Catalog(_)));
        assert_eq!(catalog.open.get(), 0);

        let connector = FakeConnector::default().with(&store, Listing::Names(vec!["roads".to_string()]));
        let err = resources_with_layers(&store, &catalog, &connector).unwrap_err();
        assert!(matches!(err, StoreError::Catalog(_)));
        assert_eq!(catalog.open.get(), 0);
    }
}
