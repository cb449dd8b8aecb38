use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use crate::catalog::{Catalog, PublishedResource, ResourceCursor, ResourceQuery};
use crate::error::CatalogResult;
use crate::store::{StoreDescriptor, StoreRef};

/// A catalog held entirely in memory.
///
/// Keeps count of open cursors, so callers can check that every query was released.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    stores: BTreeMap<StoreRef, StoreDescriptor>,
    resources: Vec<PublishedResource>,
    open_cursors: AtomicUsize,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a store, replacing any store with the same workspace and name.
    pub fn add_store(&mut self, store: StoreDescriptor) {
        self.stores.insert(store.store_ref(), store);
    }

    /// Publishes a resource of a store.
    pub fn add_resource(&mut self, resource: PublishedResource) {
        self.resources.push(resource);
    }

    /// Number of cursors returned by [`Catalog::list_resources`] and not yet dropped.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

impl Catalog for MemoryCatalog {
    fn stores_by_workspace(&self, workspace: &str) -> CatalogResult<Vec<StoreDescriptor>> {
        Ok(self
            .stores
            .values()
            .filter(|s| s.workspace == workspace)
            .cloned()
            .collect())
    }

    fn store(&self, workspace: &str, name: &str) -> CatalogResult<Option<StoreDescriptor>> {
        Ok(self.stores.get(&StoreRef::new(workspace, name)).cloned())
    }

    fn list_resources(&self, query: &ResourceQuery) -> CatalogResult<ResourceCursor<'_>> {
        trace!("Listing catalog resources where {query}");
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let query = query.clone();
        let items = self
            .resources
            .iter()
            .filter(move |r| query.matches(r))
            .cloned()
            .map(Ok);
        Ok(ResourceCursor::new(items).on_close(|| {
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}
