//! The catalog of workspaces, stores and published resources, and the joins
//! between what a store natively exposes and what the catalog publishes.

use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;
use crate::store::{StoreDescriptor, StoreRef};

mod join;
pub use join::{LayerRef, ResourceRecord, layers_attached_to_store, resources_with_layers};

mod memory;
pub use memory::MemoryCatalog;

/// A resource published from a store, as registered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedResource {
    /// Published (display) name.
    pub name: String,
    /// Name of the dataset in the store.
    pub native_name: String,
    /// Namespace prefix, the name of the owning workspace.
    pub namespace_prefix: String,
    /// Store the resource is published from.
    pub store: StoreRef,
}

/// Conjunctive equality filter over published resources. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
    /// `store == ...`
    pub store: Option<StoreRef>,
    /// `namespace.prefix == ...`
    pub namespace_prefix: Option<String>,
    /// `nativeName == ...`
    pub native_name: Option<String>,
}

impl ResourceQuery {
    /// A query matching every resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to one store.
    #[must_use]
    pub fn store(mut self, store: StoreRef) -> Self {
        self.store = Some(store);
        self
    }

    /// Restricts the query to one namespace prefix.
    #[must_use]
    pub fn namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = Some(prefix.into());
        self
    }

    /// Restricts the query to one native name.
    #[must_use]
    pub fn native_name(mut self, name: impl Into<String>) -> Self {
        self.native_name = Some(name.into());
        self
    }

    /// Whether a resource satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, resource: &PublishedResource) -> bool {
        self.store.as_ref().is_none_or(|v| *v == resource.store)
            && self
                .namespace_prefix
                .as_ref()
                .is_none_or(|v| *v == resource.namespace_prefix)
            && self
                .native_name
                .as_ref()
                .is_none_or(|v| *v == resource.native_name)
    }
}

impl Display for ResourceQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut terms = Vec::new();
        if let Some(v) = &self.store {
            terms.push(format!("store = {v}"));
        }
        if let Some(v) = &self.namespace_prefix {
            terms.push(format!("namespace.prefix = {v}"));
        }
        if let Some(v) = &self.native_name {
            terms.push(format!("nativeName = {v}"));
        }
        if terms.is_empty() {
            f.write_str("INCLUDE")
        } else {
            f.write_str(&terms.join(" AND "))
        }
    }
}

/// An open iteration over catalog query results.
///
/// Backends release whatever the query holds (connections, locks, ...) in the
/// close hook, which runs exactly once when the cursor is dropped, whether it was
/// read to the end or abandoned on error.
pub struct ResourceCursor<'a> {
    items: Box<dyn Iterator<Item = CatalogResult<PublishedResource>> + 'a>,
    on_close: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a> ResourceCursor<'a> {
    /// Wraps an iterator without anything to release.
    pub fn new(items: impl Iterator<Item = CatalogResult<PublishedResource>> + 'a) -> Self {
        Self {
            items: Box::new(items),
            on_close: None,
        }
    }

    /// Registers the hook that releases the backing resources.
    #[must_use]
    pub fn on_close(mut self, hook: impl FnOnce() + 'a) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }
}

impl Iterator for ResourceCursor<'_> {
    type Item = CatalogResult<PublishedResource>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl Drop for ResourceCursor<'_> {
    fn drop(&mut self) {
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl Debug for ResourceCursor<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCursor")
            .field("open", &self.on_close.is_some())
            .finish_non_exhaustive()
    }
}

/// A queryable registry of workspaces, stores, and published resources.
pub trait Catalog {
    /// Every store of a workspace.
    fn stores_by_workspace(&self, workspace: &str) -> CatalogResult<Vec<StoreDescriptor>>;

    /// A single store, if it exists.
    fn store(&self, workspace: &str, name: &str) -> CatalogResult<Option<StoreDescriptor>>;

    /// Published resources matching the query.
    fn list_resources(&self, query: &ResourceQuery) -> CatalogResult<ResourceCursor<'_>>;
}
