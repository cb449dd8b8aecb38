use crate::store::{StoreKind, StoreRef};

/// Any error raised by a store handle or a catalog backend.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while listing the content of a store.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store kind has no listing strategy.
    #[error("Store {store} is a {kind}, which does not support listing its resources")]
    UnsupportedStoreKind {
        /// The store that was asked for.
        store: StoreRef,
        /// Its kind.
        kind: StoreKind,
    },

    /// Opening or reading the underlying dataset, coverage, or service failed.
    #[error("Unable to list the resources of store {store}: {source}")]
    Enumeration {
        /// The store being enumerated.
        store: StoreRef,
        /// Underlying cause.
        #[source]
        source: BoxedError,
    },

    /// No store with this name exists in the workspace.
    #[error("Store {0} not found")]
    StoreNotFound(StoreRef),

    /// The catalog could not answer a query.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A convenience [`Result`] for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a [`Catalog`](crate::catalog::Catalog) backend.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// A query failed while opening or reading its cursor.
    #[error("Catalog query {query} failed: {source}")]
    QueryFailed {
        /// Human-readable form of the query.
        query: String,
        /// Underlying cause.
        #[source]
        source: BoxedError,
    },
}

/// A convenience [`Result`] for catalog queries.
pub type CatalogResult<T> = Result<T, CatalogError>;
