#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod classify;
pub mod inspect;
pub mod params;
pub mod resources;
pub mod source;
pub mod store;

mod error;
pub use error::{BoxedError, CatalogError, CatalogResult, StoreError, StoreResult};
