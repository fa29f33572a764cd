//! Catalog layer: the version relation and its derived latest pointers
//!
//! One row exists per (maintainer, appId, version). Two read perspectives
//! look at the same relation: maintainers see every version they own, while
//! set-top boxes only see versions marked visible. Each perspective has its
//! own "latest version" pointer per application, kept as cached row state
//! and recomputed transactionally after every mutation.
//!
//! # Modules
//!
//! - [`store`]: SQLite-backed relation with all read/write operations
//! - [`latest`]: latest-pointer recomputation run inside write transactions
//! - [`preferred`]: read-time tie-break when several rows qualify as latest
//! - [`types`]: maintainers, payloads, perspectives, list filters
//! - [`error`]: error taxonomy for catalog operations

pub mod error;
pub mod latest;
pub mod preferred;
pub mod store;
pub mod types;

pub use error::CatalogError;
pub use store::CatalogStore;
pub use types::{
    ApplicationDetails, ApplicationPayload, ApplicationSummary, LatestFlags, ListFilters,
    Maintainer, Page, Perspective,
};
