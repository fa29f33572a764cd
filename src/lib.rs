//! Application version catalog with per-perspective latest tracking
//!
//! Maintainers publish application versions into a catalog keyed by
//! `(maintainer, appId, version)`. Devices (set-top boxes) and maintainers
//! read the catalog through different visibility rules, and each view has
//! its own notion of the latest version of an application.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Identifier  │────▶│   Catalog    │◀────│   Latest     │
//! │  (parsing)   │     │  (storage)   │     │  (pointers)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │                     │
//!                             ▼                     ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │    Bundle    │     │   Version    │
//!                      │  (URLs)      │     │  (ordering)  │
//!                      └──────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`identifier`]: the `appId[:version|latest|all]` token grammar
//! - [`version`]: dotted numeric version ordering
//! - [`catalog`]: the version relation, mutations, and latest recomputation
//! - [`bundle`]: retrieval URL construction for native and web bundles
//! - [`config`]: deployment configuration and data-dir helpers

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod identifier;
pub mod version;
