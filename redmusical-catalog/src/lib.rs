//! Music catalog data model types and release-date normalization.
//!
//! This crate defines the persistent data model for the catalog (artists,
//! albums, tracks, genres) and the fetch-task queue without any database
//! dependencies. Consumers pass these types to `redmusical-db` for persistence.

pub mod dates;
pub mod types;

pub use dates::{format_release_date, normalize_release_date};
pub use types::*;
