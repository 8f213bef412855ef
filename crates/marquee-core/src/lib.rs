//! Marquee Core - Domain types and the query engine
//!
//! This crate provides the foundational types for the Marquee catalog
//! server: movie records, normalized query descriptors, and the error
//! taxonomy shared by the store and server crates. Everything here is
//! pure; no I/O happens below this line.

pub mod error;
pub mod query;
pub mod record;
pub mod types;

pub use error::{CatalogError, Result};
pub use query::{QueryDescriptor, QueryLimits, QueryParams, normalize};
pub use record::{MovieRecord, ResultSet};
pub use types::{Genre, MovieId, Page, QueryKind, SortOrder, YearRange};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
