//! Extractores de path y query string.

pub mod path;
pub mod query;

pub use path::MovieIdPath;
pub use query::MovieQuery;
