//! Marquee Store - Record store backends for the Marquee catalog
//!
//! Defines the [`RecordStore`] trait the server reads and writes
//! through, plus the in-process [`MemoryStore`] backend. The store owns
//! the records; caching happens a layer above and is invisible here.

pub mod error;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::RecordStore;

// Re-export core so backends and server agree on domain types.
pub use marquee_core;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
