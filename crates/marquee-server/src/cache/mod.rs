//! Cache layer: key derivation, entry envelope, tag invalidation y el
//! coordinator que orquesta todo.

pub mod coordinator;
pub mod entry;
pub mod keys;
pub mod store;
pub mod tags;

pub use coordinator::{
    CacheCoordinator, CoordinatorConfig, FetchError, InvalidationResult, TtlPolicy,
};
pub use entry::CacheEntry;
pub use keys::CacheKey;
pub use store::{CacheStore, CacheStoreError, MokaStore, MokaStoreConfig};
pub use tags::{InvalidationTag, TagRegistry};
