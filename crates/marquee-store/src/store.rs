//! Record store trait definition.

use async_trait::async_trait;

use marquee_core::{MovieId, MovieRecord, QueryDescriptor, ResultSet};

use crate::error::StoreError;

/// A source of movie records.
///
/// This trait abstracts over different persistence backends (in-memory,
/// document database, remote API) so the server can read and mutate the
/// catalog without knowing the underlying storage. Retry and backoff
/// policy belongs to implementations of this trait, never to callers.
///
/// # Implementors
///
/// - `MemoryStore` - In-process document store, also used in tests
/// - (Future) `MongoStore` - Document database backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Executes a normalized query and returns the matching page.
    ///
    /// An offset past the end of the collection returns an empty
    /// `ResultSet`, not an error.
    async fn find(&self, descriptor: &QueryDescriptor) -> Result<ResultSet, StoreError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateRecord` if the id is already present
    async fn insert(&self, record: MovieRecord) -> Result<(), StoreError>;

    /// Replaces an existing record.
    ///
    /// # Errors
    ///
    /// - `StoreError::RecordNotFound` if no record has this id
    async fn update(&self, record: MovieRecord) -> Result<(), StoreError>;

    /// Deletes a record by id.
    ///
    /// # Errors
    ///
    /// - `StoreError::RecordNotFound` if no record has this id
    async fn delete(&self, id: MovieId) -> Result<(), StoreError>;

    /// Performs a health check on the store.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Returns the name of this store, for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{QueryKind, QueryLimits, QueryParams, normalize};

    struct EmptySource {
        name: String,
    }

    #[async_trait]
    impl RecordStore for EmptySource {
        async fn find(&self, descriptor: &QueryDescriptor) -> Result<ResultSet, StoreError> {
            let page = descriptor.page();
            Ok(ResultSet::empty(page.offset, page.limit))
        }

        async fn insert(&self, _record: MovieRecord) -> Result<(), StoreError> {
            Ok(())
        }

        async fn update(&self, record: MovieRecord) -> Result<(), StoreError> {
            Err(StoreError::not_found(record.id))
        }

        async fn delete(&self, id: MovieId) -> Result<(), StoreError> {
            Err(StoreError::not_found(id))
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let store: Box<dyn RecordStore> = Box::new(EmptySource {
            name: "empty".to_string(),
        });

        let desc = normalize(
            QueryKind::List,
            QueryParams::default(),
            &QueryLimits::default(),
        )
        .unwrap();

        let result = store.find(&desc).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(store.name(), "empty");
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_mutations_surface_not_found() {
        let store = EmptySource {
            name: "empty".to_string(),
        };

        let err = store.delete(MovieId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
