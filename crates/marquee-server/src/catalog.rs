//! Catalog service: orquesta normalizacion, coordinator y escrituras.
//!
//! Las lecturas pasan por el [`CacheCoordinator`]; las escrituras van
//! directo al store y despues invalidan los tags del record. La
//! invalidacion corre despues de confirmar la escritura, de modo que
//! un fetch posterior nunca re-cachea el estado previo.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use marquee_core::{
    CatalogError, MovieId, MovieRecord, QueryDescriptor, QueryKind, QueryLimits, QueryParams,
    ResultSet, normalize,
};
use marquee_store::{RecordStore, StoreError};

use crate::cache::{CacheCoordinator, FetchError, InvalidationResult};

/// Error de una operacion del catalogo.
#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error(transparent)]
    Validation(#[from] CatalogError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Servicio de catalogo compartido entre handlers.
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    coordinator: Arc<CacheCoordinator>,
    limits: QueryLimits,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        coordinator: Arc<CacheCoordinator>,
        limits: QueryLimits,
    ) -> Self {
        Self {
            store,
            coordinator,
            limits,
        }
    }

    /// Limites vigentes de normalizacion.
    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Normaliza parametros crudos a un descriptor canonico.
    pub fn describe(
        &self,
        kind: QueryKind,
        params: QueryParams,
    ) -> Result<QueryDescriptor, CatalogError> {
        normalize(kind, params, &self.limits)
    }

    /// Resuelve una query de coleccion via cache coordinator.
    pub async fn query(
        &self,
        kind: QueryKind,
        params: QueryParams,
    ) -> Result<Arc<ResultSet>, CatalogServiceError> {
        let descriptor = self.describe(kind, params)?;
        Ok(self.coordinator.fetch(&descriptor).await?)
    }

    /// Busca un record por id via cache coordinator.
    pub async fn get(&self, id: MovieId) -> Result<Arc<ResultSet>, CatalogServiceError> {
        let descriptor = QueryDescriptor::get_by_id(id);
        Ok(self.coordinator.fetch(&descriptor).await?)
    }

    /// Inserta un record y invalida sus tags.
    pub async fn create(&self, record: MovieRecord) -> Result<(), CatalogServiceError> {
        let id = record.id;
        self.store.insert(record).await?;
        self.invalidate_after_write(id).await;

        info!(id = %id, "Movie created");
        Ok(())
    }

    /// Actualiza un record existente y invalida sus tags.
    pub async fn update(&self, record: MovieRecord) -> Result<(), CatalogServiceError> {
        let id = record.id;
        self.store.update(record).await?;
        self.invalidate_after_write(id).await;

        info!(id = %id, "Movie updated");
        Ok(())
    }

    /// Elimina un record y invalida sus tags.
    pub async fn delete(&self, id: MovieId) -> Result<(), CatalogServiceError> {
        self.store.delete(id).await?;
        self.invalidate_after_write(id).await;

        info!(id = %id, "Movie deleted");
        Ok(())
    }

    /// Invalida el cache completo.
    pub async fn invalidate_all(&self) -> InvalidationResult {
        self.coordinator.invalidate_all().await
    }

    /// Invalida los tags de un record especifico.
    pub async fn invalidate_record(&self, id: MovieId) -> InvalidationResult {
        self.coordinator.invalidate_record(id).await
    }

    /// Health del store subyacente.
    pub async fn store_health(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    async fn invalidate_after_write(&self, id: MovieId) {
        // La escritura ya esta confirmada; una invalidacion fallida
        // deja entries acotadas por TTL, no un error para el caller.
        let result = self.coordinator.invalidate_record(id).await;
        if result.count > 0 {
            info!(id = %id, count = result.count, "Cache invalidated after write");
        }
    }
}

/// Carga records desde un archivo JSON de seed.
pub fn load_seed(path: &Path) -> Result<Vec<MovieRecord>, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let records: Vec<MovieRecord> = serde_json::from_slice(&bytes)?;

    if records.is_empty() {
        warn!(path = %path.display(), "Seed file contains no records");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::Genre;
    use marquee_store::MemoryStore;

    use crate::cache::{CoordinatorConfig, MokaStore, MokaStoreConfig};
    use crate::metrics::CacheMetrics;

    fn movie(title: &str, year: u16) -> MovieRecord {
        MovieRecord {
            id: MovieId::new(),
            title: title.to_string(),
            genres: vec![Genre::new("drama")],
            year,
            rating: 7.5,
            description: String::new(),
            popularity: 10.0,
        }
    }

    fn service_with(records: Vec<MovieRecord>) -> CatalogService {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::with_records(records));
        let metrics = CacheMetrics::new();
        let cache = Arc::new(MokaStore::new(MokaStoreConfig::default(), metrics.clone()));
        let coordinator = Arc::new(CacheCoordinator::new(
            Arc::clone(&store),
            cache,
            CoordinatorConfig::default(),
            metrics,
        ));
        CatalogService::new(store, coordinator, QueryLimits::default())
    }

    #[tokio::test]
    async fn test_query_list() {
        let service = service_with(vec![movie("Heat", 1995), movie("Ronin", 1998)]);

        let result = service
            .query(QueryKind::List, QueryParams::default())
            .await
            .unwrap();

        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service_with(vec![]);
        let record = movie("Dune", 2021);
        let id = record.id;

        service.create(record).await.unwrap();

        let result = service.get(id).await.unwrap();
        assert_eq!(result.items[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_update_is_visible_through_cache() {
        let mut record = movie("Dune", 2021);
        let id = record.id;
        let service = service_with(vec![record.clone()]);

        // Poblar el cache con el estado original
        let before = service.get(id).await.unwrap();
        assert!((before.items[0].rating - 7.5).abs() < f32::EPSILON);

        record.rating = 9.0;
        service.update(record).await.unwrap();

        // La invalidacion post-write garantiza leer el estado nuevo
        let after = service.get(id).await.unwrap();
        assert!((after.items[0].rating - 9.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let record = movie("Dune", 2021);
        let id = record.id;
        let service = service_with(vec![record]);

        service.get(id).await.unwrap();
        service.delete(id).await.unwrap();

        let err = service.get(id).await.unwrap_err();
        match err {
            CatalogServiceError::Fetch(e) => assert!(e.is_not_found()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let service = service_with(vec![]);

        let err = service.update(movie("Ghost", 1990)).await.unwrap_err();
        assert!(matches!(err, CatalogServiceError::Store(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_store() {
        let service = service_with(vec![]);

        let err = service
            .query(
                QueryKind::Search,
                QueryParams {
                    year_from: Some(2024),
                    year_to: Some(2020),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogServiceError::Validation(_)));
    }
}
