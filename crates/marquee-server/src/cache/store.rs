//! Cache client abstraction and the Moka-backed implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use thiserror::Error;

use crate::cache::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// Error del cache client.
///
/// Nunca es fatal para un request: el coordinator degrada a lecturas
/// directas del store cuando el cache no responde.
#[derive(Debug, Clone, Error)]
pub enum CacheStoreError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Interfaz hacia el key/value cache externo.
///
/// Best-effort y no transaccional: el backend puede evictar antes del
/// TTL y eso se trata como un miss ordinario. Los valores son bytes
/// opacos; el envelope se define en [`crate::cache::entry`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Busca un valor. `None` significa ausente o evictado.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError>;

    /// Escribe un valor con el TTL dado.
    async fn set(&self, key: CacheKey, value: Vec<u8>, ttl: Duration)
    -> Result<(), CacheStoreError>;

    /// Elimina una entrada.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheStoreError>;

    /// Elimina todas las entradas.
    async fn clear(&self) -> Result<(), CacheStoreError>;

    /// Numero aproximado de entradas.
    fn entry_count(&self) -> u64;
}

#[derive(Clone)]
struct TimedValue {
    bytes: Arc<Vec<u8>>,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<CacheKey, TimedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &TimedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Configuracion del backend Moka.
#[derive(Debug, Clone)]
pub struct MokaStoreConfig {
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
}

impl Default for MokaStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// Cache client in-process usando Moka.
/// Thread-safe y async-friendly.
///
/// Cada entrada lleva su propio TTL (distintos kinds de query usan
/// distintos TTLs), de ahi el `Expiry` por entrada en lugar del
/// `time_to_live` global del builder.
#[derive(Clone)]
pub struct MokaStore {
    inner: Cache<CacheKey, TimedValue>,
}

impl MokaStore {
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: MokaStoreConfig, metrics: CacheMetrics) -> Self {
        let eviction_metrics = metrics;
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryExpiry)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "ttl",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self { inner }
    }

    /// Fuerza la limpieza de entradas pendientes (tests).
    #[cfg(test)]
    pub(crate) async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError> {
        Ok(self.inner.get(key).await.map(|v| v.bytes.as_ref().clone()))
    }

    async fn set(
        &self,
        key: CacheKey,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let value = TimedValue {
            bytes: Arc::new(value),
            ttl,
        };
        self.inner.insert(key, value).await;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheStoreError> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheStoreError> {
        self.inner.invalidate_all();
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}
