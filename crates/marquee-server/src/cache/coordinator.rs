//! The cache coordinator: read-through, single-flight, invalidation.
//!
//! Unica autoridad sobre que se sirve desde cache y que va al store.
//! Todo el estado compartido mutable del core vive aqui: el registro
//! de fetches in-flight y el [`TagRegistry`]. Ningun lock se mantiene
//! a traves de una llamada al store o al cache client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use marquee_core::{MovieId, QueryDescriptor, QueryKind, ResultSet};
use marquee_store::{RecordStore, StoreError};

use crate::cache::entry::CacheEntry;
use crate::cache::keys::CacheKey;
use crate::cache::store::CacheStore;
use crate::cache::tags::{InvalidationTag, TagRegistry};
use crate::metrics::CacheMetrics;

/// Error de un fetch coordinado.
///
/// Clonable porque el resultado del lider se propaga por broadcast a
/// todos los waiters del grupo single-flight.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// El store fallo; se propaga tal cual, nunca se cachea.
    #[error("store error: {0}")]
    Store(Arc<StoreError>),

    /// El fetch supero su timeout.
    #[error("fetch timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Fallo interno del mecanismo de coordinacion.
    #[error("fetch failed: {0}")]
    Internal(String),
}

impl FetchError {
    /// Returns true si el error subyacente es un not-found del store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

/// Resultado de una operacion de invalidacion.
#[derive(Debug, Clone)]
pub struct InvalidationResult {
    /// Numero de entries eliminadas del cache.
    pub count: usize,
    /// Tags invalidados.
    pub tags: Vec<String>,
}

/// TTL por kind de operacion.
///
/// Popular y recommendations viven mas que las busquedas: sus results
/// cambian lento y son los endpoints mas golpeados.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    pub list: Duration,
    pub search: Duration,
    pub get_by_id: Duration,
    pub popular: Duration,
    pub recommendations: Duration,
}

impl TtlPolicy {
    /// TTL configurado para el kind dado.
    pub fn for_kind(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::List => self.list,
            QueryKind::Search => self.search,
            QueryKind::GetById => self.get_by_id,
            QueryKind::Popular => self.popular,
            QueryKind::Recommendations => self.recommendations,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(60),
            search: Duration::from_secs(60),
            get_by_id: Duration::from_secs(120),
            popular: Duration::from_secs(600),
            recommendations: Duration::from_secs(600),
        }
    }
}

/// Configuracion del coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// TTLs por kind.
    pub ttl: TtlPolicy,
    /// Timeout para la llamada al store del lider.
    pub store_timeout: Duration,
    /// Timeout de espera de un waiter single-flight.
    pub single_flight_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ttl: TtlPolicy::default(),
            store_timeout: Duration::from_secs(5),
            single_flight_timeout: Duration::from_secs(10),
        }
    }
}

type FetchOutcome = Result<Arc<ResultSet>, FetchError>;

enum FlightRole {
    Leader(broadcast::Sender<FetchOutcome>),
    Waiter(broadcast::Receiver<FetchOutcome>),
}

/// Coordinador de lecturas cacheadas.
pub struct CacheCoordinator {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheStore>,
    tags: TagRegistry,
    inflight: Mutex<HashMap<CacheKey, broadcast::Sender<FetchOutcome>>>,
    config: CoordinatorConfig,
    metrics: CacheMetrics,
}

impl CacheCoordinator {
    /// Crea un coordinator sobre el store y cache client dados.
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheStore>,
        config: CoordinatorConfig,
        metrics: CacheMetrics,
    ) -> Self {
        Self {
            store,
            cache,
            tags: TagRegistry::new(),
            inflight: Mutex::new(HashMap::new()),
            config,
            metrics,
        }
    }

    /// Resuelve un descriptor: cache hit, o fetch single-flight al store.
    ///
    /// Entre N fetches concurrentes con el mismo descriptor exactamente
    /// uno (el lider) invoca al store; el resto espera y recibe el
    /// mismo resultado o el mismo error. Los fallos del store nunca se
    /// cachean y nunca se reintentan aqui.
    pub async fn fetch(&self, descriptor: &QueryDescriptor) -> FetchOutcome {
        let key = CacheKey::from_descriptor(descriptor);
        let start = Instant::now();

        if let Some(hit) = self.cache_lookup(&key).await {
            self.metrics.record_hit();
            self.metrics
                .record_operation_duration("fetch_hit", start.elapsed());
            return Ok(hit);
        }

        let role = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(&key) {
                Some(sender) => FlightRole::Waiter(sender.subscribe()),
                None => {
                    let (sender, _) = broadcast::channel(1);
                    inflight.insert(key.clone(), sender.clone());
                    FlightRole::Leader(sender)
                },
            }
        };

        match role {
            FlightRole::Waiter(mut receiver) => {
                self.metrics.record_miss();
                let wait = self.config.single_flight_timeout;
                match timeout(wait, receiver.recv()).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(_)) => Err(FetchError::Internal(
                        "single-flight leader dropped without result".to_string(),
                    )),
                    // El waiter recibe timeout aunque el fetch del lider
                    // termine mas tarde fuera de banda.
                    Err(_) => Err(FetchError::Timeout {
                        millis: wait.as_millis() as u64,
                    }),
                }
            },
            FlightRole::Leader(sender) => {
                // Re-chequeo: otro lider pudo poblar el cache entre
                // nuestro miss y la toma de liderazgo. Cada fetch se
                // contabiliza una sola vez, por su resultado final.
                let outcome = match self.cache_lookup(&key).await {
                    Some(hit) => {
                        self.metrics.record_hit();
                        Ok(hit)
                    },
                    None => {
                        self.metrics.record_miss();
                        self.load_and_populate(descriptor, &key).await
                    },
                };

                {
                    let mut inflight = self.inflight.lock().await;
                    inflight.remove(&key);
                }
                // Sin waiters el send falla; es el caso normal.
                let _ = sender.send(outcome.clone());

                self.metrics
                    .record_operation_duration("fetch_miss", start.elapsed());
                outcome
            },
        }
    }

    /// Elimina toda entrada registrada bajo el tag.
    ///
    /// Avanza primero la generacion del tag, de modo que cualquier
    /// fetch que arranco antes de esta invalidacion descarte su write.
    pub async fn invalidate(&self, tag: &InvalidationTag) -> InvalidationResult {
        let keys = self.tags.begin_invalidation(tag);
        let count = self.delete_keys(keys).await;
        self.metrics.record_invalidation(&tag.to_string(), count);

        info!(tag = %tag, count = count, "Cache entries invalidated");

        InvalidationResult {
            count,
            tags: vec![tag.to_string()],
        }
    }

    /// Invalida el tag del record y el tag de coleccion, en ese orden.
    pub async fn invalidate_record(&self, id: MovieId) -> InvalidationResult {
        let record = self.invalidate(&InvalidationTag::Record(id)).await;
        let collection = self.invalidate(&InvalidationTag::Collection).await;

        InvalidationResult {
            count: record.count + collection.count,
            tags: record.tags.into_iter().chain(collection.tags).collect(),
        }
    }

    /// Invalida todo el cache y resetea el registry.
    pub async fn invalidate_all(&self) -> InvalidationResult {
        let drained = self.tags.drain_all();
        let count = drained.len();

        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Cache clear failed; entries remain bounded by TTL");
        }

        info!(count = count, "All cache entries invalidated");

        InvalidationResult {
            count,
            tags: vec!["*".to_string()],
        }
    }

    /// Numero aproximado de entries en el cache client.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Lookup con chequeo de frescura propio.
    ///
    /// Un error del cache client degrada a lectura directa del store:
    /// se loggea y se responde como miss, jamas se falla el request.
    async fn cache_lookup(&self, key: &CacheKey) -> Option<Arc<ResultSet>> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache unavailable, degrading to store reads");
                return None;
            },
        };

        match CacheEntry::from_bytes(&bytes) {
            Ok(entry) if !entry.is_expired(SystemTime::now()) => {
                Some(Arc::new(entry.into_payload()))
            },
            Ok(_) => {
                // Expirada pero no evictada por el backend: ausente.
                debug!(key = %key, "Cache entry past TTL, treating as absent");
                if let Err(e) = self.cache.delete(key).await {
                    warn!(key = %key, error = %e, "Failed to drop expired entry");
                }
                None
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt cache entry, dropping");
                if let Err(e) = self.cache.delete(key).await {
                    warn!(key = %key, error = %e, "Failed to drop corrupt entry");
                }
                None
            },
        }
    }

    /// Fetch del lider: store con timeout, populate con chequeo de
    /// generacion, registro de tags.
    async fn load_and_populate(&self, descriptor: &QueryDescriptor, key: &CacheKey) -> FetchOutcome {
        let tags = InvalidationTag::for_descriptor(descriptor);
        let snapshot = self.tags.snapshot(&tags);

        let started = Instant::now();
        let fetched = timeout(self.config.store_timeout, self.store.find(descriptor)).await;
        self.metrics
            .record_operation_duration("store_fetch", started.elapsed());

        let result_set = match fetched {
            Ok(Ok(rs)) => rs,
            Ok(Err(e)) => return Err(FetchError::Store(Arc::new(e))),
            Err(_) => {
                return Err(FetchError::Timeout {
                    millis: self.config.store_timeout.as_millis() as u64,
                });
            },
        };

        let shared = Arc::new(result_set);

        if self.tags.is_current(&snapshot) {
            let ttl = self.config.ttl.for_kind(descriptor.kind());
            let generations = snapshot
                .iter()
                .map(|(tag, generation)| (tag.to_string(), *generation))
                .collect();
            let entry = CacheEntry::new((*shared).clone(), ttl, generations);

            match entry.to_bytes() {
                Ok(bytes) => match self.cache.set(key.clone(), bytes, ttl).await {
                    Ok(()) => {
                        // Re-chequeo y registro en una sola seccion
                        // critica: una invalidacion que completo durante
                        // el set ya dreno sus keys sin esta entrada, asi
                        // que la entrada stale se borra en vez de quedar
                        // huerfana en el cache.
                        if self.tags.register_if_current(key, &snapshot) {
                            self.metrics.update_entry_count(self.cache.entry_count());
                        } else {
                            debug!(key = %key, "Tag generation advanced during populate, dropping entry");
                            if let Err(e) = self.cache.delete(key).await {
                                warn!(key = %key, error = %e, "Failed to drop stale populate");
                            }
                        }
                    },
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cache populate failed; serving from store");
                    },
                },
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to serialize cache entry");
                },
            }
        } else {
            debug!(key = %key, "Tag generation advanced during fetch, discarding populate");
        }

        Ok(shared)
    }

    async fn delete_keys(&self, keys: Vec<CacheKey>) -> usize {
        let mut count = 0;
        for key in keys {
            match self.cache.delete(&key).await {
                Ok(()) => count += 1,
                Err(e) => {
                    // No fatal: la entrada queda acotada por su TTL.
                    warn!(key = %key, error = %e, "Invalidation delete failed");
                },
            }
        }
        self.metrics.update_entry_count(self.cache.entry_count());
        count
    }
}
