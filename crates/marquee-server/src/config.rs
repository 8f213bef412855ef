//! Server configuration.
//!
//! Se resuelve en capas: defaults compilados, luego un `marquee.toml`
//! opcional, luego variables de entorno con prefijo `MARQUEE` (p.ej.
//! `MARQUEE__SERVER__PORT=9000`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use marquee_core::QueryLimits;

use crate::cache::{CoordinatorConfig, MokaStoreConfig, TtlPolicy};

/// Configuracion completa del servidor.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub cache: CacheConfig,
    pub query: QueryConfig,
    pub catalog: CatalogConfig,
}

/// Bind address del servidor HTTP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Parametros del cache coordinator y su backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximo numero de entries en el backend.
    pub max_capacity: u64,
    /// TTL en segundos para list/search.
    pub collection_ttl_secs: u64,
    /// TTL en segundos para get-by-id.
    pub record_ttl_secs: u64,
    /// TTL en segundos para popular/recommendations.
    pub featured_ttl_secs: u64,
    /// Timeout en millis para la llamada al store.
    pub store_timeout_ms: u64,
    /// Timeout en millis de espera single-flight.
    pub single_flight_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            collection_ttl_secs: 60,
            record_ttl_secs: 120,
            featured_ttl_secs: 600,
            store_timeout_ms: 5_000,
            single_flight_timeout_ms: 10_000,
        }
    }
}

/// Limites de normalizacion de queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub max_search_len: usize,
    pub max_page_size: usize,
    pub default_page_size: usize,
    pub featured_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let limits = QueryLimits::default();
        Self {
            max_search_len: limits.max_search_len,
            max_page_size: limits.max_page_size,
            default_page_size: limits.default_page_size,
            featured_limit: limits.featured_limit,
        }
    }
}

/// Origen de datos del catalogo.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Archivo JSON opcional con records iniciales.
    pub seed_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Carga la configuracion: defaults + archivo opcional + entorno.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("marquee").required(false))
            .add_source(Environment::with_prefix("MARQUEE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Direccion de bind del servidor.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Limites para [`marquee_core::normalize`].
    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            max_search_len: self.query.max_search_len,
            max_page_size: self.query.max_page_size,
            default_page_size: self.query.default_page_size,
            featured_limit: self.query.featured_limit,
        }
    }

    /// Configuracion del coordinator derivada de la seccion de cache.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            ttl: TtlPolicy {
                list: Duration::from_secs(self.cache.collection_ttl_secs),
                search: Duration::from_secs(self.cache.collection_ttl_secs),
                get_by_id: Duration::from_secs(self.cache.record_ttl_secs),
                popular: Duration::from_secs(self.cache.featured_ttl_secs),
                recommendations: Duration::from_secs(self.cache.featured_ttl_secs),
            },
            store_timeout: Duration::from_millis(self.cache.store_timeout_ms),
            single_flight_timeout: Duration::from_millis(self.cache.single_flight_timeout_ms),
        }
    }

    /// Configuracion del backend Moka.
    pub fn moka_config(&self) -> MokaStoreConfig {
        MokaStoreConfig {
            max_capacity: self.cache.max_capacity,
        }
    }
}
