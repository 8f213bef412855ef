//! Cache key derivation.

use std::fmt;

use marquee_core::QueryDescriptor;

/// Key unica para entradas de cache.
///
/// La key es el encoding canonico del descriptor, asi que dos queries
/// semanticamente identicas siempre producen la misma key. Toda la
/// normalizacion ocurre en el query engine, nunca aqui.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Deriva la key desde un descriptor normalizado.
    pub fn from_descriptor(descriptor: &QueryDescriptor) -> Self {
        Self(descriptor.cache_key())
    }

    /// Retorna la key como string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
