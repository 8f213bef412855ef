//! Serialized cache entry envelope.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use marquee_core::ResultSet;

/// Envelope que se serializa hacia el cache client.
///
/// El TTL viaja dentro del entry ademas de pasarse al backend: el
/// backend es best-effort y puede no haber expirado la entrada todavia,
/// asi que la frescura se decide aqui. Una entrada expirada se trata
/// como ausente aunque el backend la siga devolviendo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Momento de creacion, epoch millis.
    created_at_ms: u64,

    /// TTL en millis.
    ttl_ms: u64,

    /// Snapshot de generaciones de tags al momento del write,
    /// para correlacionar con invalidaciones.
    generations: Vec<(String, u64)>,

    /// Result set serializado.
    payload: ResultSet,
}

impl CacheEntry {
    /// Crea un entry con timestamp actual.
    pub fn new(payload: ResultSet, ttl: Duration, generations: Vec<(String, u64)>) -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            created_at_ms,
            ttl_ms: ttl.as_millis() as u64,
            generations,
            payload,
        }
    }

    /// Retorna true si el entry ya supero su TTL en el instante dado.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        let now_ms = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(u64::MAX);

        now_ms >= self.created_at_ms.saturating_add(self.ttl_ms)
    }

    /// Retorna el result set cacheado.
    pub fn into_payload(self) -> ResultSet {
        self.payload
    }

    /// Snapshot de generaciones registrado al escribir.
    pub fn generations(&self) -> &[(String, u64)] {
        &self.generations
    }

    /// Serializa el entry a bytes (JSON).
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserializa un entry desde bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    #[cfg(test)]
    pub(crate) fn with_created_at(mut self, created_at_ms: u64) -> Self {
        self.created_at_ms = created_at_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_ttl(ttl: Duration) -> CacheEntry {
        CacheEntry::new(ResultSet::empty(0, 10), ttl, vec![("movies:all".into(), 1)])
    }

    #[test]
    fn test_fresh_entry_is_not_expired() {
        let entry = entry_with_ttl(Duration::from_secs(60));
        assert!(!entry.is_expired(SystemTime::now()));
    }

    #[test]
    fn test_entry_expires_at_exact_ttl_boundary() {
        let entry = entry_with_ttl(Duration::from_millis(100)).with_created_at(1_000);

        let at_boundary = UNIX_EPOCH + Duration::from_millis(1_100);
        let before = UNIX_EPOCH + Duration::from_millis(1_099);

        assert!(entry.is_expired(at_boundary));
        assert!(!entry.is_expired(before));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let entry = entry_with_ttl(Duration::from_secs(30));
        let bytes = entry.to_bytes().unwrap();
        let back = CacheEntry::from_bytes(&bytes).unwrap();

        assert_eq!(entry, back);
        assert_eq!(back.generations(), &[("movies:all".to_string(), 1)]);
    }

    #[test]
    fn test_corrupt_bytes_fail_to_parse() {
        assert!(CacheEntry::from_bytes(b"not json").is_err());
    }
}
