//! Invalidation tags and the tag-to-keys registry.
//!
//! Una escritura no enumera las queries derivadas que toca; emite tags
//! gruesos y el registry sabe que keys estan registradas bajo cada tag.
//! Cada tag lleva ademas un contador de generacion monotonica: el
//! coordinator toma un snapshot antes de ir al store y descarta el
//! populate si la generacion avanzo mientras tanto (un fetch lento no
//! puede resucitar una entrada ya invalidada).

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::RwLock;

use marquee_core::{MovieId, QueryDescriptor, QueryKind};

use crate::cache::keys::CacheKey;

/// Agrupacion gruesa para invalidacion en bloque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvalidationTag {
    /// Todas las queries a nivel coleccion (list/search/popular/recommendations).
    Collection,
    /// Entradas derivadas de un record especifico.
    Record(MovieId),
}

impl InvalidationTag {
    /// Tags que corresponden a un descriptor.
    ///
    /// Las queries de coleccion llevan el tag de coleccion; un
    /// get-by-id lleva ademas el tag de su record.
    pub fn for_descriptor(descriptor: &QueryDescriptor) -> Vec<Self> {
        match descriptor.kind() {
            QueryKind::GetById => match descriptor.record_id() {
                Some(id) => vec![Self::Collection, Self::Record(id)],
                None => vec![Self::Collection],
            },
            _ => vec![Self::Collection],
        }
    }
}

impl fmt::Display for InvalidationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => write!(f, "movies:all"),
            Self::Record(id) => write!(f, "movie:{}", id),
        }
    }
}

#[derive(Debug, Default)]
struct TagState {
    generation: u64,
    keys: HashSet<CacheKey>,
}

/// Mapa tag -> {generacion, keys registradas}.
///
/// Estado compartido mutable del coordinator junto con el registro de
/// single-flight. Las mutaciones son secciones criticas cortas; nunca
/// se mantiene el lock a traves de I/O.
#[derive(Debug, Default)]
pub struct TagRegistry {
    inner: RwLock<HashMap<InvalidationTag, TagState>>,
}

impl TagRegistry {
    /// Crea un registry vacio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generacion actual del tag (0 si nunca se invalido ni registro).
    pub fn generation(&self, tag: &InvalidationTag) -> u64 {
        self.inner.read().get(tag).map_or(0, |s| s.generation)
    }

    /// Snapshot de generaciones para un conjunto de tags.
    pub fn snapshot(&self, tags: &[InvalidationTag]) -> Vec<(InvalidationTag, u64)> {
        let inner = self.inner.read();
        tags.iter()
            .map(|tag| (tag.clone(), inner.get(tag).map_or(0, |s| s.generation)))
            .collect()
    }

    /// Retorna true si ninguna generacion del snapshot avanzo.
    pub fn is_current(&self, snapshot: &[(InvalidationTag, u64)]) -> bool {
        let inner = self.inner.read();
        snapshot
            .iter()
            .all(|(tag, generation)| inner.get(tag).map_or(0, |s| s.generation) == *generation)
    }

    /// Registra una key bajo cada tag dado.
    pub fn register(&self, key: &CacheKey, tags: &[InvalidationTag]) {
        let mut inner = self.inner.write();
        for tag in tags {
            inner
                .entry(tag.clone())
                .or_default()
                .keys
                .insert(key.clone());
        }
    }

    /// Registra la key bajo los tags del snapshot solo si ninguna
    /// generacion avanzo desde que se tomo.
    ///
    /// Chequeo y registro ocurren en la misma seccion critica, de modo
    /// que una invalidacion concurrente no puede colarse entre ambos:
    /// o bien corre antes (y este registro se rechaza) o bien corre
    /// despues (y drena la key recien registrada).
    pub fn register_if_current(
        &self,
        key: &CacheKey,
        snapshot: &[(InvalidationTag, u64)],
    ) -> bool {
        let mut inner = self.inner.write();
        let current = snapshot
            .iter()
            .all(|(tag, generation)| inner.get(tag).map_or(0, |s| s.generation) == *generation);

        if current {
            for (tag, _) in snapshot {
                inner
                    .entry(tag.clone())
                    .or_default()
                    .keys
                    .insert(key.clone());
            }
        }
        current
    }

    /// Avanza la generacion del tag y drena sus keys registradas.
    ///
    /// Idempotente: invalidar un tag sin keys solo avanza la
    /// generacion y retorna vacio.
    pub fn begin_invalidation(&self, tag: &InvalidationTag) -> Vec<CacheKey> {
        let mut inner = self.inner.write();
        let state = inner.entry(tag.clone()).or_default();
        state.generation += 1;
        state.keys.drain().collect()
    }

    /// Avanza todas las generaciones y drena todas las keys.
    pub fn drain_all(&self) -> Vec<CacheKey> {
        let mut inner = self.inner.write();
        let mut keys = HashSet::new();
        for state in inner.values_mut() {
            state.generation += 1;
            keys.extend(state.keys.drain());
        }
        keys.into_iter().collect()
    }

    /// Numero de keys registradas bajo el tag.
    pub fn key_count(&self, tag: &InvalidationTag) -> usize {
        self.inner.read().get(tag).map_or(0, |s| s.keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{QueryLimits, QueryParams, normalize};

    fn key(name: &str) -> CacheKey {
        let desc = normalize(
            QueryKind::Search,
            QueryParams {
                q: Some(name.to_string()),
                ..Default::default()
            },
            &QueryLimits::default(),
        )
        .unwrap();
        CacheKey::from_descriptor(&desc)
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(InvalidationTag::Collection.to_string(), "movies:all");

        let id = MovieId::new();
        assert_eq!(
            InvalidationTag::Record(id).to_string(),
            format!("movie:{}", id)
        );
    }

    #[test]
    fn test_collection_descriptor_gets_collection_tag() {
        let desc = normalize(
            QueryKind::List,
            QueryParams::default(),
            &QueryLimits::default(),
        )
        .unwrap();

        assert_eq!(
            InvalidationTag::for_descriptor(&desc),
            vec![InvalidationTag::Collection]
        );
    }

    #[test]
    fn test_get_by_id_descriptor_gets_both_tags() {
        let id = MovieId::new();
        let desc = QueryDescriptor::get_by_id(id);

        assert_eq!(
            InvalidationTag::for_descriptor(&desc),
            vec![InvalidationTag::Collection, InvalidationTag::Record(id)]
        );
    }

    #[test]
    fn test_invalidation_bumps_generation_and_drains() {
        let registry = TagRegistry::new();
        let tag = InvalidationTag::Collection;

        registry.register(&key("a"), std::slice::from_ref(&tag));
        registry.register(&key("b"), std::slice::from_ref(&tag));
        assert_eq!(registry.key_count(&tag), 2);
        assert_eq!(registry.generation(&tag), 0);

        let drained = registry.begin_invalidation(&tag);
        assert_eq!(drained.len(), 2);
        assert_eq!(registry.generation(&tag), 1);
        assert_eq!(registry.key_count(&tag), 0);

        // Idempotente: repetir solo avanza la generacion
        let drained = registry.begin_invalidation(&tag);
        assert!(drained.is_empty());
        assert_eq!(registry.generation(&tag), 2);
    }

    #[test]
    fn test_snapshot_detects_advanced_generation() {
        let registry = TagRegistry::new();
        let tags = vec![InvalidationTag::Collection];

        let snapshot = registry.snapshot(&tags);
        assert!(registry.is_current(&snapshot));

        registry.begin_invalidation(&InvalidationTag::Collection);
        assert!(!registry.is_current(&snapshot));
    }

    #[test]
    fn test_snapshot_with_unrelated_tag_stays_current() {
        let registry = TagRegistry::new();
        let id = MovieId::new();
        let snapshot = registry.snapshot(&[InvalidationTag::Record(id)]);

        registry.begin_invalidation(&InvalidationTag::Record(MovieId::new()));
        assert!(registry.is_current(&snapshot));
    }

    #[test]
    fn test_register_if_current_rejects_stale_snapshot() {
        let registry = TagRegistry::new();
        let tag = InvalidationTag::Collection;

        let snapshot = registry.snapshot(std::slice::from_ref(&tag));
        registry.begin_invalidation(&tag);

        assert!(!registry.register_if_current(&key("a"), &snapshot));
        assert_eq!(registry.key_count(&tag), 0);

        let fresh = registry.snapshot(std::slice::from_ref(&tag));
        assert!(registry.register_if_current(&key("a"), &fresh));
        assert_eq!(registry.key_count(&tag), 1);
    }

    #[test]
    fn test_drain_all() {
        let registry = TagRegistry::new();
        let id = MovieId::new();

        registry.register(&key("a"), &[InvalidationTag::Collection]);
        registry.register(&key("b"), &[InvalidationTag::Record(id)]);

        let drained = registry.drain_all();
        assert_eq!(drained.len(), 2);
        assert_eq!(registry.generation(&InvalidationTag::Collection), 1);
        assert_eq!(registry.generation(&InvalidationTag::Record(id)), 1);
    }
}
