//! In-process document store backend.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use marquee_core::{Genre, MovieId, MovieRecord, QueryDescriptor, QueryKind, ResultSet, SortOrder};

use crate::error::StoreError;
use crate::store::RecordStore;

/// An in-process record store.
///
/// Holds the whole catalog behind a `RwLock`ed map and evaluates
/// queries over a snapshot of the values. This is the default backend
/// for development and the store double used by the server tests; it
/// implements the full query surface (filters, sorting, pagination,
/// popular and recommendations windows) so the layers above never need
/// to know which backend answered.
pub struct MemoryStore {
    records: RwLock<HashMap<MovieId, MovieRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store pre-populated with the given records.
    pub fn with_records(records: Vec<MovieRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn get_by_id(&self, id: MovieId) -> Result<ResultSet, StoreError> {
        let records = self.records.read();
        let record = records.get(&id).ok_or_else(|| StoreError::not_found(id))?;

        Ok(ResultSet {
            items: vec![record.clone()],
            total: 1,
            offset: 0,
            limit: 1,
        })
    }

    /// Evaluates a collection query over a snapshot of the catalog.
    ///
    /// A record matches the genre filter if it carries at least one of
    /// the requested genres.
    fn find_collection(&self, descriptor: &QueryDescriptor) -> ResultSet {
        let snapshot: Vec<MovieRecord> = self.records.read().values().cloned().collect();

        let mut matches: Vec<MovieRecord> = snapshot
            .into_iter()
            .filter(|record| matches_filters(record, descriptor))
            .collect();

        match descriptor.kind() {
            QueryKind::Recommendations => {
                rank_by_affinity(&mut matches);
            },
            _ => sort_records(&mut matches, descriptor.sort()),
        }

        let total = matches.len();
        let page = descriptor.page();
        let items: Vec<MovieRecord> = matches
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();

        ResultSet {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filters(record: &MovieRecord, descriptor: &QueryDescriptor) -> bool {
    if let Some(q) = descriptor.search_text() {
        let in_title = record.title.to_lowercase().contains(q);
        let in_description = record.description.to_lowercase().contains(q);
        if !in_title && !in_description {
            return false;
        }
    }

    if !descriptor.genres().is_empty() {
        let any = descriptor
            .genres()
            .iter()
            .any(|g| record.genres.contains(g));
        if !any {
            return false;
        }
    }

    if let Some(years) = descriptor.years() {
        if !years.contains(record.year) {
            return false;
        }
    }

    true
}

fn sort_records(records: &mut [MovieRecord], sort: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match sort {
            SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOrder::Year => b.year.cmp(&a.year),
            SortOrder::Rating => b.rating.total_cmp(&a.rating),
            SortOrder::Popularity => b.popularity.total_cmp(&a.popularity),
        };
        // Ties resuelven por titulo para mantener el orden estable
        ordering.then_with(|| a.title.cmp(&b.title))
    });
}

/// Ranks records for the global recommendations window.
///
/// Each genre is weighted by the total popularity of the records that
/// carry it; a record's score is its rating scaled by the share of the
/// catalog's popularity its genres cover. Deterministic over the same
/// catalog contents.
fn rank_by_affinity(records: &mut [MovieRecord]) {
    let mut genre_weight: HashMap<Genre, f64> = HashMap::new();
    let mut total_weight = 0.0_f64;

    for record in records.iter() {
        for genre in &record.genres {
            *genre_weight.entry(genre.clone()).or_insert(0.0) += record.popularity;
            total_weight += record.popularity;
        }
    }

    let score = |record: &MovieRecord| -> f64 {
        if total_weight == 0.0 {
            return f64::from(record.rating);
        }
        let affinity: f64 = record
            .genres
            .iter()
            .map(|g| genre_weight.get(g).copied().unwrap_or(0.0))
            .sum();
        f64::from(record.rating) * (1.0 + affinity / total_weight)
    };

    records.sort_by(|a, b| {
        score(b)
            .total_cmp(&score(a))
            .then_with(|| a.title.cmp(&b.title))
    });
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, descriptor: &QueryDescriptor) -> Result<ResultSet, StoreError> {
        debug!("Evaluating query {}", descriptor);

        match descriptor.kind() {
            QueryKind::GetById => {
                let id = descriptor.record_id().ok_or_else(|| {
                    StoreError::InvalidConfig("get-by-id descriptor without id".to_string())
                })?;
                self.get_by_id(id)
            },
            _ => Ok(self.find_collection(descriptor)),
        }
    }

    async fn insert(&self, record: MovieRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(StoreError::duplicate(record.id));
        }

        debug!(id = %record.id, title = %record.title, "Record inserted");
        records.insert(record.id, record);
        Ok(())
    }

    async fn update(&self, record: MovieRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if !records.contains_key(&record.id) {
            return Err(StoreError::not_found(record.id));
        }

        debug!(id = %record.id, "Record updated");
        records.insert(record.id, record);
        Ok(())
    }

    async fn delete(&self, id: MovieId) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.remove(&id).is_none() {
            return Err(StoreError::not_found(id));
        }

        debug!(id = %id, "Record deleted");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{QueryLimits, QueryParams, normalize};

    fn movie(title: &str, genres: &[&str], year: u16, rating: f32, popularity: f64) -> MovieRecord {
        MovieRecord {
            id: MovieId::new(),
            title: title.to_string(),
            genres: genres.iter().map(|g| Genre::new(*g)).collect(),
            year,
            rating,
            description: format!("About {}", title),
            popularity,
        }
    }

    fn seeded() -> MemoryStore {
        MemoryStore::with_records(vec![
            movie("Dune", &["sci-fi", "adventure"], 2021, 8.1, 95.0),
            movie("Arrival", &["sci-fi", "drama"], 2016, 7.9, 70.0),
            movie("Heat", &["crime", "drama"], 1995, 8.3, 60.0),
            movie("Amelie", &["comedy", "romance"], 2001, 8.3, 40.0),
        ])
    }

    fn descriptor(kind: QueryKind, params: QueryParams) -> QueryDescriptor {
        normalize(kind, params, &QueryLimits::default()).unwrap()
    }

    #[tokio::test]
    async fn test_list_sorted_by_title() {
        let store = seeded();
        let desc = descriptor(QueryKind::List, QueryParams::default());

        let result = store.find(&desc).await.unwrap();

        assert_eq!(result.total, 4);
        let titles: Vec<&str> = result.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Amelie", "Arrival", "Dune", "Heat"]);
    }

    #[tokio::test]
    async fn test_search_matches_title_and_description() {
        let store = seeded();
        let desc = descriptor(
            QueryKind::Search,
            QueryParams {
                q: Some("DUNE".to_string()),
                ..Default::default()
            },
        );

        let result = store.find(&desc).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_search_no_match_is_empty_not_error() {
        let store = seeded();
        let desc = descriptor(
            QueryKind::Search,
            QueryParams {
                q: Some("zz-no-match".to_string()),
                ..Default::default()
            },
        );

        let result = store.find(&desc).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_genre_filter_any_of() {
        let store = seeded();
        let desc = descriptor(
            QueryKind::List,
            QueryParams {
                genre: vec!["sci-fi".into(), "crime".into()],
                ..Default::default()
            },
        );

        let result = store.find(&desc).await.unwrap();
        assert_eq!(result.total, 3); // Dune, Arrival, Heat
    }

    #[tokio::test]
    async fn test_year_range_filter() {
        let store = seeded();
        let desc = descriptor(
            QueryKind::List,
            QueryParams {
                year_from: Some(2000),
                year_to: Some(2020),
                ..Default::default()
            },
        );

        let result = store.find(&desc).await.unwrap();
        let titles: Vec<&str> = result.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Amelie", "Arrival"]);
    }

    #[tokio::test]
    async fn test_offset_beyond_end_returns_empty_page() {
        let store = seeded();
        let desc = descriptor(
            QueryKind::List,
            QueryParams {
                offset: Some(100),
                ..Default::default()
            },
        );

        let result = store.find(&desc).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total, 4);
        assert_eq!(result.offset, 100);
    }

    #[tokio::test]
    async fn test_popular_orders_by_popularity() {
        let store = seeded();
        let desc = descriptor(QueryKind::Popular, QueryParams::default());

        let result = store.find(&desc).await.unwrap();
        let titles: Vec<&str> = result.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles[0], "Dune");
        assert_eq!(titles[1], "Arrival");
    }

    #[tokio::test]
    async fn test_recommendations_are_deterministic() {
        let store = seeded();
        let desc = descriptor(QueryKind::Recommendations, QueryParams::default());

        let a = store.find(&desc).await.unwrap();
        let b = store.find(&desc).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.total, 4);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let record = movie("Solaris", &["sci-fi"], 1972, 8.0, 30.0);
        let id = record.id;
        let store = MemoryStore::with_records(vec![record]);

        let result = store.find(&QueryDescriptor::get_by_id(id)).await.unwrap();
        assert_eq!(result.items[0].title, "Solaris");

        let err = store
            .find(&QueryDescriptor::get_by_id(MovieId::new()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let store = MemoryStore::new();
        let record = movie("Dune", &["sci-fi"], 2021, 8.1, 95.0);

        store.insert(record.clone()).await.unwrap();
        let err = store.insert(record).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateRecord(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_lifecycle() {
        let store = MemoryStore::new();
        let mut record = movie("Dune", &["sci-fi"], 2021, 8.1, 95.0);
        let id = record.id;

        store.insert(record.clone()).await.unwrap();

        record.year = 2024;
        store.update(record).await.unwrap();

        let found = store.find(&QueryDescriptor::get_by_id(id)).await.unwrap();
        assert_eq!(found.items[0].year, 2024);

        store.delete(id).await.unwrap();
        assert!(store.is_empty());

        let err = store.delete(id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
