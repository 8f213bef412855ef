//! Movie records and query result sets.

use serde::{Deserialize, Serialize};

use crate::types::{Genre, MovieId};

/// A single movie record.
///
/// The persistent store is the sole owner of records; the cache only
/// ever holds serialized copies inside a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Unique identifier.
    pub id: MovieId,

    /// Display title.
    pub title: String,

    /// Genres, normalized to lowercase.
    pub genres: Vec<Genre>,

    /// Release year.
    pub year: u16,

    /// Average rating, 0.0 to 10.0.
    pub rating: f32,

    /// Free-text description.
    pub description: String,

    /// Popularity score used by the popular/recommendations windows.
    pub popularity: f64,
}

/// The materialized answer to a query descriptor.
///
/// An empty result set is a perfectly valid answer and is cached like
/// any other; an offset past the end of the collection yields
/// `items: []` with the real `total`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Records in this page, already sorted and windowed.
    pub items: Vec<MovieRecord>,

    /// Total number of records matching the filters, before pagination.
    pub total: usize,

    /// Offset this page was taken at.
    pub offset: usize,

    /// Limit this page was taken with.
    pub limit: usize,
}

impl ResultSet {
    /// Creates an empty result set for the given window.
    pub fn empty(offset: usize, limit: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            offset,
            limit,
        }
    }

    /// Returns true if the page holds no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of records in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
