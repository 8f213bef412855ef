//! The query engine: raw request parameters to normalized descriptors.
//!
//! A [`QueryDescriptor`] is the immutable, canonical form of a read
//! request. Two requests that mean the same thing must normalize to the
//! same descriptor and therefore to the same cache key; this is the
//! property the cache coordinator relies on for key derivation, so all
//! normalization rules live here, in one pure function.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::types::{Genre, MovieId, Page, QueryKind, SortOrder, YearRange};

/// Raw, caller-supplied query parameters before normalization.
///
/// This is the shape HTTP query strings deserialize into. Every field
/// is optional; the query engine fills defaults, clamps bounds, and
/// rejects invalid combinations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Free-text search term (search endpoint only).
    pub q: Option<String>,

    /// Genre filters, any order, any casing.
    pub genre: Vec<String>,

    /// Lower release-year bound, inclusive.
    pub year_from: Option<u16>,

    /// Upper release-year bound, inclusive.
    pub year_to: Option<u16>,

    /// Pagination offset.
    pub offset: Option<usize>,

    /// Pagination limit. Clamped, never rejected.
    pub limit: Option<usize>,

    /// Sort order.
    pub sort: Option<SortOrder>,
}

/// Bounds the query engine enforces during normalization.
#[derive(Debug, Clone)]
pub struct QueryLimits {
    /// Maximum accepted search-text length in characters.
    pub max_search_len: usize,
    /// Upper bound for the pagination limit (clamp, not error).
    pub max_page_size: usize,
    /// Page size used when the caller does not provide one.
    pub default_page_size: usize,
    /// Fixed window size for the popular/recommendations endpoints.
    pub featured_limit: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_search_len: 256,
            max_page_size: 100,
            default_page_size: 20,
            featured_limit: 20,
        }
    }
}

/// Normalized, hashable representation of a read query.
///
/// Construction goes through [`normalize`] (collection kinds) or
/// [`QueryDescriptor::get_by_id`]; there is no way to build a
/// descriptor that skips normalization.
///
/// # Example
///
/// ```
/// use marquee_core::{QueryKind, QueryLimits, QueryParams, normalize};
///
/// let params = QueryParams {
///     q: Some("  DUNE ".to_string()),
///     genre: vec!["Sci-Fi".to_string(), "drama".to_string()],
///     ..Default::default()
/// };
///
/// let descriptor = normalize(QueryKind::Search, params, &QueryLimits::default()).unwrap();
/// assert_eq!(descriptor.search_text(), Some("dune"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    kind: QueryKind,
    search_text: Option<String>,
    genres: Vec<Genre>,
    years: Option<YearRange>,
    page: Page,
    sort: SortOrder,
    id: Option<MovieId>,
}

impl QueryDescriptor {
    /// Builds the descriptor for a single-record lookup.
    pub fn get_by_id(id: MovieId) -> Self {
        Self {
            kind: QueryKind::GetById,
            search_text: None,
            genres: Vec::new(),
            years: None,
            page: Page::new(0, 1),
            sort: SortOrder::Title,
            id: Some(id),
        }
    }

    /// Returns the operation kind.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Returns the normalized search text, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref()
    }

    /// Returns the genre filters, sorted and deduplicated.
    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// Returns the release-year filter, if any.
    pub fn years(&self) -> Option<YearRange> {
        self.years
    }

    /// Returns the pagination window.
    pub fn page(&self) -> Page {
        self.page
    }

    /// Returns the sort order.
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Returns the record id for get-by-id descriptors.
    pub fn record_id(&self) -> Option<MovieId> {
        self.id
    }

    /// Returns the canonical cache-key encoding of this descriptor.
    ///
    /// The encoding is byte-identical for semantically identical
    /// descriptors: search text is case-folded and trimmed, genres are
    /// sorted, and every field is emitted in a fixed order.
    pub fn cache_key(&self) -> String {
        if let Some(id) = self.id {
            return format!("get:{}", id);
        }

        let mut key = String::from(self.kind.as_str());

        if let Some(q) = &self.search_text {
            key.push_str(":q=");
            key.push_str(q);
        }

        if !self.genres.is_empty() {
            key.push_str(":genre=");
            let names: Vec<&str> = self.genres.iter().map(Genre::as_str).collect();
            key.push_str(&names.join("+"));
        }

        if let Some(years) = &self.years {
            key.push_str(":years=");
            key.push_str(&years.to_string());
        }

        key.push_str(&format!(
            ":off={}:lim={}:sort={}",
            self.page.offset, self.page.limit, self.sort
        ));

        key
    }
}

impl std::fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// Normalizes raw parameters into a canonical [`QueryDescriptor`].
///
/// Rules, in order:
/// - search text is trimmed and case-folded; text longer than
///   `limits.max_search_len` characters is rejected; empty text is
///   dropped entirely
/// - genres are lowercased, sorted, and deduplicated so ordering never
///   affects the result
/// - an inverted year range (`year_from > year_to`) is rejected; open
///   ends default to 0 / 9999
/// - the limit is clamped to `limits.max_page_size` (never an error);
///   a missing or zero limit becomes `limits.default_page_size`
/// - popular and recommendations ignore caller filters and pagination
///   and use the fixed featured window, so each caches under exactly
///   one key
///
/// The function is pure and idempotent: normalizing the fields of an
/// already-normalized descriptor changes nothing.
pub fn normalize(
    kind: QueryKind,
    params: QueryParams,
    limits: &QueryLimits,
) -> Result<QueryDescriptor> {
    // Fixed global windows: one cache key per kind.
    if matches!(kind, QueryKind::Popular | QueryKind::Recommendations) {
        return Ok(QueryDescriptor {
            kind,
            search_text: None,
            genres: Vec::new(),
            years: None,
            page: Page::new(0, limits.featured_limit),
            sort: SortOrder::Popularity,
            id: None,
        });
    }

    if kind == QueryKind::GetById {
        return Err(CatalogError::internal(
            "get-by-id descriptors are built with QueryDescriptor::get_by_id",
        ));
    }

    let search_text = match params.q {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.chars().count() > limits.max_search_len {
                return Err(CatalogError::validation(
                    "q",
                    format!(
                        "search text exceeds maximum length of {} characters",
                        limits.max_search_len
                    ),
                ));
            }
            let folded = trimmed.to_lowercase();
            if folded.is_empty() { None } else { Some(folded) }
        },
        None => None,
    };

    let mut genres: Vec<Genre> = params
        .genre
        .into_iter()
        .map(Genre::new)
        .filter(|g| !g.is_empty())
        .collect();
    genres.sort();
    genres.dedup();

    let years = match (params.year_from, params.year_to) {
        (None, None) => None,
        (from, to) => {
            let from = from.unwrap_or(0);
            let to = to.unwrap_or(9999);
            if from > to {
                return Err(CatalogError::validation(
                    "year_from",
                    format!("year range is inverted: {} > {}", from, to),
                ));
            }
            Some(YearRange::new(from, to))
        },
    };

    let limit = match params.limit {
        Some(0) | None => limits.default_page_size,
        Some(n) => n.min(limits.max_page_size),
    };

    Ok(QueryDescriptor {
        kind,
        search_text,
        genres,
        years,
        page: Page::new(params.offset.unwrap_or(0), limit),
        sort: params.sort.unwrap_or_default(),
        id: None,
    })
}
