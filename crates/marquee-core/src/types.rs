//! Common type definitions and newtypes for the Marquee catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque movie record identifier.
///
/// Backed by a UUIDv7 so identifiers sort roughly by creation time,
/// which keeps the document store's id index friendly to appends.
///
/// # Example
///
/// ```
/// use marquee_core::MovieId;
///
/// let id = MovieId::new();
/// let parsed = MovieId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(Uuid);

impl MovieId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses an identifier from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MovieId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Movie genre.
///
/// Genres are normalized to lowercase on construction so that
/// `Genre::new("Sci-Fi")` and `Genre::new("sci-fi")` compare equal and
/// serialize identically. This is what makes genre filters
/// order-independent and cache keys stable.
///
/// # Example
///
/// ```
/// use marquee_core::Genre;
///
/// let genre = Genre::new("Sci-Fi");
/// assert_eq!(genre.as_str(), "sci-fi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genre(String);

impl Genre {
    /// Creates a genre, normalizing to trimmed lowercase.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_lowercase())
    }

    /// Returns the genre name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the genre is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Genre {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Genre {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Inclusive release-year range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    /// Lower bound, inclusive.
    pub from: u16,
    /// Upper bound, inclusive.
    pub to: u16,
}

impl YearRange {
    /// Creates a range. Callers must ensure `from <= to`; the query
    /// engine rejects inverted ranges before this point.
    pub fn new(from: u16, to: u16) -> Self {
        Self { from, to }
    }

    /// Returns true if `year` falls inside the range.
    pub fn contains(&self, year: u16) -> bool {
        year >= self.from && year <= self.to
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    /// Number of records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl Page {
    /// Creates a pagination window.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// Sort order for collection queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Alphabetical by title.
    #[default]
    Title,
    /// Newest release year first.
    Year,
    /// Highest rating first.
    Rating,
    /// Highest popularity score first.
    Popularity,
}

impl SortOrder {
    /// Returns the canonical lowercase name, used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of read operation a descriptor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Plain collection listing.
    List,
    /// Text search over title and description.
    Search,
    /// Fixed popularity-ranked window.
    Popular,
    /// Fixed global recommendations window.
    Recommendations,
    /// Single record lookup by id.
    GetById,
}

impl QueryKind {
    /// Returns the canonical lowercase name, used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Search => "search",
            Self::Popular => "popular",
            Self::Recommendations => "recommendations",
            Self::GetById => "get",
        }
    }

    /// Returns true for kinds that answer over the whole collection
    /// (everything except get-by-id).
    pub fn is_collection(&self) -> bool {
        !matches!(self, Self::GetById)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
