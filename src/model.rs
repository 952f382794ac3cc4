// Core structs: MovieRecord, MentionRecord, AggregateRow
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Genres tracked by the analysis, with their TMDB ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Genre {
    Action,
    Drama,
    Comedy,
}

impl Genre {
    pub const ALL: [Genre; 3] = [Genre::Action, Genre::Drama, Genre::Comedy];

    pub fn tmdb_id(self) -> u32 {
        match self {
            Genre::Action => 28,
            Genre::Drama => 18,
            Genre::Comedy => 35,
        }
    }

    pub fn from_tmdb_id(id: u32) -> Option<Genre> {
        Self::ALL.into_iter().find(|g| g.tmdb_id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Drama => "Drama",
            Genre::Comedy => "Comedy",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown genre '{}'", s))
    }
}

impl TryFrom<String> for Genre {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Inclusive range of release years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    /// First tracked genre among the movie's TMDB genres.
    pub genre: Option<Genre>,
    pub year: i32,
    /// `None` when the movie has no votes yet.
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionRecord {
    pub movie_id: u64,
    pub title: String,
    pub year: i32,
    pub articles: u64,
}

/// What an aggregate row is grouped by. Genres sort before actors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Genre(Genre),
    Actor(String),
}

impl GroupKey {
    pub fn label(&self) -> &str {
        match self {
            GroupKey::Genre(g) => g.name(),
            GroupKey::Actor(name) => name.as_str(),
        }
    }

    pub fn is_genre(&self) -> bool {
        matches!(self, GroupKey::Genre(_))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A movie attributed to the genre or actor it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub key: GroupKey,
    pub movie: MovieRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub year: i32,
    pub average_rating: Option<f64>,
    pub rated_movies: usize,
    pub movies: usize,
    /// `None` when no mention lookup in the group succeeded.
    pub total_mentions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorSummary {
    pub actor: String,
    pub movies: usize,
    pub average_rating: Option<f64>,
    pub total_mentions: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication rejected (HTTP {0})")]
    Auth(u16),
    #[error("rate limited by provider")]
    RateLimited,
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Failures worth one more attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::RateLimited)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("no data to plot for {0}")]
    NoData(String),
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("drawing failed: {0}")]
    Drawing(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("invalid config: {0}")]
    Invalid(String),
}
