use crate::client::tmdb::RawMovie;
use crate::model::{Genre, MovieRecord, YearRange};
use crate::utils::parse_release_year;
use tracing::debug;

/// Converts a raw TMDB entry into a record, dropping entries outside `years`
/// or without a usable title or release date.
pub fn normalize_movie(raw: RawMovie, years: YearRange) -> Option<MovieRecord> {
    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        debug!("Skipping TMDB movie {} without title", raw.id);
        return None;
    }

    let year = match raw.release_date.as_deref().and_then(parse_release_year) {
        Some(y) if years.contains(y) => y,
        _ => {
            debug!("Skipping '{}': release date {:?} outside {}", title, raw.release_date, years);
            return None;
        }
    };

    Some(MovieRecord {
        id: raw.id,
        title: title.to_string(),
        genre: classify_genre(&raw.genre_ids),
        year,
        rating: normalize_rating(raw.vote_average, raw.vote_count),
    })
}

/// First tracked genre in TMDB order.
pub fn classify_genre(genre_ids: &[u32]) -> Option<Genre> {
    genre_ids.iter().find_map(|&id| Genre::from_tmdb_id(id))
}

/// TMDB reports 0.0 for unvoted movies; those count as missing.
fn normalize_rating(vote_average: Option<f64>, vote_count: Option<u64>) -> Option<f64> {
    if vote_count == Some(0) {
        return None;
    }
    vote_average.filter(|r| r.is_finite() && (0.0..=10.0).contains(r))
}
