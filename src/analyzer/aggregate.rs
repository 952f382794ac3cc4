use crate::model::{ActorSummary, AggregateRow, GroupKey, MentionRecord, MovieRecord, Observation};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
struct Accumulator {
    movies: usize,
    rated: usize,
    rating_sum: f64,
    mentions: u64,
    looked_up: usize,
}

impl Accumulator {
    fn average(&self) -> Option<f64> {
        (self.rated > 0).then(|| self.rating_sum / self.rated as f64)
    }

    fn add_mentions(&mut self, mentions: Option<u64>) {
        if let Some(count) = mentions {
            self.mentions += count;
            self.looked_up += 1;
        }
    }

    fn total_mentions(&self) -> Option<u64> {
        (self.looked_up > 0).then_some(self.mentions)
    }
}

pub struct Aggregator;

impl Aggregator {
    /// Groups observations by (key, year): mean of the available ratings and
    /// sum of the mentions joined by movie id. A movie without a mention record
    /// adds nothing; a group where none has one gets `total_mentions: None`.
    /// Groups without any observation produce no row. Output is ordered by
    /// key, then year.
    pub fn aggregate(observations: &[Observation], mentions: &[MentionRecord]) -> Vec<AggregateRow> {
        let mention_counts: HashMap<u64, u64> = mentions
            .iter()
            .map(|m| (m.movie_id, m.articles))
            .collect();

        let mut seen: HashSet<(&GroupKey, u64)> = HashSet::new();
        let mut groups: BTreeMap<(GroupKey, i32), Accumulator> = BTreeMap::new();

        for obs in observations {
            if !seen.insert((&obs.key, obs.movie.id)) {
                continue;
            }
            let acc = groups
                .entry((obs.key.clone(), obs.movie.year))
                .or_default();
            acc.movies += 1;
            if let Some(rating) = valid_rating(&obs.movie) {
                acc.rated += 1;
                acc.rating_sum += rating;
            }
            acc.add_mentions(mention_counts.get(&obs.movie.id).copied());
        }

        groups
            .into_iter()
            .map(|((key, year), acc)| AggregateRow {
                key,
                year,
                average_rating: acc.average(),
                rated_movies: acc.rated,
                movies: acc.movies,
                total_mentions: acc.total_mentions(),
            })
            .collect()
    }

    /// Whole-range totals per actor; the average is weighted by rated movies.
    pub fn summarize_actors(rows: &[AggregateRow]) -> Vec<ActorSummary> {
        let mut per_actor: BTreeMap<&str, Accumulator> = BTreeMap::new();

        for row in rows {
            let GroupKey::Actor(actor) = &row.key else {
                continue;
            };
            let acc = per_actor.entry(actor.as_str()).or_default();
            acc.movies += row.movies;
            acc.add_mentions(row.total_mentions);
            if let Some(avg) = row.average_rating {
                acc.rated += row.rated_movies;
                acc.rating_sum += avg * row.rated_movies as f64;
            }
        }

        per_actor
            .into_iter()
            .map(|(actor, acc)| ActorSummary {
                actor: actor.to_string(),
                movies: acc.movies,
                average_rating: acc.average().map(|r| r.clamp(0.0, 10.0)),
                total_mentions: acc.total_mentions(),
            })
            .collect()
    }
}

/// Keys each movie by its own genre; movies without a tracked genre are dropped.
pub fn observations_by_genre(movies: &[MovieRecord]) -> Vec<Observation> {
    movies
        .iter()
        .filter_map(|movie| {
            movie.genre.map(|genre| Observation {
                key: GroupKey::Genre(genre),
                movie: movie.clone(),
            })
        })
        .collect()
}

fn valid_rating(movie: &MovieRecord) -> Option<f64> {
    movie
        .rating
        .filter(|r| r.is_finite() && (0.0..=10.0).contains(r))
}
