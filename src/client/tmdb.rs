// TMDB (The Movie Database) v3 client
use crate::client::http::HttpClient;
use crate::client::traits::MovieSource;
use crate::model::{ApiError, Genre, MovieRecord, YearRange};
use crate::normalizer::normalize_movie;
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use tracing::{debug, info};

/// A movie entry exactly as TMDB returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovie {
    pub id: u64,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct DiscoverPage {
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    results: Vec<RawMovie>,
}

#[derive(Debug, Deserialize)]
struct PersonSearch {
    #[serde(default)]
    results: Vec<PersonHit>,
}

#[derive(Debug, Deserialize)]
struct PersonHit {
    id: u64,
    name: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum DiscoverFilter {
    Genre(Genre),
    Cast(u64),
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoverQuery {
    pub filter: DiscoverFilter,
    pub years: YearRange,
}

impl DiscoverQuery {
    fn params(&self, api_key: &str, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_key", api_key.to_string()),
            ("primary_release_date.gte", format!("{}-01-01", self.years.start)),
            ("primary_release_date.lte", format!("{}-12-31", self.years.end)),
            ("page", page.to_string()),
        ];
        match self.filter {
            DiscoverFilter::Genre(genre) => {
                params.push(("with_genres", genre.tmdb_id().to_string()));
                params.push(("sort_by", "popularity.desc".to_string()));
            }
            DiscoverFilter::Cast(person_id) => {
                params.push(("with_cast", person_id.to_string()));
                params.push(("sort_by", "release_date.asc".to_string()));
            }
        }
        params
    }
}

pub struct TmdbClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    max_pages: u32,
    max_movies: usize,
}

impl TmdbClient {
    pub fn new(
        http: HttpClient,
        base_url: &str,
        api_key: &str,
        max_pages: u32,
        max_movies: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_pages,
            max_movies,
        }
    }

    /// Looks up the TMDB id of the best match for `name`.
    pub async fn person_id(&self, name: &str) -> Result<u64, ApiError> {
        let url = format!("{}/search/person", self.base_url);
        let params = [("api_key", self.api_key.clone()), ("query", name.to_string())];
        let response: PersonSearch = self.http.get_json(&url, &params).await?;

        let hit = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("no person found for {}", name)))?;
        info!(
            "Resolved '{}' to TMDB person {} ({})",
            name,
            hit.id,
            hit.name.as_deref().unwrap_or("?")
        );
        Ok(hit.id)
    }

    /// Pages through `discover/movie` lazily; each page is requested only when
    /// the previous one has been consumed.
    pub fn discover(
        &self,
        query: DiscoverQuery,
    ) -> impl Stream<Item = Result<RawMovie, ApiError>> + Send + '_ {
        stream::try_unfold(Some(1u32), move |next| async move {
            let Some(page) = next else {
                return Ok::<_, ApiError>(None);
            };
            let body = self.fetch_page(&query, page).await?;
            let more = page < body.total_pages && page < self.max_pages;
            Ok(Some((body.results, more.then_some(page + 1))))
        })
        .map_ok(|results| stream::iter(results.into_iter().map(Ok::<_, ApiError>)))
        .try_flatten()
    }

    async fn fetch_page(&self, query: &DiscoverQuery, page: u32) -> Result<DiscoverPage, ApiError> {
        let url = format!("{}/discover/movie", self.base_url);
        let page_body: DiscoverPage = self
            .http
            .get_json(&url, &query.params(&self.api_key, page))
            .await?;
        debug!(
            "discover {:?} page {}/{}: {} movies",
            query.filter,
            page,
            page_body.total_pages,
            page_body.results.len()
        );
        Ok(page_body)
    }

    fn records<'a>(
        &'a self,
        raw: impl Stream<Item = Result<RawMovie, ApiError>> + Send + 'a,
        years: YearRange,
    ) -> impl Stream<Item = Result<MovieRecord, ApiError>> + Send + 'a {
        raw.try_filter_map(move |movie| future::ready(Ok(normalize_movie(movie, years))))
            .take(self.max_movies)
    }
}

impl MovieSource for TmdbClient {
    fn movies_for_genre(
        &self,
        genre: Genre,
        years: YearRange,
    ) -> BoxStream<'_, Result<MovieRecord, ApiError>> {
        let query = DiscoverQuery {
            filter: DiscoverFilter::Genre(genre),
            years,
        };
        // with_genres guarantees membership even when another tracked genre is listed first
        self.records(self.discover(query), years)
            .map_ok(move |movie| MovieRecord {
                genre: Some(genre),
                ..movie
            })
            .boxed()
    }

    fn movies_for_actor<'a>(
        &'a self,
        actor: &'a str,
        years: YearRange,
    ) -> BoxStream<'a, Result<MovieRecord, ApiError>> {
        let raw = stream::once(self.person_id(actor))
            .map_ok(move |person_id| {
                self.discover(DiscoverQuery {
                    filter: DiscoverFilter::Cast(person_id),
                    years,
                })
            })
            .try_flatten();
        self.records(raw, years).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{MockServer, Reply};
    use std::time::Duration;

    const YEARS: YearRange = YearRange { start: 2020, end: 2024 };

    fn client(server: &MockServer, max_pages: u32, max_movies: usize) -> TmdbClient {
        let http = HttpClient::new(Duration::from_secs(5), Duration::from_millis(1)).unwrap();
        TmdbClient::new(http, &server.url("/3/"), "tmdb-key", max_pages, max_movies)
    }

    fn page(total_pages: u32, movies: &[(u64, &str, &str, f64)]) -> String {
        let results: Vec<_> = movies
            .iter()
            .map(|(id, title, date, rating)| {
                serde_json::json!({
                    "id": id,
                    "title": title,
                    "release_date": date,
                    "vote_average": rating,
                    "vote_count": 100,
                    "genre_ids": [35]
                })
            })
            .collect();
        serde_json::json!({ "page": 1, "total_pages": total_pages, "results": results }).to_string()
    }

    #[tokio::test]
    async fn genre_stream_pages_until_the_limit() {
        let server = MockServer::start(vec![
            Reply::json(200, &page(5, &[(1, "Hustle", "2022-06-03", 7.6)])),
            Reply::json(200, &page(5, &[(2, "Murder Mystery 2", "2023-03-31", 6.0)])),
        ])
        .await;
        let tmdb = client(&server, 2, 50);

        let movies: Vec<MovieRecord> = tmdb
            .movies_for_genre(Genre::Action, YEARS)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|m| m.genre == Some(Genre::Action)));
        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("/3/discover/movie?"));
        assert!(requests[0].contains("with_genres=28"));
        assert!(requests[0].contains("primary_release_date.gte=2020-01-01"));
        assert!(requests[1].contains("page=2"));
    }

    #[tokio::test]
    async fn stream_is_lazy_and_bounded_by_movie_limit() {
        let server = MockServer::start(vec![
            Reply::json(
                200,
                &page(3, &[(1, "A", "2020-02-02", 5.0), (2, "B", "2021-02-02", 6.0)]),
            ),
            Reply::json(200, &page(3, &[(3, "C", "2022-02-02", 7.0)])),
        ])
        .await;
        let tmdb = client(&server, 3, 1);

        let movies: Vec<MovieRecord> = tmdb
            .movies_for_genre(Genre::Comedy, YEARS)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn actor_stream_resolves_person_first() {
        let server = MockServer::start(vec![
            Reply::json(200, r#"{"results": [{"id": 2888, "name": "Will Smith"}]}"#),
            Reply::json(
                200,
                &page(1, &[(38700, "Bad Boys for Life", "2020-01-15", 7.1), (1, "Old", "2019-01-01", 5.0)]),
            ),
        ])
        .await;
        let tmdb = client(&server, 1, 50);

        let movies: Vec<MovieRecord> = tmdb
            .movies_for_actor("Will Smith", YEARS)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Bad Boys for Life");
        assert_eq!(movies[0].genre, Some(Genre::Comedy));
        let requests = server.requests();
        assert!(requests[0].starts_with("/3/search/person?"));
        assert!(requests[0].contains("query=Will+Smith"));
        assert!(requests[1].contains("with_cast=2888"));
        assert!(requests[1].contains("sort_by=release_date.asc"));
    }

    #[tokio::test]
    async fn unknown_actor_is_not_found() {
        let server = MockServer::start(vec![Reply::json(200, r#"{"results": []}"#)]).await;
        let tmdb = client(&server, 1, 50);

        let result: Result<Vec<MovieRecord>, _> = tmdb
            .movies_for_actor("Nobody Atall", YEARS)
            .try_collect()
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_key_surfaces_as_auth_error() {
        let server = MockServer::start(vec![Reply::json(
            401,
            r#"{"status_code": 7, "status_message": "Invalid API key"}"#,
        )])
        .await;
        let tmdb = client(&server, 1, 50);

        let result: Result<Vec<MovieRecord>, _> = tmdb
            .movies_for_genre(Genre::Drama, YEARS)
            .try_collect()
            .await;

        assert!(matches!(result, Err(ApiError::Auth(401))));
    }
}
