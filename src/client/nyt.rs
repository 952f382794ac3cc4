// New York Times Article Search client
use crate::client::http::HttpClient;
use crate::client::traits::MentionSource;
use crate::model::{ApiError, MentionRecord, MovieRecord};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const MOVIES_SECTION_FILTER: &str = r#"section_name:"Movies""#;

#[derive(Debug, Deserialize)]
struct ArticleSearch {
    response: ArticleResponse,
}

#[derive(Debug, Deserialize)]
struct ArticleResponse {
    #[serde(default)]
    docs: Vec<serde_json::Value>,
    #[serde(alias = "metadata")]
    meta: Option<ArticleMeta>,
}

#[derive(Debug, Deserialize)]
struct ArticleMeta {
    hits: u64,
}

impl ArticleResponse {
    fn article_count(&self) -> u64 {
        self.meta
            .as_ref()
            .map(|m| m.hits)
            .unwrap_or(self.docs.len() as u64)
    }
}

pub struct NytClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    last_year: i32,
}

impl NytClient {
    /// `last_year` closes the publication window of every search.
    pub fn new(http: HttpClient, base_url: &str, api_key: &str, last_year: i32) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            last_year,
        }
    }

    /// Number of Movies-section articles mentioning `title` published from
    /// the start of `year` through the end of the analysed range.
    pub async fn count_articles(&self, title: &str, year: i32) -> Result<u64, ApiError> {
        let params = [
            ("q", format!("\"{}\"", title)),
            ("fq", MOVIES_SECTION_FILTER.to_string()),
            ("begin_date", format!("{}0101", year)),
            ("end_date", format!("{}1231", self.last_year.max(year))),
            ("api-key", self.api_key.clone()),
        ];
        let search: ArticleSearch = self.http.get_json(&self.base_url, &params).await?;
        let count = search.response.article_count();
        debug!("NYT: {} article(s) for '{}' since {}", count, title, year);
        Ok(count)
    }
}

#[async_trait]
impl MentionSource for NytClient {
    async fn mentions_for(&self, movie: &MovieRecord) -> Result<MentionRecord, ApiError> {
        let articles = self.count_articles(&movie.title, movie.year).await?;
        Ok(MentionRecord {
            movie_id: movie.id,
            title: movie.title.clone(),
            year: movie.year,
            articles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{MockServer, Reply};
    use std::time::Duration;

    fn client(server: &MockServer) -> NytClient {
        let http = HttpClient::new(Duration::from_secs(5), Duration::from_millis(1)).unwrap();
        NytClient::new(http, &server.url("/search"), "nyt-key", 2024)
    }

    fn movie() -> MovieRecord {
        MovieRecord {
            id: 99,
            title: "Hustle".into(),
            genre: None,
            year: 2022,
            rating: Some(7.6),
        }
    }

    #[tokio::test]
    async fn counts_hits_from_meta() {
        let server = MockServer::start(vec![Reply::json(
            200,
            r#"{"status": "OK", "response": {"docs": [{}, {}], "meta": {"hits": 14}}}"#,
        )])
        .await;

        let mention = client(&server).mentions_for(&movie()).await.unwrap();

        assert_eq!(mention.articles, 14);
        assert_eq!(mention.movie_id, 99);
        assert_eq!(mention.year, 2022);
        let request = &server.requests()[0];
        assert!(request.contains("begin_date=20220101"));
        assert!(request.contains("end_date=20241231"));
        assert!(request.contains("api-key=nyt-key"));
    }

    #[tokio::test]
    async fn falls_back_to_doc_count_without_meta() {
        let server = MockServer::start(vec![Reply::json(
            200,
            r#"{"response": {"docs": [{}, {}, {}]}}"#,
        )])
        .await;

        let mention = client(&server).mentions_for(&movie()).await.unwrap();
        assert_eq!(mention.articles, 3);
    }

    #[tokio::test]
    async fn forbidden_key_is_an_auth_error() {
        let server = MockServer::start(vec![Reply::json(
            403,
            r#"{"fault": {"faultstring": "Invalid ApiKey"}}"#,
        )])
        .await;

        let result = client(&server).mentions_for(&movie()).await;
        assert!(matches!(result, Err(ApiError::Auth(403))));
    }
}
