use crate::model::{ApiError, Genre, MentionRecord, MovieRecord, YearRange};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Source of movie metadata. Streams are finite and single-use: re-invoke the
/// method to fetch again.
pub trait MovieSource: Send + Sync {
    fn movies_for_genre(
        &self,
        genre: Genre,
        years: YearRange,
    ) -> BoxStream<'_, Result<MovieRecord, ApiError>>;

    fn movies_for_actor<'a>(
        &'a self,
        actor: &'a str,
        years: YearRange,
    ) -> BoxStream<'a, Result<MovieRecord, ApiError>>;
}

#[async_trait]
pub trait MentionSource: Send + Sync {
    async fn mentions_for(&self, movie: &MovieRecord) -> Result<MentionRecord, ApiError>;
}
