pub mod http;
pub mod nyt;
pub mod tmdb;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use http::HttpClient;
pub use nyt::NytClient;
pub use tmdb::TmdbClient;
pub use traits::{MentionSource, MovieSource};
