use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Source of raw API responses.
///
/// Implementations issue a GET for `path` (relative to their base URL) and
/// resolve to the response body. A non-success status must resolve to
/// [`WatchError::Request`](crate::WatchError::Request) carrying the body text.
pub trait Fetcher: Send + Sync + 'static {
    fn get<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
}
