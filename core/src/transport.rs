//! The host side of the host-does-IO split.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip on behalf of the core.
///
/// Implementations report connection problems as `FetchError::Network` or
/// `FetchError::Timeout`. Non-2xx statuses are returned as data so the
/// client can decide how to classify them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}
