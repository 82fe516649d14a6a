//! Stateless request builder and envelope decoder.
//!
//! # Design
//! `ApiClient` holds only a `base_url`. `build_*` methods produce an
//! `HttpRequest`, `parse_envelope` consumes an `HttpResponse`. A non-2xx
//! status or an undecodable body is a raised fault; a decodable envelope is
//! returned as-is even when it carries a nonzero `errorCode`, leaving the
//! Success/Failed split to the executor.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::ApiResponse;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`. A trailing slash is dropped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The base URL without its trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET for `path` that accepts JSON.
    pub fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url_for(path),
            headers: vec![accept_json()],
            body: None,
        }
    }

    /// Build a POST for `path` with `body` serialized as JSON.
    ///
    /// Fails with `FetchError::Serialization` if `body` cannot be encoded.
    pub fn build_post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, FetchError> {
        let body = serde_json::to_string(body).map_err(|e| FetchError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url_for(path),
            headers: vec![
                accept_json(),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    /// Decode a host response into an envelope.
    ///
    /// A non-2xx status is a raised `FetchError::Http`; a nonzero `errorCode`
    /// in a 2xx body is not an error here.
    pub fn parse_envelope<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<ApiResponse<T>, FetchError> {
        if !response.is_success() {
            return Err(FetchError::Http {
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| FetchError::Deserialization(e.to_string()))
    }

    /// Send `request` through `transport` and decode the envelope.
    pub async fn fetch<T, R>(&self, transport: &R, request: HttpRequest) -> Result<ApiResponse<T>, FetchError>
    where
        T: DeserializeOwned,
        R: Transport + ?Sized,
    {
        log::trace!("{} {}", request.method, request.url);
        let response = transport.send(request).await?;
        self.parse_envelope(response)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn accept_json() -> (String, String) {
    ("accept".to_string(), "application/json".to_string())
}
