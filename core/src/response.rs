//! The response envelope and its UI-facing load state.
//!
//! # Design
//! The server speaks a `{errorCode, errorMsg, data}` envelope. `errorCode == 0`
//! alone decides success; a success envelope without `data` is still a
//! success. `state` and `error` are local bookkeeping set by the executor and
//! never travel over the wire.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Where a single request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Request issued, no result yet.
    #[default]
    Loading,
    /// The envelope came back with `errorCode == 0`.
    Success,
    /// The envelope came back with a nonzero `errorCode`.
    Failed,
    /// The operation raised before producing an envelope.
    Error,
}

impl LoadState {
    /// True for every state except `Loading`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LoadState::Loading)
    }
}

/// Result envelope of one request, plus the state the executor assigned it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "errorCode", default)]
    pub error_code: i32,

    #[serde(rename = "errorMsg", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,

    #[serde(skip)]
    pub state: LoadState,

    /// Present only when `state == LoadState::Error`.
    #[serde(skip)]
    pub error: Option<Arc<FetchError>>,
}

impl<T> ApiResponse<T> {
    /// An empty placeholder published before the operation runs.
    pub fn loading() -> Self {
        Self {
            error_code: 0,
            error_message: None,
            payload: None,
            state: LoadState::Loading,
            error: None,
        }
    }

    /// A decoded success envelope (`errorCode == 0`) carrying `payload`.
    pub fn success(payload: T) -> Self {
        Self {
            payload: Some(payload),
            ..Self::loading()
        }
    }

    /// A decoded application failure with a nonzero `code`.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            error_code: code,
            error_message: Some(message.into()),
            ..Self::loading()
        }
    }

    /// `errorCode == 0`, unless the executor marked this as a raised fault.
    /// Payload presence plays no part.
    pub fn is_success(&self) -> bool {
        self.error_code == 0 && self.state != LoadState::Error
    }
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self::loading()
    }
}

impl<T: Clone> Clone for ApiResponse<T> {
    fn clone(&self) -> Self {
        Self {
            error_code: self.error_code,
            error_message: self.error_message.clone(),
            payload: self.payload.clone(),
            state: self.state,
            error: self.error.clone(),
        }
    }
}
