//! Callback-style resolution of an already fetched envelope.
//!
//! Kept for callers that fetch the envelope themselves and only want a
//! success/error split. New code should go through
//! [`RequestExecutor::execute`](crate::executor::RequestExecutor::execute).

use crate::error::FetchError;
use crate::response::ApiResponse;

/// Two-way split of an envelope.
#[derive(Debug)]
pub enum Outcome<T> {
    /// `errorCode == 0`. The payload may still be absent.
    Success(Option<T>),
    Error(FetchError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn into_result(self) -> Result<Option<T>, FetchError> {
        match self {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Error(err) => Err(err),
        }
    }
}

/// Resolve `response` and run the matching hook, if one was supplied.
#[deprecated(note = "publish through RequestExecutor::execute and a StateSink instead")]
pub fn settle<T, S, E>(response: ApiResponse<T>, on_success: Option<S>, on_failure: Option<E>) -> Outcome<T>
where
    S: FnOnce(),
    E: FnOnce(),
{
    if response.is_success() {
        if let Some(hook) = on_success {
            hook();
        }
        Outcome::Success(response.payload)
    } else {
        if let Some(hook) = on_failure {
            hook();
        }
        Outcome::Error(FetchError::Rejected {
            code: response.error_code,
            message: response.error_message.unwrap_or_default(),
        })
    }
}
