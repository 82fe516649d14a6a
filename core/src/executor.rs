//! Drives one request through its load-state lifecycle.
//!
//! # Design
//! `execute` publishes a fresh `Loading` placeholder, awaits the operation,
//! folds the outcome into exactly one terminal `ApiResponse`, and posts that
//! once. The executor is the only recovery boundary: raised faults and panics
//! become an `Error` publication. Only a panic with `capture_panics` off
//! reaches the caller, and only after that publication.
//!
//! Nothing is shared between invocations. Two requests posting to the same
//! sink are not coordinated; whichever terminal state is posted last wins.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::config::ExecutorConfig;
use crate::error::FetchError;
use crate::response::{ApiResponse, LoadState};
use crate::sink::StateSink;

#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    config: ExecutorConfig,
}

impl RequestExecutor {
    /// An executor with [`ExecutorConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `operation` and publish `Loading` followed by one terminal state.
    ///
    /// `operation` is not invoked until the `Loading` placeholder has been
    /// posted. Failures are only observable through `sink`. With
    /// `capture_panics` disabled a panicking operation still gets its
    /// `Error` publication before the panic resumes.
    pub async fn execute<T, F, Fut, S>(&self, operation: F, sink: S)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, FetchError>>,
        S: StateSink<T>,
    {
        let target = self.config.log_target.as_str();

        log::debug!(target: target, "request started");
        sink.post(ApiResponse::loading());

        // The call itself sits inside the async block so a panic while
        // building the future is caught as well.
        let caught = AssertUnwindSafe(async move { operation().await })
            .catch_unwind()
            .await;
        match caught {
            Ok(outcome) => sink.post(into_terminal(outcome, target)),
            Err(payload) => {
                let fault = FetchError::Panicked(panic_message(payload.as_ref()));
                sink.post(into_terminal(Err(fault), target));
                if !self.config.capture_panics {
                    panic::resume_unwind(payload);
                }
            }
        }
    }

    /// Run [`execute`](Self::execute) as a background tokio task.
    ///
    /// Must be called from within a tokio runtime. Aborting the returned
    /// handle after `Loading` has been posted publishes no terminal state;
    /// the sink keeps `Loading`.
    pub fn spawn<T, F, Fut, S>(&self, operation: F, sink: S) -> JoinHandle<()>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ApiResponse<T>, FetchError>> + Send + 'static,
        S: StateSink<T> + Send + 'static,
    {
        let executor = self.clone();
        tokio::spawn(async move { executor.execute(operation, sink).await })
    }
}

fn into_terminal<T>(outcome: Result<ApiResponse<T>, FetchError>, target: &str) -> ApiResponse<T> {
    match outcome {
        Ok(mut response) => {
            response.error = None;
            response.state = LoadState::Loading;
            if response.is_success() {
                log::debug!(target: target, "request succeeded");
                response.state = LoadState::Success;
            } else {
                log::warn!(
                    target: target,
                    "request rejected with code {}: {}",
                    response.error_code,
                    response.error_message.as_deref().unwrap_or("")
                );
                response.state = LoadState::Failed;
            }
            response
        }
        Err(fault) => {
            log::error!(target: target, "request raised: {fault}");
            ApiResponse {
                state: LoadState::Error,
                error: Some(Arc::new(fault)),
                ..ApiResponse::loading()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::sink::WatchSink;

    /// Keeps every publication so ordering can be asserted.
    struct Recorder<T> {
        seen: Mutex<Vec<ApiResponse<T>>>,
    }

    impl<T: Clone> Recorder<T> {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }

        fn states(&self) -> Vec<LoadState> {
            self.seen.lock().unwrap().iter().map(|r| r.state).collect()
        }

        fn last(&self) -> ApiResponse<T> {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl<T> StateSink<T> for Recorder<T> {
        fn post(&self, response: ApiResponse<T>) {
            self.seen.lock().unwrap().push(response);
        }
    }

    #[tokio::test]
    async fn success_publishes_loading_then_success() {
        let rec = Recorder::new();
        RequestExecutor::new()
            .execute(|| async { Ok(ApiResponse::success("x".to_string())) }, &rec)
            .await;

        assert_eq!(rec.states(), vec![LoadState::Loading, LoadState::Success]);
        assert_eq!(rec.last().payload.as_deref(), Some("x"));
        assert!(rec.last().error.is_none());
    }

    #[tokio::test]
    async fn nonzero_code_publishes_failed_with_message() {
        let rec = Recorder::<String>::new();
        RequestExecutor::new()
            .execute(|| async { Ok(ApiResponse::failure(404, "not found")) }, &rec)
            .await;

        assert_eq!(rec.states(), vec![LoadState::Loading, LoadState::Failed]);
        let last = rec.last();
        assert_eq!(last.error_code, 404);
        assert_eq!(last.error_message.as_deref(), Some("not found"));
        assert!(last.error.is_none());
    }

    #[tokio::test]
    async fn timeout_fault_publishes_error() {
        let rec = Recorder::<String>::new();
        let operation = || async {
            tokio::time::timeout(Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, FetchError>(ApiResponse::success("late".to_string()))
            })
            .await
            .map_err(|_| FetchError::Timeout)?
        };
        RequestExecutor::new().execute(operation, &rec).await;

        assert_eq!(rec.states(), vec![LoadState::Loading, LoadState::Error]);
        let last = rec.last();
        assert!(matches!(last.error.as_deref(), Some(FetchError::Timeout)));
        assert!(last.payload.is_none());
    }

    #[tokio::test]
    async fn success_without_payload_is_still_success() {
        let rec = Recorder::<String>::new();
        RequestExecutor::new()
            .execute(|| async { Ok(ApiResponse::loading()) }, &rec)
            .await;

        assert_eq!(rec.last().state, LoadState::Success);
        assert!(rec.last().payload.is_none());
    }

    #[tokio::test]
    async fn loading_is_posted_before_operation_runs() {
        let rec = Arc::new(Recorder::<u32>::new());
        let observed = Arc::clone(&rec);
        RequestExecutor::new()
            .execute(
                move || {
                    let states_at_call = observed.states();
                    async move {
                        assert_eq!(states_at_call, vec![LoadState::Loading]);
                        Ok(ApiResponse::success(1))
                    }
                },
                Arc::clone(&rec),
            )
            .await;

        assert_eq!(rec.states(), vec![LoadState::Loading, LoadState::Success]);
    }

    #[tokio::test]
    async fn stale_fault_on_returned_envelope_is_cleared() {
        let rec = Recorder::<u32>::new();
        RequestExecutor::new()
            .execute(
                || async {
                    let mut resp = ApiResponse::success(5);
                    resp.error = Some(Arc::new(FetchError::Timeout));
                    Ok(resp)
                },
                &rec,
            )
            .await;

        assert!(rec.last().error.is_none());
    }

    #[tokio::test]
    async fn panic_in_operation_becomes_error_state() {
        let rec = Recorder::<u32>::new();
        RequestExecutor::new()
            .execute(
                || async {
                    let decoded: Option<u32> = None;
                    Ok(ApiResponse::success(decoded.expect("decoder blew up")))
                },
                &rec,
            )
            .await;

        assert_eq!(rec.states(), vec![LoadState::Loading, LoadState::Error]);
        match rec.last().error.as_deref() {
            Some(FetchError::Panicked(msg)) => assert_eq!(msg, "decoder blew up"),
            other => panic!("unexpected fault: {other:?}"),
        }
    }

    #[tokio::test]
    async fn uncaptured_panic_still_publishes_error_first() {
        let config = ExecutorConfig {
            capture_panics: false,
            ..ExecutorConfig::default()
        };
        let rec = Recorder::<u32>::new();
        let executor = RequestExecutor::with_config(config);
        let run = executor.execute(
            || async {
                let decoded: Option<u32> = None;
                Ok(ApiResponse::success(decoded.expect("decoder blew up")))
            },
            &rec,
        );
        let unwound = AssertUnwindSafe(run).catch_unwind().await;

        let payload = unwound.expect_err("panic should resume past execute");
        assert_eq!(panic_message(payload.as_ref()), "decoder blew up");
        assert_eq!(rec.states(), vec![LoadState::Loading, LoadState::Error]);
        match rec.last().error.as_deref() {
            Some(FetchError::Panicked(msg)) => assert_eq!(msg, "decoder blew up"),
            other => panic!("unexpected fault: {other:?}"),
        }
    }

    #[tokio::test]
    async fn raised_fault_is_not_reported_as_success() {
        let rec = Recorder::<u32>::new();
        RequestExecutor::new()
            .execute(|| async { Err(FetchError::Timeout) }, &rec)
            .await;

        let last = rec.last();
        assert_eq!(last.state, LoadState::Error);
        assert_eq!(last.error_code, 0);
        assert!(!last.is_success());
    }

    #[tokio::test]
    async fn repeated_success_is_idempotent_across_fresh_sinks() {
        let executor = RequestExecutor::new();
        let first = Recorder::new();
        let second = Recorder::new();
        let operation = || async { Ok(ApiResponse::success(vec![1, 2, 3])) };

        executor.execute(operation, &first).await;
        executor.execute(operation, &second).await;

        assert_eq!(first.last().state, LoadState::Success);
        assert_eq!(second.last().state, LoadState::Success);
        assert_eq!(first.last().payload, second.last().payload);
    }

    #[tokio::test]
    async fn spawn_publishes_into_watch_sink() {
        let sink = Arc::new(WatchSink::new());
        let handle = RequestExecutor::new().spawn(
            || async { Ok(ApiResponse::success("bg".to_string())) },
            Arc::clone(&sink),
        );
        handle.await.unwrap();

        let latest = sink.latest().unwrap();
        assert_eq!(latest.state, LoadState::Success);
        assert_eq!(latest.payload.as_deref(), Some("bg"));
    }

    #[tokio::test]
    async fn aborted_spawn_leaves_sink_loading() {
        let sink = Arc::new(WatchSink::<u32>::new());
        let mut rx = sink.subscribe();
        let handle = RequestExecutor::new().spawn(
            || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(ApiResponse::success(1))
            },
            Arc::clone(&sink),
        );

        rx.changed().await.unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(sink.latest().unwrap().state, LoadState::Loading);
    }

    #[tokio::test]
    async fn concurrent_requests_on_one_sink_end_terminal() {
        let sink = Arc::new(WatchSink::<u32>::new());
        let executor = RequestExecutor::new();
        let a = executor.spawn(|| async { Ok(ApiResponse::success(1)) }, Arc::clone(&sink));
        let b = executor.spawn(|| async { Ok(ApiResponse::failure(7, "busy")) }, Arc::clone(&sink));
        a.await.unwrap();
        b.await.unwrap();

        assert!(sink.latest().unwrap().state.is_terminal());
    }
}
