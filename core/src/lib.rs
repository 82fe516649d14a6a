//! Request-to-UI-state mapping for a mobile data layer.
//!
//! # Overview
//! [`RequestExecutor::execute`] runs one asynchronous operation and publishes
//! its lifecycle to a [`StateSink`]: `Loading` first, then exactly one of
//! `Success` (`errorCode == 0`), `Failed` (nonzero `errorCode`) or `Error`
//! (the operation raised). Failures never propagate to the caller.
//!
//! # Design
//! - `ApiResponse<T>` is the `{errorCode, errorMsg, data}` envelope plus the
//!   state the executor assigned it.
//! - `WatchSink` is a last-value-wins slot observers can subscribe to;
//!   `CallbackSink` forwards to a registered closure.
//! - `ApiClient` builds and decodes HTTP exchanges without touching the
//!   network (host-does-IO). Hosts plug their HTTP stack in through
//!   [`Transport`] or execute requests themselves.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod legacy;
pub mod response;
pub mod sink;
pub mod transport;

pub use client::ApiClient;
pub use config::ExecutorConfig;
pub use error::FetchError;
pub use executor::RequestExecutor;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[allow(deprecated)]
pub use legacy::{settle, Outcome};
pub use response::{ApiResponse, LoadState};
pub use sink::{CallbackSink, StateSink, WatchSink};
pub use transport::Transport;
