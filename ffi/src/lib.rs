//! C-ABI wrapper around `fetch-state-core`.
//!
//! # Overview
//! Lets a mobile host run requests through the core executor while keeping
//! its own HTTP stack and UI thread. The host passes a fetch callback that
//! performs the round-trip and a state callback that receives `Loading`
//! followed by exactly one terminal update.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `fs_execute` blocks the calling thread on a current-thread runtime. Run
//!   it from a background thread; both callbacks fire on that thread.
//! - Payloads cross as JSON text so the C side needs no schema knowledge.
//! - The C caller owns pointers returned by `fs_client_new` and
//!   `fs_build_get` and releases them with the matching `fs_*_free` call.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use fetch_state_core::{ApiClient, ApiResponse, FetchError, HttpRequest, HttpResponse, RequestExecutor, StateSink};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Route `log` records to stderr, filtered by `RUST_LOG`. Safe to call more
/// than once; later calls are ignored.
#[unsafe(no_mangle)]
pub extern "C" fn fs_init_logging() {
    let _ = catch_unwind(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();
    });
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`.
///
/// Returns null if `base_url` is null, not UTF-8, or if a panic occurs.
#[unsafe(no_mangle)]
pub extern "C" fn fs_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(base_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiClient {
            inner: ApiClient::new(url),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `fs_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fs_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Build a GET request for `path` relative to the client's base URL.
///
/// Returns null on null or non-UTF-8 input. Free with `fs_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn fs_build_get(client: *const FfiClient, path: *const c_char) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || path.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Ok(path) = unsafe { CStr::from_ptr(path) }.to_str() else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_get(path))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a request returned by `fs_build_get`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fs_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::release(req) });
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Fetch `path` through the host's `fetch` callback and publish its states
/// to `on_state`.
///
/// When this returns `Ok`, `on_state` has been called exactly twice: once
/// with `Loading`, then once with `Success`, `Failed` or `Error`. A `false` return
/// from `fetch` is reported as an `Error` update, not as a status code.
/// `user_data` is passed through untouched to both callbacks.
#[unsafe(no_mangle)]
pub extern "C" fn fs_execute(
    client: *const FfiClient,
    path: *const c_char,
    fetch: Option<FfiFetchFn>,
    on_state: Option<FfiStateFn>,
    user_data: *mut c_void,
) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(fetch), Some(on_state)) = (fetch, on_state) else {
            return FfiStatus::NullArg;
        };
        if client.is_null() || path.is_null() {
            return FfiStatus::NullArg;
        }
        let client = unsafe { &*client };
        let Ok(path) = unsafe { CStr::from_ptr(path) }.to_str() else {
            return FfiStatus::InvalidUtf8;
        };

        let runtime = match tokio::runtime::Builder::new_current_thread().build() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("failed to start runtime: {e}");
                return FfiStatus::Runtime;
            }
        };

        let request = client.inner.build_get(path);
        let sink = HostSink { on_state, user_data };
        runtime.block_on(RequestExecutor::new().execute(
            || async { host_fetch(&client.inner, fetch, user_data, request) },
            &sink,
        ));
        FfiStatus::Ok
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Hand `request` to the host and decode what comes back.
fn host_fetch(
    client: &ApiClient,
    fetch: FfiFetchFn,
    user_data: *mut c_void,
    request: HttpRequest,
) -> Result<ApiResponse<Value>, FetchError> {
    let ffi_request = FfiHttpRequest::from_core(request);
    let mut response = FfiHttpResponse {
        status: 0,
        body: std::ptr::null(),
    };
    let performed = fetch(user_data, ffi_request, &mut response);
    // Copy the host's body before anything else can invalidate it.
    let received = performed.then(|| ffi_response_to_core(&response));
    unsafe { FfiHttpRequest::release(ffi_request) };

    match received {
        Some(response) => client.parse_envelope(response),
        None => Err(FetchError::Network("host transport reported failure".to_string())),
    }
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Forwards publications to the host's state callback.
struct HostSink {
    on_state: FfiStateFn,
    user_data: *mut c_void,
}

impl StateSink<Value> for HostSink {
    fn post(&self, response: ApiResponse<Value>) {
        let owned = OwnedUpdate::from_response(&response);
        let update = owned.view();
        (self.on_state)(self.user_data, &update);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
