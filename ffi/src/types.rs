//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests handed to the host are heap-allocated here and freed here.
//! Responses and state updates travel the other way as borrowed views: the
//! host fills an `FfiHttpResponse` it owns, and every `FfiStateUpdate`
//! pointer is valid only for the duration of the callback that receives it.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use fetch_state_core::{ApiResponse, HttpMethod, LoadState};
use serde_json::Value;

/// Opaque handle to an `ApiClient`.
pub struct FfiClient {
    pub(crate) inner: fetch_state_core::ApiClient,
}

/// Status returned by `fs_execute`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    Runtime = 3,
    Panic = 4,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request the host must execute. Free with `fs_free_request`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: fetch_state_core::HttpRequest) -> *mut Self {
        let url = to_cstring(&req.url).into_raw();
        let body = match req.body {
            Some(b) => to_cstring(&b).into_raw(),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_cstring(&k).into_raw(),
                    value: to_cstring(&v).into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }

    /// Release a request created by `from_core`.
    ///
    /// # Safety
    /// `req` must come from `from_core` and must not be used afterwards.
    pub(crate) unsafe fn release(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                drop(unsafe { CString::from_raw(h.key) });
                drop(unsafe { CString::from_raw(h.value) });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Host-filled response
// ---------------------------------------------------------------------------

/// Filled in by the host's fetch callback. `body` stays owned by the host
/// and only needs to remain valid until the callback returns control.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// State updates
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiLoadState {
    Loading = 0,
    Success = 1,
    Failed = 2,
    Error = 3,
}

impl From<LoadState> for FfiLoadState {
    fn from(s: LoadState) -> Self {
        match s {
            LoadState::Loading => FfiLoadState::Loading,
            LoadState::Success => FfiLoadState::Success,
            LoadState::Failed => FfiLoadState::Failed,
            LoadState::Error => FfiLoadState::Error,
        }
    }
}

/// One publication, borrowed for the duration of the state callback.
/// Null pointers mean "absent".
#[repr(C)]
pub struct FfiStateUpdate {
    pub state: FfiLoadState,
    pub error_code: i32,
    pub error_message: *const c_char,
    pub payload_json: *const c_char,
    pub fault: *const c_char,
}

/// Owns the strings an `FfiStateUpdate` points into.
pub(crate) struct OwnedUpdate {
    state: FfiLoadState,
    error_code: i32,
    error_message: Option<CString>,
    payload_json: Option<CString>,
    fault: Option<CString>,
}

impl OwnedUpdate {
    pub(crate) fn from_response(response: &ApiResponse<Value>) -> Self {
        Self {
            state: response.state.into(),
            error_code: response.error_code,
            error_message: response.error_message.as_deref().map(to_cstring),
            payload_json: response.payload.as_ref().map(|v| to_cstring(&v.to_string())),
            fault: response.error.as_ref().map(|e| to_cstring(&e.to_string())),
        }
    }

    pub(crate) fn view(&self) -> FfiStateUpdate {
        FfiStateUpdate {
            state: self.state,
            error_code: self.error_code,
            error_message: opt_ptr(&self.error_message),
            payload_json: opt_ptr(&self.payload_json),
            fault: opt_ptr(&self.fault),
        }
    }
}

/// Host HTTP call. Returns false when the request could not be performed.
pub type FfiFetchFn =
    extern "C" fn(user_data: *mut c_void, request: *const FfiHttpRequest, response: *mut FfiHttpResponse) -> bool;

/// Receives every state publication for one `fs_execute` call.
pub type FfiStateFn = extern "C" fn(user_data: *mut c_void, update: *const FfiStateUpdate);

/// C strings cannot carry interior NULs; drop them rather than fail.
pub(crate) fn to_cstring(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

fn opt_ptr(s: &Option<CString>) -> *const c_char {
    s.as_ref().map_or(std::ptr::null(), |c| c.as_ptr())
}
