//! Targets that receive state publications.
//!
//! # Design
//! A sink is fire-and-forget: `post` never fails and never waits for the
//! observer. `WatchSink` is the default single-slot target; concurrent posts
//! from several requests are not coordinated and the last one wins.
//! `CallbackSink` lets the observing layer register a closure instead.

use std::sync::Arc;

use tokio::sync::watch;

use crate::response::ApiResponse;

/// Receives every state an executor publishes for a request.
pub trait StateSink<T> {
    fn post(&self, response: ApiResponse<T>);
}

impl<T, S: StateSink<T> + ?Sized> StateSink<T> for &S {
    fn post(&self, response: ApiResponse<T>) {
        (**self).post(response)
    }
}

impl<T, S: StateSink<T> + ?Sized> StateSink<T> for Arc<S> {
    fn post(&self, response: ApiResponse<T>) {
        (**self).post(response)
    }
}

/// Last-value-wins slot backed by a `tokio::sync::watch` channel.
///
/// Safe to post from any thread. The slot starts empty; observers obtained
/// through [`WatchSink::subscribe`] see `None` until the first publication.
#[derive(Debug)]
pub struct WatchSink<T> {
    sender: watch::Sender<Option<ApiResponse<T>>>,
}

impl<T> WatchSink<T> {
    /// An empty slot with no observers yet.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// A new observer, woken on every publication after this call.
    pub fn subscribe(&self) -> watch::Receiver<Option<ApiResponse<T>>> {
        self.sender.subscribe()
    }
}

impl<T: Clone> WatchSink<T> {
    /// Snapshot of the slot.
    pub fn latest(&self) -> Option<ApiResponse<T>> {
        self.sender.borrow().clone()
    }
}

impl<T> Default for WatchSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateSink<T> for WatchSink<T> {
    fn post(&self, response: ApiResponse<T>) {
        // send_replace stores the value even when nobody is subscribed yet.
        self.sender.send_replace(Some(response));
    }
}

/// Forwards every publication to a closure owned by the observer.
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<T, F: Fn(ApiResponse<T>)> StateSink<T> for CallbackSink<F> {
    fn post(&self, response: ApiResponse<T>) {
        (self.callback)(response)
    }
}
