//! Push-based source for hosts that receive location callbacks.
//!
//! The host keeps the [`PositionFeed`] and pushes every fix its platform
//! reports; the session owns the [`ChannelPositionSource`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::position::{Position, PositionEvent, PositionSource, PositionStream, SourceError};

#[derive(Default)]
struct FeedInner {
    subscriber: Option<mpsc::UnboundedSender<PositionEvent>>,
    failure: Option<SourceError>,
}

fn lock(inner: &Mutex<FeedInner>) -> MutexGuard<'_, FeedInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ChannelPositionSource {
    inner: Arc<Mutex<FeedInner>>,
}

/// Host side of a [`ChannelPositionSource`]. Cheap to clone.
#[derive(Clone)]
pub struct PositionFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl ChannelPositionSource {
    pub fn new() -> (Self, PositionFeed) {
        let inner = Arc::new(Mutex::new(FeedInner::default()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            PositionFeed { inner },
        )
    }
}

impl PositionSource for ChannelPositionSource {
    fn start(&mut self) -> PositionStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = lock(&self.inner);

        match inner.failure.clone() {
            // the failure is terminal; hand it over and let the stream close
            Some(error) => {
                let _ = sender.send(PositionEvent::Unavailable(error));
                inner.subscriber = None;
            }
            None => inner.subscriber = Some(sender),
        }

        receiver
    }

    fn stop(&mut self) {
        lock(&self.inner).subscriber = None;
    }
}

impl Drop for ChannelPositionSource {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PositionFeed {
    /// Deliver a fix. Returns `false` when nobody is listening.
    pub fn push(&self, position: Position) -> bool {
        let mut inner = lock(&self.inner);
        let Some(subscriber) = &inner.subscriber else {
            return false;
        };

        if subscriber.send(PositionEvent::Fix(position)).is_err() {
            inner.subscriber = None;
            return false;
        }
        true
    }

    /// Report that location cannot be obtained. Only the first report is
    /// delivered; the subscription ends with it.
    pub fn fail(&self, error: SourceError) {
        let mut inner = lock(&self.inner);
        if inner.failure.is_some() {
            return;
        }

        tracing::warn!(%error, "position source unavailable");
        if let Some(subscriber) = inner.subscriber.take() {
            let _ = subscriber.send(PositionEvent::Unavailable(error.clone()));
        }
        inner.failure = Some(error);
    }

    /// Forget an earlier failure, e.g. after the user granted permission in
    /// system settings. Takes effect on the next `start`.
    pub fn clear_failure(&self) {
        lock(&self.inner).failure = None;
    }

    pub fn is_subscribed(&self) -> bool {
        lock(&self.inner).subscriber.is_some()
    }
}
