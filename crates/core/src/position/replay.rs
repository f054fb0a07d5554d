//! Replays recorded fixes on a timer. Used to dry-run a hunt from a GPS trace.

use std::time::Duration;

use tokio::{sync::mpsc, sync::watch, task::JoinHandle};

use crate::position::{Position, PositionEvent, PositionSource, PositionStream};

pub struct ReplayPositionSource {
    fixes: Vec<Position>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
    exhausted: watch::Sender<bool>,
}

impl ReplayPositionSource {
    pub fn new(fixes: Vec<Position>, interval: Duration) -> Self {
        let (exhausted, _) = watch::channel(false);
        Self {
            fixes,
            interval,
            task: None,
            exhausted,
        }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Flips to `true` once the last fix has been handed to the subscriber.
    pub fn exhausted(&self) -> watch::Receiver<bool> {
        self.exhausted.subscribe()
    }
}

impl PositionSource for ReplayPositionSource {
    /// Must be called from within a tokio runtime. Each `start` replays the
    /// trace from the beginning.
    fn start(&mut self) -> PositionStream {
        self.stop();

        let (sender, receiver) = mpsc::unbounded_channel();
        let fixes = self.fixes.clone();
        let interval = self.interval;
        let exhausted = self.exhausted.clone();
        exhausted.send_replace(false);

        self.task = Some(tokio::spawn(async move {
            for (index, fix) in fixes.into_iter().enumerate() {
                if index > 0 && !interval.is_zero() {
                    tokio::time::sleep(interval).await;
                }
                if sender.send(PositionEvent::Fix(fix)).is_err() {
                    return;
                }
            }
            tracing::debug!("replay trace exhausted");
            exhausted.send_replace(true);
        }));

        receiver
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ReplayPositionSource {
    fn drop(&mut self) {
        self.stop();
    }
}
