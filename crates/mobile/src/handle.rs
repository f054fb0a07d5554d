use std::sync::Arc;

use birthday_hunt_core::{
    ChannelPositionSource, Command, HuntConfig, HuntSession, MemoryProgressStore, Notification,
    Position, PositionFeed, ProgressStore, SqliteProgressStore,
};
use tokio::{
    runtime::Runtime,
    sync::{mpsc, watch},
};

use crate::records::{StageRecord, UnavailableReason, ViewRecord};

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum HuntHandleError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Storage(String),
    #[error("{0}")]
    Runtime(String),
}

/// Implemented by the Kotlin/Swift UI. Called from a background thread.
#[uniffi::export(with_foreign)]
pub trait HuntListener: Send + Sync {
    fn on_view_changed(&self, view: ViewRecord);
    fn on_unlocked(&self, stage_id: u32, title: String, message: String);
    fn on_completed(&self, message: String);
    fn on_position_unavailable(&self, reason: UnavailableReason);
}

/// One running hunt. The host forwards location callbacks and button presses;
/// state comes back through the [`HuntListener`].
#[derive(uniffi::Object)]
pub struct HuntHandle {
    #[allow(dead_code)] // Kept alive to keep the session running
    runtime: Runtime,
    commands: mpsc::UnboundedSender<Command>,
    feed: PositionFeed,
    latest_view: watch::Receiver<Option<ViewRecord>>,
    stages: Vec<StageRecord>,
}

#[uniffi::export]
impl HuntHandle {
    /// `database_path` of `None` keeps progress in memory only.
    #[uniffi::constructor]
    pub fn new(
        config_json: String,
        database_path: Option<String>,
        listener: Arc<dyn HuntListener>,
    ) -> Result<Self, HuntHandleError> {
        let config = HuntConfig::from_json_str(&config_json)
            .map_err(|e| HuntHandleError::Config(e.to_string()))?;
        let stages = config.stages.iter().map(StageRecord::from).collect();

        let store: Box<dyn ProgressStore> = match database_path {
            Some(path) => Box::new(
                SqliteProgressStore::open(&path)
                    .map_err(|e| HuntHandleError::Storage(e.to_string()))?,
            ),
            None => Box::new(MemoryProgressStore::default()),
        };

        let runtime = Runtime::new().map_err(|e| HuntHandleError::Runtime(e.to_string()))?;

        let (mut source, feed) = ChannelPositionSource::new();
        let (commands, mut command_rx) = mpsc::unbounded_channel();
        let (mut session, mut notifications) = HuntSession::new(config, store);
        let (view_tx, latest_view) = watch::channel(None);

        runtime.spawn(async move {
            session.run(&mut source, &mut command_rx).await;
        });

        runtime.spawn(async move {
            while let Some(notification) = notifications.recv().await {
                forward(listener.as_ref(), &view_tx, notification);
            }
        });

        tracing::info!("hunt handle ready");

        Ok(Self {
            runtime,
            commands,
            feed,
            latest_view,
            stages,
        })
    }

    pub fn stages(&self) -> Vec<StageRecord> {
        self.stages.clone()
    }

    /// Last view delivered to the listener, if any.
    pub fn current_view(&self) -> Option<ViewRecord> {
        self.latest_view.borrow().clone()
    }

    pub fn start(&self) {
        self.send(Command::Start);
    }

    pub fn advance(&self) {
        self.send(Command::Advance);
    }

    /// The host must have confirmed the jump with the player already.
    pub fn jump_to(&self, stage_index: u32) {
        self.send(Command::JumpTo(stage_index as usize));
    }

    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    pub fn recenter(&self) {
        self.send(Command::Recenter);
    }

    pub fn manual_pan_detected(&self) {
        self.send(Command::ManualPan);
    }

    /// Returns `false` when the session is not currently listening, e.g.
    /// before the hunt starts.
    pub fn push_position(&self, latitude: f64, longitude: f64, heading_deg: Option<f64>) -> bool {
        let mut position = Position::new(latitude, longitude);
        if let Some(heading) = heading_deg {
            position = position.with_heading(heading);
        }
        self.feed.push(position)
    }

    pub fn report_unavailable(&self, reason: UnavailableReason) {
        self.feed.fail(reason.into());
    }

    /// Call after the player grants location access, then `start` to listen
    /// again. Progress is kept.
    pub fn location_restored(&self) {
        self.feed.clear_failure();
    }
}

impl HuntHandle {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!(?command, "hunt session has stopped, dropping command");
        }
    }
}

fn forward(
    listener: &dyn HuntListener,
    view_tx: &watch::Sender<Option<ViewRecord>>,
    notification: Notification,
) {
    match notification {
        Notification::ViewChanged(view) => {
            let record = ViewRecord::from(&view);
            view_tx.send_replace(Some(record.clone()));
            listener.on_view_changed(record);
        }
        Notification::Unlocked {
            stage,
            title,
            message,
        } => listener.on_unlocked(stage.0, title, message),
        Notification::Completed { message } => listener.on_completed(message),
        Notification::PositionUnavailable(error) => {
            listener.on_position_unavailable(UnavailableReason::from(&error))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Mutex,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::records::HuntPhase;

    const CONFIG: &str = r#"{
        "completionMessage": "YOU WIN!",
        "stages": [
            { "id": 1, "title": "The First Clue", "clue": "home",
              "unlockMessage": "Zzzz", "target": { "lat": 55.0005, "lng": -7.2698 } }
        ]
    }"#;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn wait_for(&self, event: &str) -> bool {
            let deadline = Instant::now() + Duration::from_secs(5);
            while Instant::now() < deadline {
                if self.events.lock().unwrap().iter().any(|e| e == event) {
                    return true;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            false
        }
    }

    impl HuntListener for Recorder {
        fn on_view_changed(&self, view: ViewRecord) {
            let event = format!("view:{:?}:{}", view.phase, view.found);
            self.events.lock().unwrap().push(event);
        }

        fn on_unlocked(&self, stage_id: u32, _title: String, message: String) {
            self.events.lock().unwrap().push(format!("unlocked:{stage_id}:{message}"));
        }

        fn on_completed(&self, message: String) {
            self.events.lock().unwrap().push(format!("completed:{message}"));
        }

        fn on_position_unavailable(&self, reason: UnavailableReason) {
            self.events.lock().unwrap().push(format!("unavailable:{reason:?}"));
        }
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let result = HuntHandle::new("{}".into(), None, Arc::new(Recorder::default()));

        assert!(matches!(result, Err(HuntHandleError::Config(_))));
    }

    #[test]
    fn test_full_hunt_through_the_handle() {
        let recorder = Arc::new(Recorder::default());
        let handle = HuntHandle::new(CONFIG.into(), None, recorder.clone()).unwrap();
        assert_eq!(handle.stages()[0].title, "The First Clue");

        handle.start();
        assert!(recorder.wait_for("view:InProgress:false"));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.push_position(55.0005, -7.2698, Some(10.0)) {
            assert!(Instant::now() < deadline, "session never subscribed");
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(recorder.wait_for("unlocked:1:Zzzz"));
        assert!(recorder.wait_for("view:InProgress:true"));

        handle.advance();
        assert!(recorder.wait_for("completed:YOU WIN!"));
        assert!(recorder.wait_for("view:Completed:false"));
        assert_eq!(
            handle.current_view().map(|view| view.phase),
            Some(HuntPhase::Completed)
        );
    }

    #[test]
    fn test_unavailable_reported_to_listener() {
        let recorder = Arc::new(Recorder::default());
        let handle = HuntHandle::new(CONFIG.into(), None, recorder.clone()).unwrap();

        handle.report_unavailable(UnavailableReason::PermissionDenied);
        handle.start();

        assert!(recorder.wait_for("unavailable:PermissionDenied"));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.current_view().is_some_and(|view| view.position_unavailable) {
            assert!(Instant::now() < deadline, "view never reported the failure");
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(handle.current_view().is_some_and(|view| view.locating));
    }
}
