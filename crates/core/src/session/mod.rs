//! The session controller: the single place where position fixes and player
//! commands meet the hunt state.

pub mod view;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::HuntConfig,
    geodesy::distance_meters,
    hunt::{Advanced, HuntProgress, HuntState},
    persistence::ProgressStore,
    position::{Position, PositionEvent, PositionSource, PositionStream, SourceError},
    session::view::SessionView,
    stage::{Coordinate, StageId},
};

/// Player intents forwarded by the host UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Advance,
    /// Operator shortcut; the host has already confirmed it with the player.
    JumpTo(usize),
    Reset,
    Recenter,
    ManualPan,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    ViewChanged(SessionView),
    Unlocked {
        stage: StageId,
        title: String,
        message: String,
    },
    Completed {
        message: String,
    },
    PositionUnavailable(SourceError),
}

pub type NotificationStream = mpsc::UnboundedReceiver<Notification>;

pub struct HuntSession {
    hunt: HuntState,
    store: Box<dyn ProgressStore>,
    position: Option<Position>,
    follow: bool,
    position_unavailable: bool,
    source_closed: bool,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl HuntSession {
    /// Loads saved progress from `store`. A store that cannot be read is
    /// treated like an empty one.
    pub fn new(config: HuntConfig, store: Box<dyn ProgressStore>) -> (Self, NotificationStream) {
        let progress = match store.load() {
            Ok(Some(progress)) => {
                tracing::debug!(?progress, "restored hunt progress");
                progress
            }
            Ok(None) => HuntProgress::default(),
            Err(error) => {
                tracing::warn!(%error, "failed to load hunt progress, starting fresh");
                HuntProgress::default()
            }
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        let session = Self {
            hunt: HuntState::new(Arc::new(config), progress),
            store,
            position: None,
            follow: true,
            position_unavailable: false,
            source_closed: false,
            notifications: sender,
        };

        (session, receiver)
    }

    pub fn hunt(&self) -> &HuntState {
        &self.hunt
    }

    pub fn follow(&self) -> bool {
        self.follow
    }

    pub fn view(&self) -> SessionView {
        SessionView::compute(
            &self.hunt,
            self.position.as_ref(),
            self.follow,
            self.position_unavailable,
        )
    }

    pub fn handle_position(&mut self, event: PositionEvent) {
        match event {
            PositionEvent::Fix(position) => {
                let Some(target) = self.hunt.current_stage().map(|stage| stage.target) else {
                    tracing::trace!("ignoring fix while the hunt is not in play");
                    return;
                };

                self.position = Some(position);
                self.check_proximity(position, target);
                self.emit_view();
            }
            PositionEvent::Unavailable(error) => {
                if self.position_unavailable {
                    return;
                }
                self.position_unavailable = true;
                self.emit(Notification::PositionUnavailable(error));
                self.emit_view();
            }
        }
    }

    pub fn apply(&mut self, command: Command) {
        tracing::debug!(?command, "applying command");

        match command {
            Command::Start => {
                if self.hunt.start() {
                    self.persist();
                } else if self.position_unavailable || self.source_closed {
                    tracing::info!("restart requested, listening for positions again");
                    self.position_unavailable = false;
                    self.source_closed = false;
                }
                self.follow = true;
            }
            Command::Advance => match self.hunt.advance() {
                Ok(Advanced::NextStage(_)) => {
                    self.persist();
                    self.follow = true;
                    // the player may already be standing on the next target
                    let target = self.hunt.current_stage().map(|stage| stage.target);
                    if let (Some(position), Some(target)) = (self.position, target) {
                        self.check_proximity(position, target);
                    }
                }
                Ok(Advanced::Completed) => {
                    self.persist();
                    let message = self.hunt.config().completion_message.clone();
                    self.emit(Notification::Completed { message });
                }
                Err(rejected) => {
                    tracing::debug!(%rejected, "ignoring advance");
                    return;
                }
            },
            Command::JumpTo(index) => match self.hunt.jump_to(index) {
                Ok(()) => {
                    self.persist();
                    self.follow = true;
                }
                Err(rejected) => {
                    tracing::debug!(%rejected, "ignoring jump");
                    return;
                }
            },
            Command::Reset => {
                self.hunt.reset();
                self.position = None;
                self.position_unavailable = false;
                self.source_closed = false;
                self.follow = true;
                self.persist();
            }
            Command::Recenter => self.follow = true,
            Command::ManualPan => self.follow = false,
        }

        self.emit_view();
    }

    /// Drive the session until the command channel closes.
    ///
    /// The source is subscribed only while the hunt is in play and is always
    /// stopped before returning.
    pub async fn run(
        &mut self,
        source: &mut dyn PositionSource,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) {
        let mut stream: Option<PositionStream> = None;
        self.emit_view();

        loop {
            self.sync_subscription(source, &mut stream);

            tokio::select! {
                biased;

                event = next_event(&mut stream) => match event {
                    Some(event) => self.handle_position(event),
                    None => {
                        tracing::debug!("position stream closed");
                        self.source_closed = true;
                        source.stop();
                        stream = None;
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
            }
        }

        source.stop();
        tracing::debug!("session loop finished");
    }

    fn sync_subscription(
        &mut self,
        source: &mut dyn PositionSource,
        stream: &mut Option<PositionStream>,
    ) {
        let wanted =
            self.hunt.is_in_progress() && !self.position_unavailable && !self.source_closed;

        match (wanted, stream.is_some()) {
            (true, false) => {
                tracing::debug!("subscribing to position source");
                *stream = Some(source.start());
            }
            (false, true) => {
                tracing::debug!("releasing position source");
                source.stop();
                *stream = None;
            }
            _ => {}
        }
    }

    fn check_proximity(&mut self, position: Position, target: Coordinate) {
        let meters = distance_meters(position.coordinate, target);

        if let Some(stage) = self.hunt.observe_distance(meters) {
            let unlocked = Notification::Unlocked {
                stage: stage.id,
                title: stage.title.clone(),
                message: stage.unlock_message.clone(),
            };
            self.emit(unlocked);
        }
    }

    fn persist(&mut self) {
        if let Err(error) = self.store.save(&self.hunt.progress()) {
            tracing::warn!(%error, "failed to save hunt progress, continuing in memory");
        }
    }

    fn emit_view(&self) {
        self.emit(Notification::ViewChanged(self.view()));
    }

    fn emit(&self, notification: Notification) {
        // nobody listening is fine; the session keeps running headless
        let _ = self.notifications.send(notification);
    }
}

async fn next_event(stream: &mut Option<PositionStream>) -> Option<PositionEvent> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}
