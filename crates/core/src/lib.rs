//! # birthday-hunt-core
//!
//! Proximity tracking and stage progression for a location-based scavenger hunt.
//!
//! The player walks an ordered list of stages. Each stage is found once a
//! position fix lands within its proximity threshold, after which the player
//! may advance to the next clue. Progress survives restarts through a
//! [`ProgressStore`](persistence::ProgressStore).
//!
//! ## Example
//!
//! ```
//! use birthday_hunt_core::prelude::*;
//!
//! let config = HuntConfig::from_json_str(r#"{
//!     "stages": [
//!         { "id": 1, "title": "The First Clue", "clue": "Right here at home",
//!           "unlockMessage": "Zzzzz", "target": { "lat": 55.0005, "lng": -7.2698 } }
//!     ]
//! }"#).unwrap();
//!
//! let (mut session, mut notifications) =
//!     HuntSession::new(config, Box::new(MemoryProgressStore::default()));
//!
//! session.apply(Command::Start);
//! session.handle_position(PositionEvent::Fix(Position::new(55.0005, -7.2698)));
//!
//! assert!(session.view().found);
//! # let _ = notifications.try_recv();
//! ```

pub mod config;
pub mod geodesy;
pub mod hunt;
pub mod persistence;
pub mod position;
pub mod session;
pub mod stage;

pub mod prelude {
    pub use crate::config::{ConfigError, DEFAULT_PROXIMITY_THRESHOLD_M, HuntConfig};
    pub use crate::geodesy::{distance_meters, initial_bearing_degrees};
    pub use crate::hunt::{Advanced, CommandRejected, HuntProgress, HuntState, HuntStatus};
    pub use crate::persistence::{
        MemoryProgressStore, PersistenceError, ProgressStore, sqlite::SqliteProgressStore,
    };
    pub use crate::position::{
        Position, PositionEvent, PositionSource, PositionStream, SourceError,
        channel::{ChannelPositionSource, PositionFeed},
        replay::ReplayPositionSource,
    };
    pub use crate::session::{
        Command, HuntSession, Notification, NotificationStream, view::SessionView,
    };
    pub use crate::stage::{Coordinate, Stage, StageId};
}

pub use prelude::*;
