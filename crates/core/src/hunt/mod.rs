pub mod progress;
pub mod state;

pub use progress::HuntProgress;
pub use state::{Advanced, HuntState, HuntStatus};

use crate::stage::StageId;

/// A command that does not apply to the current state. The session ignores
/// these; they never reach the player.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandRejected {
    #[error("the hunt is not in progress")]
    NotInProgress,

    #[error("stage {0} has not been found yet")]
    StageNotFound(StageId),

    #[error("stage index {index} is past the end of a {stage_count} stage hunt")]
    StageOutOfRange { index: usize, stage_count: usize },
}
