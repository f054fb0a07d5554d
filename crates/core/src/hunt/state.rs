use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::HuntConfig,
    hunt::{CommandRejected, HuntProgress},
    stage::Stage,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum HuntStatus {
    NotStarted,
    #[serde(rename_all = "camelCase")]
    InProgress { stage_index: usize, found: bool },
    Completed,
}

/// Outcome of a successful [`HuntState::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advanced {
    NextStage(usize),
    Completed,
}

/// Stage progression for one hunt.
///
/// Holds the durable [`HuntProgress`] plus the in-memory `found` flag for the
/// current stage. All transitions go through here; persistence is the caller's
/// concern.
#[derive(Clone, Debug)]
pub struct HuntState {
    config: Arc<HuntConfig>,
    progress: HuntProgress,
    found: bool,
}

impl HuntState {
    pub fn new(config: Arc<HuntConfig>, mut progress: HuntProgress) -> Self {
        let stage_count = config.stage_count();
        if progress.clamp_to(stage_count) {
            tracing::warn!(
                stage_count,
                "saved progress points past the last stage, treating the hunt as complete"
            );
        }

        Self {
            config,
            progress,
            found: false,
        }
    }

    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    pub fn progress(&self) -> HuntProgress {
        self.progress
    }

    pub fn stage_count(&self) -> usize {
        self.config.stage_count()
    }

    pub fn status(&self) -> HuntStatus {
        if !self.progress.started {
            HuntStatus::NotStarted
        } else if self.progress.is_complete(self.stage_count()) {
            HuntStatus::Completed
        } else {
            HuntStatus::InProgress {
                stage_index: self.progress.current_stage_index,
                found: self.found,
            }
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.status(), HuntStatus::InProgress { .. })
    }

    pub fn found(&self) -> bool {
        self.found
    }

    /// The stage being searched for, if the hunt is in progress.
    pub fn current_stage(&self) -> Option<&Stage> {
        match self.status() {
            HuntStatus::InProgress { stage_index, .. } => self.config.stages.get(stage_index),
            _ => None,
        }
    }

    pub fn current_threshold(&self) -> f64 {
        self.config.threshold_for(self.progress.current_stage_index)
    }

    /// Enters play at the saved stage. Returns whether progress changed.
    pub fn start(&mut self) -> bool {
        if self.progress.started {
            return false;
        }

        self.progress.started = true;
        tracing::info!(stage_index = self.progress.current_stage_index, "hunt started");
        true
    }

    /// Feeds the latest distance to the current target. Returns the stage the
    /// first time it comes within range; later calls return `None` until the
    /// player advances.
    pub fn observe_distance(&mut self, meters: f64) -> Option<&Stage> {
        if self.found || !self.is_in_progress() {
            return None;
        }

        if meters < self.current_threshold() {
            self.found = true;
            let stage = self.config.stages.get(self.progress.current_stage_index)?;
            tracing::info!(stage = %stage.id, meters, "stage found");
            Some(stage)
        } else {
            None
        }
    }

    pub fn advance(&mut self) -> Result<Advanced, CommandRejected> {
        let HuntStatus::InProgress { stage_index, found } = self.status() else {
            return Err(CommandRejected::NotInProgress);
        };

        if !found {
            return Err(CommandRejected::StageNotFound(self.config.stages[stage_index].id));
        }

        self.found = false;
        self.progress.current_stage_index = stage_index + 1;

        if self.progress.current_stage_index < self.stage_count() {
            tracing::info!(stage_index = self.progress.current_stage_index, "advanced to next stage");
            Ok(Advanced::NextStage(self.progress.current_stage_index))
        } else {
            tracing::info!("hunt completed");
            Ok(Advanced::Completed)
        }
    }

    /// Operator override. Confirmation is the host's job; by the time this is
    /// called the jump is wanted. Jumping implies the hunt has started.
    pub fn jump_to(&mut self, index: usize) -> Result<(), CommandRejected> {
        let stage_count = self.stage_count();
        if index > stage_count {
            return Err(CommandRejected::StageOutOfRange { index, stage_count });
        }

        self.found = false;
        self.progress = HuntProgress {
            started: true,
            current_stage_index: index,
        };
        tracing::info!(stage_index = index, "jumped to stage");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.progress = HuntProgress::default();
        self.found = false;
        tracing::info!("hunt reset");
    }
}
