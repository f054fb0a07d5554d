use serde::{Deserialize, Serialize};

/// The durable part of a hunt. Everything else is rebuilt from configuration
/// and live position fixes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntProgress {
    pub started: bool,
    /// `stage_count` means the hunt is complete.
    pub current_stage_index: usize,
}

impl HuntProgress {
    pub fn is_complete(&self, stage_count: usize) -> bool {
        self.current_stage_index >= stage_count
    }

    /// Pulls an index persisted against a longer hunt back to the terminal
    /// sentinel. Returns whether anything changed.
    pub fn clamp_to(&mut self, stage_count: usize) -> bool {
        if self.current_stage_index > stage_count {
            self.current_stage_index = stage_count;
            true
        } else {
            false
        }
    }
}
