use serde::Serialize;

use crate::{
    geodesy::{distance_meters, initial_bearing_degrees},
    hunt::{HuntState, HuntStatus},
    position::Position,
    stage::Coordinate,
};

/// Everything a host needs to draw the current frame.
///
/// Always rebuilt from scratch by [`SessionView::compute`]; never patched.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: HuntStatus,
    pub stage_index: usize,
    pub stage_count: usize,
    pub user_position: Option<Position>,
    pub target: Option<Coordinate>,
    /// Whole meters, rounded down.
    pub distance_m: Option<u32>,
    /// Direction from the player to the target, for the compass arrow.
    pub bearing_deg: Option<f64>,
    pub found: bool,
    pub follow: bool,
    /// In play, but no fix has arrived yet.
    pub locating: bool,
    pub position_unavailable: bool,
}

impl SessionView {
    pub fn compute(
        hunt: &HuntState,
        position: Option<&Position>,
        follow: bool,
        position_unavailable: bool,
    ) -> Self {
        let status = hunt.status();
        let target = hunt.current_stage().map(|stage| stage.target);

        let (distance_m, bearing_deg) = match (position, target) {
            (Some(position), Some(target)) if position.coordinate.is_finite() => (
                Some(distance_meters(position.coordinate, target).floor() as u32),
                Some(initial_bearing_degrees(position.coordinate, target)),
            ),
            _ => (None, None),
        };

        let in_progress = matches!(status, HuntStatus::InProgress { .. });

        Self {
            status,
            stage_index: hunt.progress().current_stage_index,
            stage_count: hunt.stage_count(),
            user_position: position.copied(),
            target,
            distance_m,
            bearing_deg,
            found: in_progress && hunt.found(),
            follow,
            locating: in_progress && position.is_none(),
            position_unavailable,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == HuntStatus::Completed
    }
}
