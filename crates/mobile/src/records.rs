//! FFI-friendly mirrors of the core types.

use birthday_hunt_core::{HuntStatus, SessionView, SourceError, Stage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum HuntPhase {
    NotStarted,
    InProgress,
    Completed,
}

impl From<HuntStatus> for HuntPhase {
    fn from(status: HuntStatus) -> Self {
        match status {
            HuntStatus::NotStarted => HuntPhase::NotStarted,
            HuntStatus::InProgress { .. } => HuntPhase::InProgress,
            HuntStatus::Completed => HuntPhase::Completed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct StageRecord {
    pub id: u32,
    pub title: String,
    pub clue: String,
    pub unlock_message: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Stage> for StageRecord {
    fn from(stage: &Stage) -> Self {
        Self {
            id: stage.id.0,
            title: stage.title.clone(),
            clue: stage.clue.clone(),
            unlock_message: stage.unlock_message.clone(),
            latitude: stage.target.latitude,
            longitude: stage.target.longitude,
        }
    }
}

/// What the map and clue card show. Coordinates are flattened because the
/// host map SDKs want plain numbers.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct ViewRecord {
    pub phase: HuntPhase,
    pub stage_index: u32,
    pub stage_count: u32,
    pub user_latitude: Option<f64>,
    pub user_longitude: Option<f64>,
    pub heading_deg: Option<f64>,
    pub target_latitude: Option<f64>,
    pub target_longitude: Option<f64>,
    pub distance_m: Option<u32>,
    pub bearing_deg: Option<f64>,
    pub found: bool,
    pub follow: bool,
    pub locating: bool,
    pub position_unavailable: bool,
}

impl From<&SessionView> for ViewRecord {
    fn from(view: &SessionView) -> Self {
        Self {
            phase: view.status.into(),
            stage_index: view.stage_index as u32,
            stage_count: view.stage_count as u32,
            user_latitude: view.user_position.map(|p| p.coordinate.latitude),
            user_longitude: view.user_position.map(|p| p.coordinate.longitude),
            heading_deg: view.user_position.and_then(|p| p.heading),
            target_latitude: view.target.map(|t| t.latitude),
            target_longitude: view.target.map(|t| t.longitude),
            distance_m: view.distance_m,
            bearing_deg: view.bearing_deg,
            found: view.found,
            follow: view.follow,
            locating: view.locating,
            position_unavailable: view.position_unavailable,
        }
    }
}

/// Why the platform cannot supply a location.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum UnavailableReason {
    Unsupported,
    PermissionDenied,
    Other { detail: String },
}

impl From<UnavailableReason> for SourceError {
    fn from(reason: UnavailableReason) -> Self {
        match reason {
            UnavailableReason::Unsupported => SourceError::Unsupported,
            UnavailableReason::PermissionDenied => SourceError::PermissionDenied,
            UnavailableReason::Other { detail } => SourceError::Other(detail),
        }
    }
}

impl From<&SourceError> for UnavailableReason {
    fn from(error: &SourceError) -> Self {
        match error {
            SourceError::Unsupported => UnavailableReason::Unsupported,
            SourceError::PermissionDenied => UnavailableReason::PermissionDenied,
            SourceError::Other(detail) => UnavailableReason::Other {
                detail: detail.clone(),
            },
        }
    }
}
