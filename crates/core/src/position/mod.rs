//! Continuous location feeds.
//!
//! A [`PositionSource`] hands its single subscriber a [`PositionStream`]. Fixes
//! arrive as the platform produces them; a denied or missing location service
//! is reported once as [`PositionEvent::Unavailable`] and then the stream
//! closes.

pub mod channel;
pub mod replay;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{geodesy::normalize_degrees, stage::Coordinate};

/// A single location fix. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coordinate: Coordinate,
    /// Device heading in degrees, `[0, 360)`, when a compass is available.
    pub heading: Option<f64>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            heading: None,
        }
    }

    pub fn with_heading(mut self, degrees: f64) -> Self {
        self.heading = degrees.is_finite().then(|| normalize_degrees(degrees));
        self
    }
}

impl From<Coordinate> for Position {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            heading: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("location services are not supported on this device")]
    Unsupported,

    #[error("location permission was denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Other(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PositionEvent {
    Fix(Position),
    Unavailable(SourceError),
}

pub type PositionStream = mpsc::UnboundedReceiver<PositionEvent>;

pub trait PositionSource: Send {
    /// Begin delivering fixes. Replaces any earlier subscription.
    fn start(&mut self) -> PositionStream;

    /// Stop delivering and release the subscription. Safe to call at any time,
    /// any number of times.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_is_normalized() {
        assert_eq!(Position::new(0.0, 0.0).with_heading(-45.0).heading, Some(315.0));
        assert_eq!(Position::new(0.0, 0.0).with_heading(360.0).heading, Some(0.0));
        assert_eq!(Position::new(0.0, 0.0).with_heading(f64::NAN).heading, None);
    }
}
