//! Stages and the coordinates they point at.

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<Coordinate> for Point {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<Point> for Coordinate {
    fn from(point: Point) -> Self {
        Coordinate::new(point.y(), point.x())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Ordinal identifier of a stage as written in the hunt configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub u32);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One waypoint of the hunt. Display strings are opaque to the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub title: String,
    pub clue: String,
    /// May be empty; hosts decide how to present an empty unlock panel.
    #[serde(default)]
    pub unlock_message: String,
    pub target: Coordinate,
    /// Overrides the hunt-wide threshold for this stage only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_threshold_m: Option<f64>,
}

impl Stage {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        clue: impl Into<String>,
        unlock_message: impl Into<String>,
        target: Coordinate,
    ) -> Self {
        Self {
            id: StageId(id),
            title: title.into(),
            clue: clue.into(),
            unlock_message: unlock_message.into(),
            target,
            proximity_threshold_m: None,
        }
    }

    pub fn with_threshold(mut self, meters: f64) -> Self {
        self.proximity_threshold_m = Some(meters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion_swaps_axes() {
        let coordinate = Coordinate::new(55.0005, -7.2698);
        let point: Point = coordinate.into();

        assert_eq!(point.x(), -7.2698);
        assert_eq!(point.y(), 55.0005);
        assert_eq!(Coordinate::from(point), coordinate);
    }

    #[test]
    fn test_stage_deserializes_short_keys() {
        let stage: Stage = serde_json::from_str(
            r#"{
                "id": 2,
                "title": "Spot #2",
                "clue": "Where Buttons watches Spring Lambs",
                "target": { "lat": 54.999657, "lng": -7.268305 }
            }"#,
        )
        .unwrap();

        assert_eq!(stage.id, StageId(2));
        assert_eq!(stage.unlock_message, "");
        assert_eq!(stage.target, Coordinate::new(54.999657, -7.268305));
        assert_eq!(stage.proximity_threshold_m, None);
    }

    #[test]
    fn test_stage_id_display() {
        assert_eq!(format!("{}", StageId(6)), "#6");
    }
}
