//! Reading recorded walks from GeoJSON.
//!
//! Accepted shapes, in walking order:
//! - a `LineString` (bare geometry or inside a feature)
//! - a `FeatureCollection` of `Point` and `LineString` features; a numeric
//!   `heading` property on a point feature becomes the fix's heading

use std::path::Path;

use anyhow::{Context, Result, bail};
use birthday_hunt_core::{Coordinate, Position};
use geo::{Coord, LineString, Point};
use geojson::{Feature, GeoJson};

pub fn read_trace(path: &Path) -> Result<Vec<Position>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace file: {}", path.display()))?;

    parse_trace(&content).with_context(|| format!("No usable trace found in: {}", path.display()))
}

pub fn parse_trace(content: &str) -> Result<Vec<Position>> {
    let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;

    let positions = match geojson {
        GeoJson::Geometry(geom) => geometry_to_positions(geom.value, None)?,
        GeoJson::Feature(feature) => feature_to_positions(feature)?,
        GeoJson::FeatureCollection(fc) => {
            let mut positions = Vec::new();
            for feature in fc.features {
                positions.extend(feature_to_positions(feature)?);
            }
            positions
        }
    };

    if positions.is_empty() {
        bail!("Trace contains no positions");
    }
    Ok(positions)
}

fn feature_to_positions(feature: Feature) -> Result<Vec<Position>> {
    let heading = feature.property("heading").and_then(|value| value.as_f64());

    match feature.geometry {
        Some(geom) => geometry_to_positions(geom.value, heading),
        None => bail!("Feature has no geometry"),
    }
}

fn geometry_to_positions(value: geojson::Value, heading: Option<f64>) -> Result<Vec<Position>> {
    match value {
        geojson::Value::Point(coords) => {
            let mut position = Position::from(Coordinate::from(coords_to_point(&coords)?));
            if let Some(heading) = heading {
                position = position.with_heading(heading);
            }
            Ok(vec![position])
        }
        geojson::Value::LineString(coords) => {
            let line = coords_to_linestring(&coords)?;
            Ok(line
                .points()
                .map(|point| Position::from(Coordinate::from(point)))
                .collect())
        }
        geojson::Value::MultiPoint(points) => points
            .iter()
            .map(|coords| Ok(Position::from(Coordinate::from(coords_to_point(coords)?))))
            .collect(),
        _ => bail!("Unsupported trace geometry, expected Point, MultiPoint or LineString"),
    }
}

fn coords_to_point(coords: &[f64]) -> Result<Point<f64>> {
    match coords {
        [x, y, ..] => Ok(Point::new(*x, *y)),
        _ => bail!("Position needs both longitude and latitude"),
    }
}

fn coords_to_linestring(coords: &[Vec<f64>]) -> Result<LineString<f64>> {
    coords
        .iter()
        .map(|c| coords_to_point(c).map(|p| Coord { x: p.x(), y: p.y() }))
        .collect::<Result<Vec<_>>>()
        .map(LineString::from)
}
