// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed GeoJSON geometry
//!
//! One variant per GeoJSON geometry type, read from the generic JSON value
//! tree with strict shape checks.

use serde_json::Value;

use crate::error::{Error, Result};

/// GeoJSON geometry type names, in the order they are matched.
pub const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// A coordinate; `z` is 0 when the input gives only `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<Position> for [f64; 3] {
    fn from(p: Position) -> Self {
        [p.x, p.y, p.z]
    }
}

/// A closed ring with its repeated closing position removed.
pub type Ring = Vec<Position>;

/// Polygon rings: exterior first, then holes.
pub type PolygonRings = Vec<Ring>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// Read a geometry node (`{"type": ..., "coordinates": ...}` or a
    /// `GeometryCollection` with `"geometries"`).
    pub fn from_json(node: &Value) -> Result<Geometry> {
        let type_name = type_of(node)?;
        match type_name {
            "Point" => Ok(Geometry::Point(position(coordinates(node)?)?)),
            "MultiPoint" => Ok(Geometry::MultiPoint(positions(coordinates(node)?)?)),
            "LineString" => Ok(Geometry::LineString(line(coordinates(node)?)?)),
            "MultiLineString" => Ok(Geometry::MultiLineString(
                array(coordinates(node)?, "MultiLineString coordinates")?
                    .iter()
                    .map(line)
                    .collect::<Result<_>>()?,
            )),
            "Polygon" => Ok(Geometry::Polygon(polygon(coordinates(node)?)?)),
            "MultiPolygon" => Ok(Geometry::MultiPolygon(
                array(coordinates(node)?, "MultiPolygon coordinates")?
                    .iter()
                    .map(polygon)
                    .collect::<Result<_>>()?,
            )),
            "GeometryCollection" => {
                let members = node
                    .get("geometries")
                    .ok_or_else(|| Error::malformed("GeometryCollection without \"geometries\""))?;
                Ok(Geometry::GeometryCollection(
                    array(members, "GeometryCollection geometries")?
                        .iter()
                        .map(Geometry::from_json)
                        .collect::<Result<_>>()?,
                ))
            }
            other => Err(Error::unsupported(other)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// Number of cells this geometry contributes before polygon post-processing
    pub fn cell_count(&self) -> usize {
        match self {
            Geometry::Point(_) | Geometry::LineString(_) | Geometry::Polygon(_) => 1,
            Geometry::MultiPoint(points) => points.len(),
            Geometry::MultiLineString(lines) => lines.len(),
            Geometry::MultiPolygon(polygons) => polygons.len(),
            Geometry::GeometryCollection(members) => members.iter().map(Geometry::cell_count).sum(),
        }
    }
}

/// Whether `name` is one of the seven geometry type names
pub fn is_geometry_type(name: &str) -> bool {
    GEOMETRY_TYPES.contains(&name)
}

/// The `"type"` discriminator of a node
pub fn type_of(node: &Value) -> Result<&str> {
    let object = node
        .as_object()
        .ok_or_else(|| Error::malformed(format!("expected an object, found {}", kind_of(node))))?;
    match object.get("type") {
        Some(Value::String(name)) => Ok(name.as_str()),
        Some(other) => Err(Error::malformed(format!(
            "\"type\" must be a string, found {}",
            kind_of(other)
        ))),
        None => Err(Error::malformed("missing \"type\" member")),
    }
}

/// Short JSON kind name for error messages
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coordinates(node: &Value) -> Result<&Value> {
    node.get("coordinates")
        .ok_or_else(|| Error::malformed("missing \"coordinates\" member"))
}

fn array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::malformed(format!("{} must be an array, found {}", what, kind_of(value))))
}

fn position(value: &Value) -> Result<Position> {
    let items = array(value, "position")?;
    if !(2..=3).contains(&items.len()) {
        return Err(Error::malformed(format!(
            "position must have 2 or 3 numbers, found {}",
            items.len()
        )));
    }

    let mut xyz = [0.0f64; 3];
    for (slot, item) in xyz.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .ok_or_else(|| Error::malformed(format!("position holds a non-numeric {}", kind_of(item))))?;
    }
    Ok(Position::new(xyz[0], xyz[1], xyz[2]))
}

fn positions(value: &Value) -> Result<Vec<Position>> {
    array(value, "position list")?.iter().map(position).collect()
}

fn line(value: &Value) -> Result<Vec<Position>> {
    let points = positions(value)?;
    if points.len() < 2 {
        return Err(Error::malformed(format!(
            "LineString needs at least 2 positions, found {}",
            points.len()
        )));
    }
    Ok(points)
}

fn ring(value: &Value) -> Result<Ring> {
    let mut points = positions(value)?;
    // Repeated consecutive positions give zero-length edges
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let distinct = distinct_count(&points, 3);
    if distinct < 3 {
        return Err(Error::malformed(format!(
            "linear ring needs at least 3 distinct positions, found {}",
            distinct
        )));
    }
    Ok(points)
}

/// Number of distinct positions, counting no further than `limit`
fn distinct_count(points: &[Position], limit: usize) -> usize {
    let mut seen: Vec<&Position> = Vec::with_capacity(limit);
    for p in points {
        if !seen.contains(&p) {
            seen.push(p);
            if seen.len() == limit {
                break;
            }
        }
    }
    seen.len()
}

fn polygon(value: &Value) -> Result<PolygonRings> {
    let rings = array(value, "Polygon coordinates")?
        .iter()
        .map(ring)
        .collect::<Result<PolygonRings>>()?;
    if rings.is_empty() {
        return Err(Error::malformed("Polygon has no rings"));
    }
    Ok(rings)
}
