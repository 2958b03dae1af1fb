// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon post-processing
//!
//! Runs once over the whole polygon table after every feature is built.

use nalgebra::Point3;

use crate::mesh::{CellArray, PolygonCell, PolygonCells};
use crate::triangulation::triangulate_rings_3d;

/// What polygon cells become in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    /// Filled polygons with holes, unchanged
    #[default]
    Filled,
    /// Triangles covering each polygon minus its holes
    Triangulate,
    /// One closed polyline per ring
    Outline,
}

impl PolygonMode {
    /// Resolve the two polygon flags. Outline takes precedence when both are set.
    pub fn from_flags(triangulate: bool, outline: bool) -> Self {
        match (triangulate, outline) {
            (_, true) => PolygonMode::Outline,
            (true, false) => PolygonMode::Triangulate,
            (false, false) => PolygonMode::Filled,
        }
    }
}

/// Post-processed polygon table plus, for every output cell, the index of
/// the input polygon cell it came from
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessed {
    pub cells: PolygonCells,
    pub parents: Vec<usize>,
}

pub fn post_process(
    vertices: &[Point3<f64>],
    polygons: Vec<PolygonCell>,
    mode: PolygonMode,
) -> PostProcessed {
    match mode {
        PolygonMode::Filled => PostProcessed {
            parents: (0..polygons.len()).collect(),
            cells: PolygonCells::Filled(polygons),
        },
        PolygonMode::Triangulate => triangulate(vertices, &polygons),
        PolygonMode::Outline => outline(&polygons),
    }
}

fn triangulate(vertices: &[Point3<f64>], polygons: &[PolygonCell]) -> PostProcessed {
    let mut triangles = Vec::with_capacity(polygons.len() * 2);
    let mut parents = Vec::with_capacity(polygons.len() * 2);
    let mut failed = 0usize;

    for (parent, polygon) in polygons.iter().enumerate() {
        let rings: Vec<Vec<Point3<f64>>> = polygon
            .rings
            .iter()
            .map(|ring| ring.iter().map(|&v| vertices[v as usize]).collect())
            .collect();

        let corners = match triangulate_rings_3d(&rings) {
            Ok(corners) => corners,
            Err(e) => {
                tracing::warn!(polygon = parent, error = %e, "Polygon dropped from triangulated output");
                failed += 1;
                continue;
            }
        };

        // Corner indices address the concatenated rings
        let flat: Vec<u32> = polygon.rings.iter().flatten().copied().collect();
        for tri in corners.chunks_exact(3) {
            triangles.push([flat[tri[0]], flat[tri[1]], flat[tri[2]]]);
            parents.push(parent);
        }
    }

    tracing::debug!(
        polygons = polygons.len(),
        triangles = triangles.len(),
        failed,
        "Triangulated polygon table"
    );
    PostProcessed {
        cells: PolygonCells::Triangles(triangles),
        parents,
    }
}

fn outline(polygons: &[PolygonCell]) -> PostProcessed {
    let mut lines = CellArray::new();
    let mut parents = Vec::with_capacity(polygons.len());
    let mut closed = Vec::new();

    for (parent, polygon) in polygons.iter().enumerate() {
        for ring in &polygon.rings {
            closed.clear();
            closed.extend_from_slice(ring);
            if let Some(&first) = ring.first() {
                closed.push(first);
            }
            lines.push(&closed);
            parents.push(parent);
        }
    }

    PostProcessed {
        cells: PolygonCells::Outlines(lines),
        parents,
    }
}
