// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! [`MeshAccumulator`] owns the vertex table and the three topology tables
//! while a document is being converted. Once every feature has been built,
//! [`MeshAccumulator::finish`] runs the polygon post-processor and yields the
//! output [`PolyMesh`].

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::postprocess::{post_process, PolygonMode, PostProcessed};

/// The three topology tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Point,
    Line,
    Polygon,
}

/// A cell, identified by its table and its index within that table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    pub kind: CellKind,
    pub index: usize,
}

impl CellId {
    #[inline]
    pub fn new(kind: CellKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// Variable-length cells stored as offsets into one flat index buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellArray {
    /// `offsets[i]..offsets[i + 1]` is the range of cell `i`
    offsets: Vec<usize>,
    connectivity: Vec<u32>,
}

impl CellArray {
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            connectivity: Vec::new(),
        }
    }

    /// Append a cell, returning its index
    #[inline]
    pub fn push(&mut self, indices: &[u32]) -> usize {
        self.connectivity.extend_from_slice(indices);
        self.offsets.push(self.connectivity.len());
        self.offsets.len() - 2
    }

    pub fn get(&self, cell: usize) -> Option<&[u32]> {
        let start = *self.offsets.get(cell)?;
        let end = *self.offsets.get(cell + 1)?;
        Some(&self.connectivity[start..end])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.connectivity[w[0]..w[1]])
    }

    /// Flat vertex indices of all cells
    pub fn connectivity(&self) -> &[u32] {
        &self.connectivity
    }

    /// Keep only the first `cells` cells
    pub fn truncate(&mut self, cells: usize) {
        if cells < self.len() {
            self.offsets.truncate(cells + 1);
            self.connectivity.truncate(self.offsets[cells]);
        }
    }

    /// Append all cells of `other`, shifting their vertex indices
    pub fn append_rebased(&mut self, other: &CellArray, vertex_offset: u32) {
        let base = self.connectivity.len();
        self.connectivity
            .extend(other.connectivity.iter().map(|&i| i + vertex_offset));
        self.offsets
            .extend(other.offsets[1..].iter().map(|&o| o + base));
    }
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}

/// A polygon cell: exterior ring first, then holes.
/// Rings hold vertex indices without the repeated closing vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonCell {
    pub rings: SmallVec<[Vec<u32>; 1]>,
}

impl PolygonCell {
    pub fn exterior(&self) -> &[u32] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn holes(&self) -> &[Vec<u32>] {
        self.rings.get(1..).unwrap_or(&[])
    }

    /// Total vertex count over all rings
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    fn rebased(&self, vertex_offset: u32) -> Self {
        Self {
            rings: self
                .rings
                .iter()
                .map(|ring| ring.iter().map(|&i| i + vertex_offset).collect())
                .collect(),
        }
    }
}

/// Growing vertex and topology tables.
///
/// Single writer: vertex indices are handed out in insertion order and cell
/// indices start at 0 in each table.
#[derive(Debug, Clone, Default)]
pub struct MeshAccumulator {
    vertices: Vec<Point3<f64>>,
    points: Vec<u32>,
    lines: CellArray,
    polygons: Vec<PolygonCell>,
}

impl MeshAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    #[inline]
    pub fn add_point_cell(&mut self, vertex: u32) -> usize {
        debug_assert!((vertex as usize) < self.vertices.len());
        self.points.push(vertex);
        self.points.len() - 1
    }

    #[inline]
    pub fn add_line_cell(&mut self, vertices: &[u32]) -> usize {
        debug_assert!(vertices.iter().all(|&v| (v as usize) < self.vertices.len()));
        self.lines.push(vertices)
    }

    pub fn add_polygon_cell<I>(&mut self, rings: I) -> usize
    where
        I: IntoIterator<Item = Vec<u32>>,
    {
        let cell = PolygonCell {
            rings: rings.into_iter().collect(),
        };
        debug_assert!(cell
            .rings
            .iter()
            .flatten()
            .all(|&v| (v as usize) < self.vertices.len()));
        self.polygons.push(cell);
        self.polygons.len() - 1
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn points(&self) -> &[u32] {
        &self.points
    }

    pub fn lines(&self) -> &CellArray {
        &self.lines
    }

    pub fn polygons(&self) -> &[PolygonCell] {
        &self.polygons
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn cell_count(&self, kind: CellKind) -> usize {
        match kind {
            CellKind::Point => self.points.len(),
            CellKind::Line => self.lines.len(),
            CellKind::Polygon => self.polygons.len(),
        }
    }

    /// Append another accumulator's tables after this one's, rebasing its
    /// vertex indices. Cell order is preserved within each table.
    pub fn append(&mut self, other: &MeshAccumulator) {
        let vertex_offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.points
            .extend(other.points.iter().map(|&i| i + vertex_offset));
        self.lines.append_rebased(&other.lines, vertex_offset);
        self.polygons
            .extend(other.polygons.iter().map(|p| p.rebased(vertex_offset)));
    }

    /// Run polygon post-processing and produce the output mesh.
    ///
    /// The returned `parents` maps each output polygon-table cell to the
    /// accumulated polygon cell it was derived from.
    pub fn finish(self, mode: PolygonMode) -> (PolyMesh, Vec<usize>) {
        let PostProcessed { cells, parents } = post_process(&self.vertices, self.polygons, mode);
        let mesh = PolyMesh {
            vertices: self.vertices,
            points: self.points,
            lines: self.lines,
            polygons: cells,
        };
        (mesh, parents)
    }
}

/// Polygon table after post-processing
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonCells {
    /// Filled polygons with their holes
    Filled(Vec<PolygonCell>),
    /// Triangle index triples
    Triangles(Vec<[u32; 3]>),
    /// Closed boundary polylines, one per ring
    Outlines(CellArray),
}

impl PolygonCells {
    pub fn len(&self) -> usize {
        match self {
            PolygonCells::Filled(cells) => cells.len(),
            PolygonCells::Triangles(triangles) => triangles.len(),
            PolygonCells::Outlines(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output mesh: vertices plus point, line and polygon cell tables
#[derive(Debug, Clone, PartialEq)]
pub struct PolyMesh {
    pub vertices: Vec<Point3<f64>>,
    pub points: Vec<u32>,
    pub lines: CellArray,
    pub polygons: PolygonCells,
}

impl PolyMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn cell_count(&self, kind: CellKind) -> usize {
        match kind {
            CellKind::Point => self.points.len(),
            CellKind::Line => self.lines.len(),
            CellKind::Polygon => self.polygons.len(),
        }
    }

    /// Cells over all three tables
    pub fn total_cells(&self) -> usize {
        self.points.len() + self.lines.len() + self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex positions as flat f32 triples, for renderers
    pub fn flat_positions(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Axis-aligned bounds (min, max); the origin twice for an empty mesh
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in &self.vertices {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        (min, max)
    }
}
