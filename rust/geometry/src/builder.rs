// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry builder
//!
//! Appends the vertices and cells of one typed geometry to a
//! [`MeshAccumulator`]. Vertices are never shared between geometries.

use geojson_mesh_core::{Geometry, Position};
use nalgebra::Point3;

use crate::mesh::{CellId, CellKind, MeshAccumulator};

pub struct GeometryBuilder<'m> {
    mesh: &'m mut MeshAccumulator,
}

impl<'m> GeometryBuilder<'m> {
    pub fn new(mesh: &'m mut MeshAccumulator) -> Self {
        Self { mesh }
    }

    /// Build a geometry, returning the new cells in creation order.
    ///
    /// Multi* geometries give one cell per member; a GeometryCollection
    /// concatenates the cells of its members.
    pub fn build(&mut self, geometry: &Geometry) -> Vec<CellId> {
        let mut cells = Vec::with_capacity(geometry.cell_count());
        self.append(geometry, &mut cells);
        cells
    }

    fn append(&mut self, geometry: &Geometry, cells: &mut Vec<CellId>) {
        match geometry {
            Geometry::Point(position) => cells.push(self.point(position)),
            Geometry::MultiPoint(positions) => {
                cells.extend(positions.iter().map(|p| self.point(p)));
            }
            Geometry::LineString(positions) => cells.push(self.line(positions)),
            Geometry::MultiLineString(lines) => {
                cells.extend(lines.iter().map(|l| self.line(l)));
            }
            Geometry::Polygon(rings) => cells.push(self.polygon(rings)),
            Geometry::MultiPolygon(polygons) => {
                cells.extend(polygons.iter().map(|rings| self.polygon(rings)));
            }
            Geometry::GeometryCollection(members) => {
                for member in members {
                    self.append(member, cells);
                }
            }
        }
    }

    #[inline]
    fn vertex(&mut self, p: &Position) -> u32 {
        self.mesh.add_vertex(Point3::new(p.x, p.y, p.z))
    }

    fn vertices(&mut self, positions: &[Position]) -> Vec<u32> {
        positions.iter().map(|p| self.vertex(p)).collect()
    }

    fn point(&mut self, position: &Position) -> CellId {
        let v = self.vertex(position);
        CellId::new(CellKind::Point, self.mesh.add_point_cell(v))
    }

    fn line(&mut self, positions: &[Position]) -> CellId {
        let indices = self.vertices(positions);
        CellId::new(CellKind::Line, self.mesh.add_line_cell(&indices))
    }

    fn polygon(&mut self, rings: &[Vec<Position>]) -> CellId {
        let rings: Vec<Vec<u32>> = rings.iter().map(|ring| self.vertices(ring)).collect();
        CellId::new(CellKind::Polygon, self.mesh.add_polygon_cell(rings))
    }
}

/// Build one geometry into `mesh`
pub fn build_geometry(mesh: &mut MeshAccumulator, geometry: &Geometry) -> Vec<CellId> {
    GeometryBuilder::new(mesh).build(geometry)
}
