// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoJSON-Mesh Geometry Processing
//!
//! Vertex and topology accumulation for GeoJSON geometries, with polygon
//! triangulation (earcutr) and outlining as a final pass.

pub mod builder;
pub mod error;
pub mod mesh;
pub mod postprocess;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use builder::{build_geometry, GeometryBuilder};
pub use error::{Error, Result};
pub use mesh::{CellArray, CellId, CellKind, MeshAccumulator, PolyMesh, PolygonCell, PolygonCells};
pub use postprocess::{post_process, PolygonMode, PostProcessed};
pub use triangulation::{polygon_normal, triangulate_rings, triangulate_rings_3d, PlaneBasis};
