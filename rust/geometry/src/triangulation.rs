// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Rings are projected into their own plane and handed to earcutr, which
//! cuts the holes out of the exterior.

use nalgebra::{Point2, Point3, Vector3};

use crate::{Error, Result};

/// Orthonormal 2D basis on a polygon's plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub u_axis: Vector3<f64>,
    pub v_axis: Vector3<f64>,
}

impl PlaneBasis {
    /// Basis on the plane through `origin` with the given normal
    pub fn from_normal(origin: Point3<f64>, normal: &Vector3<f64>) -> Self {
        // Cross with the axis least parallel to the normal for a stable basis
        let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        let reference = if ax <= ay && ax <= az {
            Vector3::x()
        } else if ay <= az {
            Vector3::y()
        } else {
            Vector3::z()
        };

        let u_axis = normal.cross(&reference).normalize();
        let v_axis = normal.cross(&u_axis).normalize();
        Self {
            origin,
            u_axis,
            v_axis,
        }
    }

    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        let v = point - self.origin;
        Point2::new(v.dot(&self.u_axis), v.dot(&self.v_axis))
    }

    pub fn project_all(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

/// Unit normal of a ring using Newell's method; +Z for degenerate rings
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    if n < 3 {
        return Vector3::z();
    }

    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    let len = normal.norm();
    if len > 1e-12 {
        normal / len
    } else {
        Vector3::z()
    }
}

/// Check if a ring is convex (all turns have the same sign)
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f64;
    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            if sign == 0.0 {
                sign = cross.signum();
            } else if sign != cross.signum() {
                return false;
            }
        }
    }
    true
}

/// Whether a ring encloses no area relative to its extent
fn is_degenerate(points: &[Point2<f64>]) -> bool {
    let origin = points[0];
    let (mut min, mut max) = (origin, origin);
    let mut twice_area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let a = p - origin;
        let b = points[(i + 1) % points.len()] - origin;
        twice_area += a.x * b.y - b.x * a.y;
        min = Point2::new(min.x.min(p.x), min.y.min(p.y));
        max = Point2::new(max.x.max(p.x), max.y.max(p.y));
    }
    let extent = (max.x - min.x).max(max.y - min.y);
    extent == 0.0 || twice_area.abs() <= 1e-12 * extent * extent
}

/// Triangulate planar rings: `rings[0]` is the exterior, the rest are holes.
///
/// Returns triangle corner indices into the concatenation of all rings, in
/// ring order. Every ring must have at least 3 points.
pub fn triangulate_rings(rings: &[Vec<Point2<f64>>]) -> Result<Vec<usize>> {
    let exterior = rings
        .first()
        .ok_or_else(|| Error::TriangulationError("polygon has no rings".to_string()))?;
    if let Some(short) = rings.iter().find(|r| r.len() < 3) {
        return Err(Error::TriangulationError(format!(
            "ring with {} points cannot be triangulated",
            short.len()
        )));
    }

    if is_degenerate(exterior) {
        return Err(Error::TriangulationError(
            "exterior ring encloses no area".to_string(),
        ));
    }

    let n = exterior.len();
    if rings.len() == 1 {
        // Already a triangle
        if n == 3 {
            return Ok(vec![0, 1, 2]);
        }
        // Convex: fan from the first vertex
        if n <= 8 && is_convex(exterior) {
            return Ok((1..n - 1).flat_map(|i| [0, i, i + 1]).collect());
        }
    }

    let total: usize = rings.iter().map(Vec::len).sum();
    let mut coords = Vec::with_capacity(total * 2);
    let mut hole_starts = Vec::with_capacity(rings.len() - 1);
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            hole_starts.push(coords.len() / 2);
        }
        for p in ring {
            coords.push(p.x);
            coords.push(p.y);
        }
    }

    let indices = earcutr::earcut(&coords, &hole_starts, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;
    if indices.is_empty() {
        return Err(Error::TriangulationError(
            "no triangles produced".to_string(),
        ));
    }
    Ok(indices)
}

/// Triangulate 3D rings in their own plane (see [`triangulate_rings`]).
pub fn triangulate_rings_3d(rings: &[Vec<Point3<f64>>]) -> Result<Vec<usize>> {
    let exterior = match rings.first() {
        Some(ring) if !ring.is_empty() => ring,
        _ => {
            return Err(Error::TriangulationError(
                "polygon has an empty exterior".to_string(),
            ))
        }
    };
    let basis = PlaneBasis::from_normal(exterior[0], &polygon_normal(exterior));
    let projected: Vec<Vec<Point2<f64>>> = rings.iter().map(|r| basis.project_all(r)).collect();
    triangulate_rings(&projected)
}
