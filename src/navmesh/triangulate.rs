//! Constrained Delaunay triangulation of the traversable region.
//!
//! Boundary and hole rings become constraint edges. Faces whose centroid
//! lies outside the boundary or inside a hole are discarded. Surviving
//! vertices are snapped to a precision grid and deduplicated so that
//! neighbouring cells share vertex indices exactly.

use std::collections::HashMap;

use spade::handles::FixedVertexHandle;
use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation};

use crate::core::{Point2D, Polygon, math::round_to};
use crate::error::GeometryError;

/// Triangles over a shared, deduplicated vertex table.
#[derive(Clone, Debug, Default)]
pub struct TriangleSoup {
    pub vertices: Vec<Point2D>,
    /// Counter-clockwise index triples
    pub cells: Vec<Vec<usize>>,
}

/// Triangulate `boundary` minus `holes`, with optional interior seed points.
pub fn triangulate(
    boundary: &Polygon,
    holes: &[Polygon],
    seeds: &[Point2D],
    precision: f64,
) -> Result<TriangleSoup, GeometryError> {
    let mut cdt: ConstrainedDelaunayTriangulation<Point2<f64>> = ConstrainedDelaunayTriangulation::new();

    add_ring(&mut cdt, boundary.points())?;
    for hole in holes {
        add_ring(&mut cdt, hole.points())?;
    }

    let mut skipped_seeds = 0;
    for seed in seeds {
        let usable = boundary.contains(seed) && !holes.iter().any(|h| h.contains(seed));
        if !usable {
            skipped_seeds += 1;
            continue;
        }
        insert(&mut cdt, *seed)?;
    }
    if skipped_seeds > 0 {
        tracing::warn!("[NavMesh] ignored {} seed points outside the traversable area", skipped_seeds);
    }

    let mut soup = TriangleSoup::default();
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();

    for face in cdt.inner_faces() {
        let corners = face.vertices().map(|v| {
            let p = v.position();
            Point2D::new(round_to(p.x, precision), round_to(p.y, precision))
        });

        let centroid = Point2D::new(
            (corners[0].x + corners[1].x + corners[2].x) / 3.0,
            (corners[0].y + corners[1].y + corners[2].y) / 3.0,
        );
        if !boundary.contains(&centroid) || holes.iter().any(|h| h.contains(&centroid)) {
            continue;
        }

        let triangle = Polygon::new(corners.to_vec());
        if triangle.area() < precision * precision {
            continue;
        }

        let ring = triangle
            .points()
            .iter()
            .map(|p| {
                let key = ((p.x / precision).round() as i64, (p.y / precision).round() as i64);
                *index.entry(key).or_insert_with(|| {
                    soup.vertices.push(*p);
                    soup.vertices.len() - 1
                })
            })
            .collect::<Vec<_>>();

        if ring[0] == ring[1] || ring[1] == ring[2] || ring[0] == ring[2] {
            continue;
        }
        soup.cells.push(ring);
    }

    if soup.cells.is_empty() {
        return Err(GeometryError::EmptyMesh);
    }

    tracing::debug!(
        "[NavMesh] triangulated {} vertices into {} triangles",
        soup.vertices.len(),
        soup.cells.len()
    );
    Ok(soup)
}

fn insert(
    cdt: &mut ConstrainedDelaunayTriangulation<Point2<f64>>,
    point: Point2D,
) -> Result<FixedVertexHandle, GeometryError> {
    cdt.insert(Point2::new(point.x, point.y))
        .map_err(|e| GeometryError::Unrepresentable {
            point,
            reason: format!("{:?}", e),
        })
}

fn add_ring(
    cdt: &mut ConstrainedDelaunayTriangulation<Point2<f64>>,
    ring: &[Point2D],
) -> Result<(), GeometryError> {
    let handles = ring
        .iter()
        .map(|p| insert(cdt, *p))
        .collect::<Result<Vec<_>, _>>()?;

    let n = handles.len();
    for i in 0..n {
        let (from, to) = (handles[i], handles[(i + 1) % n]);
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(GeometryError::SelfIntersection {
                from: ring[i],
                to: ring[(i + 1) % n],
            });
        }
        cdt.add_constraint(from, to);
    }
    Ok(())
}
