//! Navigation mesh over a bounded 2D region with obstacle holes.
//!
//! Build pipeline:
//! 1. Constrained triangulation of boundary, holes and seed points
//! 2. Vertex snapping to a precision grid
//! 3. Greedy merge of adjacent triangles into convex cells
//! 4. Adjacency graph weighted by centroid distance
//!
//! Queries locate the start and end cells, run a uniform-cost search over
//! the graph and pull a taut path through the portals of the cell corridor.
//!
//! # Example
//!
//! ```
//! use kshetra::config::NavmeshConfig;
//! use kshetra::core::Point2D;
//! use kshetra::navmesh::NavMesh;
//!
//! let boundary = [
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(10.0, 0.0),
//!     Point2D::new(10.0, 10.0),
//!     Point2D::new(0.0, 10.0),
//! ];
//! let mesh = NavMesh::build(&boundary, &[], &[], &NavmeshConfig::default()).unwrap();
//! let path = mesh
//!     .find_shortest_path(Point2D::new(1.0, 1.0), Point2D::new(9.0, 9.0))
//!     .unwrap();
//! assert_eq!(path.points.len(), 1);
//! assert!((path.length - 128f64.sqrt()).abs() < 1e-6);
//! ```

pub mod funnel;
pub mod graph;
mod merge;
pub mod search;
mod triangulate;

pub use funnel::{Portal, polyline_length, string_pull};
pub use graph::{GraphEdge, NavigationGraph};
pub use merge::MergeStats;

use serde::{Deserialize, Serialize};

use crate::config::NavmeshConfig;
use crate::core::{Point2D, Polygon};
use crate::error::{GeometryError, PathError};

/// Tolerance for point-in-cell tests.
const CONTAINS_EPSILON: f64 = 1e-9;

/// Waypoints of a path query (start excluded, end included) and their total length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point2D>,
    /// Length from the query start through every waypoint
    pub length: f64,
}

impl Path {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// A convex cell of the mesh.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Counter-clockwise indices into the mesh vertex table
    pub ring: Vec<usize>,
    pub polygon: Polygon,
    pub centroid: Point2D,
}

/// Convex cells tiling the traversable area plus their adjacency graph.
#[derive(Clone, Debug)]
pub struct NavMesh {
    vertices: Vec<Point2D>,
    cells: Vec<Cell>,
    graph: NavigationGraph,
    max_path_points: usize,
    point_epsilon: f64,
}

impl NavMesh {
    /// Build a mesh for `boundary` minus `holes`.
    ///
    /// Rings may use either winding. Seed points outside the traversable
    /// area are ignored. Any geometry defect is fatal.
    pub fn build(
        boundary: &[Point2D],
        holes: &[Vec<Point2D>],
        seeds: &[Point2D],
        config: &NavmeshConfig,
    ) -> Result<NavMesh, GeometryError> {
        let boundary = validated_ring(boundary, "boundary")?;
        let holes = holes
            .iter()
            .map(|h| validated_ring(h, "hole"))
            .collect::<Result<Vec<_>, _>>()?;
        if seeds.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite { what: "seed point" });
        }

        let soup = triangulate::triangulate(&boundary, &holes, seeds, config.coordinate_precision)?;
        let triangles = soup.cells.len();

        let rings = if config.merge_cells {
            let (rings, stats) = merge::merge_cells(&soup.vertices, soup.cells, config.area_epsilon)?;
            tracing::debug!(
                "[NavMesh] merged {} -> {} cells ({} merges, {} passes)",
                stats.input_cells,
                stats.output_cells,
                stats.merges,
                stats.passes
            );
            rings
        } else {
            soup.cells
        };

        let cells: Vec<Cell> = rings
            .into_iter()
            .map(|ring| {
                let polygon = Polygon::new(ring.iter().map(|&i| soup.vertices[i]).collect());
                let centroid = polygon.centroid();
                Cell {
                    ring,
                    polygon,
                    centroid,
                }
            })
            .collect();

        let centroids: Vec<Point2D> = cells.iter().map(|c| c.centroid).collect();
        let ring_refs: Vec<Vec<usize>> = cells.iter().map(|c| c.ring.clone()).collect();
        let graph = NavigationGraph::build(&soup.vertices, &ring_refs, &centroids);

        tracing::info!(
            "[NavMesh] built: {} holes, {} triangles -> {} cells, {} adjacencies",
            holes.len(),
            triangles,
            cells.len(),
            graph.edge_count()
        );

        Ok(NavMesh {
            vertices: soup.vertices,
            cells,
            graph,
            max_path_points: config.max_path_points,
            point_epsilon: config.point_epsilon,
        })
    }

    /// Shortest path from `start` to `end`.
    ///
    /// Endpoints outside every cell snap to the cell with the nearest
    /// centroid. Fails only when the two cells are not connected.
    pub fn find_shortest_path(&self, start: Point2D, end: Point2D) -> Result<Path, PathError> {
        let from_cell = self.locate_cell(start);
        let to_cell = self.locate_cell(end);

        let Some(route) = search::shortest_cell_path(&self.graph, from_cell, to_cell) else {
            tracing::warn!("[NavMesh] no path from cell {} to cell {}", from_cell, to_cell);
            return Err(PathError::NoPath { from_cell, to_cell });
        };

        let portals = self.portals(&route.cells, start, end);
        let mut points = string_pull(&portals, self.max_path_points, self.point_epsilon);
        let length = polyline_length(&points);

        if points.len() > 1 {
            points.remove(0);
        } else {
            points = vec![end];
        }

        tracing::debug!(
            "[NavMesh] path ({:.2}, {:.2}) -> ({:.2}, {:.2}): {} cells, {} waypoints, {:.3} m",
            start.x,
            start.y,
            end.x,
            end.y,
            route.cells.len(),
            points.len(),
            length
        );

        Ok(Path { points, length })
    }

    /// Index of the cell containing `point`, else the cell with the nearest centroid.
    pub fn locate_cell(&self, point: Point2D) -> usize {
        if let Some(index) = self
            .cells
            .iter()
            .position(|c| c.polygon.contains_convex(&point, CONTAINS_EPSILON))
        {
            return index;
        }

        let nearest = self
            .cells
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.centroid
                    .distance_squared(&point)
                    .total_cmp(&b.centroid.distance_squared(&point))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        tracing::trace!(
            "[NavMesh] ({:.3}, {:.3}) outside mesh, using nearest cell {}",
            point.x,
            point.y,
            nearest
        );
        nearest
    }

    /// Portal sequence for a cell corridor, bracketed by the endpoints.
    pub fn portals(&self, corridor: &[usize], start: Point2D, end: Point2D) -> Vec<Portal> {
        let mut portals = Vec::with_capacity(corridor.len() + 1);
        portals.push(Portal::point(start));
        for pair in corridor.windows(2) {
            if let Some(edge) = self.graph.edge(pair[0], pair[1]) {
                portals.push(Portal::new(self.vertices[edge.left], self.vertices[edge.right]));
            }
        }
        portals.push(Portal::point(end));
        portals
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    #[inline]
    pub fn graph(&self) -> &NavigationGraph {
        &self.graph
    }

    /// Cell polygons in index order.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.cells.iter().map(|c| &c.polygon)
    }

    /// Sum of all cell areas.
    pub fn total_area(&self) -> f64 {
        self.polygons().map(Polygon::area).sum()
    }
}

fn validated_ring(points: &[Point2D], what: &'static str) -> Result<Polygon, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewVertices {
            what,
            count: points.len(),
        });
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinite { what });
    }
    let polygon = Polygon::new(points.to_vec());
    if polygon.area() <= f64::EPSILON {
        return Err(GeometryError::ZeroArea { what });
    }
    Ok(polygon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(size, 0.0),
            Point2D::new(size, size),
            Point2D::new(0.0, size),
        ]
    }

    #[test]
    fn test_square_collapses_to_one_cell() {
        let mesh = NavMesh::build(&square(10.0), &[], &[], &NavmeshConfig::default()).unwrap();
        assert_eq!(mesh.cell_count(), 1);
        assert!((mesh.total_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmerged_mesh_keeps_triangles() {
        let config = NavmeshConfig {
            merge_cells: false,
            ..Default::default()
        };
        let mesh = NavMesh::build(&square(10.0), &[], &[], &config).unwrap();
        assert_eq!(mesh.cell_count(), 2);
        assert_eq!(mesh.graph().edge_count(), 1);
    }

    #[test]
    fn test_invalid_input() {
        let config = NavmeshConfig::default();
        let err = NavMesh::build(&square(10.0)[..2], &[], &[], &config).unwrap_err();
        assert_eq!(err.code(), "TOO_FEW_VERTICES");

        let mut bad = square(10.0);
        bad[1].x = f64::NAN;
        assert_eq!(NavMesh::build(&bad, &[], &[], &config).unwrap_err().code(), "NON_FINITE");

        let flat = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(2.0, 0.0)];
        assert_eq!(NavMesh::build(&flat, &[], &[], &config).unwrap_err().code(), "ZERO_AREA");
    }

    #[test]
    fn test_locate_outside_falls_back_to_nearest() {
        let hole = vec![
            Point2D::new(4.0, 4.0),
            Point2D::new(6.0, 4.0),
            Point2D::new(6.0, 6.0),
            Point2D::new(4.0, 6.0),
        ];
        let mesh = NavMesh::build(&square(10.0), &[hole], &[], &NavmeshConfig::default()).unwrap();
        let outside = Point2D::new(-5.0, -5.0);
        let cell = mesh.locate_cell(outside);
        let best = mesh
            .cells()
            .iter()
            .map(|c| c.centroid.distance(&outside))
            .fold(f64::INFINITY, f64::min);
        assert!((mesh.cells()[cell].centroid.distance(&outside) - best).abs() < 1e-12);
    }

    #[test]
    fn test_same_point_query() {
        let mesh = NavMesh::build(&square(10.0), &[], &[], &NavmeshConfig::default()).unwrap();
        let p = Point2D::new(3.0, 3.0);
        let path = mesh.find_shortest_path(p, p).unwrap();
        assert_eq!(path.points, vec![p]);
        assert_eq!(path.length, 0.0);
    }
}
