//! Cell adjacency graph.
//!
//! Nodes are cell indices. Two cells are adjacent when they share at least
//! one ring edge; the edge weight is the distance between their centroids.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::Point2D;

/// Directed adjacency with the portal crossed when moving along it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphEdge {
    /// Neighbor cell index
    pub to: usize,
    /// Centroid-to-centroid distance
    pub weight: f64,
    /// Vertex index on the left of the portal, seen from the source cell
    pub left: usize,
    /// Vertex index on the right of the portal
    pub right: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationGraph {
    adjacency: Vec<Vec<GraphEdge>>,
}

impl NavigationGraph {
    /// Build adjacency from counter-clockwise cell rings over a shared vertex table.
    pub fn build(vertices: &[Point2D], cells: &[Vec<usize>], centroids: &[Point2D]) -> Self {
        let mut adjacency = vec![Vec::new(); cells.len()];
        let mut linked = BTreeSet::new();

        for (a, b) in shared_edge_owners(cells).into_values().filter_map(|owners| match owners[..] {
            [a, b] => Some((a, b)),
            _ => None,
        }) {
            let key = (a.min(b), a.max(b));
            if !linked.insert(key) {
                continue;
            }

            let weight = centroids[a].distance(&centroids[b]);
            if let (Some((left_ab, right_ab)), Some((left_ba, right_ba))) =
                (portal_between(&cells[a], &cells[b]), portal_between(&cells[b], &cells[a]))
            {
                adjacency[a].push(GraphEdge {
                    to: b,
                    weight,
                    left: left_ab,
                    right: right_ab,
                });
                adjacency[b].push(GraphEdge {
                    to: a,
                    weight,
                    left: left_ba,
                    right: right_ba,
                });
            }
        }

        let edge_count: usize = adjacency.iter().map(Vec::len).sum();
        tracing::debug!(
            "[NavMesh] graph: {} nodes, {} directed edges ({} vertices)",
            cells.len(),
            edge_count,
            vertices.len()
        );

        Self { adjacency }
    }

    /// Graph from a prebuilt adjacency list.
    pub fn from_adjacency(adjacency: Vec<Vec<GraphEdge>>) -> Self {
        Self { adjacency }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn neighbors(&self, node: usize) -> &[GraphEdge] {
        &self.adjacency[node]
    }

    /// The edge leading from `from` to `to`, if adjacent.
    pub fn edge(&self, from: usize, to: usize) -> Option<&GraphEdge> {
        self.adjacency.get(from)?.iter().find(|e| e.to == to)
    }

    /// Number of undirected adjacencies.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Map each undirected ring edge to the cells that use it, in key order.
pub(crate) fn shared_edge_owners(cells: &[Vec<usize>]) -> BTreeMap<(usize, usize), Vec<usize>> {
    let mut owners: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (cell, ring) in cells.iter().enumerate() {
        let n = ring.len();
        for i in 0..n {
            let (u, v) = (ring[i], ring[(i + 1) % n]);
            owners.entry((u.min(v), u.max(v))).or_default().push(cell);
        }
    }
    owners
}

/// Portal `(left, right)` crossed when leaving ring `a` into ring `b`.
///
/// The shared boundary is the run of edges `p0 -> ... -> pk` in `a` whose
/// reverse appears in `b`. Leaving a counter-clockwise cell across it,
/// `pk` is on the left and `p0` on the right.
pub(crate) fn portal_between(a: &[usize], b: &[usize]) -> Option<(usize, usize)> {
    let n = a.len();
    let m = b.len();
    let in_b = |u: usize, v: usize| (0..m).any(|j| b[j] == v && b[(j + 1) % m] == u);
    let shared: Vec<bool> = (0..n).map(|i| in_b(a[i], a[(i + 1) % n])).collect();

    let start = (0..n).find(|&i| shared[i] && !shared[(i + n - 1) % n])?;
    let mut end = start;
    while shared[(end + 1) % n] && (end + 1) % n != start {
        end = (end + 1) % n;
    }
    Some((a[(end + 1) % n], a[start]))
}
