//! Uniform-cost shortest path search over the cell adjacency graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::graph::NavigationGraph;

/// Priority queue entry.
#[derive(Clone, Copy, Debug)]
struct SearchState {
    cost: f64,
    node: usize,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for SearchState {}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; lower node index wins ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a graph search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// Cell indices from start to goal, inclusive.
    pub cells: Vec<usize>,
    /// Sum of centroid-distance edge weights.
    pub cost: f64,
}

/// Dijkstra search from `start` to `goal`.
///
/// Returns None when the goal lies in a different connected component.
pub fn shortest_cell_path(graph: &NavigationGraph, start: usize, goal: usize) -> Option<SearchResult> {
    let n = graph.node_count();

    if n == 0 || start >= n || goal >= n {
        return None;
    }

    if start == goal {
        return Some(SearchResult {
            cells: vec![start],
            cost: 0.0,
        });
    }

    let mut dist: Vec<f64> = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    dist[start] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(SearchState {
        cost: 0.0,
        node: start,
    });

    while let Some(SearchState { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }

        if node == goal {
            break;
        }

        for edge in graph.neighbors(node) {
            let new_dist = cost + edge.weight;
            if new_dist < dist[edge.to] {
                dist[edge.to] = new_dist;
                prev[edge.to] = Some(node);
                heap.push(SearchState {
                    cost: new_dist,
                    node: edge.to,
                });
            }
        }
    }

    prev[goal]?;

    let mut cells = Vec::new();
    let mut current = goal;
    while current != start {
        cells.push(current);
        current = prev[current]?;
    }
    cells.push(start);
    cells.reverse();

    tracing::trace!(
        "[NavMesh] search {} -> {}: {} cells, cost {:.3}",
        start,
        goal,
        cells.len(),
        dist[goal]
    );

    Some(SearchResult {
        cells,
        cost: dist[goal],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navmesh::graph::GraphEdge;

    fn edge(to: usize, weight: f64) -> GraphEdge {
        GraphEdge {
            to,
            weight,
            left: 0,
            right: 0,
        }
    }

    fn line_graph() -> NavigationGraph {
        // 0 -- 1 -- 2 -- 3, plus a costly shortcut 0 -- 3
        NavigationGraph::from_adjacency(vec![
            vec![edge(1, 1.0), edge(3, 10.0)],
            vec![edge(0, 1.0), edge(2, 1.0)],
            vec![edge(1, 1.0), edge(3, 1.0)],
            vec![edge(2, 1.0), edge(0, 10.0)],
        ])
    }

    #[test]
    fn test_prefers_cheaper_route() {
        let result = shortest_cell_path(&line_graph(), 0, 3).unwrap();
        assert_eq!(result.cells, vec![0, 1, 2, 3]);
        assert!((result.cost - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_start_and_goal() {
        let result = shortest_cell_path(&line_graph(), 2, 2).unwrap();
        assert_eq!(result.cells, vec![2]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_disconnected() {
        let graph = NavigationGraph::from_adjacency(vec![vec![edge(1, 1.0)], vec![edge(0, 1.0)], vec![]]);
        assert!(shortest_cell_path(&graph, 0, 2).is_none());
        assert!(shortest_cell_path(&graph, 0, 7).is_none());
    }
}
