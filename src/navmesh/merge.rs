//! Greedy merging of adjacent cells into larger convex cells.

use crate::core::{Point2D, is_convex_ring, signed_area};
use crate::error::GeometryError;

use super::graph::shared_edge_owners;

/// Merge statistics for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub input_cells: usize,
    pub output_cells: usize,
    pub merges: usize,
    pub passes: usize,
}

/// Repeatedly merge cell pairs sharing exactly one edge while the result stays convex.
///
/// Each pass visits shared edges in index order. A cell takes part in at
/// most one merge per pass; passes repeat until none succeeds.
pub fn merge_cells(
    vertices: &[Point2D],
    cells: Vec<Vec<usize>>,
    area_epsilon: f64,
) -> Result<(Vec<Vec<usize>>, MergeStats), GeometryError> {
    let mut stats = MergeStats {
        input_cells: cells.len(),
        ..Default::default()
    };
    let mut cells: Vec<Option<Vec<usize>>> = cells.into_iter().map(Some).collect();

    loop {
        stats.passes += 1;
        let live: Vec<Vec<usize>> = cells.iter().map(|c| c.clone().unwrap_or_default()).collect();
        let owners = shared_edge_owners(&live);
        let mut touched = vec![false; cells.len()];
        let mut merged_this_pass = 0;

        for (&(p, q), cell_ids) in &owners {
            let &[a, b] = cell_ids.as_slice() else {
                continue;
            };
            if touched[a] || touched[b] {
                continue;
            }
            let (Some(ring_a), Some(ring_b)) = (&cells[a], &cells[b]) else {
                continue;
            };

            if let Some(ring) = try_merge(
                vertices,
                (a, ring_a.as_slice()),
                (b, ring_b.as_slice()),
                (p, q),
                area_epsilon,
            )? {
                cells[a] = Some(ring);
                cells[b] = None;
                touched[a] = true;
                touched[b] = true;
                merged_this_pass += 1;
            }
        }

        stats.merges += merged_this_pass;
        if merged_this_pass == 0 {
            break;
        }
    }

    let merged: Vec<Vec<usize>> = cells.into_iter().flatten().collect();
    stats.output_cells = merged.len();
    Ok((merged, stats))
}

/// Join two counter-clockwise rings across their shared edge `{p, q}`.
///
/// Returns `Ok(None)` when the union would repeat a vertex or be non-convex.
fn try_merge(
    vertices: &[Point2D],
    (a, ring_a): (usize, &[usize]),
    (b, ring_b): (usize, &[usize]),
    (p, q): (usize, usize),
    area_epsilon: f64,
) -> Result<Option<Vec<usize>>, GeometryError> {
    let n = ring_a.len();
    let m = ring_b.len();

    // Orient the shared edge as u -> v in ring a
    let Some(i) = (0..n).find(|&i| {
        let (u, v) = (ring_a[i], ring_a[(i + 1) % n]);
        (u == p && v == q) || (u == q && v == p)
    }) else {
        return Ok(None);
    };
    let (u, v) = (ring_a[i], ring_a[(i + 1) % n]);

    let Some(j) = (0..m).find(|&j| ring_b[j] == v && ring_b[(j + 1) % m] == u) else {
        return Ok(None);
    };

    // a from v around to u, then b's vertices strictly between u and v
    let mut merged = Vec::with_capacity(n + m - 2);
    merged.extend((0..n).map(|k| ring_a[(i + 1 + k) % n]));
    merged.extend((0..m - 2).map(|k| ring_b[(j + 2 + k) % m]));

    let mut sorted = merged.clone();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != merged.len() {
        return Ok(None);
    }

    let points: Vec<Point2D> = merged.iter().map(|&k| vertices[k]).collect();
    if !is_convex_ring(&points) {
        return Ok(None);
    }

    let expected = ring_area(vertices, ring_a) + ring_area(vertices, ring_b);
    let area = signed_area(&points);
    if (area - expected).abs() > area_epsilon {
        return Err(GeometryError::MergeAreaMismatch {
            a,
            b,
            merged: area,
            expected,
        });
    }

    Ok(Some(merged))
}

pub(crate) fn ring_area(vertices: &[Point2D], ring: &[usize]) -> f64 {
    let points: Vec<Point2D> = ring.iter().map(|&k| vertices[k]).collect();
    signed_area(&points)
}
