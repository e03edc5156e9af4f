//! Funnel (string pulling) over a portal corridor.

use crate::core::{Point2D, cross};

/// Segment crossed between two consecutive corridor cells.
///
/// `left` and `right` are seen from the direction of travel. The first and
/// last portals of a corridor are degenerate (`left == right`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Portal {
    pub left: Point2D,
    pub right: Point2D,
}

impl Portal {
    #[inline]
    pub fn new(left: Point2D, right: Point2D) -> Self {
        Self { left, right }
    }

    #[inline]
    pub fn point(p: Point2D) -> Self {
        Self { left: p, right: p }
    }

    #[inline]
    pub fn midpoint(&self) -> Point2D {
        self.left.midpoint(&self.right)
    }
}

/// Tighten the corridor into the shortest polyline through every portal.
///
/// Returns the committed points, starting with the first portal's point.
/// At most `max_points` points are committed; a corridor needing more is
/// truncated before its end point.
pub fn string_pull(portals: &[Portal], max_points: usize, epsilon_sq: f64) -> Vec<Point2D> {
    let Some(first) = portals.first() else {
        return Vec::new();
    };
    let same = |a: &Point2D, b: &Point2D| a.approx_eq(b, epsilon_sq);

    let mut points = vec![first.left];
    let mut apex = first.left;
    let mut left = first.left;
    let mut right = first.right;
    let (mut left_index, mut right_index) = (0usize, 0usize);

    let iteration_cap = portals.len().saturating_mul(max_points.max(1)) + portals.len();
    let mut iterations = 0;
    let mut i = 1;

    while i < portals.len() && points.len() < max_points {
        iterations += 1;
        if iterations > iteration_cap {
            tracing::warn!("[NavMesh] funnel iteration cap reached after {} points", points.len());
            break;
        }

        let portal = portals[i];

        // Tighten right side
        if cross(apex, right, portal.right) >= 0.0 {
            if same(&apex, &right) || cross(apex, left, portal.right) < 0.0 {
                right = portal.right;
                right_index = i;
            } else {
                // Right crossed over left: left becomes the new apex
                if !points.last().is_some_and(|p| same(p, &left)) {
                    points.push(left);
                }
                apex = left;
                let apex_index = left_index;
                right = apex;
                right_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        // Tighten left side
        if cross(apex, left, portal.left) <= 0.0 {
            if same(&apex, &left) || cross(apex, right, portal.left) > 0.0 {
                left = portal.left;
                left_index = i;
            } else {
                if !points.last().is_some_and(|p| same(p, &right)) {
                    points.push(right);
                }
                apex = right;
                let apex_index = right_index;
                left = apex;
                left_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        i += 1;
    }

    if points.len() < max_points {
        if let Some(last) = portals.last() {
            if !points.last().is_some_and(|p| same(p, &last.left)) {
                points.push(last.left);
            }
        }
    }

    tracing::trace!("[NavMesh] funnel: {} portals -> {} points", portals.len(), points.len());
    points
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point2D]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}
