//! Simple polygons and line segments.
//!
//! A [`Polygon`] always stores its ring counter-clockwise. Constructors
//! reverse clockwise input, so callers may pass either winding.

use serde::{Deserialize, Serialize};

use super::math::cross;
use super::point::Point2D;

/// Edges at least this long receive extra points in [`densify`].
const DENSIFY_MIN_EDGE: f64 = 1.0;

/// Line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
}

impl Segment {
    #[inline]
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    #[inline]
    pub fn midpoint(&self) -> Point2D {
        self.start.midpoint(&self.end)
    }

    /// Outward normal for a segment of a counter-clockwise ring.
    #[inline]
    pub fn outward_normal(&self) -> Point2D {
        let d = self.end - self.start;
        Point2D::new(d.y, -d.x).normalize()
    }
}

/// Simple polygon with counter-clockwise winding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point2D>,
}

impl Polygon {
    /// Build a polygon from an ordered ring in either winding.
    pub fn new(points: Vec<Point2D>) -> Self {
        let mut points = points;
        if signed_area(&points) < 0.0 {
            points.reverse();
        }
        Self { points }
    }

    /// Axis-aligned rectangle from its minimum corner and size.
    pub fn rectangle(origin: Point2D, width: f64, height: f64) -> Self {
        Self::new(vec![
            origin,
            Point2D::new(origin.x + width, origin.y),
            Point2D::new(origin.x + width, origin.y + height),
            Point2D::new(origin.x, origin.y + height),
        ])
    }

    /// Vertices in counter-clockwise order.
    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the polygon, returning its ring.
    pub fn into_points(self) -> Vec<Point2D> {
        self.points
    }

    /// Edges of the closed ring, in order.
    pub fn segments(&self) -> Vec<Segment> {
        let n = self.points.len();
        (0..n)
            .map(|i| Segment::new(self.points[i], self.points[(i + 1) % n]))
            .collect()
    }

    /// Signed shoelace area (positive for counter-clockwise).
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid. Degenerate rings fall back to the vertex mean.
    pub fn centroid(&self) -> Point2D {
        let n = self.points.len();
        if n == 0 {
            return Point2D::ZERO;
        }

        let a = self.signed_area();
        if a.abs() < 1e-12 {
            let sum = self
                .points
                .iter()
                .fold(Point2D::ZERO, |acc, p| acc + *p);
            return sum * (1.0 / n as f64);
        }

        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let f = p.cross(&q);
            cx += (p.x + q.x) * f;
            cy += (p.y + q.y) * f;
        }
        Point2D::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// True if no vertex turns clockwise. Collinear vertices are allowed.
    pub fn is_convex(&self) -> bool {
        is_convex_ring(&self.points)
    }

    /// Point-in-convex-polygon test with a tolerance for points on edges.
    pub fn contains_convex(&self, point: &Point2D, epsilon: f64) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| cross(self.points[i], self.points[(i + 1) % n], *point) >= -epsilon)
    }

    /// Crossing-number point-in-polygon test for arbitrary simple polygons.
    pub fn contains(&self, point: &Point2D) -> bool {
        let n = self.points.len();
        let mut inside = false;
        let mut j = n.wrapping_sub(1);
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > point.y) != (pj.y > point.y) {
                let x_cross = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Offset every vertex outwards by `padding` along its corner bisector.
    ///
    /// Edges stay parallel to the originals at distance `padding`.
    pub fn inflate(&self, padding: f64) -> Polygon {
        let n = self.points.len();
        if n < 3 || padding == 0.0 {
            return self.clone();
        }

        let segments = self.segments();
        let points = (0..n)
            .map(|i| {
                let n_prev = segments[(i + n - 1) % n].outward_normal();
                let n_next = segments[i].outward_normal();
                let bisector = (n_prev + n_next).normalize();
                let cos_half = bisector.dot(&n_next);
                if cos_half.abs() < 1e-9 {
                    self.points[i] + n_next * padding
                } else {
                    self.points[i] + bisector * (padding / cos_half)
                }
            })
            .collect();
        Polygon::new(points)
    }
}

/// Insert `count` evenly spaced points on every ring edge of at least 1 m.
pub fn densify(points: &[Point2D], count: usize) -> Vec<Point2D> {
    let n = points.len();
    let mut out = Vec::with_capacity(n * (count + 1));
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        out.push(a);
        if count > 0 && a.distance(&b) >= DENSIFY_MIN_EDGE {
            let step = 1.0 / (count + 1) as f64;
            for k in 1..=count {
                out.push(a + (b - a) * (step * k as f64));
            }
        }
    }
    out
}

pub(crate) fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n).map(|i| points[i].cross(&points[(i + 1) % n])).sum();
    twice * 0.5
}

pub(crate) fn is_convex_ring(points: &[Point2D]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    (0..n).all(|i| cross(points[i], points[(i + 1) % n], points[(i + 2) % n]) >= -1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::rectangle(Point2D::ZERO, 1.0, 1.0)
    }

    #[test]
    fn test_winding_normalized() {
        let cw = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 2.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(2.0, 0.0),
        ]);
        assert!(cw.signed_area() > 0.0);
        assert!((cw.area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid() {
        let c = Polygon::rectangle(Point2D::new(1.0, 1.0), 2.0, 4.0).centroid();
        assert!((c.x - 2.0).abs() < 1e-12);
        assert!((c.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_convexity() {
        assert!(unit_square().is_convex());
        let l_shape = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(0.0, 2.0),
        ]);
        assert!(!l_shape.is_convex());
        assert!(l_shape.contains(&Point2D::new(0.5, 1.5)));
        assert!(!l_shape.contains(&Point2D::new(1.5, 1.5)));
    }

    #[test]
    fn test_collinear_vertex_still_convex() {
        let poly = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(0.0, 1.0),
        ]);
        assert!(poly.is_convex());
    }

    #[test]
    fn test_contains_convex_on_edge() {
        let sq = unit_square();
        assert!(sq.contains_convex(&Point2D::new(0.5, 0.5), 1e-9));
        assert!(sq.contains_convex(&Point2D::new(1.0, 0.5), 1e-9));
        assert!(!sq.contains_convex(&Point2D::new(1.1, 0.5), 1e-9));
    }

    #[test]
    fn test_inflate_square() {
        let inflated = unit_square().inflate(0.5);
        assert!((inflated.area() - 4.0).abs() < 1e-9);
        let corner = Point2D::new(-0.5, -0.5);
        assert!(inflated.points().iter().any(|p| p.approx_eq(&corner, 1e-12)));
    }

    #[test]
    fn test_densify_long_edges_only() {
        let ring = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 0.5),
            Point2D::new(0.0, 0.5),
        ];
        let dense = densify(&ring, 2);
        // two 3 m edges gain two points each, the 0.5 m edges none
        assert_eq!(dense.len(), 8);
        assert!(dense[1].approx_eq(&Point2D::new(1.0, 0.0), 1e-12));
        assert!(dense[2].approx_eq(&Point2D::new(2.0, 0.0), 1e-12));
    }
}
