//! Planar primitives used by the partition engine and the renderers.
//!
//! Polygons are stored as an ordered vertex list with implicit closure: the
//! last vertex connects back to the first and is never duplicated.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::error::GeometryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn distance_squared(self, other: Point) -> f64 {
        (self - other).norm_squared()
    }

    pub fn distance(self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three vertices encloses nothing.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.area() <= f64::EPSILON
    }

    /// Shoelace area, positive for counter-clockwise order in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            twice += p.x * q.y - q.x * p.y;
        }
        twice / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid. Falls back to the vertex mean when the polygon has no area.
    pub fn centroid(&self) -> Option<Point> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        let mut twice_area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            twice_area += cross;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }
        if twice_area.abs() < 1e-12 {
            let sx: f64 = self.points.iter().map(|p| p.x).sum();
            let sy: f64 = self.points.iter().map(|p| p.y).sum();
            return Some(Point::new(sx / n as f64, sy / n as f64));
        }
        let six_area = 3.0 * twice_area;
        Some(Point::new(cx / six_area, cy / six_area))
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;
        Some(self.points.iter().skip(1).fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Even-odd containment test; points on an edge may land either way.
    pub fn contains(&self, point: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Keep the part of the polygon where `normal · x <= offset`.
    ///
    /// Exact for convex input, which is all the partition engine produces.
    pub fn clip_half_plane(&self, normal: Point, offset: f64) -> Polygon {
        let n = self.points.len();
        let mut out = Vec::with_capacity(n + 1);
        for i in 0..n {
            let cur = self.points[i];
            let next = self.points[(i + 1) % n];
            let dc = normal.dot(cur) - offset;
            let dn = normal.dot(next) - offset;
            let cur_inside = dc <= 0.0;
            if cur_inside {
                out.push(cur);
            }
            if cur_inside != (dn <= 0.0) {
                out.push(cur.lerp(next, dc / (dc - dn)));
            }
        }
        Polygon { points: out }
    }

    /// SVG path data, `M x,y L x,y ... Z`.
    pub fn to_path_data(&self) -> String {
        let mut d = String::with_capacity(self.points.len() * 16);
        for (i, p) in self.points.iter().enumerate() {
            d.push(if i == 0 { 'M' } else { 'L' });
            d.push_str(&p.to_string());
        }
        if !self.points.is_empty() {
            d.push('Z');
        }
        d
    }
}

/// Regular `points`-gon approximating a circle of `radius` whose bounding box
/// starts at the origin, i.e. centred on `(radius, radius)`.
pub fn circling_polygon(radius: f64, points: usize) -> Result<Polygon, GeometryError> {
    if points < 3 {
        return Err(GeometryError::DegeneratePolygon(points));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius));
    }
    let increment = TAU / points as f64;
    let vertices = (0..points)
        .map(|i| {
            let a = i as f64 * increment;
            Point::new(radius + radius * a.cos(), radius + radius * a.sin())
        })
        .collect();
    Ok(Polygon::new(vertices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
    }

    #[test]
    fn circling_polygon_has_requested_vertices_on_the_circle() {
        let r = 500.0;
        let poly = circling_polygon(r, 60).unwrap();
        assert_eq!(poly.len(), 60);
        let center = Point::new(r, r);
        for p in &poly.points {
            assert!((p.distance(center) - r).abs() < 1e-9);
        }
        assert_eq!(poly.points[0], Point::new(2.0 * r, r));
    }

    #[test]
    fn circling_polygon_angles_increase() {
        let r = 3.0;
        let poly = circling_polygon(r, 7).unwrap();
        let angles: Vec<f64> = poly
            .points
            .iter()
            .map(|p| (p.y - r).atan2(p.x - r).rem_euclid(TAU))
            .collect();
        for w in angles.windows(2) {
            assert!(w[1] > w[0], "{angles:?}");
        }
        assert!(poly.signed_area() > 0.0);
    }

    #[test]
    fn circling_polygon_area_approaches_circle() {
        let poly = circling_polygon(500.0, 60).unwrap();
        let circle = std::f64::consts::PI * 500.0 * 500.0;
        assert!((poly.area() - circle).abs() / circle < 0.01);
    }

    #[test]
    fn circling_polygon_rejects_bad_input() {
        assert_eq!(
            circling_polygon(1.0, 2),
            Err(GeometryError::DegeneratePolygon(2))
        );
        assert!(matches!(
            circling_polygon(-1.0, 10),
            Err(GeometryError::InvalidRadius(_))
        ));
        assert!(circling_polygon(f64::NAN, 10).is_err());
    }

    #[test]
    fn square_area_and_centroid() {
        let sq = unit_square();
        assert!((sq.area() - 1.0).abs() < 1e-12);
        let c = sq.centroid().unwrap();
        assert!((c.x - 0.5).abs() < 1e-12 && (c.y - 0.5).abs() < 1e-12);
        assert!(sq.contains(Point::new(0.25, 0.75)));
        assert!(!sq.contains(Point::new(1.5, 0.5)));
    }

    #[test]
    fn clipping_keeps_the_requested_side() {
        let sq = unit_square();
        let left = sq.clip_half_plane(Point::new(1.0, 0.0), 0.25);
        let right = sq.clip_half_plane(Point::new(-1.0, 0.0), -0.25);
        assert!((left.area() - 0.25).abs() < 1e-12);
        assert!((right.area() - 0.75).abs() < 1e-12);

        let nothing = sq.clip_half_plane(Point::new(1.0, 0.0), -1.0);
        assert!(nothing.is_degenerate());
        let everything = sq.clip_half_plane(Point::new(1.0, 0.0), 2.0);
        assert_eq!(everything, sq);
    }

    #[test]
    fn path_data_is_closed() {
        let d = unit_square().to_path_data();
        assert!(d.starts_with("M0.00,0.00L1.00,0.00"));
        assert!(d.ends_with('Z'));
        assert_eq!(Polygon::default().to_path_data(), "");
    }
}
