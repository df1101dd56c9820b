use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A uniform Catmull-Rom spline passing through an ordered list of control points.
///
/// The parameter runs from 0 at the first control point to `n - 1` at the last.
#[derive(Clone, Debug)]
pub struct CatmullRom2d {
    points: Vec<Point2d>,
}

impl CatmullRom2d {
    /// Creates a spline through the given control points.
    /// Returns `None` if fewer than two points are supplied.
    pub fn new(points: &[Point2d]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self {
            points: points.to_vec(),
        })
    }

    /// The control points of the spline.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Gets the four control points around the segment containing `t`,
    /// and the local parameter within that segment.
    fn segment(&self, t: f64) -> ([Vector2d; 4], f64) {
        let last = self.points.len() - 1;
        let idx = usize::min(t.max(0.0) as usize, last - 1);
        let u = t - idx as f64;
        let at = |i: isize| {
            let i = i.clamp(0, last as isize) as usize;
            self.points[i].to_vec()
        };
        let i = idx as isize;
        ([at(i - 1), at(i), at(i + 1), at(i + 2)], u)
    }
}

impl ParametricCurve2d for CatmullRom2d {
    fn sample(&self, t: f64) -> Point2d {
        let ([p0, p1, p2, p3], u) = self.segment(t);
        let a = 2.0 * p1;
        let b = p2 - p0;
        let c = 2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3;
        let d = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        Point2d::from_vec(0.5 * (a + b * u + c * (u * u) + d * (u * u * u)))
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, (self.points.len() - 1) as f64)
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let ([p0, p1, p2, p3], u) = self.segment(t);
        let b = p2 - p0;
        let c = 2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3;
        let d = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        0.5 * (b + c * (2.0 * u) + d * (3.0 * u * u))
    }
}
