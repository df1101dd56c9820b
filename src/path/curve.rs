use crate::math::{
    equidistant_points_along_curve, rot90, ParametricCurve2d, Point2d, QuadraticBezier2d,
    Vector2d,
};
use crate::util::Interval;
use cgmath::prelude::*;

/// The spacing of resampled points along a path in m.
const PATH_SEGMENT_LEN: f64 = 0.5;

/// An arc-length parameterised curve, stored as a chain of quadratic bezier segments.
#[derive(Clone, Debug)]
pub struct ArcCurve {
    scale: f64,
    length: f64,
    segments: Vec<QuadraticBezier2d>,
}

/// The result of sampling an [ArcCurve].
#[derive(Clone, Copy, Debug)]
pub struct PathSample {
    /// The point on the centre line.
    pub pos: Point2d,
    /// The tangent unit vector of the curve.
    pub tan: Vector2d,
}

impl PathSample {
    /// Offsets the sampled point perpendicular to the curve;
    /// positive offsets are to the left of the direction of travel.
    pub fn lat_offset(&self, offset: f64) -> Point2d {
        self.pos + rot90(self.tan) * offset
    }
}

impl ArcCurve {
    /// Creates a new [ArcCurve] from the given parametric curve,
    /// with the default step size.
    ///
    /// Returns `None` if the curve has no length.
    pub fn new(curve: &impl ParametricCurve2d) -> Option<Self> {
        Self::with_step(curve, PATH_SEGMENT_LEN)
    }

    /// Creates a new [ArcCurve] from the given parametric curve,
    /// with the given step size.
    pub fn with_step(curve: &impl ParametricCurve2d, step: f64) -> Option<Self> {
        let (mut points, length) = equidistant_points_along_curve(curve, step);
        if points.len() < 2 || length < 0.001 * step {
            return None;
        }

        // Ensure number of points are odd so they can be evenly divided among segments
        if points.len() % 2 == 0 {
            let p1 = points[points.len() - 2];
            let p2 = points[points.len() - 1];
            points.push(p2 + (p2 - p1));
        }

        let segments = points
            .windows(3)
            .step_by(2)
            .map(|points| {
                let (p1, p2, p3) = (points[0], points[1], points[2]);
                let mid = p1.to_vec().lerp(p3.to_vec(), 0.5);
                let control = Point2d::from_vec(p2.to_vec().lerp(mid, -1.0));
                QuadraticBezier2d::new(&[p1, control, p3])
            })
            .collect::<Vec<_>>();

        Some(Self {
            scale: 0.5 / step,
            length,
            segments,
        })
    }

    /// The length of the curve in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Samples the centre line of the curve at the given distance along it.
    /// Distances outside the curve are clamped to its ends.
    pub fn sample_centre(&self, pos: f64) -> PathSample {
        let (segment, t) = self.sample_internal(pos);
        let pos = segment.sample(t);
        let dt = segment.sample_dt(t);
        let tan = if dt.magnitude2() > 0.0 {
            dt.normalize()
        } else {
            Vector2d::unit_x()
        };
        PathSample { pos, tan }
    }

    /// Finds the segment containing `pos` and the local parameter within it.
    fn sample_internal(&self, pos: f64) -> (&QuadraticBezier2d, f64) {
        let pos = pos.clamp(0.0, self.length) * self.scale;
        let idx = usize::min(pos as usize, self.segments.len() - 1);
        let t = pos - (idx as f64);
        (&self.segments[idx], t)
    }
}

impl ParametricCurve2d for ArcCurve {
    fn sample(&self, t: f64) -> Point2d {
        let (segment, t) = self.sample_internal(t);
        segment.sample(t)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.length())
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let (segment, t) = self.sample_internal(t);
        segment.sample_dt(t) * self.scale
    }

    fn sample_dt2(&self, t: f64) -> Vector2d {
        let (segment, t) = self.sample_internal(t);
        segment.sample_dt2(t) * self.scale.powi(2)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::LineSegment2d;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn curve_is_arclength_parameterised() {
        let curve = QuadraticBezier2d::new(&[
            Point2d::new(10.0, 10.0),
            Point2d::new(60.0, 40.0),
            Point2d::new(100.0, 45.0),
        ]);
        let curve = ArcCurve::new(&curve).unwrap();

        let ts = (0..100)
            .map(|i| i as f64 * 0.01 * curve.length())
            .collect::<Vec<_>>();
        for ts in ts.windows(2) {
            let p1 = curve.sample_centre(ts[0]).pos;
            let p2 = curve.sample_centre(ts[1]).pos;
            assert_approx_eq!((p2 - p1).magnitude(), ts[1] - ts[0], 0.01);
        }
    }

    #[test]
    fn zero_length_curve_is_rejected() {
        let point = Point2d::new(3.0, 4.0);
        assert!(ArcCurve::new(&LineSegment2d::from_ends(point, point)).is_none());
    }

    #[test]
    fn sampling_is_clamped() {
        let line = LineSegment2d::from_ends(Point2d::new(0.0, 0.0), Point2d::new(20.0, 0.0));
        let curve = ArcCurve::new(&line).unwrap();
        let before = curve.sample_centre(-5.0).pos;
        let after = curve.sample_centre(100.0).pos;
        assert_approx_eq!(before.x, 0.0, 0.001);
        assert_approx_eq!(after.x, 20.0, 0.001);
    }
}
