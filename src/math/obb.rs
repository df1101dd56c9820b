use super::{project_local, rot90, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A rectangle with an arbitrary heading.
///
/// Every region in the simulation (vehicle bodies and sensors, signal effect
/// regions, critical zones, spawn checks) is one of these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    /// The centre of the box.
    pub centre: Point2d,
    /// Unit vector along the box's local x-axis.
    pub axis: Vector2d,
    /// Half the box's extent along its local x- and y-axes.
    pub half: Vector2d,
}

impl OrientedBox {
    /// Creates a box; `heading` need not be normalised.
    pub fn new(centre: Point2d, heading: Vector2d, half_length: f64, half_width: f64) -> Self {
        let axis = if heading.magnitude2() > 0.0 {
            heading.normalize()
        } else {
            Vector2d::unit_x()
        };
        Self {
            centre,
            axis,
            half: Vector2d::new(half_length.abs(), half_width.abs()),
        }
    }

    /// Creates an axis aligned box.
    pub fn axis_aligned(centre: Point2d, half_length: f64, half_width: f64) -> Self {
        Self::new(centre, Vector2d::unit_x(), half_length, half_width)
    }

    /// Returns true if the point lies inside or on the edge of the box.
    pub fn contains(&self, point: Point2d) -> bool {
        let local = project_local(point, self.centre, self.axis, rot90(self.axis));
        Interval::disc(0.0, self.half.x).contains(local.x)
            && Interval::disc(0.0, self.half.y).contains(local.y)
    }

    /// Returns true if the two boxes overlap, using the separating axis test.
    pub fn overlaps(&self, other: &OrientedBox) -> bool {
        [
            self.axis,
            rot90(self.axis),
            other.axis,
            rot90(other.axis),
        ]
        .into_iter()
        .all(|axis| self.extent_along(axis).overlaps(&other.extent_along(axis)))
    }

    /// The interval covered by the box when projected onto `axis`.
    fn extent_along(&self, axis: Vector2d) -> Interval<f64> {
        let centre = self.centre.to_vec().dot(axis);
        let radius = self.half.x * self.axis.dot(axis).abs()
            + self.half.y * rot90(self.axis).dot(axis).abs();
        Interval::disc(centre, radius)
    }
}
