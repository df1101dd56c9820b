//! Pre-authored curves that vehicles follow.

pub use curve::{ArcCurve, PathSample};
use crate::math::{heading_angle, project_point_onto_curve, ParametricCurve2d, Point2d, Vector2d};
use crate::{PathId, PathSet};
use log::warn;
use smallvec::SmallVec;

mod curve;

/// A curve vehicles follow, addressed by arc-length distance.
///
/// Related paths do not conflict with one another, so a critical zone
/// reserved for one of them may be shared with the others.
#[derive(Clone, Debug)]
pub struct PathCurve {
    /// The path ID.
    id: PathId,
    /// The geometry of the path.
    curve: ArcCurve,
    /// The paths related to this one.
    related: SmallVec<[PathId; 4]>,
}

impl PathCurve {
    /// Creates a new path from an arc-length parameterised curve.
    pub(crate) fn new(id: PathId, curve: ArcCurve) -> Self {
        Self {
            id,
            curve,
            related: SmallVec::new(),
        }
    }

    /// Gets the path's ID.
    pub fn id(&self) -> PathId {
        self.id
    }

    /// Gets the length of the path in m.
    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    /// The point at the given distance along the path.
    /// Distances outside `[0, length]` are clamped.
    pub fn position_at(&self, distance: f64) -> Point2d {
        self.curve.sample_centre(distance).pos
    }

    /// The unit heading vector at the given distance along the path.
    pub fn orientation_at(&self, distance: f64) -> Vector2d {
        self.curve.sample_centre(distance).tan
    }

    /// The heading angle in radians at the given distance along the path.
    pub fn heading_at(&self, distance: f64) -> f64 {
        heading_angle(self.orientation_at(distance))
    }

    /// Samples the path at the given distance.
    pub fn sample(&self, distance: f64) -> PathSample {
        self.curve.sample_centre(distance)
    }

    /// The first point of the path.
    pub fn start_point(&self) -> Point2d {
        self.position_at(0.0)
    }

    /// The terminal point of the path.
    pub fn end_point(&self) -> Point2d {
        self.position_at(self.length())
    }

    /// Projects a point onto the path, returning its distance along the path.
    pub fn project(&self, point: Point2d) -> f64 {
        let bounds = self.curve.bounds();
        match project_point_onto_curve(&self.curve, point, 0.01, None) {
            Some(distance) => bounds.clamp(distance),
            None => {
                warn!("Unable to project point onto path {:?}; using its start", self.id);
                0.0
            }
        }
    }

    /// Whether the other path is this one or one of its related paths.
    pub fn is_related_to(&self, other: PathId) -> bool {
        other == self.id || self.related.contains(&other)
    }

    /// The paths related to this one.
    pub fn related(&self) -> &[PathId] {
        &self.related
    }

    /// Adds a one-sided relation.
    pub(crate) fn add_relation(&mut self, other: PathId) {
        if other != self.id && !self.related.contains(&other) {
            self.related.push(other);
        }
    }

    /// Removes a one-sided relation.
    pub(crate) fn remove_relation(&mut self, other: PathId) {
        self.related.retain(|id| *id != other);
    }
}

/// Relates two paths to each other.
pub(crate) fn relate(paths: &mut PathSet, a: PathId, b: PathId) {
    if let Some([path_a, path_b]) = paths.get_disjoint_mut([a, b]) {
        path_a.add_relation(b);
        path_b.add_relation(a);
    } else if a != b {
        warn!("Cannot relate missing paths {:?} and {:?}", a, b);
    }
}

/// Removes the relation between two paths, on both sides.
pub(crate) fn unrelate(paths: &mut PathSet, a: PathId, b: PathId) {
    if let Some([path_a, path_b]) = paths.get_disjoint_mut([a, b]) {
        path_a.remove_relation(b);
        path_b.remove_relation(a);
    }
}

/// Makes every relation in the set symmetric in a single pass.
pub(crate) fn close_relations(paths: &mut PathSet) {
    let edges = paths
        .values()
        .flat_map(|path| path.related.iter().map(move |other| (*other, path.id)))
        .collect::<Vec<_>>();

    for (from, to) in edges {
        match paths.get_mut(from) {
            Some(path) => path.add_relation(to),
            None => warn!("Path {:?} is related to missing path {:?}", to, from),
        }
    }
}
