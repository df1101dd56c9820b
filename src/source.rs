use crate::math::{OrientedBox, Point2d, Vector2d};
use crate::vehicle::ArchetypeId;
use crate::{PathId, SourceId};
use itertools::Itertools;
use log::warn;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// How far the total path weight of a source may stray from 1 before a warning.
const WEIGHT_TOLERANCE: f64 = 1e-4;

/// Default half extents of the spawn check region, in m.
const SPAWN_REGION_HALF_LEN: f64 = 3.0;
const SPAWN_REGION_HALF_WID: f64 = 1.5;

/// A spawn point which sends new vehicles down one of several paths.
#[derive(Clone, Debug)]
pub struct VehicleSource {
    /// The source ID.
    id: SourceId,
    /// Where vehicles are spawned.
    position: Point2d,
    /// The direction spawned vehicles face.
    heading: Vector2d,
    /// The candidate paths, in ascending order of weight.
    paths: Vec<WeightedPath>,
    /// The archetype to spawn when none is requested.
    default_archetype: Option<ArchetypeId>,
    /// Overrides the cruising speed of spawned vehicles.
    speed: Option<f64>,
    /// Whether spawned vehicles have their lights on.
    is_night: bool,
    /// The region which must be clear before another vehicle is spawned.
    spawn_region: OrientedBox,
    /// Whether the spawn region is clear.
    can_spawn: bool,
}

/// A path a source may send vehicles down, with the probability of choosing it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedPath {
    pub path: PathId,
    pub weight: f64,
}

/// The attributes of a vehicle source.
#[derive(Clone, Copy, Debug)]
pub struct SourceAttributes<'a> {
    /// Where vehicles are spawned.
    pub position: Point2d,
    /// The direction spawned vehicles face.
    pub heading: Vector2d,
    /// The candidate paths and their weights, which should sum to 1.
    pub paths: &'a [WeightedPath],
    /// The archetype to spawn when none is requested.
    pub default_archetype: Option<ArchetypeId>,
    /// Overrides the cruising speed of spawned vehicles.
    pub speed: Option<f64>,
    /// Whether spawned vehicles have their lights on.
    pub is_night: bool,
    /// The spawn check region; defaults to a box around the spawn point.
    pub spawn_region: Option<OrientedBox>,
}

impl<'a> SourceAttributes<'a> {
    pub fn new(position: Point2d, heading: Vector2d, paths: &'a [WeightedPath]) -> Self {
        Self {
            position,
            heading,
            paths,
            default_archetype: None,
            speed: None,
            is_night: false,
            spawn_region: None,
        }
    }
}

impl WeightedPath {
    pub fn new(path: PathId, weight: f64) -> Self {
        Self { path, weight }
    }
}

impl VehicleSource {
    pub(crate) fn new(id: SourceId, attribs: &SourceAttributes) -> Self {
        let paths = attribs
            .paths
            .iter()
            .copied()
            .sorted_by(|a, b| a.weight.total_cmp(&b.weight))
            .collect_vec();

        let total: f64 = paths.iter().map(|p| p.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            warn!(
                "Path weights of source {:?} sum to {} rather than 1",
                id, total
            );
        }

        let spawn_region = attribs.spawn_region.unwrap_or_else(|| {
            OrientedBox::new(
                attribs.position,
                attribs.heading,
                SPAWN_REGION_HALF_LEN,
                SPAWN_REGION_HALF_WID,
            )
        });

        Self {
            id,
            position: attribs.position,
            heading: attribs.heading,
            paths,
            default_archetype: attribs.default_archetype,
            speed: attribs.speed,
            is_night: attribs.is_night,
            spawn_region,
            can_spawn: true,
        }
    }

    /// Gets the source's ID.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Where vehicles are spawned.
    pub fn position(&self) -> Point2d {
        self.position
    }

    pub fn heading(&self) -> Vector2d {
        self.heading
    }

    /// The candidate paths, in ascending order of weight.
    pub fn paths(&self) -> &[WeightedPath] {
        &self.paths
    }

    pub fn default_archetype(&self) -> Option<ArchetypeId> {
        self.default_archetype
    }

    /// The speed given to spawned vehicles instead of their archetype's.
    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn is_night(&self) -> bool {
        self.is_night
    }

    /// The region which must be clear before another vehicle is spawned.
    pub fn spawn_region(&self) -> &OrientedBox {
        &self.spawn_region
    }

    /// Whether the spawn region is clear.
    pub fn can_spawn(&self) -> bool {
        self.can_spawn
    }

    pub(crate) fn set_can_spawn(&mut self, can_spawn: bool) {
        self.can_spawn = can_spawn;
    }

    pub(crate) fn set_night(&mut self, is_night: bool) {
        self.is_night = is_night;
    }

    /// Chooses a path at random according to the path weights.
    pub fn select_path(&self, rng: &mut impl Rng) -> Option<PathId> {
        let r = Uniform::new_inclusive(0.0, 1.0).sample(rng);
        self.select_path_with(r)
    }

    /// Chooses the first path whose cumulative weight reaches `r`,
    /// or the last path if none does.
    pub fn select_path_with(&self, r: f64) -> Option<PathId> {
        let mut cumulative = 0.0;
        self.paths
            .iter()
            .find(|p| {
                cumulative += p.weight;
                cumulative >= r
            })
            .or_else(|| self.paths.last())
            .map(|p| p.path)
    }
}
