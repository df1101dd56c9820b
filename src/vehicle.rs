pub use self::archetype::{ArchetypeId, ArchetypeRegistry, VehicleArchetype};
use crate::factory::VehicleHandle;
use crate::math::{heading_angle, OrientedBox, Point2d, Vector2d};
use crate::proximity::Contacts;
use crate::signal::SignalState;
use crate::{PathCurve, PathId, PathSet, SignalId, SourceId, VehicleId, ZoneId};
use log::{debug, warn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

mod archetype;

/// Movement priorities are drawn from `[0, MAX_MOVEMENT_PRIORITY)`.
const MAX_MOVEMENT_PRIORITY: u32 = 1_000_000_000;

/// The maximum lateral offset from a path's centre line, in m.
const LATERAL_SPREAD: f64 = 0.2;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The archetype the vehicle was built from.
    archetype: ArchetypeId,
    /// Half the vehicle's width in m.
    half_wid: f64,
    /// Half the vehicle's length in m.
    half_len: f64,
    /// The length of the safety sensor ahead of the vehicle in m.
    safe_distance: f64,
    /// The cruising speed in m/s.
    speed: f64,
    /// The path being followed.
    path: Option<PathId>,
    /// The distance travelled along the path, in m.
    distance: f64,
    /// The fixed lateral offset from the path's centre line, in m.
    lateral_offset: f64,
    /// Tie-break value when two vehicles block each other; lower wins.
    priority: u32,
    /// Whether the vehicle is currently permitted to move.
    can_move: bool,
    /// Set once this vehicle has been granted right of way over a neighbour,
    /// and held until the encounter ends.
    collision_override: bool,
    /// The last traffic signal this vehicle passed while it was green.
    last_green_signal: Option<SignalId>,
    /// The critical zone this vehicle is waiting to reserve.
    waiting_zone: Option<ZoneId>,
    /// Whether the end of the path has been reached.
    reached_destination: bool,
    /// The terminal point of the path.
    destination: Option<Point2d>,
    /// The world space coordinates of the centre of the vehicle.
    world_pos: Point2d,
    /// A world space unit vector along the vehicle's heading.
    world_dir: Vector2d,
    /// Whether the headlights are on.
    lights_on: bool,
    /// The source which spawned this vehicle.
    source: Option<SourceId>,
    /// The handle issued by the external vehicle factory.
    handle: Option<VehicleHandle>,
    /// The neighbours, signals and zones currently in contact.
    pub(crate) contacts: Contacts,
}

/// How one vehicle's safety sensor touches another vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// The sensor touches the other vehicle's sensor.
    Sensor,
    /// The sensor touches the other vehicle's body.
    Root,
}

impl Vehicle {
    /// Creates a new vehicle which is not yet on a path.
    pub(crate) fn new(
        id: VehicleId,
        archetype_id: ArchetypeId,
        archetype: &VehicleArchetype,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            id,
            archetype: archetype_id,
            half_wid: 0.5 * archetype.width,
            half_len: 0.5 * archetype.length,
            safe_distance: archetype.safe_distance,
            speed: archetype.speed,
            path: None,
            distance: 0.0,
            lateral_offset: Uniform::new_inclusive(-LATERAL_SPREAD, LATERAL_SPREAD).sample(rng),
            priority: rng.gen_range(0..MAX_MOVEMENT_PRIORITY),
            can_move: true,
            collision_override: false,
            last_green_signal: None,
            waiting_zone: None,
            reached_destination: false,
            destination: None,
            world_pos: Point2d::new(0.0, 0.0),
            world_dir: Vector2d::unit_x(),
            lights_on: false,
            source: None,
            handle: None,
            contacts: Contacts::default(),
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The archetype the vehicle was built from.
    pub fn archetype(&self) -> ArchetypeId {
        self.archetype
    }

    /// The vehicle's width in m.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    /// The vehicle's cruising speed in m/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The ID of the path the vehicle is following.
    pub fn path_id(&self) -> Option<PathId> {
        self.path
    }

    /// The distance travelled along the path in m.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The fixed lateral offset from the path's centre line in m.
    pub fn lateral_offset(&self) -> f64 {
        self.lateral_offset
    }

    /// The movement priority; lower values win tie-breaks.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Whether the vehicle is permitted to move.
    pub fn can_move(&self) -> bool {
        self.can_move
    }

    /// Whether the vehicle holds right of way over a blocking neighbour.
    pub fn collision_override_active(&self) -> bool {
        self.collision_override
    }

    /// The last traffic signal passed on green.
    pub fn last_green_signal(&self) -> Option<SignalId> {
        self.last_green_signal
    }

    /// The critical zone the vehicle is waiting for, if any.
    pub fn waiting_zone(&self) -> Option<ZoneId> {
        self.waiting_zone
    }

    /// Whether the vehicle has reached the end of its path.
    pub fn reached_destination(&self) -> bool {
        self.reached_destination
    }

    /// The point the vehicle is driving towards.
    pub fn destination(&self) -> Option<Point2d> {
        self.destination
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.world_pos
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        self.world_dir
    }

    /// The heading angle in radians.
    pub fn heading(&self) -> f64 {
        heading_angle(self.world_dir)
    }

    /// Whether the headlights are on.
    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    /// The source which spawned the vehicle.
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// The handle issued by the vehicle factory, if there is one.
    pub fn handle(&self) -> Option<VehicleHandle> {
        self.handle
    }

    /// The region occupied by the vehicle's body.
    pub fn body(&self) -> OrientedBox {
        OrientedBox::new(self.world_pos, self.world_dir, self.half_len, self.half_wid)
    }

    /// The safety sensor region directly ahead of the vehicle.
    pub fn sensor(&self) -> OrientedBox {
        let half_sd = 0.5 * self.safe_distance;
        let centre = self.world_pos + self.world_dir * (self.half_len + half_sd);
        OrientedBox::new(centre, self.world_dir, half_sd, self.half_wid)
    }

    /// Whether either the body or the sensor touches the region.
    pub fn touches(&self, region: &OrientedBox) -> bool {
        self.body().overlaps(region) || self.sensor().overlaps(region)
    }

    /// Turns the headlights on or off.
    pub fn set_night_lights(&mut self, on: bool) {
        self.lights_on = on;
    }

    pub(crate) fn set_can_move(&mut self, can_move: bool) {
        self.can_move = can_move;
    }

    pub(crate) fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }

    pub(crate) fn set_source(&mut self, source: SourceId) {
        self.source = Some(source);
    }

    pub(crate) fn set_handle(&mut self, handle: Option<VehicleHandle>) {
        self.handle = handle;
    }

    pub(crate) fn take_handle(&mut self) -> Option<VehicleHandle> {
        self.handle.take()
    }

    /// Overrides the cruising speed.
    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Places the vehicle on a path at the given distance.
    pub(crate) fn set_location(&mut self, path: &PathCurve, distance: f64) {
        self.path = Some(path.id());
        self.distance = distance.clamp(0.0, path.length());
        self.destination = Some(path.end_point());
        self.update_coords(path);
    }

    /// Moves the vehicle along its path by `speed * dt`, if it may move.
    /// A vehicle waiting for a critical zone stays put until it reserves the
    /// zone, whatever else has released it.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    /// * `paths` - The paths in the network
    pub(crate) fn integrate(&mut self, dt: f64, paths: &PathSet) {
        if !self.can_move || self.waiting_zone.is_some() {
            return;
        }
        let Some(path) = self.path.and_then(|id| paths.get(id)) else {
            warn!("Vehicle {:?} has no path to move along", self.id);
            return;
        };

        let length = path.length();
        self.distance += self.speed * dt;
        if self.distance >= length {
            self.distance = length;
            self.reached_destination = true;
            debug!("Vehicle {:?} reached its destination", self.id);
        }
        self.update_coords(path);
    }

    /// Updates the vehicle's world coordinates.
    fn update_coords(&mut self, path: &PathCurve) {
        let sample = path.sample(self.distance);
        self.world_pos = sample.lat_offset(self.lateral_offset);
        self.world_dir = sample.tan;
    }

    /// Handles another vehicle coming into range of the safety sensor.
    ///
    /// # Parameters
    /// * `other_priority` - The other vehicle's movement priority
    /// * `contact` - Which part of the other vehicle was sensed
    pub(crate) fn on_vehicle_begin(&mut self, other_priority: u32, contact: Contact) {
        if self.collision_override {
            self.can_move = true;
            return;
        }

        if contact == Contact::Root {
            self.can_move = false;
            return;
        }

        if self.priority < other_priority {
            self.collision_override = true;
            self.can_move = true;
        } else {
            self.can_move = false;
        }
    }

    /// Handles the end of an encounter with another vehicle.
    pub(crate) fn on_vehicle_end(&mut self) {
        self.can_move = true;
        self.collision_override = false;
    }

    /// Handles the safety sensor reaching a traffic signal.
    pub(crate) fn on_signal_begin(&mut self, signal: SignalId, state: SignalState) {
        match state {
            SignalState::Green => {
                self.last_green_signal = Some(signal);
                self.can_move = true;
            }
            SignalState::Red if self.last_green_signal != Some(signal) => {
                self.can_move = false;
            }
            _ => {}
        }
    }

    /// Starts waiting for a critical zone to be released.
    pub(crate) fn wait_for_zone(&mut self, zone: ZoneId) {
        debug!("Vehicle {:?} waiting for zone {:?}", self.id, zone);
        self.waiting_zone = Some(zone);
        self.can_move = false;
    }

    /// Called once the vehicle may enter a zone. A vehicle which was waiting
    /// for the zone resumes unless a neighbour's body is in the way.
    pub(crate) fn zone_reserved(&mut self) {
        if self.waiting_zone.take().is_some() {
            self.can_move = self.collision_override
                || !self.contacts.vehicles().iter().any(|(_, c)| *c == Contact::Root);
        }
    }

    /// Marks the vehicle as arrived, so it is removed on the next step.
    pub(crate) fn arrive(&mut self) {
        self.reached_destination = true;
    }

    /// Stops waiting for a zone which no longer exists.
    pub(crate) fn stop_waiting(&mut self) {
        self.waiting_zone = None;
    }
}
