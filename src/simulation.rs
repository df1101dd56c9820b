use crate::config::SimConfig;
use crate::factory::VehicleFactory;
use crate::group::{GroupCommands, SignalGroup, SignalGroupAttributes, SignalGroupController};
use crate::math::{CatmullRom2d, OrientedBox, ParametricCurve2d, Point2d};
use crate::path::{self, ArcCurve};
use crate::proximity::{self, ProximityEvent};
use crate::scheduler::{SpawnMode, SpawnScheduler};
use crate::signal::{SignalAttributes, SignalState, TrafficSignal};
use crate::sink::VehicleSink;
use crate::source::{SourceAttributes, VehicleSource};
use crate::vehicle::{ArchetypeId, ArchetypeRegistry, Contact, Vehicle, VehicleArchetype};
use crate::zone::CriticalZone;
use crate::{
    ControllerId, Error, GroupSet, PathCurve, PathId, PathSet, Result, SignalGroupId, SignalId,
    SignalSet, SinkId, SinkSet, SourceId, SourceSet, VehicleId, VehicleSet, ZoneId, ZoneSet,
};
use itertools::Itertools;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SlotMap;

/// Counters accumulated over a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Vehicles spawned by sources.
    pub spawned: usize,
    /// Vehicles removed after reaching their destination.
    pub completed: usize,
}

/// A traffic simulation.
pub struct Simulation {
    /// The paths vehicles follow.
    paths: PathSet,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The traffic signals.
    signals: SignalSet,
    /// The signal groups.
    groups: GroupSet,
    /// The signal group controllers.
    controllers: SlotMap<ControllerId, SignalGroupController>,
    /// The critical zones.
    zones: ZoneSet,
    /// The vehicle sources.
    sources: SourceSet,
    /// The regions which take vehicles out of the simulation.
    sinks: SinkSet,
    /// Triggers the registered sources.
    scheduler: SpawnScheduler,
    /// The vehicle archetypes available for spawning.
    archetypes: ArchetypeRegistry,
    /// Mirrors vehicles into an external layer, if present.
    factory: Option<Box<dyn VehicleFactory>>,
    /// The random number generator for every stochastic decision.
    rng: StdRng,
    /// The current frame of simulation.
    frame: usize,
    /// The simulated time in s.
    time: f64,
    /// Run counters.
    stats: SimStats,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Simulation {
    /// Creates a new simulation with a randomly seeded generator.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a new simulation whose random decisions are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Creates a new simulation with the scheduler and archetypes set up from a config.
    pub fn from_config(config: &SimConfig) -> Self {
        let mut sim = match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        };
        sim.scheduler = SpawnScheduler::new(config.spawn_mode, config.spawn_interval);
        for archetype in &config.archetypes {
            sim.register_archetype(archetype.clone());
        }
        sim
    }

    fn with_rng(rng: StdRng) -> Self {
        let defaults = SimConfig::default();
        Self {
            paths: PathSet::with_key(),
            vehicles: VehicleSet::with_key(),
            signals: SignalSet::with_key(),
            groups: GroupSet::with_key(),
            controllers: SlotMap::with_key(),
            zones: ZoneSet::with_key(),
            sources: SourceSet::with_key(),
            sinks: SinkSet::with_key(),
            scheduler: SpawnScheduler::new(defaults.spawn_mode, defaults.spawn_interval),
            archetypes: ArchetypeRegistry::default(),
            factory: None,
            rng,
            frame: 0,
            time: 0.0,
            stats: SimStats::default(),
        }
    }

    /// Sets the factory which mirrors vehicles into an external layer.
    pub fn set_factory(&mut self, factory: Box<dyn VehicleFactory>) {
        self.factory = Some(factory);
    }

    /// Registers a vehicle archetype and makes it available to the spawn scheduler.
    /// Returns `None` if the registry has run out of IDs.
    pub fn register_archetype(&mut self, archetype: VehicleArchetype) -> Option<ArchetypeId> {
        let id = self.archetypes.register(archetype)?;
        self.scheduler.set_archetypes(self.archetypes.ids());
        Some(id)
    }

    /// Adds a path following the given curve.
    pub fn add_path(&mut self, curve: &impl ParametricCurve2d) -> Result<PathId> {
        let curve = ArcCurve::new(curve).ok_or(Error::DegeneratePath)?;
        Ok(self.paths.insert_with_key(|id| PathCurve::new(id, curve)))
    }

    /// Adds a path which passes smoothly through the given control points.
    pub fn add_path_through(&mut self, points: &[Point2d]) -> Result<PathId> {
        let spline = CatmullRom2d::new(points).ok_or(Error::DegeneratePath)?;
        self.add_path(&spline)
    }

    /// Specifies that two paths do not conflict, so they may share critical zones.
    pub fn relate_paths(&mut self, a: PathId, b: PathId) {
        path::relate(&mut self.paths, a, b);
    }

    /// Removes the relation between two paths.
    pub fn unrelate_paths(&mut self, a: PathId, b: PathId) {
        path::unrelate(&mut self.paths, a, b);
    }

    /// Records relations on one side only, as level data may author them.
    /// Call [close_path_relations](Self::close_path_relations) once they are all declared.
    pub fn declare_relations(&mut self, path: PathId, related: &[PathId]) {
        match self.paths.get_mut(path) {
            Some(path) => related.iter().for_each(|id| path.add_relation(*id)),
            None => warn!("Cannot declare relations of missing path {:?}", path),
        }
    }

    /// Makes every path relation symmetric.
    pub fn close_path_relations(&mut self) {
        path::close_relations(&mut self.paths);
    }

    /// Adds a vehicle to the simulation.
    ///
    /// # Parameters
    /// * `archetype` - The kind of vehicle
    /// * `path` - The path to follow
    /// * `distance` - The starting distance along the path in m
    pub fn add_vehicle(
        &mut self,
        archetype: ArchetypeId,
        path: PathId,
        distance: f64,
    ) -> Option<VehicleId> {
        self.create_vehicle(archetype, path, distance, None)
    }

    /// Removes a vehicle from the simulation, releasing any zone it was holding.
    pub fn remove_vehicle(&mut self, id: VehicleId) {
        let Some(mut vehicle) = self.vehicles.remove(id) else {
            warn!("Cannot remove missing vehicle {:?}", id);
            return;
        };
        if let (Some(handle), Some(factory)) = (vehicle.take_handle(), self.factory.as_mut()) {
            factory.destroy_vehicle(handle);
        }
        if vehicle.path_id().is_none() {
            return;
        }
        for zone in self.zones.values_mut() {
            if zone.reserving_path() == vehicle.path_id() {
                zone.try_end_reservation(&self.vehicles);
            }
        }
    }

    /// Overrides a vehicle's movement priority; lower values win.
    pub fn set_vehicle_priority(&mut self, id: VehicleId, priority: u32) {
        match self.vehicles.get_mut(id) {
            Some(vehicle) => vehicle.set_priority(priority),
            None => warn!("Cannot set priority of missing vehicle {:?}", id),
        }
    }

    /// Adds a traffic signal.
    pub fn add_signal(&mut self, attributes: &SignalAttributes) -> SignalId {
        self.signals
            .insert_with_key(|id| TrafficSignal::new(id, attributes))
    }

    /// Sets the state of a traffic signal. Turning it green immediately
    /// releases every vehicle touching its effect region.
    pub fn set_signal_state(&mut self, id: SignalId, state: SignalState) {
        let Some(signal) = self.signals.get_mut(id) else {
            warn!("Cannot set state of missing signal {:?}", id);
            return;
        };
        if !signal.set_state(state) {
            return;
        }
        let region = *signal.region();
        for vehicle in self.vehicles.values_mut() {
            if vehicle.touches(&region) {
                vehicle.set_can_move(true);
            }
        }
    }

    /// Adds a signal group and applies its default state.
    pub fn add_signal_group(&mut self, attributes: &SignalGroupAttributes) -> SignalGroupId {
        let id = self
            .groups
            .insert_with_key(|id| SignalGroup::new(id, attributes));
        self.set_group_state(id, attributes.default_state);
        id
    }

    /// Sets every signal in a group to the same state.
    pub fn set_group_state(&mut self, id: SignalGroupId, state: SignalState) {
        let Some(group) = self.groups.get_mut(id) else {
            warn!("Cannot set state of missing signal group {:?}", id);
            return;
        };
        group.set_state(state);
        let signals = group.signals().to_vec();
        for signal in signals {
            self.set_signal_state(signal, state);
        }
    }

    /// Adds a controller which cycles the given groups, and starts it.
    ///
    /// # Parameters
    /// * `groups` - The groups in cycling order
    /// * `clearance` - The all-red delay between groups in s
    pub fn add_signal_controller(
        &mut self,
        groups: &[SignalGroupId],
        clearance: f64,
    ) -> ControllerId {
        let id = self
            .controllers
            .insert_with_key(|id| SignalGroupController::new(id, groups.to_vec(), clearance));
        let commands = self.controllers[id].start(&self.groups);
        self.apply_group_commands(commands);
        id
    }

    /// Adds a controller which cycles every signal group in the simulation.
    pub fn register_all_signal_groups(&mut self, clearance: f64) -> ControllerId {
        let groups = self.groups.keys().collect_vec();
        self.add_signal_controller(&groups, clearance)
    }

    /// Advances a controller to its next group without waiting for its timer.
    pub fn next_group(&mut self, id: ControllerId) {
        let Some(controller) = self.controllers.get_mut(id) else {
            warn!("Cannot advance missing signal controller {:?}", id);
            return;
        };
        let commands = controller.next_group(&self.groups);
        self.apply_group_commands(commands);
    }

    fn apply_group_commands(&mut self, commands: GroupCommands) {
        for (group, state) in commands {
            self.set_group_state(group, state);
        }
    }

    /// Adds a critical zone.
    pub fn add_zone(&mut self, region: OrientedBox) -> ZoneId {
        self.zones.insert_with_key(|id| CriticalZone::new(id, region))
    }

    /// Adds a sink. Vehicles whose body reaches it are removed as if they had
    /// reached the end of their path.
    pub fn add_sink(&mut self, region: OrientedBox) -> SinkId {
        self.sinks.insert_with_key(|id| VehicleSink::new(id, region))
    }

    /// Adds a vehicle source. It only spawns on a timer once it is registered.
    pub fn add_source(&mut self, attributes: &SourceAttributes) -> SourceId {
        self.sources
            .insert_with_key(|id| VehicleSource::new(id, attributes))
    }

    /// Lets the spawn scheduler trigger a source.
    pub fn register_source(&mut self, id: SourceId) {
        if self.sources.contains_key(id) {
            self.scheduler.register_source(id);
        } else {
            warn!("Cannot register missing source {:?}", id);
        }
    }

    /// Stops the spawn scheduler from triggering a source. The source can
    /// still be spawned from directly.
    pub fn unregister_source(&mut self, id: SourceId) {
        self.scheduler.unregister_source(id);
    }

    /// Lets the spawn scheduler trigger every source in the simulation.
    pub fn register_all_sources(&mut self) {
        for id in self.sources.keys() {
            self.scheduler.register_source(id);
        }
    }

    /// Sets whether a source spawns vehicles with their lights on,
    /// and switches the lights of the live vehicles it spawned.
    pub fn set_source_night(&mut self, id: SourceId, night: bool) {
        let Some(source) = self.sources.get_mut(id) else {
            warn!("Cannot notify missing source {:?}", id);
            return;
        };
        source.set_night(night);
        self.vehicles
            .values_mut()
            .filter(|vehicle| vehicle.source() == Some(id))
            .for_each(|vehicle| vehicle.set_night_lights(night));
    }

    /// Switches the spawn scheduler between periodic and random triggering.
    pub fn set_spawn_mode(&mut self, mode: SpawnMode) {
        self.scheduler.set_mode(mode);
    }

    /// Sets the spawn interval in s.
    pub fn set_spawn_rate(&mut self, interval: f64) {
        self.scheduler.set_spawn_rate(interval);
    }

    /// Limits the total number of vehicles the scheduler spawns.
    pub fn set_spawn_limit(&mut self, limit: Option<usize>) {
        self.scheduler.set_spawn_limit(limit);
    }

    /// Spawns a vehicle at a source, if its spawn region is clear.
    ///
    /// The archetype falls back to the source's default and then to the first
    /// registered archetype.
    pub fn spawn_vehicle(
        &mut self,
        source_id: SourceId,
        archetype: Option<ArchetypeId>,
    ) -> Option<VehicleId> {
        let Some(source) = self.sources.get(source_id) else {
            warn!("Cannot spawn from missing source {:?}", source_id);
            return None;
        };
        if !source.can_spawn() {
            debug!("Source {:?} is blocked", source_id);
            return None;
        }
        let Some(archetype) = archetype
            .or(source.default_archetype())
            .or_else(|| self.archetypes.ids().next())
        else {
            warn!("No archetype to spawn at source {:?}", source_id);
            return None;
        };
        let Some(path_id) = source.select_path(&mut self.rng) else {
            warn!("Source {:?} has no paths", source_id);
            return None;
        };
        let Some(path) = self.paths.get(path_id) else {
            warn!("Source {:?} references missing path {:?}", source_id, path_id);
            return None;
        };

        let distance = path.project(source.position());
        let speed = source.speed();
        let night = source.is_night();
        let region = *source.spawn_region();

        let id = self.create_vehicle(archetype, path_id, distance, Some(source_id))?;
        let vehicle = &mut self.vehicles[id];
        if let Some(speed) = speed {
            vehicle.set_speed(speed);
        }
        vehicle.set_night_lights(night);
        let clear = !vehicle.touches(&region);
        self.sources[source_id].set_can_spawn(clear);
        self.stats.spawned += 1;
        debug!("Spawned vehicle {:?} on path {:?}", id, path_id);
        Some(id)
    }

    fn create_vehicle(
        &mut self,
        archetype_id: ArchetypeId,
        path_id: PathId,
        distance: f64,
        source: Option<SourceId>,
    ) -> Option<VehicleId> {
        let Some(archetype) = self.archetypes.get(archetype_id) else {
            warn!("Cannot create vehicle of unknown archetype {:?}", archetype_id);
            return None;
        };
        let Some(path) = self.paths.get(path_id) else {
            warn!("Cannot create vehicle on missing path {:?}", path_id);
            return None;
        };

        let handle = match self.factory.as_mut() {
            Some(factory) => {
                let sample = path.sample(distance);
                let handle = factory.create_vehicle(archetype_id, sample.pos, sample.tan);
                if handle.is_none() {
                    warn!("Vehicle factory declined to create a vehicle");
                    return None;
                }
                handle
            }
            None => None,
        };

        let rng = &mut self.rng;
        let id = self.vehicles.insert_with_key(|id| {
            let mut vehicle = Vehicle::new(id, archetype_id, archetype, rng);
            vehicle.set_location(path, distance);
            vehicle.set_handle(handle);
            if let Some(source) = source {
                vehicle.set_source(source);
            }
            vehicle
        });
        Some(id)
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.remove_finished_vehicles();
        self.update_signals(dt);
        self.run_scheduler(dt);
        self.move_vehicles(dt);
        self.update_proximity();
        self.update_spawn_checks();
        self.frame += 1;
        self.time += dt;
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The spawn and completion counters so far.
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// The registered vehicle archetypes.
    pub fn archetypes(&self) -> &ArchetypeRegistry {
        &self.archetypes
    }

    /// The spawn scheduler.
    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    /// Gets a reference to the path with the given ID.
    pub fn get_path(&self, id: PathId) -> Option<&PathCurve> {
        self.paths.get(id)
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Gets a reference to the traffic signal with the given ID.
    pub fn get_signal(&self, id: SignalId) -> Option<&TrafficSignal> {
        self.signals.get(id)
    }

    /// Gets a reference to the signal group with the given ID.
    pub fn get_signal_group(&self, id: SignalGroupId) -> Option<&SignalGroup> {
        self.groups.get(id)
    }

    /// Gets a reference to the signal group controller with the given ID.
    pub fn get_controller(&self, id: ControllerId) -> Option<&SignalGroupController> {
        self.controllers.get(id)
    }

    /// Gets a reference to the critical zone with the given ID.
    pub fn get_zone(&self, id: ZoneId) -> Option<&CriticalZone> {
        self.zones.get(id)
    }

    /// Gets a reference to the vehicle source with the given ID.
    pub fn get_source(&self, id: SourceId) -> Option<&VehicleSource> {
        self.sources.get(id)
    }

    /// Gets a reference to the sink with the given ID.
    pub fn get_sink(&self, id: SinkId) -> Option<&VehicleSink> {
        self.sinks.get(id)
    }

    /// Returns an iterator over all the paths in the simulation.
    pub fn iter_paths(&self) -> impl Iterator<Item = &PathCurve> {
        self.paths.values()
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over all the traffic signals in the simulation.
    pub fn iter_signals(&self) -> impl Iterator<Item = &TrafficSignal> {
        self.signals.values()
    }

    /// Returns an iterator over all the signal groups in the simulation.
    pub fn iter_signal_groups(&self) -> impl Iterator<Item = &SignalGroup> {
        self.groups.values()
    }

    /// Returns an iterator over all the critical zones in the simulation.
    pub fn iter_zones(&self) -> impl Iterator<Item = &CriticalZone> {
        self.zones.values()
    }

    /// Returns an iterator over all the vehicle sources in the simulation.
    pub fn iter_sources(&self) -> impl Iterator<Item = &VehicleSource> {
        self.sources.values()
    }

    /// Returns an iterator over all the sinks in the simulation.
    pub fn iter_sinks(&self) -> impl Iterator<Item = &VehicleSink> {
        self.sinks.values()
    }

    /// Removes the vehicles which reached their destination during the last step.
    fn remove_finished_vehicles(&mut self) {
        let finished = self
            .vehicles
            .values()
            .filter(|vehicle| vehicle.reached_destination())
            .map(|vehicle| vehicle.id())
            .collect_vec();
        for id in finished {
            self.remove_vehicle(id);
            self.stats.completed += 1;
        }
    }

    /// Runs the signal controllers and the signals' own cycles.
    fn update_signals(&mut self, dt: f64) {
        let commands = self
            .controllers
            .values_mut()
            .flat_map(|controller| controller.step(dt, &self.groups))
            .collect_vec();
        for (group, state) in commands {
            self.set_group_state(group, state);
        }

        let toggles = self
            .signals
            .values_mut()
            .filter_map(|signal| {
                let state = signal.step(dt)?;
                Some((signal.id(), state))
            })
            .collect_vec();
        for (signal, state) in toggles {
            self.set_signal_state(signal, state);
        }
    }

    /// Spawns whatever the scheduler asks for.
    fn run_scheduler(&mut self, dt: f64) {
        let requests = self.scheduler.step(dt, &self.sources, &mut self.rng);
        for (source, archetype) in requests {
            if self.scheduler.is_exhausted() {
                break;
            }
            if self.spawn_vehicle(source, archetype).is_some() {
                self.scheduler.note_spawned();
            }
        }
    }

    /// Moves every vehicle which may move, then lets vehicles waiting
    /// for a critical zone retry their reservation.
    fn move_vehicles(&mut self, dt: f64) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.integrate(dt, &self.paths);

            let Some(zone_id) = vehicle.waiting_zone() else {
                continue;
            };
            match self.zones.get_mut(zone_id) {
                Some(zone) => enter_zone(zone, vehicle, &self.paths),
                None => {
                    warn!("Vehicle {:?} was waiting for a missing zone", vehicle.id());
                    vehicle.stop_waiting();
                }
            }
        }
    }

    /// Derives proximity events from the vehicles' new positions and applies
    /// them one by one, in order.
    fn update_proximity(&mut self) {
        let events =
            proximity::detect(&mut self.vehicles, &self.signals, &self.zones, &self.sinks);
        for event in events {
            self.apply_proximity_event(event);
        }
    }

    fn apply_proximity_event(&mut self, event: ProximityEvent) {
        match event {
            ProximityEvent::VehicleBegin {
                vehicle,
                other,
                contact,
            } => {
                let Some(other_priority) = self.vehicles.get(other).map(|v| v.priority()) else {
                    return;
                };
                if let Some(vehicle) = self.vehicles.get_mut(vehicle) {
                    vehicle.on_vehicle_begin(other_priority, contact);
                }
            }
            ProximityEvent::VehicleEnd { vehicle, other } => {
                let held = self.is_held(vehicle);
                if let Some(vehicle) = self.vehicles.get_mut(vehicle) {
                    debug!("Vehicle {:?} no longer near {:?}", vehicle.id(), other);
                    vehicle.on_vehicle_end();
                    if held {
                        vehicle.set_can_move(false);
                    }
                }
            }
            ProximityEvent::SignalBegin { vehicle, signal } => {
                let (Some(vehicle), Some(signal)) =
                    (self.vehicles.get_mut(vehicle), self.signals.get(signal))
                else {
                    return;
                };
                vehicle.on_signal_begin(signal.id(), signal.state());
                if signal.boosts_priority() {
                    vehicle.set_priority(1);
                }
            }
            ProximityEvent::ZoneBegin { vehicle, zone } => {
                let (Some(vehicle), Some(zone)) =
                    (self.vehicles.get_mut(vehicle), self.zones.get_mut(zone))
                else {
                    return;
                };
                enter_zone(zone, vehicle, &self.paths);
            }
            ProximityEvent::ZoneEnd { zone, .. } => {
                if let Some(zone) = self.zones.get_mut(zone) {
                    zone.try_end_reservation(&self.vehicles);
                }
            }
            ProximityEvent::SinkBegin { vehicle, sink } => {
                if let Some(vehicle) = self.vehicles.get_mut(vehicle) {
                    debug!("Vehicle {:?} entered sink {:?}", vehicle.id(), sink);
                    vehicle.arrive();
                }
            }
        }
    }

    /// Whether something other than a finished encounter still holds a
    /// vehicle: a neighbour it must yield to, a red signal it has not
    /// passed, or a zone it is waiting for.
    fn is_held(&self, id: VehicleId) -> bool {
        let Some(vehicle) = self.vehicles.get(id) else {
            return false;
        };
        let yields = vehicle.contacts.vehicles().iter().any(|(other, contact)| {
            *contact == Contact::Root
                || self
                    .vehicles
                    .get(*other)
                    .map_or(false, |other| vehicle.priority() >= other.priority())
        });
        let red = vehicle.contacts.signals().iter().any(|signal| {
            vehicle.last_green_signal() != Some(*signal)
                && self
                    .signals
                    .get(*signal)
                    .map_or(false, |signal| signal.state() == SignalState::Red)
        });
        yields || red || vehicle.waiting_zone().is_some()
    }

    /// Re-evaluates every source's spawn check region.
    fn update_spawn_checks(&mut self) {
        for source in self.sources.values_mut() {
            let region = *source.spawn_region();
            let clear = !self.vehicles.values().any(|vehicle| vehicle.touches(&region));
            source.set_can_spawn(clear);
        }
    }
}

/// A vehicle reaching a critical zone either reserves it, shares it with a
/// related path, or waits for it.
fn enter_zone(zone: &mut CriticalZone, vehicle: &mut Vehicle, paths: &PathSet) {
    let Some(path) = vehicle.path_id().and_then(|id| paths.get(id)) else {
        warn!("Vehicle {:?} reached zone {:?} without a path", vehicle.id(), zone.id());
        return;
    };
    if zone.is_reserved() && !zone.is_reserved_for(path) {
        if vehicle.waiting_zone() != Some(zone.id()) {
            vehicle.wait_for_zone(zone.id());
        }
        return;
    }
    zone.reserve(path.id());
    vehicle.zone_reserved();
}
