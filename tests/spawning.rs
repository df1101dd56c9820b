//! Tests of vehicle sources, the spawn scheduler and the vehicle factory seam.

use std::cell::RefCell;
use std::rc::Rc;
use traffic_toolkit::math::{LineSegment2d, Point2d, Vector2d};
use traffic_toolkit::{
    ArchetypeId, PathId, SimConfig, Simulation, SourceAttributes, SourceId, SpawnMode,
    VehicleArchetype, VehicleFactory, VehicleHandle, WeightedPath,
};

/// Adds a source at the start of its own eastbound path, `y` m north of the origin.
fn add_source(sim: &mut Simulation, y: f64) -> (SourceId, PathId) {
    let line = LineSegment2d::from_ends(Point2d::new(0.0, y), Point2d::new(200.0, y));
    let path = sim.add_path(&line).unwrap();
    let paths = [WeightedPath::new(path, 1.0)];
    let source = sim.add_source(&SourceAttributes::new(
        Point2d::new(0.0, y),
        Vector2d::unit_x(),
        &paths,
    ));
    (source, path)
}

#[test]
fn periodic_mode_spawns_at_every_source() {
    let mut sim = Simulation::with_seed(1);
    sim.register_archetype(VehicleArchetype::default()).unwrap();
    sim.set_spawn_mode(SpawnMode::Periodic);
    sim.set_spawn_rate(1.0);
    let (a, path_a) = add_source(&mut sim, 0.0);
    let (b, path_b) = add_source(&mut sim, 20.0);
    sim.register_all_sources();

    for _ in 0..3 {
        sim.step(0.25);
    }
    assert_eq!(sim.stats().spawned, 0);
    sim.step(0.25);
    assert_eq!(sim.stats().spawned, 2);
    let paths = sim.iter_vehicles().map(|v| v.path_id()).collect::<Vec<_>>();
    assert!(paths.contains(&Some(path_a)));
    assert!(paths.contains(&Some(path_b)));
    let sources = sim.iter_vehicles().map(|v| v.source()).collect::<Vec<_>>();
    assert!(sources.contains(&Some(a)));
    assert!(sources.contains(&Some(b)));
}

#[test]
fn unregistered_source_is_not_triggered() {
    let mut sim = Simulation::with_seed(11);
    sim.register_archetype(VehicleArchetype::default()).unwrap();
    sim.set_spawn_mode(SpawnMode::Periodic);
    sim.set_spawn_rate(1.0);
    let (a, _) = add_source(&mut sim, 0.0);
    let (b, _) = add_source(&mut sim, 20.0);
    sim.register_all_sources();
    sim.unregister_source(b);

    for _ in 0..4 {
        sim.step(0.25);
    }
    assert_eq!(sim.stats().spawned, 1);
    assert!(sim.iter_vehicles().all(|v| v.source() == Some(a)));
    assert!(sim.spawn_vehicle(b, None).is_some());
}

#[test]
fn blocked_source_is_skipped() {
    let mut sim = Simulation::with_seed(2);
    sim.register_archetype(VehicleArchetype::default()).unwrap();
    sim.set_spawn_mode(SpawnMode::Periodic);
    sim.set_spawn_rate(0.1);
    let (source, _) = add_source(&mut sim, 0.0);
    sim.register_source(source);

    sim.step(0.1);
    assert_eq!(sim.stats().spawned, 1);
    assert!(!sim.get_source(source).unwrap().can_spawn());

    sim.step(0.1);
    assert_eq!(sim.stats().spawned, 1);

    // Once the first vehicle has driven clear, spawning resumes
    for _ in 0..20 {
        sim.step(0.1);
    }
    assert!(sim.stats().spawned > 1);
}

#[test]
fn random_mode_respects_spawn_limit() {
    let mut sim = Simulation::with_seed(3);
    sim.register_archetype(VehicleArchetype::default()).unwrap();
    sim.set_spawn_mode(SpawnMode::Random);
    sim.set_spawn_rate(0.5);
    sim.set_spawn_limit(Some(3));
    for y in [0.0, 20.0, 40.0] {
        add_source(&mut sim, y);
    }
    sim.register_all_sources();

    for _ in 0..300 {
        sim.step(0.1);
    }
    assert_eq!(sim.stats().spawned, 3);
    assert_eq!(sim.scheduler().spawned(), 3);
    assert!(sim.scheduler().is_exhausted());
}

#[test]
fn config_drives_scheduler_and_archetypes() {
    let config = SimConfig::from_json(
        r#"{
            "spawn_mode": "Periodic",
            "spawn_interval": 2.0,
            "seed": 9,
            "archetypes": [
                { "name": "van", "length": 5.5, "width": 2.0, "speed": 6.0, "safe_distance": 4.0 }
            ]
        }"#,
    )
    .unwrap();
    let mut sim = Simulation::from_config(&config);
    assert_eq!(sim.scheduler().mode(), SpawnMode::Periodic);
    assert_eq!(sim.scheduler().interval(), 2.0);
    assert_eq!(sim.archetypes().find("van"), Some(ArchetypeId(0)));

    let (source, _) = add_source(&mut sim, 0.0);
    let id = sim.spawn_vehicle(source, None).unwrap();
    let vehicle = sim.get_vehicle(id).unwrap();
    assert_eq!(vehicle.speed(), 6.0);
    assert_eq!(vehicle.length(), 5.5);
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let mut sim = Simulation::with_seed(42);
        sim.register_archetype(VehicleArchetype::default()).unwrap();
        sim.set_spawn_rate(1.0);
        for y in [0.0, 20.0] {
            add_source(&mut sim, y);
        }
        sim.register_all_sources();
        for _ in 0..100 {
            sim.step(0.1);
        }
        sim.iter_vehicles()
            .map(|v| (v.priority(), v.distance()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[derive(Default)]
struct Recorder {
    next: u64,
    live: Vec<VehicleHandle>,
    refuse: bool,
}

struct RecordingFactory(Rc<RefCell<Recorder>>);

impl VehicleFactory for RecordingFactory {
    fn create_vehicle(
        &mut self,
        _archetype: ArchetypeId,
        _position: Point2d,
        _heading: Vector2d,
    ) -> Option<VehicleHandle> {
        let mut recorder = self.0.borrow_mut();
        if recorder.refuse {
            return None;
        }
        recorder.next += 1;
        let handle = VehicleHandle(recorder.next);
        recorder.live.push(handle);
        Some(handle)
    }

    fn destroy_vehicle(&mut self, handle: VehicleHandle) {
        self.0.borrow_mut().live.retain(|h| *h != handle);
    }
}

#[test]
fn factory_mirrors_vehicle_lifetime() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut sim = Simulation::with_seed(4);
    sim.set_factory(Box::new(RecordingFactory(recorder.clone())));
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let line = LineSegment2d::from_ends(Point2d::new(0.0, 0.0), Point2d::new(10.0, 0.0));
    let path = sim.add_path(&line).unwrap();

    let id = sim.add_vehicle(car, path, 0.0).unwrap();
    assert_eq!(sim.get_vehicle(id).unwrap().handle(), Some(VehicleHandle(1)));
    assert_eq!(recorder.borrow().live.len(), 1);

    for _ in 0..20 {
        sim.step(0.1);
    }
    assert!(sim.get_vehicle(id).is_none());
    assert!(recorder.borrow().live.is_empty());

    recorder.borrow_mut().refuse = true;
    assert!(sim.add_vehicle(car, path, 0.0).is_none());
    assert_eq!(sim.iter_vehicles().count(), 0);
}
