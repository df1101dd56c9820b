//! Tests of vehicles meeting each other and sharing critical zones.

use std::collections::HashSet;
use traffic_toolkit::math::{LineSegment2d, OrientedBox, Point2d, Vector2d};
use traffic_toolkit::{
    ArchetypeId, PathId, SignalAttributes, SignalGroupAttributes, SignalState, Simulation,
    SourceAttributes, SpawnMode, VehicleArchetype, WeightedPath,
};

fn straight(sim: &mut Simulation, from: (f64, f64), to: (f64, f64)) -> PathId {
    let line = LineSegment2d::from_ends(Point2d::new(from.0, from.1), Point2d::new(to.0, to.1));
    sim.add_path(&line).unwrap()
}

/// A simulation with one eastbound and one northbound path crossing at the origin.
fn crossing(seed: u64) -> (Simulation, ArchetypeId, PathId, PathId) {
    let mut sim = Simulation::with_seed(seed);
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let east = straight(&mut sim, (-30.0, 0.0), (30.0, 0.0));
    let north = straight(&mut sim, (0.0, -30.0), (0.0, 30.0));
    (sim, car, east, north)
}

#[test]
fn lower_priority_value_takes_right_of_way() {
    let (mut sim, car, east, north) = crossing(1);
    let a = sim.add_vehicle(car, east, 25.0).unwrap();
    let b = sim.add_vehicle(car, north, 25.0).unwrap();
    sim.set_vehicle_priority(a, 5);
    sim.set_vehicle_priority(b, 12);

    sim.step(0.05);

    let (a, b) = (sim.get_vehicle(a).unwrap(), sim.get_vehicle(b).unwrap());
    assert!(a.collision_override_active());
    assert!(a.can_move());
    assert!(!b.can_move());
    assert!(!b.collision_override_active());
}

#[test]
fn unequal_priorities_do_not_deadlock() {
    let (mut sim, car, east, north) = crossing(2);
    let a = sim.add_vehicle(car, east, 25.0).unwrap();
    let b = sim.add_vehicle(car, north, 25.0).unwrap();
    sim.set_vehicle_priority(a, 12);
    sim.set_vehicle_priority(b, 5);

    for _ in 0..400 {
        sim.step(0.05);
    }
    assert_eq!(sim.stats().completed, 2);
    assert_eq!(sim.iter_vehicles().count(), 0);
}

#[test]
fn vehicle_never_passes_its_path_end() {
    let (mut sim, car, east, _) = crossing(3);
    let id = sim.add_vehicle(car, east, 0.0).unwrap();
    let length = sim.get_path(east).unwrap().length();

    while let Some(vehicle) = sim.get_vehicle(id) {
        assert!(vehicle.distance() <= length);
        if vehicle.distance() >= length {
            assert!(vehicle.reached_destination());
        }
        sim.step(0.3);
    }
    assert_eq!(sim.stats().completed, 1);
}

#[test]
fn zone_excludes_unrelated_path_until_released() {
    let (mut sim, car, east, north) = crossing(4);
    let zone = sim.add_zone(OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 3.0, 3.0));
    let a = sim.add_vehicle(car, east, 23.0).unwrap();
    let b = sim.add_vehicle(car, north, 23.0).unwrap();

    sim.step(0.02);
    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), Some(east));
    let waiting = sim.get_vehicle(b).unwrap();
    assert_eq!(waiting.waiting_zone(), Some(zone));
    assert!(!waiting.can_move());
    let held_at = waiting.distance();

    let mut released = false;
    for _ in 0..500 {
        sim.step(0.02);
        let reserving = sim.get_zone(zone).unwrap().reserving_path();
        let b_vehicle = sim.get_vehicle(b).unwrap();
        if reserving == Some(east) {
            assert_eq!(b_vehicle.waiting_zone(), Some(zone));
            assert_eq!(b_vehicle.distance(), held_at);
        }
        if reserving == Some(north) {
            released = true;
            break;
        }
    }
    assert!(released);
    assert!(sim.get_vehicle(a).map_or(true, |a| a.distance() > 33.0));

    sim.step(0.02);
    sim.step(0.02);
    let b_vehicle = sim.get_vehicle(b).unwrap();
    assert!(b_vehicle.can_move());
    assert_eq!(b_vehicle.waiting_zone(), None);
    assert!(b_vehicle.distance() > held_at);
}

#[test]
fn related_paths_share_a_zone() {
    let mut sim = Simulation::with_seed(5);
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let east = straight(&mut sim, (-30.0, -2.0), (30.0, -2.0));
    let west = straight(&mut sim, (30.0, 2.0), (-30.0, 2.0));
    sim.relate_paths(east, west);
    let zone = sim.add_zone(OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 4.0, 4.0));

    let a = sim.add_vehicle(car, east, 23.0).unwrap();
    let b = sim.add_vehicle(car, west, 23.0).unwrap();
    sim.step(0.02);

    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), Some(east));
    for id in [a, b] {
        let vehicle = sim.get_vehicle(id).unwrap();
        assert!(vehicle.can_move());
        assert_eq!(vehicle.waiting_zone(), None);
    }
}

#[test]
fn one_sided_relations_are_closed() {
    let mut sim = Simulation::with_seed(6);
    let a = straight(&mut sim, (0.0, 0.0), (10.0, 0.0));
    let b = straight(&mut sim, (0.0, 5.0), (10.0, 5.0));
    let c = straight(&mut sim, (0.0, 10.0), (10.0, 10.0));
    sim.declare_relations(a, &[b, c]);
    assert!(!sim.get_path(b).unwrap().is_related_to(a));

    sim.close_path_relations();
    assert!(sim.get_path(b).unwrap().is_related_to(a));
    assert!(sim.get_path(c).unwrap().is_related_to(a));
    assert!(!sim.get_path(b).unwrap().is_related_to(c));
}

#[test]
fn removing_a_vehicle_releases_its_zone() {
    let (mut sim, car, east, _) = crossing(7);
    let zone = sim.add_zone(OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 3.0, 3.0));
    let a = sim.add_vehicle(car, east, 28.0).unwrap();
    sim.step(0.02);
    assert!(sim.get_zone(zone).unwrap().is_reserved());

    sim.remove_vehicle(a);
    assert!(!sim.get_zone(zone).unwrap().is_reserved());
}

#[test]
fn related_vehicle_does_not_hold_the_reservation() {
    let mut sim = Simulation::with_seed(8);
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let east = straight(&mut sim, (-30.0, -2.0), (30.0, -2.0));
    let west = straight(&mut sim, (30.0, 2.0), (-30.0, 2.0));
    sim.relate_paths(east, west);
    let zone = sim.add_zone(OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 4.0, 4.0));

    let a = sim.add_vehicle(car, east, 23.0).unwrap();
    let b = sim.add_vehicle(car, west, 30.0).unwrap();
    sim.step(0.02);
    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), Some(east));

    sim.remove_vehicle(a);
    let region = *sim.get_zone(zone).unwrap().region();
    assert!(sim.get_vehicle(b).unwrap().body().overlaps(&region));
    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), None);
}

#[test]
fn green_signal_does_not_release_a_zone_waiter() {
    let (mut sim, car, east, north) = crossing(9);
    let zone = sim.add_zone(OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 3.0, 3.0));
    let region = OrientedBox::new(Point2d::new(0.0, -4.0), Vector2d::unit_y(), 0.5, 1.5);
    let signal = sim.add_signal(&SignalAttributes::new(region));

    // The eastbound car sits in the zone; the northbound car's sensor
    // reaches both the zone and the signal
    sim.add_vehicle(car, east, 30.0).unwrap();
    let b = sim.add_vehicle(car, north, 22.25).unwrap();
    sim.step(0.01);
    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), Some(east));
    assert_eq!(sim.get_vehicle(b).unwrap().waiting_zone(), Some(zone));
    let held_at = sim.get_vehicle(b).unwrap().distance();

    sim.set_signal_state(signal, SignalState::Red);
    sim.set_signal_state(signal, SignalState::Green);
    for _ in 0..20 {
        sim.step(0.01);
        let waiting = sim.get_vehicle(b).unwrap();
        assert_eq!(waiting.distance(), held_at);
        assert_eq!(waiting.waiting_zone(), Some(zone));
    }
    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), Some(east));

    for _ in 0..100 {
        sim.step(0.01);
    }
    assert_eq!(sim.get_zone(zone).unwrap().reserving_path(), Some(north));
    assert!(sim.get_vehicle(b).unwrap().distance() > held_at);
}

/// Two one-way roads crossing under signal control, fed by periodic sources.
fn signalised_crossing(seed: u64) -> (Simulation, OrientedBox) {
    let mut sim = Simulation::with_seed(seed);
    sim.register_archetype(VehicleArchetype::default()).unwrap();
    sim.set_spawn_mode(SpawnMode::Periodic);
    sim.set_spawn_rate(4.0);
    let zone = OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 6.0, 6.0);
    sim.add_zone(zone);

    let mut groups = vec![];
    for (name, dir) in [("east", Vector2d::unit_x()), ("north", Vector2d::unit_y())] {
        let start = Point2d::new(0.0, 0.0) - dir * 100.0;
        let end = Point2d::new(0.0, 0.0) + dir * 100.0;
        let path = sim.add_path(&LineSegment2d::from_ends(start, end)).unwrap();
        let paths = [WeightedPath::new(path, 1.0)];
        sim.add_source(&SourceAttributes::new(start, dir, &paths));

        let stop_line = Point2d::new(0.0, 0.0) - dir * 9.0;
        let signal = sim.add_signal(&SignalAttributes::new(OrientedBox::new(stop_line, dir, 0.5, 1.5)));
        groups.push(sim.add_signal_group(&SignalGroupAttributes {
            state_change_time: 10.0,
            ..SignalGroupAttributes::new(name, &[signal])
        }));
    }
    sim.add_signal_controller(&groups, 2.0);
    sim.register_all_sources();
    (sim, zone)
}

#[test]
fn signalised_crossing_keeps_flowing() {
    let (mut sim, zone) = signalised_crossing(10);

    let mut completed = 0;
    for _ in 0..6 {
        for _ in 0..1000 {
            sim.step(0.1);
            let inside = sim
                .iter_vehicles()
                .filter(|vehicle| vehicle.body().overlaps(&zone))
                .filter_map(|vehicle| vehicle.path_id())
                .collect::<HashSet<_>>();
            assert!(inside.len() <= 1);
        }
        assert!(sim.stats().completed > completed);
        completed = sim.stats().completed;
    }
    assert!(sim.iter_vehicles().count() < 30);
}
