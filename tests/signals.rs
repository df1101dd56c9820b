//! Tests of traffic signals, signal groups and their controllers.

use traffic_toolkit::math::{LineSegment2d, OrientedBox, Point2d};
use traffic_toolkit::{
    Phase, SignalAttributes, SignalGroupAttributes, SignalGroupId, SignalState, Simulation,
    VehicleArchetype,
};

fn signal_region(x: f64) -> OrientedBox {
    OrientedBox::axis_aligned(Point2d::new(x, 0.0), 1.0, 2.0)
}

#[test]
fn green_releases_waiting_vehicles_immediately() {
    let mut sim = Simulation::with_seed(1);
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let line = LineSegment2d::from_ends(Point2d::new(-30.0, 0.0), Point2d::new(30.0, 0.0));
    let path = sim.add_path(&line).unwrap();
    let signal = sim.add_signal(&SignalAttributes {
        state: SignalState::Red,
        ..SignalAttributes::new(signal_region(0.0))
    });
    let id = sim.add_vehicle(car, path, 24.0).unwrap();

    sim.step(0.05);
    assert!(!sim.get_vehicle(id).unwrap().can_move());
    let stopped_at = sim.get_vehicle(id).unwrap().distance();
    sim.step(0.05);
    assert_eq!(sim.get_vehicle(id).unwrap().distance(), stopped_at);

    sim.set_signal_state(signal, SignalState::Green);
    assert!(sim.get_vehicle(id).unwrap().can_move());

    sim.step(0.05);
    assert!(sim.get_vehicle(id).unwrap().distance() > stopped_at);
}

#[test]
fn vehicle_past_green_signal_is_not_stopped_again() {
    let mut sim = Simulation::with_seed(2);
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let line = LineSegment2d::from_ends(Point2d::new(-30.0, 0.0), Point2d::new(30.0, 0.0));
    let path = sim.add_path(&line).unwrap();
    let signal = sim.add_signal(&SignalAttributes::new(signal_region(0.0)));
    let id = sim.add_vehicle(car, path, 24.0).unwrap();

    sim.step(0.05);
    assert_eq!(sim.get_vehicle(id).unwrap().last_green_signal(), Some(signal));
    sim.set_signal_state(signal, SignalState::Red);
    for _ in 0..20 {
        sim.step(0.05);
        assert!(sim.get_vehicle(id).unwrap().can_move());
    }
}

#[test]
fn priority_boost_wins_tie_breaks() {
    let mut sim = Simulation::with_seed(3);
    let car = sim.register_archetype(VehicleArchetype::default()).unwrap();
    let line = LineSegment2d::from_ends(Point2d::new(-30.0, 0.0), Point2d::new(30.0, 0.0));
    let path = sim.add_path(&line).unwrap();
    sim.add_signal(&SignalAttributes {
        boost_priority: true,
        ..SignalAttributes::new(signal_region(0.0))
    });
    let id = sim.add_vehicle(car, path, 24.0).unwrap();
    sim.set_vehicle_priority(id, 500);

    sim.step(0.05);
    assert_eq!(sim.get_vehicle(id).unwrap().priority(), 1);
}

fn groups(sim: &mut Simulation, n: usize) -> Vec<SignalGroupId> {
    (0..n)
        .map(|i| {
            let signal = sim.add_signal(&SignalAttributes::new(signal_region(10.0 * i as f64)));
            sim.add_signal_group(&SignalGroupAttributes {
                state_change_time: 10.0,
                ..SignalGroupAttributes::new("group", &[signal])
            })
        })
        .collect()
}

fn green_groups(sim: &Simulation) -> Vec<SignalGroupId> {
    sim.iter_signal_groups()
        .filter(|group| group.state() == SignalState::Green)
        .map(|group| group.id())
        .collect()
}

#[test]
fn groups_default_to_red() {
    let mut sim = Simulation::with_seed(4);
    let ids = groups(&mut sim, 2);
    assert!(green_groups(&sim).is_empty());
    for id in ids {
        let group = sim.get_signal_group(id).unwrap();
        for signal in group.signals() {
            assert_eq!(sim.get_signal(*signal).unwrap().state(), SignalState::Red);
        }
    }
}

#[test]
fn controller_cycles_one_group_at_a_time() {
    let mut sim = Simulation::with_seed(5);
    let ids = groups(&mut sim, 3);
    let controller = sim.add_signal_controller(&ids, 0.0);

    let mut sequence = vec![sim.get_controller(controller).unwrap().current_group().unwrap()];
    for _ in 0..140 {
        sim.step(0.5);
        let green = green_groups(&sim);
        assert_eq!(green.len(), 1);
        for group in sim.iter_signal_groups() {
            for signal in group.signals() {
                assert_eq!(sim.get_signal(*signal).unwrap().state(), group.state());
            }
        }
        if sequence.last() != Some(&green[0]) {
            sequence.push(green[0]);
        }
    }

    assert_eq!(
        sequence,
        vec![ids[0], ids[1], ids[2], ids[0], ids[1], ids[2], ids[0], ids[1]]
    );
}

#[test]
fn clearance_keeps_every_group_red() {
    let mut sim = Simulation::with_seed(6);
    let ids = groups(&mut sim, 2);
    let controller = sim.add_signal_controller(&ids, 2.0);

    for _ in 0..20 {
        sim.step(0.5);
    }
    assert_eq!(
        sim.get_controller(controller).unwrap().phase(),
        Phase::Clearing(0)
    );
    assert!(green_groups(&sim).is_empty());

    for _ in 0..4 {
        sim.step(0.5);
    }
    assert_eq!(green_groups(&sim), vec![ids[1]]);
}

#[test]
fn manual_advance_skips_the_timer() {
    let mut sim = Simulation::with_seed(7);
    let ids = groups(&mut sim, 2);
    let controller = sim.add_signal_controller(&ids, 0.0);
    assert_eq!(green_groups(&sim), vec![ids[0]]);

    sim.next_group(controller);
    assert_eq!(green_groups(&sim), vec![ids[1]]);
    sim.next_group(controller);
    assert_eq!(green_groups(&sim), vec![ids[0]]);
}

#[test]
fn register_all_includes_every_group() {
    let mut sim = Simulation::with_seed(8);
    let ids = groups(&mut sim, 3);
    let controller = sim.register_all_signal_groups(0.0);
    assert_eq!(sim.get_controller(controller).unwrap().groups(), ids.as_slice());
}

#[test]
fn automatic_cycle_toggles_signal() {
    let mut sim = Simulation::with_seed(9);
    let signal = sim.add_signal(&SignalAttributes {
        auto_cycle: Some(1.0),
        ..SignalAttributes::new(signal_region(0.0))
    });
    for _ in 0..4 {
        sim.step(0.25);
    }
    assert_eq!(sim.get_signal(signal).unwrap().state(), SignalState::Red);
    for _ in 0..4 {
        sim.step(0.25);
    }
    assert_eq!(sim.get_signal(signal).unwrap().state(), SignalState::Green);
}
