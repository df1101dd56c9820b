//! Derives begin/end proximity events from the positions of every entity.

use crate::math::OrientedBox;
use crate::vehicle::Contact;
use crate::{SignalId, SignalSet, SinkId, SinkSet, VehicleId, VehicleSet, ZoneId, ZoneSet};
use itertools::Itertools;
use smallvec::SmallVec;

/// The entities a vehicle was in contact with at the end of the last step.
#[derive(Clone, Debug, Default)]
pub(crate) struct Contacts {
    /// Neighbours touched by the safety sensor, and how.
    vehicles: SmallVec<[(VehicleId, Contact); 4]>,
    /// Signals whose effect region the sensor touches.
    signals: SmallVec<[SignalId; 2]>,
    /// Zones the sensor touches.
    zones_sensed: SmallVec<[ZoneId; 2]>,
    /// Zones the body touches.
    zones_occupied: SmallVec<[ZoneId; 2]>,
    /// Sinks the body touches.
    sinks: SmallVec<[SinkId; 1]>,
}

impl Contacts {
    /// The neighbours touched by the safety sensor.
    pub fn vehicles(&self) -> &[(VehicleId, Contact)] {
        &self.vehicles
    }

    /// The signals whose effect region the sensor touches.
    pub fn signals(&self) -> &[SignalId] {
        &self.signals
    }
}

/// A change in what a vehicle is touching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProximityEvent {
    VehicleBegin {
        vehicle: VehicleId,
        other: VehicleId,
        contact: Contact,
    },
    VehicleEnd {
        vehicle: VehicleId,
        other: VehicleId,
    },
    SignalBegin {
        vehicle: VehicleId,
        signal: SignalId,
    },
    ZoneBegin {
        vehicle: VehicleId,
        zone: ZoneId,
    },
    ZoneEnd {
        vehicle: VehicleId,
        zone: ZoneId,
    },
    SinkBegin {
        vehicle: VehicleId,
        sink: SinkId,
    },
}

/// The regions of one vehicle, captured before any events are applied.
struct Snapshot {
    id: VehicleId,
    body: OrientedBox,
    sensor: OrientedBox,
}

/// Compares the current positions against each vehicle's recorded contacts,
/// records the new contacts, and returns the events to apply.
///
/// End events come before begin events. Within each kind, events follow
/// the arena order of the vehicles.
pub(crate) fn detect(
    vehicles: &mut VehicleSet,
    signals: &SignalSet,
    zones: &ZoneSet,
    sinks: &SinkSet,
) -> Vec<ProximityEvent> {
    let snapshots = vehicles
        .values()
        .map(|vehicle| Snapshot {
            id: vehicle.id(),
            body: vehicle.body(),
            sensor: vehicle.sensor(),
        })
        .collect_vec();

    let mut ends = vec![];
    let mut begins = vec![];

    for snapshot in &snapshots {
        let Some(vehicle) = vehicles.get_mut(snapshot.id) else {
            continue;
        };
        let current = sense(snapshot, &snapshots, signals, zones, sinks);
        let previous = std::mem::replace(&mut vehicle.contacts, current);
        let current = &vehicle.contacts;
        let id = snapshot.id;

        for (other, _) in &previous.vehicles {
            if !current.vehicles.iter().any(|(v, _)| v == other) {
                ends.push(ProximityEvent::VehicleEnd {
                    vehicle: id,
                    other: *other,
                });
            }
        }
        for zone in &previous.zones_occupied {
            if !current.zones_occupied.contains(zone) {
                ends.push(ProximityEvent::ZoneEnd { vehicle: id, zone: *zone });
            }
        }

        for &(other, contact) in &current.vehicles {
            if !previous.vehicles.contains(&(other, contact)) {
                begins.push(ProximityEvent::VehicleBegin {
                    vehicle: id,
                    other,
                    contact,
                });
            }
        }
        for signal in &current.signals {
            if !previous.signals.contains(signal) {
                begins.push(ProximityEvent::SignalBegin {
                    vehicle: id,
                    signal: *signal,
                });
            }
        }
        for zone in &current.zones_sensed {
            if !previous.zones_sensed.contains(zone) {
                begins.push(ProximityEvent::ZoneBegin { vehicle: id, zone: *zone });
            }
        }
        for sink in &current.sinks {
            if !previous.sinks.contains(sink) {
                begins.push(ProximityEvent::SinkBegin { vehicle: id, sink: *sink });
            }
        }
    }

    ends.extend(begins);
    ends
}

/// Finds everything one vehicle currently touches.
fn sense(
    snapshot: &Snapshot,
    snapshots: &[Snapshot],
    signals: &SignalSet,
    zones: &ZoneSet,
    sinks: &SinkSet,
) -> Contacts {
    let vehicles = snapshots
        .iter()
        .filter(|other| other.id != snapshot.id)
        .filter_map(|other| {
            if snapshot.sensor.overlaps(&other.body) {
                Some((other.id, Contact::Root))
            } else if snapshot.sensor.overlaps(&other.sensor) {
                Some((other.id, Contact::Sensor))
            } else {
                None
            }
        })
        .collect();

    let signals = signals
        .iter()
        .filter(|(_, signal)| snapshot.sensor.overlaps(signal.region()))
        .map(|(id, _)| id)
        .collect();

    let zones_sensed = zones
        .iter()
        .filter(|(_, zone)| snapshot.sensor.overlaps(zone.region()))
        .map(|(id, _)| id)
        .collect();

    let zones_occupied = zones
        .iter()
        .filter(|(_, zone)| snapshot.body.overlaps(zone.region()))
        .map(|(id, _)| id)
        .collect();

    let sinks = sinks
        .iter()
        .filter(|(_, sink)| snapshot.body.overlaps(sink.region()))
        .map(|(id, _)| id)
        .collect();

    Contacts {
        vehicles,
        signals,
        zones_sensed,
        zones_occupied,
        sinks,
    }
}
