use crate::math::OrientedBox;
use crate::{PathCurve, PathId, VehicleSet, ZoneId};
use log::debug;

/// A shared region of an intersection which may only be occupied by vehicles
/// on one path, or on paths related to it, at a time.
///
/// The reservation is keyed by path rather than by vehicle, so it is held
/// until the last vehicle on the reserving path has left.
#[derive(Clone, Debug)]
pub struct CriticalZone {
    /// The zone ID.
    id: ZoneId,
    /// The region covered by the zone.
    region: OrientedBox,
    /// The path holding the reservation.
    reserving_path: Option<PathId>,
}

impl CriticalZone {
    pub(crate) fn new(id: ZoneId, region: OrientedBox) -> Self {
        Self {
            id,
            region,
            reserving_path: None,
        }
    }

    /// Gets the zone's ID.
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// The region covered by the zone.
    pub fn region(&self) -> &OrientedBox {
        &self.region
    }

    /// The path holding the reservation, if any.
    pub fn reserving_path(&self) -> Option<PathId> {
        self.reserving_path
    }

    pub fn is_reserved(&self) -> bool {
        self.reserving_path.is_some()
    }

    /// Whether the zone is reserved for the given path or a path related to it.
    pub fn is_reserved_for(&self, path: &PathCurve) -> bool {
        self.reserving_path
            .map_or(false, |reserving| path.is_related_to(reserving))
    }

    /// Reserves the zone for a path.
    /// Returns `false`, leaving the zone untouched, if it is already reserved.
    pub(crate) fn reserve(&mut self, path: PathId) -> bool {
        if self.is_reserved() {
            return false;
        }
        debug!("Zone {:?} reserved for path {:?}", self.id, path);
        self.reserving_path = Some(path);
        true
    }

    /// Releases the reservation unless a vehicle on the reserving path still
    /// touches the zone. Vehicles on related paths do not hold it.
    /// Returns `true` if the zone was released.
    pub(crate) fn try_end_reservation(&mut self, vehicles: &VehicleSet) -> bool {
        let Some(path) = self.reserving_path else {
            return false;
        };
        let still_inside = vehicles
            .values()
            .filter(|vehicle| vehicle.path_id() == Some(path))
            .any(|vehicle| vehicle.touches(&self.region));
        if still_inside {
            return false;
        }
        debug!("Zone {:?} released by path {:?}", self.id, path);
        self.reserving_path = None;
        true
    }
}
