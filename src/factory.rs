//! The seam to an external layer (rendering, physics) that mirrors vehicles.

use crate::math::{Point2d, Vector2d};
use crate::vehicle::ArchetypeId;
use serde::{Deserialize, Serialize};

/// An opaque handle to a vehicle created by a [VehicleFactory].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleHandle(pub u64);

/// Creates and destroys the external counterparts of simulated vehicles.
pub trait VehicleFactory {
    /// Creates a vehicle at the given position, facing along `heading`.
    ///
    /// Returning `None` aborts the spawn.
    fn create_vehicle(
        &mut self,
        archetype: ArchetypeId,
        position: Point2d,
        heading: Vector2d,
    ) -> Option<VehicleHandle>;

    /// Destroys a vehicle previously created by this factory.
    fn destroy_vehicle(&mut self, handle: VehicleHandle);
}
