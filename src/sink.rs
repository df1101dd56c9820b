use crate::math::OrientedBox;
use crate::SinkId;

/// A region which takes vehicles out of the simulation.
///
/// Any vehicle whose body overlaps the region is treated as having reached
/// its destination, wherever it is along its path.
#[derive(Clone, Debug)]
pub struct VehicleSink {
    /// The sink ID.
    id: SinkId,
    /// The region covered by the sink.
    region: OrientedBox,
}

impl VehicleSink {
    pub(crate) fn new(id: SinkId, region: OrientedBox) -> Self {
        Self { id, region }
    }

    /// Gets the sink's ID.
    pub fn id(&self) -> SinkId {
        self.id
    }

    /// The region covered by the sink.
    pub fn region(&self) -> &OrientedBox {
        &self.region
    }
}
