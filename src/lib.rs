pub use cgmath;
pub use config::SimConfig;
pub use error::{Error, Result};
pub use factory::{VehicleFactory, VehicleHandle};
pub use group::{GroupCommands, Phase, SignalGroup, SignalGroupAttributes, SignalGroupController};
pub use lighting::{DayNightNotifier, DayTime};
pub use path::PathCurve;
pub use scheduler::{SpawnMode, SpawnScheduler};
pub use signal::{SignalAttributes, SignalState, TrafficSignal};
pub use simulation::{SimStats, Simulation};
pub use sink::VehicleSink;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use source::{SourceAttributes, VehicleSource, WeightedPath};
pub use timer::Countdown;
pub use util::Interval;
pub use vehicle::{ArchetypeId, ArchetypeRegistry, Contact, Vehicle, VehicleArchetype};
pub use zone::CriticalZone;

mod config;
mod error;
mod factory;
mod group;
mod lighting;
pub mod math;
mod path;
mod proximity;
mod scheduler;
mod signal;
mod simulation;
mod sink;
mod source;
mod timer;
mod util;
mod vehicle;
mod zone;

new_key_type! {
    /// Unique ID of a [PathCurve].
    pub struct PathId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [TrafficSignal].
    pub struct SignalId;
    /// Unique ID of a [SignalGroup].
    pub struct SignalGroupId;
    /// Unique ID of a [SignalGroupController].
    pub struct ControllerId;
    /// Unique ID of a [CriticalZone].
    pub struct ZoneId;
    /// Unique ID of a [VehicleSource].
    pub struct SourceId;
    /// Unique ID of a [VehicleSink].
    pub struct SinkId;
}

type PathSet = SlotMap<PathId, PathCurve>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
type SignalSet = SlotMap<SignalId, TrafficSignal>;
type GroupSet = SlotMap<SignalGroupId, SignalGroup>;
type ZoneSet = SlotMap<ZoneId, CriticalZone>;
type SourceSet = SlotMap<SourceId, VehicleSource>;
type SinkSet = SlotMap<SinkId, VehicleSink>;
