use log::warn;
use serde::{Deserialize, Serialize};

/// Identifies a [VehicleArchetype] within an [ArchetypeRegistry].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchetypeId(pub u16);

/// The physical and behavioural attributes shared by a class of vehicles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleArchetype {
    /// A human readable name, e.g. "sedan".
    pub name: String,
    /// The vehicle length in m.
    pub length: f64,
    /// The vehicle width in m.
    pub width: f64,
    /// The constant cruising speed in m/s.
    pub speed: f64,
    /// The length of the safety sensor ahead of the vehicle in m.
    pub safe_distance: f64,
}

impl Default for VehicleArchetype {
    fn default() -> Self {
        Self {
            name: "car".into(),
            length: 4.5,
            width: 1.8,
            speed: 8.0,
            safe_distance: 3.0,
        }
    }
}

/// A static table of the vehicle archetypes available for spawning,
/// populated once at startup.
#[derive(Clone, Debug, Default)]
pub struct ArchetypeRegistry {
    archetypes: Vec<VehicleArchetype>,
}

impl ArchetypeRegistry {
    /// Registers an archetype and returns its ID, or `None` once every ID
    /// is taken.
    pub fn register(&mut self, archetype: VehicleArchetype) -> Option<ArchetypeId> {
        let Ok(idx) = u16::try_from(self.archetypes.len()) else {
            warn!("Archetype registry is full; ignoring {:?}", archetype.name);
            return None;
        };
        self.archetypes.push(archetype);
        Some(ArchetypeId(idx))
    }

    /// Looks up an archetype.
    pub fn get(&self, id: ArchetypeId) -> Option<&VehicleArchetype> {
        self.archetypes.get(id.0 as usize)
    }

    /// Finds an archetype by name.
    pub fn find(&self, name: &str) -> Option<ArchetypeId> {
        self.archetypes
            .iter()
            .position(|a| a.name == name)
            .and_then(|idx| u16::try_from(idx).ok())
            .map(ArchetypeId)
    }

    /// The IDs of all registered archetypes.
    pub fn ids(&self) -> impl Iterator<Item = ArchetypeId> + '_ {
        (0..self.archetypes.len())
            .filter_map(|idx| u16::try_from(idx).ok())
            .map(ArchetypeId)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
