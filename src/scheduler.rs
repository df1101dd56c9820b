use crate::timer::Countdown;
use crate::vehicle::ArchetypeId;
use crate::{Error, SourceId, SourceSet};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::str::FromStr;

/// How a [SpawnScheduler] chooses when and where to spawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Every interval, spawn once at every source whose spawn region is clear.
    Periodic,
    /// After a random delay, spawn once at one source chosen at random,
    /// provided every source's spawn region is clear.
    #[default]
    Random,
}

impl FromStr for SpawnMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "periodic" => Ok(SpawnMode::Periodic),
            "random" => Ok(SpawnMode::Random),
            _ => Err(Error::UnknownSpawnMode(s.to_string())),
        }
    }
}

/// A request to spawn a vehicle at a source, optionally of a particular archetype.
pub type SpawnRequests = SmallVec<[(SourceId, Option<ArchetypeId>); 4]>;

/// Triggers vehicle sources on a timer.
#[derive(Clone, Debug)]
pub struct SpawnScheduler {
    mode: SpawnMode,
    /// The spawn interval in s; the upper bound of the delay in random mode.
    interval: f64,
    countdown: Countdown,
    /// The sources driven by this scheduler.
    sources: Vec<SourceId>,
    /// The archetypes chosen from in random mode.
    archetypes: Vec<ArchetypeId>,
    /// The total number of vehicles to spawn, if limited.
    spawn_limit: Option<usize>,
    /// The number of vehicles spawned so far.
    spawned: usize,
}

impl SpawnScheduler {
    /// Creates a scheduler whose first spawn is one interval away.
    pub fn new(mode: SpawnMode, interval: f64) -> Self {
        Self {
            mode,
            interval,
            countdown: Countdown::new(interval),
            sources: vec![],
            archetypes: vec![],
            spawn_limit: None,
            spawned: 0,
        }
    }

    pub fn mode(&self) -> SpawnMode {
        self.mode
    }

    /// The spawn interval in s.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// The time until the scheduler next fires, in s.
    pub fn time_remaining(&self) -> f64 {
        self.countdown.remaining()
    }

    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// The number of vehicles spawned so far.
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Whether the spawn budget has been used up.
    pub fn is_exhausted(&self) -> bool {
        self.spawn_limit
            .map_or(false, |limit| self.spawned >= limit)
    }

    pub fn set_mode(&mut self, mode: SpawnMode) {
        self.mode = mode;
    }

    /// Sets the spawn interval in s and restarts the countdown.
    pub fn set_spawn_rate(&mut self, interval: f64) {
        if interval < 0.0 {
            warn!("Ignoring negative spawn interval {}", interval);
            return;
        }
        self.interval = interval;
        self.countdown.arm(interval);
    }

    /// Limits the total number of vehicles spawned.
    pub fn set_spawn_limit(&mut self, limit: Option<usize>) {
        self.spawn_limit = limit;
    }

    /// Sets the archetypes chosen from in random mode.
    pub fn set_archetypes(&mut self, archetypes: impl IntoIterator<Item = ArchetypeId>) {
        self.archetypes = archetypes.into_iter().collect();
    }

    /// Adds a source to the scheduler.
    pub fn register_source(&mut self, source: SourceId) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }

    pub fn unregister_source(&mut self, source: SourceId) {
        self.sources.retain(|id| *id != source);
    }

    pub(crate) fn note_spawned(&mut self) {
        self.spawned += 1;
    }

    /// Advances the countdown and returns the spawns to attempt, in order.
    pub(crate) fn step(
        &mut self,
        dt: f64,
        sources: &SourceSet,
        rng: &mut impl Rng,
    ) -> SpawnRequests {
        let mut requests = SpawnRequests::new();
        if self.is_exhausted() || !self.countdown.tick(dt) {
            return requests;
        }

        let live = self
            .sources
            .iter()
            .filter_map(|id| match sources.get(*id) {
                Some(source) => Some(source),
                None => {
                    warn!("Spawn scheduler references missing source {:?}", id);
                    None
                }
            })
            .collect::<SmallVec<[_; 8]>>();

        match self.mode {
            SpawnMode::Periodic => {
                requests.extend(
                    live.iter()
                        .filter(|source| source.can_spawn())
                        .map(|source| (source.id(), None)),
                );
                self.countdown.arm(self.interval);
            }
            SpawnMode::Random => {
                if !live.iter().all(|source| source.can_spawn()) {
                    // Stay expired and retry on the next step
                    debug!("Spawn scheduler waiting for spawn regions to clear");
                    return requests;
                }
                if let Some(source) = live.choose(rng) {
                    let archetype = self.archetypes.choose(rng).copied();
                    requests.push((source.id(), archetype));
                }
                let delay = Uniform::new_inclusive(0.0, self.interval.max(0.0)).sample(rng);
                self.countdown.arm(delay);
            }
        }

        requests
    }
}
