//! The time-of-day adapter: tells sources, and the vehicles they spawned,
//! whether to drive with their lights on.

use crate::{Error, Simulation, SourceId};
use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The time of day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayTime {
    #[default]
    Day,
    Night,
}

impl DayTime {
    pub fn is_night(self) -> bool {
        self == DayTime::Night
    }

    /// Parses a time of day, falling back to Day for anything unrecognised.
    pub fn parse_or_day(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            warn!("{}; defaulting to Day", err);
            DayTime::Day
        })
    }
}

impl FromStr for DayTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(DayTime::Day),
            "night" => Ok(DayTime::Night),
            _ => Err(Error::UnknownDayTime(s.to_string())),
        }
    }
}

/// Notifies a fixed set of vehicle sources when the time of day changes.
#[derive(Clone, Debug, Default)]
pub struct DayNightNotifier {
    sources: Vec<SourceId>,
}

impl DayNightNotifier {
    /// Creates a notifier for the given sources.
    pub fn new(sources: impl IntoIterator<Item = SourceId>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    /// Adds a source to be notified.
    pub fn register(&mut self, source: SourceId) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }

    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Applies the time of day to every registered source.
    pub fn apply(&self, sim: &mut Simulation, time: DayTime) {
        for source in &self.sources {
            sim.set_source_night(*source, time.is_night());
        }
    }
}
