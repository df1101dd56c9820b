use crate::math::OrientedBox;
use crate::timer::Countdown;
use crate::{Error, SignalId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A traffic signal gating vehicles whose sensors reach its effect region.
#[derive(Clone, Debug)]
pub struct TrafficSignal {
    /// The signal ID.
    id: SignalId,
    /// The region in which the signal acts on vehicles.
    region: OrientedBox,
    /// The current state.
    state: SignalState,
    /// Whether vehicles reaching the signal get top movement priority.
    boost_priority: bool,
    /// The signal's own Red/Green cycle, if it is not driven by a group.
    auto_cycle: Option<AutoCycle>,
}

/// The attributes of a traffic signal.
#[derive(Clone, Copy, Debug)]
pub struct SignalAttributes {
    /// The region in which the signal acts on vehicles.
    pub region: OrientedBox,
    /// The initial state.
    pub state: SignalState,
    /// Toggles the signal between Red and Green every `period` seconds.
    pub auto_cycle: Option<f64>,
    /// Whether vehicles reaching the signal are given movement priority 1.
    pub boost_priority: bool,
}

/// The state of a traffic signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalState {
    #[default]
    Green,
    Orange,
    Red,
}

#[derive(Clone, Debug)]
struct AutoCycle {
    period: f64,
    countdown: Countdown,
}

impl SignalState {
    /// Parses a state name, falling back to Red for anything unrecognised.
    pub fn parse_or_red(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            warn!("{}; defaulting to Red", err);
            SignalState::Red
        })
    }
}

impl FromStr for SignalState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(SignalState::Green),
            "orange" | "amber" => Ok(SignalState::Orange),
            "red" => Ok(SignalState::Red),
            _ => Err(Error::UnknownSignalState(s.to_string())),
        }
    }
}

impl SignalAttributes {
    /// A green signal with no automatic cycle.
    pub fn new(region: OrientedBox) -> Self {
        Self {
            region,
            state: SignalState::Green,
            auto_cycle: None,
            boost_priority: false,
        }
    }
}

impl TrafficSignal {
    pub(crate) fn new(id: SignalId, attribs: &SignalAttributes) -> Self {
        let auto_cycle = attribs.auto_cycle.and_then(|period| {
            if period > 0.0 {
                Some(AutoCycle {
                    period,
                    countdown: Countdown::new(period),
                })
            } else {
                warn!("Ignoring non-positive cycle period {} for signal {:?}", period, id);
                None
            }
        });
        Self {
            id,
            region: attribs.region,
            state: attribs.state,
            boost_priority: attribs.boost_priority,
            auto_cycle,
        }
    }

    /// Gets the signal's ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// The region in which the signal acts on vehicles.
    pub fn region(&self) -> &OrientedBox {
        &self.region
    }

    /// The current state.
    pub fn state(&self) -> SignalState {
        self.state
    }

    /// Whether vehicles reaching the signal are given top movement priority.
    pub fn boosts_priority(&self) -> bool {
        self.boost_priority
    }

    /// Whether the signal runs its own Red/Green cycle.
    pub fn is_auto_cycling(&self) -> bool {
        self.auto_cycle.is_some()
    }

    /// Sets the state of the signal.
    ///
    /// Returns `true` if vehicles inside the effect region must be released.
    pub(crate) fn set_state(&mut self, state: SignalState) -> bool {
        if state != self.state {
            debug!("Signal {:?}: {:?} -> {:?}", self.id, self.state, state);
        }
        self.state = state;
        state == SignalState::Green
    }

    /// Advances the automatic cycle, returning the state to switch to once it elapses.
    pub(crate) fn step(&mut self, dt: f64) -> Option<SignalState> {
        let cycle = self.auto_cycle.as_mut()?;
        if !cycle.countdown.tick(dt) {
            return None;
        }
        cycle.countdown.arm(cycle.period);

        use SignalState::*;
        Some(match self.state {
            Red => Green,
            Green => Red,
            Orange => {
                warn!("Signal {:?} found in Orange while cycling; resetting to Red", self.id);
                Red
            }
        })
    }
}
