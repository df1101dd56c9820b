use crate::signal::SignalState;
use crate::timer::Countdown;
use crate::{ControllerId, GroupSet, SignalGroupId, SignalId};
use log::{debug, warn};
use smallvec::{smallvec, SmallVec};

/// The green duration used when a controller's group cannot be found.
const FALLBACK_STATE_CHANGE_TIME: f64 = 5.0;

/// A set of traffic signals that are always driven to the same state.
#[derive(Clone, Debug)]
pub struct SignalGroup {
    /// The group ID.
    id: SignalGroupId,
    /// A human readable name.
    name: String,
    /// The member signals.
    signals: SmallVec<[SignalId; 4]>,
    /// How long the group stays green when driven by a controller, in s.
    state_change_time: f64,
    /// The state applied when the group is created.
    default_state: SignalState,
    /// The state last applied to the group.
    state: SignalState,
}

/// The attributes of a signal group.
#[derive(Clone, Copy, Debug)]
pub struct SignalGroupAttributes<'a> {
    /// A human readable name.
    pub name: &'a str,
    /// The member signals.
    pub signals: &'a [SignalId],
    /// How long the group stays green when driven by a controller, in s.
    pub state_change_time: f64,
    /// The state applied when the group is created.
    pub default_state: SignalState,
}

impl<'a> SignalGroupAttributes<'a> {
    pub fn new(name: &'a str, signals: &'a [SignalId]) -> Self {
        Self {
            name,
            signals,
            state_change_time: 5.0,
            default_state: SignalState::Red,
        }
    }
}

impl SignalGroup {
    pub(crate) fn new(id: SignalGroupId, attribs: &SignalGroupAttributes) -> Self {
        Self {
            id,
            name: attribs.name.to_string(),
            signals: attribs.signals.iter().copied().collect(),
            state_change_time: attribs.state_change_time,
            default_state: attribs.default_state,
            state: attribs.default_state,
        }
    }

    pub fn id(&self) -> SignalGroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member signals.
    pub fn signals(&self) -> &[SignalId] {
        &self.signals
    }

    /// How long the group stays green when driven by a controller, in s.
    pub fn state_change_time(&self) -> f64 {
        self.state_change_time
    }

    pub fn default_state(&self) -> SignalState {
        self.default_state
    }

    /// The state last applied to the group.
    pub fn state(&self) -> SignalState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SignalState) {
        self.state = state;
    }
}

/// Where a [SignalGroupController] is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The group at this index is green.
    Active(usize),
    /// Every group is red after the group at this index was stopped.
    Clearing(usize),
}

/// The group state changes a controller asks the simulation to apply, in order.
pub type GroupCommands = SmallVec<[(SignalGroupId, SignalState); 4]>;

/// Cycles an ordered list of signal groups so that exactly one is green at a time,
/// with an optional all-red clearance period between groups.
#[derive(Clone, Debug)]
pub struct SignalGroupController {
    /// The controller ID.
    id: ControllerId,
    /// The groups in cycling order.
    groups: Vec<SignalGroupId>,
    /// The all-red delay between groups, in s.
    clearance: f64,
    /// The current phase.
    phase: Phase,
    /// Counts down the current phase.
    countdown: Countdown,
    /// Whether the initial states have been applied.
    started: bool,
}

impl SignalGroupController {
    pub(crate) fn new(id: ControllerId, groups: Vec<SignalGroupId>, clearance: f64) -> Self {
        Self {
            id,
            groups,
            clearance: clearance.max(0.0),
            phase: Phase::Active(0),
            countdown: Countdown::default(),
            started: false,
        }
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// The groups in cycling order.
    pub fn groups(&self) -> &[SignalGroupId] {
        &self.groups
    }

    /// The all-red delay between groups, in s.
    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The group which is currently green, if any.
    pub fn current_group(&self) -> Option<SignalGroupId> {
        match self.phase {
            Phase::Active(idx) => self.groups.get(idx).copied(),
            Phase::Clearing(_) => None,
        }
    }

    /// The time left in the current phase, in s.
    pub fn time_remaining(&self) -> f64 {
        self.countdown.remaining()
    }

    /// Sets the first group green and every other group red.
    pub(crate) fn start(&mut self, groups: &GroupSet) -> GroupCommands {
        self.started = true;
        let Some(first) = self.groups.first().copied() else {
            warn!("Signal controller {:?} has no groups", self.id);
            return GroupCommands::new();
        };
        self.phase = Phase::Active(0);
        self.countdown.arm(self.green_time(first, groups));

        let mut commands: GroupCommands = smallvec![(first, SignalState::Green)];
        commands.extend(
            self.groups[1..]
                .iter()
                .map(|group| (*group, SignalState::Red)),
        );
        commands
    }

    /// Advances the controller's timer.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    /// * `groups` - The signal groups, used to look up green durations
    pub(crate) fn step(&mut self, dt: f64, groups: &GroupSet) -> GroupCommands {
        if !self.started {
            return self.start(groups);
        }
        if self.groups.is_empty() || !self.countdown.tick(dt) {
            return GroupCommands::new();
        }

        match self.phase {
            Phase::Active(idx) if self.clearance > 0.0 => {
                debug!("Signal controller {:?} clearing after group {}", self.id, idx);
                self.phase = Phase::Clearing(idx);
                self.countdown.arm(self.clearance);
                smallvec![(self.groups[idx], SignalState::Red)]
            }
            _ => self.advance(groups),
        }
    }

    /// Stops the current group and starts the next one without waiting for the timer.
    pub(crate) fn next_group(&mut self, groups: &GroupSet) -> GroupCommands {
        if !self.started {
            return self.start(groups);
        }
        if self.groups.is_empty() {
            return GroupCommands::new();
        }
        self.advance(groups)
    }

    /// Moves to the next group; the current group goes red if it is still green.
    fn advance(&mut self, groups: &GroupSet) -> GroupCommands {
        let mut commands = GroupCommands::new();
        let idx = match self.phase {
            Phase::Active(idx) => {
                commands.push((self.groups[idx], SignalState::Red));
                idx
            }
            Phase::Clearing(idx) => idx,
        };

        let next = (idx + 1) % self.groups.len();
        let group = self.groups[next];
        debug!("Signal controller {:?} switching to group {}", self.id, next);
        commands.push((group, SignalState::Green));
        self.phase = Phase::Active(next);
        self.countdown.arm(self.green_time(group, groups));
        commands
    }

    fn green_time(&self, group: SignalGroupId, groups: &GroupSet) -> f64 {
        match groups.get(group) {
            Some(group) => group.state_change_time(),
            None => {
                warn!(
                    "Signal controller {:?} references missing group {:?}",
                    self.id, group
                );
                FALLBACK_STATE_CHANGE_TIME
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::{KeyData, SlotMap};

    fn setup(clearance: f64) -> (GroupSet, SignalGroupController) {
        let mut groups = GroupSet::with_key();
        let ids = (0..3)
            .map(|_| {
                let attribs = SignalGroupAttributes {
                    state_change_time: 10.0,
                    ..SignalGroupAttributes::new("group", &[])
                };
                groups.insert_with_key(|id| SignalGroup::new(id, &attribs))
            })
            .collect();
        let id = ControllerId::from(KeyData::from_ffi(1));
        (groups, SignalGroupController::new(id, ids, clearance))
    }

    #[test]
    fn starts_with_first_group_green() {
        let (groups, mut controller) = setup(0.0);
        let ids = controller.groups().to_vec();
        let commands = controller.start(&groups);
        assert_eq!(
            commands.as_slice(),
            &[
                (ids[0], SignalState::Green),
                (ids[1], SignalState::Red),
                (ids[2], SignalState::Red)
            ]
        );
        assert_eq!(controller.current_group(), Some(ids[0]));
    }

    #[test]
    fn switches_back_to_back_without_clearance() {
        let (groups, mut controller) = setup(0.0);
        let ids = controller.groups().to_vec();
        controller.start(&groups);

        assert!(controller.step(9.0, &groups).is_empty());
        let commands = controller.step(1.0, &groups);
        assert_eq!(
            commands.as_slice(),
            &[(ids[0], SignalState::Red), (ids[1], SignalState::Green)]
        );
        assert_eq!(controller.phase(), Phase::Active(1));
    }

    #[test]
    fn clears_between_groups() {
        let (groups, mut controller) = setup(2.0);
        let ids = controller.groups().to_vec();
        controller.start(&groups);

        let commands = controller.step(10.0, &groups);
        assert_eq!(commands.as_slice(), &[(ids[0], SignalState::Red)]);
        assert_eq!(controller.phase(), Phase::Clearing(0));
        assert_eq!(controller.current_group(), None);

        assert!(controller.step(1.0, &groups).is_empty());
        let commands = controller.step(1.0, &groups);
        assert_eq!(commands.as_slice(), &[(ids[1], SignalState::Green)]);
        assert_eq!(controller.phase(), Phase::Active(1));
    }

    #[test]
    fn manual_advance_wraps() {
        let (groups, mut controller) = setup(3.0);
        let ids = controller.groups().to_vec();
        controller.start(&groups);
        controller.next_group(&groups);
        controller.next_group(&groups);
        let commands = controller.next_group(&groups);
        assert_eq!(
            commands.as_slice(),
            &[(ids[2], SignalState::Red), (ids[0], SignalState::Green)]
        );
        assert_eq!(controller.time_remaining(), 10.0);
    }

    #[test]
    fn missing_group_uses_fallback_time() {
        let (_, mut controller) = setup(0.0);
        let empty = SlotMap::with_key();
        controller.start(&empty);
        assert_eq!(controller.time_remaining(), FALLBACK_STATE_CHANGE_TIME);
    }
}
