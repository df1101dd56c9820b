//! A simple countdown driven by the simulation time step.

/// A countdown timer, decremented by the time step every frame.
///
/// Re-arming is instantaneous: the old target is forgotten.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Countdown {
    /// Seconds left until expiry. Zero or negative once expired.
    remaining: f64,
}

impl Countdown {
    /// Creates a countdown already armed with `duration` seconds.
    pub fn new(duration: f64) -> Self {
        Self {
            remaining: duration,
        }
    }

    /// Restarts the countdown with a new duration in seconds.
    pub fn arm(&mut self, duration: f64) {
        self.remaining = duration;
    }

    /// Advances the countdown by `dt` seconds.
    /// Returns `true` if the countdown has expired.
    ///
    /// An expired countdown stays expired, and keeps returning `true`,
    /// until it is re-armed.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
        self.is_expired()
    }

    /// Whether the countdown has run out.
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// The time left in seconds, never negative.
    pub fn remaining(&self) -> f64 {
        f64::max(self.remaining, 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::Countdown;

    #[test]
    fn expires_after_duration() {
        let mut timer = Countdown::new(1.0);
        assert!(!timer.tick(0.25));
        assert!(!timer.tick(0.25));
        assert!(!timer.tick(0.25));
        assert!(timer.tick(0.25));
    }

    #[test]
    fn stays_expired_until_rearmed() {
        let mut timer = Countdown::new(0.1);
        assert!(timer.tick(0.5));
        assert!(timer.tick(0.5));
        assert_eq!(timer.remaining(), 0.0);
        timer.arm(2.0);
        assert!(!timer.tick(0.5));
        assert_eq!(timer.remaining(), 1.5);
    }
}
