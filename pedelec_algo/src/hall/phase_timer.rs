// Times the high and low phases of a polled hall channel.
//
// Only one phase is timed at any moment; the enum below makes it impossible to time both.
// A completed phase duration is kept until the same phase completes again, so the pair
// (last high, last low) always describes the most recent full pass of each level.
// The phase in progress at power-up has an unknown start and is never reported.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::time::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Level seen since the first sample; its start time is unknown.
    Initial { high: bool },
    High { since: Timestamp },
    Low { since: Timestamp },
}

pub struct PhaseTimer {
    phase: Option<Phase>,               // None before the first sample
    last_high_ms: Option<u32>,          // Duration of the last completed high phase
    last_low_ms: Option<u32>,           // Duration of the last completed low phase
    last_transition: Option<Timestamp>, // Time of the last level change
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self {
            phase: None,
            last_high_ms: None,
            last_low_ms: None,
            last_transition: None,
        }
    }

    pub fn tick(&mut self, level: bool, now: Timestamp) {
        let next = match (self.phase, level) {
            (None, high) => Phase::Initial { high },
            (Some(Phase::Initial { high }), level) if high == level => return,
            (Some(Phase::Initial { .. }), true) => Phase::High { since: now },
            (Some(Phase::Initial { .. }), false) => Phase::Low { since: now },
            (Some(Phase::High { since }), false) => {
                self.last_high_ms = Some(now.elapsed_since(since));
                Phase::Low { since: now }
            }
            (Some(Phase::Low { since }), true) => {
                self.last_low_ms = Some(now.elapsed_since(since));
                Phase::High { since: now }
            }
            _ => return, // Level unchanged
        };

        if self.phase.is_some() {
            self.last_transition = Some(now);
        }
        self.phase = Some(next);
    }

    pub fn last_high_ms(&self) -> Option<u32> {
        self.last_high_ms
    }

    pub fn last_low_ms(&self) -> Option<u32> {
        self.last_low_ms
    }

    pub fn last_transition(&self) -> Option<Timestamp> {
        self.last_transition
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(timer: &mut PhaseTimer, samples: &[(u32, bool)]) {
        for &(t, level) in samples {
            timer.tick(level, Timestamp::from_millis(t));
        }
    }

    #[test]
    fn test_power_up_phase_is_not_reported() {
        let mut timer = PhaseTimer::new();
        feed(&mut timer, &[(0, false), (500, false), (1000, true)]);
        assert_eq!(timer.last_low_ms(), None);
        assert_eq!(timer.last_high_ms(), None);
        assert_eq!(timer.last_transition(), Some(Timestamp::from_millis(1000)));
    }

    #[test]
    fn test_completed_phases_are_captured() {
        let mut timer = PhaseTimer::new();
        feed(
            &mut timer,
            &[(0, false), (100, true), (140, true), (160, false), (300, true)],
        );
        assert_eq!(timer.last_high_ms(), Some(60));
        assert_eq!(timer.last_low_ms(), Some(140));
        assert_eq!(timer.last_transition(), Some(Timestamp::from_millis(300)));
    }

    #[test]
    fn test_steady_level_keeps_last_transition() {
        let mut timer = PhaseTimer::new();
        feed(&mut timer, &[(0, false), (10, true), (20, false)]);
        feed(&mut timer, &[(30, false), (9000, false)]);
        assert_eq!(timer.last_transition(), Some(Timestamp::from_millis(20)));
    }
}
