// Per-tick snapshot of the loop state and the rate limiter for the diagnostics log.
// The loop is the only writer of its state; observers receive `Snapshot` copies.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::assist::{AssistPhase, CurrentCommand};
use crate::pedaling::{CadenceState, Direction};
use crate::time::Timestamp;

/// Immutable copy of the loop state published after every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub timestamp: Timestamp,
    pub is_pedaling: bool,
    pub direction: Direction,
    pub cadence: CadenceState,
    pub pedal_count: u16,
    pub wheel_rpm: f32,
    pub velocity_kmh: f32,
    pub throttle: f32,
    pub phase: AssistPhase,
    pub command: CurrentCommand,
}

/// Lets one event through per period.
pub struct RateLimiter {
    period_ms: u32,
    last: Option<Timestamp>,
}

impl RateLimiter {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last: None,
        }
    }

    /// True on the first call and then whenever a full period elapsed since the last `true`.
    pub fn ready(&mut self, now: Timestamp) -> bool {
        let due = match self.last {
            Some(last) => now.elapsed_since(last) >= self.period_ms,
            None => true,
        };
        if due {
            self.last = Some(now);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_period() {
        let mut limiter = RateLimiter::new(500);
        let fired: Vec<u32> = (0..1000u32)
            .map(|i| i * 2)
            .filter(|&t| limiter.ready(Timestamp::from_millis(t)))
            .collect();
        assert_eq!(fired, [0, 500, 1000, 1500]);
    }
}
