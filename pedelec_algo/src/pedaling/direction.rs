// Estimates crank rotation direction from the asymmetric magnet spacing of the crank ring.
//
// Going forward the sensor spends longer in the low region than in the high region, so the
// direction is the plain comparison of the last completed low and high phase durations.
// It is re-evaluated every tick from the most recent pair and is never reset between strokes.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::hall::PhaseTimer;
use crate::time::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Forward only when both phases were measured and the low phase is the longer one.
    pub fn from_phases(last_low_ms: Option<u32>, last_high_ms: Option<u32>) -> Self {
        match (last_low_ms, last_high_ms) {
            (Some(low), Some(high)) if low > high => Direction::Forward,
            _ => Direction::Reverse,
        }
    }
}

pub struct DirectionEstimator {
    timer: PhaseTimer,
    direction: Direction,
}

impl DirectionEstimator {
    pub fn new() -> Self {
        Self {
            timer: PhaseTimer::new(),
            direction: Direction::Reverse,
        }
    }

    pub fn tick(&mut self, crank_level: bool, now: Timestamp) -> Direction {
        self.timer.tick(crank_level, now);
        let direction = Direction::from_phases(self.timer.last_low_ms(), self.timer.last_high_ms());
        if direction != self.direction {
            debug!("CRANK: direction {}", direction);
        }
        self.direction = direction;
        direction
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Time of the last crank level change, if any.
    pub fn last_transition(&self) -> Option<Timestamp> {
        self.timer.last_transition()
    }
}

impl Default for DirectionEstimator {
    fn default() -> Self {
        Self::new()
    }
}
