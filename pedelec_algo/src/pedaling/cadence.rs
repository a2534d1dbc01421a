// Implements the cadence classifier deciding whether the rider is pedaling.
//
// Key Features:
// - Counts debounced crank rising edges inside a rolling pedaling window
// - Activates only with enough edges, forward direction and (optionally) a minimum speed
// - Drops out immediately on reverse pedaling or when the crank stops moving
//
// Detailed Operation:
// Idle -> Accumulating on the first rising edge (window starts, count = 1).
// Accumulating counts further rising edges while the window is open; if the window closes
// before activation the count is cleared and the next edge opens a fresh window.
// Accumulating -> Active once count >= threshold, direction is forward and the speed gate passes.
// Active -> Idle when the direction turns reverse or no crank level change was seen for longer
// than the no-pedaling timeout; the count is cleared on that transition. The time of the last
// level change comes from the crank phase timer owned by the direction estimator.
// The classifier has no side effects; callers only read `is_pedaling()`.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use super::Direction;
use crate::config::AssistConfig;
use crate::hall::EdgeEvent;
use crate::time::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CadenceState {
    Idle,
    Accumulating { first_stroke: Timestamp },
    Active,
}

pub struct CadenceClassifier {
    state: CadenceState,
    pedal_count: u16,

    magnet_threshold: u16,
    pedaling_window_ms: u32,
    no_pedaling_timeout_ms: u32,
    min_speed_kmh: Option<f32>,
}

impl CadenceClassifier {
    pub fn new(config: &AssistConfig) -> Self {
        Self {
            state: CadenceState::Idle,
            pedal_count: 0,
            magnet_threshold: config.magnet_threshold,
            pedaling_window_ms: config.pedaling_window_ms,
            no_pedaling_timeout_ms: config.no_pedaling_timeout_ms,
            min_speed_kmh: config.min_speed_kmh,
        }
    }

    /// Update with this tick's crank edge and return the new pedaling flag.
    ///
    /// # Arguments
    /// * `crank_edge` - Edge reported by the crank detector on this tick
    /// * `direction` - Crank direction after this tick
    /// * `last_crank_transition` - Last crank level change, including this tick
    /// * `speed_kmh` - Vehicle speed after this tick
    /// * `now` - Time of the tick
    pub fn tick(
        &mut self,
        crank_edge: EdgeEvent,
        direction: Direction,
        last_crank_transition: Option<Timestamp>,
        speed_kmh: f32,
        now: Timestamp,
    ) -> bool {
        match self.state {
            CadenceState::Active => {
                if direction == Direction::Reverse {
                    info!("CADENCE: reverse pedaling, assist off");
                    self.reset();
                } else if crank_idle_ms(last_crank_transition, now) > self.no_pedaling_timeout_ms {
                    info!("CADENCE: crank stopped, assist off");
                    self.reset();
                }
            }
            CadenceState::Accumulating { first_stroke } => {
                if now.elapsed_since(first_stroke) > self.pedaling_window_ms {
                    debug!("CADENCE: window expired with {} edges", self.pedal_count);
                    self.reset();
                    self.start_window(crank_edge, now);
                } else if crank_edge.is_rising() {
                    self.pedal_count = self.pedal_count.saturating_add(1);
                }
            }
            CadenceState::Idle => self.start_window(crank_edge, now),
        }

        if let CadenceState::Accumulating { .. } = self.state {
            if self.pedal_count >= self.magnet_threshold
                && direction == Direction::Forward
                && self.speed_gate(speed_kmh)
            {
                info!("CADENCE: pedaling after {} edges", self.pedal_count);
                self.state = CadenceState::Active;
            }
        }

        self.is_pedaling()
    }

    pub fn is_pedaling(&self) -> bool {
        self.state == CadenceState::Active
    }

    pub fn state(&self) -> CadenceState {
        self.state
    }

    pub fn pedal_count(&self) -> u16 {
        self.pedal_count
    }

    fn start_window(&mut self, crank_edge: EdgeEvent, now: Timestamp) {
        if crank_edge.is_rising() {
            self.state = CadenceState::Accumulating { first_stroke: now };
            self.pedal_count = 1;
        }
    }

    fn reset(&mut self) {
        self.state = CadenceState::Idle;
        self.pedal_count = 0;
    }

    #[inline(always)]
    fn speed_gate(&self, speed_kmh: f32) -> bool {
        match self.min_speed_kmh {
            Some(min) => speed_kmh > min,
            None => true,
        }
    }
}

/// Time since the last crank level change; a crank that never moved counts as idle forever.
#[inline(always)]
fn crank_idle_ms(last_transition: Option<Timestamp>, now: Timestamp) -> u32 {
    last_transition
        .map(|t| now.elapsed_since(t))
        .unwrap_or(u32::MAX)
}
