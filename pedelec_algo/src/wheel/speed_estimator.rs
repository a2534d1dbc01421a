// SpeedEstimator derives wheel rpm and vehicle speed from the interval between wheel edges.
//
// The rate is only recomputed on a rising edge, so a stopped wheel would keep its last speed
// forever. To cover that, the speed is forced to zero while the wheel edge detector reports
// the channel as stalled (low and silent for longer than the stall timeout).
// Edge timing lives in the detector; this estimator only turns it into a rate.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::AssistConfig;
use crate::hall::EdgeEvent;
use crate::time::Timestamp;

/// Shortest edge interval used as denominator (one loop tick).
pub const MIN_EDGE_INTERVAL_MS: u32 = 2;

pub struct SpeedEstimator {
    circumference_m: f32, // Distance rolled per wheel revolution
    magnets: f32,         // Edges per wheel revolution
    rpm: f32,
    velocity_kmh: f32,
}

impl SpeedEstimator {
    pub fn new(config: &AssistConfig) -> Self {
        Self {
            circumference_m: config.wheel_circumference_m(),
            magnets: config.wheel_magnets.max(1) as f32,
            rpm: 0.0,
            velocity_kmh: 0.0,
        }
    }

    /// Update with this tick's wheel edge and return the velocity in km/h.
    ///
    /// # Arguments
    /// * `wheel_edge` - Edge reported by the wheel detector on this tick
    /// * `previous_edge` - Rising edge time known to the detector before this tick
    /// * `stalled` - Detector stall query for this tick
    /// * `now` - Time of the tick
    pub fn tick(
        &mut self,
        wheel_edge: EdgeEvent,
        previous_edge: Option<Timestamp>,
        stalled: bool,
        now: Timestamp,
    ) -> f32 {
        // The first edge after boot has no predecessor and yields no rate
        if let (EdgeEvent::Rising, Some(previous)) = (wheel_edge, previous_edge) {
            let interval_ms = now.elapsed_since(previous).max(MIN_EDGE_INTERVAL_MS);
            // f32 keeps a long parked interval times many magnets from overflowing
            self.rpm = 60_000.0 / (interval_ms as f32 * self.magnets);
            self.velocity_kmh = self.circumference_m * self.rpm * 60.0 / 1000.0;
        }

        if stalled && self.rpm != 0.0 {
            debug!("WHEEL: stalled, speed forced to 0");
            self.rpm = 0.0;
            self.velocity_kmh = 0.0;
        }

        self.velocity_kmh
    }

    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    pub fn velocity_kmh(&self) -> f32 {
        self.velocity_kmh
    }
}
