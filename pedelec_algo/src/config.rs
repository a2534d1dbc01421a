// Tunables of the pedal assist loop, grouped in `AssistConfig`.
// Defaults reproduce the reference bike: 28 inch wheel, one magnet per wheel
// and crank revolution, 500 Hz loop.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::assist::AssistMode;

pub const TICK_PERIOD_MS: u32 = 2; // 500 Hz
pub const STALL_TIMEOUT_MS: u32 = 3000;
pub const NO_PEDALING_TIMEOUT_MS: u32 = 8000;
pub const PEDALING_WINDOW_MS: u32 = 15000;
pub const MAGNET_THRESHOLD: u16 = 1;
pub const MIN_SPEED_KMH: f32 = 6.0;
pub const RAMP_CURRENT_A: f32 = 4.0;
pub const RAMP_DURATION_MS: u32 = 1000;
pub const BASE_BOOST_A: f32 = 10.0;
pub const THROTTLE_ON_THRESHOLD: f32 = 0.01;
pub const THROTTLE_FULL_SCALE: u16 = 4095; // 12 bit ADC, right aligned
pub const WHEEL_DIAMETER_MM: f32 = 711.2; // 28 inch
pub const DIAGNOSTICS_PERIOD_MS: u32 = 500;

/// Complete configuration of the control loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssistConfig {
    /// Which current policy drives the motor in this deployment.
    pub mode: AssistMode,
    /// Period of the tick driver.
    pub tick_period_ms: u32,
    /// Wheel channel silent (and low) for longer than this means the wheel stopped.
    pub stall_timeout_ms: u32,
    /// No crank transition for longer than this ends an active pedaling state.
    pub no_pedaling_timeout_ms: u32,
    /// Window in which `magnet_threshold` crank edges must be seen.
    pub pedaling_window_ms: u32,
    /// Crank edges required inside the window.
    pub magnet_threshold: u16,
    /// Extra activation gate on vehicle speed, `None` disables it.
    pub min_speed_kmh: Option<f32>,
    pub ramp_current_a: f32,
    pub ramp_duration_ms: u32,
    /// Assist added on top of the throttle share once the ramp is over.
    pub base_boost_a: f32,
    /// Throttle above this commands current in throttle-direct mode.
    pub throttle_on_threshold: f32,
    pub throttle_full_scale: u16,
    pub wheel_diameter_mm: f32,
    /// Wheel magnets passing the sensor per revolution.
    pub wheel_magnets: u8,
    pub diagnostics_period_ms: u32,
}

impl AssistConfig {
    /// Reference setup with the policy mode chosen by the deployment.
    pub const fn with_mode(mode: AssistMode) -> Self {
        Self {
            mode,
            tick_period_ms: TICK_PERIOD_MS,
            stall_timeout_ms: STALL_TIMEOUT_MS,
            no_pedaling_timeout_ms: NO_PEDALING_TIMEOUT_MS,
            pedaling_window_ms: PEDALING_WINDOW_MS,
            magnet_threshold: MAGNET_THRESHOLD,
            min_speed_kmh: Some(MIN_SPEED_KMH),
            ramp_current_a: RAMP_CURRENT_A,
            ramp_duration_ms: RAMP_DURATION_MS,
            base_boost_a: BASE_BOOST_A,
            throttle_on_threshold: THROTTLE_ON_THRESHOLD,
            throttle_full_scale: THROTTLE_FULL_SCALE,
            wheel_diameter_mm: WHEEL_DIAMETER_MM,
            wheel_magnets: 1,
            diagnostics_period_ms: DIAGNOSTICS_PERIOD_MS,
        }
    }

    /// Wheel circumference in meters.
    pub fn wheel_circumference_m(&self) -> f32 {
        core::f32::consts::PI * self.wheel_diameter_mm / 1000.0
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self::with_mode(AssistMode::PedalGated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = AssistConfig::default();
        assert_eq!(config.mode, AssistMode::PedalGated);
        assert_eq!(config.tick_period_ms, 2);
        assert_eq!(config.magnet_threshold, 1);
        assert_eq!(config.min_speed_kmh, Some(6.0));
        // 28 inch wheel rolls a bit over 2.23 m per revolution
        let circumference = config.wheel_circumference_m();
        assert!(circumference > 2.23 && circumference < 2.24);
    }
}
