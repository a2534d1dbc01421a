// Implements the current command policy turning the pedaling classification and the throttle
// into a motor current setpoint or a motor release.
//
// Key Features:
// - One policy parameterized by the deployment mode (pedal gated or throttle direct)
// - Pedal gated: fixed ramp current right after pedaling starts, then throttle share + boost
// - Throttle direct: current proportional to the throttle, pedaling is ignored
// - Degenerate inputs (NaN throttle, non-finite limit) are clamped, never propagated
//
// Detailed Operation:
// In pedal gated mode the policy is a three state machine:
// Released (no pedaling, motor released) -> RampUp on the first pedaling tick, emitting the ramp
// current until more than the ramp duration has elapsed -> Full, emitting
// `max_current * throttle + base_boost`. Losing the pedaling flag returns to Released from any state.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::AssistConfig;
use crate::time::Timestamp;

/// Which input gates the motor current. Chosen once per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssistMode {
    /// Assist only while pedaling is detected: ramp current, then throttle share plus boost.
    PedalGated,
    /// Throttle alone commands the current; pedaling does not gate it.
    ThrottleDirect,
}

/// Command handed to the motor actuation sink every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurrentCommand {
    SetCurrent(f32), // Amps
    ReleaseMotor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssistPhase {
    Released,
    RampUp { since: Timestamp },
    Full,
}

pub struct CurrentCommandPolicy {
    mode: AssistMode,
    phase: AssistPhase,

    ramp_current_a: f32,
    ramp_duration_ms: u32,
    base_boost_a: f32,
    throttle_on_threshold: f32,
}

impl CurrentCommandPolicy {
    pub fn new(config: &AssistConfig) -> Self {
        Self {
            mode: config.mode,
            phase: AssistPhase::Released,
            ramp_current_a: config.ramp_current_a,
            ramp_duration_ms: config.ramp_duration_ms,
            base_boost_a: config.base_boost_a,
            throttle_on_threshold: config.throttle_on_threshold,
        }
    }

    /// Evaluate the command for this tick.
    ///
    /// # Arguments
    /// * `is_pedaling` - Output of the cadence classifier
    /// * `throttle` - Normalized throttle, clamped to 0.0..=1.0
    /// * `max_current` - Motor current limit in amps
    /// * `now` - Time of the tick
    pub fn evaluate(
        &mut self,
        is_pedaling: bool,
        throttle: f32,
        max_current: f32,
        now: Timestamp,
    ) -> CurrentCommand {
        let throttle = sanitize(throttle).min(1.0);
        let max_current = sanitize(max_current);

        match self.mode {
            AssistMode::PedalGated => self.pedal_gated(is_pedaling, throttle, max_current, now),
            AssistMode::ThrottleDirect => self.throttle_direct(throttle, max_current),
        }
    }

    pub fn mode(&self) -> AssistMode {
        self.mode
    }

    pub fn phase(&self) -> AssistPhase {
        self.phase
    }

    fn pedal_gated(
        &mut self,
        is_pedaling: bool,
        throttle: f32,
        max_current: f32,
        now: Timestamp,
    ) -> CurrentCommand {
        if !is_pedaling {
            if self.phase != AssistPhase::Released {
                info!("ASSIST: released");
            }
            self.phase = AssistPhase::Released;
            return CurrentCommand::ReleaseMotor;
        }

        if self.phase == AssistPhase::Released {
            info!("ASSIST: ramp up at {}A", self.ramp_current_a);
            self.phase = AssistPhase::RampUp { since: now };
        }

        if let AssistPhase::RampUp { since } = self.phase {
            if now.elapsed_since(since) <= self.ramp_duration_ms {
                return CurrentCommand::SetCurrent(self.ramp_current_a);
            }
            info!("ASSIST: full assist");
            self.phase = AssistPhase::Full;
        }

        CurrentCommand::SetCurrent(max_current * throttle + self.base_boost_a)
    }

    fn throttle_direct(&mut self, throttle: f32, max_current: f32) -> CurrentCommand {
        // A zero limit (including a sanitized non-finite one) releases instead of commanding 0 A
        if throttle > self.throttle_on_threshold && max_current > 0.0 {
            self.phase = AssistPhase::Full;
            CurrentCommand::SetCurrent(max_current * throttle)
        } else {
            self.phase = AssistPhase::Released;
            CurrentCommand::ReleaseMotor
        }
    }
}

/// Non-finite and negative values become 0.0.
#[inline(always)]
fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
