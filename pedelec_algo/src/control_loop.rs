// Implements one iteration of the pedal assist loop against its boundary services.
//
// Key Features:
// - Reads the time from the injected clock and the motor limit from the configuration port
// - Runs the controller and forwards its command to the motor sink
// - Resets the watchdog on every tick, after the motor command, with no early exit
//
// Detailed Operation:
// The periodic tick driver (a timer interrupt on target, a plain loop in tests) samples the
// sensors into `DataInputs` and calls `tick`. Nothing here blocks or sleeps, so the loop can
// be driven with zero wall-clock delay from a synthetic clock.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::assist::CurrentCommand;
use crate::config::AssistConfig;
use crate::diagnostics::Snapshot;
use crate::inputs_dump::DataInputs;
use crate::ports::{MotorLimits, MotorOutput, Watchdog};
use crate::time::Clock;
use crate::PedelecController;

pub struct ControlLoop<C, L, M, W> {
    controller: PedelecController,
    clock: C,
    limits: L,
    motor: M,
    watchdog: W,
}

impl<C, L, M, W> ControlLoop<C, L, M, W>
where
    C: Clock,
    L: MotorLimits,
    M: MotorOutput,
    W: Watchdog,
{
    pub fn new(config: &AssistConfig, clock: C, limits: L, motor: M, watchdog: W) -> Self {
        Self {
            controller: PedelecController::new(config),
            clock,
            limits,
            motor,
            watchdog,
        }
    }

    /// Run one loop iteration with the inputs sampled for this tick.
    pub fn tick(&mut self, inputs: DataInputs) -> Snapshot {
        let now = self.clock.now();
        let max_current = self.limits.max_current_motor();
        let snapshot = self.controller.tick(now, inputs, max_current);

        match snapshot.command {
            CurrentCommand::SetCurrent(amps) => self.motor.set_current(amps),
            CurrentCommand::ReleaseMotor => self.motor.release_motor(),
        }

        self.watchdog.reset_timeout();
        snapshot
    }

    pub fn controller(&self) -> &PedelecController {
        &self.controller
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
