// Boundary services the control loop drives but does not implement.
// Implementations live in the drivers crate (hardware) and in tests (recording fakes).

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Motor actuation sink. Both calls are fire-and-forget and safe to repeat every tick.
pub trait MotorOutput {
    fn set_current(&mut self, amps: f32);
    fn release_motor(&mut self);
}

/// Read-only access to the motor configuration.
pub trait MotorLimits {
    /// Maximum motor current in amps.
    fn max_current_motor(&self) -> f32;
}

/// Watchdog that cuts motor power when it is not reset in time.
pub trait Watchdog {
    fn reset_timeout(&mut self);
}
