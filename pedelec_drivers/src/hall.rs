// Wheel and crank hall sensor inputs, sampled by level once per control tick.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::gpio::{Pin, Pull};

use super::pinout;

pub struct HallSensors {
    wheel: Pin,
    crank: Pin,
}

impl HallSensors {
    /// Configure both inputs with pull-downs so a disconnected sensor reads as no magnet.
    pub fn new() -> Self {
        let mut wheel = pinout::hall::WHEEL.init();
        wheel.pull(Pull::Dn);

        let mut crank = pinout::hall::CRANK.init();
        crank.pull(Pull::Dn);

        HallSensors { wheel, crank }
    }

    /// Returns (wheel, crank) levels, true = magnet present.
    #[inline(always)]
    pub fn sample(&self) -> (bool, bool) {
        (self.wheel.is_high(), self.crank.is_high())
    }
}

impl Default for HallSensors {
    fn default() -> Self {
        Self::new()
    }
}
