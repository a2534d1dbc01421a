// Independent watchdog. Once started it cannot be stopped, and a missed reset
// restarts the MCU, which drops the motor enable line.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::iwdg;

use pedelec_algo::ports::Watchdog;

pub struct IndependentWatchdog {
    _private: (),
}

impl IndependentWatchdog {
    /// Start the IWDG with a timeout in seconds.
    pub fn start(timeout_s: f32) -> Self {
        iwdg::setup(timeout_s);
        IndependentWatchdog { _private: () }
    }
}

impl Watchdog for IndependentWatchdog {
    #[inline(always)]
    fn reset_timeout(&mut self) {
        iwdg::pet();
    }
}
