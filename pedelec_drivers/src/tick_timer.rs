// Periodic timer driving the control loop from its update interrupt.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    pac::TIM3,
    timer::{Timer, TimerConfig, TimerInterrupt},
};

pub struct TickTimer {
    tim: Timer<TIM3>,
}

impl TickTimer {
    /// Start TIM3 with the update interrupt at `period_ms`.
    pub fn new(tim3: TIM3, clock_cfg: &Clocks, period_ms: u32) -> Self {
        let freq = 1000.0 / period_ms.max(1) as f32;
        let mut timer = Timer::new_tim3(tim3, freq, TimerConfig::default(), clock_cfg);
        timer.enable_interrupt(TimerInterrupt::Update);
        timer.enable();
        TickTimer { tim: timer }
    }

    /// Clear the update interrupt flag, call first thing in the ISR.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.tim.clear_interrupt(TimerInterrupt::Update);
    }
}
