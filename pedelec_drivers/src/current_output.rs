// Motor current command output.
//
// The motor controller takes its current setpoint as a PWM duty on TIM2 CH1,
// scaled so that full duty equals `full_scale_a`, plus an enable line.
// Releasing the motor drops the duty to zero and pulls enable low, letting the motor freewheel.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    gpio::Pin,
    pac::TIM2,
    timer::{
        Alignment, CaptureCompareDma, CountDir, OutputCompare, TimChannel, Timer, TimerConfig,
        UpdateReqSrc,
    },
};

use pedelec_algo::ports::MotorOutput;

use super::pinout;

pub struct CurrentOutput {
    tim: Timer<TIM2>,
    enable: Pin,
    full_scale_a: f32,
}

impl CurrentOutput {
    pub fn new(tim2: TIM2, clock_cfg: &Clocks, freq: u16, full_scale_a: f32) -> Self {
        let timer = Timer::new_tim2(
            tim2,
            freq as f32,
            TimerConfig {
                one_pulse_mode: false,
                update_request_source: UpdateReqSrc::Any,
                auto_reload_preload: true,
                alignment: Alignment::Edge,
                capture_compare_dma: CaptureCompareDma::Update,
                direction: CountDir::Up,
            },
            clock_cfg,
        );

        let mut enable = pinout::driver::ENABLE.init();
        enable.set_low();

        CurrentOutput {
            tim: timer,
            enable,
            full_scale_a,
        }
    }

    /// Start the PWM with zero duty and the motor released.
    pub fn begin(&mut self) {
        self.tim
            .enable_pwm_output(TimChannel::C1, OutputCompare::Pwm1, 0.0);
        pinout::driver::PWM_CURRENT.init();
        self.tim.enable();
    }

    fn amps2duty(amps: f32, full_scale_a: f32, period: u32) -> u32 {
        if amps.is_nan() || amps <= 0.0 || full_scale_a <= 0.0 {
            return 0;
        }
        let ratio = amps / full_scale_a;
        if ratio >= 1.0 {
            period
        } else {
            (ratio * period as f32) as u32
        }
    }
}

impl MotorOutput for CurrentOutput {
    fn set_current(&mut self, amps: f32) {
        let period = self.tim.get_max_duty();
        self.tim.set_duty(
            TimChannel::C1,
            Self::amps2duty(amps, self.full_scale_a, period),
        );
        self.enable.set_high();
    }

    fn release_motor(&mut self) {
        self.tim.set_duty(TimChannel::C1, 0);
        self.enable.set_low();
    }
}
