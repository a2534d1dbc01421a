//! Pins of the motor controller current command interface.
use super::PinDef;
use super::{PinMode, Port};

/// Enable pin of the motor controller, high while a current is commanded
pub const ENABLE: PinDef = PinDef {
    port: Port::A,
    pin: 4,
    mode: PinMode::Output,
};

/// Current command PWM output (TIM2 CH1)
pub const PWM_CURRENT: PinDef = PinDef {
    port: Port::A,
    pin: 0,
    mode: PinMode::Alt(1),
};
