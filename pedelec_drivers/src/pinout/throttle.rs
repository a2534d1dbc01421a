use super::PinDef;
use super::{PinMode, Port};

/// ADC1 channel of the throttle input
pub const THROTTLE_CH: u8 = 3;

/// Throttle analog input (ADC1_IN3)
pub const THROTTLE: PinDef = PinDef {
    port: Port::A,
    pin: 2,
    mode: PinMode::Analog,
};
