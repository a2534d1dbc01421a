use super::PinDef;
use super::{PinMode, Port};

/// Status LED, active low
pub const GRN: PinDef = PinDef {
    port: Port::B,
    pin: 14,
    mode: PinMode::Output,
};
