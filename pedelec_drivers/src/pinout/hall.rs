//! Hall sensor inputs. Both sensors are open-collector and read high with a magnet present.
use super::PinDef;
use super::{PinMode, Port};

/// Wheel hall sensor
pub const WHEEL: PinDef = PinDef {
    port: Port::B,
    pin: 6,
    mode: PinMode::Input,
};

/// Crank hall sensor
pub const CRANK: PinDef = PinDef {
    port: Port::B,
    pin: 7,
    mode: PinMode::Input,
};
