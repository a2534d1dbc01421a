use hal::gpio::{Pin, PinMode, Port};

pub mod driver;
pub mod hall;
pub mod led;
pub mod throttle;

/// Represents the definition of a GPIO pin.
pub struct PinDef {
    /// The port to which the pin belongs (e.g., Port::A, Port::B).
    port: Port,
    /// The pin number within the port.
    pin: u8,
    /// The mode of the pin (e.g., Output, Input, Alternate function).
    mode: PinMode,
}

impl PinDef {
    pub const fn new(port: Port, pin: u8, mode: PinMode) -> PinDef {
        PinDef { port, pin, mode }
    }

    /// Converts the PinDef struct to a configured Pin.
    /// # Example
    /// ```ignore
    /// let mut enable = pinout::driver::ENABLE.init();
    /// enable.set_low();
    /// ```
    pub fn init(&self) -> Pin {
        Pin::new(self.port, self.pin, self.mode)
    }
}
