//! Hardware seams used by the built-in roles.
//!
//! Board support implements these over real peripherals; tests and host
//! simulations implement them over plain cells.

/// 8-bit PWM output.
pub trait PwmChannel {
    /// Sets the duty cycle (`0` = off, `255` = full on).
    fn set_duty(&mut self, duty: u8);
}

/// Digital input.
pub trait DigitalPin {
    /// Current logic level.
    fn is_high(&mut self) -> bool;
}

/// On-board indicator LED.
pub trait StatusLed {
    /// Turns the LED on or off.
    fn set(&mut self, on: bool);
}

/// Analog input.
pub trait AnalogPin {
    /// One raw conversion.
    fn read(&mut self) -> u16;
}
