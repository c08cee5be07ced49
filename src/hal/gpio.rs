//! GPIO adapter: any `embedded-hal` input pins as a [`DigitalInputSource`].
//!
//! `PinId(n)` addresses the n-th pin of the array, so the ids used in bank
//! configuration are logical slots, not chip GPIO numbers.

use core::fmt;

use embedded_hal::digital::{Error as _, InputPin};

use crate::input::{DigitalInputSource, PinId};

/// GPIO read failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpioError<E> {
    /// No pin in slot `PinId`.
    UnknownPin(PinId),
    /// The pin driver failed.
    Pin(E),
}

impl<E: embedded_hal::digital::Error> fmt::Display for GpioError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::UnknownPin(pin) => write!(f, "no gpio in slot {}", pin.0),
            GpioError::Pin(e) => write!(f, "gpio read failed: {:?}", e.kind()),
        }
    }
}

/// Fixed array of input pins addressed by slot.
pub struct InputPins<P, const N: usize> {
    pins: [P; N],
}

impl<P: InputPin, const N: usize> InputPins<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    /// Give the pins back.
    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P: InputPin, const N: usize> DigitalInputSource for InputPins<P, N> {
    type Error = GpioError<P::Error>;

    #[inline]
    fn read_level(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        self.pins
            .get_mut(pin.index())
            .ok_or(GpioError::UnknownPin(pin))?
            .is_high()
            .map_err(GpioError::Pin)
    }
}
