//! Raw pin access for the debounce core.
//!
//! The sampler never touches hardware directly. Everything it reads goes
//! through [`DigitalInputSource`], so the whole core runs on host with a
//! level table or closure standing in for GPIO.

use core::convert::Infallible;
use core::fmt;

/// Caller-resolved identifier of a physical input.
///
/// Opaque to the sampler: it is only handed back to the input source.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId(pub u8);

impl PinId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {}", self.0)
    }
}

/// Capability to read the raw level of a pin.
///
/// `true` means logic high, before any polarity inversion.
pub trait DigitalInputSource {
    type Error;

    fn read_level(&mut self, pin: PinId) -> Result<bool, Self::Error>;
}

impl<T: DigitalInputSource + ?Sized> DigitalInputSource for &mut T {
    type Error = T::Error;

    #[inline]
    fn read_level(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        (**self).read_level(pin)
    }
}

/// Failure to sample a control because its pin could not be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleError<E> {
    /// The input source reported an error for `pin`.
    InputRead { pin: PinId, source: E },
}

impl<E> SampleError<E> {
    /// Pin whose read failed.
    pub fn pin(&self) -> PinId {
        match self {
            SampleError::InputRead { pin, .. } => *pin,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for SampleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::InputRead { pin, source } => {
                write!(f, "failed to read {}: {:?}", pin, source)
            }
        }
    }
}

/// Read one pin, tagging failures with the pin id.
#[inline]
pub(crate) fn read_pin<I: DigitalInputSource>(
    input: &mut I,
    pin: PinId,
) -> Result<bool, SampleError<I::Error>> {
    input
        .read_level(pin)
        .map_err(|source| SampleError::InputRead { pin, source })
}

/// Requested pin is outside the source's table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownPin(pub PinId);

impl fmt::Display for UnknownPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}", self.0)
    }
}

/// Table of raw levels indexed by `PinId`.
///
/// Filled by whoever owns the hardware (an ISR, a port-register snapshot, a
/// test) and read by the bank once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinLevels<const N: usize> {
    levels: [bool; N],
}

impl<const N: usize> PinLevels<N> {
    /// All pins low.
    pub const fn new() -> Self {
        Self { levels: [false; N] }
    }

    /// All pins at `level`.
    pub const fn filled(level: bool) -> Self {
        Self { levels: [level; N] }
    }

    /// Set the level of `pin`. Pins outside the table are ignored.
    #[inline]
    pub fn set(&mut self, pin: PinId, level: bool) {
        if let Some(slot) = self.levels.get_mut(pin.index()) {
            *slot = level;
        }
    }

    #[inline]
    pub fn get(&self, pin: PinId) -> Option<bool> {
        self.levels.get(pin.index()).copied()
    }

    /// Load levels from a port register bitmask (bit n = pin n).
    pub fn load_bits(&mut self, bits: u32) {
        for (i, level) in self.levels.iter_mut().enumerate().take(32) {
            *level = (bits >> i) & 1 != 0;
        }
    }
}

impl<const N: usize> Default for PinLevels<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DigitalInputSource for PinLevels<N> {
    type Error = UnknownPin;

    #[inline]
    fn read_level(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        self.get(pin).ok_or(UnknownPin(pin))
    }
}

/// Input source backed by a closure, e.g. a register read.
pub struct FnInput<F>(F);

/// Wrap `f` as an infallible input source.
pub fn from_fn<F: FnMut(PinId) -> bool>(f: F) -> FnInput<F> {
    FnInput(f)
}

impl<F: FnMut(PinId) -> bool> DigitalInputSource for FnInput<F> {
    type Error = Infallible;

    #[inline]
    fn read_level(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        Ok((self.0)(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_levels_set_get() {
        let mut levels = PinLevels::<4>::new();
        assert_eq!(levels.read_level(PinId(2)), Ok(false));

        levels.set(PinId(2), true);
        assert_eq!(levels.read_level(PinId(2)), Ok(true));
        assert_eq!(levels.get(PinId(1)), Some(false));
    }

    #[test]
    fn test_pin_levels_unknown_pin() {
        let mut levels = PinLevels::<4>::filled(true);
        levels.set(PinId(9), false); // ignored
        assert_eq!(levels.read_level(PinId(9)), Err(UnknownPin(PinId(9))));
    }

    #[test]
    fn test_pin_levels_load_bits() {
        let mut levels = PinLevels::<8>::new();
        levels.load_bits(0b1000_0101);
        assert_eq!(levels.get(PinId(0)), Some(true));
        assert_eq!(levels.get(PinId(1)), Some(false));
        assert_eq!(levels.get(PinId(2)), Some(true));
        assert_eq!(levels.get(PinId(7)), Some(true));
    }

    #[test]
    fn test_fn_input() {
        let mut input = from_fn(|pin| pin.0 % 2 == 1);
        assert_eq!(input.read_level(PinId(3)), Ok(true));
        assert_eq!(input.read_level(PinId(4)), Ok(false));
    }

    #[test]
    fn test_read_pin_tags_error() {
        let mut levels = PinLevels::<2>::new();
        let err = read_pin(&mut levels, PinId(5)).unwrap_err();
        assert_eq!(err.pin(), PinId(5));
        assert_eq!(
            err,
            SampleError::InputRead {
                pin: PinId(5),
                source: UnknownPin(PinId(5))
            }
        );
    }

    #[test]
    fn test_error_display() {
        let err = SampleError::InputRead {
            pin: PinId(3),
            source: UnknownPin(PinId(3)),
        };
        let text = format!("{}", err);
        assert_eq!(text, "failed to read pin 3: UnknownPin(PinId(3))");
    }
}
