//! Module: config
//!
//! Purpose: Construction-time parameters for switches, encoders, input banks
//! and the optional tick monitor.
//!
//! Architecture:
//! - Plain `Copy` structs, passed by value at construction
//! - No process-wide mutable configuration; each control keeps its own copy
//! - Pin numbers are always supplied by the caller
//!
//! Safety: Safe. No unsafe blocks.

use crate::input::PinId;

/// Default control-loop rate (1 kHz).
pub const DEFAULT_UPDATE_RATE_HZ: f32 = 1000.0;

/// Default allowed tick interval deviation, percent of the nominal period.
pub const DEFAULT_TICK_TOLERANCE_PCT: u32 = 25;

/// Pin assignment and polarity of one switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchPins {
    pub pin: PinId,

    /// Raw level 1 means released (pull-up wiring).
    pub invert: bool,
}

impl SwitchPins {
    /// Active-low switch on `pin` (pull-up wiring, the common case).
    pub const fn active_low(pin: PinId) -> Self {
        Self { pin, invert: true }
    }

    /// Active-high switch on `pin`.
    pub const fn active_high(pin: PinId) -> Self {
        Self { pin, invert: false }
    }
}

/// Pin assignment of one quadrature encoder with push-button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderPins {
    pub a: PinId,
    pub b: PinId,
    pub click: PinId,
}

impl EncoderPins {
    pub const fn new(a: PinId, b: PinId, click: PinId) -> Self {
        Self { a, b, click }
    }
}

/// Switch configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchConfig {
    /// Rate at which `update` is called, in Hz.
    pub update_rate_hz: f32,

    /// Raw level 1 means released.
    pub invert: bool,

    /// Pin read by `Switch::debounce`.
    pub pin: PinId,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: DEFAULT_UPDATE_RATE_HZ,
            invert: true,
            pin: PinId(0),
        }
    }
}

impl SwitchConfig {
    pub fn new(update_rate_hz: f32, invert: bool, pin: PinId) -> Self {
        Self {
            update_rate_hz,
            invert,
            pin,
        }
    }

    /// Config for given pin assignment with default rate.
    pub fn with_pins(pins: SwitchPins) -> Self {
        Self {
            pin: pins.pin,
            invert: pins.invert,
            ..Default::default()
        }
    }

    /// Duration of one tick in milliseconds.
    #[inline]
    pub fn tick_period_ms(&self) -> f32 {
        1000.0 / self.update_rate_hz
    }
}

/// Encoder configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderConfig {
    pub update_rate_hz: f32,
    pub pins: EncoderPins,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: DEFAULT_UPDATE_RATE_HZ,
            pins: EncoderPins::new(PinId(0), PinId(1), PinId(2)),
        }
    }
}

impl EncoderConfig {
    pub fn new(update_rate_hz: f32, pins: EncoderPins) -> Self {
        Self {
            update_rate_hz,
            pins,
        }
    }

    /// Config of the push-button. Encoder buttons are wired active-low.
    pub fn button(&self) -> SwitchConfig {
        SwitchConfig::new(self.update_rate_hz, true, self.pins.click)
    }
}

/// Configuration of an input bank with `S` switches and `E` encoders.
///
/// Array position is the member's stable id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BankConfig<const S: usize, const E: usize> {
    /// Shared control-loop rate for every member.
    pub update_rate_hz: f32,
    pub switches: [SwitchPins; S],
    pub encoders: [EncoderPins; E],
}

impl<const S: usize, const E: usize> BankConfig<S, E> {
    pub fn new(update_rate_hz: f32, switches: [SwitchPins; S], encoders: [EncoderPins; E]) -> Self {
        Self {
            update_rate_hz,
            switches,
            encoders,
        }
    }

    pub fn switch_config(&self, index: usize) -> SwitchConfig {
        let pins = self.switches[index];
        SwitchConfig::new(self.update_rate_hz, pins.invert, pins.pin)
    }

    pub fn encoder_config(&self, index: usize) -> EncoderConfig {
        EncoderConfig::new(self.update_rate_hz, self.encoders[index])
    }
}

/// Tick monitor configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingConfig {
    /// Nominal control-loop rate in Hz.
    pub update_rate_hz: f32,

    /// Allowed deviation of a tick interval, percent of the nominal period.
    pub tolerance_pct: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: DEFAULT_UPDATE_RATE_HZ,
            tolerance_pct: DEFAULT_TICK_TOLERANCE_PCT,
        }
    }
}

impl TimingConfig {
    /// Create config for given rate with default tolerance.
    pub fn with_rate(update_rate_hz: f32) -> Self {
        Self {
            update_rate_hz,
            ..Default::default()
        }
    }

    /// Nominal tick period in microseconds.
    ///
    /// 1 kHz -> 1000 µs, 48 kHz / 48-sample blocks -> 1000 µs.
    #[inline]
    pub fn period_us(&self) -> i64 {
        (1_000_000.0 / self.update_rate_hz) as i64
    }

    /// Largest accepted |interval - period| in microseconds.
    #[inline]
    pub fn max_deviation_us(&self) -> i64 {
        self.period_us().saturating_mul(self.tolerance_pct as i64) / 100
    }
}
