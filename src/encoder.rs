//! Quadrature rotary encoder with push-button.
//!
//! Pure logic, no hardware dependencies. Both channels are shifted into
//! their own 8-bit history every tick; only the low nibble is inspected.
//!
//! # Decoding
//!
//! A detent is reported when one channel has just fallen after three high
//! samples while the other has been low for the last three:
//!
//! ```text
//! a & 0x0f == 0b1110 && b & 0x07 == 0b000  ->  +1
//! b & 0x0f == 0b1110 && a & 0x07 == 0b000  ->  -1
//! otherwise                                ->   0
//! ```
//!
//! Matching a single quarter-cycle phase gives one count per detent on
//! typical mechanical encoders, regardless of channel timing skew.

use crate::config::{EncoderConfig, EncoderPins};
use crate::input::{read_pin, DigitalInputSource, PinId, SampleError};
use crate::sample::{ControlSample, EncoderLevels};
use crate::switch::Switch;

/// Channel history before any sample arrives (both lines idle high).
const CHANNEL_IDLE: u8 = 0xff;

/// Low nibble of a channel that just fell after three high samples.
const JUST_FELL: u8 = 0b1110;

/// Rotary encoder processor.
///
/// # Example
///
/// ```
/// use daisy_controls::config::{EncoderConfig, EncoderPins};
/// use daisy_controls::encoder::Encoder;
/// use daisy_controls::input::PinId;
///
/// let pins = EncoderPins::new(PinId(0), PinId(1), PinId(2));
/// let mut enc = Encoder::new(EncoderConfig::new(1000.0, pins));
///
/// // B falls first and stays low, then A falls: one clockwise detent
/// enc.update(true, false, true);
/// enc.update(true, false, true);
/// enc.update(true, false, true);
/// enc.update(false, false, true);
/// assert_eq!(enc.increment(), 1);
///
/// enc.update(false, false, true);
/// assert_eq!(enc.increment(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Encoder {
    config: EncoderConfig,
    button: Switch,

    // Channel histories, newest sample in bit 0
    a: u8,
    b: u8,

    inc: i8,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            button: Switch::new(config.button()),
            a: CHANNEL_IDLE,
            b: CHANNEL_IDLE,
            inc: 0,
        }
    }

    /// Create an encoder from loose parameters.
    pub fn init(update_rate_hz: f32, pin_a: PinId, pin_b: PinId, pin_click: PinId) -> Self {
        Self::new(EncoderConfig::new(
            update_rate_hz,
            EncoderPins::new(pin_a, pin_b, pin_click),
        ))
    }

    /// Return to the freshly-initialized baseline.
    pub fn reset(&mut self) {
        self.button.reset();
        self.a = CHANNEL_IDLE;
        self.b = CHANNEL_IDLE;
        self.inc = 0;
    }

    /// Get configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Advance one tick with raw pin levels.
    ///
    /// Channels are used as read; only the button is inverted.
    #[inline]
    pub fn update(&mut self, raw_a: bool, raw_b: bool, raw_click: bool) {
        self.button.update(raw_click);

        self.a = (self.a << 1) | raw_a as u8;
        self.b = (self.b << 1) | raw_b as u8;

        self.inc = if (self.a & 0x0f) == JUST_FELL && (self.b & 0x07) == 0 {
            1
        } else if (self.b & 0x0f) == JUST_FELL && (self.a & 0x07) == 0 {
            -1
        } else {
            0
        };
    }

    /// Advance one tick from a level triple.
    #[inline]
    pub fn update_levels(&mut self, levels: EncoderLevels) {
        self.update(levels.a, levels.b, levels.click);
    }

    /// Read the three pins from `input` and advance one tick.
    ///
    /// All pins are read before anything is updated; on failure the encoder
    /// is left untouched.
    pub fn debounce<I: DigitalInputSource>(
        &mut self,
        input: &mut I,
    ) -> Result<(), SampleError<I::Error>> {
        let levels = self.read_levels(input)?;
        self.update_levels(levels);
        Ok(())
    }

    /// Read this encoder's pins without advancing.
    pub fn read_levels<I: DigitalInputSource>(
        &self,
        input: &mut I,
    ) -> Result<EncoderLevels, SampleError<I::Error>> {
        let pins = self.config.pins;
        Ok(EncoderLevels {
            a: read_pin(input, pins.a)?,
            b: read_pin(input, pins.b)?,
            click: read_pin(input, pins.click)?,
        })
    }

    /// Rotation detected this tick: +1, -1 or 0. Not cumulative.
    #[inline]
    pub fn increment(&self) -> i32 {
        self.inc as i32
    }

    #[inline]
    pub fn rising_edge(&self) -> bool {
        self.button.rising_edge()
    }

    #[inline]
    pub fn falling_edge(&self) -> bool {
        self.button.falling_edge()
    }

    #[inline]
    pub fn pressed(&self) -> bool {
        self.button.pressed()
    }

    #[inline]
    pub fn held_time_ms(&self) -> f32 {
        self.button.held_time_ms()
    }

    /// The push-button.
    pub fn button(&self) -> &Switch {
        &self.button
    }

    /// Raw channel histories `(a, b)`.
    pub fn channel_history(&self) -> (u8, u8) {
        (self.a, self.b)
    }

    /// Snapshot of this tick's outputs (button flags plus rotation).
    pub fn sample(&self) -> ControlSample {
        ControlSample {
            increment: self.inc,
            ..self.button.sample()
        }
    }
}
