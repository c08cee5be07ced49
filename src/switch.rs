//! Debounced switch.
//!
//! Pure logic, no hardware dependencies. One bit per control tick is shifted
//! into an 8-bit history; the line only counts as pressed or released once
//! the whole window agrees. Contact bounce shorter than 7 ticks never
//! produces an edge.
//!
//! # Timing contract
//!
//! [`Switch::update`] must be called exactly once per control tick, at the
//! rate given in [`SwitchConfig`]. Skipped or duplicated ticks are not
//! detected here and silently distort edges and held time. See
//! [`TickMonitor`](crate::timing::TickMonitor) for optional instrumentation.
//!
//! ```text
//! history (newest bit right)   meaning
//! 0111_1111                    rising edge (just pressed)
//! 1111_1111                    pressed (steady)
//! 1000_0000                    falling edge (just released)
//! anything else                settling / released
//! ```

use crate::config::SwitchConfig;
use crate::input::{read_pin, DigitalInputSource, PinId, SampleError};
use crate::sample::{ControlSample, FLAG_FALLING, FLAG_PRESSED, FLAG_RISING};

/// History pattern of the tick the line becomes pressed.
pub const RISING_PATTERN: u8 = 0x7f;

/// History pattern of the tick the line becomes released.
pub const FALLING_PATTERN: u8 = 0x80;

/// History pattern of a steady-pressed line.
pub const PRESSED_PATTERN: u8 = 0xff;

/// Debounced binary input.
///
/// # Example
///
/// ```
/// use daisy_controls::config::SwitchConfig;
/// use daisy_controls::input::PinId;
/// use daisy_controls::switch::Switch;
///
/// let mut button = Switch::new(SwitchConfig::new(1000.0, false, PinId(4)));
///
/// button.update(false);
/// for _ in 0..7 {
///     button.update(true);
/// }
/// assert!(button.rising_edge());
///
/// button.update(true);
/// assert!(button.pressed());
/// ```
#[derive(Clone, Debug)]
pub struct Switch {
    config: SwitchConfig,
    ms_per_update: f32,

    // Last 8 samples, newest in bit 0
    state: u8,
    // Steady-pressed ticks; counted, not summed, so it never stalls
    held_ticks: u32,
}

impl Switch {
    /// Create a switch from its configuration.
    pub fn new(config: SwitchConfig) -> Self {
        debug_assert!(
            config.update_rate_hz.is_finite() && config.update_rate_hz > 0.0,
            "update rate must be positive"
        );

        Self {
            config,
            ms_per_update: config.tick_period_ms(),
            state: 0,
            held_ticks: 0,
        }
    }

    /// Create a switch from loose parameters.
    pub fn init(update_rate_hz: f32, invert: bool, pin: PinId) -> Self {
        Self::new(SwitchConfig::new(update_rate_hz, invert, pin))
    }

    /// Return to the freshly-initialized baseline (released, nothing held).
    pub fn reset(&mut self) {
        self.state = 0;
        self.held_ticks = 0;
    }

    /// Get configuration.
    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    /// Pin this switch reads in [`debounce`](Self::debounce).
    #[inline]
    pub fn pin(&self) -> PinId {
        self.config.pin
    }

    /// Shift one raw sample into the history.
    ///
    /// `raw` is the pin level; polarity inversion is applied here.
    #[inline]
    pub fn update(&mut self, raw: bool) {
        let pressed = raw != self.config.invert;
        self.state = (self.state << 1) | pressed as u8;

        if self.state == PRESSED_PATTERN {
            self.held_ticks = self.held_ticks.saturating_add(1);
        } else {
            self.held_ticks = 0;
        }
    }

    /// Read own pin from `input` and advance one tick.
    ///
    /// On read failure the switch is left untouched.
    #[inline]
    pub fn debounce<I: DigitalInputSource>(
        &mut self,
        input: &mut I,
    ) -> Result<(), SampleError<I::Error>> {
        let raw = read_pin(input, self.config.pin)?;
        self.update(raw);
        Ok(())
    }

    /// Line became pressed this tick.
    #[inline]
    pub fn rising_edge(&self) -> bool {
        self.state == RISING_PATTERN
    }

    /// Line became released this tick.
    #[inline]
    pub fn falling_edge(&self) -> bool {
        self.state == FALLING_PATTERN
    }

    /// Line is steady-pressed (not on the edge tick itself).
    #[inline]
    pub fn pressed(&self) -> bool {
        self.state == PRESSED_PATTERN
    }

    /// Time held in milliseconds, 0 when not pressed.
    #[inline]
    pub fn held_time_ms(&self) -> f32 {
        if self.pressed() {
            self.held_ticks as f32 * self.ms_per_update
        } else {
            0.0
        }
    }

    /// Raw history register (newest sample in bit 0).
    #[inline]
    pub fn history(&self) -> u8 {
        self.state
    }

    /// Snapshot of this tick's outputs.
    pub fn sample(&self) -> ControlSample {
        let mut flags = 0;
        if self.rising_edge() {
            flags |= FLAG_RISING;
        }
        if self.falling_edge() {
            flags |= FLAG_FALLING;
        }
        if self.pressed() {
            flags |= FLAG_PRESSED;
        }

        ControlSample {
            flags,
            increment: 0,
            held_ms: self.held_time_ms(),
        }
    }
}
