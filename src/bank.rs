//! Input bank: every switch and encoder of one device, debounced together.
//!
//! Members are fixed at construction and addressed by stable ids (their
//! position in [`BankConfig`]). Each tick advances all switches in index
//! order, then all encoders in index order.

use crate::config::BankConfig;
use crate::encoder::Encoder;
use crate::input::{read_pin, DigitalInputSource, SampleError};
use crate::logging::LogStream;
use crate::sample::{ControlSample, EncoderLevels};
use crate::switch::Switch;

/// Stable index of a switch in its bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwitchId(pub usize);

/// Stable index of an encoder in its bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EncoderId(pub usize);

/// Per-member outputs of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BankSamples<const S: usize, const E: usize> {
    pub switches: [ControlSample; S],
    pub encoders: [ControlSample; E],
}

impl<const S: usize, const E: usize> BankSamples<S, E> {
    /// True when no member did anything this tick.
    pub fn is_idle(&self) -> bool {
        self.switches.iter().chain(self.encoders.iter()).all(ControlSample::is_idle)
    }
}

/// Fixed collection of `S` switches and `E` encoders.
///
/// # Example
///
/// ```
/// use daisy_controls::bank::{InputBank, SwitchId};
/// use daisy_controls::config::{BankConfig, SwitchPins};
/// use daisy_controls::input::{PinId, PinLevels};
///
/// let config = BankConfig::new(1000.0, [SwitchPins::active_low(PinId(0))], []);
/// let mut bank = InputBank::new(config);
/// let mut pins = PinLevels::<4>::filled(true);
///
/// pins.set(PinId(0), false); // pressed on pull-up wiring
/// for _ in 0..7 {
///     bank.debounce(&mut pins).unwrap();
/// }
/// assert!(bank.switch(SwitchId(0)).rising_edge());
/// ```
#[derive(Clone, Debug)]
pub struct InputBank<const S: usize, const E: usize> {
    config: BankConfig<S, E>,
    switches: [Switch; S],
    encoders: [Encoder; E],
}

impl<const S: usize, const E: usize> InputBank<S, E> {
    /// Initialize every member with the shared rate and its pins.
    pub fn new(config: BankConfig<S, E>) -> Self {
        Self {
            config,
            switches: core::array::from_fn(|i| Switch::new(config.switch_config(i))),
            encoders: core::array::from_fn(|i| Encoder::new(config.encoder_config(i))),
        }
    }

    pub fn config(&self) -> &BankConfig<S, E> {
        &self.config
    }

    /// Return every member to its post-construction baseline.
    pub fn reset(&mut self) {
        self.switches.iter_mut().for_each(Switch::reset);
        self.encoders.iter_mut().for_each(Encoder::reset);
    }

    /// Advance every member one tick with already-read raw levels.
    pub fn update(&mut self, switch_levels: &[bool; S], encoder_levels: &[EncoderLevels; E]) {
        for (switch, &raw) in self.switches.iter_mut().zip(switch_levels) {
            switch.update(raw);
        }
        for (encoder, &levels) in self.encoders.iter_mut().zip(encoder_levels) {
            encoder.update_levels(levels);
        }
    }

    /// Read every configured pin, then advance every member one tick.
    ///
    /// All-or-nothing: if any read fails, no member is advanced, so members
    /// never drift apart by a tick.
    pub fn debounce<I: DigitalInputSource>(
        &mut self,
        input: &mut I,
    ) -> Result<(), SampleError<I::Error>> {
        let mut switch_levels = [false; S];
        for (level, switch) in switch_levels.iter_mut().zip(&self.switches) {
            *level = read_pin(input, switch.pin())?;
        }

        let mut encoder_levels = [EncoderLevels::default(); E];
        for (levels, encoder) in encoder_levels.iter_mut().zip(&self.encoders) {
            *levels = encoder.read_levels(input)?;
        }

        self.update(&switch_levels, &encoder_levels);
        Ok(())
    }

    /// Switch by id. Panics if `id` is not part of this bank.
    #[inline]
    pub fn switch(&self, id: SwitchId) -> &Switch {
        &self.switches[id.0]
    }

    /// Encoder by id. Panics if `id` is not part of this bank.
    #[inline]
    pub fn encoder(&self, id: EncoderId) -> &Encoder {
        &self.encoders[id.0]
    }

    pub fn switches(&self) -> &[Switch; S] {
        &self.switches
    }

    pub fn encoders(&self) -> &[Encoder; E] {
        &self.encoders
    }

    /// This tick's outputs of every member.
    pub fn samples(&self) -> BankSamples<S, E> {
        BankSamples {
            switches: core::array::from_fn(|i| self.switches[i].sample()),
            encoders: core::array::from_fn(|i| self.encoders[i].sample()),
        }
    }

    /// Log this tick's edges and rotation to `log`.
    ///
    /// RT-safe. Steady state (pressed, idle) is not logged. Returns the
    /// number of lines queued.
    pub fn report<const N: usize>(&self, log: &LogStream<N>, now_us: i64) -> u32 {
        let mut queued = 0;

        for (i, switch) in self.switches.iter().enumerate() {
            if switch.rising_edge() {
                queued += crate::rt_debug!(log, now_us, "switch {} pressed", i) as u32;
            } else if switch.falling_edge() {
                queued += crate::rt_debug!(log, now_us, "switch {} released", i) as u32;
            }
        }

        for (i, encoder) in self.encoders.iter().enumerate() {
            let inc = encoder.increment();
            if inc != 0 {
                queued += crate::rt_debug!(log, now_us, "encoder {} {:+}", i, inc) as u32;
            }
            if encoder.rising_edge() {
                queued += crate::rt_debug!(log, now_us, "encoder {} click pressed", i) as u32;
            } else if encoder.falling_edge() {
                queued += crate::rt_debug!(log, now_us, "encoder {} click released", i) as u32;
            }
        }

        queued
    }
}
