//! # daisy-controls
//!
//! Fixed-rate debounced sampler for buttons and quadrature encoders.
//!
//! ## Architecture
//!
//! Everything is driven from outside, once per control tick:
//! - The caller (audio callback, timer ISR, control loop) owns timing
//! - Raw levels come in through [`DigitalInputSource`] or as plain `bool`s
//! - [`Switch`], [`Encoder`] and [`InputBank`] shift them into 8-bit
//!   histories and expose edges, pressed state, held time and rotation
//!
//! No internal timing, no allocation, no locks. The core is deterministic
//! and fully testable on host.

#![cfg_attr(not(test), no_std)]

pub mod bank;
pub mod config;
pub mod encoder;
pub mod fault;
pub mod hal;
pub mod input;
pub mod log_globals;
pub mod logging;
pub mod pod;
pub mod sample;
pub mod switch;
pub mod timing;

pub use bank::{EncoderId, InputBank, SwitchId};
pub use config::{BankConfig, EncoderConfig, EncoderPins, SwitchConfig, SwitchPins, TimingConfig};
pub use encoder::Encoder;
pub use fault::{FaultCode, FaultState};
pub use input::{DigitalInputSource, PinId, PinLevels, SampleError};
pub use log_globals::CONTROL_LOG_STREAM;
pub use sample::{ControlSample, EncoderLevels};
pub use switch::Switch;
pub use timing::TickMonitor;
