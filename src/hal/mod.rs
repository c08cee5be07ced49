//! Hardware Abstraction Layer.
//!
//! Thin adapters from HAL pin drivers to the sampler's input trait.
//! Debounce logic stays in core modules, HAL is just I/O.

pub mod gpio;

pub use gpio::{GpioError, InputPins};
