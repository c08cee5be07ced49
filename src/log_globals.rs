//! Global log stream instance.

use crate::logging::LogStream;

/// Log stream of the control loop.
///
/// Single producer (the control tick), single consumer (the idle-loop drain).
pub static CONTROL_LOG_STREAM: LogStream = LogStream::new();
