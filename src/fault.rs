//! Fault state for the control loop.
//!
//! The debounce core has no error path of its own: a skipped tick or a pin
//! that cannot be read silently corrupts edges and held time. Whoever drives
//! the tick can record such events here so the rest of the firmware (LEDs,
//! UI, a watchdog) can react.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Why the control loop is not trustworthy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// Tick interval longer than allowed: at least one tick was late or
    /// skipped, held time under-reports and edges may be missed.
    TickLate = 1,

    /// Tick interval shorter than allowed: ticks ran early or twice,
    /// debounce window shorter than configured.
    TickEarly = 2,

    /// A pin could not be read; the bank was not advanced this tick.
    InputRead = 3,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::TickLate,
            2 => FaultCode::TickEarly,
            3 => FaultCode::InputRead,
            _ => FaultCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::TickLate => "tick late",
            FaultCode::TickEarly => "tick early",
            FaultCode::InputRead => "input read",
        }
    }
}

impl core::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread-safe fault state.
///
/// ```ignore
/// static FAULT: FaultState = FaultState::new();
///
/// // In the control tick:
/// if let Err(code) = monitor.tick(now_us) {
///     // already recorded in FAULT by the monitor
/// }
///
/// // In the idle loop:
/// if FAULT.is_active() {
///     show_fault_led();
/// }
/// ```
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,

    /// Fault detail (e.g., interval in µs, pin number).
    data: AtomicU32,

    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a fault and bump the counter.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Fault code (only meaningful if `is_active()` is true).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag. The counter is kept for diagnostics.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}
