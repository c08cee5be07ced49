//! Module: sample
//!
//! Purpose: Per-tick output of a debounced control. One `ControlSample`
//! captures everything a switch or encoder reports for a single control tick.
//!
//! Architecture:
//! - Compact `Copy` structure, safe to stash in statics or ring buffers
//! - Edge and steady-state bits packed into one flag byte
//! - Rotation carried as a signed byte (-1, 0, +1)
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Rising edge this tick (line just became pressed).
pub const FLAG_RISING: u8 = 0x01;

/// Falling edge this tick (line just became released).
pub const FLAG_FALLING: u8 = 0x02;

/// Line is steady-state pressed (last 8 samples all pressed).
pub const FLAG_PRESSED: u8 = 0x04;

/// Snapshot of one control's derived signals for one tick.
///
/// Memory layout:
/// ```text
/// [flags:1][increment:1][pad:2][held_ms:4] = 8 bytes
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSample {
    /// Edge / pressed bits, see `FLAG_*`.
    pub flags: u8,

    /// Rotation detected this tick. Always 0 for plain switches.
    pub increment: i8,

    /// Milliseconds held while steady-pressed, 0 otherwise.
    pub held_ms: f32,
}

impl ControlSample {
    /// Sample with no activity.
    pub const IDLE: Self = Self {
        flags: 0,
        increment: 0,
        held_ms: 0.0,
    };

    pub fn rising_edge(&self) -> bool {
        (self.flags & FLAG_RISING) != 0
    }

    pub fn falling_edge(&self) -> bool {
        (self.flags & FLAG_FALLING) != 0
    }

    pub fn pressed(&self) -> bool {
        (self.flags & FLAG_PRESSED) != 0
    }

    /// True when nothing happened this tick: no edge, not pressed, no rotation.
    ///
    /// Idle samples are the ones a reporter can skip.
    pub fn is_idle(&self) -> bool {
        self.flags == 0 && self.increment == 0
    }
}

impl Default for ControlSample {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Raw levels of an encoder's three pins for one tick.
///
/// Levels are as read from the pin, before any polarity handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderLevels {
    pub a: bool,
    pub b: bool,
    pub click: bool,
}

impl EncoderLevels {
    /// Encoder at rest on pull-up wiring: both channels and button high.
    pub const REST: Self = Self {
        a: true,
        b: true,
        click: true,
    };

    pub const fn new(a: bool, b: bool, click: bool) -> Self {
        Self { a, b, click }
    }
}

// ============================================================================
// Tests
// ============================================================================
