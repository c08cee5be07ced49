//! Tick interval monitor.
//!
//! The debounce core trusts its caller to tick at a perfectly fixed rate.
//! This monitor is optional instrumentation for the caller: feed it a
//! timestamp every tick and it flags intervals outside the allowed window.
//!
//! # Contract
//!
//! "Every interval is the nominal period, within tolerance, or I FAULT."
//!
//! A fault does not stop anything. Switches and encoders keep running; the
//! fault only tells the firmware that edges and held times around that tick
//! are not trustworthy.

use crate::config::TimingConfig;
use crate::fault::{FaultCode, FaultState};

/// Interval statistics since construction or the last `resync`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Intervals checked.
    pub intervals: u32,
    pub late: u32,
    pub early: u32,
    /// Largest |interval - period| seen, in µs.
    pub worst_deviation_us: i64,
}

/// Checks the spacing of control ticks against the nominal period.
///
/// # Example
///
/// ```
/// use daisy_controls::config::TimingConfig;
/// use daisy_controls::fault::{FaultCode, FaultState};
/// use daisy_controls::timing::TickMonitor;
///
/// let fault = FaultState::new();
/// let mut monitor = TickMonitor::new(TimingConfig::with_rate(1000.0), &fault);
///
/// assert!(monitor.tick(0).is_ok());
/// assert!(monitor.tick(1_000).is_ok());
/// assert_eq!(monitor.tick(3_000), Err(FaultCode::TickLate));
/// assert!(fault.is_active());
/// ```
pub struct TickMonitor<'a> {
    config: TimingConfig,
    fault: &'a FaultState,
    period_us: i64,
    max_deviation_us: i64,
    last_us: Option<i64>,
    stats: TickStats,
}

impl<'a> TickMonitor<'a> {
    pub fn new(config: TimingConfig, fault: &'a FaultState) -> Self {
        Self {
            config,
            fault,
            period_us: config.period_us(),
            max_deviation_us: config.max_deviation_us(),
            last_us: None,
            stats: TickStats::default(),
        }
    }

    /// Record a tick at `now_us`.
    ///
    /// The first tick after construction or `resync` only sets the baseline.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Interval within tolerance
    /// - `Err(FaultCode::TickLate)` - Interval too long, fault data = interval µs
    /// - `Err(FaultCode::TickEarly)` - Interval too short, fault data = interval µs
    #[inline]
    pub fn tick(&mut self, now_us: i64) -> Result<(), FaultCode> {
        let last = match self.last_us.replace(now_us) {
            Some(last) => last,
            None => return Ok(()),
        };

        let interval = now_us.saturating_sub(last);
        let deviation = interval.saturating_sub(self.period_us);

        self.stats.intervals = self.stats.intervals.wrapping_add(1);
        self.stats.worst_deviation_us =
            self.stats.worst_deviation_us.max(deviation.saturating_abs());

        if deviation > self.max_deviation_us {
            self.stats.late = self.stats.late.wrapping_add(1);
            self.fault.set(FaultCode::TickLate, clamp_u32(interval));
            return Err(FaultCode::TickLate);
        }

        if deviation < -self.max_deviation_us {
            self.stats.early = self.stats.early.wrapping_add(1);
            self.fault.set(FaultCode::TickEarly, clamp_u32(interval));
            return Err(FaultCode::TickEarly);
        }

        Ok(())
    }

    /// Forget the last timestamp and statistics (e.g., after a pause).
    pub fn resync(&mut self) {
        self.last_us = None;
        self.stats = TickStats::default();
    }

    /// Estimated number of whole ticks missed by an interval of `interval_us`.
    #[inline]
    pub fn missed_ticks(&self, interval_us: i64) -> u32 {
        if self.period_us <= 0 || interval_us <= self.period_us {
            return 0;
        }
        clamp_u32(interval_us.saturating_add(self.period_us / 2) / self.period_us - 1)
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Nominal period in µs.
    pub fn period_us(&self) -> i64 {
        self.period_us
    }
}

#[inline]
fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}
