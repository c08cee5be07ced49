//! RT-safe logging for the control loop.
//!
//! ```text
//! Control tick           LogStream             Drain (idle loop)
//! ────────────           ─────────             ─────────────────
//!
//! rt_log!() ──────────▶ [L0][L1][L2] ──────▶ log::info!() / UART
//! no alloc                lock-free            blocking ok
//! never blocks            ring buffer
//! ```
//!
//! # Rules
//!
//! - The tick path never calls a blocking logger; it uses `rt_log!()`
//! - Messages are dropped (and counted) when the ring is full
//! - Producers and drains may run on any thread; none of them ever waits

use core::cell::UnsafeCell;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Buffer size that always holds a whole [`LogEntry::format_line`] output.
pub const MAX_LINE_LEN: usize = MAX_MSG_LEN + 32;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    pub level: LogLevel,
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text, or a placeholder if truncation split a UTF-8 sequence.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }

    /// Format as `[timestamp_us] LEVEL: message\n` into `buf`.
    ///
    /// Returns the number of bytes written; output is truncated to `buf`.
    pub fn format_line(&self, buf: &mut [u8]) -> usize {
        let mut writer = BufWriter { buf, pos: 0 };
        let _ = write!(
            writer,
            "[{:10}] {}: {}\n",
            self.timestamp_us,
            self.level.as_str(),
            self.message()
        );
        writer.pos
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEntry")
            .field("timestamp_us", &self.timestamp_us)
            .field("level", &self.level)
            .field("msg", &self.message())
            .finish()
    }
}

/// One ring slot: an entry plus the sequence number that says who owns it.
///
/// For the slot's position `pos` in lap `lap = pos & !MASK`:
/// - `seq == lap`: free, a producer may claim it
/// - `seq == lap + 1`: written, the drain may take it
/// - `seq == lap + N`: taken, free again for the next lap
struct Slot {
    seq: AtomicU32,
    entry: UnsafeCell<LogEntry>,
}

impl Slot {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self = Self {
        seq: AtomicU32::new(0),
        entry: UnsafeCell::new(LogEntry::EMPTY),
    };
}

/// Lock-free log ring.
///
/// - `push` never blocks: it drops the message if the ring is full
/// - `drain` runs elsewhere, at leisure
/// - Any number of producers and drains may share one stream; slots are
///   claimed by CAS and only handed over once their sequence number says so
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a slot's entry is only touched by the one thread that won the CAS
// for its position, and ownership moves between producer and drain through
// the slot's Release/Acquire sequence number.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");
        assert!(N >= 2, "Log buffer needs at least 2 entries");

        Self {
            slots: [Slot::EMPTY; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    #[inline]
    fn slot(&self, pos: u32) -> (&Slot, u32) {
        let lap = pos & !(Self::MASK as u32);
        (&self.slots[pos as usize & Self::MASK], lap)
    }

    /// Queue a message. Returns `false` if it was dropped (ring full).
    ///
    /// O(1) unless other producers race for the same slot, no allocation.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut pos = self.write_idx.load(Ordering::Relaxed);

        loop {
            let (slot, lap) = self.slot(pos);
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(lap) as i32;

            if diff < 0 {
                // Still holds last lap's entry
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }

            if diff > 0 {
                // Another producer already claimed `pos`
                pos = self.write_idx.load(Ordering::Relaxed);
                continue;
            }

            match self.write_idx.compare_exchange_weak(
                pos,
                pos.wrapping_add(1),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    let len = msg.len().min(MAX_MSG_LEN);

                    // SAFETY: winning the CAS at a free slot makes this
                    // thread its only owner until `seq` is published.
                    unsafe {
                        let entry = &mut *slot.entry.get();
                        entry.timestamp_us = timestamp_us;
                        entry.level = level;
                        entry.len = len as u8;
                        entry.msg[..len].copy_from_slice(&msg[..len]);
                    }

                    slot.seq.store(lap.wrapping_add(1), Ordering::Release);
                    return true;
                }
                Err(current) => pos = current,
            }
        }
    }

    /// Take the oldest entry, if any.
    ///
    /// Returns `None` while the oldest claimed slot is still being written.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let mut pos = self.read_idx.load(Ordering::Relaxed);

        loop {
            let (slot, lap) = self.slot(pos);
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(lap.wrapping_add(1)) as i32;

            if diff < 0 {
                return None;
            }

            if diff > 0 {
                // Another drain already took `pos`
                pos = self.read_idx.load(Ordering::Relaxed);
                continue;
            }

            match self.read_idx.compare_exchange_weak(
                pos,
                pos.wrapping_add(1),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    // SAFETY: the Acquire load saw the producer's publish and
                    // the CAS made this thread the slot's only reader.
                    let entry = unsafe { *slot.entry.get() };

                    slot.seq.store(lap.wrapping_add(N as u32), Ordering::Release);
                    return Some(entry);
                }
                Err(current) => pos = current,
            }
        }
    }

    /// Count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Number of entries claimed and not yet drained (some may still be
    /// mid-write).
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Relaxed);
        write.wrapping_sub(read)
    }

    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

struct BufWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let to_write = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Format a message into a buffer, truncating. Returns bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = fmt::write(&mut writer, args);
    writer.pos
}

/// RT-safe log macro.
///
/// ```ignore
/// rt_log!(LogLevel::Info, CONTROL_LOG_STREAM, now_us, "enc {:+}", inc);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len])
    }};
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

/// Maximum verbosity.
#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"test message"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "test message");

        assert!(!stream.has_entries());
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::<4>::new();

        for i in 0..4 {
            assert!(stream.push(i, LogLevel::Info, b"x"));
        }

        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);
        assert_eq!(stream.pending(), 4);

        // Drain one, should be able to push again
        assert_eq!(stream.drain().unwrap().timestamp_us, 0);
        assert!(stream.push(6, LogLevel::Info, b"6"));

        stream.reset_dropped();
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'a'; MAX_MSG_LEN + 20];
        stream.push(0, LogLevel::Warn, &long);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_macros_push() {
        let stream = LogStream::<8>::new();
        assert!(rt_warn!(stream, 42, "tick late by {} us", 310));
        rt_debug!(stream, 43, "enc {:+}", -1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message(), "tick late by 310 us");

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Debug);
        assert_eq!(entry.message(), "enc -1");
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("Hello {}", 42));
        assert_eq!(&buf[..len], b"Hello 42");

        let mut small = [0u8; 4];
        let len = format_to_buffer(&mut small, format_args!("Hello {}", 42));
        assert_eq!(&small[..len], b"Hell");
    }

    #[test]
    fn test_format_line() {
        let stream = LogStream::<4>::new();
        rt_error!(stream, 1500, "read failed");
        let entry = stream.drain().unwrap();

        let mut buf = [0u8; 64];
        let len = entry.format_line(&mut buf);
        assert_eq!(
            core::str::from_utf8(&buf[..len]).unwrap(),
            "[      1500] ERROR: read failed\n"
        );
    }

    #[test]
    fn test_format_line_fits_longest_entry() {
        let stream = LogStream::<4>::new();
        stream.push(i64::MIN, LogLevel::Trace, &[b'x'; MAX_MSG_LEN]);
        let entry = stream.drain().unwrap();

        let mut buf = [0u8; MAX_LINE_LEN];
        let len = entry.format_line(&mut buf);
        let line = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(line.starts_with("[-9223372036854775808] TRACE: xxx"));
        assert!(line.ends_with("x\n"));
        assert!(len < MAX_LINE_LEN);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_producer_and_drain_threads() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<16>::new());

        let producer = {
            let stream = Arc::clone(&stream);
            thread::spawn(move || {
                let mut sent = 0;
                for i in 0..200 {
                    if rt_info!(stream, i, "tick {}", i) {
                        sent += 1;
                    }
                }
                sent
            })
        };

        let mut received = 0;
        let mut last_ts = -1;
        while !producer.is_finished() || stream.has_entries() {
            if let Some(entry) = stream.drain() {
                assert!(entry.timestamp_us > last_ts, "entries arrive in order");
                last_ts = entry.timestamp_us;
                received += 1;
            }
        }

        let sent = producer.join().unwrap();
        assert_eq!(received, sent);
        assert_eq!(sent + stream.dropped(), 200);
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        const PRODUCERS: i64 = 4;
        const PER_PRODUCER: i64 = 20_000;

        let stream = Arc::new(LogStream::<256>::new());
        let start = Arc::new(Barrier::new(PRODUCERS as usize + 1));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|id| {
                let stream = Arc::clone(&stream);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    let mut sent = 0u32;
                    for i in 0..PER_PRODUCER {
                        let ts = id * PER_PRODUCER + i;
                        if rt_info!(stream, ts, "p{} {}", id, i) {
                            sent += 1;
                        }
                    }
                    sent
                })
            })
            .collect();

        start.wait();
        let mut received = 0u32;
        let mut last_ts = [-1i64; PRODUCERS as usize];
        let mut drain_one = |entry: LogEntry| {
            let id = entry.timestamp_us / PER_PRODUCER;
            let i = entry.timestamp_us % PER_PRODUCER;
            assert_eq!(entry.message(), std::format!("p{} {}", id, i));
            assert!(entry.timestamp_us > last_ts[id as usize], "per-producer order");
            last_ts[id as usize] = entry.timestamp_us;
            received += 1;
        };

        while !producers.iter().all(|p| p.is_finished()) {
            if let Some(entry) = stream.drain() {
                drain_one(entry);
            }
        }
        while let Some(entry) = stream.drain() {
            drain_one(entry);
        }

        let sent: u32 = producers.into_iter().map(|p| p.join().unwrap()).sum();
        assert_eq!(received, sent);
        assert_eq!(sent + stream.dropped(), (PRODUCERS * PER_PRODUCER) as u32);
        assert_eq!(stream.pending(), 0);
    }

    #[test]
    fn test_concurrent_producers_fill_ring_exactly() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let start = Arc::new(Barrier::new(4));

        let producers: Vec<_> = (0..4)
            .map(|id| {
                let stream = Arc::clone(&stream);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    (0..100).filter(|&i| stream.push(i, LogLevel::Info, &[b'0' + id])).count()
                })
            })
            .collect();

        let sent: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();
        assert_eq!(sent, 64);
        assert_eq!(stream.dropped(), 400 - 64);

        let mut drained = 0;
        while stream.drain().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 64);
    }
}
