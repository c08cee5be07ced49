//! Input bank integration tests
//!
//! Drives a pod-layout bank through a level table, the way the control loop
//! does on hardware.

use daisy_controls::bank::{InputBank, SwitchId};
use daisy_controls::config::{BankConfig, EncoderPins, SwitchPins};
use daisy_controls::input::{self, PinId, PinLevels, SampleError, UnknownPin};
use daisy_controls::logging::{LogLevel, LogStream};
use daisy_controls::pod::{self, PodPins, BUTTON_1, BUTTON_2, ENCODER};
use daisy_controls::sample::EncoderLevels;

const PINS: PodPins = PodPins {
    button_1: PinId(0),
    button_2: PinId(1),
    encoder: EncoderPins::new(PinId(2), PinId(3), PinId(4)),
};

/// All lines idle high (pull-ups, nothing pressed).
fn idle_pins() -> PinLevels<8> {
    PinLevels::filled(true)
}

#[test]
fn test_pod_idle_ticks_are_quiet() {
    let mut pod = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();

    for _ in 0..50 {
        pod.debounce(&mut pins).unwrap();
        assert!(pod.samples().is_idle());
    }
}

#[test]
fn test_pod_button_press() {
    let mut pod = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();

    pins.set(PINS.button_2, false);
    let mut rising_ticks = Vec::new();
    for tick in 1..=10 {
        pod.debounce(&mut pins).unwrap();
        if pod.switch(BUTTON_2).rising_edge() {
            rising_ticks.push(tick);
        }
        assert!(!pod.switch(BUTTON_1).rising_edge());
    }

    assert_eq!(rising_ticks, vec![7]);
    assert!(pod.switch(BUTTON_2).pressed());
    assert!((pod.switch(BUTTON_2).held_time_ms() - 3.0).abs() < 1e-3);
}

#[test]
fn test_pod_encoder_turn() {
    let mut pod = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();

    let a = [1, 1, 1, 1, 0, 0, 0, 0];
    let b = [1, 0, 0, 0, 0, 0, 0, 0];
    let mut position = 0;

    for (&ra, &rb) in a.iter().zip(&b) {
        pins.set(PINS.encoder.a, ra != 0);
        pins.set(PINS.encoder.b, rb != 0);
        pod.debounce(&mut pins).unwrap();
        position += pod.encoder(ENCODER).increment();
    }

    assert_eq!(position, 1);
}

#[test]
fn test_members_are_independent() {
    let mut pod = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();

    pins.set(PINS.button_1, false);
    pins.set(PINS.encoder.click, false);
    for _ in 0..8 {
        pod.debounce(&mut pins).unwrap();
    }

    let samples = pod.samples();
    assert!(samples.switches[BUTTON_1.0].pressed());
    assert!(!samples.switches[BUTTON_2.0].pressed());
    assert!(samples.encoders[ENCODER.0].pressed());
}

#[test]
fn test_update_matches_debounce() {
    let mut via_pins = pod::controls(1000.0, PINS);
    let mut via_levels = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();
    let mut seed: u32 = 0xdead_beef;

    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        pins.load_bits(seed);

        via_pins.debounce(&mut pins).unwrap();

        let get = |pin: PinId| pins.get(pin).unwrap();
        via_levels.update(
            &[get(PINS.button_1), get(PINS.button_2)],
            &[EncoderLevels::new(
                get(PINS.encoder.a),
                get(PINS.encoder.b),
                get(PINS.encoder.click),
            )],
        );

        assert_eq!(via_pins.samples(), via_levels.samples());
    }
}

#[test]
fn test_read_error_is_reported_with_pin() {
    let config = BankConfig::new(
        1000.0,
        [SwitchPins::active_low(PinId(0)), SwitchPins::active_low(PinId(12))],
        [],
    );
    let mut bank = InputBank::new(config);
    let mut pins = idle_pins();

    let err = bank.debounce(&mut pins).unwrap_err();
    assert_eq!(err.pin(), PinId(12));
    assert_eq!(
        err,
        SampleError::InputRead {
            pin: PinId(12),
            source: UnknownPin(PinId(12))
        }
    );
    // First switch must not have advanced either
    assert_eq!(bank.switch(SwitchId(0)).history(), 0);
}

#[test]
fn test_closure_input_source() {
    let config = BankConfig::new(1000.0, [SwitchPins::active_high(PinId(5))], []);
    let mut bank = InputBank::new(config);
    let mut source = input::from_fn(|pin| pin == PinId(5));

    for _ in 0..8 {
        bank.debounce(&mut source).unwrap();
    }
    assert!(bank.switch(SwitchId(0)).pressed());
}

#[test]
fn test_report_to_log_stream() {
    let log = LogStream::<32>::new();
    let mut pod = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();

    // Press button 1 and turn the encoder one step clockwise
    let a = [1, 1, 1, 1, 0, 0, 0];
    let b = [1, 0, 0, 0, 0, 0, 0];
    pins.set(PINS.button_1, false);
    for (tick, (&ra, &rb)) in a.iter().zip(&b).enumerate() {
        pins.set(PINS.encoder.a, ra != 0);
        pins.set(PINS.encoder.b, rb != 0);
        pod.debounce(&mut pins).unwrap();
        pod.report(&log, tick as i64 * 1000);
    }

    let mut lines = Vec::new();
    while let Some(entry) = log.drain() {
        assert_eq!(entry.level, LogLevel::Debug);
        lines.push((entry.timestamp_us, entry.message().to_string()));
    }

    assert_eq!(
        lines,
        vec![
            (4_000, "encoder 0 +1".to_string()),
            (6_000, "switch 0 pressed".to_string()),
        ]
    );
}

#[test]
fn test_report_logs_press_and_release_of_every_kind() {
    let log = LogStream::<32>::new();
    let mut pod = pod::controls(1000.0, PINS);
    let mut pins = idle_pins();
    let mut queued = 0;

    for tick in 1..=20 {
        // Button 1 and the encoder click go down together; the button comes
        // back up after tick 8, the click after tick 11
        pins.set(PINS.button_1, tick > 8);
        pins.set(PINS.encoder.click, tick > 11);
        pod.debounce(&mut pins).unwrap();
        queued += pod.report(&log, tick * 1000);
    }

    let mut lines = Vec::new();
    while let Some(entry) = log.drain() {
        lines.push((entry.timestamp_us, entry.message().to_string()));
    }

    assert_eq!(
        lines,
        vec![
            (7_000, "switch 0 pressed".to_string()),
            (7_000, "encoder 0 click pressed".to_string()),
            (15_000, "switch 0 released".to_string()),
            (18_000, "encoder 0 click released".to_string()),
        ]
    );
    assert_eq!(queued, 4);
    assert_eq!(log.dropped(), 0);
}
