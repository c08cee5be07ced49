//! daisy-controls firmware entry point.
//!
//! Polls the pod controls (two buttons, one clickable encoder) at a fixed
//! 1 kHz control rate and logs what happens:
//! 1. Read all pins and debounce the bank
//! 2. Check tick spacing
//! 3. Queue edge / rotation lines on the RT log stream
//! 4. Drain the stream to the console
//!
//! Only does real work when built for an ESP-IDF target.

#[cfg(target_os = "espidf")]
mod firmware {
    use daisy_controls::{
        config::{EncoderPins, TimingConfig},
        fault::{FaultCode, FaultState},
        hal::InputPins,
        input::PinId,
        logging::MAX_LINE_LEN,
        pod::{self, PodPins, ENCODER},
        rt_error, rt_info, rt_warn,
        timing::TickMonitor,
        CONTROL_LOG_STREAM,
    };
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::{AnyIOPin, IOPin, Input, PinDriver, Pull};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::sys::{self, EspError};
    use std::io::Write;

    /// Control-loop rate. Requires CONFIG_FREERTOS_HZ=1000 (sdkconfig.defaults).
    const CONTROL_RATE_HZ: f32 = 1000.0;

    // Slots in the InputPins array below, not chip GPIO numbers
    const POD_PINS: PodPins = PodPins {
        button_1: PinId(0),
        button_2: PinId(1),
        encoder: EncoderPins::new(PinId(2), PinId(3), PinId(4)),
    };

    static FAULT_STATE: FaultState = FaultState::new();

    fn input_pin(pin: AnyIOPin) -> Result<PinDriver<'static, AnyIOPin, Input>, EspError> {
        let mut driver = PinDriver::input(pin)?;
        driver.set_pull(Pull::Up)?;
        Ok(driver)
    }

    fn timestamp_us() -> i64 {
        // SAFETY: esp_timer_get_time is always safe to call
        unsafe { sys::esp_timer_get_time() }
    }

    /// Write queued lines straight to the console, outside the tick path.
    fn drain_logs() {
        let mut stdout = std::io::stdout().lock();
        let mut line = [0u8; MAX_LINE_LEN];

        while let Some(entry) = CONTROL_LOG_STREAM.drain() {
            let len = entry.format_line(&mut line);
            let _ = stdout.write_all(&line[..len]);
        }
        let _ = stdout.flush();
        drop(stdout);

        let dropped = CONTROL_LOG_STREAM.dropped();
        if dropped > 0 {
            log::warn!("{} control log lines dropped", dropped);
            CONTROL_LOG_STREAM.reset_dropped();
        }
    }

    pub fn run() -> Result<(), EspError> {
        sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("{} starting, control rate {} Hz", env!("VERSION_STRING"), CONTROL_RATE_HZ);

        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        let mut input = InputPins::new([
            input_pin(pins.gpio4.downgrade())?,
            input_pin(pins.gpio5.downgrade())?,
            input_pin(pins.gpio6.downgrade())?,
            input_pin(pins.gpio7.downgrade())?,
            input_pin(pins.gpio15.downgrade())?,
        ]);

        let mut controls = pod::controls(CONTROL_RATE_HZ, POD_PINS);
        let mut monitor = TickMonitor::new(TimingConfig::with_rate(CONTROL_RATE_HZ), &FAULT_STATE);
        let mut position: i32 = 0;

        loop {
            let now_us = timestamp_us();

            if let Err(code) = monitor.tick(now_us) {
                rt_warn!(
                    CONTROL_LOG_STREAM,
                    now_us,
                    "{}: {} us since last tick",
                    code,
                    FAULT_STATE.data()
                );
            }

            match controls.debounce(&mut input) {
                Ok(()) => {
                    controls.report(&CONTROL_LOG_STREAM, now_us);

                    let inc = controls.encoder(ENCODER).increment();
                    if inc != 0 {
                        position += inc;
                        rt_info!(CONTROL_LOG_STREAM, now_us, "position {}", position);
                    }
                }
                Err(e) => {
                    FAULT_STATE.set(FaultCode::InputRead, e.pin().0 as u32);
                    rt_error!(CONTROL_LOG_STREAM, now_us, "{}", e);
                }
            }

            drain_logs();
            FreeRtos::delay_ms(1);
        }
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    if let Err(e) = firmware::run() {
        log::error!("firmware stopped: {:?}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!("{}: firmware binary, build for an ESP-IDF target", env!("VERSION_STRING"));
}
