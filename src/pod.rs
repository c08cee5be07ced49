//! Pod control layout: two push-buttons and one clickable encoder.
//!
//! Only the roles are fixed here. Pin numbers differ between board
//! revisions and are always supplied by the caller.

use crate::bank::{EncoderId, InputBank, SwitchId};
use crate::config::{BankConfig, EncoderPins, SwitchPins};
use crate::input::PinId;

/// Bank type of the pod layout.
pub type PodControls = InputBank<2, 1>;

pub const BUTTON_1: SwitchId = SwitchId(0);
pub const BUTTON_2: SwitchId = SwitchId(1);
pub const ENCODER: EncoderId = EncoderId(0);

/// Pin assignment of the pod controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PodPins {
    pub button_1: PinId,
    pub button_2: PinId,
    pub encoder: EncoderPins,
}

/// Bank configuration for the pod. Both buttons are wired active-low.
pub fn config(update_rate_hz: f32, pins: PodPins) -> BankConfig<2, 1> {
    BankConfig::new(
        update_rate_hz,
        [
            SwitchPins::active_low(pins.button_1),
            SwitchPins::active_low(pins.button_2),
        ],
        [pins.encoder],
    )
}

/// Initialized pod controls.
pub fn controls(update_rate_hz: f32, pins: PodPins) -> PodControls {
    InputBank::new(config(update_rate_hz, pins))
}
