//! TX safety guard sketch (spec §4.6), illustrating the RX/TX hook contract
//! every per-OEM guard follows. Grounded on
//! `opendbc/safety/modes/volvo.h` (EUCD platform); bit offsets and masks are
//! preserved bit-for-bit as the spec requires, since they're part of the
//! external wire contract. Not wired to the sniffer, fingerprint resolver,
//! or interceptor — purely illustrative, per spec §4.6.

use bitflags::bitflags;

use crate::error::Result;
use crate::types::{CanFrame, Config};

/// RX message addresses on the EUCD platform.
pub const ACC_PEDAL_ADDR: u32 = 0x020;
pub const FSM0_ADDR: u32 = 0x051;
pub const VEHICLE_SPEED1_ADDR: u32 = 0x148;
pub const BRAKE_INFO_ADDR: u32 = 0x20A;

/// TX message addresses this guard vetoes.
pub const CC_BUTTONS_ADDR: u32 = 0x127;
pub const LKA_COMMAND_ADDR: u32 = 0x262;

/// Bus indices.
pub const MAIN_BUS: u8 = 0;
pub const AUX_BUS: u8 = 1;
pub const CAM_BUS: u8 = 2;

bitflags! {
    /// Derived boolean signals updated by `rx_hook`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DerivedSignals: u8 {
        const VEHICLE_MOVING = 0b0001;
        const GAS_PRESSED    = 0b0010;
        const BRAKE_PRESSED  = 0b0100;
        const CRUISE_ENGAGED = 0b1000;
    }
}

/// Construction-time configuration for the guard; validated once, never on
/// the RX/TX hot path.
#[derive(Debug, Clone)]
pub struct VolvoGuardConfig {
    /// Whether `controls_allowed` starts true (normally false until an
    /// upstream enable signal arrives — out of scope here, so this simply
    /// documents the seam).
    pub controls_allowed_default: bool,
}

impl Default for VolvoGuardConfig {
    fn default() -> Self {
        Self {
            controls_allowed_default: false,
        }
    }
}

impl Config for VolvoGuardConfig {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Illustrative Volvo EUCD TX safety guard.
pub struct VolvoGuard {
    signals: DerivedSignals,
    vehicle_speed_mps: f32,
    controls_allowed: bool,
}

impl VolvoGuard {
    pub fn new(config: &VolvoGuardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            signals: DerivedSignals::empty(),
            vehicle_speed_mps: 0.0,
            controls_allowed: config.controls_allowed_default,
        })
    }

    pub fn set_controls_allowed(&mut self, allowed: bool) {
        self.controls_allowed = allowed;
    }

    pub fn vehicle_speed_mps(&self) -> f32 {
        self.vehicle_speed_mps
    }

    pub fn signals(&self) -> DerivedSignals {
        self.signals
    }

    /// Updates derived signals from a known RX message. Unknown
    /// addresses/buses are ignored.
    pub fn rx_hook(&mut self, frame: &CanFrame) {
        let payload = frame.payload();

        if frame.bus == MAIN_BUS {
            if frame.address == VEHICLE_SPEED1_ADDR && payload.len() >= 8 {
                let speed_raw = ((payload[6] as u32) << 8) | payload[7] as u32;
                self.signals.set(DerivedSignals::VEHICLE_MOVING, speed_raw >= 36);
                self.vehicle_speed_mps = speed_raw as f32 * 0.01 / 3.6;
            }

            if frame.address == ACC_PEDAL_ADDR && payload.len() >= 4 {
                let gas_raw = (((payload[2] & 0x03) as u32) << 8) | payload[3] as u32;
                self.signals.set(DerivedSignals::GAS_PRESSED, gas_raw >= 100);
            }

            if frame.address == BRAKE_INFO_ADDR && payload.len() >= 3 {
                let brake_pressed = ((payload[2] & 0x0C) >> 2) == 2;
                self.signals.set(DerivedSignals::BRAKE_PRESSED, brake_pressed);
            }
        } else if frame.bus == CAM_BUS && frame.address == FSM0_ADDR && payload.len() >= 3 {
            let cruise_state = payload[2] & 0x07;
            self.signals
                .set(DerivedSignals::CRUISE_ENGAGED, matches!(cruise_state, 6 | 7));
        }
    }

    /// Returns whether the outbound frame may be transmitted: vetoes the
    /// CC-buttons message when cruise isn't engaged or controls aren't
    /// allowed, and the LKA command when controls aren't allowed.
    pub fn tx_hook(&self, frame: &CanFrame) -> bool {
        let payload = frame.payload();
        let cruise_engaged = self.signals.contains(DerivedSignals::CRUISE_ENGAGED);

        if frame.address == CC_BUTTONS_ADDR && payload.len() >= 8 {
            // Signals: ACCOnOffBtn (bit 59), ACCOnOffBtnInv (bit 43) — cancel;
            // ACCResumeBtn (bit 61), ACCResumeBtnInv (bit 45) — resume.
            let cancel_violation = !cruise_engaged && (get_bit(payload, 59) || !get_bit(payload, 43));
            let resume_violation = !self.controls_allowed && (get_bit(payload, 61) || !get_bit(payload, 45));
            if cancel_violation || resume_violation {
                return false;
            }
        }

        if frame.address == LKA_COMMAND_ADDR && payload.len() >= 6 {
            let mode = payload[5] & 0x03;
            let lka_active = mode != 0;
            if lka_active && !self.controls_allowed {
                return false;
            }
        }

        true
    }
}

/// Reads one bit from a CAN payload using the firmware's `GET_BIT`
/// convention: bit `n` is bit `n % 8` of byte `n / 8`, LSB-first within the
/// byte.
fn get_bit(payload: &[u8], bit: usize) -> bool {
    let byte = bit / 8;
    if byte >= payload.len() {
        return false;
    }
    (payload[byte] >> (bit % 8)) & 1 == 1
}
