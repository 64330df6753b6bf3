//! Common types shared across the sniffer, fingerprint resolver, and
//! interceptor: the CAN frame representation, the microsecond time source
//! contract, and the configuration trait used at construction seams.

/// Maximum CAN-FD payload length; classic CAN frames only occupy the first 8.
pub const MAX_FRAME_LEN: usize = 64;

/// Free-running microsecond timestamp, matching the vehicle firmware's
/// `microsecond_timer_get()` convention. Wraps at `u32::MAX`.
pub type TimestampUs = u32;

/// Computes `now - prior` with `u32` wraparound handling, the same
/// convention the vehicle firmware uses for its idle/grace-period timers.
pub fn elapsed(now: TimestampUs, prior: TimestampUs) -> u32 {
    now.wrapping_sub(prior)
}

/// A CAN frame as delivered by the (out-of-scope) CAN driver.
///
/// `data` is a fixed-size buffer rather than `Vec<u8>`: the core sniffer
/// performs no dynamic allocation, so frames never own heap memory.
#[derive(Debug, Clone, Copy)]
pub struct CanFrame {
    /// Bus index, `0..N-1`.
    pub bus: u8,
    /// 11- or 29-bit CAN identifier.
    pub address: u32,
    /// Number of valid bytes in `data`.
    pub length: u8,
    /// Payload buffer; only `data[..length]` is meaningful.
    pub data: [u8; MAX_FRAME_LEN],
}

impl CanFrame {
    /// Builds a frame from a byte slice, truncating to `MAX_FRAME_LEN`.
    pub fn new(bus: u8, address: u32, bytes: &[u8]) -> Self {
        let mut data = [0u8; MAX_FRAME_LEN];
        let len = bytes.len().min(MAX_FRAME_LEN);
        data[..len].copy_from_slice(&bytes[..len]);
        Self {
            bus,
            address,
            length: len as u8,
            data,
        }
    }

    /// The meaningful slice of `data`.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.length as usize]
    }
}

/// Configuration trait implemented by the crate's few validated config
/// structs (construction-time invariants only — the hot path never
/// validates).
pub trait Config {
    /// Returns `Ok(())` if the configuration is valid, or an error
    /// describing what's wrong.
    fn validate(&self) -> crate::error::Result<()>;
}
