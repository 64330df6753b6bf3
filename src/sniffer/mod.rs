//! Sniffer façade: wires the ISO-TP reassembler (`isotp`) and the UDS
//! classifier (`uds`) behind the enable/disable/callback contract described
//! in spec §4.3. This is the only entry point the CAN driver shim calls.

use crate::isotp::{FrameOutcome, Reassembler, SessionKey};
use crate::types::{CanFrame, TimestampUs};
use crate::uds::{self, UdsMessage};

/// Installed by a consumer to decide whether a frame's address is worth
/// passing to the reassembler at all. A plain function pointer: the
/// predicate is pure and never needs captured state (default or
/// vehicle-specific address tables are all `'static`).
pub type AddressFilter = fn(u32) -> bool;

/// Receives completed, classified UDS messages plus the session's
/// `tx_addr`/`rx_addr` — callers need both to compute things like
/// `ecu_address = rx_addr - 8` (see `fingerprint::FingerprintResolver`).
/// Boxed rather than a bare function pointer so a consumer like
/// `FingerprintResolver::observe` can be installed as a closure that
/// captures `&mut self`.
pub type MessageSink<'a> = Box<dyn FnMut(&UdsMessage, u32, u32) + 'a>;

/// Standard OBD-II/UDS request addresses, `0x7E0..=0x7E7`.
const REQUEST_RANGE: std::ops::RangeInclusive<u32> = 0x7E0..=0x7E7;
/// Standard OBD-II/UDS response addresses, `0x7E8..=0x7EF`.
const RESPONSE_RANGE: std::ops::RangeInclusive<u32> = 0x7E8..=0x7EF;
/// Functional (broadcast) request address.
const FUNCTIONAL_ADDR: u32 = 0x7DF;

/// 29-bit extended addressing ranges recognised by the default predicate,
/// expressed as `(base, mask)` — `addr & mask == base`.
const EXTENDED_29BIT_RANGES: [(u32, u32); 2] = [(0x18DA_0000, 0xFFFF_0000), (0x18DB_0000, 0xFFFF_0000)];

/// Vehicle-specific UDS addresses this gateway also recognises, grounded on
/// `HYUNDAI_UDS_REQUEST_ADDRS` (ADAS/RADAR/CAM) plus their response
/// counterparts.
const VEHICLE_SPECIFIC_ADDRS: [u32; 6] = [0x730, 0x7D0, 0x7C4, 0x740, 0x7A0, 0x7CC];

/// Default `is_uds_address` predicate per spec §6. Callers that don't need a
/// custom filter install this.
pub fn default_is_uds_address(addr: u32) -> bool {
    REQUEST_RANGE.contains(&addr)
        || RESPONSE_RANGE.contains(&addr)
        || addr == FUNCTIONAL_ADDR
        || EXTENDED_29BIT_RANGES.iter().any(|(base, mask)| addr & mask == *base)
        || VEHICLE_SPECIFIC_ADDRS.contains(&addr)
}

/// Classifies a raw address into the `(tx, rx)` triple the reassembler keys
/// sessions on, per spec §4.1 "Address classification".
fn classify_address(addr: u32) -> (u32, u32) {
    if RESPONSE_RANGE.contains(&addr) {
        (addr - 8, addr)
    } else if REQUEST_RANGE.contains(&addr) {
        (addr, addr + 8)
    } else if addr == FUNCTIONAL_ADDR {
        (addr, 0)
    } else {
        (addr, addr)
    }
}

/// Owns the reassembler and the two consumer hooks. Replaces the teacher's
/// global `uds_sniffer_enabled`/`uds_callback` statics with an explicitly
/// threaded value, per Design Note §9.
pub struct UdsSniffer<'a> {
    reassembler: Reassembler,
    enabled: bool,
    address_filter: Option<AddressFilter>,
    sink: Option<MessageSink<'a>>,
}

impl Default for UdsSniffer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> UdsSniffer<'a> {
    pub fn new() -> Self {
        Self {
            reassembler: Reassembler::new(),
            enabled: false,
            address_filter: None,
            sink: None,
        }
    }

    /// Clears every session slot and disables the sniffer. Re-init clears
    /// before re-configuring, per spec §4.3.
    pub fn init(&mut self) {
        self.reassembler.init();
        self.enabled = false;
        self.address_filter = None;
        self.sink = None;
    }

    pub fn enable(&mut self, enable: bool) {
        self.enabled = enable;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Installs the upstream hooks. `(None, None)` is the documented
    /// teardown form. A `None` sink is permitted — matching sessions still
    /// complete and are classified, just not delivered anywhere
    /// (`CallbackNotSet` policy in spec §7).
    pub fn set_consumer(&mut self, sink: Option<MessageSink<'a>>, address_filter: Option<AddressFilter>) {
        self.sink = sink;
        self.address_filter = address_filter;
    }

    /// The hot path. Returns whether the frame was recognised as ISO-TP
    /// traffic (after address filtering) — it does not mean a UDS message
    /// was emitted this call.
    pub fn offer_frame(&mut self, frame: &CanFrame, now: TimestampUs) -> bool {
        if !self.enabled {
            return false;
        }

        let Some(filter) = self.address_filter else {
            return false;
        };
        if !filter(frame.address) {
            return false;
        }

        let (tx_addr, rx_addr) = classify_address(frame.address);
        let key = SessionKey {
            tx_addr,
            rx_addr,
            bus: frame.bus,
        };

        let (outcome, completed) = self.reassembler.offer_frame(key, frame.payload(), now);
        if outcome == FrameOutcome::NotIsoTp {
            return false;
        }

        if let Some(payload) = completed {
            if let Some(sink) = self.sink.as_mut() {
                let msg = uds::classify(payload.bytes(), payload.timestamp);
                sink(&msg, payload.key.tx_addr, payload.key.rx_addr);
            }
        }

        true
    }

    /// Reclaims idle sessions. A no-op while disabled, matching the
    /// façade's "gates everything" contract.
    pub fn tick(&mut self, now: TimestampUs) {
        if self.enabled {
            self.reassembler.tick(now);
        }
    }
}
