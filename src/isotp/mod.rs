//! ISO-TP (ISO 15765-2) reassembly engine.
//!
//! `Reassembler` owns a fixed table of sessions and turns a stream of
//! Single/First/Consecutive frames into complete payloads. It has no notion
//! of address filtering or UDS semantics — those belong to `sniffer` and
//! `uds` respectively — which keeps the session state machine trivially
//! testable on its own.

use crate::types::TimestampUs;

const MAX_SESSIONS: usize = 8;
/// Matches the firmware's `MAX_UDS_DATA_SIZE`.
pub const MAX_PAYLOAD_LEN: usize = 256;
/// 5 seconds of inactivity reclaims a session.
pub const SESSION_TIMEOUT_US: u32 = 5_000_000;

const PCI_SINGLE_FRAME: u8 = 0x0;
const PCI_FIRST_FRAME: u8 = 0x1;
const PCI_CONSECUTIVE_FRAME: u8 = 0x2;
const PCI_FLOW_CONTROL: u8 = 0x3;

/// A session's key: the triple a session table lookup is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionKey {
    pub tx_addr: u32,
    pub rx_addr: u32,
    pub bus: u8,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    active: bool,
    key: SessionKey,
    /// Next expected 4-bit consecutive-frame sequence counter.
    sequence_number: u8,
    total_length: u16,
    received_length: u16,
    data: [u8; MAX_PAYLOAD_LEN],
    last_timestamp: TimestampUs,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            active: false,
            key: SessionKey {
                tx_addr: 0,
                rx_addr: 0,
                bus: 0,
            },
            sequence_number: 0,
            total_length: 0,
            received_length: 0,
            data: [0u8; MAX_PAYLOAD_LEN],
            last_timestamp: 0,
        }
    }
}

/// A complete, reassembled ISO-TP payload ready for UDS classification.
#[derive(Debug, Clone)]
pub struct CompletedPayload {
    pub key: SessionKey,
    pub timestamp: TimestampUs,
    data: [u8; MAX_PAYLOAD_LEN],
    len: u16,
}

impl CompletedPayload {
    /// The reassembled bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// Outcome of offering a single CAN frame to the reassembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The PCI nibble wasn't one of Single/First/Consecutive/FlowControl.
    NotIsoTp,
    /// Recognised as ISO-TP, but no payload completed yet (First/Consecutive
    /// mid-stream, a Flow Control frame, or a dropped malformed/mismatched
    /// frame).
    Pending,
}

/// Fixed-capacity ISO-TP session table and frame-type state machine.
pub struct Reassembler {
    sessions: [Session; MAX_SESSIONS],
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    /// Creates a reassembler with every slot inactive.
    pub fn new() -> Self {
        Self {
            sessions: [Session::default(); MAX_SESSIONS],
        }
    }

    /// Clears every session slot. Equivalent to `new()`, kept as a separate
    /// method so callers can re-initialize in place.
    pub fn init(&mut self) {
        self.sessions = [Session::default(); MAX_SESSIONS];
    }

    fn find_active(&mut self, key: SessionKey) -> Option<usize> {
        self.sessions
            .iter()
            .position(|s| s.active && s.key == key)
    }

    /// Session-table lookup: reuse an active match, else the first free
    /// slot, else evict the slot with the oldest `last_timestamp` (LRU).
    fn find_or_create(&mut self, key: SessionKey, now: TimestampUs) -> usize {
        if let Some(idx) = self.find_active(key) {
            return idx;
        }

        let slot = self
            .sessions
            .iter()
            .position(|s| !s.active)
            .unwrap_or_else(|| {
                self.sessions
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, s)| s.last_timestamp)
                    .map(|(i, _)| i)
                    .expect("session table is never empty")
            });

        self.sessions[slot] = Session {
            active: true,
            key,
            sequence_number: 1,
            total_length: 0,
            received_length: 0,
            data: [0u8; MAX_PAYLOAD_LEN],
            last_timestamp: now,
        };
        slot
    }

    /// Offers one CAN-frame payload (already address-filtered by the
    /// caller) to the reassembly engine. Returns the completed payload when
    /// this frame was the one that finished a session.
    pub fn offer_frame(
        &mut self,
        key: SessionKey,
        payload: &[u8],
        now: TimestampUs,
    ) -> (FrameOutcome, Option<CompletedPayload>) {
        if payload.is_empty() {
            return (FrameOutcome::NotIsoTp, None);
        }

        let pci = payload[0] >> 4;
        match pci {
            PCI_SINGLE_FRAME => (FrameOutcome::Pending, self.on_single_frame(key, payload, now)),
            PCI_FIRST_FRAME => {
                self.on_first_frame(key, payload, now);
                (FrameOutcome::Pending, None)
            }
            PCI_CONSECUTIVE_FRAME => self.on_consecutive_frame(key, payload, now),
            PCI_FLOW_CONTROL => (FrameOutcome::Pending, None),
            _ => (FrameOutcome::NotIsoTp, None),
        }
    }

    fn on_single_frame(
        &mut self,
        key: SessionKey,
        payload: &[u8],
        now: TimestampUs,
    ) -> Option<CompletedPayload> {
        let length = payload[0] & 0x0F;
        if length == 0 || length as usize > payload.len().saturating_sub(1) || length > 7 {
            return None;
        }

        let idx = self.find_or_create(key, now);
        let session = &mut self.sessions[idx];
        session.total_length = length as u16;
        session.received_length = length as u16;
        session.last_timestamp = now;
        session.data[..length as usize].copy_from_slice(&payload[1..1 + length as usize]);

        let completed = complete(session);
        session.active = false;
        Some(completed)
    }

    fn on_first_frame(&mut self, key: SessionKey, payload: &[u8], now: TimestampUs) {
        if payload.len() < 8 {
            return; // ShortPayload: not enough bytes for the FF header + 6 data bytes
        }

        let total_length = (((payload[0] & 0x0F) as u16) << 8) | payload[1] as u16;
        if total_length <= 7 {
            return; // malformed: should have been a Single Frame
        }

        let idx = self.find_or_create(key, now);
        let session = &mut self.sessions[idx];
        session.total_length = total_length.min(MAX_PAYLOAD_LEN as u16);
        session.received_length = 6;
        session.sequence_number = 1;
        session.last_timestamp = now;
        session.data[..6].copy_from_slice(&payload[2..8]);
    }

    fn on_consecutive_frame(
        &mut self,
        key: SessionKey,
        payload: &[u8],
        now: TimestampUs,
    ) -> (FrameOutcome, Option<CompletedPayload>) {
        let Some(idx) = self.find_active(key) else {
            return (FrameOutcome::Pending, None);
        };

        let sequence = payload[0] & 0x0F;
        if self.sessions[idx].sequence_number != sequence {
            return (FrameOutcome::Pending, None); // SequenceMismatch: drop, session preserved
        }

        let session = &mut self.sessions[idx];
        let remaining = session.total_length - session.received_length;
        let available = (payload.len() - 1) as u16;
        let to_copy = remaining.min(7).min(available) as usize;

        if to_copy > 0 {
            let start = session.received_length as usize;
            session.data[start..start + to_copy].copy_from_slice(&payload[1..1 + to_copy]);
            session.received_length += to_copy as u16;
        }
        session.sequence_number = (session.sequence_number + 1) & 0x0F;
        session.last_timestamp = now;

        if session.received_length >= session.total_length {
            let completed = complete(session);
            session.active = false;
            (FrameOutcome::Pending, Some(completed))
        } else {
            (FrameOutcome::Pending, None)
        }
    }

    /// Reclaims any session idle for more than `SESSION_TIMEOUT_US`.
    pub fn tick(&mut self, now: TimestampUs) {
        for session in &mut self.sessions {
            if session.active
                && crate::types::elapsed(now, session.last_timestamp) > SESSION_TIMEOUT_US
            {
                session.active = false;
            }
        }
    }

    /// True if any slot currently holds an active session for `key`.
    #[cfg(test)]
    fn has_active(&self, key: SessionKey) -> bool {
        self.sessions.iter().any(|s| s.active && s.key == key)
    }

    #[cfg(test)]
    fn active_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.active).count()
    }
}

fn complete(session: &Session) -> CompletedPayload {
    CompletedPayload {
        key: session.key,
        timestamp: session.last_timestamp,
        data: session.data,
        len: session.received_length,
    }
}
