//! UDS (ISO 14229) classifier: turns a reassembled ISO-TP payload into a
//! typed `UdsMessage`. Pure, stateless, and independent of the reassembler —
//! `classify` can be fuzzed or property-tested without any session state.

use crate::isotp::MAX_PAYLOAD_LEN;
use crate::types::TimestampUs;

pub const SID_DIAGNOSTIC_SESSION_CONTROL: u8 = 0x10;
pub const SID_ECU_RESET: u8 = 0x11;
pub const SID_CLEAR_DIAGNOSTIC_INFORMATION: u8 = 0x14;
pub const SID_READ_DTC_INFORMATION: u8 = 0x19;
pub const SID_READ_DATA_BY_IDENTIFIER: u8 = 0x22;
pub const SID_SECURITY_ACCESS: u8 = 0x27;
pub const SID_WRITE_DATA_BY_IDENTIFIER: u8 = 0x2E;
pub const SID_ROUTINE_CONTROL: u8 = 0x31;
pub const SID_TESTER_PRESENT: u8 = 0x3E;

const RESPONSE_POSITIVE_OFFSET: u8 = 0x40;
const RESPONSE_NEGATIVE: u8 = 0x7F;

pub const DID_VIN: u16 = 0xF190;
pub const DID_ECU_SOFTWARE_NUMBER: u16 = 0xF188;
pub const DID_ECU_SOFTWARE_VERSION: u16 = 0xF189;
pub const DID_ECU_HARDWARE_NUMBER: u16 = 0xF191;
pub const DID_ECU_SERIAL_NUMBER: u16 = 0xF18C;
pub const DID_ACTIVE_DIAGNOSTIC_SESSION: u16 = 0xF186;
/// Vendor long-form software-version request, outside the standard vendor
/// range but still of interest to the fingerprint resolver.
pub const DID_VENDOR_LONG_FORM_VERSION: u16 = 0xF100;

/// A classified UDS message.
#[derive(Debug, Clone)]
pub struct UdsMessage {
    /// The original request service ID, never the `+0x40` response form.
    pub service_id: u8,
    pub is_response: bool,
    pub is_negative_response: bool,
    pub negative_response_code: Option<u8>,
    /// Present only for `ReadDataByIdentifier`/`WriteDataByIdentifier`.
    pub data_identifier: Option<u16>,
    pub timestamp: TimestampUs,
    data: [u8; MAX_PAYLOAD_LEN],
    len: u16,
}

impl UdsMessage {
    /// The message body, excluding service ID / NRC / DID framing bytes.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// Classifies a reassembled ISO-TP payload into a typed UDS message.
///
/// `payload` must be non-empty; an empty payload should never reach this
/// function (the reassembler only completes sessions with
/// `received_length >= 1`).
pub fn classify(payload: &[u8], timestamp: TimestampUs) -> UdsMessage {
    debug_assert!(!payload.is_empty());

    let b0 = payload[0];

    if b0 == RESPONSE_NEGATIVE && payload.len() >= 3 {
        return negative_response(payload, timestamp);
    }

    let (is_response, service_id) = if b0 >= RESPONSE_POSITIVE_OFFSET {
        (true, b0 - RESPONSE_POSITIVE_OFFSET)
    } else {
        (false, b0)
    };

    let has_did = matches!(
        service_id,
        SID_READ_DATA_BY_IDENTIFIER | SID_WRITE_DATA_BY_IDENTIFIER
    ) && payload.len() >= 3;

    let (data_identifier, body) = if has_did {
        let did = u16::from_be_bytes([payload[1], payload[2]]);
        (Some(did), &payload[3.min(payload.len())..])
    } else {
        (None, &payload[1..])
    };

    UdsMessage {
        service_id,
        is_response,
        is_negative_response: false,
        negative_response_code: None,
        data_identifier,
        timestamp,
        data: copy_truncated(body),
        len: body.len().min(MAX_PAYLOAD_LEN) as u16,
    }
}

fn negative_response(payload: &[u8], timestamp: TimestampUs) -> UdsMessage {
    let body = &payload[3..];
    UdsMessage {
        service_id: payload[1],
        is_response: false,
        is_negative_response: true,
        negative_response_code: Some(payload[2]),
        data_identifier: None,
        timestamp,
        data: copy_truncated(body),
        len: body.len().min(MAX_PAYLOAD_LEN) as u16,
    }
}

fn copy_truncated(body: &[u8]) -> [u8; MAX_PAYLOAD_LEN] {
    let mut data = [0u8; MAX_PAYLOAD_LEN];
    let len = body.len().min(MAX_PAYLOAD_LEN);
    data[..len].copy_from_slice(&body[..len]);
    data
}

/// Human-readable service name, for a caller's own diagnostics/logging — not
/// used internally.
pub fn service_name(service_id: u8) -> &'static str {
    match service_id {
        SID_DIAGNOSTIC_SESSION_CONTROL => "DiagnosticSessionControl",
        SID_ECU_RESET => "EcuReset",
        SID_CLEAR_DIAGNOSTIC_INFORMATION => "ClearDiagnosticInformation",
        SID_READ_DTC_INFORMATION => "ReadDtcInformation",
        SID_READ_DATA_BY_IDENTIFIER => "ReadDataByIdentifier",
        SID_SECURITY_ACCESS => "SecurityAccess",
        SID_WRITE_DATA_BY_IDENTIFIER => "WriteDataByIdentifier",
        SID_ROUTINE_CONTROL => "RoutineControl",
        SID_TESTER_PRESENT => "TesterPresent",
        _ => "Unknown",
    }
}

/// Human-readable DID name, for a caller's own diagnostics/logging.
pub fn did_name(did: u16) -> &'static str {
    match did {
        DID_VIN => "VIN",
        DID_ECU_SOFTWARE_NUMBER => "EcuSoftwareNumber",
        DID_ECU_SOFTWARE_VERSION => "EcuSoftwareVersion",
        DID_ECU_HARDWARE_NUMBER => "EcuHardwareNumber",
        DID_ECU_SERIAL_NUMBER => "EcuSerialNumber",
        DID_ACTIVE_DIAGNOSTIC_SESSION => "ActiveDiagnosticSession",
        0xF180..=0xF19F => "VendorSpecific",
        _ => "Unknown",
    }
}

/// Human-readable negative response code name, for a caller's own
/// diagnostics/logging.
pub fn nrc_name(nrc: u8) -> &'static str {
    match nrc {
        0x10 => "GeneralReject",
        0x11 => "ServiceNotSupported",
        0x12 => "SubFunctionNotSupported",
        0x13 => "IncorrectMessageLength",
        0x22 => "ConditionsNotCorrect",
        0x24 => "RequestSequenceError",
        0x31 => "RequestOutOfRange",
        0x33 => "SecurityAccessDenied",
        0x35 => "InvalidKey",
        0x36 => "ExceededNumberOfAttempts",
        0x78 => "ResponsePending",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests;
