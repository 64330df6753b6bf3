use super::*;

#[test]
fn classifies_read_data_by_identifier_request() {
    let msg = classify(&[0x22, 0xF1, 0x90], 100);
    assert_eq!(msg.service_id, SID_READ_DATA_BY_IDENTIFIER);
    assert!(!msg.is_response);
    assert!(!msg.is_negative_response);
    assert_eq!(msg.data_identifier, Some(DID_VIN));
    assert!(msg.data().is_empty());
}

#[test]
fn classifies_read_data_by_identifier_response() {
    let msg = classify(&[0x62, 0xF1, 0x90, b'5', b'N', b'P'], 100);
    assert_eq!(msg.service_id, SID_READ_DATA_BY_IDENTIFIER);
    assert!(msg.is_response);
    assert!(!msg.is_negative_response);
    assert_eq!(msg.data_identifier, Some(DID_VIN));
    assert_eq!(msg.data(), &[b'5', b'N', b'P']);
}

#[test]
fn classifies_negative_response() {
    let msg = classify(&[0x7F, 0x22, 0x31], 100);
    // Ground truth (`parse_and_callback_uds_message`) leaves `is_response`
    // at its zero-init `false` for the 0x7F branch; only `is_negative_response`
    // is set.
    assert!(!msg.is_response);
    assert!(msg.is_negative_response);
    assert_eq!(msg.service_id, SID_READ_DATA_BY_IDENTIFIER);
    assert_eq!(msg.negative_response_code, Some(0x31));
}

#[test]
fn classifies_tester_present_with_no_did() {
    let msg = classify(&[0x3E, 0x00], 100);
    assert_eq!(msg.service_id, SID_TESTER_PRESENT);
    assert!(!msg.is_response);
    assert_eq!(msg.data_identifier, None);
    assert_eq!(msg.data(), &[0x00]);
}

#[test]
fn classifies_write_data_by_identifier_request() {
    let msg = classify(&[0x2E, 0xF1, 0x90, 1, 2, 3], 100);
    assert_eq!(msg.service_id, SID_WRITE_DATA_BY_IDENTIFIER);
    assert!(!msg.is_response);
    assert_eq!(msg.data_identifier, Some(DID_VIN));
    assert_eq!(msg.data(), &[1, 2, 3]);
}

#[test]
fn short_read_data_by_identifier_has_no_did() {
    // Only one byte after the SID: not enough for a DID, must not panic.
    let msg = classify(&[0x22, 0xF1], 100);
    assert_eq!(msg.data_identifier, None);
}

#[test]
fn name_lookups_cover_known_codes() {
    assert_eq!(service_name(SID_READ_DATA_BY_IDENTIFIER), "ReadDataByIdentifier");
    assert_eq!(did_name(DID_VIN), "VIN");
    assert_eq!(did_name(0xF195), "VendorSpecific");
    assert_eq!(nrc_name(0x31), "RequestOutOfRange");
    assert_eq!(service_name(0xAB), "Unknown");
}
