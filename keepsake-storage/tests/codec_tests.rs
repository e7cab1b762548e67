use keepsake_storage::{Codec, JsonCodec, StorageError};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Encoding ─────────────────────────────────────────────────────

#[test]
fn default_is_pretty() {
    assert!(JsonCodec::default().is_pretty());
    assert!(!JsonCodec::compact().is_pretty());
}

#[test]
fn pretty_output_is_indented() {
    let bytes = JsonCodec::pretty()
        .encode(&json!([{"Id": 1, "Name": "Alphons"}]))
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains('\n'));
    assert!(text.contains("  \"Name\": \"Alphons\""));
}

#[test]
fn compact_output_is_single_line() {
    let bytes = JsonCodec::compact().encode(&json!([{"Id": 1}])).unwrap();
    assert_eq!(bytes, br#"[{"Id":1}]"#);
}

#[test]
fn encode_rejects_non_array() {
    let err = JsonCodec::default().encode(&json!({"Id": 1})).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

// ── Decoding ─────────────────────────────────────────────────────

#[test]
fn decode_roundtrips_encode() {
    let codec = JsonCodec::pretty();
    let records = json!([{"Id": 1, "Name": "Alphons"}, {"Id": 2, "Name": "Annet"}]);
    let decoded = codec.decode(&codec.encode(&records).unwrap()).unwrap();
    assert_eq!(decoded, records);
}

#[test]
fn decode_empty_file_is_empty_array() {
    let codec = JsonCodec::default();
    assert_eq!(codec.decode(b"").unwrap(), json!([]));
    assert_eq!(codec.decode(b" \n\t").unwrap(), json!([]));
}

#[test]
fn decode_null_is_empty_array() {
    assert_eq!(JsonCodec::default().decode(b"null").unwrap(), json!([]));
}

#[test]
fn decode_malformed_is_serialization_error() {
    let err = JsonCodec::default().decode(b"[{\"Id\": 1,").unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[test]
fn decode_object_is_invalid_data() {
    let err = JsonCodec::default().decode(br#"{"Id": 1}"#).unwrap_err();
    match err {
        StorageError::InvalidData(msg) => assert!(msg.contains("an object")),
        other => panic!("unexpected error: {other}"),
    }
}
