//! Serialization of payloads and sequence slots (`serde` feature).

#![cfg(feature = "serde")]

use obseq::{ChangeEvent, EventKind, ObservableSeq, obseq};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn payload_serializes_with_type_field() {
    let ev = ChangeEvent::new(EventKind::Remove, vec![Some(1), None]);
    let value = serde_json::to_value(&ev).unwrap();
    assert_eq!(value, json!({ "type": "remove", "items": [1, null] }));
}

#[test]
fn payload_deserializes() {
    let ev: ChangeEvent<String> =
        serde_json::from_value(json!({ "type": "insert", "items": ["a"] })).unwrap();
    assert_eq!(ev, ChangeEvent::from_values(EventKind::Insert, ["a".to_string()]));
}

#[test]
fn sequence_serializes_slots_only() {
    let mut seq = obseq![1, 2];
    seq.on(EventKind::Change, |_, _| {});
    seq.set(3, 4).unwrap();

    let text = serde_json::to_string(&seq).unwrap();
    assert_eq!(text, "[1,2,null,4]");

    let back: ObservableSeq<i32> = serde_json::from_str(&text).unwrap();
    assert_eq!(back.as_slice(), seq.as_slice());
    assert_eq!(back.listener_count(EventKind::Change), 0);
}
