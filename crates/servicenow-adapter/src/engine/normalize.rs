//! Response normalization
//!
//! Turns raw table API responses into [`ChangeRecord`]s. Hibernation is
//! classified by the caller before these functions run.

use serde_json::{Map, Value};

use crate::connector::RawResponse;
use crate::contracts::{ChangeRecord, RecordSetEnvelope};
use crate::error::{AdapterError, Result};

fn body(response: &RawResponse) -> Result<&str> {
    response
        .body
        .as_deref()
        .ok_or_else(|| AdapterError::malformed("response carried no body"))
}

/// Normalize a multi-record read
pub fn normalize_read(response: &RawResponse) -> Result<Vec<ChangeRecord>> {
    let envelope: RecordSetEnvelope<Vec<Map<String, Value>>> =
        serde_json::from_str(body(response)?)?;

    envelope
        .result
        .into_iter()
        .map(ChangeRecord::from_raw)
        .collect()
}

/// Normalize a single-record create
pub fn normalize_create(response: &RawResponse) -> Result<ChangeRecord> {
    let envelope: RecordSetEnvelope<Map<String, Value>> = serde_json::from_str(body(response)?)?;
    ChangeRecord::from_raw(envelope.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{is_denied, DENIED_FIELDS};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_read_scenario() {
        let response = RawResponse::ok(
            json!({"result": [{"sys_id": "a1", "number": "CHG01", "state": "3", "short_description": "x"}]})
                .to_string(),
        );

        let records = normalize_read(&response).unwrap();
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"change_ticket_key": "a1", "change_ticket_number": "CHG01"}])
        );
    }

    #[test]
    fn test_read_empty_result() {
        let records = normalize_read(&RawResponse::ok(r#"{"result": []}"#)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_normalizes_every_record() {
        let response = RawResponse::ok(
            json!({"result": [
                {"sys_id": "a1", "number": "CHG01", "risk": "3"},
                {"sys_id": "a2", "number": "CHG02", "risk": "2"}
            ]})
            .to_string(),
        );

        let records = normalize_read(&response).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.fields.is_empty()));
        assert_eq!(records[1].change_ticket_key, "a2");
    }

    #[test]
    fn test_read_rejects_wrong_shapes() {
        for body in [
            "not json",
            r#"{"records": []}"#,
            r#"{"result": {"sys_id": "a1", "number": "CHG01"}}"#,
            r#"{"result": ["a1"]}"#,
        ] {
            let err = normalize_read(&RawResponse::ok(body)).unwrap_err();
            assert!(
                matches!(err, AdapterError::MalformedResponse(_)),
                "body {} gave {:?}",
                body,
                err
            );
        }
        assert!(normalize_read(&RawResponse::empty(200)).is_err());
    }

    #[test]
    fn test_create_scenario() {
        let response = RawResponse::new(
            201,
            json!({"result": {"sys_id": "b2", "number": "CHG02"}}).to_string(),
        );

        let record = normalize_create(&response).unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"change_ticket_key": "b2", "change_ticket_number": "CHG02"})
        );
    }

    #[test]
    fn test_create_rejects_sequence() {
        let response = RawResponse::ok(r#"{"result": [{"sys_id": "b2", "number": "CHG02"}]}"#);
        assert!(matches!(
            normalize_create(&response),
            Err(AdapterError::MalformedResponse(_))
        ));
    }

    fn field_name() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(DENIED_FIELDS).prop_map(str::to_string),
            "[a-z_]{1,16}",
        ]
    }

    proptest! {
        #[test]
        fn prop_create_keeps_only_allowed_fields(
            fields in prop::collection::hash_map(field_name(), "[a-zA-Z0-9 ]{0,12}", 0..24)
        ) {
            let mut record = Map::new();
            for (name, value) in &fields {
                record.insert(name.clone(), Value::String(value.clone()));
            }
            record.insert("sys_id".to_string(), json!("k1"));
            record.insert("number".to_string(), json!("CHG09"));

            let response = RawResponse::ok(json!({"result": record}).to_string());
            let normalized = normalize_create(&response).unwrap();

            prop_assert_eq!(normalized.change_ticket_key.as_str(), "k1");
            prop_assert_eq!(normalized.change_ticket_number.as_str(), "CHG09");
            for name in normalized.fields.keys() {
                prop_assert!(!is_denied(name));
                prop_assert!(name != "sys_id" && name != "number");
            }
            for (name, value) in &fields {
                let reserved = ["sys_id", "number", "change_ticket_key", "change_ticket_number"];
                if !is_denied(name) && !reserved.contains(&name.as_str()) {
                    prop_assert_eq!(normalized.field(name), Some(&Value::String(value.clone())));
                }
            }
        }
    }
}
