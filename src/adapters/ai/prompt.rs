use serde_json::Value;
use tracing::debug;

use crate::adapters::shared::{isolate_json_object, strip_code_fences, truncate_chars};
use crate::domain::field::{FieldKind, FieldValue, PartialRecord, TargetField};
use crate::error::{ImportError, Result};

fn field_hint(field: TargetField) -> &'static str {
    match field {
        TargetField::Name => "listing title",
        TargetField::Description => "full description of the property",
        TargetField::Address => "complete street address",
        TargetField::Floor => "floor or storey",
        TargetField::DoorCode => "door or building access code",
        TargetField::MaxGuests => "maximum number of guests",
        TargetField::Amenities => "list of amenities",
        TargetField::CheckInTime => "check-in time, HH:MM",
        TargetField::CheckOutTime => "check-out time, HH:MM",
        TargetField::PetsAllowed => "whether pets are allowed",
        TargetField::SmokingAllowed => "whether smoking is allowed",
        TargetField::PartiesAllowed => "whether parties or events are allowed",
        TargetField::HouseRules => "house rules",
        TargetField::ParkingInfo => "parking information",
        TargetField::PublicTransport => "nearby public transport",
        TargetField::NearbyShops => "nearby shops",
        TargetField::Restaurants => "nearby restaurants",
        TargetField::WifiName => "wifi network name",
        TargetField::KitchenEquipment => "kitchen equipment",
        TargetField::HostName => "host first name",
    }
}

fn type_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text | FieldKind::Time | FieldKind::Count => "string",
        FieldKind::List => "array of strings",
        FieldKind::Flag => "boolean",
    }
}

/// One line per field: `- key (type): hint`.
pub fn schema_description() -> String {
    TargetField::ALL
        .iter()
        .map(|f| format!("- {} ({}): {}", f.key(), type_name(f.kind()), field_hint(*f)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(page_text: &str, schema_description: &str, max_chars: usize) -> String {
    let text = truncate_chars(page_text, max_chars);
    format!(
        "Extract the details of this rental property listing from the page text below.\n\
         Return a single JSON object with exactly these keys:\n\
         {schema_description}\n\n\
         Use null for any value that is not stated in the text. Do not invent values.\n\
         Return only the JSON object, with no explanation and no markdown.\n\n\
         Page text:\n{text}"
    )
}

/// Parse a model reply into whatever fields it carries.
///
/// Fails only when no JSON object can be recovered. Individual fields of the
/// wrong type are dropped.
pub fn parse_model_reply(reply: &str) -> Result<PartialRecord> {
    let cleaned = strip_code_fences(reply);
    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(_) => {
            let span = isolate_json_object(&cleaned).ok_or_else(|| ImportError::UnparsableResponse {
                reason: "no JSON object in reply".into(),
            })?;
            serde_json::from_str(span).map_err(|e| ImportError::UnparsableResponse {
                reason: e.to_string(),
            })?
        }
    };
    let Value::Object(map) = value else {
        return Err(ImportError::UnparsableResponse {
            reason: "reply is not a JSON object".into(),
        });
    };

    let mut record = PartialRecord::default();
    for (key, raw) in &map {
        let Some(field) = TargetField::from_key(key) else {
            continue;
        };
        match convert(field.kind(), raw) {
            Some(value) => record.insert(field, value),
            None if raw.is_null() => {}
            None => debug!(field = %field, "Ignoring model value of unexpected type"),
        }
    }
    Ok(record)
}

fn convert(kind: FieldKind, raw: &Value) -> Option<FieldValue> {
    match (kind, raw) {
        (FieldKind::Flag, Value::Bool(b)) => Some(FieldValue::Flag(*b)),
        (FieldKind::List, Value::Array(items)) => {
            let list: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            (!list.is_empty()).then_some(FieldValue::List(list))
        }
        (FieldKind::Text | FieldKind::Time | FieldKind::Count, Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| FieldValue::Text(s.to_string()))
        }
        (FieldKind::Text | FieldKind::Time | FieldKind::Count, Value::Number(n)) => {
            Some(FieldValue::Text(n.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_field() {
        let schema = schema_description();
        for field in TargetField::ALL {
            assert!(schema.contains(field.key()), "missing {field}");
        }
        assert!(schema.contains("- amenities (array of strings)"));
        assert!(schema.contains("- petsAllowed (boolean)"));
    }

    #[test]
    fn prompt_caps_page_text() {
        let text = "x".repeat(9000);
        let prompt = build_prompt(&text, "- name (string)", 8000);
        assert!(prompt.contains("- name (string)"));
        assert!(prompt.ends_with(&"x".repeat(8000)));
        assert!(!prompt.contains(&"x".repeat(8001)));
    }

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"name\": \"Loft\", \"checkInTime\": \"16:00\", \"floor\": null}\n```";
        let record = parse_model_reply(reply).unwrap();
        assert_eq!(
            record.get(TargetField::CheckInTime),
            Some(&FieldValue::Text("16:00".into()))
        );
        assert_eq!(record.get(TargetField::Floor), None);
    }

    #[test]
    fn isolates_object_from_prose() {
        let reply = "Sure! Here is the data: {\"address\": \"1 Rue X\"} Hope it helps.";
        let record = parse_model_reply(reply).unwrap();
        assert_eq!(
            record.get(TargetField::Address),
            Some(&FieldValue::Text("1 Rue X".into()))
        );
    }

    #[test]
    fn wrong_types_are_dropped_not_fatal() {
        let reply = r#"{"name": true, "amenities": ["Wifi", 3, " "], "petsAllowed": "yes", "maxGuests": 4, "unknown": 1}"#;
        let record = parse_model_reply(reply).unwrap();
        assert_eq!(record.get(TargetField::Name), None);
        assert_eq!(record.get(TargetField::PetsAllowed), None);
        assert_eq!(
            record.get(TargetField::Amenities),
            Some(&FieldValue::List(vec!["Wifi".into()]))
        );
        assert_eq!(
            record.get(TargetField::MaxGuests),
            Some(&FieldValue::Text("4".into()))
        );
    }

    #[test]
    fn numbers_are_kept_as_text() {
        let reply = r#"{"floor": 3, "doorCode": 1234}"#;
        let record = parse_model_reply(reply).unwrap();
        assert_eq!(
            record.get(TargetField::Floor),
            Some(&FieldValue::Text("3".into()))
        );
        assert_eq!(
            record.get(TargetField::DoorCode),
            Some(&FieldValue::Text("1234".into()))
        );
    }

    #[test]
    fn non_object_reply_is_unparsable() {
        assert!(matches!(
            parse_model_reply("[1, 2]"),
            Err(ImportError::UnparsableResponse { .. })
        ));
        assert!(matches!(
            parse_model_reply("I could not find anything."),
            Err(ImportError::UnparsableResponse { .. })
        ));
        assert!(matches!(
            parse_model_reply(""),
            Err(ImportError::UnparsableResponse { .. })
        ));
    }
}
