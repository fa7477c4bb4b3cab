use serde_json::Value;
use tracing::debug;

use crate::adapters::extraction::deep_resolver::{
    ExpectedType, LABEL_KEYS, find_listing_node, resolve_scoped,
};
use crate::adapters::shared::strip_html_tags;
use crate::domain::field::{CandidateSet, FieldKind, FieldValue, TargetField, Tier};

struct Lookup {
    synonyms: &'static [&'static str],
    expected: ExpectedType,
}

/// Keys read verbatim from the listing node before any fragment search.
fn exact_keys(field: TargetField) -> &'static [&'static str] {
    match field {
        TargetField::Name => &["name", "title"],
        TargetField::Description => &["description", "summary", "p3_summary_description"],
        TargetField::Address => &["publicAddress", "address"],
        TargetField::MaxGuests => &["personCapacity", "accommodates"],
        TargetField::Amenities => &["amenities", "listing_amenities"],
        TargetField::CheckInTime => &["checkInTime", "check_in_time_start"],
        TargetField::CheckOutTime => &["checkOutTime", "check_out_time"],
        TargetField::HouseRules => &["houseRules", "rules", "house_rules"],
        TargetField::HostName => &["hostName"],
        _ => &[],
    }
}

/// Ordered lookups per field. The first lookup producing a usable value wins.
fn lookups(field: TargetField) -> &'static [Lookup] {
    use ExpectedType::{Array, Bool, Number, Object, Text};
    match field {
        TargetField::Name => &[Lookup {
            synonyms: &["name", "listingName", "title", "p3_summary_title"],
            expected: Text,
        }],
        TargetField::Description => &[Lookup {
            synonyms: &["description", "listingDescription", "summary"],
            expected: Text,
        }],
        TargetField::Address => &[
            Lookup {
                synonyms: &["address", "publicAddress", "structuredAddress"],
                expected: Text,
            },
            Lookup { synonyms: &["location"], expected: Text },
            Lookup { synonyms: &["location", "address"], expected: Object },
        ],
        TargetField::Floor => &[
            Lookup { synonyms: &["floorNumber", "floor"], expected: Text },
            Lookup { synonyms: &["floorNumber", "floor"], expected: Number },
        ],
        TargetField::MaxGuests => &[
            Lookup {
                synonyms: &["maxGuestCapacity", "personCapacity", "guestCount", "accommodates"],
                expected: Number,
            },
            Lookup {
                synonyms: &["maxGuestCapacity", "personCapacity", "accommodates"],
                expected: Text,
            },
        ],
        TargetField::Amenities => &[Lookup {
            synonyms: &["amenities", "listingAmenities"],
            expected: Array,
        }],
        TargetField::CheckInTime => &[
            Lookup { synonyms: &["checkInTime", "check_in_time", "checkin"], expected: Text },
            Lookup { synonyms: &["checkInTime", "check_in_time"], expected: Number },
        ],
        TargetField::CheckOutTime => &[
            Lookup { synonyms: &["checkOutTime", "check_out_time", "checkout"], expected: Text },
            Lookup { synonyms: &["checkOutTime", "check_out_time"], expected: Number },
        ],
        TargetField::PetsAllowed => &[Lookup {
            synonyms: &["petsAllowed", "allowsPets", "pets_allowed"],
            expected: Bool,
        }],
        TargetField::SmokingAllowed => &[Lookup {
            synonyms: &["smokingAllowed", "allowsSmoking", "smoking_allowed"],
            expected: Bool,
        }],
        TargetField::PartiesAllowed => &[Lookup {
            synonyms: &["partiesAllowed", "eventsAllowed", "allowsEvents", "parties_allowed"],
            expected: Bool,
        }],
        TargetField::HouseRules => &[
            Lookup { synonyms: &["houseRules", "house_rules", "rules"], expected: Text },
            Lookup { synonyms: &["houseRules", "house_rules", "rules"], expected: Array },
        ],
        TargetField::WifiName => &[Lookup {
            synonyms: &["wifiName", "wifiNetwork", "wifi_network_name"],
            expected: Text,
        }],
        TargetField::HostName => &[
            Lookup { synonyms: &["hostName", "host_name", "hostFirstName"], expected: Text },
            Lookup { synonyms: &["primaryHost", "host"], expected: Object },
        ],
        TargetField::DoorCode
        | TargetField::ParkingInfo
        | TargetField::PublicTransport
        | TargetField::NearbyShops
        | TargetField::Restaurants
        | TargetField::KitchenEquipment => &[],
    }
}

/// Map a parsed state blob onto field candidates.
pub fn extract(root: &Value) -> CandidateSet {
    let listing = find_listing_node(root);
    let mut set = CandidateSet::new();
    for field in TargetField::ALL {
        let exact = listing.and_then(|node| {
            exact_keys(field)
                .iter()
                .find_map(|key| node.get(*key).and_then(|value| to_field_value(field, value)))
        });
        let found = exact.or_else(|| {
            lookups(field).iter().find_map(|l| {
                resolve_scoped(root, l.synonyms, l.expected)
                    .and_then(|value| to_field_value(field, value))
            })
        });
        if let Some(value) = found {
            set.push(Tier::Structured, field, value);
        }
    }
    debug!(fields = set.len(), "Structured tier finished");
    set
}

fn to_field_value(field: TargetField, value: &Value) -> Option<FieldValue> {
    match (field.kind(), value) {
        (FieldKind::Flag, Value::Bool(b)) => Some(FieldValue::Flag(*b)),
        (FieldKind::List, Value::Array(items)) => {
            let labels = labels(items);
            (!labels.is_empty()).then_some(FieldValue::List(labels))
        }
        (FieldKind::Text | FieldKind::Time | FieldKind::Count, Value::String(s)) => {
            non_blank(strip_html_tags(s))
        }
        (FieldKind::Text | FieldKind::Time | FieldKind::Count, Value::Number(n)) => {
            Some(FieldValue::Text(n.to_string()))
        }
        (FieldKind::Text, Value::Array(items)) => non_blank(labels(items).join("\n")),
        (FieldKind::Text, Value::Object(_)) => match field {
            TargetField::Address => compose_location(value),
            TargetField::HostName => first_string(value, &["name", "firstName", "smartName"])
                .and_then(|s| non_blank(s.to_string())),
            _ => None,
        },
        _ => None,
    }
}

fn non_blank(s: String) -> Option<FieldValue> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| FieldValue::Text(trimmed.to_string()))
}

/// Strings are kept as-is; objects are reduced to their display label.
fn labels(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => first_string(item, LABEL_KEYS),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn first_string<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

/// `city, state, country` from a location object.
fn compose_location(value: &Value) -> Option<FieldValue> {
    let parts: Vec<&str> = ["city", "state", "country"]
        .iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(FieldValue::Text(parts.join(", ")))
}
