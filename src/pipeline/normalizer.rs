use crate::domain::draft::PropertyDraft;
use crate::domain::field::{CandidateSet, FieldKind, FieldValue, TargetField, Tier};
use crate::pipeline::coerce::{coerce_count, coerce_time};

/// Merge all tiers into a complete draft.
///
/// For each field the first valid candidate in `Tier::PRIORITY` order wins;
/// fields without one keep the draft default.
pub fn normalize(candidates: &CandidateSet) -> PropertyDraft {
    let mut draft = PropertyDraft::default();
    for field in TargetField::ALL {
        if let Some(value) = winning_value(candidates, field) {
            apply(&mut draft, field, value);
        }
    }
    draft
}

/// The first candidate that survives validation, scanning tiers by priority.
pub fn winning_value(candidates: &CandidateSet, field: TargetField) -> Option<FieldValue> {
    Tier::PRIORITY.iter().find_map(|tier| {
        candidates
            .for_field(field, *tier)
            .find_map(|candidate| validate(field.kind(), &candidate.value))
    })
}

fn validate(kind: FieldKind, value: &FieldValue) -> Option<FieldValue> {
    match (kind, value) {
        (FieldKind::Text, FieldValue::Text(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| FieldValue::Text(s.to_string()))
        }
        (FieldKind::Text, FieldValue::List(items)) => {
            let items = clean_list(items);
            (!items.is_empty()).then(|| FieldValue::Text(items.join("\n")))
        }
        (FieldKind::Time, FieldValue::Text(s)) => coerce_time(s).map(FieldValue::Text),
        (FieldKind::Count, FieldValue::Text(s)) => coerce_count(s).map(FieldValue::Text),
        (FieldKind::List, FieldValue::List(items)) => {
            let items = clean_list(items);
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
        (FieldKind::Flag, FieldValue::Flag(b)) => Some(FieldValue::Flag(*b)),
        _ => None,
    }
}

/// Trimmed, non-empty, de-duplicated, in first-seen order.
fn clean_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

fn apply(draft: &mut PropertyDraft, field: TargetField, value: FieldValue) {
    match value {
        FieldValue::Text(text) => match field {
            TargetField::Name => draft.name = text,
            TargetField::Description => draft.description = text,
            TargetField::Address => draft.address = text,
            TargetField::CheckInTime => draft.check_in_time = text,
            TargetField::CheckOutTime => draft.check_out_time = text,
            TargetField::HouseRules => draft.house_rules = text,
            TargetField::HostName => draft.host_name = text,
            TargetField::Floor => draft.floor = Some(text),
            TargetField::DoorCode => draft.door_code = Some(text),
            TargetField::MaxGuests => draft.max_guests = Some(text),
            TargetField::ParkingInfo => draft.parking_info = Some(text),
            TargetField::PublicTransport => draft.public_transport = Some(text),
            TargetField::NearbyShops => draft.nearby_shops = Some(text),
            TargetField::Restaurants => draft.restaurants = Some(text),
            TargetField::WifiName => draft.wifi_name = Some(text),
            TargetField::KitchenEquipment => draft.kitchen_equipment = Some(text),
            TargetField::Amenities
            | TargetField::PetsAllowed
            | TargetField::SmokingAllowed
            | TargetField::PartiesAllowed => {}
        },
        FieldValue::List(items) => {
            if field == TargetField::Amenities {
                draft.amenities = items;
            }
        }
        FieldValue::Flag(flag) => match field {
            TargetField::PetsAllowed => draft.pets_allowed = flag,
            TargetField::SmokingAllowed => draft.smoking_allowed = flag,
            TargetField::PartiesAllowed => draft.parties_allowed = flag,
            _ => {}
        },
    }
}
