use std::collections::BTreeMap;
use std::fmt;

/// Extraction strategies, highest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Structured,
    Dom,
    Ai,
}

impl Tier {
    /// Merge order used by the normalizer.
    pub const PRIORITY: [Tier; 3] = [Tier::Structured, Tier::Dom, Tier::Ai];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Dom => "dom",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Free text coerced to `HH:MM`.
    Time,
    /// Guest capacity, kept as a digit string.
    Count,
    List,
    Flag,
}

/// Every property field the pipeline knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetField {
    Name,
    Description,
    Address,
    Floor,
    DoorCode,
    MaxGuests,
    Amenities,
    CheckInTime,
    CheckOutTime,
    PetsAllowed,
    SmokingAllowed,
    PartiesAllowed,
    HouseRules,
    ParkingInfo,
    PublicTransport,
    NearbyShops,
    Restaurants,
    WifiName,
    KitchenEquipment,
    HostName,
}

impl TargetField {
    pub const ALL: [TargetField; 20] = [
        Self::Name,
        Self::Description,
        Self::Address,
        Self::Floor,
        Self::DoorCode,
        Self::MaxGuests,
        Self::Amenities,
        Self::CheckInTime,
        Self::CheckOutTime,
        Self::PetsAllowed,
        Self::SmokingAllowed,
        Self::PartiesAllowed,
        Self::HouseRules,
        Self::ParkingInfo,
        Self::PublicTransport,
        Self::NearbyShops,
        Self::Restaurants,
        Self::WifiName,
        Self::KitchenEquipment,
        Self::HostName,
    ];

    /// Fields whose absence after the deterministic tiers triggers the AI tier.
    pub const REQUIRED: [TargetField; 3] = [Self::Name, Self::Description, Self::Address];

    /// The camelCase key used by the property schema and the model prompt.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Address => "address",
            Self::Floor => "floor",
            Self::DoorCode => "doorCode",
            Self::MaxGuests => "maxGuests",
            Self::Amenities => "amenities",
            Self::CheckInTime => "checkInTime",
            Self::CheckOutTime => "checkOutTime",
            Self::PetsAllowed => "petsAllowed",
            Self::SmokingAllowed => "smokingAllowed",
            Self::PartiesAllowed => "partiesAllowed",
            Self::HouseRules => "houseRules",
            Self::ParkingInfo => "parkingInfo",
            Self::PublicTransport => "publicTransport",
            Self::NearbyShops => "nearbyShops",
            Self::Restaurants => "restaurants",
            Self::WifiName => "wifiName",
            Self::KitchenEquipment => "kitchenEquipment",
            Self::HostName => "hostName",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::CheckInTime | Self::CheckOutTime => FieldKind::Time,
            Self::MaxGuests => FieldKind::Count,
            Self::Amenities => FieldKind::List,
            Self::PetsAllowed | Self::SmokingAllowed | Self::PartiesAllowed => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidate {
    pub field: TargetField,
    pub value: FieldValue,
    pub tier: Tier,
}

/// All candidates gathered for one import, across tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<ExtractionCandidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tier: Tier, field: TargetField, value: FieldValue) {
        self.candidates.push(ExtractionCandidate { field, value, tier });
    }

    pub fn extend(&mut self, other: CandidateSet) {
        self.candidates.extend(other.candidates);
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractionCandidate> {
        self.candidates.iter()
    }

    /// Candidates for `field` from `tier`, in insertion order.
    pub fn for_field(
        &self,
        field: TargetField,
        tier: Tier,
    ) -> impl Iterator<Item = &ExtractionCandidate> {
        self.candidates
            .iter()
            .filter(move |c| c.field == field && c.tier == tier)
    }

    pub fn has_field(&self, field: TargetField) -> bool {
        self.candidates.iter().any(|c| c.field == field)
    }

    /// Required fields no tier has produced a candidate for yet.
    pub fn missing_required(&self) -> Vec<TargetField> {
        TargetField::REQUIRED
            .into_iter()
            .filter(|field| !self.has_field(*field))
            .collect()
    }
}

/// Fields a single source reported, keyed by field. Produced by the AI tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub values: BTreeMap<TargetField, FieldValue>,
}

impl PartialRecord {
    pub fn insert(&mut self, field: TargetField, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: TargetField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_candidates(self, tier: Tier) -> CandidateSet {
        let mut set = CandidateSet::new();
        for (field, value) in self.values {
            set.push(tier, field, value);
        }
        set
    }
}
