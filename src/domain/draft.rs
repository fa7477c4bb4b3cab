use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "New property";
pub const DEFAULT_DESCRIPTION: &str = "Description to complete";
pub const DEFAULT_ADDRESS: &str = "Address to complete";
pub const DEFAULT_CHECK_IN: &str = "15:00";
pub const DEFAULT_CHECK_OUT: &str = "11:00";
pub const DEFAULT_HOST_NAME: &str = "Host";

/// The always-complete output of an import, shaped like the property
/// creation payload. A host reviews and corrects it before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub name: String,
    pub description: String,
    pub address: String,
    pub floor: Option<String>,
    pub door_code: Option<String>,
    pub max_guests: Option<String>,
    pub amenities: Vec<String>,
    pub check_in_time: String,
    pub check_out_time: String,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub parties_allowed: bool,
    pub house_rules: String,
    pub parking_info: Option<String>,
    pub public_transport: Option<String>,
    pub nearby_shops: Option<String>,
    pub restaurants: Option<String>,
    pub wifi_name: Option<String>,
    pub kitchen_equipment: Option<String>,
    pub host_name: String,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.into(),
            description: DEFAULT_DESCRIPTION.into(),
            address: DEFAULT_ADDRESS.into(),
            floor: None,
            door_code: None,
            max_guests: None,
            amenities: Vec::new(),
            check_in_time: DEFAULT_CHECK_IN.into(),
            check_out_time: DEFAULT_CHECK_OUT.into(),
            pets_allowed: false,
            smoking_allowed: false,
            parties_allowed: false,
            house_rules: String::new(),
            parking_info: None,
            public_transport: None,
            nearby_shops: None,
            restaurants: None,
            wifi_name: None,
            kitchen_equipment: None,
            host_name: DEFAULT_HOST_NAME.into(),
        }
    }
}
