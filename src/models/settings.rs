use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::truthy;

/// Identifier of the one settings record.
pub const SETTINGS_ID: &str = "settings-1";

/// Shop, tax and printer configuration. There is only ever one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub shop_name: String,
    pub shop_address: String,
    #[serde(rename = "shopGST")]
    pub shop_gst: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_email: Option<String>,
    pub cgst_rate: f64,
    pub sgst_rate: f64,
    pub currency: String,
    pub printer_format: String,
    pub theme: String,
    #[serde(deserialize_with = "truthy::deserialize")]
    pub auto_sync: bool,
    pub google_sheets_url: String,
    /// Keys this client does not model, kept so settings move wholesale.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            shop_name: "My Restaurant".to_string(),
            shop_address: String::new(),
            shop_gst: String::new(),
            shop_phone: None,
            shop_email: None,
            cgst_rate: 2.5,
            sgst_rate: 2.5,
            currency: "₹".to_string(),
            printer_format: "80mm".to_string(),
            theme: "dark".to_string(),
            auto_sync: false,
            google_sheets_url: String::new(),
            extra: Map::new(),
        }
    }
}
