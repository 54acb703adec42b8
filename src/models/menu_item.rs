use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::truthy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    /// The sheet may hold `1`, `"yes"` or `true` here; anything truthy counts.
    #[serde(default, deserialize_with = "truthy::deserialize")]
    pub is_available: bool,
    /// Remote keys with no field of their own, written back as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: String::new(),
            is_available: true,
            extra: Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.is_available = available;
        self
    }
}
