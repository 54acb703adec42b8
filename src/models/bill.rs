use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::payment_method::PaymentMethod;
use super::{text, truthy};

/// One cart line on a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

impl BillItem {
    pub fn new(
        menu_item_id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            price,
            quantity,
            subtotal: price * f64::from(quantity),
        }
    }
}

/// A saved bill.
///
/// `synced_to_cloud` records whether the local copy has been pushed since its
/// last local change. The remote sheet stores it as `1`/`0`, so it is read
/// leniently and always written back as a bool.
///
/// Keys this client does not model are kept in `extra` and written back
/// untouched, so a pulled bill pushes out the way it came in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    /// Zero-padded display number, e.g. `"07"`.
    #[serde(default, deserialize_with = "text::deserialize")]
    pub bill_number: String,
    #[serde(default)]
    pub items: Vec<BillItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub cgst: f64,
    #[serde(default)]
    pub sgst: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bill_date: String,
    #[serde(default, deserialize_with = "truthy::deserialize")]
    pub synced_to_cloud: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bill {
    /// A new, unsynced bill dated today (`dd/mm/yyyy`). The number is
    /// padded to at least two digits.
    pub fn new(id: impl Into<String>, number: u64) -> Self {
        let today = Local::now().format("%d/%m/%Y").to_string();
        Self {
            id: id.into(),
            bill_number: format!("{:02}", number),
            items: Vec::new(),
            subtotal: 0.0,
            cgst: 0.0,
            sgst: 0.0,
            total: 0.0,
            payment_method: PaymentMethod::default(),
            customer_name: None,
            customer_phone: None,
            created_by: String::new(),
            created_by_name: String::new(),
            created_at: today.clone(),
            bill_date: today,
            synced_to_cloud: false,
            extra: Map::new(),
        }
    }

    /// Replaces the line items and recomputes subtotal and total.
    /// Tax amounts are left as they are.
    pub fn with_items(mut self, items: Vec<BillItem>) -> Self {
        self.subtotal = items.iter().map(|i| i.subtotal).sum();
        self.total = self.subtotal + self.cgst + self.sgst;
        self.items = items;
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn with_synced(mut self, synced: bool) -> Self {
        self.synced_to_cloud = synced;
        self
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({} item{}, total {:.2}, {})",
            self.bill_number,
            self.id,
            self.items.len(),
            if self.items.len() == 1 { "" } else { "s" },
            self.total,
            if self.synced_to_cloud { "synced" } else { "unsynced" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_new_is_unsynced() {
        let bill = Bill::new("bill-1", 7);
        assert_eq!(bill.id, "bill-1");
        assert_eq!(bill.bill_number, "07");
        assert!(!bill.synced_to_cloud);
        assert!(bill.items.is_empty());
    }

    #[test]
    fn test_with_items_recomputes_totals() {
        let bill = Bill::new("bill-1", 1).with_items(vec![
            BillItem::new("m1", "Tea", 10.0, 2),
            BillItem::new("m2", "Samosa", 15.0, 1),
        ]);
        assert_eq!(bill.subtotal, 35.0);
        assert_eq!(bill.total, 35.0);
    }

    #[test]
    fn test_synced_flag_accepts_numbers() {
        let json = r#"{"id":"bill-9","syncedToCloud":1}"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert!(bill.synced_to_cloud);

        let json = r#"{"id":"bill-9","syncedToCloud":0}"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert!(!bill.synced_to_cloud);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let bill = Bill::new("bill-1", 3).with_synced(true);
        let value = serde_json::to_value(&bill).unwrap();
        assert_eq!(value["billNumber"], "03");
        assert_eq!(value["syncedToCloud"], true);
        assert!(value.get("customerName").is_none());
    }

    #[test]
    fn test_bill_requires_id() {
        let result: Result<Bill, _> = serde_json::from_str(r#"{"billNumber":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_billing_screen_record_decodes() {
        let json = r#"{
            "id": "bill-1700000000000",
            "billNumber": "01",
            "items": [{"menuItemId": "m1", "name": "Tea", "price": 10, "quantity": 2, "subtotal": 20}],
            "subtotal": 20, "cgst": 0.5, "sgst": 0.5, "total": 21,
            "createdBy": "u1", "createdByName": "Ravi",
            "createdAt": "19/10/2026", "billDate": "19/10/2026",
            "paymentMethod": "cash", "syncedToCloud": false
        }"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.bill_number, "01");
        assert_eq!(bill.total, 21.0);
        assert_eq!(bill.created_at, "19/10/2026");
        assert!(bill.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = r#"{"id":"b1","billNumber":"04","paymentMethod":"wallet","tableNo":4}"#;
        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.extra["tableNo"], 4);

        let value = serde_json::to_value(&bill).unwrap();
        assert_eq!(value["tableNo"], 4);
        assert_eq!(value["paymentMethod"], "wallet");
        assert_eq!(value["billNumber"], "04");
        assert!(value.get("createdBy").is_none());
    }

    #[test]
    fn test_display() {
        let bill = Bill::new("bill-1", 5).with_items(vec![BillItem::new("m1", "Tea", 10.0, 1)]);
        assert_eq!(bill.to_string(), "#05 bill-1 (1 item, total 10.00, unsynced)");
    }
}
