mod bill;
mod menu_item;
mod payment_method;
mod settings;

pub use bill::{Bill, BillItem};
pub use menu_item::MenuItem;
pub use payment_method::PaymentMethod;
pub use settings::{Settings, SETTINGS_ID};

/// Lenient boolean decoding for flags the remote sheet stores as numbers or
/// strings. Follows JavaScript truthiness: `null`, `false`, `0` and `""` are
/// false, everything else is true.
pub(crate) mod truthy {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(is_truthy(&Value::deserialize(deserializer)?))
    }

    pub fn is_truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

}

/// Lenient text decoding for columns the sheet may hand back as numbers,
/// such as a zero-padded bill number that lost its padding.
pub(crate) mod text {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected a string or number, got {}",
                other
            ))),
        }
    }

}
