use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::Link;
use crate::format::parse_date;

/// Read access to a loosely-typed API object, trying several key names per field.
///
/// The first key holding a non-null value wins.
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|map| Self { map })
    }

    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find(|value| !value.is_null())
    }

    /// Strings, plus numbers rendered as strings (some ids come back numeric)
    pub fn string(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find_map(|value| match value {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Numbers, plus numeric strings
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find_map(|value| match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().replace(',', ".").parse().ok(),
                _ => None,
            })
    }

    pub fn month(&self, keys: &[&str]) -> Option<u32> {
        self.number(keys)
            .filter(|m| (1.0..=12.0).contains(m))
            .map(|m| m as u32)
    }

    pub fn year(&self, keys: &[&str]) -> Option<i32> {
        self.number(keys).map(|y| y as i32)
    }

    pub fn date(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .filter_map(Value::as_str)
            .find_map(parse_date)
    }

    pub fn link(&self, keys: &[&str]) -> Option<Link> {
        self.first(keys).and_then(Link::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_key_wins() {
        let value = json!({ "montantTotal": null, "montant": 15000, "amount": 1 });
        let fields = Fields::new(&value).unwrap();
        assert_eq!(fields.number(&["montantTotal", "montant", "amount"]), Some(15000.0));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let value = json!({ "kwh": "120,5", "mois": "3", "_id": 42 });
        let fields = Fields::new(&value).unwrap();
        assert_eq!(fields.number(&["kwh"]), Some(120.5));
        assert_eq!(fields.month(&["mois"]), Some(3));
        assert_eq!(fields.string(&["_id"]).as_deref(), Some("42"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let value = json!({ "telephone": "  ", "phone": "+225 01 02 03" });
        let fields = Fields::new(&value).unwrap();
        assert_eq!(
            fields.string(&["telephone", "phone"]).as_deref(),
            Some("+225 01 02 03")
        );
    }
}
