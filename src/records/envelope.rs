use serde_json::Value;

use super::InvalidRecord;

/// The four listings the invoice adapter needs, with the envelope keys each backend uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Bills,
    Residents,
    Consumptions,
    Houses,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Bills => "bills",
            Collection::Residents => "residents",
            Collection::Consumptions => "consumptions",
            Collection::Houses => "houses",
        }
    }

    fn envelope_keys(&self) -> &'static [&'static str] {
        match self {
            Collection::Bills => &["factures", "bills", "data"],
            Collection::Residents => &["residents", "data"],
            Collection::Consumptions => &["consommations", "consumptions", "data"],
            Collection::Houses => &["houses", "maisons", "data"],
        }
    }
}

/// Find the item array: a bare array, or the first envelope key holding one.
/// `data` may itself wrap the named key (`{ "data": { "factures": [...] } }`).
fn find_items<'a>(value: &'a Value, collection: Collection) -> &'a [Value] {
    if let Some(items) = value.as_array() {
        return items;
    }
    for key in collection.envelope_keys() {
        match value.get(*key) {
            Some(Value::Array(items)) => return items,
            Some(inner) if inner.is_object() => {
                let nested = find_items(inner, collection);
                if !nested.is_empty() {
                    return nested;
                }
            }
            _ => {}
        }
    }
    &[]
}

/// Parse every item of a listing, skipping (and logging) items that don't fit the schema
pub fn parse_collection<T>(value: &Value, collection: Collection) -> Vec<T>
where
    T: for<'a> TryFrom<&'a Value, Error = InvalidRecord>,
{
    let items = find_items(value, collection);
    let parsed: Vec<T> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match T::try_from(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(collection = collection.name(), index = idx, "skipping item: {e}");
                None
            }
        })
        .collect();

    tracing::debug!(
        collection = collection.name(),
        total = items.len(),
        parsed = parsed.len(),
        "parsed listing"
    );
    parsed
}
