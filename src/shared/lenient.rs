use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use std::any::type_name;
use tracing::warn;

/// Deserializes an optional nested value, treating a value of the wrong
/// shape the same as a missing one. The dropped value is logged.
///
/// Use together with `#[serde(default)]` so absent keys also land on `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!("Dropping malformed {}: {err}", short_name::<T>());
            Ok(None)
        }
    }
}

/// Like [`lenient`] for lists, but entry by entry: a bad entry is logged and
/// left out while its siblings are kept. A value that is not a list at all
/// reads as `None`.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(entries) => entries,
        other => {
            warn!(
                "Dropping {} list, got {other} instead of an array",
                short_name::<T>()
            );
            return Ok(None);
        }
    };

    let mut kept = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(entry) => kept.push(entry),
            Err(err) => warn!("Dropping malformed {} #{i}: {err}", short_name::<T>()),
        }
    }
    Ok(Some(kept))
}

fn short_name<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
