//! Typed read access to per-mesh print settings.
//!
//! Slicer front-ends hand settings over as strings keyed by setting name.
//! [`SettingsView::get`] parses them on demand. Nothing here synthesizes a
//! default: an absent setting is always an error for the caller to surface.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{ExportError, Result};

/// Read-only lookup of named print settings.
pub trait SettingsView {
    /// Raw string value of a setting, if present.
    fn raw(&self, name: &str) -> Option<&str>;

    /// Typed value of a setting.
    ///
    /// Fails with [`ExportError::MissingSetting`] if the setting is absent and
    /// [`ExportError::InvalidSetting`] if it does not parse as `T`. The `mesh`
    /// field of either error is left empty; callers that know the mesh fill
    /// it in.
    fn get<T: FromSetting>(&self, name: &str) -> Result<T> {
        let raw = self.raw(name).ok_or_else(|| ExportError::MissingSetting {
            mesh: String::new(),
            name: name.to_string(),
        })?;

        T::from_setting(raw).ok_or_else(|| ExportError::InvalidSetting {
            mesh: String::new(),
            name: name.to_string(),
            value: raw.to_string(),
            expected: T::EXPECTED,
        })
    }
}

/// A value type that can be parsed from a raw setting string.
pub trait FromSetting: Sized {
    /// Human-readable type name used in error messages.
    const EXPECTED: &'static str;

    /// Parse the raw value, `None` if malformed.
    fn from_setting(raw: &str) -> Option<Self>;
}

impl FromSetting for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_setting(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Integer lengths. A decimal value is rounded to the nearest unit.
impl FromSetting for i64 {
    const EXPECTED: &'static str = "length";

    fn from_setting(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return Some(v);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.round() as i64)
    }
}

impl FromSetting for f64 {
    const EXPECTED: &'static str = "number";

    fn from_setting(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl FromSetting for String {
    const EXPECTED: &'static str = "string";

    fn from_setting(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

/// String-keyed settings store.
///
/// Deserializes from a JSON object whose values may be strings, numbers,
/// booleans, or arrays; non-string values are kept in their JSON text form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    #[serde(deserialize_with = "deserialize_values")]
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    /// Builder-style [`Settings::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    /// Remove a setting.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsView for Settings {
    fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        }
    }
}

fn deserialize_values<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| {
            let text = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, text)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads() {
        let settings = Settings::new()
            .with("infill_mesh", "True")
            .with("wall_line_width_0", 400)
            .with("initial_layer_line_width_factor", "120.5")
            .with("infill_pattern", "grid");

        assert!(settings.get::<bool>("infill_mesh").unwrap());
        assert_eq!(settings.get::<i64>("wall_line_width_0").unwrap(), 400);
        assert_eq!(
            settings.get::<f64>("initial_layer_line_width_factor").unwrap(),
            120.5
        );
        assert_eq!(settings.get::<String>("infill_pattern").unwrap(), "grid");
    }

    #[test]
    fn test_missing_setting() {
        let settings = Settings::new();
        match settings.get::<i64>("skin_line_width") {
            Err(ExportError::MissingSetting { name, .. }) => assert_eq!(name, "skin_line_width"),
            other => panic!("expected MissingSetting, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_setting() {
        let settings = Settings::new().with("support_mesh", "maybe");
        match settings.get::<bool>("support_mesh") {
            Err(ExportError::InvalidSetting {
                value, expected, ..
            }) => {
                assert_eq!(value, "maybe");
                assert_eq!(expected, "boolean");
            }
            other => panic!("expected InvalidSetting, got {other:?}"),
        }
    }

    #[test]
    fn test_length_rounds_decimals() {
        let settings = Settings::new().with("infill_line_distance", "5999.6");
        assert_eq!(settings.get::<i64>("infill_line_distance").unwrap(), 6000);
    }

    #[test]
    fn test_deserialize_mixed_values() {
        let json = r#"{
            "infill_mesh": false,
            "wall_line_width_0": 400,
            "skin_angles": [45, 135],
            "infill_pattern": "cubic"
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.len(), 4);
        assert!(!settings.get::<bool>("infill_mesh").unwrap());
        assert_eq!(settings.get::<i64>("wall_line_width_0").unwrap(), 400);
        assert_eq!(settings.raw("skin_angles"), Some("[45,135]"));
        assert_eq!(settings.raw("infill_pattern"), Some("cubic"));
    }
}
