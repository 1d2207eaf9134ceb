//! Default values for filter inputs.
//!
//! Date-typed fields default to today in the canonical format; an external
//! provider can override any field's default by name. Defaults are computed
//! once per session, before the first fetch, and only ever fill a field
//! whose current value is empty — never a caller-entered value.

use chrono::Local;
use serde_json::{Map, Value};

use crate::types::DATE_FORMAT;

/// Describes one filter input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Date-typed fields get the built-in "today" default.
    pub is_date: bool,
}

impl FieldDescriptor {
    pub fn date(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_date: true,
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_date: false,
        }
    }
}

/// Compute default values for `fields`.
///
/// Provider-supplied values in `provided` take precedence over the built-in
/// date default; non-date fields only get a default when the provider
/// supplies one.
pub fn resolve_defaults(
    fields: &[FieldDescriptor],
    provided: &Map<String, Value>,
) -> Map<String, Value> {
    let today = Local::now().format(DATE_FORMAT).to_string();
    let mut defaults = Map::new();

    for field in fields {
        if field.is_date {
            defaults.insert(field.name.clone(), Value::String(today.clone()));
        }
    }
    for (name, value) in provided {
        defaults.insert(name.clone(), value.clone());
    }

    defaults
}

/// Fill empty fields in `values` from `defaults`.
///
/// A field counts as empty when it is missing, null, or an empty string.
/// Populated fields are left untouched.
pub fn apply_defaults(values: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (name, default) in defaults {
        let empty = match values.get(name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if empty {
            values.insert(name.clone(), default.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provided(entries: &[(&str, &str)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn date_fields_default_to_today() {
        let fields = [FieldDescriptor::date("start_date"), FieldDescriptor::plain("status")];
        let defaults = resolve_defaults(&fields, &Map::new());

        let today = Local::now().format(DATE_FORMAT).to_string();
        assert_eq!(defaults.get("start_date"), Some(&Value::String(today)));
        assert!(!defaults.contains_key("status"));
    }

    #[test]
    fn provider_overrides_date_default() {
        let fields = [FieldDescriptor::date("start_date")];
        let defaults = resolve_defaults(&fields, &provided(&[("start_date", "2020-01-01")]));
        assert_eq!(
            defaults.get("start_date"),
            Some(&Value::String("2020-01-01".into()))
        );
    }

    #[test]
    fn provider_supplies_non_date_defaults() {
        let fields = [FieldDescriptor::plain("status")];
        let defaults = resolve_defaults(&fields, &provided(&[("status", "open")]));
        assert_eq!(defaults.get("status"), Some(&Value::String("open".into())));
    }

    #[test]
    fn apply_only_fills_empty_values() {
        let defaults = provided(&[("a", "def-a"), ("b", "def-b"), ("c", "def-c"), ("d", "def-d")]);
        let mut values = provided(&[("a", "user"), ("b", "")]);
        values.insert("c".to_string(), Value::Null);

        apply_defaults(&mut values, &defaults);

        // User input survives; empty string, null, and missing are filled.
        assert_eq!(values.get("a"), Some(&Value::String("user".into())));
        assert_eq!(values.get("b"), Some(&Value::String("def-b".into())));
        assert_eq!(values.get("c"), Some(&Value::String("def-c".into())));
        assert_eq!(values.get("d"), Some(&Value::String("def-d".into())));
    }
}
