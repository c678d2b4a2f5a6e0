// ── Paw Atoms: Data Types ──────────────────────────────────────────────────
// Plain data shared between the installer layers. No I/O here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Package descriptor ─────────────────────────────────────────────────────

/// Contents of a `package.json`: manifest field name → JSON value.
///
/// Serializes as a bare JSON object, so whatever the caller puts in is exactly
/// what npm reads back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageDescriptor(Map<String, Value>);

impl PackageDescriptor {
    /// Descriptor with `name` and `version` set.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(name.into()));
        fields.insert("version".into(), Value::String(version.into()));
        Self(fields)
    }

    /// Add `package` at `range` under `dependencies`, creating the table if needed.
    pub fn with_dependency(mut self, package: impl Into<String>, range: impl Into<String>) -> Self {
        let deps = self
            .0
            .entry("dependencies")
            .or_insert_with(|| Value::Object(Map::new()));
        if !deps.is_object() {
            *deps = Value::Object(Map::new());
        }
        if let Value::Object(table) = deps {
            table.insert(package.into(), Value::String(range.into()));
        }
        self
    }

    /// Set a top-level field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Declared dependency names, in manifest order.
    pub fn dependencies(&self) -> Vec<&str> {
        self.0
            .get("dependencies")
            .and_then(Value::as_object)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for PackageDescriptor {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_name_and_version() {
        let d = PackageDescriptor::new("foo", "1.2.3");
        assert_eq!(d.name(), Some("foo"));
        assert_eq!(d.get("version"), Some(&Value::String("1.2.3".into())));
        assert!(d.dependencies().is_empty());
    }

    #[test]
    fn dependencies_accumulate() {
        let d = PackageDescriptor::new("extensions", "0.0.0")
            .with_dependency("left-pad", "^1.3.0")
            .with_dependency("lodash", "4.17.21");
        let mut deps = d.dependencies();
        deps.sort_unstable();
        assert_eq!(deps, vec!["left-pad", "lodash"]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let d = PackageDescriptor::new("foo", "1.2.3");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json, serde_json::json!({"name": "foo", "version": "1.2.3"}));
    }

    #[test]
    fn non_object_dependencies_are_replaced() {
        let mut d = PackageDescriptor::new("foo", "1.0.0");
        d.insert("dependencies", Value::String("bogus".into()));
        let d = d.with_dependency("bar", "*");
        assert_eq!(d.dependencies(), vec!["bar"]);
    }
}
