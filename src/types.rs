//! Plain data types exchanged between the host and the provider.

use serde::{Deserialize, Serialize};

use crate::schema::Diagnostic;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The dotted path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<serde_json::Value>,
    /// The value after the change (None if deleting).
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a new attribute.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation (null when destroying).
    pub planned_state: serde_json::Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether applying this plan would do nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && !self.requires_replace
    }

    /// Paths of every changed attribute.
    pub fn changed_paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Provider metadata returned to the host before the full schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
    /// Server capabilities.
    pub capabilities: ServerCapabilities,
}

/// Server capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Whether the provider supports planning destroy operations.
    pub plan_destroy: bool,
}

/// What the host receives back from a callback: an optional value plus
/// every diagnostic produced along the way.
///
/// A response may carry both a value and error diagnostics, e.g. a create
/// that succeeded remotely but could not be read back returns the known
/// state so the host can taint it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse<T> {
    /// The value, when the callback produced one.
    pub value: Option<T>,
    /// Diagnostics for the host's diagnostics sink.
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> HostResponse<T> {
    /// A response carrying a value and no diagnostics.
    pub fn ok(value: T) -> Self {
        Self {
            value: Some(value),
            diagnostics: Vec::new(),
        }
    }

    /// A response carrying only diagnostics.
    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            value: None,
            diagnostics,
        }
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("maven-releases"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("maven-releases")));

        let removed = AttributeChange::removed("cleanup", json!({"policy_names": ["weekly"]}));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("online", json!(true), json!(false));
        assert_eq!(modified.before, Some(json!(true)));
        assert_eq!(modified.after, Some(json!(false)));
    }

    #[test]
    fn test_plan_result() {
        let no_change = PlanResult::no_change(json!({"name": "raw-hosted"}));
        assert!(no_change.is_empty());

        let with_changes = PlanResult::with_changes(
            json!({"name": "raw-hosted", "online": false}),
            vec![AttributeChange::modified("online", json!(true), json!(false))],
            false,
        );
        assert!(!with_changes.is_empty());
        assert_eq!(with_changes.changed_paths(), vec!["online"]);
    }

    #[test]
    fn test_imported_resource() {
        let imported = ImportedResource::new(
            "sonatyperepo_repository_raw_hosted",
            json!({"name": "raw-hosted"}),
        );
        assert_eq!(imported.resource_type, "sonatyperepo_repository_raw_hosted");
        assert_eq!(imported.state["name"], "raw-hosted");
    }

    #[test]
    fn test_host_response() {
        let ok = HostResponse::ok(json!({"name": "x"}));
        assert!(!ok.has_errors());

        let failed: HostResponse<serde_json::Value> =
            HostResponse::failed(vec![Diagnostic::error("boom")]);
        assert!(failed.has_errors());
        assert!(failed.value.is_none());
    }
}
