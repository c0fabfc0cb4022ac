//! Wire types delivered by the object source on every poll tick

use super::automation_kind::AutomationKind;
use super::object_status::{Condition, ObjectStatus};
use serde::{Deserialize, Serialize};

/// Group/version/kind triple as reported by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

/// An object reconciled by the automation, as polled from the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledObject {
    /// Unique object id (the Kubernetes uid)
    #[serde(alias = "uid")]
    pub id: String,
    /// Id of the owning object, if it is part of the polled set
    #[serde(default, alias = "parentUid", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_version_kind: Option<GroupVersionKind>,
    /// kstatus string ("Current", "InProgress", "Failed", ...)
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub suspended: bool,
}

impl ReconciledObject {
    /// The object's kind, preferring the flat field over the GVK
    pub fn effective_kind(&self) -> &str {
        if !self.kind.is_empty() {
            return &self.kind;
        }
        self.group_version_kind
            .as_ref()
            .map(|gvk| gvk.kind.as_str())
            .unwrap_or("")
    }

    /// Parent id with empty strings treated as absent
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }
}

/// The automation object whose reconciliation is displayed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootDescriptor {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub kind: String,
    /// Explicit kstatus string; when absent the status comes from `conditions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl RootDescriptor {
    /// Create a root descriptor with no status information
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// The automation kind of the root, when it is a known one
    pub fn automation_kind(&self) -> Option<AutomationKind> {
        AutomationKind::from_str_case_insensitive(&self.kind)
    }

    /// Kind shown on the root node; short names like `ks` are expanded
    pub fn display_kind(&self) -> &str {
        match self.automation_kind() {
            Some(kind) => kind.as_str(),
            None => &self.kind,
        }
    }

    /// Resolve the root's drawn status
    pub fn resolved_status(&self) -> ObjectStatus {
        match self.status.as_deref() {
            Some(status) if !status.is_empty() => ObjectStatus::resolve(status, self.suspended),
            _ => ObjectStatus::from_conditions(&self.conditions, self.suspended),
        }
    }
}

/// One complete delivery from the object source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub root: RootDescriptor,
    #[serde(default)]
    pub objects: Vec<ReconciledObject>,
}

impl Snapshot {
    pub fn new(root: RootDescriptor, objects: Vec<ReconciledObject>) -> Self {
        Self { root, objects }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_field_names() {
        let json = r#"{
            "uid": "abc",
            "parentUid": "def",
            "name": "podinfo",
            "namespace": "apps",
            "groupVersionKind": {"group": "apps", "version": "v1", "kind": "Deployment"},
            "status": "Current",
            "suspended": false
        }"#;
        let obj: ReconciledObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.id, "abc");
        assert_eq!(obj.parent(), Some("def"));
        assert_eq!(obj.effective_kind(), "Deployment");
    }

    #[test]
    fn test_empty_parent_is_absent() {
        let obj = ReconciledObject {
            id: "a".to_string(),
            parent_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(obj.parent(), None);
    }

    #[test]
    fn test_root_status_prefers_explicit_status() {
        let mut root = RootDescriptor::new("apps", "flux-system", "Kustomization");
        assert_eq!(root.resolved_status(), ObjectStatus::Failed);
        root.status = Some("Current".to_string());
        assert_eq!(root.resolved_status(), ObjectStatus::Current);
        root.suspended = true;
        assert_eq!(root.resolved_status(), ObjectStatus::InProgress);
    }

    #[test]
    fn test_root_display_kind_expands_short_names() {
        let root = RootDescriptor::new("apps", "flux-system", "ks");
        assert_eq!(root.automation_kind(), Some(AutomationKind::Kustomization));
        assert_eq!(root.display_kind(), "Kustomization");

        let other = RootDescriptor::new("web", "default", "Deployment");
        assert_eq!(other.automation_kind(), None);
        assert_eq!(other.display_kind(), "Deployment");
    }
}
