//! Reconciliation status of graph objects
//!
//! Status strings arrive from the backend in kstatus form. They are resolved
//! once into [`ObjectStatus`] when the graph is built so render code never has
//! to re-derive them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of statuses a node can be drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectStatus {
    /// Reconciled and healthy
    Current,
    /// Still converging, suspended, or not yet known
    InProgress,
    /// Reconciliation failed or the object is gone
    Failed,
}

impl ObjectStatus {
    /// Resolve a kstatus string, with suspension taking precedence
    pub fn resolve(status: &str, suspended: bool) -> Self {
        if suspended {
            return ObjectStatus::InProgress;
        }
        match status {
            "Current" => ObjectStatus::Current,
            "Failed" | "NotFound" => ObjectStatus::Failed,
            "InProgress" | "Terminating" => ObjectStatus::InProgress,
            other => {
                if !other.is_empty() {
                    tracing::debug!("Unrecognised object status {:?}, treating as InProgress", other);
                }
                ObjectStatus::InProgress
            }
        }
    }

    /// Resolve the status of an automation object from its conditions
    ///
    /// The `Ready` condition is used, or `Available` for objects that report
    /// availability instead (Deployments).
    pub fn from_conditions(conditions: &[Condition], suspended: bool) -> Self {
        if suspended {
            return ObjectStatus::InProgress;
        }
        let ready = conditions
            .iter()
            .find(|c| c.condition_type == "Ready")
            .or_else(|| conditions.iter().find(|c| c.condition_type == "Available"));

        match ready {
            Some(c) if c.status == "True" => ObjectStatus::Current,
            _ => ObjectStatus::Failed,
        }
    }

    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectStatus::Current => "Current",
            ObjectStatus::InProgress => "InProgress",
            ObjectStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A Kubernetes status condition, as reported on the automation object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(condition_type: &str, status: &str) -> Condition {
        Condition {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_known_statuses() {
        assert_eq!(ObjectStatus::resolve("Current", false), ObjectStatus::Current);
        assert_eq!(ObjectStatus::resolve("Failed", false), ObjectStatus::Failed);
        assert_eq!(ObjectStatus::resolve("NotFound", false), ObjectStatus::Failed);
        assert_eq!(
            ObjectStatus::resolve("Terminating", false),
            ObjectStatus::InProgress
        );
        assert_eq!(ObjectStatus::resolve("", false), ObjectStatus::InProgress);
    }

    #[test]
    fn test_suspended_wins() {
        assert_eq!(ObjectStatus::resolve("Current", true), ObjectStatus::InProgress);
        assert_eq!(
            ObjectStatus::from_conditions(&[condition("Ready", "True")], true),
            ObjectStatus::InProgress
        );
    }

    #[test]
    fn test_from_conditions() {
        assert_eq!(
            ObjectStatus::from_conditions(&[condition("Ready", "True")], false),
            ObjectStatus::Current
        );
        assert_eq!(
            ObjectStatus::from_conditions(&[condition("Available", "True")], false),
            ObjectStatus::Current
        );
        assert_eq!(
            ObjectStatus::from_conditions(
                &[condition("Ready", "False"), condition("Available", "True")],
                false
            ),
            ObjectStatus::Failed
        );
        assert_eq!(ObjectStatus::from_conditions(&[], false), ObjectStatus::Failed);
    }
}
