//! Automation kind definitions
//!
//! The parent object of a reconciliation graph is always one of the Flux
//! automation kinds. This enum keeps those names in one place instead of
//! scattering string literals around the graph code.

use std::fmt;

/// Flux resource kinds that reconcile other objects and can own a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomationKind {
    // Kustomize Controller
    Kustomization,
    // Helm Controller
    HelmRelease,
}

impl AutomationKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationKind::Kustomization => "Kustomization",
            AutomationKind::HelmRelease => "HelmRelease",
        }
    }

    /// Try to parse a string (case-insensitive, short names allowed)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kustomization" | "ks" | "kustomizations" => Some(AutomationKind::Kustomization),
            "helmrelease" | "hr" | "helmreleases" => Some(AutomationKind::HelmRelease),
            _ => None,
        }
    }
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            AutomationKind::from_str_case_insensitive("ks"),
            Some(AutomationKind::Kustomization)
        );
        assert_eq!(
            AutomationKind::from_str_case_insensitive("HELMRELEASE"),
            Some(AutomationKind::HelmRelease)
        );
        assert_eq!(AutomationKind::from_str_case_insensitive("bucket"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AutomationKind::HelmRelease.to_string(), "HelmRelease");
    }
}
