//! Object sources
//!
//! A source delivers the complete object list for one automation on every
//! call. Sources own their retry and timeout policy; the graph core only sees
//! snapshots or their absence.

use crate::models::Snapshot;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Backend that can be polled for snapshots
#[async_trait::async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch the current snapshot
    async fn fetch(&self) -> Result<Snapshot>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Serialization format of a snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }

    pub fn parse(&self, contents: &str) -> Result<Snapshot> {
        match self {
            SnapshotFormat::Json => {
                serde_json::from_str(contents).context("Failed to parse JSON snapshot")
            }
            SnapshotFormat::Yaml => {
                serde_yaml::from_str(contents).context("Failed to parse YAML snapshot")
            }
        }
    }
}

/// Read a snapshot file synchronously
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    SnapshotFormat::for_path(path)
        .parse(&contents)
        .with_context(|| format!("Invalid snapshot: {}", path.display()))
}

/// Source that re-reads a snapshot file on every fetch
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ObjectSource for FileSource {
    async fn fetch(&self) -> Result<Snapshot> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read snapshot: {}", self.path.display()))?;
        SnapshotFormat::for_path(&self.path)
            .parse(&contents)
            .with_context(|| format!("Invalid snapshot: {}", self.path.display()))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
root:
  name: apps
  namespace: flux-system
  kind: Kustomization
objects:
  - uid: a
    name: podinfo
    kind: Deployment
"#;

    #[test]
    fn test_format_for_path() {
        assert_eq!(
            SnapshotFormat::for_path(Path::new("snap.yml")),
            SnapshotFormat::Yaml
        );
        assert_eq!(
            SnapshotFormat::for_path(Path::new("snap.json")),
            SnapshotFormat::Json
        );
        assert_eq!(SnapshotFormat::for_path(Path::new("snap")), SnapshotFormat::Json);
    }

    #[test]
    fn test_load_yaml_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.yaml");
        std::fs::write(&path, YAML).unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.root.name, "apps");
        assert_eq!(snapshot.objects.len(), 1);
        assert_eq!(snapshot.objects[0].id, "a");
    }

    #[tokio::test]
    async fn test_file_source_fetch_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.yaml");
        let source = FileSource::new(&path);
        assert!(source.fetch().await.is_err());

        std::fs::write(&path, YAML).unwrap();
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.objects[0].name, "podinfo");
        assert!(source.describe().contains("snapshot.yaml"));
    }
}
