//! Graph mapping from on-disk project manifests
//!
//! Each project directory declares its targets and schemes in a
//! `project.seltest.json` manifest. The mapper walks the invocation root,
//! parses every manifest it finds, and assembles the immutable [`Graph`]
//! used for the rest of the run.

use crate::model::{Graph, Project, Scheme, Target};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name of the per-project manifest
pub const PROJECT_MANIFEST_NAME: &str = "project.seltest.json";

/// Maps a root path to the build graph for one invocation.
pub trait GraphMapper {
    /// Produce the graph for the given root path.
    ///
    /// # Errors
    /// Returns an error on unreadable directories or malformed manifests.
    fn map(&self, root: &Path) -> Result<Graph>;
}

/// On-disk manifest representation; the project path comes from the
/// manifest's directory, not the document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProjectManifest {
    #[serde(default)]
    targets: Vec<Target>,
    #[serde(default)]
    schemes: Vec<Scheme>,
}

/// Graph mapper backed by `project.seltest.json` manifests.
#[derive(Debug, Clone, Default)]
pub struct ManifestGraphMapper;

impl ManifestGraphMapper {
    /// Create a new manifest mapper
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn load_project(manifest_path: &Path, project_path: PathBuf) -> Result<Project> {
        let content = std::fs::read_to_string(manifest_path)
            .map_err(|e| Error::io(e, manifest_path, "read"))?;
        let manifest: ProjectManifest = serde_json::from_str(&content)
            .map_err(|e| Error::manifest(manifest_path, e.to_string()))?;

        Ok(Project {
            path: project_path,
            targets: manifest.targets,
            schemes: manifest.schemes,
        })
    }
}

impl GraphMapper for ManifestGraphMapper {
    fn map(&self, root: &Path) -> Result<Graph> {
        let mut projects = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk loop detected"));
                Error::io(source, path, "walk")
            })?;
            if entry.file_type().is_file() && entry.file_name() == PROJECT_MANIFEST_NAME {
                let manifest_path = entry.path();
                let project_dir = manifest_path
                    .parent()
                    .unwrap_or(root)
                    .strip_prefix(root)
                    .unwrap_or_else(|_| Path::new("."));
                // The root project maps to "." so graph keys stay stable
                // regardless of where the tool was invoked from.
                let project_path = if project_dir.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    project_dir.to_path_buf()
                };
                tracing::debug!(
                    manifest = %manifest_path.display(),
                    project = %project_path.display(),
                    "Loading project manifest"
                );
                projects.push(Self::load_project(manifest_path, project_path)?);
            }
        }

        tracing::debug!(projects = projects.len(), root = %root.display(), "Graph mapped");
        Ok(Graph::new(root, projects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, content: &str) {
        std::fs::create_dir_all(dir).expect("create project dir");
        std::fs::write(dir.join(PROJECT_MANIFEST_NAME), content).expect("write manifest");
    }

    #[test]
    fn maps_projects_keyed_by_relative_path() {
        let tmp = TempDir::new().expect("tempdir");
        write_manifest(
            &tmp.path().join("App"),
            r#"{
                "targets": [{"name": "AppTests", "sources": ["Tests/AppTests.swift"]}],
                "schemes": [{"name": "App"}]
            }"#,
        );
        write_manifest(
            &tmp.path().join("Modules/Lib"),
            r#"{"targets": [{"name": "LibTests"}]}"#,
        );

        let graph = ManifestGraphMapper::new().map(tmp.path()).expect("map");
        assert_eq!(graph.projects.len(), 2);
        assert!(graph.project(Path::new("App")).is_some());
        assert!(graph.project(Path::new("Modules/Lib")).is_some());
    }

    #[test]
    fn root_manifest_maps_to_dot() {
        let tmp = TempDir::new().expect("tempdir");
        write_manifest(tmp.path(), r#"{"targets": [{"name": "RootTests"}]}"#);

        let graph = ManifestGraphMapper::new().map(tmp.path()).expect("map");
        let project = graph.project(Path::new(".")).expect("root project");
        assert_eq!(project.targets[0].name, "RootTests");
    }

    #[test]
    fn malformed_manifest_is_a_manifest_error() {
        let tmp = TempDir::new().expect("tempdir");
        write_manifest(&tmp.path().join("App"), "{ not json");

        let err = ManifestGraphMapper::new()
            .map(tmp.path())
            .expect_err("should fail");
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn unknown_manifest_fields_are_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        write_manifest(&tmp.path().join("App"), r#"{"tragets": []}"#);

        let err = ManifestGraphMapper::new()
            .map(tmp.path())
            .expect_err("should fail");
        assert!(matches!(err, Error::Manifest { .. }));
    }

    #[test]
    fn empty_root_maps_to_empty_graph() {
        let tmp = TempDir::new().expect("tempdir");
        let graph = ManifestGraphMapper::new().map(tmp.path()).expect("map");
        assert!(graph.projects.is_empty());
    }
}
