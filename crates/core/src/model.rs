//! Build graph domain model
//!
//! The graph is an immutable snapshot of the build description for one run:
//! a mapping from project path to [`Project`], each carrying uniquely-named
//! targets and the schemes that group them for testing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A buildable/testable target declared by a project.
///
/// `sources` are file paths relative to the project directory; they feed the
/// content hash that decides cache hits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target {
    /// Target name, unique within its project
    pub name: String,
    /// Source files relative to the project directory
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Reference to a target by (project path, name).
///
/// Used inside schemes and test plans, where the referenced target may live
/// in a different project than the scheme.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReference {
    /// Path of the project that owns the target
    pub project_path: PathBuf,
    /// Target name within that project
    pub name: String,
}

impl TargetReference {
    /// Create a new reference
    pub fn new(project_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            name: name.into(),
        }
    }
}

/// An ordered, named subset of testable targets within a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlan {
    /// Path of the test plan document; its file stem is the plan name
    pub path: PathBuf,
    /// Testable targets in declaration order
    #[serde(default)]
    pub targets: Vec<TargetReference>,
    /// Whether this plan is the scheme's default
    #[serde(default)]
    pub is_default: bool,
}

impl TestPlan {
    /// The plan name: the file stem of its path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }
}

/// What a scheme tests: either an explicit target list or a set of test plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum TestAction {
    /// Targets grouped into ordered test plans, one of which may be default
    Plans {
        /// The plans in declaration order
        test_plans: Vec<TestPlan>,
    },
    /// An explicit ordered list of testable targets
    Targets {
        /// The targets in declaration order
        targets: Vec<TargetReference>,
    },
}

impl TestAction {
    /// The default test plan, if this action is plan-based.
    #[must_use]
    pub fn default_plan(&self) -> Option<&TestPlan> {
        match self {
            Self::Plans { test_plans } => test_plans.iter().find(|plan| plan.is_default),
            Self::Targets { .. } => None,
        }
    }

    /// Find a test plan by name (the file stem of its path).
    ///
    /// Plans are ordered; the first match wins.
    #[must_use]
    pub fn plan_named(&self, name: &str) -> Option<&TestPlan> {
        match self {
            Self::Plans { test_plans } => test_plans.iter().find(|plan| plan.name() == name),
            Self::Targets { .. } => None,
        }
    }
}

/// A named, user-defined build/test configuration grouping targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    /// Scheme name, unique within the run's resolution scope
    pub name: String,
    /// The scheme's test action, if it tests anything
    #[serde(default)]
    pub test_action: Option<TestAction>,
}

/// A single project inside the graph: its path, targets and schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project directory path (the manifest's directory)
    pub path: PathBuf,
    /// Targets, uniquely named within the project
    #[serde(default)]
    pub targets: Vec<Target>,
    /// Schemes declared by the project
    #[serde(default)]
    pub schemes: Vec<Scheme>,
}

impl Project {
    /// Look up a target by name.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Look up a scheme by name.
    #[must_use]
    pub fn scheme(&self, name: &str) -> Option<&Scheme> {
        self.schemes.iter().find(|scheme| scheme.name == name)
    }
}

/// The resolved identity of a target: project path plus the owned target.
///
/// This, not the bare target name, is the hashing key: two projects may
/// contain same-named targets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphTarget {
    /// Path of the owning project
    pub project_path: PathBuf,
    /// The target itself
    pub target: Target,
}

impl GraphTarget {
    /// Create a new graph target
    pub fn new(project_path: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            project_path: project_path.into(),
            target,
        }
    }

    /// The test identifier derived from this target's name.
    #[must_use]
    pub fn test_identifier(&self) -> TestIdentifier {
        TestIdentifier::new(&self.target.name)
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_path.display(), self.target.name)
    }
}

/// The string name used to match cache entries and to build the underlying
/// tool's skip selector.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TestIdentifier(String);

impl TestIdentifier {
    /// Create an identifier from a target name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestIdentifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An immutable snapshot of the build description for one invocation.
///
/// Owned by the orchestrator for the duration of a run; produced once by the
/// graph mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Root path the graph was mapped from
    pub root: PathBuf,
    /// Projects keyed by project path
    pub projects: BTreeMap<PathBuf, Project>,
}

impl Graph {
    /// Create a graph from a set of projects
    pub fn new(root: impl Into<PathBuf>, projects: impl IntoIterator<Item = Project>) -> Self {
        Self {
            root: root.into(),
            projects: projects
                .into_iter()
                .map(|project| (project.path.clone(), project))
                .collect(),
        }
    }

    /// Look up a project by path.
    #[must_use]
    pub fn project(&self, path: &Path) -> Option<&Project> {
        self.projects.get(path)
    }

    /// Find a scheme by name across all projects.
    ///
    /// Projects are scanned in path order; scheme names are expected to be
    /// unique within the graph's resolution scope.
    #[must_use]
    pub fn find_scheme(&self, name: &str) -> Option<(&Project, &Scheme)> {
        self.projects
            .values()
            .find_map(|project| project.scheme(name).map(|scheme| (project, scheme)))
    }

    /// Resolve a target reference to its graph target.
    #[must_use]
    pub fn graph_target(&self, reference: &TargetReference) -> Option<GraphTarget> {
        let project = self.project(&reference.project_path)?;
        let target = project.target(&reference.name)?;
        Some(GraphTarget::new(project.path.clone(), target.clone()))
    }

    /// All graph targets across all projects, in (project path, declaration)
    /// order.
    pub fn all_targets(&self) -> impl Iterator<Item = GraphTarget> + '_ {
        self.projects.values().flat_map(|project| {
            project
                .targets
                .iter()
                .map(|target| GraphTarget::new(project.path.clone(), target.clone()))
        })
    }
}
