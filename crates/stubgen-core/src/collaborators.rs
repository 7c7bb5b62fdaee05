//! Interfaces to the external services the orchestrator depends on.

use std::path::{Path, PathBuf};

use crate::classpath::ClasspathSet;
use crate::error::StubgenResult;

/// A resolved interface type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    qualified_name: String,
}

impl TypeHandle {
    /// Creates a handle for a fully-qualified type name.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }

    /// Returns the fully-qualified name.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Returns the package, or `None` for the default package.
    pub fn package(&self) -> Option<&str> {
        self.qualified_name.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    /// Returns the unqualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit_once('.')
            .map_or(self.qualified_name.as_str(), |(_, name)| name)
    }

    /// Returns the package as a relative directory path.
    pub fn package_path(&self) -> PathBuf {
        self.package()
            .map(|pkg| pkg.split('.').collect::<PathBuf>())
            .unwrap_or_default()
    }

    /// Returns the directory stubs for this type are generated into:
    /// `<source_root>/<package path>/<package_subdir>`.
    pub fn output_dir(&self, source_root: &Path, package_subdir: &str) -> PathBuf {
        let mut dir = source_root.join(self.package_path());
        if !package_subdir.is_empty() {
            dir.push(package_subdir);
        }
        dir
    }
}

/// Resolves fully-qualified type names.
pub trait TypeResolver {
    /// Looks up `qualified_name` against the assembled classpath.
    fn resolve(&self, qualified_name: &str, classpath: &ClasspathSet) -> Option<TypeHandle>;
}

/// Generates stub sources for one type.
pub trait Generator {
    /// Writes stubs for `ty` into `output_dir` and returns the paths written,
    /// in the order they were produced.
    fn generate(&self, ty: &TypeHandle, output_dir: &Path) -> StubgenResult<Vec<PathBuf>>;
}

/// Output of dependency resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
    /// Resolved artifact locations.
    pub artifacts: Vec<PathBuf>,
    /// Locations already visible to the running process.
    pub visible: Vec<PathBuf>,
}

/// Resolves the project's dependencies.
pub trait DependencyResolver {
    /// Returns the resolved artifacts and the currently visible locations.
    fn resolve(&self) -> StubgenResult<ResolvedDependencies>;
}

/// A [`DependencyResolver`] returning preconfigured locations.
#[derive(Debug, Clone, Default)]
pub struct StaticDependencyResolver {
    resolved: ResolvedDependencies,
}

impl StaticDependencyResolver {
    /// Creates a resolver from artifact and visible location lists.
    pub fn new<A, V>(artifacts: A, visible: V) -> Self
    where
        A: IntoIterator<Item = PathBuf>,
        V: IntoIterator<Item = PathBuf>,
    {
        Self {
            resolved: ResolvedDependencies {
                artifacts: artifacts.into_iter().collect(),
                visible: visible.into_iter().collect(),
            },
        }
    }
}

impl DependencyResolver for StaticDependencyResolver {
    fn resolve(&self) -> StubgenResult<ResolvedDependencies> {
        Ok(self.resolved.clone())
    }
}
