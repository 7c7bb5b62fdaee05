//! Stub generation and compilation orchestrator.
//!
//! Resolves each requested interface, runs the generator for it, then
//! compiles everything that was generated in a single compiler run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use stubgen_exec::{ProcessExecutionResult, ProcessRunner, RunnerConfig};

use crate::classpath::{absolutize, ClasspathBuilder, ClasspathSet, PathListSeparator};
use crate::collaborators::{DependencyResolver, Generator, TypeResolver};
use crate::error::{StubgenError, StubgenResult};
use crate::invocation::{
    CompilerInvocation, CompilerInvocationBuilder, GeneratedFileSet, DEFAULT_COMPILER,
};
use crate::settings::CompilerSettings;

/// Default root for generated sources, relative to the base directory.
pub const DEFAULT_SOURCE_ROOT: &str = "src/main/java";

/// Default directory appended to each type's package directory.
pub const DEFAULT_PACKAGE_SUBDIR: &str = "jaxws";

/// Default compiler output directory, relative to the base directory.
pub const DEFAULT_CLASSES_DIR: &str = "target/classes";

/// Configuration for one orchestration run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Fully-qualified names of the interfaces to generate stubs for.
    pub interfaces: Vec<String>,
    /// Directory relative paths are resolved against.
    pub base_dir: PathBuf,
    /// Root directory for generated sources.
    pub source_root: PathBuf,
    /// Directory appended to each type's package directory.
    pub package_subdir: String,
    /// Compiler output directory.
    pub classes_dir: PathBuf,
    /// Explicit runtime classpath entries.
    pub classpath_elements: Vec<PathBuf>,
    /// Compiler command.
    pub compiler: String,
    /// Compiler flags.
    pub settings: CompilerSettings,
    /// Target platform path-list separator.
    pub separator: PathListSeparator,
    /// Deadline for the compiler process.
    pub timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            base_dir: PathBuf::from("."),
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            package_subdir: DEFAULT_PACKAGE_SUBDIR.to_string(),
            classes_dir: PathBuf::from(DEFAULT_CLASSES_DIR),
            classpath_elements: Vec::new(),
            compiler: DEFAULT_COMPILER.to_string(),
            settings: CompilerSettings::default(),
            separator: PathListSeparator::default(),
            timeout: None,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a config rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Adds an interface to generate stubs for.
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Sets the generated source root.
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = path.into();
        self
    }

    /// Sets the per-package subdirectory.
    pub fn package_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.package_subdir = subdir.into();
        self
    }

    /// Sets the compiler output directory.
    pub fn classes_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.classes_dir = path.into();
        self
    }

    /// Adds an explicit classpath entry.
    pub fn classpath_element(mut self, path: impl Into<PathBuf>) -> Self {
        self.classpath_elements.push(path.into());
        self
    }

    /// Sets the compiler command.
    pub fn compiler(mut self, command: impl Into<String>) -> Self {
        self.compiler = command.into();
        self
    }

    /// Sets the compiler flags.
    pub fn settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the target platform separator.
    pub fn separator(mut self, separator: PathListSeparator) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the compiler deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the absolute generated source root.
    pub fn resolved_source_root(&self) -> PathBuf {
        absolutize(&self.base_dir, &self.source_root)
    }

    /// Returns the absolute compiler output directory.
    pub fn resolved_classes_dir(&self) -> PathBuf {
        absolutize(&self.base_dir, &self.classes_dir)
    }
}

/// What one orchestration run did.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Classpath handed to the compiler.
    pub classpath: ClasspathSet,
    /// Files produced by the generator, in order.
    pub generated_files: GeneratedFileSet,
    /// The compiler invocation, if compilation ran.
    pub invocation: Option<CompilerInvocation>,
    /// Captured compiler output, if compilation ran.
    pub compiler_output: Option<ProcessExecutionResult>,
    /// Non-fatal diagnostics (compiler stderr on success).
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Returns true if the compiler was run.
    pub fn compiled(&self) -> bool {
        self.invocation.is_some()
    }
}

/// Sequences type resolution, generation and compilation.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates an orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Assembles the classpath from the resolver and explicit entries.
    pub fn classpath(&self, dependencies: &dyn DependencyResolver) -> StubgenResult<ClasspathSet> {
        let resolved = dependencies.resolve()?;
        ClasspathBuilder::new(&self.config.base_dir)
            .separator(self.config.separator)
            .dependencies(resolved.artifacts)
            .entries(self.config.classpath_elements.iter().cloned())
            .visible(resolved.visible)
            .build()
    }

    /// Runs generation and compilation.
    ///
    /// # Errors
    ///
    /// Configuration faults abort before any process is spawned. Launch,
    /// wait and timeout faults from the compiler run are passed through. A
    /// non-zero compiler exit is [`StubgenError::CompilerFailed`].
    pub fn run(
        &self,
        types: &dyn TypeResolver,
        generator: &dyn Generator,
        dependencies: &dyn DependencyResolver,
    ) -> StubgenResult<BuildReport> {
        let classpath = self.classpath(dependencies)?;

        let source_root = self.config.resolved_source_root();
        ensure_dir(&source_root)?;

        let mut generated = GeneratedFileSet::new();
        for name in &self.config.interfaces {
            let ty = types
                .resolve(name, &classpath)
                .ok_or_else(|| StubgenError::TypeNotFound { name: name.clone() })?;

            let out_dir = ty.output_dir(&source_root, &self.config.package_subdir);
            tracing::info!(
                "Generating wrapper classes for SEI {} in {}",
                ty.qualified_name(),
                out_dir.display()
            );
            ensure_dir(&out_dir)?;

            let files = generator.generate(&ty, &out_dir)?;
            tracing::debug!(count = files.len(), "generator produced files");
            generated.extend(files);
        }

        let mut report = BuildReport {
            classpath,
            generated_files: generated,
            invocation: None,
            compiler_output: None,
            warnings: Vec::new(),
        };

        if report.generated_files.is_empty() {
            tracing::info!("No generated sources to compile");
            return Ok(report);
        }

        let classes_dir = self.config.resolved_classes_dir();
        ensure_dir(&classes_dir)?;

        let invocation = CompilerInvocationBuilder::new(&self.config.compiler)
            .settings(self.config.settings.clone())
            .separator(self.config.separator)
            .build(&report.classpath, &classes_dir, &report.generated_files)?;

        tracing::info!(
            "Compiling {} source files to {}",
            report.generated_files.len(),
            classes_dir.display()
        );
        tracing::debug!("Executing: {}", invocation);

        let runner = ProcessRunner::with_config(RunnerConfig {
            timeout: self.config.timeout,
            ..Default::default()
        });
        let result = runner.run(invocation.command(), invocation.args())?;

        if let Some(warning) = interpret_result(&invocation, &result)? {
            report.warnings.push(warning);
        }

        report.invocation = Some(invocation);
        report.compiler_output = Some(result);
        Ok(report)
    }
}

/// Turns a compiler result into success, success with a warning, or failure.
///
/// Returns the warning text when the compiler succeeded but wrote to stderr.
pub fn interpret_result(
    invocation: &CompilerInvocation,
    result: &ProcessExecutionResult,
) -> StubgenResult<Option<String>> {
    if !result.success() {
        tracing::error!(
            "Execution of command '{}' failed with process return status {}, stderr:\n{}, stdout: {}",
            invocation,
            result.exit_status(),
            result.stderr_lossy(),
            result.stdout_lossy()
        );
        return Err(StubgenError::compiler_failed(invocation, result.clone()));
    }

    let stderr = result.stderr_lossy();
    if stderr.trim().is_empty() {
        return Ok(None);
    }

    tracing::warn!(
        "Execution of command '{}' resulted in the following stderr output:\n{}",
        invocation,
        stderr
    );
    Ok(Some(stderr))
}

fn ensure_dir(path: &Path) -> StubgenResult<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| StubgenError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}
