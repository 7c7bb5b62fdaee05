//! Concrete collaborators backed by the filesystem and external commands.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use stubgen_core::{ClasspathSet, Generator, StubgenError, StubgenResult, TypeHandle, TypeResolver};
use stubgen_exec::{ProcessRunner, RunnerConfig};

use crate::config::GeneratorConfig;

/// Runs an external generator once per type.
///
/// The command is invoked as `<command> <args...> <type name> <out dir>`.
/// Each non-empty stdout line names a file it wrote; relative names are
/// taken relative to the output directory.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandGenerator {
    /// Creates a generator running `command` with leading `args`.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: None,
        }
    }

    /// Creates a generator from the configuration section.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(&config.command, config.args.clone())
    }

    /// Sets a deadline for each generator run.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the generator command.
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, ty: &TypeHandle, output_dir: &Path) -> StubgenResult<Vec<PathBuf>> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(ty.qualified_name().into());
        args.push(output_dir.as_os_str().to_owned());

        let runner = ProcessRunner::with_config(RunnerConfig {
            timeout: self.timeout,
            ..Default::default()
        });
        let result = runner.run(&self.command, &args)?;

        if !result.success() {
            return Err(StubgenError::generation(
                ty.qualified_name(),
                format!(
                    "'{}' exited with status {}: {}",
                    self.command,
                    result.exit_status(),
                    result.stderr_lossy().trim()
                ),
            ));
        }

        let stderr = result.stderr_lossy();
        if !stderr.trim().is_empty() {
            tracing::warn!(generator = %self.command, "{}", stderr.trim_end());
        }

        Ok(parse_file_list(&result.stdout_lossy(), output_dir))
    }
}

fn parse_file_list(stdout: &str, output_dir: &Path) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let path = Path::new(line);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                output_dir.join(path)
            }
        })
        .collect()
}

/// Resolves types by looking for compiled classes or sources on disk.
///
/// A type exists if `<package path>/<Name>.class` is under a directory entry
/// of the classpath, or `<package path>/<Name>.java` is under the source
/// root. Archive entries are not inspected.
#[derive(Debug, Clone)]
pub struct ClasspathTypeResolver {
    source_root: PathBuf,
    assume_exists: bool,
}

impl ClasspathTypeResolver {
    /// Creates a resolver that also searches `source_root` for sources.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            assume_exists: false,
        }
    }

    /// Accept every name without checking the filesystem.
    pub fn assume_exists(mut self, assume: bool) -> Self {
        self.assume_exists = assume;
        self
    }
}

impl TypeResolver for ClasspathTypeResolver {
    fn resolve(&self, qualified_name: &str, classpath: &ClasspathSet) -> Option<TypeHandle> {
        let ty = TypeHandle::new(qualified_name);
        if self.assume_exists {
            return Some(ty);
        }

        let package_path = ty.package_path();
        let class_file = package_path.join(format!("{}.class", ty.simple_name()));
        if let Some(entry) = classpath
            .iter()
            .find(|entry| entry.path().is_dir() && entry.path().join(&class_file).is_file())
        {
            tracing::debug!(type_name = qualified_name, location = %entry, "resolved type");
            return Some(ty);
        }

        let source_file = self
            .source_root
            .join(&package_path)
            .join(format!("{}.java", ty.simple_name()));
        if source_file.is_file() {
            tracing::debug!(type_name = qualified_name, location = %source_file.display(), "resolved type from source");
            return Some(ty);
        }

        None
    }
}
