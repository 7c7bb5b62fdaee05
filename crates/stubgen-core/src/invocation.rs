//! Compiler command-line assembly.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::classpath::{ClasspathSet, PathListSeparator};
use crate::error::{StubgenError, StubgenResult};
use crate::settings::CompilerSettings;

/// Default compiler command.
pub const DEFAULT_COMPILER: &str = "javac";

/// Source files produced by the generator, in generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFileSet {
    files: Vec<PathBuf>,
}

impl GeneratedFileSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends files, keeping their order.
    pub fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, files: I) {
        self.files.extend(files);
    }

    /// Returns the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files were generated.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over files in generation order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    /// Returns the files as a slice.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.files
    }
}

impl FromIterator<PathBuf> for GeneratedFileSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// A ready-to-run compiler command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInvocation {
    command: String,
    args: Vec<String>,
}

impl CompilerInvocation {
    /// Creates an invocation from a command and its arguments.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Returns the command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Renders the command line for diagnostics.
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CompilerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Builds [`CompilerInvocation`]s.
///
/// Argument order is fixed:
/// `[-source L] [-target L] [-g] -cp <classpath> -d <dir> <file>...`
#[derive(Debug, Clone)]
pub struct CompilerInvocationBuilder {
    command: String,
    settings: CompilerSettings,
    separator: PathListSeparator,
}

impl Default for CompilerInvocationBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}

impl CompilerInvocationBuilder {
    /// Creates a builder for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            settings: CompilerSettings::default(),
            separator: PathListSeparator::default(),
        }
    }

    /// Sets the compiler settings.
    pub fn settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the separator used to join the classpath.
    pub fn separator(mut self, separator: PathListSeparator) -> Self {
        self.separator = separator;
        self
    }

    /// Assembles the invocation.
    ///
    /// # Errors
    ///
    /// Returns [`StubgenError::NonUtf8Path`] if the output directory or a
    /// generated file path is not valid UTF-8.
    pub fn build(
        &self,
        classpath: &ClasspathSet,
        output_dir: &Path,
        files: &GeneratedFileSet,
    ) -> StubgenResult<CompilerInvocation> {
        let mut args = Vec::with_capacity(7 + files.len());

        if let Some(ref source) = self.settings.source_level {
            args.push("-source".to_string());
            args.push(source.clone());
        }

        if let Some(ref target) = self.settings.target_level {
            args.push("-target".to_string());
            args.push(target.clone());
        }

        if self.settings.debug {
            args.push("-g".to_string());
        }

        args.push("-cp".to_string());
        args.push(classpath.join(self.separator));

        args.push("-d".to_string());
        args.push(utf8(output_dir)?);

        for file in files.iter() {
            args.push(utf8(file)?);
        }

        Ok(CompilerInvocation::new(self.command.clone(), args))
    }
}

fn utf8(path: &Path) -> StubgenResult<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| StubgenError::NonUtf8Path {
            path: path.to_path_buf(),
        })
}
