//! Classpath assembly.
//!
//! Combines resolved dependencies and explicit runtime entries, drops every
//! location already visible to the running process, and orders the rest
//! deterministically so identical inputs always produce an identical
//! compiler command line.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::error::{StubgenError, StubgenResult};

/// Separator used to join a list of paths into one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathListSeparator {
    /// `:`
    Unix,
    /// `;`
    Windows,
}

impl PathListSeparator {
    /// Returns the separator for the platform this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            PathListSeparator::Windows
        } else {
            PathListSeparator::Unix
        }
    }

    /// Returns the separator character.
    pub fn as_char(&self) -> char {
        match self {
            PathListSeparator::Unix => ':',
            PathListSeparator::Windows => ';',
        }
    }

    /// Joins `items` with this separator.
    pub fn join<I, S>(&self, items: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                out.push(self.as_char());
            }
            out.push_str(item.as_ref());
        }
        out
    }
}

impl Default for PathListSeparator {
    fn default() -> Self {
        Self::host()
    }
}

impl FromStr for PathListSeparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" | ":" => Ok(PathListSeparator::Unix),
            "windows" | ";" => Ok(PathListSeparator::Windows),
            other => Err(format!(
                "unknown target platform '{}', expected 'unix' or 'windows'",
                other
            )),
        }
    }
}

/// One canonical classpath location.
///
/// Entries compare and order by their canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClasspathEntry {
    canonical: String,
}

impl ClasspathEntry {
    /// Canonicalizes `raw` against `base_dir`.
    ///
    /// `file:` URLs are reduced to their path, relative paths are made
    /// absolute, and `.`/`..` components are folded without touching the
    /// filesystem.
    pub fn parse(
        raw: &Path,
        base_dir: &Path,
        separator: PathListSeparator,
    ) -> StubgenResult<Self> {
        let display = raw.to_string_lossy().into_owned();
        let text = raw
            .to_str()
            .ok_or_else(|| StubgenError::malformed_entry(&display, "not valid UTF-8"))?;

        if text.is_empty() {
            return Err(StubgenError::malformed_entry(text, "empty entry"));
        }

        let path_text = strip_file_url(text)?;
        if path_text.is_empty() {
            return Err(StubgenError::malformed_entry(text, "URL has no path"));
        }
        if path_text.contains(separator.as_char()) {
            return Err(StubgenError::malformed_entry(
                text,
                format!("contains the path-list separator '{}'", separator.as_char()),
            ));
        }

        let absolute = absolutize(base_dir, Path::new(path_text));
        let canonical = absolute
            .to_str()
            .ok_or_else(|| StubgenError::malformed_entry(text, "not valid UTF-8"))?
            .to_string();

        Ok(Self { canonical })
    }

    /// Returns the entry as a path.
    pub fn path(&self) -> &Path {
        Path::new(&self.canonical)
    }

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl AsRef<str> for ClasspathEntry {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Deduplicated, ordered set of classpath entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClasspathSet {
    entries: Vec<ClasspathEntry>,
}

impl ClasspathSet {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ClasspathEntry> {
        self.entries.iter()
    }

    /// Returns true if `path` (already canonical) is in the set.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path() == path)
    }

    /// Returns the entries as canonical strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.canonical.clone()).collect()
    }

    /// Joins all entries with `separator`.
    pub fn join(&self, separator: PathListSeparator) -> String {
        separator.join(self.entries.iter().map(ClasspathEntry::as_str))
    }
}

impl<'a> IntoIterator for &'a ClasspathSet {
    type Item = &'a ClasspathEntry;
    type IntoIter = std::slice::Iter<'a, ClasspathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds a [`ClasspathSet`] from dependency, explicit and excluded entries.
#[derive(Debug, Clone)]
pub struct ClasspathBuilder {
    base_dir: PathBuf,
    separator: PathListSeparator,
    candidates: Vec<PathBuf>,
    visible: Vec<PathBuf>,
}

impl ClasspathBuilder {
    /// Creates a builder resolving relative entries against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            separator: PathListSeparator::default(),
            candidates: Vec::new(),
            visible: Vec::new(),
        }
    }

    /// Sets the target platform separator used to validate entries.
    pub fn separator(mut self, separator: PathListSeparator) -> Self {
        self.separator = separator;
        self
    }

    /// Adds resolved dependency locations.
    pub fn dependencies<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.candidates.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds explicit runtime classpath entries.
    pub fn entries<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.candidates.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds locations already visible to the running process. These are
    /// removed from the result.
    pub fn visible<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.visible.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Assembles the classpath.
    ///
    /// # Errors
    ///
    /// Returns [`StubgenError::MalformedClasspathEntry`] naming the first
    /// entry that cannot be canonicalized.
    pub fn build(&self) -> StubgenResult<ClasspathSet> {
        let mut set = BTreeSet::new();
        for raw in &self.candidates {
            set.insert(ClasspathEntry::parse(raw, &self.base_dir, self.separator)?);
        }

        for raw in &self.visible {
            let entry = ClasspathEntry::parse(raw, &self.base_dir, self.separator)?;
            if set.remove(&entry) {
                tracing::debug!(entry = %entry, "removing entry already visible to the running process");
            }
        }

        let classpath = ClasspathSet {
            entries: set.into_iter().collect(),
        };

        tracing::debug!(entries = classpath.len(), "assembled classpath");
        for entry in &classpath {
            tracing::debug!("  {}", entry);
        }

        Ok(classpath)
    }
}

/// Resolves `path` against `base` and folds `.`/`..` components lexically.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    normalize(&joined)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

fn strip_file_url(text: &str) -> StubgenResult<&str> {
    if let Some(rest) = text.strip_prefix("file://") {
        // file:///abs/path keeps its leading slash; file://localhost/abs drops the host.
        return Ok(match rest.find('/') {
            Some(0) => rest,
            Some(i) if &rest[..i] == "localhost" => &rest[i..],
            Some(_) | None => {
                return Err(StubgenError::malformed_entry(
                    text,
                    "file URL with a remote host",
                ))
            }
        });
    }
    if let Some(rest) = text.strip_prefix("file:") {
        return Ok(rest);
    }
    if let Some((scheme, _)) = text.split_once("://") {
        let is_scheme = scheme.len() > 1
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if is_scheme {
            return Err(StubgenError::malformed_entry(
                text,
                format!("unsupported URL scheme '{}'", scheme),
            ));
        }
    }
    Ok(text)
}
