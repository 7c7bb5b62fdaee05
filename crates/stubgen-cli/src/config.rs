//! Project configuration file.
//!
//! A `stubgen.json` file describes one project: the interfaces to generate
//! stubs for, where sources and classes go, the classpath inputs, and the
//! external generator and compiler commands. Relative paths are resolved
//! against the directory containing the file.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use stubgen_core::orchestrator::{DEFAULT_CLASSES_DIR, DEFAULT_PACKAGE_SUBDIR, DEFAULT_SOURCE_ROOT};
use stubgen_core::{
    CompilerSettings, OrchestratorConfig, PathListSeparator, StaticDependencyResolver,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "stubgen.json";

/// Default compiler deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable naming the JDK installation.
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

/// Compiler section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Compiler executable. Located automatically when absent.
    pub command: Option<String>,
    /// Value for `-source`; overrides the pom.
    pub source: Option<String>,
    /// Value for `-target`; overrides the pom.
    pub target: Option<String>,
    /// Whether to pass `-g`; overrides the pom.
    pub debug: Option<bool>,
}

/// Generator section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Generator executable.
    pub command: String,
    /// Arguments placed before the type name and output directory.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Contents of a `stubgen.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StubgenConfig {
    pub interfaces: Vec<String>,
    pub source_root: PathBuf,
    pub package_subdir: String,
    pub classes_dir: PathBuf,
    pub classpath_elements: Vec<PathBuf>,
    pub dependencies: Vec<PathBuf>,
    pub visible_locations: Vec<PathBuf>,
    pub compiler: CompilerConfig,
    pub pom: Option<PathBuf>,
    pub generator: Option<GeneratorConfig>,
    /// Compiler deadline; `0` disables it.
    pub timeout_secs: u64,
    /// `unix` or `windows`; the host platform when absent.
    pub target_platform: Option<String>,
    /// Skip checking that requested types exist before generating.
    pub assume_types_exist: bool,

    /// Directory the file was loaded from.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for StubgenConfig {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            package_subdir: DEFAULT_PACKAGE_SUBDIR.to_string(),
            classes_dir: PathBuf::from(DEFAULT_CLASSES_DIR),
            classpath_elements: Vec::new(),
            dependencies: Vec::new(),
            visible_locations: Vec::new(),
            compiler: CompilerConfig::default(),
            pom: None,
            generator: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            target_platform: None,
            assume_types_exist: false,
            base_dir: PathBuf::from("."),
        }
    }
}

impl StubgenConfig {
    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        config.base_dir = if parent.as_os_str().is_empty() {
            std::env::current_dir().context("Failed to determine current directory")?
        } else if parent.is_absolute() {
            parent.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to determine current directory")?
                .join(parent)
        };

        tracing::debug!(path = %path.display(), base_dir = %config.base_dir.display(), "loaded config");
        Ok(config)
    }

    /// Parses configuration JSON. `base_dir` is left at `.`.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolves `path` against the configuration directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        stubgen_core::classpath::absolutize(&self.base_dir, path)
    }

    /// Returns the classpath separator for the target platform.
    pub fn separator(&self) -> Result<PathListSeparator> {
        match self.target_platform {
            Some(ref name) => name.parse().map_err(|e: String| anyhow!(e)),
            None => Ok(PathListSeparator::host()),
        }
    }

    /// Returns the compiler deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Compiler settings from the pom, overridden field by field by the
    /// `compiler` section.
    pub fn compiler_settings(&self) -> Result<CompilerSettings> {
        let mut settings = match self.pom {
            Some(ref pom) => CompilerSettings::from_pom_file(&self.resolve(pom))?,
            None => CompilerSettings::default(),
        };

        if let Some(ref source) = self.compiler.source {
            settings.source_level = Some(source.clone());
        }
        if let Some(ref target) = self.compiler.target {
            settings.target_level = Some(target.clone());
        }
        if let Some(debug) = self.compiler.debug {
            settings.debug = debug;
        }
        Ok(settings)
    }

    /// Returns a dependency resolver over the configured lists.
    pub fn dependency_resolver(&self) -> StaticDependencyResolver {
        StaticDependencyResolver::new(
            self.dependencies.iter().map(|p| self.resolve(p)),
            self.visible_locations.iter().map(|p| self.resolve(p)),
        )
    }

    /// Finds the compiler: the configured command, then
    /// `$JAVA_HOME/bin/javac`, then `javac` on `PATH`.
    pub fn locate_compiler(&self) -> Result<String> {
        locate_compiler(
            self.compiler.command.as_deref(),
            std::env::var_os(JAVA_HOME_ENV).map(PathBuf::from),
        )
    }

    /// Builds the orchestrator configuration.
    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig> {
        let mut config = OrchestratorConfig::with_base_dir(&self.base_dir)
            .source_root(&self.source_root)
            .package_subdir(&self.package_subdir)
            .classes_dir(&self.classes_dir)
            .compiler(self.locate_compiler()?)
            .settings(self.compiler_settings()?)
            .separator(self.separator()?);
        config.interfaces = self.interfaces.clone();
        config.classpath_elements = self.classpath_elements.clone();
        config.timeout = self.timeout();
        Ok(config)
    }
}

fn compiler_names() -> &'static [&'static str] {
    if cfg!(windows) {
        &["javac.exe", "javac"]
    } else {
        &["javac"]
    }
}

/// Locates the compiler from an explicit command and a JDK home.
pub fn locate_compiler(explicit: Option<&str>, java_home: Option<PathBuf>) -> Result<String> {
    if let Some(command) = explicit {
        let path = Path::new(command);
        if path.components().count() > 1 || path.exists() {
            return Ok(command.to_string());
        }
        return which::which(command)
            .map(|p| p.display().to_string())
            .with_context(|| format!("Configured compiler '{}' not found in PATH", command));
    }

    if let Some(home) = java_home {
        for name in compiler_names() {
            let candidate = home.join("bin").join(name);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "using compiler from {}", JAVA_HOME_ENV);
                return Ok(candidate.display().to_string());
            }
        }
    }

    for name in compiler_names() {
        if let Ok(path) = which::which(name) {
            return Ok(path.display().to_string());
        }
    }

    bail!(
        "No Java compiler found. Set compiler.command in {}, set {}, or put javac on PATH",
        DEFAULT_CONFIG_FILE,
        JAVA_HOME_ENV
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = StubgenConfig::from_json("{}").unwrap();
        assert_eq!(config, StubgenConfig::default());
        assert_eq!(config.timeout(), Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        assert_eq!(config.separator().unwrap(), PathListSeparator::host());
    }

    #[test]
    fn test_full_config() {
        let config = StubgenConfig::from_json(
            r#"{
                "interfaces": ["com.acme.Api"],
                "source_root": "gen",
                "package_subdir": "ws",
                "classes_dir": "out",
                "classpath_elements": ["lib/a.jar"],
                "dependencies": ["/m2/b.jar"],
                "visible_locations": ["/m2/plugin.jar"],
                "compiler": {"command": "/jdk/bin/javac", "source": "1.7", "debug": true},
                "generator": {"command": "wsgen", "args": ["-keep"]},
                "timeout_secs": 0,
                "target_platform": "windows",
                "assume_types_exist": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.interfaces, vec!["com.acme.Api"]);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.separator().unwrap(), PathListSeparator::Windows);
        assert_eq!(
            config.generator,
            Some(GeneratorConfig {
                command: "wsgen".into(),
                args: vec!["-keep".into()],
            })
        );

        let settings = config.compiler_settings().unwrap();
        assert_eq!(settings.source_level.as_deref(), Some("1.7"));
        assert_eq!(settings.target_level, None);
        assert!(settings.debug);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(StubgenConfig::from_json(r#"{"interfaces": [], "bogus": 1}"#).is_err());
    }

    #[test]
    fn test_bad_platform() {
        let config = StubgenConfig::from_json(r#"{"target_platform": "vms"}"#).unwrap();
        let err = config.separator().unwrap_err();
        assert!(err.to_string().contains("vms"));
    }

    #[test]
    fn test_explicit_settings_override_pom() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pom.xml"),
            r#"<project><build><plugins><plugin>
                <artifactId>maven-compiler-plugin</artifactId>
                <configuration><source>1.6</source><target>1.6</target><debug>true</debug></configuration>
            </plugin></plugins></build></project>"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"pom": "pom.xml", "compiler": {"target": "1.8", "debug": false}}"#,
        )
        .unwrap();

        let config = StubgenConfig::load(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        let settings = config.compiler_settings().unwrap();
        assert_eq!(settings.source_level.as_deref(), Some("1.6"));
        assert_eq!(settings.target_level.as_deref(), Some("1.8"));
        assert!(!settings.debug);
    }

    #[test]
    fn test_relative_paths_use_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, r#"{"dependencies": ["m2/a.jar"]}"#).unwrap();

        let config = StubgenConfig::load(&path).unwrap();
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(
            config.resolve(Path::new("m2/a.jar")),
            dir.path().join("m2/a.jar")
        );
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = StubgenConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_locate_explicit_path() {
        assert_eq!(
            locate_compiler(Some("/opt/jdk/bin/javac"), None).unwrap(),
            "/opt/jdk/bin/javac"
        );
    }

    #[test]
    fn test_locate_from_java_home() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("bin")).unwrap();
        let javac = home.path().join("bin").join(compiler_names()[0]);
        std::fs::write(&javac, "").unwrap();

        assert_eq!(
            locate_compiler(None, Some(home.path().to_path_buf())).unwrap(),
            javac.display().to_string()
        );
    }

    #[test]
    fn test_locate_unknown_bare_name() {
        let err = locate_compiler(Some("no-such-javac-xyz"), None).unwrap_err();
        assert!(err.to_string().contains("no-such-javac-xyz"));
    }
}
