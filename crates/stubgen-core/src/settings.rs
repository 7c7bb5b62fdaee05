//! Compiler settings inherited from the enclosing build.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{StubgenError, StubgenResult};

/// Artifact id of the Maven plugin whose configuration is reused.
pub const COMPILER_PLUGIN_ARTIFACT_ID: &str = "maven-compiler-plugin";

/// Optional compiler flags. Absent values are omitted from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Value for `-source`.
    pub source_level: Option<String>,
    /// Value for `-target`.
    pub target_level: Option<String>,
    /// Whether to pass `-g`.
    pub debug: bool,
}

impl CompilerSettings {
    /// Creates empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source level.
    pub fn source_level(mut self, level: impl Into<String>) -> Self {
        self.source_level = Some(level.into());
        self
    }

    /// Sets the target level.
    pub fn target_level(mut self, level: impl Into<String>) -> Self {
        self.target_level = Some(level.into());
        self
    }

    /// Sets the debug flag.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reads settings from a Maven `pom.xml` file.
    pub fn from_pom_file(path: &Path) -> StubgenResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StubgenError::CompilerSettings {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_pom_str(&content).map_err(|e| StubgenError::CompilerSettings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reads settings from the `maven-compiler-plugin` configuration in a pom.
    ///
    /// `${name}` references are substituted from the pom's `<properties>`.
    /// A pom without the plugin yields empty settings.
    pub fn from_pom_str(content: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(content)?;
        let project = doc.root_element();
        let properties = read_properties(project);

        let configuration = child(project, "build")
            .and_then(|build| child(build, "plugins"))
            .and_then(|plugins| {
                plugins
                    .children()
                    .filter(|n| n.has_tag_name_local("plugin"))
                    .find(|plugin| {
                        child_text(*plugin, "artifactId").as_deref()
                            == Some(COMPILER_PLUGIN_ARTIFACT_ID)
                    })
            })
            .and_then(|plugin| child(plugin, "configuration"));

        let Some(configuration) = configuration else {
            return Ok(Self::default());
        };

        let value = |name: &str| {
            child_text(configuration, name).map(|raw| interpolate(&raw, &properties))
        };

        let mut settings = Self {
            source_level: value("source"),
            target_level: value("target"),
            debug: false,
        };

        if let Some(debug_raw) = value("debug") {
            match debug_raw.to_ascii_lowercase().as_str() {
                "true" => settings.debug = true,
                "false" => settings.debug = false,
                _ => tracing::warn!(
                    value = %debug_raw,
                    "Could not determine the value of 'debug' while re-using the compiler plugin configuration"
                ),
            }
        }

        Ok(settings)
    }
}

trait LocalName {
    fn has_tag_name_local(&self, name: &str) -> bool;
}

impl LocalName for Node<'_, '_> {
    fn has_tag_name_local(&self, name: &str) -> bool {
        self.is_element() && self.tag_name().name() == name
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name_local(name))
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn read_properties(project: Node<'_, '_>) -> HashMap<String, String> {
    child(project, "properties")
        .map(|props| {
            props
                .children()
                .filter(|n| n.is_element())
                .filter_map(|n| {
                    let value = n.text()?.trim().to_string();
                    Some((n.tag_name().name().to_string(), value))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Substitutes `${name}` references; unknown references are left as written.
fn interpolate(raw: &str, properties: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match properties.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        tracing::warn!(property = name, "unresolved property in compiler configuration");
                        out.push_str(&rest[start..start + 2 + end + 1]);
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <properties>
    <java.level>1.7</java.level>
  </properties>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-surefire-plugin</artifactId>
        <configuration><source>9</source></configuration>
      </plugin>
      <plugin>
        <groupId>org.apache.maven.plugins</groupId>
        <artifactId>maven-compiler-plugin</artifactId>
        <configuration>
          <source>${java.level}</source>
          <target>1.7</target>
          <debug>true</debug>
        </configuration>
      </plugin>
    </plugins>
  </build>
</project>"#;

    #[test]
    fn test_reads_compiler_plugin_configuration() {
        let settings = CompilerSettings::from_pom_str(POM).unwrap();
        assert_eq!(
            settings,
            CompilerSettings::new()
                .source_level("1.7")
                .target_level("1.7")
                .debug(true)
        );
    }

    #[test]
    fn test_missing_plugin_yields_defaults() {
        let pom = "<project><build><plugins/></build></project>";
        assert_eq!(
            CompilerSettings::from_pom_str(pom).unwrap(),
            CompilerSettings::default()
        );
        assert_eq!(
            CompilerSettings::from_pom_str("<project/>").unwrap(),
            CompilerSettings::default()
        );
    }

    #[test]
    fn test_unparseable_debug_is_off() {
        let pom = r#"<project><build><plugins><plugin>
            <artifactId>maven-compiler-plugin</artifactId>
            <configuration><debug>sometimes</debug><target>8</target></configuration>
        </plugin></plugins></build></project>"#;
        let settings = CompilerSettings::from_pom_str(pom).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.source_level, None);
        assert_eq!(settings.target_level.as_deref(), Some("8"));
    }

    #[test]
    fn test_invalid_xml_is_an_error() {
        assert!(CompilerSettings::from_pom_str("<project>").is_err());
    }

    #[test]
    fn test_from_pom_file_reports_path() {
        let err = CompilerSettings::from_pom_file(Path::new("/nonexistent/pom.xml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pom.xml"));
    }

    #[test]
    fn test_interpolate() {
        let mut props = HashMap::new();
        props.insert("a".to_string(), "1".to_string());
        assert_eq!(interpolate("${a}.${a}", &props), "1.1");
        assert_eq!(interpolate("x${missing}y", &props), "x${missing}y");
        assert_eq!(interpolate("open ${a", &props), "open ${a");
        assert_eq!(interpolate("plain", &props), "plain");
    }
}
