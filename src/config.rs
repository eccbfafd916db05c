use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Root page text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub title: String,
    pub description: String,
    pub summary: String,
}

/// Upstream input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub index: PathBuf,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub root_file: String,
    pub max_depth: usize,
    pub tree_view: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: "Library API".to_string(),
            description: String::new(),
            summary: String::new(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            index: PathBuf::from("doxygen/xml/index.xml"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./api"),
            root_file: "library_root.rst".to_string(),
            max_depth: 5,
            tree_view: false,
        }
    }
}

impl InputConfig {
    /// Directory holding the per-compound detail documents, next to index.xml
    pub fn xml_dir(&self) -> PathBuf {
        self.index.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        index: Option<PathBuf>,
        output: Option<PathBuf>,
        title: Option<String>,
        description: Option<String>,
        summary: Option<String>,
        root_file: Option<String>,
        max_depth: Option<usize>,
        tree_view: bool,
    ) {
        if let Some(path) = index {
            self.input.index = path;
        }

        if let Some(dir) = output {
            self.output.directory = dir;
        }

        if let Some(title) = title {
            self.project.title = title;
        }

        if let Some(description) = description {
            self.project.description = description;
        }

        if let Some(summary) = summary {
            self.project.summary = summary;
        }

        if let Some(root_file) = root_file {
            self.output.root_file = root_file;
        }

        if let Some(depth) = max_depth {
            self.output.max_depth = depth;
        }

        if tree_view {
            self.output.tree_view = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.max_depth == 0 {
            return Err(Error::config_validation("max_depth must be at least 1"));
        }

        if self.output.max_depth > 100 {
            return Err(Error::config_validation("max_depth cannot exceed 100"));
        }

        if !self.output.root_file.ends_with(".rst") {
            return Err(Error::config_validation(
                "root_file must name a .rst document",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.title, "Library API");
        assert_eq!(config.output.max_depth, 5);
        assert_eq!(config.output.root_file, "library_root.rst");
        assert!(!config.output.tree_view);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[project]
title = "Arbitrary API"
description = "Reference for the arbitrary library"

[input]
index = "build/xml/index.xml"

[output]
directory = "docs/api"
max_depth = 3
tree_view = true
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.project.title, "Arbitrary API");
        assert_eq!(config.input.index, PathBuf::from("build/xml/index.xml"));
        assert_eq!(config.output.directory, PathBuf::from("docs/api"));
        assert_eq!(config.output.max_depth, 3);
        assert!(config.output.tree_view);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_max_depth_zero() {
        let mut config = Config::default();
        config.output.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_max_depth_too_high() {
        let mut config = Config::default();
        config.output.max_depth = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_root_file_extension() {
        let mut config = Config::default();
        config.output.root_file = "index.html".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_cli_precedence() {
        let mut config = Config::default();
        config.merge_cli(
            Some(PathBuf::from("other/xml/index.xml")),
            Some(PathBuf::from("/custom/output")),
            Some("Custom Title".to_string()),
            None,
            None,
            Some("custom_root.rst".to_string()),
            Some(7),
            true,
        );

        assert_eq!(config.input.index, PathBuf::from("other/xml/index.xml"));
        assert_eq!(config.output.directory, PathBuf::from("/custom/output"));
        assert_eq!(config.project.title, "Custom Title");
        assert_eq!(config.output.root_file, "custom_root.rst");
        assert_eq!(config.output.max_depth, 7);
        assert!(config.output.tree_view);
    }

    #[test]
    fn test_merge_cli_keeps_defaults() {
        let mut config = Config::default();
        config.merge_cli(None, None, None, None, None, None, None, false);
        assert_eq!(config.project.title, "Library API");
        assert_eq!(config.output.max_depth, 5);
        assert!(!config.output.tree_view);
    }

    #[test]
    fn test_xml_dir_from_index_path() {
        let config = Config::default();
        assert_eq!(config.input.xml_dir(), PathBuf::from("doxygen/xml"));
    }
}
