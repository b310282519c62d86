use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DevtoolsError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "odb-devtools.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DevtoolsConfig {
    pub viewer: ViewerConfig,
    pub includes: IncludesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Shell command that reads source code on stdin and displays its AST.
    pub source_command: String,
    /// Diagram viewer; the dot-file path is passed as its last argument.
    pub dot_command: String,
    /// Directory the dot directories are resolved against. Defaults to the
    /// working directory.
    pub dot_root: Option<PathBuf>,
    pub dot_extension: String,
    /// Maps an ast_type to the directory holding its dot files. Types not
    /// listed use their own name as the directory.
    pub dot_dirs: HashMap<String, String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            source_command: "odb-cli --dba - --dump-ast-dot | xdot -".to_string(),
            dot_command: "xdot".to_string(),
            dot_root: None,
            dot_extension: "dot".to_string(),
            dot_dirs: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IncludesConfig {
    /// Vendored trees, in priority order. Each name doubles as the include
    /// prefix.
    pub trees: Vec<String>,
    /// File name globs selecting sources and headers inside the trees.
    pub patterns: Vec<String>,
}

impl Default for IncludesConfig {
    fn default() -> Self {
        Self {
            trees: vec!["bison".to_string(), "bison-util".to_string()],
            patterns: ["*.c", "*.h", "*.cc", "*.cpp", "*.hpp", "*.hxx", "*.y", "*.inc"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl DevtoolsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DevtoolsError::ConfigError(format!("parse error: {}", e)))
    }

    /// Loads the config from `config_path`, or from `odb-devtools.toml` in
    /// the working directory. A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub fn load<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        let (path, explicit) = match config_path.as_ref() {
            Some(p) => (p.as_ref().to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                return Err(DevtoolsError::FileNotFound(path));
            }
            tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            DevtoolsError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = DevtoolsConfig::from_toml_str(
            r#"
            [viewer]
            dot_command = "dot -Tx11"
            "#,
        )
        .unwrap();
        assert_eq!(config.viewer.dot_command, "dot -Tx11");
        assert_eq!(config.viewer.dot_extension, "dot");
        assert_eq!(config.includes, IncludesConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let result = DevtoolsConfig::from_toml_str("[viewer\n");
        assert!(matches!(result, Err(DevtoolsError::ConfigError(_))));
    }
}
