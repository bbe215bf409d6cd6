use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where documents are read from when a bare name is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Editor behavior and the style sheet parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub markdown_shortcuts: bool,
    pub undo_limit: usize,
    pub base_font_size: f32,
    pub font_family: String,
    pub code_font_family: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            markdown_shortcuts: true,
            undo_limit: 100,
            base_font_size: 16.0,
            font_family: "system-ui".to_string(),
            code_font_family: "monospace".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.documents_path = config
            .documents_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    /// The config file if there is one, defaults otherwise.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blockdoc");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Resolve a document argument: relative paths are looked up under
    /// `documents_path` when one is configured.
    pub fn resolve_document(&self, path: &Path) -> PathBuf {
        match &self.documents_path {
            Some(root) if path.is_relative() && !path.exists() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/blockdoc/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert!(config.editor.markdown_shortcuts);
        assert_eq!(config.editor.undo_limit, 100);
    }

    #[test]
    fn test_partial_editor_table_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[editor]
markdown_shortcuts = false
base_font_size = 14.0
"#,
        )
        .unwrap();

        assert!(!config.editor.markdown_shortcuts);
        assert_eq!(config.editor.base_font_size, 14.0);
        assert_eq!(config.editor.code_font_family, "monospace");
        assert_eq!(config.documents_path, None);
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("BLOCKDOC_TEST_VAR", "/test/env/path");
        }

        let expanded = Config::expand_path(Path::new("$BLOCKDOC_TEST_VAR/subdir")).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("BLOCKDOC_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/docs")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("docs"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(temp_dir.path().join("nonexistent.toml")).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "editor = 3").unwrap();

        let error = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(error, ConfigError::ConfigParseError { .. }));
        assert!(error.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let config = Config {
            documents_path: Some(PathBuf::from("/tmp/test-docs")),
            editor: EditorConfig {
                undo_limit: 10,
                ..EditorConfig::default()
            },
        };

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_resolve_document_uses_documents_path() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            documents_path: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };

        assert_eq!(
            config.resolve_document(Path::new("notes.json")),
            temp_dir.path().join("notes.json")
        );
        assert_eq!(
            config.resolve_document(Path::new("/abs/notes.json")),
            PathBuf::from("/abs/notes.json")
        );
    }
}
