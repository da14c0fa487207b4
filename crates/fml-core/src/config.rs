//! Serializer configuration
//!
//! Layout options can be stored as JSON alongside the mappings they format:
//!
//! ```json
//! { "indentStyle": "tabs", "indentSize": 4 }
//! ```
//!
//! Every field is optional; missing fields take the serializer defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::Result;
use crate::error::FmlError;
use crate::model::{IndentStyle, SerializerOptions};

/// Serializer configuration as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SerializerConfiguration {
    /// Indent style (spaces or tabs)
    pub indent_style: Option<IndentStyle>,

    /// Indentation size in spaces (when indent_style is 'spaces')
    pub indent_size: Option<usize>,
}

impl SerializerConfiguration {
    /// Parse a configuration from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| FmlError::config_error(format!("Invalid serializer config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading serializer config from {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|source| FmlError::io_error(path, source))?;
        Self::from_json_str(&content)
    }

    /// Merge another configuration (current takes precedence)
    pub fn merge_with(&mut self, other: SerializerConfiguration) {
        if self.indent_style.is_none() {
            self.indent_style = other.indent_style;
        }
        if self.indent_size.is_none() {
            self.indent_size = other.indent_size;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.indent_size == Some(0) && self.indent_style != Some(IndentStyle::Tabs) {
            return Err(FmlError::config_error(
                "indentSize must be at least 1 when indenting with spaces",
            ));
        }
        Ok(())
    }

    /// Resolve into serializer options, filling gaps with defaults
    pub fn to_options(&self) -> SerializerOptions {
        let defaults = SerializerOptions::default();
        SerializerOptions {
            indent_size: self.indent_size.unwrap_or(defaults.indent_size),
            indent_style: self.indent_style.unwrap_or(defaults.indent_style),
        }
    }
}

impl From<SerializerConfiguration> for SerializerOptions {
    fn from(config: SerializerConfiguration) -> Self {
        config.to_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fml.json");
        fs::write(&path, r#"{ "indentStyle": "tabs", "indentSize": 4 }"#).unwrap();

        let config = SerializerConfiguration::load(&path).unwrap();
        assert_eq!(config.indent_style, Some(IndentStyle::Tabs));
        assert_eq!(config.indent_size, Some(4));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let options = SerializerConfiguration::from_json_str("{}")
            .unwrap()
            .to_options();
        assert_eq!(options, SerializerOptions::default());

        let options: SerializerOptions =
            SerializerConfiguration::from_json_str(r#"{"indentSize": 4}"#)
                .unwrap()
                .into();
        assert_eq!(options.indent_size, 4);
        assert_eq!(options.indent_style, IndentStyle::Spaces);
    }

    #[test]
    fn test_merge_prefers_current() {
        let mut config = SerializerConfiguration {
            indent_size: Some(4),
            ..Default::default()
        };
        config.merge_with(SerializerConfiguration {
            indent_style: Some(IndentStyle::Tabs),
            indent_size: Some(8),
        });
        assert_eq!(config.indent_size, Some(4));
        assert_eq!(config.indent_style, Some(IndentStyle::Tabs));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = SerializerConfiguration::from_json_str(r#"{"indentStyle": "both"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = SerializerConfiguration::from_json_str(r#"{"indentSize": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = SerializerConfiguration::from_json_str(r#"{"lineWidth": 80}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = SerializerConfiguration::load(&temp_dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
