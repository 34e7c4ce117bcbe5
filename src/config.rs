/*!
# Extractor Configuration

Thresholds and vocabularies for one extraction run. Loadable from TOML or
YAML; field names are snake_case with camelCase aliases accepted.

```toml
min_block_lines = 10
min_occurrences = 2
max_components = 25
max_params = 10
self_closing_tags = ["br", "img", "input"]
structural_keywords = ["map", "if", "else"]
```
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::core::ConfigError;

/// HTML void elements: implicitly self-closing even without `/>`.
pub const DEFAULT_SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Identifiers that describe structure rather than data. They stay literal in signatures
/// and never become parameters.
pub const DEFAULT_STRUCTURAL_KEYWORDS: &[&str] = &[
    // literals and operators
    "true", "false", "null", "undefined", "this", "typeof", "instanceof", "new", "void", "delete",
    "in", "of", "as",
    // conditionals
    "if", "else", "unless", "switch", "case", "default", "await", "async", "return",
    // iteration
    "for", "each", "map", "filter", "forEach", "reduce", "some", "every", "while", "key",
    // declarations
    "function", "const", "let", "var",
    // event binding
    "on", "bind", "emit", "event", "preventDefault", "stopPropagation",
];

/// Configuration for one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Minimum number of lines a block must span to be considered
    #[serde(default = "default_min_block_lines", alias = "minBlockLines")]
    pub min_block_lines: usize,

    /// Minimum cluster size
    #[serde(default = "default_min_occurrences", alias = "minOccurrences")]
    pub min_occurrences: usize,

    /// Maximum number of synthesized components
    #[serde(default = "default_max_components", alias = "maxComponents")]
    pub max_components: usize,

    /// Maximum number of parameters per component
    #[serde(default = "default_max_params", alias = "maxParams")]
    pub max_params: usize,

    /// Tag names treated as self-closing without an explicit `/>`
    #[serde(default = "default_self_closing_tags", alias = "selfClosingTags")]
    pub self_closing_tags: BTreeSet<String>,

    /// Slot identifiers kept literal during normalization
    #[serde(
        default = "default_structural_keywords",
        alias = "structuralKeywordAllowList",
        alias = "structuralKeywords"
    )]
    pub structural_keywords: BTreeSet<String>,
}

fn default_min_block_lines() -> usize {
    10
}

fn default_min_occurrences() -> usize {
    2
}

fn default_max_components() -> usize {
    25
}

fn default_max_params() -> usize {
    10
}

fn default_self_closing_tags() -> BTreeSet<String> {
    DEFAULT_SELF_CLOSING_TAGS.iter().map(|s| s.to_string()).collect()
}

fn default_structural_keywords() -> BTreeSet<String> {
    DEFAULT_STRUCTURAL_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_block_lines: default_min_block_lines(),
            min_occurrences: default_min_occurrences(),
            max_components: default_max_components(),
            max_params: default_max_params(),
            self_closing_tags: default_self_closing_tags(),
            structural_keywords: default_structural_keywords(),
        }
    }
}

impl ExtractorConfig {
    pub fn with_min_block_lines(mut self, lines: usize) -> Self {
        self.min_block_lines = lines;
        self
    }

    pub fn with_min_occurrences(mut self, occurrences: usize) -> Self {
        self.min_occurrences = occurrences;
        self
    }

    pub fn with_max_components(mut self, components: usize) -> Self {
        self.max_components = components;
        self
    }

    pub fn with_max_params(mut self, params: usize) -> Self {
        self.max_params = params;
        self
    }

    pub fn with_self_closing_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.self_closing_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Validate thresholds. Runs before any document is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_occurrences < 2 {
            return Err(ConfigError::MinOccurrencesTooSmall(self.min_occurrences));
        }
        if self.max_components == 0 {
            return Err(ConfigError::NonPositiveMaxComponents);
        }
        if self.self_closing_tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::EmptyKeyword {
                set: "self_closing_tags",
            });
        }
        if self.structural_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyKeyword {
                set: "structural_keywords",
            });
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read extractor config from {}", path.as_ref().display())
        })?;

        let config: Self = toml::from_str(&content).with_context(|| {
            format!("Failed to parse TOML config from {}", path.as_ref().display())
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read extractor config from {}", path.as_ref().display())
        })?;

        let config: Self = serde_yaml::from_str(&content).with_context(|| {
            format!("Failed to parse YAML config from {}", path.as_ref().display())
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::load_from_yaml(path),
            _ => Self::load_from_file(path),
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize extractor config to TOML")?;

        std::fs::write(&path, content).with_context(|| {
            format!("Failed to write extractor config to {}", path.as_ref().display())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert_eq!(config.min_block_lines, 10);
        assert_eq!(config.min_occurrences, 2);
        assert_eq!(config.max_components, 25);
        assert_eq!(config.max_params, 10);
        assert!(config.self_closing_tags.contains("br"));
        assert!(config.structural_keywords.contains("map"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_small_min_occurrences() {
        let config = ExtractorConfig::default().with_min_occurrences(1);
        assert_eq!(config.validate(), Err(ConfigError::MinOccurrencesTooSmall(1)));
    }

    #[test]
    fn test_rejects_zero_max_components() {
        let config = ExtractorConfig::default().with_max_components(0);
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveMaxComponents));
    }

    #[test]
    fn test_rejects_blank_tag() {
        let config = ExtractorConfig::default().with_self_closing_tags(["br", " "]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyKeyword { set: "self_closing_tags" })
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ExtractorConfig = toml::from_str("min_block_lines = 4").unwrap();
        assert_eq!(config.min_block_lines, 4);
        assert_eq!(config.max_params, 10);
        assert!(config.self_closing_tags.contains("img"));
    }

    #[test]
    fn test_camel_case_aliases() {
        let config: ExtractorConfig =
            serde_json::from_str(r#"{"minBlockLines": 3, "minOccurrences": 3}"#).unwrap();
        assert_eq!(config.min_block_lines, 3);
        assert_eq!(config.min_occurrences, 3);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let config = ExtractorConfig::default().with_max_params(4);

        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let loaded = ExtractorConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_rejects_invalid_thresholds() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "min_occurrences = 1\n").unwrap();
        let err = ExtractorConfig::load_from_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("min_occurrences"));
    }

    #[test]
    fn test_load_yaml() {
        let temp_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "max_components: 3\nself_closing_tags: [br]\n").unwrap();
        let config = ExtractorConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.max_components, 3);
        assert_eq!(config.self_closing_tags.len(), 1);
    }
}
