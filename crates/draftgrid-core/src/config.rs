//! Grid configuration
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration for the opportunity grid.
//!
//! ```toml
//! object_api_name = "Opportunity"
//! choice_field = "StageName"
//! choice_column_index = 2
//!
//! [[field_map]]
//! label = "Stage"
//! field = "StageName"
//! class_slot = "StageName"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// OS error text
        message: String,
    },

    /// Not valid TOML for this schema
    #[error("invalid config syntax: {0}")]
    Parse(String),

    /// Parsed but semantically invalid
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Maps an editor's semantic label to a concrete row field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Editor label, e.g. `Stage`
    pub label: String,
    /// Row field written by edits, e.g. `StageName`
    pub field: String,
    /// Row field whose annotation class reflects the edit
    pub class_slot: String,
}

impl FieldMapping {
    /// Mapping whose annotation lives on the edited field itself
    #[must_use]
    pub fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            label: label.into(),
            class_slot: field.clone(),
            field,
        }
    }
}

/// Save notification texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Title of the success notification
    pub success_title: String,
    /// Body of the success notification
    pub success_message: String,
    /// Title of the failure notification; the body is the failure detail
    pub error_title: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            success_title: "Success".to_string(),
            success_message: "Opportunities updated successfully".to_string(),
            error_title: "Error while updating or refreshing records".to_string(),
        }
    }
}

/// Grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Object whose rows the grid edits
    pub object_api_name: String,
    /// Field edited by the choice column
    pub choice_field: String,
    /// Position of the choice column in the schema
    pub choice_column_index: usize,
    /// Raise a warning notification when fetching rows fails
    pub notify_fetch_failures: bool,
    /// Capacity of the lookup display-name cache
    pub lookup_cache_capacity: u64,
    /// Label to field mapping for editor signals
    pub field_map: Vec<FieldMapping>,
    /// Notification texts
    pub messages: Messages,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            object_api_name: "Opportunity".to_string(),
            choice_field: "StageName".to_string(),
            choice_column_index: 2,
            notify_fetch_failures: false,
            lookup_cache_capacity: 1000,
            field_map: vec![
                FieldMapping::new("Stage", "StageName"),
                FieldMapping::new("Account", "AccountId"),
            ],
            messages: Messages::default(),
        }
    }
}

impl GridConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML, `ConfigError::Invalid` on a
    /// bad field map.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`GridConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Serialize to TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the field map
    ///
    /// # Errors
    /// `ConfigError::Invalid` on an empty or duplicate label, or an empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for mapping in &self.field_map {
            if mapping.label.trim().is_empty() {
                return Err(ConfigError::Invalid("field_map label is empty".to_string()));
            }
            if mapping.field.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "field_map entry {} has an empty field",
                    mapping.label
                )));
            }
            if !seen.insert(mapping.label.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate field_map label {}",
                    mapping.label
                )));
            }
        }
        Ok(())
    }

    /// Mapping for an editor label
    #[must_use]
    pub fn mapping(&self, label: &str) -> Option<&FieldMapping> {
        self.field_map.iter().find(|m| m.label == label)
    }

    /// With object name
    #[must_use]
    pub fn with_object(mut self, object_api_name: impl Into<String>) -> Self {
        self.object_api_name = object_api_name.into();
        self
    }

    /// With choice field and column position
    #[must_use]
    pub fn with_choice_field(mut self, field: impl Into<String>, index: usize) -> Self {
        self.choice_field = field.into();
        self.choice_column_index = index;
        self
    }

    /// With an extra label mapping
    #[must_use]
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.field_map.push(mapping);
        self
    }

    /// With fetch-failure notifications on or off
    #[must_use]
    pub fn with_fetch_failure_notifications(mut self, enabled: bool) -> Self {
        self.notify_fetch_failures = enabled;
        self
    }

    /// With notification texts
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(GridConfig::from_toml_str("").unwrap(), GridConfig::default());
    }

    #[test]
    fn default_mappings() {
        let config = GridConfig::default();
        assert_eq!(config.mapping("Stage").map(|m| m.field.as_str()), Some("StageName"));
        assert_eq!(config.mapping("Account").map(|m| m.field.as_str()), Some("AccountId"));
        assert!(config.mapping("Amount").is_none());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = GridConfig::default()
            .with_choice_field("Priority__c", 1)
            .with_mapping(FieldMapping::new("Priority", "Priority__c"))
            .with_fetch_failure_notifications(true);

        let text = config.to_toml_string().unwrap();
        assert_eq!(GridConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GridConfig::from_toml_str(
            r#"
            choice_column_index = 1

            [messages]
            success_title = "Saved"
            "#,
        )
        .unwrap();
        assert_eq!(config.choice_column_index, 1);
        assert_eq!(config.messages.success_title, "Saved");
        assert_eq!(config.messages.error_title, Messages::default().error_title);
        assert_eq!(config.choice_field, "StageName");
    }

    #[test]
    fn duplicate_label_rejected() {
        let err = GridConfig::from_toml_str(
            r#"
            [[field_map]]
            label = "Stage"
            field = "StageName"
            class_slot = "StageName"

            [[field_map]]
            label = "Stage"
            field = "Other"
            class_slot = "Other"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn empty_label_rejected() {
        let config = GridConfig::default().with_mapping(FieldMapping::new(" ", "X"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn bad_syntax_is_parse_error() {
        let err = GridConfig::from_toml_str("choice_column_index = \"two\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.toml");
        std::fs::write(&path, "notify_fetch_failures = true\n").unwrap();

        let config = GridConfig::load(&path).unwrap();
        assert!(config.notify_fetch_failures);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = GridConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
