//! External collaborators consumed by the controller
//!
//! The controller never talks to a backend directly. It consumes:
//! - [`RecordSource`]: fetch related rows, persist drafts
//! - [`SchemaProvider`]: record type and choice-list metadata
//! - [`Notifier`]: user-visible notifications
//!
//! Lookup display names go through [`draftgrid_editor::RecordResolver`].

use crate::error::SourceError;
use async_trait::async_trait;
use draftgrid_model::{ChoiceOption, DraftEntry, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Acknowledgement returned by a successful persist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Records the backend updated
    pub updated: Vec<RecordId>,
}

/// Row data backend
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Rows related to `parent`
    async fn fetch_related_rows(&self, parent: &RecordId) -> Result<Vec<Record>, SourceError>;

    /// Submit a batch of drafts
    async fn persist_edits(&self, edits: &[DraftEntry]) -> Result<Ack, SourceError>;

    /// Drop cached copies of `ids` after a successful persist
    async fn invalidate(&self, _ids: &[RecordId]) {}
}

/// Object metadata backend
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Default record type of `object`
    async fn default_record_type(&self, object: &str) -> Result<String, SourceError>;

    /// Options of choice-list `field` for `record_type`
    async fn choice_options(
        &self,
        object: &str,
        record_type: &str,
        field: &str,
    ) -> Result<Vec<ChoiceOption>, SourceError>;
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Degraded but continuing
    Warning,
    /// Informational
    Info,
}

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Title line
    pub title: String,
    /// Body
    pub message: String,
    /// Severity
    pub variant: NotificationVariant,
}

impl Notification {
    /// Success notification
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationVariant::Success)
    }

    /// Error notification
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationVariant::Error)
    }

    /// Warning notification
    #[must_use]
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationVariant::Warning)
    }

    fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        variant: NotificationVariant,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant,
        }
    }
}

/// Notification sink
pub trait Notifier: Send + Sync {
    /// Show `notification` to the user
    fn notify(&self, notification: Notification);
}
