//! Error types for cell editors

use draftgrid_model::RecordId;

/// Editor interaction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Confirmed value is not one of the choice options
    #[error("value {value:?} is not a valid option for {label}")]
    UnknownOption {
        /// Rejected value
        value: String,
        /// Editor label
        label: String,
    },
}

/// Record-field resolution failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Referenced record does not exist
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Resolver backend failed
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_error_display() {
        let err = EditorError::UnknownOption {
            value: "Lost".to_string(),
            label: "Stage".to_string(),
        };
        assert_eq!(err.to_string(), "value \"Lost\" is not a valid option for Stage");
    }

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::NotFound(RecordId::new("001X"));
        assert!(err.to_string().contains("001X"));
    }
}
