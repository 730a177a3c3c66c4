//! Error types for the data model

/// Model-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A record id was empty or whitespace
    #[error("record id must not be empty")]
    EmptyRecordId,

    /// A column index was outside the schema
    #[error("column index {index} out of range (len: {len})")]
    ColumnOutOfRange {
        /// Requested index
        index: usize,
        /// Number of columns
        len: usize,
    },
}
