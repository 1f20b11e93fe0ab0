//! Error types for agora operations

use thiserror::Error;

/// Schema-level errors raised at the field mutation boundary.
///
/// These are caught before a project reaches the serializer; the serializer
/// assumes a schema-valid project and does not re-validate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field name: {name}")]
    DuplicateName { name: String },

    #[error("Invalid field type: {value}")]
    InvalidType { value: String },

    #[error("Reserved meta field name: {name}")]
    ReservedFieldName { name: String },

    #[error("Field '{name}' declares both default and default_factory")]
    ConflictingDefault { name: String },

    #[error("Invalid field name '{name}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidFieldName { name: String },
}

/// Export precondition errors. Always hard failures, no best-effort export.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No server target supplied for export")]
    MissingServerTarget,

    #[error("Unrecognized manager type: {value}")]
    UnrecognizedManagerType { value: String },
}

/// Document import errors. Always returned, never panicked, so the caller
/// can surface them and leave existing state untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: String },

    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("Unrecognized manager type: {value}")]
    UnrecognizedManagerType { value: String },
}

/// Master error type for all agora errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgoraError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

/// Result type alias for agora operations.
pub type AgoraResult<T> = Result<T, AgoraError>;

// =============================================================================
// TESTS
// =============================================================================
