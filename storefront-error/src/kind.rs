//! Error kinds for storefront operations

use std::fmt;

/// The kind of error that occurred.
///
/// This enum categorizes errors to help users write clear error handling logic.
/// Users can match on ErrorKind to decide how to handle specific error cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration or parameters
    ConfigInvalid,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Generation errors
    // =========================================================================
    /// A generated fact row references a dimension row that does not exist
    IntegrityViolation,

    // =========================================================================
    // Database errors
    // =========================================================================
    /// Opening, writing or reading the database failed
    DatabaseFailed,

    /// A required table is missing from the database
    TableMissing,

    // =========================================================================
    // Query errors
    // =========================================================================
    /// The model did not produce any SQL
    NoQueryProduced,

    /// The SQL was rejected before execution (not a single read-only SELECT)
    QueryRejected,

    /// The SQL failed to prepare or execute
    QueryFailed,

    // =========================================================================
    // Inference/LLM errors
    // =========================================================================
    /// LLM inference failed
    InferenceFailed,

    /// Provider not available (5xx, overloaded)
    ProviderUnavailable,

    /// Rate limit exceeded
    RateLimited,

    /// API key missing or rejected
    AuthenticationFailed,

    // =========================================================================
    // Output errors
    // =========================================================================
    /// Writing the CSV export failed
    ExportFailed,

    /// Rendering the chart failed
    ChartFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    /// Network error
    NetworkFailed,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Failed to parse input
    ParseFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            // General
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",

            // Generation
            ErrorKind::IntegrityViolation => "IntegrityViolation",

            // Database
            ErrorKind::DatabaseFailed => "DatabaseFailed",
            ErrorKind::TableMissing => "TableMissing",

            // Query
            ErrorKind::NoQueryProduced => "NoQueryProduced",
            ErrorKind::QueryRejected => "QueryRejected",
            ErrorKind::QueryFailed => "QueryFailed",

            // Inference
            ErrorKind::InferenceFailed => "InferenceFailed",
            ErrorKind::ProviderUnavailable => "ProviderUnavailable",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",

            // Output
            ErrorKind::ExportFailed => "ExportFailed",
            ErrorKind::ChartFailed => "ChartFailed",

            // IO
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::NetworkFailed => "NetworkFailed",

            // Parse
            ErrorKind::ParseFailed => "ParseFailed",
        }
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkFailed | ErrorKind::RateLimited | ErrorKind::ProviderUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
