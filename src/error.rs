//! Structured Error Handling for mamdani
//!
//! Provides a unified error type with:
//! - Error codes for programmatic handling
//! - Structured, JSON-friendly error values
//! - Context preservation (offending variable, set, token)
//! - Process exit code mapping for the command-line front end
//!
//! # Error Categories
//!
//! - Model errors (1xxx) - rejected while building a fuzzy system
//! - Evaluation errors (2xxx) - abort a simulation run
//! - Syntax errors (3xxx) - definition lines that cannot be parsed
//! - Config errors (7xxx) - configuration loading
//!
//! # Example
//!
//! ```rust
//! use mamdani::error::{ErrorCode, FuzzyError};
//!
//! fn lookup(name: &str) -> Result<(), FuzzyError> {
//!     Err(FuzzyError::undefined_variable(name).with_hint("declare it with add_variable first"))
//! }
//!
//! let err = lookup("not_a_var").unwrap_err();
//! assert_eq!(err.code, ErrorCode::UndefinedVariable);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Model errors (1xxx)
    /// Variable referenced but never declared
    UndefinedVariable = 1000,
    /// Fuzzy set referenced but never declared on its variable
    UndefinedFuzzySet = 1001,
    /// Wrong parameter count or ordering for a membership shape
    MalformedMembershipFunction = 1002,
    /// Variable name declared twice
    DuplicateVariable = 1003,
    /// Fuzzy set name declared twice on one variable
    DuplicateFuzzySet = 1004,
    /// Variable range is not a finite, ordered interval
    InvalidRange = 1005,
    /// Variable used in a role it was not declared with
    InvalidRole = 1006,
    /// Operator token outside {and, or, and_not} (strict mode only)
    UnrecognizedOperator = 1007,

    // Evaluation errors (2xxx)
    /// Crisp input is not a finite number
    InvalidInput = 2000,
    /// Model has no rules to evaluate
    EmptyRuleBase = 2001,

    // Syntax errors (3xxx)
    /// Definition line could not be parsed
    InvalidSyntax = 3000,
    /// Unknown shape token
    UnknownShape = 3001,
    /// Unknown role token
    UnknownRole = 3002,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Config file not found
    ConfigNotFound = 7001,
    /// Invalid config syntax
    InvalidConfigSyntax = 7002,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
}

/// Broad grouping of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Model,
    Evaluation,
    Syntax,
    Config,
    Internal,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UndefinedVariable => "Undefined variable",
            ErrorCode::UndefinedFuzzySet => "Undefined fuzzy set",
            ErrorCode::MalformedMembershipFunction => "Malformed membership function",
            ErrorCode::DuplicateVariable => "Duplicate variable",
            ErrorCode::DuplicateFuzzySet => "Duplicate fuzzy set",
            ErrorCode::InvalidRange => "Invalid variable range",
            ErrorCode::InvalidRole => "Invalid variable role",
            ErrorCode::UnrecognizedOperator => "Unrecognized operator",

            ErrorCode::InvalidInput => "Invalid crisp input",
            ErrorCode::EmptyRuleBase => "Empty rule base",

            ErrorCode::InvalidSyntax => "Invalid syntax",
            ErrorCode::UnknownShape => "Unknown membership shape",
            ErrorCode::UnknownRole => "Unknown variable role",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",

            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Get the category this code belongs to
    pub fn category(&self) -> ErrorCategory {
        match self.code() / 1000 {
            1 => ErrorCategory::Model,
            2 => ErrorCategory::Evaluation,
            3 => ErrorCategory::Syntax,
            7 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }

    /// Process exit code used by the command-line front end
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Syntax => 2,
            ErrorCategory::Model => 3,
            ErrorCategory::Evaluation => 4,
            ErrorCategory::Config => 5,
            ErrorCategory::Internal => 70,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Source location (file:line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for mamdani
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FuzzyError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    /// A variable name that the model does not declare
    pub fn undefined_variable(name: &str) -> Self {
        Self::new(
            ErrorCode::UndefinedVariable,
            format!("Variable '{}' not defined", name),
        )
        .with_context("variable", name)
    }

    /// A fuzzy set name that the variable does not declare
    pub fn undefined_fuzzy_set(variable: &str, set: &str) -> Self {
        Self::new(
            ErrorCode::UndefinedFuzzySet,
            format!("Fuzzy set '{}' not defined on variable '{}'", set, variable),
        )
        .with_context("variable", variable)
        .with_context("set", set)
    }

    /// A membership function whose parameters do not fit its shape
    pub fn malformed_membership(set: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedMembershipFunction, message).with_context("set", set)
    }

    pub fn duplicate_variable(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateVariable,
            format!("Variable '{}' is already defined", name),
        )
        .with_context("variable", name)
    }

    pub fn duplicate_fuzzy_set(variable: &str, set: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateFuzzySet,
            format!("Fuzzy set '{}' is already defined on variable '{}'", set, variable),
        )
        .with_context("variable", variable)
        .with_context("set", set)
    }

    /// A crisp input that is NaN or infinite
    pub fn invalid_input(variable: &str, value: f64) -> Self {
        Self::new(
            ErrorCode::InvalidInput,
            format!("Crisp value for '{}' must be finite, got {}", variable, value),
        )
        .with_context("variable", variable)
    }

    /// An operator token outside the supported set
    pub fn unrecognized_operator(token: &str) -> Self {
        Self::new(
            ErrorCode::UnrecognizedOperator,
            format!("Unknown operator: {}", token),
        )
        .with_context("operator", token)
        .with_hint("Supported operators are: and, or, and_not")
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add source location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.location = Some(location.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Look up a context field
    pub fn context_field(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.fields.get(key))
            .map(String::as_str)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for FuzzyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for FuzzyError {}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using FuzzyError
pub type FuzzyResult<T> = Result<T, FuzzyError>;

// ============================================================================
// Macros for convenient error creation
// ============================================================================

/// Create a FuzzyError with context from the current location
#[macro_export]
macro_rules! fuzzy_error {
    ($code:expr, $msg:expr) => {
        $crate::error::FuzzyError::new($code, $msg)
            .at(format!("{}:{}", file!(), line!()))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::FuzzyError::new($code, format!($fmt, $($arg)*))
            .at(format!("{}:{}", file!(), line!()))
    };
}

/// Bail out early with an error
#[macro_export]
macro_rules! fuzzy_bail {
    ($code:expr, $msg:expr) => {
        return Err($crate::fuzzy_error!($code, $msg))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::fuzzy_error!($code, $fmt, $($arg)*))
    };
}

/// Ensure a condition holds, or return an error
#[macro_export]
macro_rules! fuzzy_ensure {
    ($cond:expr, $code:expr, $msg:expr) => {
        if !$cond {
            $crate::fuzzy_bail!($code, $msg);
        }
    };
    ($cond:expr, $code:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::fuzzy_bail!($code, $fmt, $($arg)*);
        }
    };
}

// ============================================================================
// Tests
// ============================================================================
