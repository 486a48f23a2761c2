//! Error handling for jobtmpl
//!
//! This module provides the error types and user-facing error reporting for the
//! template validator and composition engine. It follows two principles:
//! 1. **Strongly-typed errors** so callers can tell a bad parent reference from
//!    a transport failure without string matching
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`JobTmplError`] - Enumerated error types for every failure mode
//! - [`ErrorContext`] - Wrapper that adds a suggestion and details for display
//!
//! Fallible functions return [`anyhow::Result`]. Domain failures are raised as
//! [`JobTmplError`] values and recovered with `downcast_ref` where a caller
//! needs to classify them, for example when the result assembler decides
//! whether a failure is fatal to composition or a transport problem.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jobtmpl_cli::core::{JobTmplError, user_friendly_error};
//!
//! let error = JobTmplError::TemplateNotFound {
//!     reference: "tools/node@2".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for jobtmpl operations
///
/// # Error Categories
///
/// ## Document Loading
/// - [`ParseError`](Self::ParseError) - Input is not well-formed YAML/JSON
/// - [`ValidationFailed`](Self::ValidationFailed) - Structural violations were found
///
/// ## Composition
/// - [`TemplateNotFound`](Self::TemplateNotFound) - The parent reference does not resolve
/// - [`MissingLockedSteps`](Self::MissingLockedSteps) - `order` omits locked parent steps
///
/// ## Template Store
/// - [`InvalidReference`](Self::InvalidReference) - Malformed `namespace/name@version`
/// - [`StoreError`](Self::StoreError) - The store could not answer a lookup
///
/// ## Configuration
/// - [`ConfigError`](Self::ConfigError) - The tool configuration is unusable
///
/// I/O and deserialization failures stay as their source error inside
/// [`anyhow::Error`] with path context attached; [`user_friendly_error`]
/// recognises them by type.
#[derive(Error, Debug, Clone)]
pub enum JobTmplError {
    /// The document text could not be parsed
    #[error("Failed to parse template document: {reason}")]
    ParseError {
        /// Parser message, including position when the parser reports one
        reason: String,
    },

    /// The document failed structural validation
    #[error("Template validation failed with {count} error(s)")]
    ValidationFailed {
        /// Number of field-level violations
        count: usize,
    },

    /// The parent template reference could not be resolved by the store
    #[error("Template {reference} does not exist")]
    TemplateNotFound {
        /// The reference exactly as written in `config.template`
        reference: String,
    },

    /// The child's `order` omits steps the parent locked
    #[error(
        "Order must contain all locked steps from template {reference}; missing: {}",
        steps.join(", ")
    )]
    MissingLockedSteps {
        /// The parent reference
        reference: String,
        /// Locked step names absent from `order`, in parent step order
        steps: Vec<String>,
    },

    /// A template reference string is malformed
    #[error("Invalid template reference '{reference}': {reason}")]
    InvalidReference {
        /// The offending reference
        reference: String,
        /// Why it was rejected
        reason: String,
    },

    /// The template store failed while answering a lookup
    #[error("Template store lookup failed for '{reference}': {reason}")]
    StoreError {
        /// The reference being looked up
        reference: String,
        /// Underlying failure
        reason: String,
    },

    /// Configuration file problems
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl JobTmplError {
    /// Returns `true` for failures that make composition impossible for the
    /// given input: an unresolvable or malformed parent reference, or an
    /// `order` that drops locked steps.
    ///
    /// These are reported as fatal outcomes rather than propagated as errors.
    #[must_use]
    pub const fn is_composition_failure(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound { .. }
                | Self::MissingLockedSteps { .. }
                | Self::InvalidReference { .. }
        )
    }

    /// Returns `true` when the document text itself is malformed.
    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}

/// Error wrapper carrying a suggestion and details for terminal display
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: JobTmplError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Extra background on the failure
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: JobTmplError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// Known [`JobTmplError`] variants get tailored suggestions; I/O and TOML
/// errors are recognised by type; anything else is reported with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(jobtmpl_error) = error.downcast_ref::<JobTmplError>() {
        return create_error_context(jobtmpl_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(JobTmplError::Other {
                    message: format!("File not found: {error:#}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(JobTmplError::Other {
                    message: format!("Permission denied: {error:#}"),
                })
                .with_suggestion("Check file ownership and permissions");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(JobTmplError::ConfigError {
            message: format!("{error:#}"),
        })
        .with_suggestion("Check the TOML syntax of your jobtmpl configuration file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(JobTmplError::Other {
        message,
    })
}

fn create_error_context(error: JobTmplError) -> ErrorContext {
    match &error {
        JobTmplError::ParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the YAML syntax: indentation, quoting and list markers")
            .with_details("The document must be a YAML or JSON mapping with name, version, description, maintainer and config"),
        JobTmplError::ValidationFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix every listed field and run the validation again"),
        JobTmplError::TemplateNotFound {
            reference,
        } => {
            let suggestion = format!(
                "Check that '{reference}' is spelled correctly and that the version exists in the template store"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Use --templates-dir to point at the directory holding parent templates")
        }
        JobTmplError::MissingLockedSteps {
            steps,
            ..
        } => {
            let suggestion = format!("Add {} to the \"order\" list", steps.join(", "));
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Locked steps cannot be dropped or overridden by an extending template")
        }
        JobTmplError::InvalidReference {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Template references look like namespace/name@version, name@version or name"),
        JobTmplError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the jobtmpl configuration file (see --config or JOBTMPL_CONFIG_PATH)"),
        _ => ErrorContext::new(error),
    }
}
