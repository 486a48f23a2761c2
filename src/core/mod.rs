//! Core types shared across jobtmpl
//!
//! ## `error` - Error Handling
//!
//! - [`JobTmplError`] - Enumerated error types covering every failure mode
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! Every operation that can fail returns a [`Result`](anyhow::Result) with a
//! meaningful error. Composition failures always name the offending template
//! reference or step names.

pub mod error;

pub use error::{ErrorContext, JobTmplError, user_friendly_error};
