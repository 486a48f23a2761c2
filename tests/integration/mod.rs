//! Integration test suite for jobtmpl
//!
//! Runs the `jobtmpl` binary against documents and template directories
//! written into temporary workspaces.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **validate**: `jobtmpl validate` text and JSON reports, exit status
//! - **flatten**: `jobtmpl flatten` output
//! - **configuration**: config file and global flag handling

#[path = "../common/mod.rs"]
mod common;

mod configuration;
mod validate;
