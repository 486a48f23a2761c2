//! Library-level tests for jobtmpl
//!
//! Exercise the public API end to end without the binary:
//! - **pipeline**: `validate_template` outcomes and reports
//! - **properties**: merge invariants checked over varied inputs
//! - **stores**: custom `TemplateStore` implementations and directory loading

mod pipeline;
mod properties;
