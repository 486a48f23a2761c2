//! jobtmpl CLI entry point
//!
//! Parses arguments, installs logging, runs the command and renders any
//! error with its suggestion before exiting non-zero.
//!
//! - `validate` - validate a template document
//! - `flatten` - print a template composed with its parent

use anyhow::Result;
use clap::Parser;
use jobtmpl_cli::cli;
use jobtmpl_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.build_config();
    cli::init_logging(config.log_level.as_deref());

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute_with_config(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
