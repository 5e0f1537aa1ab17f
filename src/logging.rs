//! Logging setup.
//!
//! ```bash
//! # Default: warnings only
//! syntax-cursor outline file.js
//!
//! # Debug for this crate, from the environment or the command line
//! SYNTAX_CURSOR_LOG=debug syntax-cursor run file.js --keys jj
//! syntax-cursor -v run file.js --keys jj
//!
//! # Any tracing filter directive works
//! SYNTAX_CURSOR_LOG=warn,syntax_cursor::anchor=trace syntax-cursor ...
//! ```
//!
//! `SYNTAX_CURSOR_LOG` wins over `RUST_LOG`, and both win over `-v`.
//! Output goes to stderr so it never mixes with command output.

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "SYNTAX_CURSOR_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fmt()
        .with_env_filter(create_filter(verbosity)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()?;
    Ok(())
}

fn create_filter(verbosity: u8) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    if let Ok(directives) = env::var(LOG_ENV) {
        return EnvFilter::try_new(directives);
    }
    if let Ok(directives) = env::var("RUST_LOG") {
        return EnvFilter::try_new(directives);
    }
    EnvFilter::try_new(default_directives(verbosity))
}

fn default_directives(verbosity: u8) -> String {
    match verbosity {
        0 => "warn".to_string(),
        1 => "warn,syntax_cursor=debug".to_string(),
        _ => "warn,syntax_cursor=trace".to_string(),
    }
}
