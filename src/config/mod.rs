//! TOML configuration: hint alphabet, navigation policy, jump kinds and
//! wrap templates.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    Config, EditingConfig, HintsConfig, JumpConfig, NavigationConfig, ValidationError,
    ValidationIssue, WrapConfig,
};
