//! Configuration module for texpipe
//!
//! Provides types and parsing for `texpipe.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{
    default_config, find_config, find_config_from, load_config, merge_cli_overrides, CliOverrides,
    ConfigError,
};
pub use schema::*;
