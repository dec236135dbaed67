//! Configuration loading and parsing.
//!
//! This module provides YAML-based server configuration. Command-line flags
//! are layered on top of the file by the binary.

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::YamlLoader;
pub use types::ServerConfig;
