//! Utility modules for configuration loading.

/// TOML configuration loading and validation.
pub mod toml_config;
