//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform-appropriate directory (or the `GHOST_MODE_CONFIG` override) and
//! falls back to sensible defaults when the file is missing or malformed.

pub mod config;
