//! Configuration system for Hearth.
//!
//! Provides TOML-based configuration with:
//! - `[session]` store capacity, reaper interval and TTL
//! - `[server]` bind address and session cookie settings
//! - `[logging]` console level and JSON file output
//! - Key-level layering of the user config over `./hearth.toml`, or a
//!   single explicit file

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigLayer, ConfigSource, LoadedConfig, load_config, load_config_file,
    load_config_with_options, load_explicit, save_config, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
