//! CLI command handlers.

pub mod config;
pub mod serve;

use hearth_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration resolved from files, before CLI overrides.
    pub loaded: LoadedConfig,
    /// Verbose output enabled.
    pub verbose: bool,
}
