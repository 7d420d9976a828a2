//! Config command - configuration inspection and setup.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};

use hearth_config::{self, HearthConfig};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Show the user configuration file path
    Path,

    /// Write a config file with default values
    Init {
        /// Create project-local config (./hearth.toml) instead of user config
        #[arg(long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init { local, force } => cmd_init(local, force),
    }
}

/// Every section filled in, defaults where the files said nothing.
fn effective(config: &HearthConfig) -> HearthConfig {
    HearthConfig {
        session: Some(config.session()),
        server: Some(config.server()),
        logging: Some(config.logging()),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let sources = ctx.loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)");
    }
    for path in sources {
        println!("# Loaded from {}", path.display());
    }
    println!();
    print!("{}", effective(&ctx.loaded.config).to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    println!("Config layers (lowest precedence first):");
    for source in &ctx.loaded.sources {
        let status = if source.loaded { "loaded" } else { "not found" };
        if source.loaded || ctx.verbose {
            println!("  {:<8} {} ({})", source.layer, source.path.display(), status);
        }
    }
    for warning in &ctx.loaded.warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}

fn cmd_path() -> Result<()> {
    match hearth_config::xdg_config_path() {
        Some(path) => println!("{}", path.display()),
        None => bail!("Could not determine the user config directory"),
    }
    Ok(())
}

fn cmd_init(local: bool, force: bool) -> Result<()> {
    let path = if local {
        PathBuf::from("hearth.toml")
    } else {
        match hearth_config::xdg_config_path() {
            Some(path) => path,
            None => bail!("Could not determine the user config directory"),
        }
    };

    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    hearth_config::save_config(&effective(&HearthConfig::new()), &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
