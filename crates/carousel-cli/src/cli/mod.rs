//! CLI for publishing carousels.

mod commands;

use anyhow::Result;
use carousel_core::config::{self, CarouselConfig};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_config, run_publish, run_validate, PublishArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "carousel")]
#[command(about = "Publish multi-image carousels through the container/publish API", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug-level logging (ignored when RUST_LOG is set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Publish a carousel of 2 to 10 media URLs, in order.
    Publish {
        /// Platform account id to publish to.
        #[arg(long, value_name = "ID")]
        account: String,

        /// Access token for the account.
        #[arg(long, env = "CAROUSEL_ACCESS_TOKEN", hide_env_values = true)]
        token: String,

        /// Caption of the carousel.
        #[arg(long)]
        caption: Option<String>,

        /// Media URLs; paths ending in .mp4 or .mov are posted as video.
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
    },

    /// Check a carousel without contacting the platform.
    Validate {
        /// Caption to check.
        #[arg(long)]
        caption: Option<String>,

        /// Media URLs.
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
    },

    /// Print the config path and the effective configuration.
    Config,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn load_config(&self) -> Result<(CarouselConfig, PathBuf)> {
        match &self.config {
            Some(path) => Ok((config::load_from_path(path)?, path.clone())),
            None => Ok((config::load_or_init()?, config::config_path()?)),
        }
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            CliCommand::Publish {
                account,
                token,
                caption,
                urls,
            } => {
                let (cfg, _) = self.load_config()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = PublishArgs {
                    account_id: account,
                    token,
                    caption: caption.as_deref(),
                    urls,
                };
                run_publish(&cfg, args).await?;
            }
            CliCommand::Validate { caption, urls } => run_validate(caption.as_deref(), urls)?,
            CliCommand::Config => {
                let (cfg, path) = self.load_config()?;
                run_config(&cfg, &path)?;
            }
            CliCommand::Completions { shell } => run_completions(*shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
