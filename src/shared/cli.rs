//! Command-line interface. Values given here override the loaded configuration.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "board-game-bot", version, about = "Answers #RecommendGames requests")]
pub struct Cli {
    /// Log level (repeat for more verbosity). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub platform: Platform,
}

#[derive(Debug, Subcommand)]
pub enum Platform {
    /// Listen to the #RecommendGames hashtag on a Mastodon instance.
    Mastodon {
        /// Instance URL, e.g. https://boardgames.social
        #[arg(long)]
        api_url: Option<String>,

        /// Access token of the bot account
        #[arg(long)]
        access_token: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Listen to the Twitter filtered stream.
    Twitter {
        /// App bearer token for the filtered stream
        #[arg(long)]
        bearer_token: Option<String>,

        /// OAuth 2.0 user access token of the bot account
        #[arg(long)]
        access_token: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

impl Platform {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Platform::Mastodon { common, .. } | Platform::Twitter { common, .. } => common,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Recommendation service base URL
    #[arg(short = 'u', long)]
    pub base_url: Option<String>,

    /// Do not append the "Full results" link
    #[arg(short = 'l', long)]
    pub no_link: bool,

    /// Do not prefix replies with a mention of the requester
    #[arg(short = 'm', long)]
    pub no_mention: bool,

    /// Directory with cached cover images
    #[arg(short = 'i', long)]
    pub image_base_path: Option<PathBuf>,

    /// Cover file suffix; empty accepts any extension
    #[arg(long)]
    pub image_suffix: Option<String>,

    /// Process a sample status, log the result and exit
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// With --dry-run: use canned recommendations instead of the service
    #[arg(long, requires = "dry_run")]
    pub offline: bool,
}

impl Cli {
    /// Default filter directive for the given verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
