//! Wiring & DI. Entry point: parse CLI, load config, bootstrap adapters, run the listener.
//! No business logic here; replies are built by StatusProcessor.

use anyhow::Context;
use board_game_bot::adapters::mastodon::{self, MastodonClient};
use board_game_bot::adapters::recommend::{HttpRecommendClient, StaticRecommendations};
use board_game_bot::adapters::text::{HtmlTextExtractor, PlainTextExtractor};
use board_game_bot::adapters::twitter::{TRACK_RULE, TwitterClient};
use board_game_bot::domain::{CommandParser, DomainError, ResponseComposer};
use board_game_bot::ports::{RecommendationPort, StatusSource};
use board_game_bot::shared::cli::{Cli, CommonArgs, Platform};
use board_game_bot::shared::config::AppConfig;
use board_game_bot::usecases::{ImageResolver, RecommendListener, StatusProcessor};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const MASTODON_DRY_RUN_TEXT: &str = "#RecommendGames for Markus Shepherd";
const TWITTER_DRY_RUN_TEXT: &str = "@recommend_games for Markus Shepherd";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load configuration, using defaults");
        AppConfig::default()
    });

    let common = cli.platform.common().clone();
    let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());

    // --- Recommendation service ---
    let base_url = common
        .base_url
        .clone()
        .unwrap_or_else(|| cfg.base_url_or_default());
    let recommender: Arc<dyn RecommendationPort> = if common.offline {
        warn!("offline: using canned recommendations");
        Arc::new(StaticRecommendations::sample())
    } else {
        Arc::new(HttpRecommendClient::new(
            &base_url,
            &cfg.recommend_path_or_default(),
            timeout,
        )?)
    };

    // --- Composer and image cache ---
    let add_link = !common.no_link && cfg.add_link_or_default();
    let composer = ResponseComposer::new(&base_url, add_link);
    let images = image_resolver(&common, &cfg);
    info!(base_url = %base_url, add_link, "recommendation settings");

    match cli.platform {
        Platform::Mastodon {
            api_url,
            access_token,
            common,
        } => {
            let processor = StatusProcessor::new(
                CommandParser::hashtag(),
                composer,
                images,
                recommender,
            );
            if common.dry_run {
                return dry_run(&processor, MASTODON_DRY_RUN_TEXT).await;
            }
            let add_mention = !common.no_mention && cfg.add_mention_or_default();
            run_mastodon(&cfg, api_url, access_token, processor, add_mention, timeout).await
        }
        Platform::Twitter {
            bearer_token,
            access_token,
            common,
        } => {
            let processor = StatusProcessor::new(
                CommandParser::mention(),
                composer,
                images,
                recommender,
            );
            if common.dry_run {
                return dry_run(&processor, TWITTER_DRY_RUN_TEXT).await;
            }
            run_twitter(&cfg, bearer_token, access_token, processor, timeout).await
        }
    }
}

fn image_resolver(common: &CommonArgs, cfg: &AppConfig) -> ImageResolver {
    let base_path = common
        .image_base_path
        .clone()
        .or_else(|| cfg.image_base_path.as_ref().map(PathBuf::from));
    let suffix = match common.image_suffix.as_deref() {
        Some("") => None,
        Some(s) => Some(s.to_string()),
        None => cfg.image_suffix_or_default(),
    };
    ImageResolver::new(base_path, suffix)
}

/// Process a fixed sample text and log what would be posted.
async fn dry_run(processor: &StatusProcessor, text: &str) -> anyhow::Result<()> {
    info!(text, "dry run");
    let result = processor.process_text(text).await?;
    info!(reply = ?result.reply, "reply");
    info!(items = ?result.items, "items");
    info!(image_file = ?result.image_file, "image file");
    Ok(())
}

fn required(value: Option<String>, hint: &str) -> anyhow::Result<String> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => Ok(v),
        None => anyhow::bail!("{}", hint),
    }
}

async fn run_mastodon(
    cfg: &AppConfig,
    api_url: Option<String>,
    access_token: Option<String>,
    processor: StatusProcessor,
    add_mention: bool,
    timeout: Duration,
) -> anyhow::Result<()> {
    let api_url = required(
        api_url.or_else(|| cfg.mastodon_api_url()),
        "Set MASTODON_API_URL (env, .env or --api-url)",
    )?;
    let access_token = required(
        access_token.or_else(|| cfg.mastodon_access_token()),
        "Set MASTODON_ACCESS_TOKEN (env, .env or --access-token)",
    )?;

    let client = Arc::new(MastodonClient::new(&api_url, access_token, timeout)?);
    client
        .verify_minimum_version(mastodon::MINIMUM_VERSION)
        .await
        .context("Mastodon version check")?;

    let listener = RecommendListener::new(
        processor,
        Arc::new(HtmlTextExtractor::new()),
        client.clone(),
        add_mention,
    )
    .await?;

    let mut stream = client.stream_hashtag(mastodon::HASHTAG).await?;
    listen(&listener, &mut stream, "Mastodon 🐘").await
}

async fn run_twitter(
    cfg: &AppConfig,
    bearer_token: Option<String>,
    access_token: Option<String>,
    processor: StatusProcessor,
    timeout: Duration,
) -> anyhow::Result<()> {
    let bearer_token = required(
        bearer_token.or_else(|| cfg.twitter_bearer_token()),
        "Set TWITTER_BEARER_TOKEN (env, .env or --bearer-token)",
    )?;
    let access_token = required(
        access_token.or_else(|| cfg.twitter_access_token()),
        "Set TWITTER_ACCESS_TOKEN (env, .env or --access-token)",
    )?;

    let client = Arc::new(TwitterClient::new(
        &cfg.twitter_api_url_or_default(),
        bearer_token,
        access_token,
        timeout,
    )?);

    // Replies to a tweet already address its author.
    let listener = RecommendListener::new(
        processor,
        Arc::new(PlainTextExtractor),
        client.clone(),
        false,
    )
    .await?;

    client.ensure_stream_rule(TRACK_RULE).await?;
    let mut stream = client.filtered_stream().await?;
    listen(&listener, &mut stream, "Twitter 🐦").await
}

/// Run until the stream closes. A dropped connection is a normal shutdown; server errors fail.
async fn listen(
    listener: &RecommendListener,
    stream: &mut dyn StatusSource,
    server: &str,
) -> anyhow::Result<()> {
    match listener.run(stream).await {
        Ok(()) => {}
        Err(DomainError::Stream(e)) => info!(error = %e, "stream connection closed"),
        Err(e) => {
            error!(error = %e, "there was a problem with the {} server", server);
            return Err(e.into());
        }
    }
    info!("Closing bot 🤖 Bye bye!");
    Ok(())
}
