//! entity-suggest: terminal front-end for the suggestion core.
//!
//! Usage:
//!   entity-suggest search <text>             # List candidates for typed text
//!   entity-suggest flyout <text> --pick 2    # Show the detail flyout for one candidate
//!   entity-suggest urls <id>                 # Print resource URLs for an id

use clap::{Parser, Subcommand};
use entity_suggest::control::{ChannelRenderer, ChannelView, ViewEvent};
use entity_suggest::services::{url, HttpTransport};
use entity_suggest::{fmt, SuggestConfig, SuggestControl};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "entity-suggest")]
#[command(about = "Incremental entity search suggestions")]
#[command(version)]
struct Cli {
    /// JSON configuration file (missing fields take defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Restrict results to a type id (e.g. /location/citytown)
    #[arg(long = "type", global = true)]
    type_filter: Option<String>,

    /// Input context the text is typed into
    #[arg(long, global = true, default_value = "cli")]
    context: String,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidates for the given text
    Search {
        /// Typed text
        text: String,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search, highlight one candidate and print its detail flyout
    Flyout {
        /// Typed text
        text: String,

        /// Index of the candidate to highlight
        #[arg(short, long, default_value = "0")]
        pick: usize,

        /// Seconds to wait for the flyout before giving up
        #[arg(short, long, default_value = "10")]
        timeout: u64,
    },

    /// Print the blurb, thumbnail and browse URLs for an id
    Urls {
        /// Resource id (e.g. /en/paris)
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries results; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("entity_suggest=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => SuggestConfig::from_file(path)?,
        None => SuggestConfig::default(),
    };
    if let Some(service_url) = cli.service_url {
        config.service_url = service_url;
    }
    if cli.type_filter.is_some() {
        config.type_filter = cli.type_filter;
    }
    // A one-shot query has no keystrokes to debounce.
    config.xhr_delay_ms = 0;

    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Search { text, limit } => {
            if let Some(limit) = limit {
                config = config.with_limit(limit);
            }
            run_search(config, &cli.context, &text, color).await
        }
        Commands::Flyout {
            text,
            pick,
            timeout,
        } => run_flyout(config, &cli.context, &text, pick, timeout, color).await,
        Commands::Urls { id } => {
            let urls = [
                ("blurb", url::text_url(&config, &id)),
                ("thumb", url::image_url(&config, &id)),
                ("browse", url::browse_url(&config, &id)),
            ];
            fmt::fmt_urls(&mut std::io::stdout().lock(), &urls, color)?;
            Ok(())
        }
    }
}

async fn run_search(config: SuggestConfig, context: &str, text: &str, color: bool) -> anyhow::Result<()> {
    let (view, mut events) = ChannelView::new();
    let (renderer, _ready) = ChannelRenderer::new();
    let control = SuggestControl::new(Arc::new(HttpTransport::new()), config, view, renderer);

    let Some(search) = control.on_query_text_changed(context, text) else {
        anyhow::bail!("nothing to search for");
    };
    search.await?;

    let mut out = std::io::stdout().lock();
    match events.try_recv() {
        Ok(ViewEvent::Candidates(key, list)) => fmt::fmt_candidates(&mut out, &key, &list, color)?,
        Ok(ViewEvent::NoMatch(key, suggest_new)) => {
            fmt::fmt_no_match(&mut out, &key, suggest_new.as_deref(), color)?;
        }
        _ => anyhow::bail!("search failed (run with RUST_LOG=entity_suggest=debug for details)"),
    }
    Ok(())
}

async fn run_flyout(
    config: SuggestConfig,
    context: &str,
    text: &str,
    pick: usize,
    timeout: u64,
    color: bool,
) -> anyhow::Result<()> {
    let (view, mut events) = ChannelView::new();
    let (renderer, mut ready) = ChannelRenderer::new();
    let control = SuggestControl::new(Arc::new(HttpTransport::new()), config, view, renderer);

    let Some(search) = control.on_query_text_changed(context, text) else {
        anyhow::bail!("nothing to search for");
    };
    search.await?;

    let list = match events.try_recv() {
        Ok(ViewEvent::Candidates(_, list)) => list,
        Ok(ViewEvent::NoMatch(key, _)) => anyhow::bail!("no matches for {}", key.text()),
        _ => anyhow::bail!("search failed (run with RUST_LOG=entity_suggest=debug for details)"),
    };
    let Some(candidate) = list.get(pick).cloned() else {
        anyhow::bail!("only {} candidates, cannot pick #{}", list.len(), pick);
    };
    if !candidate.has_detail() {
        anyhow::bail!("{} has no article or image to show", candidate.id);
    }

    control.on_highlight_changed(candidate);
    let event = tokio::time::timeout(Duration::from_secs(timeout), ready.recv()).await;
    control.on_hidden();

    match event {
        Ok(Some(event)) => {
            let browse = control.browse_url(&event.candidate);
            fmt::fmt_flyout(&mut std::io::stdout().lock(), &event, &browse, color)?;
            Ok(())
        }
        _ => anyhow::bail!("flyout did not resolve within {timeout}s"),
    }
}
