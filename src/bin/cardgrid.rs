//! Command-line entry point: render one card deck PDF per requested
//! page-size profile.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use cardgrid::{Config, RenderJob, TtfFontMetrics};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cardgrid", version, about = "Render affirmation card PDFs")]
struct Cli {
    /// Page size profiles to render (e.g. letter a4 a0); a trailing
    /// argument that is not a profile key becomes a custom output prefix
    profiles: Vec<String>,

    /// Configuration file
    #[arg(short, long, default_value = "cards.json")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    config.validate().context("configuration rejected")?;

    let (requested, custom_name) = config.split_profile_args(&cli.profiles);

    let items = Arc::new(cardgrid::text::read_card_lines(&config.card_text_input)?);
    let metrics = Arc::new(TtfFontMetrics::from_file(&config.font_file())?);

    let mut jobs = Vec::new();
    for key in &requested {
        match config.profile(key) {
            Some(profile) => jobs.push(RenderJob::from_config(
                &config,
                profile,
                Arc::clone(&items),
                custom_name.as_deref(),
            )?),
            None => {
                let known: Vec<&str> = config.page_sizes.keys().map(String::as_str).collect();
                warn!(
                    "unknown page size '{key}', skipping; choose from: {}",
                    known.join(", ")
                );
            }
        }
    }

    if jobs.is_empty() {
        warn!("no valid page size profiles requested, nothing to render");
        return Ok(());
    }

    let report = cardgrid::run_all(&jobs, metrics);

    if report.all_failed() {
        bail!(
            "all {} render jobs failed: {}",
            report.outcomes.len(),
            report.failed_keys().join(", ")
        );
    }
    let failed = report.failed_keys();
    if !failed.is_empty() {
        warn!("profiles failed: {}", failed.join(", "));
    }
    Ok(())
}
