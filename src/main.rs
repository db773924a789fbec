// SPDX-License-Identifier: MIT OR Apache-2.0

//! heline - terminal client for the heline code search service
//!
//! Renders search hits, facet filters and highlighted snippets fetched from a
//! heline search API, and keeps a shareable search location in sync.

mod cli;
mod query;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat};
use heline::config::{Config, ConfigOutputFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn,heline=info",
        1 => "info,heline=debug",
        _ => "debug,heline=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "heline", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    });
    let ctx = query::Context::new(&config, cli.api_url.as_deref(), format, cli.compact)?;

    match cli.command {
        Commands::Search {
            query,
            tab,
            repo,
            lang,
            path,
        } => {
            query::search::run(&ctx, &query, &tab, repo, lang, path).await?;
        }
        Commands::Open { url } => {
            query::search::open(&ctx, &url).await?;
        }
        Commands::Doc { id } => {
            query::doc::run(&ctx, &id).await?;
        }
        Commands::Interactive { initial } => {
            query::interactive::run(&ctx, initial.as_deref()).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
