// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot search and shared-location restore

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::Context;
use crate::cli::OutputFormat;
use heline::client::{execute, Request};
use heline::errors::{suggestions, ClientError, NoResultsError};
use heline::filters::FilterState;
use heline::location::{SearchParams, Tab};
use heline::output::print_json;
use heline::render::{render_text, snapshot_view};
use heline::session::{SearchSession, Snapshot};

/// Run `heline search`.
pub async fn run(
    ctx: &Context,
    query: &str,
    tab: &str,
    repo: Vec<String>,
    lang: Vec<String>,
    path: Vec<String>,
) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Search query cannot be empty");
    }
    let params = SearchParams {
        query: query.to_string(),
        tab: Tab::from_tbm(tab),
        filter: FilterState { repo, lang, path },
        id: None,
    };
    // Round-trip through the location form to drop duplicate and empty values.
    let params = SearchParams::parse(&params.to_location());
    run_params(ctx, params).await
}

/// Run `heline open`: the initial-load protocol for a shared location.
pub async fn open(ctx: &Context, url: &str) -> Result<()> {
    let params = SearchParams::parse(url);
    // `id` only opens a document together with `tbm=docs`.
    let opens_document = params.id.is_some() && params.tab == Tab::Docs;
    if !opens_document && params.query.trim().is_empty() {
        anyhow::bail!("Location '{}' carries no query (expected ...?q=<query>)", url);
    }
    run_params(ctx, params).await
}

/// Load `params` into a fresh session, perform its request and print the result.
pub async fn run_params(ctx: &Context, params: SearchParams) -> Result<()> {
    let mut session = SearchSession::new();
    let query = params.query.clone();
    if let Some(request) = session.load(params) {
        fetch(ctx, &mut session, request).await;
    }
    let snapshot = session.snapshot();
    print_snapshot(ctx, &snapshot)?;

    if snapshot.not_found {
        if snapshot.unreachable {
            eprintln!("{}", suggestions::api_unreachable_suggestion(ctx.client.base_url()));
        }
        if snapshot.document.is_none() && query.is_empty() {
            anyhow::bail!(snapshot
                .notice
                .unwrap_or_else(|| "document not found".to_string()));
        }
        return Err(NoResultsError {
            query,
            cause: snapshot.notice,
        }
        .into());
    }
    Ok(())
}

/// Perform one request with a spinner as the loading indicator.
pub async fn fetch(ctx: &Context, session: &mut SearchSession, request: Request) {
    let ticket = session.begin(&request);
    let spinner = spinner(ctx, &request);
    let result: Result<_, ClientError> = execute(ctx.client.as_ref(), &request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    session.complete(ticket, result);
}

fn spinner(ctx: &Context, request: &Request) -> Option<ProgressBar> {
    if ctx.format != OutputFormat::Text {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(match request {
        Request::Document { id } => format!("Loading document {}...", id),
        _ => "Searching...".to_string(),
    });
    Some(spinner)
}

pub fn print_snapshot(ctx: &Context, snapshot: &Snapshot) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            print_json(&snapshot_view(snapshot, &ctx.render.chunk), ctx.compact)
                .context("Failed to encode JSON output")?;
        }
        OutputFormat::Text => {
            print!("{}", render_text(snapshot, &ctx.render));
        }
    }
    Ok(())
}
