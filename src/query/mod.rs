// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query module - search, document and interactive session commands

pub mod doc;
pub mod interactive;
pub mod search;

use anyhow::{Context as _, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::OutputFormat;
use heline::client::HttpSearchClient;
use heline::config::Config;
use heline::output::use_colors;
use heline::render::RenderOptions;

/// Settings shared by every command.
pub struct Context {
    pub client: Arc<HttpSearchClient>,
    pub format: OutputFormat,
    pub compact: bool,
    pub render: RenderOptions,
    pub debounce: Duration,
}

impl Context {
    pub fn new(
        config: &Config,
        api_url: Option<&str>,
        format: OutputFormat,
        compact: bool,
    ) -> Result<Self> {
        let api_url = config.merge_api_url(api_url);
        let client = HttpSearchClient::new(&api_url, config.timeout())
            .with_context(|| format!("Cannot create search client for {}", api_url))?;
        tracing::debug!(%api_url, "using search API");
        Ok(Self {
            client: Arc::new(client),
            format,
            compact,
            render: RenderOptions {
                color: use_colors() && format == OutputFormat::Text,
                chunk: config.chunk_options(),
            },
            debounce: config.debounce(),
        })
    }
}
