// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document detail command

use anyhow::Result;

use super::search::run_params;
use super::Context;
use heline::location::{SearchParams, Tab};

/// Run `heline doc <ID>`.
pub async fn run(ctx: &Context, id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("Document id cannot be empty");
    }
    let params = SearchParams {
        tab: Tab::Docs,
        id: Some(id.to_string()),
        ..SearchParams::default()
    };
    run_params(ctx, params).await
}
