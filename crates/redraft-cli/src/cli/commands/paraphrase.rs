//! Paraphrase command handlers.

use std::path::Path;

use anyhow::{Result, bail};
use redraft_core::api::ReparaphraseRequest;
use redraft_types::ParaphraseOutcome;

use super::{emit, read_content};
use crate::cli::AppContext;

pub async fn paraphrase(
    ctx: &AppContext,
    title: &str,
    url: &str,
    out: Option<&Path>,
) -> Result<()> {
    let api = ctx.client("/make-post");
    let outcome = api.paraphrase(title, url).await?;
    render(&outcome, out)
}

#[allow(clippy::too_many_arguments)]
pub async fn rewrite(
    ctx: &AppContext,
    title: &str,
    url: &str,
    file: &Path,
    length: u32,
    keyword: &str,
    out: Option<&Path>,
) -> Result<()> {
    let content = read_content(file)?;

    let api = ctx.client("/paraphrase");
    let outcome = api
        .reparaphrase(&ReparaphraseRequest {
            content,
            word_length: length,
            keyword: keyword.to_string(),
            url: url.to_string(),
            title: title.to_string(),
        })
        .await?;
    render(&outcome, out)
}

fn render(outcome: &ParaphraseOutcome, out: Option<&Path>) -> Result<()> {
    if let Some(error) = outcome.error() {
        bail!("paraphrasing failed: {error}");
    }

    let Some(paraphrased) = outcome.paraphrased.as_deref() else {
        bail!("paraphrasing returned no content");
    };

    emit(paraphrased, out)?;
    if out.is_some() {
        eprintln!("Paraphrased content written.");
    }
    Ok(())
}
