//! Post command handlers: pulling, listing, publishing, drafts.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::read_content;
use crate::cli::AppContext;

pub async fn fetch(ctx: &AppContext) -> Result<()> {
    let api = ctx.client("/make-post");
    let posts = api.fetch_news().await?;

    if posts.is_empty() {
        println!("No posts found on your blog.");
        return Ok(());
    }

    println!("Retrieved {} posts:", posts.len());
    for post in posts {
        println!("  {}\n    {}", post.title, post.url);
    }
    Ok(())
}

pub async fn fetched(ctx: &AppContext) -> Result<()> {
    let api = ctx.client("/fetched-posts");
    let posts = api.fetched_posts().await?;

    if posts.is_empty() {
        println!("No fetched posts yet. Pull some with `redraft posts fetch`.");
        return Ok(());
    }

    for post in posts {
        println!(
            "#{:<5} {}  ({})\n       {}",
            post.id,
            post.title,
            format_date(Some(post.created_at)),
            post.source
        );
    }
    Ok(())
}

pub async fn recent(ctx: &AppContext) -> Result<()> {
    let api = ctx.client("/dashboard");
    let posts = api.recent_posts().await?;

    if posts.is_empty() {
        println!("No recent posts.");
        return Ok(());
    }

    for post in posts {
        println!("{}  ({})", post.title, format_date(post.date()));
        if let Some(excerpt) = &post.excerpt {
            println!("  {excerpt}");
        }
        if let Some(url) = &post.url {
            println!("  {url}");
        }
    }
    Ok(())
}

pub async fn posted(ctx: &AppContext) -> Result<()> {
    let api = ctx.client("/posts");
    let posts = api.posted().await?;

    if posts.is_empty() {
        println!("Nothing published through Redraft yet.");
        return Ok(());
    }

    for post in posts {
        println!("{}  ({})", post.title, format_date(post.date()));
    }
    Ok(())
}

pub async fn publish(ctx: &AppContext, title: &str, url: &str, file: &Path) -> Result<()> {
    let content = read_content(file)?;

    let api = ctx.client("/paraphrase");
    api.publish(title, &content, url).await?;
    api.record_activity("Published", title, url).await;

    println!("Published \"{title}\"");
    Ok(())
}

pub async fn draft(ctx: &AppContext, title: &str, url: &str, file: &Path) -> Result<()> {
    let content = read_content(file)?;

    let api = ctx.client("/paraphrase");
    api.save_draft(title, &content, url).await?;

    println!("Saved \"{title}\" as a draft");
    Ok(())
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(
        || "no date".to_string(),
        |date| date.format("%Y-%m-%d").to_string(),
    )
}
