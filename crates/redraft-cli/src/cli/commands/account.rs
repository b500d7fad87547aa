//! Profile and subscription command handlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use redraft_types::{Plan, UserProfile};

use crate::cli::AppContext;

pub async fn profile(ctx: &AppContext, refresh: bool) -> Result<()> {
    if !refresh {
        if let Some(blob) = ctx.store.cached_profile() {
            if let Ok(profile) = serde_json::from_str::<UserProfile>(&blob) {
                print_profile(&profile, true);
                return Ok(());
            }
        }
    }

    let api = ctx.client("/dashboard/profile");
    let profile = api.profile().await?;
    ctx.store
        .cache_profile(&serde_json::to_string(&profile).context("serialize profile")?)?;

    print_profile(&profile, false);
    Ok(())
}

fn print_profile(profile: &UserProfile, cached: bool) {
    println!("{} <{}>", profile.username, profile.email);
    if cached {
        println!("(cached; use --refresh to refetch)");
    }
}

pub async fn subscription(ctx: &AppContext) -> Result<()> {
    let api = ctx.client("/dashboard/subscription");
    let details = api.subscription_details().await?;

    match &details.plan {
        Some(plan) => {
            println!(
                "Plan: {} ({})",
                plan.name,
                details.status.as_deref().unwrap_or("unknown")
            );
            println!("Daily limit: {} paraphrases", plan.daily_limit);
        }
        None => println!("No subscription. See `redraft subscription plans`."),
    }

    if let (Some(used), Some(limit)) = (
        details.requests_today,
        details.daily_limit.or(details.plan.as_ref().map(|p| p.daily_limit)),
    ) {
        println!("Used today: {used}/{limit}");
    }
    if let Some(end) = details.end_date {
        println!("Renews/expires: {}", format_date(end));
    }

    // The daily usage record lives on a separate endpoint; show it when
    // available but don't fail the whole command over it.
    match api.user_activity().await {
        Ok(rows) => {
            if let Some(activity) = rows.into_iter().next() {
                println!(
                    "API requests today: {}  Posts published: {}",
                    activity.daily_api_requests, activity.posts_published
                );
            }
        }
        Err(err) => tracing::debug!(error = %err, "usage record unavailable"),
    }
    Ok(())
}

pub async fn plans(ctx: &AppContext) -> Result<()> {
    let api = ctx.client("/pricing");
    let plans = api.plans().await?;

    if plans.is_empty() {
        println!("No plans available.");
        return Ok(());
    }

    for plan in plans {
        print_plan(&plan);
    }
    Ok(())
}

pub async fn plan(ctx: &AppContext, id: i64) -> Result<()> {
    let api = ctx.client("/pricing");
    let plan = api.plan(id).await?;
    print_plan(&plan);
    Ok(())
}

pub async fn subscribe(ctx: &AppContext, plan_id: i64) -> Result<()> {
    let api = ctx.client("/payment");
    let receipt = api.subscribe(plan_id).await?;

    match receipt.payment_url {
        Some(payment_url) => {
            println!("Complete checkout at: {payment_url}");
        }
        None => println!("Subscription activated."),
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    println!(
        "#{} {}  ${}/mo  {} paraphrases/day  ({} days)",
        plan.id, plan.name, plan.price, plan.daily_limit, plan.duration
    );
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
