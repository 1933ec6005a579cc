use super::context::{AppContext, print_json};
use anyhow::Result;
use std::time::Duration;
use uuid::Uuid;

pub async fn set(
    ctx: &AppContext,
    latitude: f64,
    longitude: f64,
    source: Option<&str>,
    hold: Option<u64>,
) -> Result<()> {
    let receipt = ctx
        .coordinator
        .set_override(&ctx.device_id, &ctx.authorization, latitude, longitude, source)
        .await?;
    print_json(&receipt)?;

    let Some(secs) = hold else {
        return Ok(());
    };

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping override");
        }
    }

    let outcome = ctx
        .coordinator
        .stop_override(&ctx.device_id, &ctx.authorization)
        .await?;
    print_json(&outcome)
}

pub async fn reapply(ctx: &AppContext, entry_id: Uuid, source: Option<&str>) -> Result<()> {
    match ctx
        .coordinator
        .reapply_history_entry(&ctx.device_id, &ctx.authorization, entry_id, source)
        .await?
    {
        Some(receipt) => print_json(&receipt),
        None => anyhow::bail!("History entry {} not found", entry_id),
    }
}

pub async fn history(ctx: &AppContext, limit: Option<usize>) -> Result<()> {
    let entries = ctx
        .coordinator
        .get_history(&ctx.device_id, &ctx.authorization, limit)
        .await?;
    print_json(&entries)
}

pub async fn forget(ctx: &AppContext, entry_id: Uuid) -> Result<()> {
    let removed = ctx
        .coordinator
        .remove_history_entry(&ctx.device_id, &ctx.authorization, entry_id)
        .await?;
    if !removed {
        anyhow::bail!("History entry {} not found", entry_id);
    }
    println!("Removed {}", entry_id);
    Ok(())
}

pub async fn clear(ctx: &AppContext) -> Result<()> {
    ctx.coordinator
        .clear_history(&ctx.device_id, &ctx.authorization)
        .await?;
    println!("History cleared");
    Ok(())
}

pub async fn health(ctx: &AppContext) -> Result<()> {
    print_json(&ctx.coordinator.health().await)
}
