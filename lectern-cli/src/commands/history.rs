//! History command implementation

use super::Context;
use anyhow::{Context as _, Result};
use lectern_core::{BookId, Route};

/// List recently viewed books, newest first
pub fn history_list(ctx: &Context, json: bool) -> Result<()> {
    let entries = ctx.history().list();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No reading history yet. Start at {}", Route::Home);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{:>6}  {:<40}  {:<24}  {:<12}  {}",
            entry.id,
            entry.title,
            entry.author,
            entry.category,
            entry.viewed_on_label()
        );
    }

    Ok(())
}

/// Remove one book from the history
pub fn history_remove(ctx: &Context, id: BookId) -> Result<()> {
    ctx.history()
        .remove(id)
        .with_context(|| format!("Failed to remove book {} from history", id))?;
    println!("Removed book {} from history", id);
    Ok(())
}

/// Clear the whole history
pub fn history_clear(ctx: &Context) -> Result<()> {
    ctx.history().clear().context("Failed to clear history")?;
    println!("History cleared");
    Ok(())
}
