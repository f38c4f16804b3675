//! Home command implementation

use super::{spinner, Context};
use anyhow::Result;
use lectern_core::catalog::{self, UNKNOWN_AUTHOR_LABEL};
use lectern_core::Book;

/// Show new releases and popular books
pub async fn home(ctx: &Context, json: bool) -> Result<()> {
    let pb = spinner("Loading catalog...");
    let feed = catalog::load_home(ctx.gateway.as_ref()).await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }

    print_shelf("New releases", &feed.new_releases);
    println!();
    print_shelf("Popular", &feed.popular);

    Ok(())
}

fn print_shelf(heading: &str, books: &[Book]) {
    println!("{}", heading);
    if books.is_empty() {
        println!("  (nothing to show)");
        return;
    }
    for book in books {
        println!(
            "  {:>6}  {}  by {}",
            book.id,
            book.title,
            book.author.as_deref().unwrap_or(UNKNOWN_AUTHOR_LABEL)
        );
    }
}
