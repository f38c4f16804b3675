//! Search command implementation

use super::{spinner, Context};
use anyhow::{Context as _, Result};
use lectern_core::catalog::UNKNOWN_AUTHOR_LABEL;
use lectern_core::gateway::BookFilters;
use lectern_core::search::{PipelineState, SearchSnapshot};
use lectern_core::{Book, Route, SearchSession, SuggestionPipeline, SuggestionView};

/// Search the catalog
///
/// Without `--all` the query goes through the suggestion pipeline and the
/// first few matches are shown, the way the search field would show them.
pub async fn search(ctx: &Context, query: &str, all: bool) -> Result<()> {
    let mut pipeline = SuggestionPipeline::new();
    pipeline.input(query);
    let Some(route) = pipeline.submit() else {
        anyhow::bail!("Search query must not be empty");
    };

    if all {
        return search_all(ctx, route).await;
    }

    let pb = spinner(format!("Searching for \"{}\"...", query.trim()));
    let mut session = SearchSession::spawn(ctx.gateway.clone(), ctx.config.debounce);
    session.input(query);
    let snapshot = settled(&session).await?;
    pb.finish_and_clear();

    let view_all = snapshot.view.view_all();
    match snapshot.view {
        SuggestionView::Results { books, .. } => {
            print_books(&books);
            if let Some(view_all) = view_all {
                println!("View all results: {}", view_all);
            }
        }
        SuggestionView::Empty { query } => println!("No books found for \"{}\"", query),
        _ => anyhow::bail!("Search failed, try again later"),
    }

    Ok(())
}

/// Wait for the pipeline to render or fail
async fn settled(session: &SearchSession) -> Result<SearchSnapshot> {
    let mut rx = session.subscribe();
    loop {
        {
            let snapshot = rx.borrow_and_update();
            if matches!(
                snapshot.state,
                PipelineState::Rendered { .. } | PipelineState::Failed { .. }
            ) {
                return Ok(snapshot.clone());
            }
        }
        rx.changed().await.context("Search stopped unexpectedly")?;
    }
}

async fn search_all(ctx: &Context, route: Route) -> Result<()> {
    let Route::SearchResults(query) = &route else {
        anyhow::bail!("Unexpected search route {}", route);
    };

    let pb = spinner(format!("Searching for \"{}\"...", query));
    let books = ctx
        .gateway
        .list_books(&BookFilters::new().search(query.clone()))
        .await
        .with_context(|| format!("Search for \"{}\" failed", query));
    pb.finish_and_clear();
    let books = books?;

    tracing::debug!("Results page {}", route);
    if books.is_empty() {
        println!("No books found for \"{}\"", query);
    } else {
        print_books(&books);
    }

    Ok(())
}

fn print_books(books: &[Book]) {
    for book in books {
        println!(
            "{:>6}  {}  by {}",
            book.id,
            book.title,
            book.author.as_deref().unwrap_or(UNKNOWN_AUTHOR_LABEL)
        );
    }
}
