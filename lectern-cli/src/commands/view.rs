//! View command implementation

use super::{spinner, Context};
use anyhow::Result;
use lectern_core::catalog::{self, DetailView};
use lectern_core::{BookId, FavoriteController, FavoriteState, Route, ViewerState};
use serde::Serialize;

/// Detail page output
#[derive(Serialize)]
struct DetailInfo {
    id: BookId,
    title: String,
    author: String,
    description: String,
    cover: String,
    genres: Vec<String>,
    preview: String,
    viewer_url: Option<String>,
    download_url: Option<String>,
    favorite: Option<bool>,
    more_by_author: Vec<String>,
}

/// Open a book's detail page and record it in the history
pub async fn view(ctx: &Context, id: BookId, json: bool) -> Result<()> {
    let pb = spinner(format!("Loading book {}...", id));
    let detail = match catalog::load_detail(
        ctx.gateway.as_ref(),
        &ctx.history(),
        id,
        ctx.viewer_strategy(),
    )
    .await
    {
        DetailView::Found(detail) => detail,
        DetailView::NotFound { id } => {
            pb.finish_and_clear();
            anyhow::bail!("Book {} not found. Back to {}", id, Route::Home);
        }
    };

    pb.set_message("Checking favorites...");
    let controller = FavoriteController::new(id, ctx.gateway.clone(), ctx.session());
    let favorite = match controller.load_initial_state().await {
        FavoriteState::Unknown => None,
        state => Some(state.displayed()),
    };

    let more_by_author = match detail.book.author_id {
        Some(author_id) => {
            pb.set_message("Loading more by this author...");
            catalog::load_author_shelf(ctx.gateway.as_ref(), author_id)
                .await
                .into_iter()
                .filter(|b| b.id != id)
                .map(|b| b.title)
                .collect()
        }
        None => Vec::new(),
    };
    pb.finish_and_clear();

    let preview = &detail.preview;
    let info = DetailInfo {
        id,
        title: detail.title.clone(),
        author: detail.author.clone(),
        description: detail.description.clone(),
        cover: detail.cover_url.clone(),
        genres: detail.genres.clone(),
        preview: format!("{:?}", preview.state()),
        viewer_url: match preview.state() {
            ViewerState::Loading | ViewerState::Ready => Some(preview.viewer_src().to_string()),
            _ => None,
        },
        download_url: preview.fallback_url().map(str::to_string),
        favorite,
        more_by_author,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Title:       {}", info.title);
    println!("Author:      {}", info.author);
    println!("Genres:      {}", info.genres.join(", "));
    println!("Description: {}", info.description);
    println!("Cover:       {}", info.cover);
    match &info.viewer_url {
        Some(url) => println!("Preview:     {}", url),
        None => println!("Preview:     not available for this file"),
    }
    if let Some(url) = &info.download_url {
        println!("Download:    {}", url);
    }
    match info.favorite {
        Some(true) => println!("Favorite:    yes"),
        Some(false) => println!("Favorite:    no"),
        None => println!("Favorite:    sign in to save favorites"),
    }
    if !info.more_by_author.is_empty() {
        println!("More by {}:", info.author);
        for title in &info.more_by_author {
            println!("  {}", title);
        }
    }

    Ok(())
}
