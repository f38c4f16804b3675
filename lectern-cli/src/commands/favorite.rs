//! Favorite command implementation

use super::{spinner, Context};
use anyhow::Result;
use lectern_core::{BookId, ClientError, FavoriteController, Route};

/// Toggle a book in the signed-in user's favorites
pub async fn favorite(ctx: &Context, id: BookId) -> Result<()> {
    let session = ctx.session();
    if !session.is_signed_in() {
        anyhow::bail!("Please sign in to save favorites ({})", Route::SignIn);
    }

    let controller = FavoriteController::new(id, ctx.gateway.clone(), session);
    let pb = spinner("Checking favorites...");
    controller.load_initial_state().await;

    pb.set_message("Saving...");
    let result = controller.toggle().await;
    pb.finish_and_clear();

    match result {
        Ok(true) => println!("Added book {} to favorites", id),
        Ok(false) => println!("Removed book {} from favorites", id),
        Err(ClientError::Unauthenticated) => {
            anyhow::bail!("Session expired. Please sign in again ({})", Route::SignIn);
        }
        Err(e) => {
            let shown = if controller.state().displayed() {
                "favorited"
            } else {
                "not favorited"
            };
            anyhow::bail!("Failed to update favorites: {}. Book {} is still {}", e, id, shown);
        }
    }

    Ok(())
}
