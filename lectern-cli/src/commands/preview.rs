//! Preview command implementation

use super::Context;
use anyhow::Result;
use lectern_core::{PreviewSession, ViewerState};

/// Report how a document URL would be shown in the embedded viewer
pub fn preview(ctx: &Context, url: &str) -> Result<()> {
    let session = PreviewSession::open(Some(url), ctx.viewer_strategy());

    match session.state() {
        ViewerState::Loading | ViewerState::Ready => {
            println!("Viewer:      {}", session.viewer_src());
        }
        _ => {
            println!("Preview unsupported: only PDF files can be shown in the viewer");
        }
    }
    if let Some(fallback) = session.fallback_url() {
        println!("Download:    {}", fallback);
    }

    Ok(())
}
