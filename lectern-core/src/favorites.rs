//! Favorite (bookmark) state with optimistic toggling
//!
//! The displayed state flips as soon as a toggle starts and is rolled back if
//! the remote call fails. The controller remembers the last value the server
//! confirmed; once no toggle is in flight the state settles on that value.

use crate::error::{ClientError, Result};
use crate::gateway::BookGateway;
use crate::session::Session;
use crate::types::BookId;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Favorite state of one book as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    /// Not loaded, or nobody is signed in
    Unknown,

    /// Confirmed by the server
    Settled(bool),

    /// A toggle is in flight
    Pending {
        intended: bool,
        previous: bool,
        seq: u64,
    },
}

impl FavoriteState {
    /// Value the favorite control should show
    pub fn displayed(&self) -> bool {
        match *self {
            FavoriteState::Unknown => false,
            FavoriteState::Settled(value) => value,
            FavoriteState::Pending { intended, .. } => intended,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FavoriteState::Pending { .. })
    }
}

/// Favorite control for a single book
///
/// Create one when the view mounts and drop it on unmount.
pub struct FavoriteController {
    book_id: BookId,
    gateway: Arc<dyn BookGateway>,
    session: Session,
    state: watch::Sender<FavoriteState>,
    seq: AtomicU64,
    /// Last value the server acknowledged
    confirmed: AtomicBool,
}

impl FavoriteController {
    pub fn new(book_id: BookId, gateway: Arc<dyn BookGateway>, session: Session) -> Self {
        let (state, _) = watch::channel(FavoriteState::Unknown);
        Self {
            book_id,
            gateway,
            session,
            state,
            seq: AtomicU64::new(0),
            confirmed: AtomicBool::new(false),
        }
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// Current state
    pub fn state(&self) -> FavoriteState {
        *self.state.borrow()
    }

    /// Observe state changes, including the optimistic pending value
    pub fn subscribe(&self) -> watch::Receiver<FavoriteState> {
        self.state.subscribe()
    }

    /// Derive the initial state from the server's bookmark list
    ///
    /// Signed-out users get [`FavoriteState::Unknown`] without a remote call.
    /// A failed lookup is logged and reads as not favorited.
    pub async fn load_initial_state(&self) -> FavoriteState {
        let Some(token) = self.session.token() else {
            self.state.send_replace(FavoriteState::Unknown);
            return FavoriteState::Unknown;
        };

        let loaded = match self.gateway.list_bookmarks(&token).await {
            Ok(bookmarks) => {
                FavoriteState::Settled(bookmarks.iter().any(|b| b.book_id == self.book_id))
            }
            Err(e) => {
                tracing::warn!("Failed to fetch bookmarks for book {}: {}", self.book_id, e);
                FavoriteState::Settled(false)
            }
        };

        // A toggle that started meanwhile owns the state
        self.state.send_if_modified(|state| {
            if state.is_pending() {
                false
            } else {
                self.confirmed.store(loaded.displayed(), Ordering::SeqCst);
                *state = loaded;
                true
            }
        });
        self.state()
    }

    /// Flip the favorite optimistically and confirm with the server
    ///
    /// Returns the settled value. Without a token nothing changes and
    /// [`ClientError::Unauthenticated`] is returned so the caller can send the
    /// user to sign in. On a failed call the last confirmed value is restored
    /// before the error is returned.
    pub async fn toggle(&self) -> Result<bool> {
        let Some(token) = self.session.token() else {
            return Err(ClientError::Unauthenticated);
        };

        let previous = self.state().displayed();
        let intended = !previous;
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(FavoriteState::Pending {
            intended,
            previous,
            seq,
        });

        tracing::debug!(
            "Toggling favorite for book {}: {} -> {}",
            self.book_id,
            previous,
            intended
        );

        let result = if intended {
            self.gateway.add_bookmark(&token, self.book_id).await
        } else {
            self.gateway.remove_bookmark(&token, self.book_id).await
        };

        match result {
            Ok(()) => {
                self.settle(seq, Some(intended));
                Ok(intended)
            }
            Err(e) => {
                tracing::warn!("Favorite update for book {} failed: {}", self.book_id, e);
                self.settle(seq, None);
                Err(e.into())
            }
        }
    }

    /// Record a completed call and settle on the confirmed value
    ///
    /// `acknowledged` is the value the server accepted, `None` when the call
    /// failed. Every completion updates the confirmed value, but the state is
    /// left alone while a newer toggle is still in flight.
    fn settle(&self, seq: u64, acknowledged: Option<bool>) {
        self.state.send_if_modified(|state| {
            if let Some(value) = acknowledged {
                self.confirmed.store(value, Ordering::SeqCst);
            }
            let confirmed = self.confirmed.load(Ordering::SeqCst);

            let settled = match *state {
                FavoriteState::Pending { seq: current, .. } if current != seq => return false,
                _ => FavoriteState::Settled(confirmed),
            };
            if *state == settled {
                return false;
            }
            *state = settled;
            true
        });
    }
}

/// Ids of every book the signed-in user has bookmarked
///
/// For pages showing many favorite controls at once. Signed-out users and
/// failed lookups get an empty set.
pub async fn bookmarked_ids(gateway: &dyn BookGateway, session: &Session) -> HashSet<BookId> {
    let Some(token) = session.token() else {
        return HashSet::new();
    };

    match gateway.list_bookmarks(&token).await {
        Ok(bookmarks) => bookmarks.into_iter().map(|b| b.book_id).collect(),
        Err(e) => {
            tracing::warn!("Failed to sync favorites: {}", e);
            HashSet::new()
        }
    }
}
