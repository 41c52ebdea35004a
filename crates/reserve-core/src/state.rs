//! Shared sync state observed by clients.

/// Background sync state published after every run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    /// No sync has run yet in this process.
    #[default]
    Idle,
    Syncing,
    Synced,
    Failed,
}

impl SyncState {
    /// Whether a sync run is currently in flight.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Syncing)
    }
}
