use thiserror::Error;

/// Error surface for watcher setup. The event loop itself absorbs per-event
/// errors so a long-running watch never dies mid-session.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}
