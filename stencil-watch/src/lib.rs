//! # stencil-watch
//!
//! File-watch plumbing for re-render-on-change: registers OS watchers via
//! notify, funnels events into an async loop, and applies a stabilization
//! window so a burst of writes triggers exactly one callback — never a
//! render of a half-written file.
//!
//! Shutdown is explicit: callers hold a `broadcast::Sender<()>` and fire it
//! (e.g. from a ctrl-c handler) to end the loop, rather than relying on
//! process exit.

pub mod debounce;
pub mod error;
pub mod target;

pub use debounce::{ChangeCallback, POLL_INTERVAL, STABILITY_THRESHOLD};
pub use error::WatchError;
pub use target::WatchTarget;

use notify::{recommended_watcher, RecommendedWatcher, Watcher};
use tokio::sync::{broadcast, mpsc};

/// Watch `targets` until `shutdown_rx` fires, invoking `on_change` once per
/// stabilized burst of content changes.
///
/// Targets whose registration path does not exist are skipped with a
/// warning; watching proceeds with whatever remains.
pub async fn run(
    targets: Vec<WatchTarget>,
    on_change: ChangeCallback,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    let targets: Vec<WatchTarget> = targets
        .into_iter()
        .map(WatchTarget::canonicalized)
        .collect();

    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;

    for target in &targets {
        let (path, mode) = target.registration();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "watch path does not exist, skipping");
            continue;
        }
        watcher.watch(&path, mode)?;
        tracing::debug!(path = %path.display(), "watching");
    }

    // The watcher must stay alive for the duration of the loop; dropping it
    // closes the event channel.
    debounce::debounce_loop(
        targets,
        event_rx,
        shutdown_rx,
        STABILITY_THRESHOLD,
        POLL_INTERVAL,
        on_change,
    )
    .await;

    Ok(())
}
