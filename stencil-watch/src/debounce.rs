//! Change-event loop with a write-stabilization window.
//!
//! A burst of rapid writes (editors save in several syscalls, some tools
//! stream output) must collapse into a single callback, and the callback
//! must not fire while the file is still being written. The loop keeps the
//! timestamp of the last qualifying write and fires once no further write
//! has arrived for [`STABILITY_THRESHOLD`], re-checking every
//! [`POLL_INTERVAL`].

use std::sync::Arc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::target::WatchTarget;

/// Quiet period after the last write before a change is considered stable.
pub const STABILITY_THRESHOLD: Duration = Duration::from_millis(200);

/// How often the loop re-checks whether the quiet period has elapsed.
pub const POLL_INTERVAL: Duration = Duration::from_millis(40);

/// Invoked once per stabilized burst of changes. The callback knows what to
/// re-render; no arguments are passed.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Consume raw watcher events and invoke `on_change` once per stabilized
/// burst.
///
/// Only content-modification events whose path matches one of `targets`
/// reset the stabilization clock; create, remove, rename, and metadata
/// events are ignored. The callback runs on the blocking pool and is
/// awaited, so bursts cannot produce overlapping callback runs.
pub(crate) async fn debounce_loop(
    targets: Vec<WatchTarget>,
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    mut shutdown_rx: broadcast::Receiver<()>,
    threshold: Duration,
    poll_interval: Duration,
    on_change: ChangeCallback,
) {
    let mut last_write: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if !is_content_change(&event.kind) {
                    continue;
                }
                let qualifies = event.paths.iter().any(|p| {
                    let p = std::fs::canonicalize(p).unwrap_or_else(|_| p.clone());
                    targets.iter().any(|t| t.matches(&p))
                });
                if qualifies {
                    last_write = Some(Instant::now());
                }
            }
            _ = tokio::time::sleep(poll_interval), if last_write.is_some() => {
                let Some(seen_at) = last_write else { continue };
                if seen_at.elapsed() >= threshold {
                    last_write = None;
                    let cb = on_change.clone();
                    if let Err(err) = tokio::task::spawn_blocking(move || cb()).await {
                        tracing::error!(error = %err, "change callback panicked");
                    }
                }
            }
        }
    }
}

/// Only actual content modifications qualify; renames arrive as
/// `Modify(Name)` and must not trigger a re-render.
pub(crate) fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Other)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    fn modify_event(path: &PathBuf) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(path.clone())
    }

    fn counter_callback() -> (Arc<AtomicUsize>, ChangeCallback) {
        let fired = Arc::new(AtomicUsize::new(0));
        let cb: ChangeCallback = {
            let fired = fired.clone();
            Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };
        (fired, cb)
    }

    #[test]
    fn only_modification_kinds_qualify() {
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Any)));

        assert!(!is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(!is_content_change(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_content_change(&EventKind::Modify(ModifyKind::Name(
            RenameMode::Any
        ))));
        assert!(!is_content_change(&EventKind::Modify(
            ModifyKind::Metadata(MetadataKind::Any)
        )));
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn rapid_writes_collapse_to_one_callback() {
        let path = PathBuf::from("/tmp/page.tera");
        let targets = vec![WatchTarget::File(path.clone())];
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let (fired, cb) = counter_callback();

        let handle = tokio::spawn(debounce_loop(
            targets,
            event_rx,
            shutdown_tx.subscribe(),
            Duration::from_millis(200),
            Duration::from_millis(40),
            cb,
        ));

        // Three writes inside 100ms: one logical edit.
        for _ in 0..3 {
            event_tx.send(Ok(modify_event(&path))).unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        let _ = shutdown_tx.send(());
        handle.await.unwrap();
        assert_eq!(
            fired.load(Ordering::SeqCst),
            1,
            "rapid writes should collapse to one callback"
        );
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn separate_edits_each_fire() {
        let path = PathBuf::from("/tmp/page.tera");
        let targets = vec![WatchTarget::File(path.clone())];
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let (fired, cb) = counter_callback();

        let handle = tokio::spawn(debounce_loop(
            targets,
            event_rx,
            shutdown_tx.subscribe(),
            Duration::from_millis(200),
            Duration::from_millis(40),
            cb,
        ));

        event_tx.send(Ok(modify_event(&path))).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        event_tx.send(Ok(modify_event(&path))).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let _ = shutdown_tx.send(());
        handle.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn non_matching_paths_do_not_fire() {
        let targets = vec![WatchTarget::File(PathBuf::from("/tmp/page.tera"))];
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let (fired, cb) = counter_callback();

        let handle = tokio::spawn(debounce_loop(
            targets,
            event_rx,
            shutdown_tx.subscribe(),
            Duration::from_millis(200),
            Duration::from_millis(40),
            cb,
        ));

        let other = PathBuf::from("/tmp/unrelated.txt");
        event_tx.send(Ok(modify_event(&other))).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let _ = shutdown_tx.send(());
        handle.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn create_and_rename_events_are_ignored() {
        let path = PathBuf::from("/tmp/page.tera");
        let targets = vec![WatchTarget::File(path.clone())];
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let (fired, cb) = counter_callback();

        let handle = tokio::spawn(debounce_loop(
            targets,
            event_rx,
            shutdown_tx.subscribe(),
            Duration::from_millis(200),
            Duration::from_millis(40),
            cb,
        ));

        event_tx
            .send(Ok(
                Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone())
            ))
            .unwrap();
        event_tx
            .send(Ok(Event::new(EventKind::Modify(ModifyKind::Name(
                RenameMode::Any,
            )))
            .add_path(path.clone())))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let _ = shutdown_tx.send(());
        handle.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
