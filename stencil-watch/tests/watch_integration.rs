//! End-to-end watcher test against the real filesystem.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast;

use stencil_watch::{ChangeCallback, WatchTarget};

#[tokio::test(flavor = "multi_thread")]
async fn editing_a_watched_file_triggers_the_callback() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("page.tera");
    fs::write(&file, "v1").unwrap();

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (fired_tx, mut fired_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let on_change: ChangeCallback = Arc::new(move || {
        let _ = fired_tx.send(());
    });

    let handle = tokio::spawn(stencil_watch::run(
        vec![WatchTarget::File(file.clone())],
        on_change,
        shutdown_tx.subscribe(),
    ));

    // Give the OS watcher a moment to register before editing.
    tokio::time::sleep(Duration::from_millis(300)).await;
    fs::write(&file, "v2").unwrap();

    let fired = tokio::time::timeout(Duration::from_secs(10), fired_rx.recv()).await;
    assert!(
        fired.is_ok(),
        "expected a change callback after editing the watched file"
    );

    let _ = shutdown_tx.send(());
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn editing_a_fragment_in_the_include_dir_triggers_the_callback() {
    let tmp = TempDir::new().unwrap();
    let include = tmp.path().join("partials");
    fs::create_dir_all(&include).unwrap();
    let fragment = include.join("header.tera");
    fs::write(&fragment, "v1").unwrap();

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (fired_tx, mut fired_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let on_change: ChangeCallback = Arc::new(move || {
        let _ = fired_tx.send(());
    });

    let handle = tokio::spawn(stencil_watch::run(
        vec![WatchTarget::Fragments {
            dir: include.clone(),
            extension: "tera".to_string(),
        }],
        on_change,
        shutdown_tx.subscribe(),
    ));

    tokio::time::sleep(Duration::from_millis(300)).await;
    fs::write(&fragment, "v2").unwrap();

    let fired = tokio::time::timeout(Duration::from_secs(10), fired_rx.recv()).await;
    assert!(
        fired.is_ok(),
        "expected a change callback after editing a fragment"
    );

    let _ = shutdown_tx.send(());
    handle.await.unwrap().unwrap();
}
