//! End-to-end tests for the watch loop: real filesystem events drive
//! rebuilds and subscriber pings.

use std::fs;
use std::time::{Duration, Instant};

use dirview::{Subscription, TreeMirror, TreeNode};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Wait until `pred` holds for the current snapshot, sleeping on pings.
async fn wait_for_tree(
    mirror: &TreeMirror,
    sub: &mut Subscription,
    pred: impl Fn(&TreeNode) -> bool,
) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        if pred(&mirror.current()) {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        let _ = tokio::time::timeout(remaining.min(Duration::from_millis(250)), sub.changed()).await;
    }
}

fn start(root: &std::path::Path) -> (TreeMirror, tokio::task::JoinHandle<()>) {
    let mirror = TreeMirror::open(root).expect("Failed to open mirror");
    let adapter = mirror.watch(64).expect("Failed to start watcher");
    let runner = mirror.clone();
    let task = tokio::spawn(async move { runner.run(adapter).await });
    (mirror, task)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_file_in_subdirectory_pings_all_subscribers() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("a")).unwrap();
    fs::write(temp_dir.path().join("b.txt"), "b").unwrap();

    let (mirror, task) = start(temp_dir.path());
    let mut first = mirror.subscribe();
    let mut second = mirror.subscribe();

    let initial = mirror.current();
    let names: Vec<_> = initial.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b.txt"]);

    fs::write(temp_dir.path().join("a/c.txt"), "c").unwrap();

    let found = wait_for_tree(&mirror, &mut first, |t| t.find("a/c.txt").is_some()).await;
    assert!(found, "c.txt never appeared under a/");

    // The second subscriber never read; it still holds exactly one ping
    assert!(second.try_changed());
    assert!(!second.try_changed());

    let a = mirror.current();
    let a = a.find("a").unwrap();
    assert_eq!(a.children.len(), 1);
    assert_eq!(a.children[0].relative_path, "a/c.txt");

    task.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_directory_is_watched() {
    let temp_dir = TempDir::new().unwrap();
    let (mirror, task) = start(temp_dir.path());
    let mut sub = mirror.subscribe();

    fs::create_dir(temp_dir.path().join("d")).unwrap();
    let found = wait_for_tree(&mirror, &mut sub, |t| t.find("d").is_some_and(|d| d.is_dir)).await;
    assert!(found, "new directory d/ never appeared");

    fs::write(temp_dir.path().join("d/e.txt"), "e").unwrap();
    let found = wait_for_tree(&mirror, &mut sub, |t| t.find("d/e.txt").is_some()).await;
    assert!(found, "file inside the new directory did not trigger a rebuild");

    task.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_removal_and_rename_are_mirrored() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("old.txt"), "o").unwrap();
    fs::write(temp_dir.path().join("doomed.txt"), "d").unwrap();

    let (mirror, task) = start(temp_dir.path());
    let mut sub = mirror.subscribe();

    fs::rename(
        temp_dir.path().join("old.txt"),
        temp_dir.path().join("new.txt"),
    )
    .unwrap();
    fs::remove_file(temp_dir.path().join("doomed.txt")).unwrap();

    let found = wait_for_tree(&mirror, &mut sub, |t| {
        t.find("new.txt").is_some() && t.find("old.txt").is_none() && t.find("doomed.txt").is_none()
    })
    .await;
    assert!(found, "rename/removal not reflected in the snapshot");

    task.abort();
}

#[tokio::test]
async fn test_run_exits_when_adapter_closed() {
    let temp_dir = TempDir::new().unwrap();
    let mirror = TreeMirror::open(temp_dir.path()).unwrap();
    let mut adapter = mirror.watch(8).unwrap();
    adapter.close();

    let finished = tokio::time::timeout(TIMEOUT, mirror.run(adapter)).await;
    assert!(finished.is_ok(), "watch loop kept running after close");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsubscribed_client_gets_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let (mirror, task) = start(temp_dir.path());
    let mut watcher_sub = mirror.subscribe();
    let mut gone = mirror.subscribe();
    assert!(mirror.subscribers().unsubscribe(&gone));

    fs::write(temp_dir.path().join("x.txt"), "x").unwrap();
    let found = wait_for_tree(&mirror, &mut watcher_sub, |t| t.find("x.txt").is_some()).await;
    assert!(found);

    assert!(!gone.try_changed());
    assert_eq!(mirror.subscribers().len(), 1);

    task.abort();
}
