#![cfg(unix)]

use ssh_selector::error::LaunchError;
use ssh_selector::ssh_service::{Invocation, Session, SharedWriter, SignalSource};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn sh(script: &str) -> Invocation {
    Invocation::new("sh").arg("-c").arg(script)
}

fn no_signals() -> SignalSource {
    let (_tx, rx) = mpsc::unbounded_channel();
    SignalSource::from_channel(rx)
}

fn captured() -> (SharedWriter<Vec<u8>>, SharedWriter<Vec<u8>>) {
    (SharedWriter::new(Vec::new()), SharedWriter::new(Vec::new()))
}

fn text(writer: &SharedWriter<Vec<u8>>) -> String {
    writer
        .with(|buf| String::from_utf8_lossy(buf).into_owned())
        .unwrap()
}

async fn wait_for(path: &Path) {
    for _ in 0..250 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {:?}", path);
}

#[tokio::test]
async fn test_nonzero_exit_carries_code() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");
    let (out, err) = captured();

    let result = Session::new(sh("exit 7"), log_path.clone(), "web")
        .with_output(Box::new(out), Box::new(err))
        .run(no_signals())
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, LaunchError::Exited { code: 7, .. }));
    assert_eq!(error.exit_code(), Some(7));

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.starts_with("=== SSH Session to web started at "));
    assert!(log.trim_end().ends_with("==="));
    assert!(log.contains("=== SSH Session ended at "));
}

#[tokio::test]
async fn test_output_is_teed_to_terminal_and_log() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");
    let (out, err) = captured();

    Session::new(
        sh("echo to-stdout; echo to-stderr 1>&2"),
        log_path.clone(),
        "db",
    )
    .with_output(Box::new(out.clone()), Box::new(err.clone()))
    .run(no_signals())
    .await
    .unwrap();

    assert_eq!(text(&out), "to-stdout\n");
    assert_eq!(text(&err), "to-stderr\n");

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("to-stdout\n"));
    assert!(log.contains("to-stderr\n"));
    let start = log.find("started at").unwrap();
    let body = log.find("to-stdout").unwrap();
    let end = log.find("ended at").unwrap();
    assert!(start < body && body < end);
}

#[tokio::test]
async fn test_log_is_appended_across_sessions() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");

    for _ in 0..2 {
        let (out, err) = captured();
        Session::new(sh("true"), log_path.clone(), "web")
            .with_output(Box::new(out), Box::new(err))
            .run(no_signals())
            .await
            .unwrap();
    }

    let log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.matches("=== SSH Session to web started").count(), 2);
    assert_eq!(log.matches("=== SSH Session ended").count(), 2);
}

#[tokio::test]
async fn test_uncreatable_log_aborts_before_spawn() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("spawned");
    let log_path = dir.path().join("missing-dir").join("session.log");
    let (out, err) = captured();

    let result = Session::new(
        sh(&format!("touch {}", marker.display())),
        log_path,
        "web",
    )
    .with_output(Box::new(out), Box::new(err))
    .run(no_signals())
    .await;

    assert!(matches!(result, Err(LaunchError::LogFile { .. })));
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_missing_program_is_a_spawn_error() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");
    let (out, err) = captured();

    let result = Session::new(
        Invocation::new("definitely-not-a-real-program-xyz"),
        log_path,
        "web",
    )
    .with_output(Box::new(out), Box::new(err))
    .run(no_signals())
    .await;

    assert!(matches!(result, Err(LaunchError::Spawn { .. })));
}

#[tokio::test]
async fn test_each_signal_is_forwarded_once_and_log_is_closed() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");
    let ready = dir.path().join("ready");
    let hits = dir.path().join("hits");

    // Exits cleanly after the second SIGINT.
    let script = r#"
        n=0
        trap 'echo INT >> "$HITS"; n=$((n+1)); if [ "$n" -ge 2 ]; then exit 0; fi' INT
        : > "$READY"
        i=0
        while [ "$i" -lt 100 ]; do sleep 0.1; i=$((i+1)); done
        exit 3
    "#;
    let invocation = sh(script)
        .env("READY", ready.display().to_string())
        .env("HITS", hits.display().to_string());

    let (tx, rx) = mpsc::unbounded_channel();
    let (out, err) = captured();
    let session = Session::new(invocation, log_path.clone(), "web")
        .with_output(Box::new(out), Box::new(err));
    let handle = tokio::spawn(session.run(SignalSource::from_channel(rx)));

    wait_for(&ready).await;
    tx.send(libc::SIGINT).unwrap();
    wait_for(&hits).await;
    tx.send(libc::SIGINT).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(15), handle)
        .await
        .expect("session did not finish")
        .unwrap();
    assert!(result.is_ok(), "{:?}", result);

    let hits = fs::read_to_string(&hits).unwrap();
    assert_eq!(hits.lines().count(), 2);

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("=== SSH Session ended at "));

    // Forwarding stopped with the child; the channel is closed.
    assert!(tx.send(libc::SIGINT).is_err());
}

#[tokio::test]
async fn test_child_killed_by_signal_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");
    let (out, err) = captured();

    let result = Session::new(sh("kill -TERM $$"), log_path.clone(), "web")
        .with_output(Box::new(out), Box::new(err))
        .run(no_signals())
        .await;

    assert!(matches!(
        result,
        Err(LaunchError::Signaled {
            signal: libc::SIGTERM,
            ..
        })
    ));
    assert!(fs::read_to_string(&log_path)
        .unwrap()
        .contains("=== SSH Session ended at "));
}

#[tokio::test]
async fn test_interrupt_to_this_process_reaches_child_once() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("session.log");
    let ready = dir.path().join("ready");
    let hits = dir.path().join("hits");

    let script = r#"
        trap 'echo INT >> "$HITS"; exit 0' INT
        : > "$READY"
        i=0
        while [ "$i" -lt 100 ]; do sleep 0.1; i=$((i+1)); done
        exit 3
    "#;
    let invocation = sh(script)
        .env("READY", ready.display().to_string())
        .env("HITS", hits.display().to_string());

    let signals = SignalSource::os().unwrap();
    let (out, err) = captured();
    let session =
        Session::new(invocation, log_path, "web").with_output(Box::new(out), Box::new(err));
    let handle = tokio::spawn(session.run(signals));

    wait_for(&ready).await;
    // SAFETY: kill(2) on our own pid; SIGINT is captured by the source above.
    unsafe {
        libc::kill(libc::getpid(), libc::SIGINT);
    }

    let result = tokio::time::timeout(Duration::from_secs(15), handle)
        .await
        .expect("session did not finish")
        .unwrap();
    assert!(result.is_ok(), "{:?}", result);
    assert_eq!(fs::read_to_string(&hits).unwrap().lines().count(), 1);
}
