mod support;

use std::fs;
use std::time::Duration;

use anyhow::Result;
use screenshot_harness::utils::logger::init_test_logger;
use screenshot_harness::{capture, navigate_and_settle, CaptureError, Readiness, ScreenshotRequest};

use support::{is_png, ScriptedSession};

fn quick_readiness() -> Readiness {
    Readiness {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(5),
        settle_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_capture_writes_png_at_computed_path() -> Result<()> {
    init_test_logger();
    let dir = tempfile::tempdir()?;
    let session = ScriptedSession::new();
    let request = ScreenshotRequest::new(dir.path(), "homepage")?;

    let path = capture(&session, &request).await?;

    assert_eq!(path, dir.path().join("homepage.png"));
    assert!(is_png(&path));
    Ok(())
}

#[tokio::test]
async fn test_capture_twice_leaves_single_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let session = ScriptedSession::new();
    let request = ScreenshotRequest::new(dir.path(), "homepage")?;

    capture(&session, &request).await?;
    capture(&session, &request).await?;

    assert_eq!(session.screenshots(), 2);
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_directory_is_io_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("not-created");
    let session = ScriptedSession::new();
    let request = ScreenshotRequest::new(&missing, "homepage")?;

    let err = capture(&session, &request).await.unwrap_err();

    match &err {
        CaptureError::Io { path, .. } => assert_eq!(path, &missing.join("homepage.png")),
        other => panic!("expected Io, got {other:?}"),
    }
    assert!(err.to_string().contains("not-created"));
    assert!(!missing.exists());
    assert_eq!(session.screenshots(), 0);
    Ok(())
}

#[tokio::test]
async fn test_closed_session_is_session_unavailable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let session = ScriptedSession::closed();
    let request = ScreenshotRequest::new(dir.path(), "homepage")?;

    let err = capture(&session, &request).await.unwrap_err();

    assert!(err.is_session_unavailable());
    assert!(!request.file_path().exists());
    Ok(())
}

#[tokio::test]
async fn test_test_case_naming_scenario() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let screenshots = dir.path().join("screenshots");
    fs::create_dir(&screenshots)?;
    let session = ScriptedSession::new();

    navigate_and_settle(&session, "https://github.com/argos-ci/argos", &quick_readiness()).await?;
    let request = ScreenshotRequest::for_test(&screenshots, "ScreenshotTestCase", "test_user_registration")?;
    capture(&session, &request).await?;

    assert!(is_png(&screenshots.join("ScreenshotTestCase-test_user_registration.png")));
    assert_eq!(*session.visited.lock().unwrap(), vec!["https://github.com/argos-ci/argos"]);
    Ok(())
}

#[tokio::test]
async fn test_navigate_polls_until_complete() -> Result<()> {
    let session = ScriptedSession::with_ready_states(&["loading", "interactive"]);

    navigate_and_settle(&session, "http://localhost/", &quick_readiness()).await?;

    assert_eq!(session.visited.lock().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_navigate_times_out_when_page_never_completes() {
    let states = vec!["loading"; 10_000];
    let session = ScriptedSession::with_ready_states(&states);

    let err = navigate_and_settle(&session, "http://localhost/slow", &quick_readiness())
        .await
        .unwrap_err();

    match err {
        CaptureError::NotReady { url, timeout } => {
            assert_eq!(url, "http://localhost/slow");
            assert_eq!(timeout, Duration::from_millis(200));
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
}

#[tokio::test]
async fn test_navigate_on_closed_session_fails() {
    let session = ScriptedSession::closed();
    let err = navigate_and_settle(&session, "http://localhost/", &quick_readiness())
        .await
        .unwrap_err();
    assert!(err.is_session_unavailable());
}
