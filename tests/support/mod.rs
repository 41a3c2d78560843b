#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use screenshot_harness::{BrowserSession, CaptureError};

/// Smallest valid PNG: one transparent pixel
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

pub const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub fn is_png(path: &Path) -> bool {
    fs::read(path)
        .map(|bytes| bytes.len() > PNG_SIGNATURE.len() && bytes.starts_with(PNG_SIGNATURE))
        .unwrap_or(false)
}

/// In-memory browser session that records what the harness asks of it
#[derive(Default)]
pub struct ScriptedSession {
    closed: AtomicBool,
    fail_quit: AtomicBool,
    ready_states: Mutex<VecDeque<String>>,
    pub visited: Mutex<Vec<String>>,
    pub screenshot_calls: AtomicUsize,
    pub quit_calls: AtomicUsize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose page reports these ready states in order, then `complete`
    pub fn with_ready_states(states: &[&str]) -> Self {
        let session = Self::default();
        session
            .ready_states
            .lock()
            .unwrap()
            .extend(states.iter().map(|s| s.to_string()));
        session
    }

    pub fn closed() -> Self {
        let session = Self::default();
        session.closed.store(true, Ordering::SeqCst);
        session
    }

    /// Session whose `quit` reports the remote browser as already gone
    pub fn failing_quit() -> Self {
        let session = Self::default();
        session.fail_quit.store(true, Ordering::SeqCst);
        session
    }

    pub fn quits(&self) -> usize {
        self.quit_calls.load(Ordering::SeqCst)
    }

    pub fn screenshots(&self) -> usize {
        self.screenshot_calls.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), CaptureError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CaptureError::SessionUnavailable("scripted session closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn goto(&self, url: &str) -> Result<(), CaptureError> {
        self.ensure_open()?;
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn ready_state(&self) -> Result<String, CaptureError> {
        self.ensure_open()?;
        let next = self.ready_states.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| "complete".to_string()))
    }

    async fn save_screenshot(&self, path: &Path) -> Result<(), CaptureError> {
        self.ensure_open()?;
        self.screenshot_calls.fetch_add(1, Ordering::SeqCst);
        fs::write(path, PNG_1X1).map_err(|e| CaptureError::io(path, e))
    }

    async fn quit(&self) -> Result<(), CaptureError> {
        self.quit_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_quit.load(Ordering::SeqCst) {
            return Err(CaptureError::SessionUnavailable("remote browser already gone".to_string()));
        }
        Ok(())
    }
}
