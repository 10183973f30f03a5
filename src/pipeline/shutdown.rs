//! Graceful shutdown flag
//!
//! The pipeline observes the flag between transcripts and between chunk
//! batches, never mid-chunk, so every stored chunk is a complete unit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag {
    inner: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Spawn a background task that trips the flag on SIGINT or SIGTERM.
    pub fn watch_signals(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            tracing::warn!("shutdown signal received, finishing current work");
            flag.trigger();
        });
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
