// src/pipeline/pace.rs
// Courtesy delays and retry backoff, behind an injectable sleeper so tests
// never touch the wall clock.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, d: Duration);
}

/// Production pacer: real tokio sleep.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

/// Test pacer: records requested pauses and returns immediately.
pub struct InstantPacer {
    pub pauses: Mutex<Vec<Duration>>,
}

impl InstantPacer {
    pub fn new() -> Self {
        Self {
            pauses: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InstantPacer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, d: Duration) {
        self.pauses.lock().expect("pacer mutex poisoned").push(d);
    }
}

/// Fixed client-side delay applied after an adapter's request(s). Part of
/// each adapter's contract with its upstream, not incidental.
#[derive(Clone)]
pub struct RateLimiter {
    delay: Duration,
    pacer: Arc<dyn Pacer>,
}

impl RateLimiter {
    pub fn new(delay: Duration, pacer: Arc<dyn Pacer>) -> Self {
        Self { delay, pacer }
    }

    pub async fn courtesy(&self) {
        self.pacer.pause(self.delay).await;
    }
}

/// Bounded retries with linear backoff: after attempt `n` fails (1-based),
/// pause `backoff_unit * n` before the next try. Only the soccer scores
/// adapter uses this; everything else is single-attempt.
#[derive(Clone)]
pub struct RetryPolicy {
    attempts: u32,
    backoff_unit: Duration,
    pacer: Arc<dyn Pacer>,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff_unit: Duration, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff_unit,
            pacer,
        }
    }

    /// The policy for HTML-scraped soccer scores: 3 attempts, 5 s backoff unit.
    pub fn soccer_scores(pacer: Arc<dyn Pacer>) -> Self {
        Self::new(3, Duration::from_secs(5), pacer)
    }

    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(%e, attempt, "attempt failed, backing off");
                    self.pacer.pause(self.backoff_unit * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
