//! Progress simulation for the after-blow countdown.
//!
//! A progress sequence ticks on a fixed interval from 0.0 to exactly 1.0
//! over a target duration. Starting a new sequence supersedes the previous
//! one: the older sequence ends without emitting its remaining ticks.

use futures::stream::{self, Stream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Snapshot emitted on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    /// Time elapsed since start
    pub elapsed_ms: u64,
    /// Target duration
    pub total_ms: u64,
    /// `elapsed / total` in [0, 1]; exactly 1.0 on the terminal tick
    pub fraction: f32,
    /// False only on the terminal tick
    pub running: bool,
}

impl ProgressState {
    fn initial(total_ms: u64) -> Self {
        Self {
            elapsed_ms: 0,
            total_ms,
            fraction: 0.0,
            running: true,
        }
    }

    fn finished(total_ms: u64) -> Self {
        Self {
            elapsed_ms: total_ms,
            total_ms,
            fraction: 1.0,
            running: false,
        }
    }

    fn at(elapsed_ms: u64, total_ms: u64) -> Self {
        if elapsed_ms >= total_ms {
            return Self::finished(total_ms);
        }
        Self {
            elapsed_ms,
            total_ms,
            fraction: (elapsed_ms as f64 / total_ms as f64) as f32,
            running: true,
        }
    }
}

/// Starts progress sequences and tracks which one is current.
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    tick_interval: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
    }
}

impl ProgressSimulator {
    /// Create a simulator ticking every `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        // A zero interval would never advance
        let tick_interval = tick_interval.max(Duration::from_millis(1));
        Self {
            tick_interval,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Begin a new sequence spanning `total_ms`, superseding any running one.
    pub fn start(&self, total_ms: u64) -> ProgressSequence {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Progress sequence {} started for {}ms", generation, total_ms);

        ProgressSequence {
            total_ms,
            elapsed_ms: 0,
            started: false,
            finished: false,
            tick_interval_ms: self.tick_interval.as_millis() as u64,
            generation,
            current: Arc::clone(&self.generation),
        }
    }
}

/// A single finite run of progress ticks.
#[derive(Debug)]
pub struct ProgressSequence {
    total_ms: u64,
    elapsed_ms: u64,
    started: bool,
    finished: bool,
    tick_interval_ms: u64,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl ProgressSequence {
    /// Whether a newer sequence has been started.
    pub fn is_superseded(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for and return the next tick.
    ///
    /// Returns `None` once the terminal tick has been emitted, or as soon as
    /// the sequence has been superseded.
    pub async fn next(&mut self) -> Option<ProgressState> {
        if self.finished || self.is_superseded() {
            self.finished = true;
            return None;
        }

        if !self.started {
            self.started = true;
            if self.total_ms == 0 {
                self.finished = true;
                return Some(ProgressState::finished(0));
            }
            return Some(ProgressState::initial(self.total_ms));
        }

        let step = self.tick_interval_ms.min(self.total_ms - self.elapsed_ms);
        tokio::time::sleep(Duration::from_millis(step)).await;

        if self.is_superseded() {
            tracing::debug!("Progress sequence {} superseded", self.generation);
            self.finished = true;
            return None;
        }

        self.elapsed_ms += step;
        let state = ProgressState::at(self.elapsed_ms, self.total_ms);
        if !state.running {
            self.finished = true;
        }
        Some(state)
    }

    /// Adapt the sequence into a `Stream` of ticks.
    pub fn into_stream(self) -> impl Stream<Item = ProgressState> {
        stream::unfold(self, |mut seq| async move {
            let state = seq.next().await?;
            Some((state, seq))
        })
    }
}
