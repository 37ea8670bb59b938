use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::config::FeedConfig;
use crate::error::{ConfigError, SampleError};
use crate::model::Sample;
use crate::window::SampleWindow;

/// Produces the value for each feed tick.
pub trait SampleSource {
    fn next_value(&mut self) -> Result<f64, SampleError>;
}

/// Uniform random values in `[low, high)`. The simulated oil-spill level uses `[0, 100)`.
pub struct RandomSource {
    low: f64,
    high: f64,
}

impl RandomSource {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}

impl SampleSource for RandomSource {
    fn next_value(&mut self) -> Result<f64, SampleError> {
        let span = self.high - self.low;
        if !span.is_finite() || span <= 0.0 {
            return Err(SampleError::Unavailable(format!(
                "unusable range [{}, {})",
                self.low, self.high
            )));
        }
        Ok(rand::thread_rng().gen_range(self.low..self.high))
    }
}

impl<F> SampleSource for F
where
    F: FnMut() -> Result<f64, SampleError>,
{
    fn next_value(&mut self) -> Result<f64, SampleError> {
        self()
    }
}

/// What subscribers of the sample-window stream receive.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct FeedSnapshot {
    pub samples: Vec<Sample>,
    pub running: bool,
    /// Set when the most recent tick could not produce a sample
    pub last_error: Option<String>,
}

fn time_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Running/stopped state machine around a sample window. Initial state is running.
pub struct SampleFeed {
    window: SampleWindow,
    source: Box<dyn SampleSource + Send>,
    tick_interval: Duration,
    running: bool,
    last_error: Option<SampleError>,
}

impl SampleFeed {
    pub fn new(cfg: &FeedConfig, source: Box<dyn SampleSource + Send>) -> Result<Self, ConfigError> {
        if cfg.tick_interval_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "tick_interval_ms",
            });
        }
        if cfg.window_capacity == 0 {
            return Err(ConfigError::NonPositive {
                field: "window_capacity",
            });
        }
        Ok(Self {
            window: SampleWindow::new(cfg.window_capacity),
            source,
            tick_interval: Duration::from_millis(cfg.tick_interval_ms),
            running: true,
            last_error: None,
        })
    }

    /// Returns true if the state changed.
    pub fn start(&mut self) -> bool {
        let changed = !self.running;
        self.running = true;
        changed
    }

    /// Returns true if the state changed.
    pub fn stop(&mut self) -> bool {
        let changed = self.running;
        self.running = false;
        changed
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    pub fn reset(&mut self) {
        self.window.reset();
        self.last_error = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Takes one sample. Only the owning task calls this, and only while running.
    pub(crate) fn tick(&mut self) {
        match self.source.next_value() {
            Ok(value) => {
                self.last_error = None;
                if let Some(evicted) = self.window.push(Sample {
                    label: time_label(),
                    value,
                }) {
                    tracing::trace!(label = %evicted.label, "evicted oldest sample");
                }
            }
            Err(e) => {
                tracing::warn!("feed tick produced no sample: {}", e);
                self.last_error = Some(e);
            }
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            samples: self.window.to_vec(),
            running: self.running,
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}
