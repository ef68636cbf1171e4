//! # Sliding Window
//!
//! The state behind every moving average in slidewave: a bounded FIFO of the most
//! recent values plus an incrementally maintained running sum.
//!
//! ## Overview
//!
//! A [`SlidingWindow`] accepts values one at a time through [`SlidingWindow::push`] and
//! reports the mean of at most `window_size` most recent values. The window is owned by
//! exactly one averager (an iterator adapter or a stream transformer) and is never shared.
//!
//! ## Strategies
//!
//! - [`AveragingStrategy::RunningSum`]: add the incoming value, subtract the evicted one.
//!   O(1) amortized per value.
//! - [`AveragingStrategy::Resum`]: sum the whole window on every step. O(W) per value, but
//!   the result only depends on the values currently in the window.
//!
//! Floating-point subtraction is not the inverse of addition, so a running sum slowly
//! drifts away from the true window total on long non-integer streams. [`Resync`] bounds
//! that drift by recomputing the sum from the buffer at a fixed eviction cadence. The
//! default, [`Resync::PerWindow`], recomputes once every `window_size` evictions, which
//! keeps the amortized cost per value constant.
//!
//! Independently of the cadence, the sum is recomputed whenever it stops being finite or
//! a value that dwarfed the rest of the window has been evicted. Otherwise an infinity
//! or a huge outlier would keep corrupting the total long after leaving the window.
//!
//! ## Warm-up
//!
//! Before `window_size` values have been seen the window is only partially filled.
//! [`WarmupPolicy::Partial`] (the default) averages whatever is available, so the first
//! output always equals the first input.
//!
//! ```rust
//! use slidewave::window::{SlidingWindow, WindowConfig};
//!
//! let mut window = SlidingWindow::new(WindowConfig::new(3))?;
//! let averages: Vec<f64> = [1.0, 2.0, 3.0, 4.0]
//!   .into_iter()
//!   .filter_map(|v| window.push(v))
//!   .collect();
//! assert_eq!(averages, vec![1.0, 1.5, 2.0, 3.0]);
//! # Ok::<(), slidewave::error::WindowError>(())
//! ```

use crate::error::WindowError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

// How far the largest value seen may exceed the window's magnitude before the running
// sum is recomputed.
const CANCELLATION_RATIO: f64 = 1024.0;

/// How the window total is obtained on each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingStrategy {
  /// Maintain the total incrementally.
  #[default]
  RunningSum,
  /// Recompute the total from the buffered values on every step.
  Resum,
}

/// What to emit while the window holds fewer than `window_size` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
  /// Average over the values seen so far.
  #[default]
  Partial,
  /// Emit nothing until the window is full. Output is shorter than input by
  /// `window_size - 1` items.
  SkipUntilFull,
  /// Pre-fill the window with `window_size - 1` copies of the first value.
  PadWithFirst,
}

/// When the running sum is recomputed from the buffered values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resync {
  /// Once every `window_size` evictions.
  #[default]
  PerWindow,
  /// Once every `n` evictions. `n` must be at least 1.
  Every(usize),
  /// No periodic resync. The sum is still recomputed after an overflow or when a value
  /// much larger than the rest of the window leaves it.
  Never,
}

/// Configuration for a [`SlidingWindow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
  /// Maximum number of values averaged together.
  pub window_size: usize,
  /// How the window total is computed.
  #[serde(default)]
  pub strategy: AveragingStrategy,
  /// Behaviour while the window is filling up.
  #[serde(default)]
  pub warmup: WarmupPolicy,
  /// Drift correction cadence for [`AveragingStrategy::RunningSum`].
  #[serde(default)]
  pub resync: Resync,
}

impl WindowConfig {
  /// Creates a configuration with the given window size and default policies.
  ///
  /// The size is validated when the window is built, not here.
  #[must_use]
  pub fn new(window_size: usize) -> Self {
    Self {
      window_size,
      strategy: AveragingStrategy::default(),
      warmup: WarmupPolicy::default(),
      resync: Resync::default(),
    }
  }

  /// Sets the averaging strategy.
  #[must_use]
  pub fn with_strategy(mut self, strategy: AveragingStrategy) -> Self {
    self.strategy = strategy;
    self
  }

  /// Sets the warm-up policy.
  #[must_use]
  pub fn with_warmup(mut self, warmup: WarmupPolicy) -> Self {
    self.warmup = warmup;
    self
  }

  /// Sets the running-sum resync cadence.
  #[must_use]
  pub fn with_resync(mut self, resync: Resync) -> Self {
    self.resync = resync;
    self
  }

  /// Checks the configuration without building a window.
  pub fn validate(&self) -> Result<(), WindowError> {
    if self.window_size == 0 {
      return Err(WindowError::InvalidWindowSize(self.window_size));
    }
    if self.resync == Resync::Every(0) {
      return Err(WindowError::InvalidResyncInterval);
    }
    Ok(())
  }

  fn resync_interval(&self) -> Option<usize> {
    match self.resync {
      Resync::PerWindow => Some(self.window_size),
      Resync::Every(n) => Some(n),
      Resync::Never => None,
    }
  }
}

/// A bounded FIFO of recent values with a running total.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
  values: VecDeque<f64>,
  running_sum: f64,
  // Sum of absolute values in the window, the scale the running sum is accurate to.
  magnitude: f64,
  // Largest absolute value added since the last resync.
  peak: f64,
  evictions_since_resync: usize,
  config: WindowConfig,
}

impl SlidingWindow {
  /// Creates an empty window, failing fast on an invalid configuration.
  pub fn new(config: WindowConfig) -> Result<Self, WindowError> {
    config.validate()?;
    Ok(Self {
      values: VecDeque::with_capacity(config.window_size),
      running_sum: 0.0,
      magnitude: 0.0,
      peak: 0.0,
      evictions_since_resync: 0,
      config,
    })
  }

  /// Creates an empty window of the given size with default policies.
  pub fn with_size(window_size: usize) -> Result<Self, WindowError> {
    Self::new(WindowConfig::new(window_size))
  }

  /// Consumes one value and returns the average to emit for it.
  ///
  /// Returns `None` only under [`WarmupPolicy::SkipUntilFull`] while the window is
  /// still filling.
  pub fn push(&mut self, value: f64) -> Option<f64> {
    if self.values.is_empty() && self.config.warmup == WarmupPolicy::PadWithFirst {
      for _ in 1..self.config.window_size {
        self.insert(value);
      }
    }
    self.insert(value);

    if self.config.warmup == WarmupPolicy::SkipUntilFull && !self.is_full() {
      return None;
    }
    self.average()
  }

  // Evicts before appending so the buffer never exceeds its capacity.
  fn insert(&mut self, value: f64) {
    let evicted = if self.values.len() == self.config.window_size {
      self.values.pop_front()
    } else {
      None
    };
    self.values.push_back(value);

    if self.config.strategy == AveragingStrategy::Resum {
      return;
    }

    if let Some(oldest) = evicted {
      self.running_sum -= oldest;
      self.magnitude -= oldest.abs();
      self.evictions_since_resync += 1;
    }
    self.running_sum += value;
    self.magnitude += value.abs();
    self.peak = self.peak.max(value.abs());

    // inf - inf is NaN, and a value far larger than what is left absorbed the smaller
    // ones when it was added. Neither can be undone incrementally.
    if !self.running_sum.is_finite() || self.peak > CANCELLATION_RATIO * self.magnitude {
      self.resync();
      return;
    }

    if let Some(interval) = self.config.resync_interval() {
      if self.evictions_since_resync >= interval {
        self.resync();
      }
    }
  }

  /// Recomputes the running sum from the buffered values.
  pub fn resync(&mut self) {
    let exact: f64 = self.values.iter().sum();
    trace!(
      drift = self.running_sum - exact,
      window_size = self.config.window_size,
      "resyncing running sum"
    );
    self.running_sum = exact;
    self.magnitude = self.values.iter().map(|v| v.abs()).sum();
    self.peak = self.values.iter().fold(0.0, |peak, v| peak.max(v.abs()));
    self.evictions_since_resync = 0;
  }

  /// The total of the buffered values under the configured strategy.
  pub fn sum(&self) -> f64 {
    match self.config.strategy {
      AveragingStrategy::RunningSum => self.running_sum,
      AveragingStrategy::Resum => self.values.iter().sum(),
    }
  }

  /// The mean of the buffered values, or `None` if nothing has been pushed.
  pub fn average(&self) -> Option<f64> {
    if self.values.is_empty() {
      return None;
    }
    Some(self.sum() / self.values.len() as f64)
  }

  /// Number of values currently buffered.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Whether no value has been pushed since creation or the last reset.
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Whether the window holds `window_size` values.
  pub fn is_full(&self) -> bool {
    self.values.len() == self.config.window_size
  }

  /// The configured maximum size.
  pub fn window_size(&self) -> usize {
    self.config.window_size
  }

  /// The configuration this window was built with.
  pub fn config(&self) -> &WindowConfig {
    &self.config
  }

  /// The buffered values, oldest first.
  pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
    self.values.iter().copied()
  }

  /// Empties the window, keeping its configuration.
  pub fn reset(&mut self) {
    self.values.clear();
    self.running_sum = 0.0;
    self.magnitude = 0.0;
    self.peak = 0.0;
    self.evictions_since_resync = 0;
  }
}
