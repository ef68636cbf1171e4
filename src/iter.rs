//! Lazy iterator adapters producing moving averages.
//!
//! Values are pulled from the source only when the caller asks for the next average,
//! and the window is validated before anything is pulled. Dropping the adapter drops the
//! source iterator with it.
//!
//! ```rust
//! use slidewave::iter::MovingAverageExt;
//!
//! let smoothed: Vec<f64> = vec![1, 2, 3, 4, 5, 6, 7].moving_average(3)?.collect();
//! assert_eq!(smoothed, vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! # Ok::<(), slidewave::error::WindowError>(())
//! ```
//!
//! Sources that can fail, such as parsed text fields, go through
//! [`TryMovingAverageExt::try_moving_average`], which hands the first error back to the
//! caller at the position it occurred and then ends:
//!
//! ```rust
//! use slidewave::iter::TryMovingAverageExt;
//!
//! let fields = ["10", "20", "n/a", "40"];
//! let mut averages = fields.iter().map(|f| f.parse::<u32>()).try_moving_average(2)?;
//! assert_eq!(averages.next(), Some(Ok(10.0)));
//! assert_eq!(averages.next(), Some(Ok(15.0)));
//! assert!(matches!(averages.next(), Some(Err(_))));
//! assert_eq!(averages.next(), None);
//! # Ok::<(), slidewave::error::WindowError>(())
//! ```

use crate::error::WindowError;
use crate::window::{SlidingWindow, WarmupPolicy, WindowConfig};
use std::iter::FusedIterator;

/// Iterator adapter yielding the moving average of its source.
///
/// Created by [`MovingAverageExt::moving_average`] or [`moving_average`].
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct MovingAverage<I> {
  iter: I,
  window: SlidingWindow,
}

impl<I> MovingAverage<I> {
  /// The window backing this adapter.
  pub fn window(&self) -> &SlidingWindow {
    &self.window
  }
}

impl<I> Iterator for MovingAverage<I>
where
  I: Iterator,
  I::Item: Into<f64>,
{
  type Item = f64;

  fn next(&mut self) -> Option<f64> {
    loop {
      let value = self.iter.next()?.into();
      if let Some(average) = self.window.push(value) {
        return Some(average);
      }
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let (lower, upper) = self.iter.size_hint();
    if self.window.config().warmup == WarmupPolicy::SkipUntilFull {
      let pending = self.window.window_size() - self.window.len();
      let pending = if self.window.is_full() { 0 } else { pending.saturating_sub(1) };
      (lower.saturating_sub(pending), upper)
    } else {
      (lower, upper)
    }
  }
}

impl<I> FusedIterator for MovingAverage<I>
where
  I: FusedIterator,
  I::Item: Into<f64>,
{
}

/// Iterator adapter over a fallible source.
///
/// Yields `Ok(average)` per successful value. The first `Err` is passed through and the
/// adapter is exhausted from then on.
#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct TryMovingAverage<I> {
  iter: I,
  window: SlidingWindow,
  failed: bool,
}

impl<I> TryMovingAverage<I> {
  /// The window backing this adapter.
  pub fn window(&self) -> &SlidingWindow {
    &self.window
  }
}

impl<I, T, E> Iterator for TryMovingAverage<I>
where
  I: Iterator<Item = Result<T, E>>,
  T: Into<f64>,
{
  type Item = Result<f64, E>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }
    loop {
      match self.iter.next()? {
        Ok(value) => {
          if let Some(average) = self.window.push(value.into()) {
            return Some(Ok(average));
          }
        }
        Err(e) => {
          self.failed = true;
          return Some(Err(e));
        }
      }
    }
  }
}

impl<I, T, E> FusedIterator for TryMovingAverage<I>
where
  I: FusedIterator<Item = Result<T, E>>,
  T: Into<f64>,
{
}

/// Adds moving-average adapters to anything iterable over numbers.
///
/// Any item type convertible into `f64` works (`u8` through `u32`, `i8` through `i32`,
/// `f32`, `f64`). 64-bit integers do not convert losslessly; map them first.
pub trait MovingAverageExt: IntoIterator + Sized {
  /// Smooths the sequence with a window of `window_size` values.
  ///
  /// Fails with [`WindowError::InvalidWindowSize`] when `window_size` is 0, before the
  /// source is touched.
  fn moving_average(self, window_size: usize) -> Result<MovingAverage<Self::IntoIter>, WindowError>
  where
    Self::Item: Into<f64>,
  {
    self.moving_average_with(WindowConfig::new(window_size))
  }

  /// Smooths the sequence with a fully specified window.
  fn moving_average_with(
    self,
    config: WindowConfig,
  ) -> Result<MovingAverage<Self::IntoIter>, WindowError>
  where
    Self::Item: Into<f64>,
  {
    let window = SlidingWindow::new(config)?;
    Ok(MovingAverage {
      iter: self.into_iter(),
      window,
    })
  }
}

impl<I: IntoIterator> MovingAverageExt for I {}

/// Adds moving-average adapters to iterables of `Result`s.
pub trait TryMovingAverageExt<T, E>: IntoIterator<Item = Result<T, E>> + Sized {
  /// Smooths the `Ok` values, stopping at the first `Err`.
  fn try_moving_average(
    self,
    window_size: usize,
  ) -> Result<TryMovingAverage<Self::IntoIter>, WindowError>
  where
    T: Into<f64>,
  {
    self.try_moving_average_with(WindowConfig::new(window_size))
  }

  /// Like [`try_moving_average`](Self::try_moving_average) with a full configuration.
  fn try_moving_average_with(
    self,
    config: WindowConfig,
  ) -> Result<TryMovingAverage<Self::IntoIter>, WindowError>
  where
    T: Into<f64>,
  {
    let window = SlidingWindow::new(config)?;
    Ok(TryMovingAverage {
      iter: self.into_iter(),
      window,
      failed: false,
    })
  }
}

impl<I, T, E> TryMovingAverageExt<T, E> for I where I: IntoIterator<Item = Result<T, E>> {}

/// Smooths `input` with a window of `window_size` values.
pub fn moving_average<I>(
  input: I,
  window_size: usize,
) -> Result<MovingAverage<I::IntoIter>, WindowError>
where
  I: IntoIterator,
  I::Item: Into<f64>,
{
  input.moving_average(window_size)
}
