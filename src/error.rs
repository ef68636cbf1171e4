//! # Error Handling
//!
//! Errors for slidewave come in two layers.
//!
//! - **[`WindowError`]**: configuration and conversion failures of the sliding-window
//!   averager itself. These are raised eagerly, before any input is consumed.
//! - **[`StreamError`]**: failures inside a stream component (producer, transformer,
//!   consumer), carrying an [`ErrorContext`] and [`ComponentInfo`]. What happens next is
//!   decided by the component's [`ErrorStrategy`], which yields an [`ErrorAction`].
//! - **[`PipelineError`]**: the error that made a component stop. Components record it in
//!   their [`ErrorSlot`] so that [`Pipeline::run`](crate::pipeline::Pipeline::run) can
//!   return it instead of reporting a truncated run as a clean one.
//!
//! ## Example
//!
//! ```rust
//! use slidewave::error::{ComponentInfo, ErrorAction, ErrorContext, ErrorStrategy, StreamError};
//!
//! let strategy: ErrorStrategy<f64> = ErrorStrategy::Skip;
//!
//! let error = StreamError::new(
//!   Box::new(std::io::Error::from(std::io::ErrorKind::InvalidData)),
//!   ErrorContext::default(),
//!   ComponentInfo::new("volume".to_string(), "CsvColumnProducer".to_string()),
//! );
//!
//! assert_eq!(strategy.action_for(&error), ErrorAction::Skip);
//! ```

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Errors raised by the sliding-window averager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
  /// The window must hold at least one value.
  #[error("window size must be at least 1, got {0}")]
  InvalidWindowSize(usize),
  /// A resync interval of zero would recompute on every step forever.
  #[error("resync interval must be at least 1")]
  InvalidResyncInterval,
  /// An input value could not be represented as `f64`.
  #[error("value of type {type_name} cannot be represented as f64")]
  NonNumeric {
    /// Rust type name of the offending value.
    type_name: &'static str,
  },
}

/// Action to take when an error occurs in a stream component.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorAction {
  /// Stop processing immediately. The stream ends after the failing item.
  Stop,
  /// Drop the item that caused the error and keep going.
  Skip,
  /// Retry the operation that caused the error.
  Retry,
}

type CustomErrorHandler<T> = Arc<dyn Fn(&StreamError<T>) -> ErrorAction + Send + Sync>;

/// Strategy for handling errors in stream components.
///
/// ```rust
/// use slidewave::error::{ErrorAction, ErrorStrategy};
///
/// let strategy = ErrorStrategy::<f64>::new_custom(|error| {
///   if error.retries < 2 {
///     ErrorAction::Retry
///   } else {
///     ErrorAction::Stop
///   }
/// });
/// # let _ = strategy;
/// ```
pub enum ErrorStrategy<T> {
  /// Stop processing on the first error. This is the default.
  Stop,
  /// Skip items that cause errors.
  Skip,
  /// Retry up to the given number of times, then stop.
  Retry(usize),
  /// User-defined handler.
  Custom(CustomErrorHandler<T>),
}

impl<T> Clone for ErrorStrategy<T> {
  fn clone(&self) -> Self {
    match self {
      ErrorStrategy::Stop => ErrorStrategy::Stop,
      ErrorStrategy::Skip => ErrorStrategy::Skip,
      ErrorStrategy::Retry(n) => ErrorStrategy::Retry(*n),
      ErrorStrategy::Custom(handler) => ErrorStrategy::Custom(handler.clone()),
    }
  }
}

impl<T> fmt::Debug for ErrorStrategy<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ErrorStrategy::Stop => write!(f, "ErrorStrategy::Stop"),
      ErrorStrategy::Skip => write!(f, "ErrorStrategy::Skip"),
      ErrorStrategy::Retry(n) => write!(f, "ErrorStrategy::Retry({})", n),
      ErrorStrategy::Custom(_) => write!(f, "ErrorStrategy::Custom"),
    }
  }
}

impl<T> PartialEq for ErrorStrategy<T> {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (ErrorStrategy::Stop, ErrorStrategy::Stop) => true,
      (ErrorStrategy::Skip, ErrorStrategy::Skip) => true,
      (ErrorStrategy::Retry(n1), ErrorStrategy::Retry(n2)) => n1 == n2,
      (ErrorStrategy::Custom(_), ErrorStrategy::Custom(_)) => true,
      _ => false,
    }
  }
}

impl<T> ErrorStrategy<T> {
  /// Creates a custom error handling strategy from a handler function.
  pub fn new_custom<F>(f: F) -> Self
  where
    F: Fn(&StreamError<T>) -> ErrorAction + Send + Sync + 'static,
  {
    Self::Custom(Arc::new(f))
  }

  /// Resolves the action this strategy prescribes for `error`.
  ///
  /// `Retry(n)` yields [`ErrorAction::Retry`] while `error.retries < n` and
  /// [`ErrorAction::Stop`] afterwards.
  pub fn action_for(&self, error: &StreamError<T>) -> ErrorAction {
    match self {
      ErrorStrategy::Stop => ErrorAction::Stop,
      ErrorStrategy::Skip => ErrorAction::Skip,
      ErrorStrategy::Retry(n) if error.retries < *n => ErrorAction::Retry,
      ErrorStrategy::Retry(_) => ErrorAction::Stop,
      ErrorStrategy::Custom(handler) => handler(error),
    }
  }
}

/// Error that occurred inside a stream component.
#[derive(Debug)]
pub struct StreamError<T> {
  /// The original error.
  pub source: Box<dyn Error + Send + Sync>,
  /// When and where the error occurred.
  pub context: ErrorContext<T>,
  /// The component that encountered the error.
  pub component: ComponentInfo,
  /// Number of times this error has been retried.
  pub retries: usize,
}

impl<T: Clone> Clone for StreamError<T> {
  fn clone(&self) -> Self {
    Self {
      source: Box::new(StringError(self.source.to_string())),
      context: self.context.clone(),
      component: self.component.clone(),
      retries: self.retries,
    }
  }
}

/// An error carrying only a message.
#[derive(Debug)]
pub struct StringError(pub String);

impl fmt::Display for StringError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Error for StringError {}

impl<T> StreamError<T> {
  /// Creates a new `StreamError` with `retries` set to 0.
  pub fn new(
    source: Box<dyn Error + Send + Sync>,
    context: ErrorContext<T>,
    component: ComponentInfo,
  ) -> Self {
    Self {
      source,
      context,
      component,
      retries: 0,
    }
  }
}

impl<T: fmt::Debug> fmt::Display for StreamError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Error in {} ({}): {}",
      self.component.name, self.component.type_name, self.source
    )
  }
}

impl<T: fmt::Debug> Error for StreamError<T> {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(self.source.as_ref())
  }
}

/// The error that stopped a pipeline stage.
///
/// Unlike [`StreamError`] it is not generic over the item type, so stages with different
/// inputs can report through the same pipeline.
#[derive(Debug)]
pub struct PipelineError {
  /// The original error.
  pub source: Box<dyn Error + Send + Sync>,
  /// The component that stopped.
  pub component: ComponentInfo,
  /// When the component stopped.
  pub timestamp: chrono::DateTime<chrono::Utc>,
  /// Debug rendering of the offending item, if there was one.
  pub item: Option<String>,
}

impl PipelineError {
  /// Creates a `PipelineError` for a failure not tied to an item.
  pub fn new(source: Box<dyn Error + Send + Sync>, component: ComponentInfo) -> Self {
    Self {
      source,
      component,
      timestamp: chrono::Utc::now(),
      item: None,
    }
  }
}

impl<T: fmt::Debug> From<StreamError<T>> for PipelineError {
  fn from(error: StreamError<T>) -> Self {
    Self {
      item: error.context.item.as_ref().map(|item| format!("{item:?}")),
      timestamp: error.context.timestamp,
      source: error.source,
      component: error.component,
    }
  }
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} ({}) stopped: {}",
      self.component.name, self.component.type_name, self.source
    )
  }
}

impl Error for PipelineError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(self.source.as_ref())
  }
}

/// Shared cell holding the first error a component stopped on.
///
/// Clones share the cell, so a component and the streams it hands out report to the same
/// place.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Arc<Mutex<Option<PipelineError>>>);

impl ErrorSlot {
  /// Creates an empty slot.
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `error` unless an earlier one is already held.
  pub fn record(&self, error: PipelineError) {
    let mut slot = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot.is_none() {
      *slot = Some(error);
    }
  }

  /// Removes and returns the held error, leaving the slot empty.
  pub fn take(&self) -> Option<PipelineError> {
    self
      .0
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .take()
  }

  /// Whether an error is held.
  pub fn is_set(&self) -> bool {
    self
      .0
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .is_some()
  }
}

/// Context information about when and where an error occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext<T> {
  /// When the error occurred.
  pub timestamp: chrono::DateTime<chrono::Utc>,
  /// The item being processed, if available.
  pub item: Option<T>,
  /// Name of the component that encountered the error.
  pub component_name: String,
  /// Type of the component that encountered the error.
  pub component_type: String,
}

impl<T> Default for ErrorContext<T> {
  fn default() -> Self {
    Self {
      timestamp: chrono::Utc::now(),
      item: None,
      component_name: "default".to_string(),
      component_type: "default".to_string(),
    }
  }
}

/// Identifying information about a stream component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInfo {
  /// The name of the component.
  pub name: String,
  /// The type name of the component.
  pub type_name: String,
}

impl Default for ComponentInfo {
  fn default() -> Self {
    Self {
      name: "default".to_string(),
      type_name: "default".to_string(),
    }
  }
}

impl ComponentInfo {
  /// Creates a new `ComponentInfo`.
  pub fn new(name: String, type_name: String) -> Self {
    Self { name, type_name }
  }
}
