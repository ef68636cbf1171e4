//! Builder and configuration for the MovingAverageTransformer.

use crate::error::{ErrorSlot, ErrorStrategy, WindowError};
use crate::transformer::TransformerConfig;
use crate::window::{AveragingStrategy, WarmupPolicy, WindowConfig};
use num_traits::ToPrimitive;

/// A transformer that smooths a numeric stream with a sliding-window moving average.
///
/// Every item is converted to `f64` through [`ToPrimitive`]. An item that has no `f64`
/// representation is a conversion error handled by the configured [`ErrorStrategy`]:
/// `Skip` drops it, anything else ends the output stream after logging the error and
/// recording it in the transformer's [`ErrorSlot`], where a pipeline picks it up.
/// Retrying cannot change the outcome of a conversion, so `Retry` behaves like `Stop`.
///
/// Each call to `transform` starts from an empty window.
///
/// # Example
///
/// ```rust
/// use futures::{StreamExt, stream};
/// use slidewave::Transformer;
/// use slidewave::transformers::MovingAverageTransformer;
///
/// # async fn example() -> Result<(), slidewave::error::WindowError> {
/// let mut transformer = MovingAverageTransformer::<i32>::new(3)?;
/// let input = Box::pin(stream::iter(vec![1, 2, 3, 4, 5]));
/// let results: Vec<f64> = transformer.transform(input).collect().await;
/// // [1] -> 1.0, [1,2] -> 1.5, [1,2,3] -> 2.0, [2,3,4] -> 3.0, [3,4,5] -> 4.0
/// assert_eq!(results, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverageTransformer<T>
where
  T: ToPrimitive + std::fmt::Debug + Clone + Send + Sync + 'static,
{
  /// Configuration for the transformer.
  pub(crate) config: TransformerConfig<T>,
  /// Window shape applied to every stream this transformer processes.
  pub(crate) window_config: WindowConfig,
  /// Receives the error a stream stopped on.
  pub(crate) errors: ErrorSlot,
}

impl<T> MovingAverageTransformer<T>
where
  T: ToPrimitive + std::fmt::Debug + Clone + Send + Sync + 'static,
{
  /// Creates a transformer averaging over `window_size` values.
  ///
  /// # Errors
  ///
  /// Returns [`WindowError::InvalidWindowSize`] if `window_size` is 0.
  pub fn new(window_size: usize) -> Result<Self, WindowError> {
    Self::from_window_config(WindowConfig::new(window_size))
  }

  /// Creates a transformer from a full window configuration.
  pub fn from_window_config(window_config: WindowConfig) -> Result<Self, WindowError> {
    window_config.validate()?;
    Ok(Self {
      config: TransformerConfig::default(),
      window_config,
      errors: ErrorSlot::new(),
    })
  }

  /// Sets the name for this transformer.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.config.name = Some(name);
    self
  }

  /// Sets the error strategy for this transformer.
  #[must_use]
  pub fn with_error_strategy(mut self, strategy: ErrorStrategy<T>) -> Self {
    self.config.error_strategy = strategy;
    self
  }

  /// Sets the averaging strategy.
  #[must_use]
  pub fn with_strategy(mut self, strategy: AveragingStrategy) -> Self {
    self.window_config.strategy = strategy;
    self
  }

  /// Sets the warm-up policy.
  #[must_use]
  pub fn with_warmup(mut self, warmup: WarmupPolicy) -> Self {
    self.window_config.warmup = warmup;
    self
  }

  /// Returns the window size.
  pub fn window_size(&self) -> usize {
    self.window_config.window_size
  }

  /// Returns the window configuration.
  pub fn window_config(&self) -> &WindowConfig {
    &self.window_config
  }

  /// Removes and returns the error the last stopped stream ended on.
  pub fn take_error(&self) -> Option<crate::error::PipelineError> {
    self.errors.take()
  }
}
