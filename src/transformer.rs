//! # Transformer Trait
//!
//! Transformers turn one stream into another as items flow through a pipeline. The
//! transformation is lazy: the output stream pulls from the input only when polled.
//!
//! ## Example
//!
//! ```rust
//! use futures::{StreamExt, stream};
//! use slidewave::Transformer;
//! use slidewave::transformers::MovingAverageTransformer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut transformer = MovingAverageTransformer::<u32>::new(2)?;
//! let output = transformer.transform(Box::pin(stream::iter(vec![2, 4, 6])));
//! assert_eq!(output.collect::<Vec<f64>>().await, vec![2.0, 3.0, 5.0]);
//! # Ok(())
//! # }
//! ```

use crate::error::{ComponentInfo, ErrorAction, ErrorContext, ErrorSlot, ErrorStrategy, StreamError};
use crate::{input::Input, output::Output};

/// Configuration for transformers: error strategy and name.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformerConfig<T> {
  /// The error handling strategy to use when an item cannot be processed.
  pub error_strategy: ErrorStrategy<T>,
  /// Optional name for identifying this transformer in logs.
  pub name: Option<String>,
}

impl<T> Default for TransformerConfig<T> {
  fn default() -> Self {
    Self {
      error_strategy: ErrorStrategy::Stop,
      name: None,
    }
  }
}

impl<T> TransformerConfig<T> {
  /// Sets the error handling strategy.
  #[must_use]
  pub fn with_error_strategy(mut self, strategy: ErrorStrategy<T>) -> Self {
    self.error_strategy = strategy;
    self
  }

  /// Sets the name.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Returns the current error handling strategy.
  pub fn error_strategy(&self) -> ErrorStrategy<T> {
    self.error_strategy.clone()
  }

  /// Returns the current name, if set.
  pub fn name(&self) -> Option<String> {
    self.name.clone()
  }
}

/// Trait for components that transform data streams.
pub trait Transformer: Input + Output
where
  Self::Input: std::fmt::Debug + Clone + Send + Sync,
{
  /// Transforms the input stream into the output stream.
  fn transform(&mut self, input: Self::InputStream) -> Self::OutputStream;

  /// Returns a clone of this transformer with `config` applied.
  #[must_use]
  fn with_config(&self, config: TransformerConfig<Self::Input>) -> Self
  where
    Self: Sized + Clone,
  {
    let mut this = self.clone();
    this.set_config(config);
    this
  }

  /// Sets the configuration.
  fn set_config(&mut self, config: TransformerConfig<Self::Input>) {
    self.set_config_impl(config);
  }

  /// Returns the configuration.
  fn config(&self) -> &TransformerConfig<Self::Input> {
    self.get_config_impl()
  }

  /// Returns the configuration mutably.
  fn config_mut(&mut self) -> &mut TransformerConfig<Self::Input> {
    self.get_config_mut_impl()
  }

  /// Decides how to react to `error` using the configured [`ErrorStrategy`].
  fn handle_error(&self, error: &StreamError<Self::Input>) -> ErrorAction {
    self.config().error_strategy.action_for(error)
  }

  /// Builds an [`ErrorContext`] stamped with the current time and this component.
  fn create_error_context(&self, item: Option<Self::Input>) -> ErrorContext<Self::Input> {
    let info = self.component_info();
    ErrorContext {
      timestamp: chrono::Utc::now(),
      item,
      component_name: info.name,
      component_type: info.type_name,
    }
  }

  /// Where this transformer records the error it stopped on, if it can stop on one.
  ///
  /// [`Pipeline::run`](crate::pipeline::Pipeline::run) checks these slots once the
  /// consumer returns.
  fn error_slot(&self) -> Option<ErrorSlot> {
    None
  }

  /// Name and type of this component for error reporting.
  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .config()
        .name()
        .unwrap_or_else(|| "transformer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }

  /// Stores the configuration.
  fn set_config_impl(&mut self, config: TransformerConfig<Self::Input>);

  /// Returns the stored configuration.
  fn get_config_impl(&self) -> &TransformerConfig<Self::Input>;

  /// Returns the stored configuration mutably.
  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig<Self::Input>;
}
