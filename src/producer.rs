//! # Producer Trait
//!
//! Producers sit at the start of a pipeline and hand out a lazy stream of items. Nothing
//! is read until the stream is polled.
//!
//! Built-in producers live in [`crate::producers`]:
//!
//! - [`VecProducer`](crate::producers::VecProducer) yields items from a vector.
//! - [`CsvColumnProducer`](crate::producers::CsvColumnProducer) yields one numeric
//!   column of a CSV file.

use crate::error::{ComponentInfo, ErrorAction, ErrorContext, ErrorSlot, ErrorStrategy, StreamError};
use crate::output::Output;

/// Configuration for a producer: error strategy and name.
#[derive(Debug, Clone)]
pub struct ProducerConfig<T> {
  /// The error handling strategy used while producing items.
  pub error_strategy: ErrorStrategy<T>,
  /// Optional name for identifying this producer in logs.
  pub name: Option<String>,
}

impl<T> Default for ProducerConfig<T> {
  fn default() -> Self {
    Self {
      error_strategy: ErrorStrategy::Stop,
      name: None,
    }
  }
}

impl<T> ProducerConfig<T> {
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

/// Trait for components that produce data streams.
pub trait Producer: Output
where
  Self::Output: std::fmt::Debug + Clone + Send + Sync,
{
  /// Produces the stream of items.
  ///
  /// The returned stream is lazy: no work happens until it is polled.
  fn produce(&mut self) -> Self::OutputStream;

  /// Returns a clone of this producer with `config` applied.
  #[must_use]
  fn with_config(&self, config: ProducerConfig<Self::Output>) -> Self
  where
    Self: Sized + Clone,
  {
    let mut this = self.clone();
    this.set_config(config);
    this
  }

  /// Sets the configuration.
  fn set_config(&mut self, config: ProducerConfig<Self::Output>) {
    self.set_config_impl(config);
  }

  /// Returns the configuration.
  fn config(&self) -> &ProducerConfig<Self::Output> {
    self.get_config_impl()
  }

  /// Returns the configuration mutably.
  fn config_mut(&mut self) -> &mut ProducerConfig<Self::Output> {
    self.get_config_mut_impl()
  }

  /// Decides how to react to `error` using the configured [`ErrorStrategy`].
  fn handle_error(&self, error: &StreamError<Self::Output>) -> ErrorAction {
    self.config().error_strategy.action_for(error)
  }

  /// Builds an [`ErrorContext`] stamped with the current time and this component.
  fn create_error_context(&self, item: Option<Self::Output>) -> ErrorContext<Self::Output> {
    let info = self.component_info();
    ErrorContext {
      timestamp: chrono::Utc::now(),
      item,
      component_name: info.name,
      component_type: info.type_name,
    }
  }

  /// Where this producer records the error it stopped on, if it can stop on one.
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
        .unwrap_or_else(|| "producer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }

  /// Stores the configuration.
  fn set_config_impl(&mut self, config: ProducerConfig<Self::Output>);

  /// Returns the stored configuration.
  fn get_config_impl(&self) -> &ProducerConfig<Self::Output>;

  /// Returns the stored configuration mutably.
  fn get_config_mut_impl(&mut self) -> &mut ProducerConfig<Self::Output>;
}
