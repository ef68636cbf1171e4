//! # Consumer Trait
//!
//! Consumers terminate a pipeline. Pulling from the stream is what drives every
//! upstream stage, so a consumer that stops early stops the whole pipeline.

use crate::Input;
use crate::error::{ComponentInfo, ErrorAction, ErrorContext, ErrorStrategy, StreamError};
use async_trait::async_trait;

/// Configuration for a consumer: error strategy and name.
#[derive(Debug, Clone)]
pub struct ConsumerConfig<T> {
  /// The error handling strategy to use when processing items.
  pub error_strategy: ErrorStrategy<T>,
  /// The name of this consumer.
  pub name: String,
}

impl<T> Default for ConsumerConfig<T> {
  fn default() -> Self {
    Self {
      error_strategy: ErrorStrategy::Stop,
      name: String::new(),
    }
  }
}

impl<T> ConsumerConfig<T> {
  /// Sets the error handling strategy.
  #[must_use]
  pub fn with_error_strategy(mut self, strategy: ErrorStrategy<T>) -> Self {
    self.error_strategy = strategy;
    self
  }

  /// Sets the name.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.name = name;
    self
  }

  /// Returns the current error handling strategy.
  pub fn error_strategy(&self) -> ErrorStrategy<T> {
    self.error_strategy.clone()
  }

  /// Returns the current name.
  pub fn name(&self) -> &str {
    &self.name
  }
}

/// Trait for components that consume data streams.
#[async_trait]
pub trait Consumer: Input
where
  Self::Input: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  /// Consumes the stream.
  async fn consume(&mut self, stream: Self::InputStream);

  /// Returns a clone of this consumer with `config` applied.
  #[must_use]
  fn with_config(&self, config: ConsumerConfig<Self::Input>) -> Self
  where
    Self: Sized + Clone,
  {
    let mut this = self.clone();
    this.set_config(config);
    this
  }

  /// Sets the configuration.
  fn set_config(&mut self, config: ConsumerConfig<Self::Input>) {
    self.set_config_impl(config);
  }

  /// Returns the configuration.
  fn config(&self) -> &ConsumerConfig<Self::Input> {
    self.get_config_impl()
  }

  /// Returns the configuration mutably.
  fn config_mut(&mut self) -> &mut ConsumerConfig<Self::Input> {
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

  /// Name and type of this component for error reporting.
  fn component_info(&self) -> ComponentInfo {
    let name = self.config().name();
    ComponentInfo {
      name: if name.is_empty() {
        "consumer".to_string()
      } else {
        name.to_string()
      },
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }

  /// Stores the configuration.
  fn set_config_impl(&mut self, config: ConsumerConfig<Self::Input>);

  /// Returns the stored configuration.
  fn get_config_impl(&self) -> &ConsumerConfig<Self::Input>;

  /// Returns the stored configuration mutably.
  fn get_config_mut_impl(&mut self) -> &mut ConsumerConfig<Self::Input>;
}
