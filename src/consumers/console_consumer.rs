//! Console consumer for printing stream items.
//!
//! [`ConsoleConsumer`] prints one line per item to stdout, optionally prefixed with a
//! label. With a limit set it stops pulling once that many items are printed, and drops
//! the stream, which releases whatever the upstream producer holds open.
//!
//! ```rust
//! use futures::stream;
//! use slidewave::Consumer;
//! use slidewave::consumers::ConsoleConsumer;
//!
//! # async fn example() {
//! let mut consumer = ConsoleConsumer::new().with_label("avg").with_limit(2);
//! consumer.consume(Box::pin(stream::iter(vec![1.0, 1.5, 2.0]))).await;
//! assert_eq!(consumer.printed(), 2);
//! # }
//! ```

use crate::error::{ComponentInfo, ErrorStrategy};
use crate::{Consumer, ConsumerConfig, Input};
use async_trait::async_trait;
use futures::StreamExt;
use std::fmt::Display;
use tracing::debug;

/// A consumer that prints items to the console.
#[derive(Debug, Clone)]
pub struct ConsoleConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + Display + 'static,
{
  /// Configuration for the consumer, including error handling strategy.
  pub config: ConsumerConfig<T>,
  /// Prefix printed before each item.
  pub label: Option<String>,
  /// Maximum number of items to print.
  pub limit: Option<usize>,
  printed: usize,
}

impl<T> ConsoleConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + Display + 'static,
{
  /// Creates a new `ConsoleConsumer` with default configuration.
  pub fn new() -> Self {
    Self {
      config: ConsumerConfig::default(),
      label: None,
      limit: None,
      printed: 0,
    }
  }

  /// Prefixes every printed line with `label`.
  #[must_use]
  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  /// Stops after printing `limit` items.
  #[must_use]
  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  /// Sets the error handling strategy for this consumer.
  #[must_use]
  pub fn with_error_strategy(mut self, strategy: ErrorStrategy<T>) -> Self {
    self.config.error_strategy = strategy;
    self
  }

  /// Sets the name for this consumer.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.config.name = name;
    self
  }

  /// Number of items printed so far.
  pub fn printed(&self) -> usize {
    self.printed
  }

  /// Renders the line printed for `value`.
  pub fn format_line(&self, value: &T) -> String {
    match &self.label {
      Some(label) => format!("{label}: {value}"),
      None => value.to_string(),
    }
  }

  fn exhausted(&self) -> bool {
    self.limit.is_some_and(|limit| self.printed >= limit)
  }
}

impl<T> Default for ConsoleConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + Display + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Input for ConsoleConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + Display + 'static,
{
  type Input = T;
  type InputStream = futures::stream::BoxStream<'static, T>;
}

#[async_trait]
impl<T> Consumer for ConsoleConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + Display + 'static,
{
  async fn consume(&mut self, mut stream: Self::InputStream) {
    while !self.exhausted() {
      let Some(value) = stream.next().await else {
        break;
      };
      println!("{}", self.format_line(&value));
      self.printed += 1;
    }

    if self.exhausted() {
      debug!(
        component = %self.component_info().name,
        printed = self.printed,
        "Print limit reached, dropping stream"
      );
    }
  }

  fn set_config_impl(&mut self, config: ConsumerConfig<T>) {
    self.config = config;
  }

  fn get_config_impl(&self) -> &ConsumerConfig<T> {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut ConsumerConfig<T> {
    &mut self.config
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: if self.config.name.is_empty() {
        "console_consumer".to_string()
      } else {
        self.config.name.clone()
      },
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}
