//! Vector consumer.

use crate::error::{ComponentInfo, ErrorStrategy};
use crate::{Consumer, ConsumerConfig, Input};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// A consumer that collects stream items into a Vec, in the order received.
#[derive(Debug, Clone)]
pub struct VecConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  /// The Vec storing consumed items.
  pub vec: Vec<T>,
  /// Configuration for the consumer, including error handling strategy.
  pub config: ConsumerConfig<T>,
}

impl<T> Default for VecConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> VecConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  /// Creates a new `VecConsumer`.
  pub fn new() -> Self {
    Self {
      vec: Vec::new(),
      config: ConsumerConfig::default(),
    }
  }

  /// Creates a new `VecConsumer` with the specified capacity.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      vec: Vec::with_capacity(capacity),
      config: ConsumerConfig::default(),
    }
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

  /// Items collected so far.
  pub fn items(&self) -> &[T] {
    &self.vec
  }

  /// Consumes the consumer and returns the collected Vec.
  pub fn into_vec(self) -> Vec<T> {
    self.vec
  }
}

impl<T> Input for VecConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  type Input = T;
  type InputStream = Pin<Box<dyn Stream<Item = Self::Input> + Send>>;
}

#[async_trait]
impl<T> Consumer for VecConsumer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  async fn consume(&mut self, mut stream: Self::InputStream) {
    while let Some(item) = stream.next().await {
      self.vec.push(item);
    }
  }

  fn get_config_impl(&self) -> &ConsumerConfig<Self::Input> {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut ConsumerConfig<Self::Input> {
    &mut self.config
  }

  fn set_config_impl(&mut self, config: ConsumerConfig<Self::Input>) {
    self.config = config;
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: if self.config.name.is_empty() {
        "vec_consumer".to_string()
      } else {
        self.config.name.clone()
      },
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::stream;

  #[tokio::test]
  async fn test_vec_consumer_collects_in_order() {
    let mut consumer = VecConsumer::new();
    consumer
      .consume(Box::pin(stream::iter(vec![1.0, 1.5, 2.0])))
      .await;
    assert_eq!(consumer.items(), &[1.0, 1.5, 2.0]);
    assert_eq!(consumer.into_vec(), vec![1.0, 1.5, 2.0]);
  }

  #[tokio::test]
  async fn test_vec_consumer_appends_across_streams() {
    let mut consumer = VecConsumer::with_capacity(4);
    consumer.consume(Box::pin(stream::iter(vec![1, 2]))).await;
    consumer.consume(Box::pin(stream::iter(vec![3]))).await;
    assert_eq!(consumer.into_vec(), vec![1, 2, 3]);
  }

  #[tokio::test]
  async fn test_vec_consumer_empty_stream() {
    let mut consumer = VecConsumer::<f64>::default();
    consumer.consume(Box::pin(stream::empty())).await;
    assert!(consumer.into_vec().is_empty());
  }

  #[test]
  fn test_vec_consumer_component_info() {
    let consumer = VecConsumer::<f64>::new();
    assert_eq!(consumer.component_info().name, "vec_consumer");

    let named = consumer
      .with_name("averages".to_string())
      .with_error_strategy(ErrorStrategy::Skip);
    assert_eq!(named.component_info().name, "averages");
    assert_eq!(named.config().error_strategy(), ErrorStrategy::Skip);
  }
}
