//! Vector producer.
//!
//! [`VecProducer`] turns an in-memory `Vec` into a stream, yielding items in order. The
//! vector is cloned on every `produce`, so the same producer can feed several pipelines,
//! which is how the demos compare window sizes over one series.

use crate::error::{ComponentInfo, ErrorStrategy};
use crate::{Output, Producer, ProducerConfig};
use futures::{Stream, stream};
use std::pin::Pin;

/// A producer that yields items from a Vec.
#[derive(Debug, Clone)]
pub struct VecProducer<T>
where
  T: std::fmt::Debug + Clone + Send + Sync + 'static,
{
  /// The Vec data to produce from.
  pub data: Vec<T>,
  /// Configuration for the producer, including error handling strategy.
  pub config: ProducerConfig<T>,
}

impl<T: std::fmt::Debug + Clone + Send + Sync + 'static> VecProducer<T> {
  /// Creates a new `VecProducer` with the given Vec.
  pub fn new(data: Vec<T>) -> Self {
    Self {
      data,
      config: ProducerConfig::default(),
    }
  }

  /// Sets the error handling strategy for this producer.
  #[must_use]
  pub fn with_error_strategy(mut self, strategy: ErrorStrategy<T>) -> Self {
    self.config.error_strategy = strategy;
    self
  }

  /// Sets the name for this producer.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.config.name = Some(name);
    self
  }
}

impl<T: std::fmt::Debug + Clone + Send + Sync + 'static> From<Vec<T>> for VecProducer<T> {
  fn from(data: Vec<T>) -> Self {
    Self::new(data)
  }
}

impl<T: std::fmt::Debug + Clone + Send + Sync + 'static> Output for VecProducer<T> {
  type Output = T;
  type OutputStream = Pin<Box<dyn Stream<Item = T> + Send>>;
}

impl<T: std::fmt::Debug + Clone + Send + Sync + 'static> Producer for VecProducer<T> {
  fn produce(&mut self) -> Self::OutputStream {
    Box::pin(stream::iter(self.data.clone()))
  }

  fn set_config_impl(&mut self, config: ProducerConfig<T>) {
    self.config = config;
  }

  fn get_config_impl(&self) -> &ProducerConfig<T> {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut ProducerConfig<T> {
    &mut self.config
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .config
        .name()
        .unwrap_or_else(|| "vec_producer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::StreamExt;

  #[tokio::test]
  async fn test_vec_producer_yields_in_order() {
    let mut producer = VecProducer::new(vec![3, 1, 2]);
    let result: Vec<i32> = producer.produce().collect().await;
    assert_eq!(result, vec![3, 1, 2]);
  }

  #[tokio::test]
  async fn test_vec_producer_is_reusable() {
    let mut producer = VecProducer::from(vec![1.5, 2.5]);
    let first: Vec<f64> = producer.produce().collect().await;
    let second: Vec<f64> = producer.produce().collect().await;
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn test_vec_producer_empty() {
    let mut producer = VecProducer::<f64>::new(Vec::new());
    assert!(producer.produce().next().await.is_none());
  }

  #[test]
  fn test_vec_producer_config() {
    let producer = VecProducer::new(vec![1])
      .with_name("numbers".to_string())
      .with_error_strategy(ErrorStrategy::Skip);
    assert_eq!(producer.config().name(), Some("numbers".to_string()));
    assert_eq!(producer.config().error_strategy(), ErrorStrategy::Skip);
    assert_eq!(producer.component_info().name, "numbers");
  }

  #[test]
  fn test_vec_producer_with_config() {
    let producer = VecProducer::new(vec![1]);
    let configured = producer.with_config(ProducerConfig::default().with_name("cfg".to_string()));
    assert_eq!(configured.config().name(), Some("cfg".to_string()));
    assert_eq!(producer.config().name(), None);
  }
}
