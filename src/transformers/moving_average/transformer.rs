//! Transformer implementations for MovingAverageTransformer.

use crate::error::{
  ComponentInfo, ErrorAction, ErrorContext, ErrorSlot, PipelineError, StreamError, WindowError,
};
use crate::input::Input;
use crate::output::Output;
use crate::transformer::{Transformer, TransformerConfig};
use crate::transformers::moving_average::moving_average_transformer::MovingAverageTransformer;
use crate::window::SlidingWindow;
use futures::{Stream, StreamExt};
use num_traits::ToPrimitive;
use std::pin::Pin;
use tracing::{debug, error, warn};

impl<T> Input for MovingAverageTransformer<T>
where
  T: ToPrimitive + std::fmt::Debug + Clone + Send + Sync + 'static,
{
  type Input = T;
  type InputStream = Pin<Box<dyn Stream<Item = T> + Send>>;
}

impl<T> Output for MovingAverageTransformer<T>
where
  T: ToPrimitive + std::fmt::Debug + Clone + Send + Sync + 'static,
{
  type Output = f64;
  type OutputStream = Pin<Box<dyn Stream<Item = f64> + Send>>;
}

impl<T> Transformer for MovingAverageTransformer<T>
where
  T: ToPrimitive + std::fmt::Debug + Clone + Send + Sync + 'static,
{
  fn transform(&mut self, input: Self::InputStream) -> Self::OutputStream {
    let component = self.component_info();
    let errors = self.errors.clone();
    let mut window = match SlidingWindow::new(self.window_config.clone()) {
      Ok(window) => window,
      Err(e) => {
        error!(
          component = %component.name,
          error = %e,
          "Invalid window configuration"
        );
        errors.record(PipelineError::new(Box::new(e), component));
        return Box::pin(futures::stream::empty());
      }
    };
    let strategy = self.config.error_strategy();

    debug!(
      component = %component.name,
      window_size = window.window_size(),
      strategy = ?window.config().strategy,
      "Starting moving average"
    );

    Box::pin(async_stream::stream! {
      let mut input = input;
      while let Some(item) = input.next().await {
        let Some(value) = item.to_f64() else {
          let stream_error = StreamError::new(
            Box::new(WindowError::NonNumeric {
              type_name: std::any::type_name::<T>(),
            }),
            ErrorContext {
              timestamp: chrono::Utc::now(),
              item: Some(item),
              component_name: component.name.clone(),
              component_type: component.type_name.clone(),
            },
            component.clone(),
          );

          match strategy.action_for(&stream_error) {
            ErrorAction::Skip => {
              warn!(
                component = %component.name,
                error = %stream_error,
                "Skipping item"
              );
              continue;
            }
            ErrorAction::Stop | ErrorAction::Retry => {
              error!(
                component = %component.name,
                error = %stream_error,
                "Stopping moving average"
              );
              errors.record(stream_error.into());
              break;
            }
          }
        };

        if let Some(average) = window.push(value) {
          yield average;
        }
      }
    })
  }

  fn set_config_impl(&mut self, config: TransformerConfig<T>) {
    self.config = config;
  }

  fn get_config_impl(&self) -> &TransformerConfig<T> {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig<T> {
    &mut self.config
  }

  fn error_slot(&self) -> Option<ErrorSlot> {
    Some(self.errors.clone())
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .config
        .name()
        .unwrap_or_else(|| "moving_average_transformer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorStrategy;
  use crate::window::{AveragingStrategy, WarmupPolicy};
  use futures::stream;

  /// A reading that may be missing, convertible only when present.
  #[derive(Debug, Clone, PartialEq)]
  struct Reading(Option<f64>);

  impl ToPrimitive for Reading {
    fn to_i64(&self) -> Option<i64> {
      self.0.and_then(|v| v.to_i64())
    }

    fn to_u64(&self) -> Option<u64> {
      self.0.and_then(|v| v.to_u64())
    }

    fn to_f64(&self) -> Option<f64> {
      self.0
    }
  }

  fn readings(values: &[Option<f64>]) -> Pin<Box<dyn Stream<Item = Reading> + Send>> {
    Box::pin(stream::iter(values.iter().copied().map(Reading).collect::<Vec<_>>()))
  }

  #[tokio::test]
  async fn test_moving_average_basic() {
    let mut transformer = MovingAverageTransformer::<i32>::new(3).unwrap();
    let input = Box::pin(stream::iter(vec![1, 2, 3, 4, 5, 6, 7]));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    assert_eq!(results, vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0]);
  }

  #[tokio::test]
  async fn test_moving_average_empty_input() {
    let mut transformer = MovingAverageTransformer::<f64>::new(3).unwrap();
    let input = Box::pin(stream::iter(Vec::<f64>::new()));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    assert!(results.is_empty());
  }

  #[tokio::test]
  async fn test_moving_average_negative_values() {
    let mut transformer = MovingAverageTransformer::<f64>::new(2).unwrap();
    let input = Box::pin(stream::iter(vec![10.0, -4.0, 6.0]));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    // [10] -> 10.0
    // [10, -4] -> 3.0
    // [-4, 6] -> 1.0
    assert_eq!(results, vec![10.0, 3.0, 1.0]);
  }

  #[tokio::test]
  async fn test_moving_average_window_of_one() {
    let mut transformer = MovingAverageTransformer::<f64>::new(1).unwrap();
    let input = Box::pin(stream::iter(vec![0.1, 0.2, 0.3]));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    assert_eq!(results, vec![0.1, 0.2, 0.3]);
  }

  #[tokio::test]
  async fn test_moving_average_u64_volumes() {
    let mut transformer = MovingAverageTransformer::<u64>::new(2).unwrap();
    let input = Box::pin(stream::iter(vec![
      100_000_000u64,
      300_000_000,
      500_000_000,
    ]));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    assert_eq!(results, vec![1.0e8, 2.0e8, 4.0e8]);
  }

  #[tokio::test]
  async fn test_moving_average_each_transform_starts_fresh() {
    let mut transformer = MovingAverageTransformer::<i32>::new(2).unwrap();

    let first: Vec<f64> = transformer
      .transform(Box::pin(stream::iter(vec![10, 20])))
      .collect()
      .await;
    let second: Vec<f64> = transformer
      .transform(Box::pin(stream::iter(vec![4, 6])))
      .collect()
      .await;

    assert_eq!(first, vec![10.0, 15.0]);
    assert_eq!(second, vec![4.0, 5.0]);
  }

  #[tokio::test]
  async fn test_moving_average_resum_strategy() {
    let mut transformer = MovingAverageTransformer::<i32>::new(2)
      .unwrap()
      .with_strategy(AveragingStrategy::Resum);
    let input = Box::pin(stream::iter(vec![2, 4, 8]));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    assert_eq!(results, vec![2.0, 3.0, 6.0]);
  }

  #[tokio::test]
  async fn test_moving_average_skip_until_full() {
    let mut transformer = MovingAverageTransformer::<i32>::new(3)
      .unwrap()
      .with_warmup(WarmupPolicy::SkipUntilFull);
    let input = Box::pin(stream::iter(vec![3, 6, 9, 12]));

    let results: Vec<f64> = transformer.transform(input).collect().await;

    assert_eq!(results, vec![6.0, 9.0]);
  }

  #[tokio::test]
  async fn test_moving_average_stops_on_unconvertible_item() {
    let mut transformer = MovingAverageTransformer::<Reading>::new(2).unwrap();

    let results: Vec<f64> = transformer
      .transform(readings(&[Some(2.0), Some(4.0), None, Some(8.0)]))
      .collect()
      .await;

    assert_eq!(results, vec![2.0, 3.0]);
    let stopped = transformer.take_error().unwrap();
    assert_eq!(stopped.component.name, "moving_average_transformer");
    assert_eq!(stopped.item.as_deref(), Some("Reading(None)"));
    assert!(stopped.source.to_string().contains("cannot be represented as f64"));
  }

  #[tokio::test]
  async fn test_moving_average_skips_unconvertible_item() {
    let mut transformer = MovingAverageTransformer::<Reading>::new(2)
      .unwrap()
      .with_error_strategy(ErrorStrategy::Skip);

    let results: Vec<f64> = transformer
      .transform(readings(&[Some(2.0), None, Some(4.0), Some(8.0)]))
      .collect()
      .await;

    assert_eq!(results, vec![2.0, 3.0, 6.0]);
    assert!(transformer.take_error().is_none());
  }

  #[tokio::test]
  async fn test_moving_average_retry_behaves_like_stop() {
    let mut transformer = MovingAverageTransformer::<Reading>::new(2)
      .unwrap()
      .with_error_strategy(ErrorStrategy::Retry(5));

    let results: Vec<f64> = transformer
      .transform(readings(&[Some(1.0), None, Some(3.0)]))
      .collect()
      .await;

    assert_eq!(results, vec![1.0]);
  }

  #[tokio::test]
  async fn test_moving_average_custom_strategy_sees_item() {
    let mut transformer = MovingAverageTransformer::<Reading>::new(2)
      .unwrap()
      .with_name("sensor".to_string())
      .with_error_strategy(ErrorStrategy::new_custom(|error: &StreamError<Reading>| {
        assert_eq!(error.context.item, Some(Reading(None)));
        assert_eq!(error.component.name, "sensor");
        ErrorAction::Skip
      }));

    let results: Vec<f64> = transformer
      .transform(readings(&[None, Some(5.0)]))
      .collect()
      .await;

    assert_eq!(results, vec![5.0]);
  }

  #[test]
  fn test_moving_average_component_info() {
    let transformer = MovingAverageTransformer::<f64>::new(3).unwrap();
    let info = transformer.component_info();
    assert_eq!(info.name, "moving_average_transformer");
    assert!(info.type_name.contains("MovingAverageTransformer"));

    let named = transformer.with_name("volume_ma".to_string());
    assert_eq!(named.component_info().name, "volume_ma");
  }

  #[test]
  fn test_moving_average_create_error_context() {
    let transformer = MovingAverageTransformer::<f64>::new(3)
      .unwrap()
      .with_name("ctx".to_string());
    let context = transformer.create_error_context(Some(1.5));
    assert_eq!(context.item, Some(1.5));
    assert_eq!(context.component_name, "ctx");
  }
}
