//! # Pipeline Builder
//!
//! Connects a producer, one or more transformers and a consumer. The builder is a type
//! state machine: a consumer can only be attached after at least one transformer, and
//! each stage's output stream must convert into the next stage's input stream, so
//! mismatched pipelines fail to compile.
//!
//! Building a pipeline does no work. Streams are wired together lazily and items start
//! flowing only when [`Pipeline::run`] drives the consumer.
//!
//! A stage that stops on an error ends its stream, which looks like ordinary end of input
//! downstream. Such stages record the error in their [`ErrorSlot`], and `run` returns it
//! instead of the consumer.
//!
//! ```rust
//! use slidewave::PipelineBuilder;
//! use slidewave::consumers::VecConsumer;
//! use slidewave::producers::VecProducer;
//! use slidewave::transformers::MovingAverageTransformer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let consumer = PipelineBuilder::new()
//!   .producer(VecProducer::new(vec![1, 2, 3, 4, 5, 6, 7]))
//!   .transformer(MovingAverageTransformer::<i32>::new(3)?)
//!   .consumer(VecConsumer::new())
//!   .run()
//!   .await?;
//! assert_eq!(consumer.into_vec(), vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! # Ok(())
//! # }
//! ```

use crate::error::{ErrorSlot, PipelineError};
use crate::{consumer::Consumer, producer::Producer, transformer::Transformer};
use std::time::Instant;
use tracing::{debug, error};

// Slots outlive a single run, so drop anything left over from an earlier one.
fn fresh_slot(slot: Option<ErrorSlot>) -> Option<ErrorSlot> {
  if let Some(slot) = &slot {
    slot.take();
  }
  slot
}

/// Builder state before a producer is attached.
pub struct Empty;

/// Builder state holding the producer's stream.
pub struct HasProducer<S> {
  stream: S,
}

/// Builder state holding the output stream of the last transformer.
pub struct HasTransformer<S> {
  stream: S,
}

/// Pipeline builder, parameterized by its construction state.
pub struct PipelineBuilder<State> {
  name: Option<String>,
  stages: usize,
  errors: Vec<ErrorSlot>,
  state: State,
}

/// A fully wired pipeline, ready to run.
pub struct Pipeline<S, C> {
  name: Option<String>,
  stages: usize,
  errors: Vec<ErrorSlot>,
  stream: S,
  consumer: C,
}

impl PipelineBuilder<Empty> {
  /// Creates an empty builder.
  pub fn new() -> Self {
    PipelineBuilder {
      name: None,
      stages: 0,
      errors: Vec::new(),
      state: Empty,
    }
  }

  /// Names the pipeline for log output.
  #[must_use]
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Attaches the producer and takes its (lazy) output stream.
  pub fn producer<P>(self, mut producer: P) -> PipelineBuilder<HasProducer<P::OutputStream>>
  where
    P: Producer,
    P::Output: std::fmt::Debug + Clone + Send + Sync + 'static,
  {
    let mut errors = self.errors;
    errors.extend(fresh_slot(producer.error_slot()));
    PipelineBuilder {
      name: self.name,
      stages: 1,
      errors,
      state: HasProducer {
        stream: producer.produce(),
      },
    }
  }
}

impl Default for PipelineBuilder<Empty> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S> PipelineBuilder<HasProducer<S>> {
  /// Feeds the producer's stream into `transformer`.
  pub fn transformer<T>(self, mut transformer: T) -> PipelineBuilder<HasTransformer<T::OutputStream>>
  where
    T: Transformer,
    T::Input: std::fmt::Debug + Clone + Send + Sync + 'static,
    T::Output: std::fmt::Debug + Clone + Send + Sync + 'static,
    T::InputStream: From<S>,
  {
    let mut errors = self.errors;
    errors.extend(fresh_slot(transformer.error_slot()));
    PipelineBuilder {
      name: self.name,
      stages: self.stages + 1,
      errors,
      state: HasTransformer {
        stream: transformer.transform(self.state.stream.into()),
      },
    }
  }
}

impl<S> PipelineBuilder<HasTransformer<S>> {
  /// Chains another transformer after the previous one.
  pub fn transformer<T>(self, mut transformer: T) -> PipelineBuilder<HasTransformer<T::OutputStream>>
  where
    T: Transformer,
    T::Input: std::fmt::Debug + Clone + Send + Sync + 'static,
    T::Output: std::fmt::Debug + Clone + Send + Sync + 'static,
    T::InputStream: From<S>,
  {
    let mut errors = self.errors;
    errors.extend(fresh_slot(transformer.error_slot()));
    PipelineBuilder {
      name: self.name,
      stages: self.stages + 1,
      errors,
      state: HasTransformer {
        stream: transformer.transform(self.state.stream.into()),
      },
    }
  }

  /// Attaches the consumer, completing the pipeline.
  pub fn consumer<C>(self, consumer: C) -> Pipeline<S, C>
  where
    C: Consumer,
    C::Input: std::fmt::Debug + Clone + Send + Sync + 'static,
    C::InputStream: From<S>,
  {
    Pipeline {
      name: self.name,
      stages: self.stages + 1,
      errors: self.errors,
      stream: self.state.stream,
      consumer,
    }
  }
}

impl<S, C> Pipeline<S, C>
where
  C: Consumer,
  C::Input: std::fmt::Debug + Clone + Send + Sync + 'static,
  C::InputStream: From<S>,
{
  /// Number of stages, producer and consumer included.
  pub fn stages(&self) -> usize {
    self.stages
  }

  /// Drives the consumer until the stream ends, then hands the consumer back so its
  /// results can be read.
  ///
  /// # Errors
  ///
  /// Returns the error of the most upstream stage that stopped early. The consumer and
  /// whatever it collected before the stop are dropped.
  pub async fn run(self) -> Result<C, PipelineError> {
    let name = self.name.unwrap_or_else(|| "pipeline".to_string());
    let mut consumer = self.consumer;
    let started = Instant::now();

    debug!(pipeline = %name, stages = self.stages, "Pipeline started");
    consumer.consume(self.stream.into()).await;

    let mut stopped = None;
    for slot in &self.errors {
      if let Some(e) = slot.take() {
        stopped.get_or_insert(e);
      }
    }
    if let Some(e) = stopped {
      error!(
        pipeline = %name,
        component = %e.component.name,
        error = %e,
        "Pipeline stopped early"
      );
      return Err(e);
    }

    debug!(
      pipeline = %name,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "Pipeline finished"
    );
    Ok(consumer)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::consumers::{ConsoleConsumer, VecConsumer};
  use crate::error::ErrorStrategy;
  use crate::producers::VecProducer;
  use crate::transformers::MovingAverageTransformer;
  use crate::window::WarmupPolicy;
  use num_traits::ToPrimitive;

  #[tokio::test]
  async fn test_pipeline_moving_average() {
    let consumer = PipelineBuilder::new()
      .producer(VecProducer::new(vec![1, 2, 3, 4, 5, 6, 7]))
      .transformer(MovingAverageTransformer::<i32>::new(3).unwrap())
      .consumer(VecConsumer::new())
      .run()
      .await
      .unwrap();

    assert_eq!(consumer.into_vec(), vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0]);
  }

  #[tokio::test]
  async fn test_pipeline_chained_transformers() {
    let pipeline = PipelineBuilder::default()
      .with_name("double_smoothing")
      .producer(VecProducer::new(vec![2.0, 4.0, 6.0, 8.0]))
      .transformer(MovingAverageTransformer::<f64>::new(2).unwrap())
      .transformer(MovingAverageTransformer::<f64>::new(2).unwrap())
      .consumer(VecConsumer::new());
    assert_eq!(pipeline.stages(), 4);

    let consumer = pipeline.run().await.unwrap();

    // first pass:  [2, 3, 5, 7]
    // second pass: [2, 2.5, 4, 6]
    assert_eq!(consumer.into_vec(), vec![2.0, 2.5, 4.0, 6.0]);
  }

  #[tokio::test]
  async fn test_pipeline_empty_input() {
    let consumer = PipelineBuilder::new()
      .producer(VecProducer::<u64>::new(vec![]))
      .transformer(MovingAverageTransformer::<u64>::new(5).unwrap())
      .consumer(VecConsumer::new())
      .run()
      .await
      .unwrap();

    assert!(consumer.into_vec().is_empty());
  }

  #[tokio::test]
  async fn test_pipeline_skip_until_full() {
    let consumer = PipelineBuilder::new()
      .producer(VecProducer::new((1..=7).collect::<Vec<u32>>()))
      .transformer(
        MovingAverageTransformer::<u32>::new(3)
          .unwrap()
          .with_warmup(WarmupPolicy::SkipUntilFull)
          .with_error_strategy(ErrorStrategy::Skip),
      )
      .consumer(VecConsumer::new())
      .run()
      .await
      .unwrap();

    assert_eq!(consumer.into_vec(), vec![2.0, 3.0, 4.0, 5.0, 6.0]);
  }

  #[tokio::test]
  async fn test_pipeline_console_limit() {
    let consumer = PipelineBuilder::new()
      .producer(VecProducer::new((0..1_000).collect::<Vec<i64>>()))
      .transformer(MovingAverageTransformer::<i64>::new(10).unwrap())
      .consumer(ConsoleConsumer::new().with_label("ma").with_limit(5))
      .run()
      .await
      .unwrap();

    assert_eq!(consumer.printed(), 5);
  }

  /// A sample with no numeric value when `None`.
  #[derive(Debug, Clone, PartialEq)]
  struct Sample(Option<f64>);

  impl ToPrimitive for Sample {
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

  #[tokio::test]
  async fn test_pipeline_reports_stopped_transformer() {
    let result = PipelineBuilder::new()
      .producer(VecProducer::new(vec![
        Sample(Some(1.0)),
        Sample(None),
        Sample(Some(3.0)),
      ]))
      .transformer(
        MovingAverageTransformer::<Sample>::new(2)
          .unwrap()
          .with_name("smoother".to_string()),
      )
      .transformer(MovingAverageTransformer::<f64>::new(2).unwrap())
      .consumer(VecConsumer::new())
      .run()
      .await;

    let Err(stopped) = result else {
      panic!("conversion failure was not reported");
    };
    assert_eq!(stopped.component.name, "smoother");
    assert_eq!(stopped.item.as_deref(), Some("Sample(None)"));
  }

  #[tokio::test]
  async fn test_pipeline_skipped_errors_are_not_reported() {
    let consumer = PipelineBuilder::new()
      .producer(VecProducer::new(vec![Sample(Some(1.0)), Sample(None), Sample(Some(3.0))]))
      .transformer(
        MovingAverageTransformer::<Sample>::new(2)
          .unwrap()
          .with_error_strategy(ErrorStrategy::Skip),
      )
      .consumer(VecConsumer::new())
      .run()
      .await
      .unwrap();

    assert_eq!(consumer.into_vec(), vec![1.0, 2.0]);
  }
}
