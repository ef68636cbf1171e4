//! # slidewave
//!
//! Lazy sliding-window moving averages over iterators and async streams.
//!
//! Each output is the mean of the most recent `W` inputs. During warm-up, before `W`
//! values have arrived, the mean of everything seen so far is emitted, so the output has
//! exactly one value per input. The window keeps a running sum, making each step O(1)
//! regardless of `W`.
//!
//! ## Quick Start
//!
//! ```rust
//! use slidewave::MovingAverageExt;
//!
//! let averages: Vec<f64> = vec![1, 2, 3, 4, 5, 6, 7].moving_average(3)?.collect();
//! assert_eq!(averages, vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! # Ok::<(), slidewave::WindowError>(())
//! ```
//!
//! For async sources, [`transformers::MovingAverageTransformer`] plugs into a
//! [`PipelineBuilder`] between a producer (an in-memory vector or a CSV column) and a
//! consumer.

#![deny(missing_docs)]

/// Error types and error handling strategies.
pub mod error;
/// Iterator adapters producing moving averages.
pub mod iter;
/// The sliding window and its configuration.
pub mod window;

/// Input side of stream components.
pub mod input;
/// Output side of stream components.
pub mod output;
/// The producer trait and its configuration.
pub mod producer;
/// The transformer trait and its configuration.
pub mod transformer;
/// The consumer trait and its configuration.
pub mod consumer;
/// Typed pipeline builder.
pub mod pipeline;

/// Built-in consumers.
pub mod consumers;
/// Built-in producers.
pub mod producers;
/// Built-in transformers.
pub mod transformers;


pub use consumer::{Consumer, ConsumerConfig};
pub use error::{ErrorAction, ErrorSlot, ErrorStrategy, PipelineError, StreamError, WindowError};
pub use input::Input;
pub use iter::{MovingAverage, MovingAverageExt, TryMovingAverage, TryMovingAverageExt, moving_average};
pub use output::Output;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use producer::{Producer, ProducerConfig};
pub use transformer::{Transformer, TransformerConfig};
pub use window::{AveragingStrategy, Resync, SlidingWindow, WarmupPolicy, WindowConfig};
