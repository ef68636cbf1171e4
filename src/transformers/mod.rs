//! # Transformers
//!
//! Stream transformers shipped with slidewave.
//!
//! - [`MovingAverageTransformer`]: sliding-window moving average over any numeric stream.

pub mod moving_average;

pub use moving_average::MovingAverageTransformer;
