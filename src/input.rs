//! Input trait for components that consume streams.
//!
//! Implemented by transformers and consumers. The associated stream type is what the
//! pipeline hands to [`crate::Transformer::transform`] or [`crate::Consumer::consume`].
//!
//! ```rust
//! use futures::Stream;
//! use slidewave::Input;
//! use std::pin::Pin;
//!
//! struct Sink;
//!
//! impl Input for Sink {
//!   type Input = f64;
//!   type InputStream = Pin<Box<dyn Stream<Item = f64> + Send>>;
//! }
//! ```

use futures::Stream;

/// Trait for components that accept an input stream.
pub trait Input
where
  Self::Input: Send + 'static,
{
  /// The type of items accepted.
  type Input;
  /// The stream type yielding `Self::Input`.
  type InputStream: Stream<Item = Self::Input> + Send + 'static;
}
