//! Output trait for components that produce streams.
//!
//! Implemented by producers and transformers. A transformer's `OutputStream` feeds the
//! next stage's `InputStream` through a `From` conversion, so identical boxed stream types
//! connect directly.

use futures::Stream;

/// Trait for components that produce an output stream.
pub trait Output
where
  Self::Output: Send + 'static,
{
  /// The type of items produced.
  type Output;
  /// The stream type yielding `Self::Output`.
  type OutputStream: Stream<Item = Self::Output> + Send + 'static;
}
