//! Moving average transformer.

pub mod moving_average_transformer;
pub mod transformer;

pub use moving_average_transformer::*;
