//! Built-in consumers.

pub mod console_consumer;
pub mod vec_consumer;

pub use console_consumer::ConsoleConsumer;
pub use vec_consumer::VecConsumer;
