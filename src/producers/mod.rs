//! Built-in producers.

pub mod csv_column_producer;
pub mod vec_producer;

pub use csv_column_producer::{
  ColumnSelector, CsvColumnError, CsvColumnProducer, CsvReadConfig, DEFAULT_COLUMN,
};
pub use vec_producer::VecProducer;
