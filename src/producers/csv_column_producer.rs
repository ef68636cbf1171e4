//! CSV column producer.
//!
//! [`CsvColumnProducer`] reads a CSV file and yields a single numeric column as `f64`,
//! one item per record. It is the usual front end for smoothing tabular series such as
//! daily trading volume:
//!
//! ```rust,no_run
//! use slidewave::consumers::VecConsumer;
//! use slidewave::producers::CsvColumnProducer;
//! use slidewave::transformers::MovingAverageTransformer;
//! use slidewave::PipelineBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let consumer = PipelineBuilder::new()
//!   .producer(CsvColumnProducer::new("data/AAPL.csv").with_column("Volume"))
//!   .transformer(MovingAverageTransformer::<f64>::new(5)?)
//!   .consumer(VecConsumer::new())
//!   .run()
//!   .await?;
//! println!("{:?}", consumer.into_vec());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - A file that cannot be opened, or a column that cannot be located, ends the stream
//!   without items.
//! - A field that is not a finite number is a [`StreamError`] resolved through the
//!   producer's [`ErrorStrategy`]: `Skip` drops the record, anything else ends the
//!   stream. Re-reading the same bytes cannot succeed, so `Retry` behaves like `Stop`.
//!
//! Whatever ends the stream early is logged and recorded in the producer's
//! [`ErrorSlot`], so a pipeline run reports it as a failure.
//!
//! Parsing happens on a blocking task and records are handed over through a bounded
//! channel. Dropping the stream closes the channel, which stops the reader and closes the
//! file.

use crate::error::{
  ComponentInfo, ErrorAction, ErrorContext, ErrorSlot, ErrorStrategy, PipelineError, StreamError,
};
use crate::{Output, Producer, ProducerConfig};
use csv::Trim;
use futures::{Stream, StreamExt};
use std::fs::File;
use std::io::BufReader;
use std::pin::Pin;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, warn};

/// Column the producer reads when none is configured.
pub const DEFAULT_COLUMN: &str = "Volume";

const CHANNEL_CAPACITY: usize = 100;

/// Errors raised while extracting a numeric column from a CSV file.
#[derive(Debug, thiserror::Error)]
pub enum CsvColumnError {
  /// The file could not be opened.
  #[error("failed to open {path}: {source}")]
  Open {
    /// Path that was attempted.
    path: String,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// No header matches the requested column name.
  #[error("column {0:?} not found in header")]
  MissingColumn(String),
  /// A named column was requested from a file read without headers.
  #[error("column {0:?} requested by name but headers are disabled")]
  NamedColumnWithoutHeaders(String),
  /// A record has fewer fields than the requested column index.
  #[error("line {line}: no field at index {index}")]
  MissingField {
    /// Line of the record in the file.
    line: u64,
    /// Requested column index.
    index: usize,
  },
  /// A field is not a finite number.
  #[error("line {line}: {value:?} is not a number")]
  Parse {
    /// Line of the record in the file.
    line: u64,
    /// The raw field contents.
    value: String,
  },
  /// The CSV reader failed.
  #[error(transparent)]
  Csv(#[from] csv::Error),
}

/// Identifies which column to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
  /// Column with this header name. Requires headers.
  Name(String),
  /// Zero-based column position.
  Index(usize),
}

impl Default for ColumnSelector {
  fn default() -> Self {
    Self::Name(DEFAULT_COLUMN.to_string())
  }
}

/// Configuration for CSV reading behavior.
#[derive(Debug, Clone)]
pub struct CsvReadConfig {
  /// Whether the CSV has a header row.
  pub has_headers: bool,
  /// The delimiter character (default: comma).
  pub delimiter: u8,
  /// Whether to allow flexible column counts.
  pub flexible: bool,
  /// Whether to trim whitespace from fields.
  pub trim: bool,
  /// The comment character (None means no comments).
  pub comment: Option<u8>,
  /// The quote character (default: double quote).
  pub quote: u8,
  /// Whether double quotes are used for escaping.
  pub double_quote: bool,
}

impl Default for CsvReadConfig {
  fn default() -> Self {
    Self {
      has_headers: true,
      delimiter: b',',
      flexible: false,
      trim: false,
      comment: None,
      quote: b'"',
      double_quote: true,
    }
  }
}

impl CsvReadConfig {
  /// Sets whether the CSV has a header row.
  #[must_use]
  pub fn with_headers(mut self, has_headers: bool) -> Self {
    self.has_headers = has_headers;
    self
  }

  /// Sets the delimiter character.
  #[must_use]
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  /// Sets whether to allow flexible column counts.
  #[must_use]
  pub fn with_flexible(mut self, flexible: bool) -> Self {
    self.flexible = flexible;
    self
  }

  /// Sets whether to trim whitespace from fields.
  #[must_use]
  pub fn with_trim(mut self, trim: bool) -> Self {
    self.trim = trim;
    self
  }

  /// Sets the comment character.
  #[must_use]
  pub fn with_comment(mut self, comment: Option<u8>) -> Self {
    self.comment = comment;
    self
  }

  fn reader_builder(&self) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
      .has_headers(self.has_headers)
      .delimiter(self.delimiter)
      .flexible(self.flexible)
      .trim(if self.trim { Trim::All } else { Trim::None })
      .comment(self.comment)
      .quote(self.quote)
      .double_quote(self.double_quote);
    builder
  }
}

/// A producer yielding one numeric column of a CSV file.
#[derive(Debug, Clone)]
pub struct CsvColumnProducer {
  /// Path to the CSV file.
  pub path: String,
  /// Which column to read.
  pub column: ColumnSelector,
  /// Producer configuration.
  pub config: ProducerConfig<f64>,
  /// CSV-specific configuration.
  pub csv_config: CsvReadConfig,
  /// Receives the error a stream stopped on.
  errors: ErrorSlot,
}

impl CsvColumnProducer {
  /// Creates a producer reading the [`DEFAULT_COLUMN`] of the file at `path`.
  #[must_use]
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      column: ColumnSelector::default(),
      config: ProducerConfig::default(),
      csv_config: CsvReadConfig::default(),
      errors: ErrorSlot::new(),
    }
  }

  /// Reads the column with this header name.
  #[must_use]
  pub fn with_column(mut self, name: impl Into<String>) -> Self {
    self.column = ColumnSelector::Name(name.into());
    self
  }

  /// Reads the column at this zero-based position.
  #[must_use]
  pub fn with_column_index(mut self, index: usize) -> Self {
    self.column = ColumnSelector::Index(index);
    self
  }

  /// Replaces the CSV reading configuration.
  #[must_use]
  pub fn with_csv_config(mut self, csv_config: CsvReadConfig) -> Self {
    self.csv_config = csv_config;
    self
  }

  /// Sets the error strategy for the producer.
  #[must_use]
  pub fn with_error_strategy(mut self, strategy: ErrorStrategy<f64>) -> Self {
    self.config.error_strategy = strategy;
    self
  }

  /// Sets the name for the producer.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.config.name = Some(name);
    self
  }

  /// Sets whether the CSV has a header row.
  #[must_use]
  pub fn with_headers(mut self, has_headers: bool) -> Self {
    self.csv_config.has_headers = has_headers;
    self
  }

  /// Sets the delimiter character.
  #[must_use]
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.csv_config.delimiter = delimiter;
    self
  }

  /// Sets whether to trim whitespace from fields.
  #[must_use]
  pub fn with_trim(mut self, trim: bool) -> Self {
    self.csv_config.trim = trim;
    self
  }

  /// Returns the file path.
  #[must_use]
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Removes and returns the error the last stopped stream ended on.
  pub fn take_error(&self) -> Option<PipelineError> {
    self.errors.take()
  }

  /// Reads the column synchronously, yielding one parsed value per record.
  ///
  /// This is the blocking core behind [`Producer::produce`], usable on its own when no
  /// async runtime is around. Items after the first `Err` are still attempted; callers
  /// decide whether to continue.
  pub fn read_column(
    &self,
  ) -> Result<impl Iterator<Item = Result<f64, CsvColumnError>> + use<>, CsvColumnError> {
    let file = File::open(&self.path).map_err(|source| CsvColumnError::Open {
      path: self.path.clone(),
      source,
    })?;
    let mut reader = self
      .csv_config
      .reader_builder()
      .from_reader(BufReader::new(file));

    let index = match &self.column {
      ColumnSelector::Index(index) => *index,
      ColumnSelector::Name(name) if !self.csv_config.has_headers => {
        return Err(CsvColumnError::NamedColumnWithoutHeaders(name.clone()));
      }
      ColumnSelector::Name(name) => reader
        .headers()?
        .iter()
        .position(|header| header.trim() == name.as_str())
        .ok_or_else(|| CsvColumnError::MissingColumn(name.clone()))?,
    };

    Ok(reader.into_records().map(move |record| {
      let record = record?;
      let line = record.position().map_or(0, |p| p.line());
      let field = record
        .get(index)
        .ok_or(CsvColumnError::MissingField { line, index })?;
      // "NaN" and "inf" parse as f64 but are not measurements.
      match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CsvColumnError::Parse {
          line,
          value: field.to_string(),
        }),
      }
    }))
  }
}

fn reader_error(error: CsvColumnError, component: &ComponentInfo) -> StreamError<f64> {
  StreamError::new(
    Box::new(error),
    ErrorContext {
      timestamp: chrono::Utc::now(),
      item: None,
      component_name: component.name.clone(),
      component_type: component.type_name.clone(),
    },
    component.clone(),
  )
}

// A panicked reader would otherwise look like the end of the file.
fn report_reader_exit(
  result: Result<(), tokio::task::JoinError>,
  component: &ComponentInfo,
  errors: &ErrorSlot,
) {
  if let Err(e) = result {
    error!(component = %component.name, error = %e, "CSV reader task failed");
    errors.record(PipelineError::new(Box::new(e), component.clone()));
  }
}

impl Output for CsvColumnProducer {
  type Output = f64;
  type OutputStream = Pin<Box<dyn Stream<Item = f64> + Send>>;
}

impl Producer for CsvColumnProducer {
  fn produce(&mut self) -> Self::OutputStream {
    let this = self.clone();
    let component = self.component_info();
    let error_strategy = self.config.error_strategy();
    let errors = self.errors.clone();

    Box::pin(async_stream::stream! {
      let (tx, rx) = tokio::sync::mpsc::channel::<Result<f64, StreamError<f64>>>(CHANNEL_CAPACITY);

      let reader_component = component.clone();
      let handle = tokio::task::spawn_blocking(move || {
        let records = match this.read_column() {
          Ok(records) => records,
          Err(e) => {
            debug!(component = %reader_component.name, path = %this.path, "Failed to open CSV column");
            let _ = tx.blocking_send(Err(reader_error(e, &reader_component)));
            return;
          }
        };

        for result in records {
          match result {
            Ok(value) => {
              if tx.blocking_send(Ok(value)).is_err() {
                debug!(component = %reader_component.name, "Consumer went away, stopping reader");
                break;
              }
            }
            Err(e) => {
              let stream_error = reader_error(e, &reader_component);

              match error_strategy.action_for(&stream_error) {
                ErrorAction::Skip => {
                  warn!(
                    component = %reader_component.name,
                    error = %stream_error,
                    "Skipping CSV record"
                  );
                }
                ErrorAction::Stop | ErrorAction::Retry => {
                  let _ = tx.blocking_send(Err(stream_error));
                  break;
                }
              }
            }
          }
        }
      });

      let mut received = ReceiverStream::new(rx);
      while let Some(result) = received.next().await {
        match result {
          Ok(value) => yield value,
          Err(stream_error) => {
            error!(
              component = %component.name,
              error = %stream_error,
              "Error reading CSV column"
            );
            errors.record(stream_error.into());
            break;
          }
        }
      }

      report_reader_exit(handle.await, &component, &errors);
    })
  }

  fn set_config_impl(&mut self, config: ProducerConfig<f64>) {
    self.config = config;
  }

  fn get_config_impl(&self) -> &ProducerConfig<f64> {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut ProducerConfig<f64> {
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
        .unwrap_or_else(|| "csv_column_producer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}
