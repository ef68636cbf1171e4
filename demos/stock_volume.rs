//! Smooths the `Volume` column of a daily stock CSV.
//!
//! ```text
//! cargo run --example stock_volume -- data/AAPL.csv
//! ```
//!
//! Without an argument a small built-in sample is written to a temporary file and used
//! instead. Set `RUST_LOG=slidewave=debug` to see the pipeline lifecycle.

use slidewave::consumers::{ConsoleConsumer, VecConsumer};
use slidewave::producers::CsvColumnProducer;
use slidewave::transformers::MovingAverageTransformer;
use slidewave::PipelineBuilder;
use std::error::Error;
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLES: usize = 15;

const SAMPLE_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,187.15,188.44,183.89,185.64,184.94,82488700
2024-01-03,184.22,185.88,183.43,184.25,183.55,58414500
2024-01-04,182.15,183.09,180.88,181.91,181.22,71983600
2024-01-05,181.99,182.76,180.17,181.18,180.49,62303300
2024-01-08,182.09,185.60,181.50,185.56,184.86,59144500
2024-01-09,183.92,185.15,182.73,185.14,184.44,42841800
2024-01-10,184.35,186.40,183.92,186.19,185.49,46792900
2024-01-11,186.54,187.05,183.62,185.59,184.89,49128400
2024-01-12,186.06,186.74,185.19,185.92,185.22,40444700
2024-01-16,182.16,184.26,180.93,183.63,182.94,65603000
2024-01-17,181.27,182.93,180.30,182.68,181.99,47317400
2024-01-18,186.09,189.14,185.83,188.63,187.91,78005800
2024-01-19,189.33,191.95,188.82,191.56,190.83,68741000
2024-01-22,192.30,195.33,192.26,193.89,193.16,60133900
2024-01-23,195.02,195.75,193.83,195.18,194.44,42355600
2024-01-24,195.42,196.38,194.34,194.50,193.76,53631300
";

fn thousands(value: f64, decimals: usize) -> String {
  let formatted = format!("{:.*}", decimals, value.abs());
  let (whole, fraction) = match formatted.split_once('.') {
    Some((whole, fraction)) => (whole, Some(fraction)),
    None => (formatted.as_str(), None),
  };
  let mut grouped = String::new();
  for (i, digit) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(digit);
  }
  let sign = if value < 0.0 { "-" } else { "" };
  match fraction {
    Some(fraction) => format!("{sign}{grouped}.{fraction}"),
    None => format!("{sign}{grouped}"),
  }
}

async fn smoothed(path: &str, window_size: usize, limit: usize) -> Result<Vec<f64>, Box<dyn Error>> {
  let consumer = PipelineBuilder::new()
    .with_name(format!("volume_ma{window_size}"))
    .producer(CsvColumnProducer::new(path))
    .transformer(MovingAverageTransformer::<f64>::new(window_size)?)
    .consumer(VecConsumer::new())
    .run()
    .await?;
  Ok(consumer.into_vec().into_iter().take(limit).collect())
}

async fn raw(path: &str, limit: usize) -> Result<Vec<f64>, Box<dyn Error>> {
  let producer = CsvColumnProducer::new(path);
  let values = tokio::task::spawn_blocking(move || -> Result<Vec<f64>, String> {
    producer
      .read_column()
      .map_err(|e| e.to_string())?
      .take(limit)
      .collect::<Result<Vec<f64>, _>>()
      .map_err(|e| e.to_string())
  })
  .await??;
  Ok(values)
}

async fn print_comparison(path: &str, window_size: usize) -> Result<(), Box<dyn Error>> {
  let unfiltered = raw(path, SAMPLES).await?;
  let filtered = smoothed(path, window_size, SAMPLES).await?;

  println!("{}", "=".repeat(80));
  println!("Comparing Unfiltered vs. Filtered Data (Window Size: {window_size})");
  println!("{}", "=".repeat(80));
  println!("{:<8} {:<25} {:<25}", "Sample", "Unfiltered Volume", "Filtered Volume (MA)");
  println!("{}", "-".repeat(80));
  for (i, (unfiltered, filtered)) in unfiltered.iter().zip(&filtered).enumerate() {
    println!(
      "{:<8} {:<25} {:<25}",
      i + 1,
      thousands(*unfiltered, 0),
      thousands(*filtered, 2)
    );
  }
  println!("{}", "=".repeat(80));
  Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  // The sample file lives until main returns.
  let (path, _sample) = match std::env::args().nth(1) {
    Some(path) => (path, None),
    None => {
      let mut file = tempfile::NamedTempFile::new()?;
      file.write_all(SAMPLE_CSV.as_bytes())?;
      file.flush()?;
      let path = file.path().to_string_lossy().into_owned();
      info!(path = %path, "No CSV given, using built-in sample");
      (path, Some(file))
    }
  };

  println!("{}", "=".repeat(80));
  println!("Volume - Unfiltered");
  println!("{}", "=".repeat(80));
  for (i, volume) in raw(&path, SAMPLES).await?.iter().enumerate() {
    println!("Sample {:2}: {:>15} shares", i + 1, thousands(*volume, 0));
  }

  println!();
  println!("{}", "=".repeat(80));
  println!("Volume - Filtered (Window=5)");
  println!("{}", "=".repeat(80));
  PipelineBuilder::new()
    .producer(CsvColumnProducer::new(path.clone()))
    .transformer(MovingAverageTransformer::<f64>::new(5)?)
    .consumer(ConsoleConsumer::new().with_label("Sample (average)").with_limit(SAMPLES))
    .run()
    .await?;

  println!();
  print_comparison(&path, 5).await?;

  println!();
  println!("{}", "=".repeat(80));
  println!("Effect of Different Window Sizes");
  println!("{}", "=".repeat(80));
  for window_size in [3, 5, 10] {
    println!();
    println!("Window Size: {window_size}");
    println!("{}", "-".repeat(40));
    for (i, average) in smoothed(&path, window_size, 5).await?.iter().enumerate() {
      println!("  Sample {}: {:>12}", i + 1, thousands(*average, 2));
    }
  }

  Ok(())
}
