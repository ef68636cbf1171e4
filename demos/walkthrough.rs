//! Step-by-step walk through a window of 3 over `[1, 2, 3, 4, 5, 6, 7]`, followed by
//! the warm-up alternatives side by side.
//!
//! ```text
//! cargo run --example walkthrough
//! ```

use slidewave::{SlidingWindow, WarmupPolicy, WindowConfig, WindowError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), WindowError> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let data = [1, 2, 3, 4, 5, 6, 7];
  let window_size = 3;

  println!("{}", "=".repeat(80));
  println!("Moving average, window size {window_size}");
  println!("Input: {data:?}");
  println!("{}", "-".repeat(80));
  println!("{:<6} {:<8} {:<20} {:<10}", "Step", "Value", "Window", "Average");
  println!("{}", "-".repeat(80));

  let mut window = SlidingWindow::with_size(window_size)?;
  for (step, value) in data.iter().enumerate() {
    let Some(average) = window.push(f64::from(*value)) else {
      continue;
    };
    let contents: Vec<f64> = window.values().collect();
    println!(
      "{:<6} {:<8} {:<20} {:<10.2}",
      step + 1,
      value,
      format!("{contents:?}"),
      average
    );
  }
  println!("{}", "=".repeat(80));

  println!();
  println!("Warm-up policies");
  println!("{}", "-".repeat(80));
  for (label, warmup) in [
    ("partial", WarmupPolicy::Partial),
    ("skip until full", WarmupPolicy::SkipUntilFull),
    ("pad with first", WarmupPolicy::PadWithFirst),
  ] {
    let mut window = SlidingWindow::new(WindowConfig::new(window_size).with_warmup(warmup))?;
    let averages: Vec<String> = data
      .iter()
      .filter_map(|v| window.push(f64::from(*v)))
      .map(|a| format!("{a:.2}"))
      .collect();
    println!("{label:<16} [{}]", averages.join(", "));
  }

  Ok(())
}
