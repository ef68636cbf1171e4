use slidewave::{
  AveragingStrategy, MovingAverageExt, Resync, SlidingWindow, TryMovingAverageExt, WarmupPolicy,
  WindowConfig, WindowError, moving_average,
};

#[test]
fn test_step_table() {
  let data = [1, 2, 3, 4, 5, 6, 7];
  let window_size = 3;

  let rows: Vec<(i32, Vec<i32>, f64)> = data
    .iter()
    .zip(moving_average(data, window_size).unwrap())
    .enumerate()
    .map(|(i, (value, average))| {
      let start = (i + 1).saturating_sub(window_size);
      (*value, data[start..=i].to_vec(), average)
    })
    .collect();

  assert_eq!(rows[0], (1, vec![1], 1.0));
  assert_eq!(rows[1], (2, vec![1, 2], 1.5));
  assert_eq!(rows[2], (3, vec![1, 2, 3], 2.0));
  assert_eq!(rows[6], (7, vec![5, 6, 7], 6.0));
}

#[test]
fn test_empty_input_for_any_window() {
  for window_size in [1, 2, 10, 1_000] {
    let out: Vec<f64> = moving_average(Vec::<f64>::new(), window_size)
      .unwrap()
      .collect();
    assert!(out.is_empty());
  }
}

#[test]
fn test_zero_window_rejected() {
  assert_eq!(
    moving_average(vec![1.0], 0).unwrap_err(),
    WindowError::InvalidWindowSize(0)
  );
  assert_eq!(
    SlidingWindow::with_size(0).unwrap_err().to_string(),
    "window size must be at least 1, got 0"
  );
}

#[test]
fn test_unbounded_source_is_pulled_on_demand() {
  let averages: Vec<f64> = (1u32..).moving_average(2).unwrap().take(4).collect();
  assert_eq!(averages, vec![1.0, 1.5, 2.5, 3.5]);
}

#[test]
fn test_parse_failure_propagates() {
  let fields = ["100", "200", "1e3x", "400"];
  let mut averages = fields
    .iter()
    .map(|f| f.parse::<f64>())
    .try_moving_average(2)
    .unwrap();

  assert_eq!(averages.next(), Some(Ok(100.0)));
  assert_eq!(averages.next(), Some(Ok(150.0)));
  assert!(matches!(averages.next(), Some(Err(_))));
  assert_eq!(averages.next(), None);
}

#[test]
fn test_variants_on_long_fractional_stream() {
  let input: Vec<f64> = (0..100_000).map(|i| (i as f64 * 0.37).sin() * 1e3 + 0.1).collect();

  let exact: Vec<f64> = input
    .iter()
    .copied()
    .moving_average_with(WindowConfig::new(50).with_strategy(AveragingStrategy::Resum))
    .unwrap()
    .collect();
  let resynced: Vec<f64> = input.iter().copied().moving_average(50).unwrap().collect();
  let drifting: Vec<f64> = input
    .iter()
    .copied()
    .moving_average_with(WindowConfig::new(50).with_resync(Resync::Never))
    .unwrap()
    .collect();

  let max_error = |out: &[f64]| {
    out
      .iter()
      .zip(&exact)
      .map(|(a, b)| (a - b).abs())
      .fold(0.0, f64::max)
  };

  assert!(max_error(&resynced) < 1e-9);
  assert!(max_error(&drifting) < 1e-6);
}

#[test]
fn test_extreme_values_do_not_outlive_the_window() {
  let data = [1e308, 1e308, 1.0, 1.0, 1.0];
  let running: Vec<f64> = data.moving_average(2).unwrap().collect();
  let resum: Vec<f64> = data
    .moving_average_with(WindowConfig::new(2).with_strategy(AveragingStrategy::Resum))
    .unwrap()
    .collect();
  assert_eq!(running, resum);
  assert_eq!(running[2], 5e307);

  let data = [f64::INFINITY, 1.0, 2.0, 3.0, 4.0, 5.0];
  let out: Vec<f64> = data
    .moving_average_with(WindowConfig::new(3).with_resync(Resync::Never))
    .unwrap()
    .collect();
  assert_eq!(&out[3..], &[2.0, 3.0, 4.0]);
}

#[test]
fn test_warmup_alternatives() {
  let data = [4.0, 8.0, 6.0, 2.0];

  let skipped: Vec<f64> = data
    .moving_average_with(WindowConfig::new(3).with_warmup(WarmupPolicy::SkipUntilFull))
    .unwrap()
    .collect();
  assert_eq!(skipped, vec![6.0, 16.0 / 3.0]);

  let padded: Vec<f64> = data
    .moving_average_with(WindowConfig::new(3).with_warmup(WarmupPolicy::PadWithFirst))
    .unwrap()
    .collect();
  assert_eq!(padded, vec![4.0, 16.0 / 3.0, 6.0, 16.0 / 3.0]);
}
