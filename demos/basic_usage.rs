/// Basic usage example: feed touch events, get an elderly-likelihood profile
use touch_pattern::{AnalyzerConfig, TouchAction, TouchAnalysisPipeline, TouchSample};

fn main() {
    println!("=== Touch Pattern Engine: Basic Example ===\n");

    // Default config: 10 s sessions, reported pressure
    let mut pipeline = TouchAnalysisPipeline::new(AnalyzerConfig::default());

    // Simulated stream: a slow, wobbly drag followed by two long taps
    let events = vec![
        // Drag (0-600 ms)
        (TouchAction::Down, 100.0, 400.0, 0.30, 0.35, 0, 0),
        (TouchAction::Move, 104.0, 405.0, 0.55, 0.36, 60, 0),
        (TouchAction::Move, 107.0, 399.0, 0.35, 0.38, 120, 0),
        (TouchAction::Move, 112.0, 406.0, 0.60, 0.37, 180, 0),
        (TouchAction::Move, 115.0, 398.0, 0.30, 0.36, 240, 0),
        (TouchAction::Move, 120.0, 404.0, 0.65, 0.38, 300, 0),
        (TouchAction::Move, 124.0, 397.0, 0.25, 0.37, 360, 0),
        (TouchAction::Up, 128.0, 402.0, 0.50, 0.36, 600, 0),

        // Long tap (1500-1850 ms)
        (TouchAction::Down, 300.0, 200.0, 0.70, 0.40, 1500, 1500),
        (TouchAction::Up, 301.0, 201.0, 0.20, 0.40, 1850, 1500),

        // Long tap (3000-3320 ms)
        (TouchAction::Down, 310.0, 220.0, 0.80, 0.42, 3000, 3000),
        (TouchAction::Up, 309.0, 222.0, 0.15, 0.41, 3320, 3000),
    ];

    println!("Processing {} events...\n", events.len());

    for (action, x, y, pressure, size, event_time_ms, down_time_ms) in events {
        let sample = TouchSample::new(action, x, y, pressure, size, event_time_ms, down_time_ms);
        if let Some(profile) = pipeline.submit(&sample) {
            println!("Session expired early: confidence {:.2}", profile.confidence);
        }
    }

    let profile = pipeline.stop();

    println!("{}", pipeline.summary());
    println!("{}", pipeline.report());

    println!("=== Scores ===");
    println!("Speed:             {:.1}", profile.scores.speed);
    println!("Tap duration:      {:.1}", profile.scores.tap_duration);
    println!("Touch size:        {:.1}", profile.scores.touch_size);
    println!("Tremor:            {:.1}", profile.scores.tremor);
    println!("Path efficiency:   {:.1}", profile.scores.path_efficiency);
    println!("Pressure variance: {:.1}", profile.scores.pressure_variance);
}
