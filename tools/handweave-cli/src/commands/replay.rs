//! Replay a detector dump through the engine.

use std::path::PathBuf;

use anyhow::Context;
use handweave_common::config::AppConfig;
use handweave_gesture::ReplaySource;
use handweave_model::gesture::GestureReading;
use handweave_session::{ChoreographySession, OfflineDriver, PacedSource};

fn describe(reading: &GestureReading) -> String {
    match reading.pinch_center {
        Some(c) => format!("{} at ({:.3}, {:.3})", reading.gesture, c.x, c.y),
        None => reading.gesture.to_string(),
    }
}

/// Deterministic replay: render ticks derived from sample timestamps.
pub fn run_offline(
    config: AppConfig,
    file: PathBuf,
    settle_ticks: u64,
    json: bool,
) -> anyhow::Result<()> {
    let mut source = ReplaySource::open(&file)
        .with_context(|| format!("Failed to open detector dump {}", file.display()))?;
    let mut driver =
        OfflineDriver::from_config(&config).context("Failed to build choreography engine")?;

    let fed = driver.run_source(&mut source);
    tracing::info!(samples = fed, "Replay finished");

    let report = driver.finish(settle_ticks);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Replayed {}", file.display());
    println!("Transitions:");
    if report.transitions.is_empty() {
        println!("  (none)");
    }
    for t in &report.transitions {
        println!(
            "  {:>9.3}s  tick {:>6}  {} -> {} (gen {})",
            t.timestamp_ns as f64 / 1e9,
            t.tick,
            describe(&t.reading),
            t.state,
            t.generation
        );
    }
    println!();
    println!(
        "Samples: {} ({} hand, {} no hand, {} malformed)",
        report.detection.samples,
        report.detection.hands,
        report.detection.no_hand,
        report.detection.malformed
    );
    println!("Render ticks: {}", report.ticks);
    println!("Final gesture: {}", describe(&report.final_gesture));
    println!("Final formation: {}", report.final_state);
    println!("Max distance to target: {:.4}", report.max_distance);

    Ok(())
}

/// Live replay on the tokio session, paced by sample timestamps.
pub async fn run_realtime(config: AppConfig, file: PathBuf, json: bool) -> anyhow::Result<()> {
    let source = ReplaySource::open(&file)
        .with_context(|| format!("Failed to open detector dump {}", file.display()))?;

    let mut session =
        ChoreographySession::new(config).context("Failed to build choreography engine")?;
    let mut gestures = session.subscribe_gesture();
    session.start(Box::new(PacedSource::new(source)))?;

    println!("Replaying {} in real time (Ctrl+C to stop)...", file.display());

    loop {
        tokio::select! {
            changed = gestures.changed() => {
                // The sender goes away once the dump is exhausted.
                if changed.is_err() {
                    break;
                }
                let reading = *gestures.borrow_and_update();
                println!("  {} -> {}", describe(&reading), session.formation_state());
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    let summary = session.stop().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("Duration: {:.2}s", summary.duration_secs);
    println!("Samples: {}", summary.detection.samples);
    println!("Render ticks: {}", summary.ticks);
    println!("Final gesture: {}", describe(&summary.final_gesture));
    println!("Final formation: {}", summary.final_state);
    println!("Max distance to target: {:.4}", summary.max_distance);

    Ok(())
}
