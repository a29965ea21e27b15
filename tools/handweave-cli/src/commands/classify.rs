//! Classify every sample in a detector dump.

use std::path::PathBuf;

use anyhow::Context;
use handweave_common::config::AppConfig;
use handweave_gesture::{GestureClassifier, LandmarkSource, ReplaySource};
use serde_json::json;

pub fn run(config: &AppConfig, file: PathBuf) -> anyhow::Result<()> {
    let mut source = ReplaySource::open(&file)
        .with_context(|| format!("Failed to open detector dump {}", file.display()))?;
    let mut classifier = GestureClassifier::new(&config.classifier);

    loop {
        let sample = match source.poll() {
            Ok(Some(sample)) => sample,
            Ok(None) => break,
            Err(e) => {
                eprintln!("skipping: {e}");
                continue;
            }
        };

        let line = match sample.landmark_frame() {
            None => json!({ "t": sample.timestamp_ns, "skipped": "no_hand" }),
            Some(Err(e)) => json!({
                "t": sample.timestamp_ns,
                "skipped": "malformed",
                "error": e.to_string(),
            }),
            Some(Ok(frame)) => {
                let update = classifier.update(&frame);
                json!({
                    "t": sample.timestamp_ns,
                    "gesture": update.reading.gesture,
                    "pinch_center": update.reading.pinch_center,
                    "changed": update.changed,
                    "fingers": GestureClassifier::finger_states(&frame),
                })
            }
        };
        println!("{line}");
    }

    Ok(())
}
