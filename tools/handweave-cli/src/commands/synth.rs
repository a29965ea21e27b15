//! Write a synthetic detector dump from a gesture script.

use std::path::PathBuf;

use anyhow::{bail, Context};
use handweave_gesture::synthetic::scripted_samples;
use handweave_model::gesture::Gesture;
use handweave_model::landmark::serialize_samples;

/// `None` marks a no-hand step.
fn parse_step(step: &str) -> anyhow::Result<Option<Gesture>> {
    Ok(match step.trim().to_ascii_lowercase().as_str() {
        "open_palm" | "open" | "palm" => Some(Gesture::OpenPalm),
        "fist" => Some(Gesture::Fist),
        "pinch" => Some(Gesture::Pinch),
        "none" => Some(Gesture::None),
        "no_hand" | "-" => None,
        other => bail!("unknown step '{other}' (expected open_palm|fist|pinch|none|no_hand)"),
    })
}

pub fn run(
    script: &str,
    frames_per_step: usize,
    fps: u32,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let steps = script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_step)
        .collect::<anyhow::Result<Vec<_>>>()?;
    if steps.is_empty() {
        bail!("script is empty");
    }

    let interval_ns = 1_000_000_000 / u64::from(fps.max(1));
    let samples = scripted_samples(&steps, frames_per_step, interval_ns);
    let jsonl = serialize_samples(&samples)?;

    match output {
        Some(path) => {
            std::fs::write(&path, jsonl)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} samples to {}", samples.len(), path.display());
        }
        None => print!("{jsonl}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step() {
        assert_eq!(parse_step(" Fist ").unwrap(), Some(Gesture::Fist));
        assert_eq!(parse_step("no_hand").unwrap(), None);
        assert!(parse_step("wave").is_err());
    }
}
