//! Landmark sources: the inbound side of the detector contract.
//!
//! A source yields one [`DetectionSample`] per video frame: either a hand
//! or a no-hand report. The stream is not restartable; once a source is
//! exhausted it stays exhausted.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use handweave_common::error::{HandweaveError, HandweaveResult};
use handweave_model::landmark::DetectionSample;

/// Trait for detector output providers.
pub trait LandmarkSource: Send {
    /// Poll for the next sample. Returns `None` if nothing is available yet.
    fn poll(&mut self) -> HandweaveResult<Option<DetectionSample>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Whether the source will never yield another sample.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Replays a JSONL detector dump, one sample per line.
///
/// Blank lines and `#` comment lines are skipped. A line that fails to
/// parse is reported as an error for that poll only; the next poll
/// continues with the following line. A failed read ends the replay.
pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line_no: usize,
    exhausted: bool,
}

impl ReplaySource {
    /// Open a detector dump for replay.
    pub fn open(path: impl AsRef<Path>) -> HandweaveResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(HandweaveError::FileNotFound { path });
        }
        let file = File::open(&path)?;
        tracing::debug!(path = %path.display(), "Opened replay source");
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path,
            line_no: 0,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LandmarkSource for ReplaySource {
    fn poll(&mut self) -> HandweaveResult<Option<DetectionSample>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let Some(line) = self.lines.next() else {
                self.exhausted = true;
                return Ok(None);
            };
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e.into());
                }
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return serde_json::from_str(trimmed).map(Some).map_err(|e| {
                HandweaveError::source(format!(
                    "{}:{}: invalid sample: {e}",
                    self.path.display(),
                    self.line_no
                ))
            });
        }
    }

    fn name(&self) -> &str {
        "replay"
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// In-memory queue of samples.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: VecDeque<DetectionSample>,
    closed: bool,
}

impl ScriptedSource {
    /// A closed source that yields exactly `samples`.
    pub fn new(samples: impl IntoIterator<Item = DetectionSample>) -> Self {
        Self {
            queue: samples.into_iter().collect(),
            closed: true,
        }
    }

    /// An open source; callers keep pushing until [`close`](Self::close).
    pub fn open() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: DetectionSample) {
        self.queue.push_back(sample);
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl LandmarkSource for ScriptedSource {
    fn poll(&mut self) -> HandweaveResult<Option<DetectionSample>> {
        Ok(self.queue.pop_front())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticHand;
    use handweave_model::landmark::{serialize_samples, SampleKind};

    fn temp_dump(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("handweave_test_source");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_scripted_source_drains_then_exhausts() {
        let mut source = ScriptedSource::new(vec![
            DetectionSample::no_hand(0),
            SyntheticHand::open().sample(10),
        ]);
        assert!(!source.is_exhausted());
        assert_eq!(source.poll().unwrap().unwrap().kind, SampleKind::NoHand);
        assert!(source.poll().unwrap().is_some());
        assert!(source.poll().unwrap().is_none());
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_open_scripted_source_is_not_exhausted_when_empty() {
        let mut source = ScriptedSource::open();
        assert!(source.poll().unwrap().is_none());
        assert!(!source.is_exhausted());
        source.push(DetectionSample::no_hand(0));
        source.close();
        assert_eq!(source.remaining(), 1);
        assert!(!source.is_exhausted());
        source.poll().unwrap();
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_replay_source_reads_dump() {
        let samples = vec![
            SyntheticHand::fist().sample(0),
            DetectionSample::no_hand(33_000_000),
        ];
        let content = format!("# dump\n{}", serialize_samples(&samples).unwrap());
        let path = temp_dump("replay_ok.jsonl", &content);

        let mut source = ReplaySource::open(&path).unwrap();
        assert_eq!(source.poll().unwrap(), Some(samples[0].clone()));
        assert_eq!(source.poll().unwrap(), Some(samples[1].clone()));
        assert_eq!(source.poll().unwrap(), None);
        assert!(source.is_exhausted());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_replay_source_reports_bad_line_and_continues() {
        let content = "{\"t\":0,\"type\":\"no_hand\"}\nnot json\n{\"t\":2,\"type\":\"no_hand\"}\n";
        let path = temp_dump("replay_bad.jsonl", content);

        let mut source = ReplaySource::open(&path).unwrap();
        assert!(source.poll().unwrap().is_some());
        let err = source.poll().unwrap_err();
        assert!(err.to_string().contains(":2:"));
        assert_eq!(source.poll().unwrap().unwrap().timestamp_ns, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_replay_source_read_failure_exhausts() {
        let dir = std::env::temp_dir().join("handweave_test_source_dir");
        std::fs::create_dir_all(&dir).unwrap();

        let mut source = ReplaySource::open(&dir).unwrap();
        assert!(matches!(source.poll(), Err(HandweaveError::Io(_))));
        assert!(source.is_exhausted());
        assert_eq!(source.poll().unwrap(), None);
    }

    #[test]
    fn test_replay_source_missing_file() {
        let result = ReplaySource::open("/nonexistent/handweave/dump.jsonl");
        assert!(matches!(result, Err(HandweaveError::FileNotFound { .. })));
    }
}
