//! Hand landmark frames as delivered by the external detector.
//!
//! A frame is a fixed-length, ordered list of 21 normalized 3D points with
//! MediaPipe-style semantic indices. Detector output is recorded one sample
//! per line in JSONL form; a sample either carries a hand or reports that
//! no hand was seen for that video frame.

use serde::{Deserialize, Serialize};

use crate::spatial::Point2D;

/// Number of landmarks in a hand frame.
pub const LANDMARK_COUNT: usize = 21;

/// Semantic landmark indices.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A single tracked point on the hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate.
    pub x: f64,
    /// Normalized Y coordinate.
    pub y: f64,
    /// Depth relative to the wrist.
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance on the image plane (z ignored).
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        self.planar().distance_to(&other.planar())
    }

    /// Projection onto the image plane.
    pub fn planar(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Planar midpoint between two landmarks.
    pub fn planar_midpoint(&self, other: &Landmark) -> Point2D {
        Point2D::lerp(&self.planar(), &other.planar(), 0.5)
    }
}

/// The four non-thumb fingers used by the curl test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Landmark index of the fingertip.
    pub fn tip(self) -> usize {
        match self {
            Finger::Index => index::INDEX_TIP,
            Finger::Middle => index::MIDDLE_TIP,
            Finger::Ring => index::RING_TIP,
            Finger::Pinky => index::PINKY_TIP,
        }
    }

    /// Landmark index of the proximal interphalangeal joint.
    pub fn pip(self) -> usize {
        match self {
            Finger::Index => index::INDEX_PIP,
            Finger::Middle => index::MIDDLE_PIP,
            Finger::Ring => index::RING_PIP,
            Finger::Pinky => index::PINKY_PIP,
        }
    }
}

/// Immutable snapshot of one hand for one video frame.
///
/// Always holds exactly [`LANDMARK_COUNT`] points; malformed detector output
/// is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build a frame from an arbitrary slice, failing on a wrong count.
    pub fn from_points(points: &[Landmark]) -> Result<Self, FrameError> {
        let points: [Landmark; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| FrameError::WrongLandmarkCount {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;
        Ok(Self { points })
    }

    /// Landmark at a semantic index (see [`index`]).
    pub fn get(&self, idx: usize) -> &Landmark {
        &self.points[idx]
    }

    pub fn wrist(&self) -> &Landmark {
        &self.points[index::WRIST]
    }

    pub fn thumb_tip(&self) -> &Landmark {
        &self.points[index::THUMB_TIP]
    }

    pub fn index_tip(&self) -> &Landmark {
        &self.points[index::INDEX_TIP]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = FrameError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_points(&points)
    }
}

/// Errors raised while building frames from detector output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongLandmarkCount { expected: usize, actual: usize },
}

/// Nanoseconds since the detector stream started.
pub type TimestampNs = u64;

/// One detection cycle's worth of detector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSample {
    /// Detector timestamp.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(flatten)]
    pub kind: SampleKind,
}

/// Payload of a detection sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SampleKind {
    /// A hand was tracked. The point list is validated later, not here.
    Hand { landmarks: Vec<Landmark> },
    /// The detector saw no hand this frame.
    NoHand,
}

impl DetectionSample {
    pub fn hand(timestamp_ns: TimestampNs, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ns,
            kind: SampleKind::Hand { landmarks },
        }
    }

    pub fn frame(timestamp_ns: TimestampNs, frame: &LandmarkFrame) -> Self {
        Self::hand(timestamp_ns, frame.points().to_vec())
    }

    pub fn no_hand(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            kind: SampleKind::NoHand,
        }
    }

    /// Timestamp as fractional seconds.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }

    /// Validated frame for hand samples.
    ///
    /// Returns `None` for no-hand samples and an error for hand samples
    /// with the wrong number of points.
    pub fn landmark_frame(&self) -> Option<Result<LandmarkFrame, FrameError>> {
        match &self.kind {
            SampleKind::Hand { landmarks } => Some(LandmarkFrame::from_points(landmarks)),
            SampleKind::NoHand => None,
        }
    }
}

/// Parse detection samples from JSONL content (one JSON object per line).
pub fn parse_samples(jsonl: &str) -> Result<Vec<DetectionSample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize detection samples to JSONL format.
pub fn serialize_samples(samples: &[DetectionSample]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for sample in samples {
        output.push_str(&serde_json::to_string(sample)?);
        output.push('\n');
    }
    Ok(output)
}
