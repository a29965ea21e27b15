//! Synthetic hand poses.
//!
//! Builds anatomically plausible 21-point frames around a wrist anchor so
//! demos and tests can produce open palms, fists, and pinches without a
//! detector. Offsets are in normalized image units with +y pointing down,
//! so extended fingers have smaller y than the wrist.

use handweave_model::landmark::{index, DetectionSample, Finger, Landmark, LandmarkFrame};
use handweave_model::landmark::{TimestampNs, LANDMARK_COUNT};
use handweave_model::Gesture;

/// Whether a synthetic finger is stretched out or curled into the palm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerPose {
    Extended,
    Curled,
}

/// Column offset of each finger from the wrist.
fn column(finger: Finger) -> f64 {
    match finger {
        Finger::Index => -0.06,
        Finger::Middle => 0.0,
        Finger::Ring => 0.06,
        Finger::Pinky => 0.12,
    }
}

/// `(mcp, pip, dip, tip)` vertical offsets from the wrist.
fn joint_heights(pose: FingerPose) -> [f64; 4] {
    match pose {
        FingerPose::Extended => [-0.20, -0.30, -0.38, -0.45],
        FingerPose::Curled => [-0.20, -0.28, -0.22, -0.16],
    }
}

const OPEN_THUMB_TIP: (f64, f64) = (-0.17, -0.26);
const FIST_THUMB_TIP: (f64, f64) = (-0.14, -0.12);

/// Builder for a synthetic hand frame.
#[derive(Debug, Clone)]
pub struct SyntheticHand {
    wrist: (f64, f64),
    fingers: [FingerPose; 4],
    thumb_tip: Option<(f64, f64)>,
    index_tip: Option<(f64, f64)>,
    fist_thumb: bool,
}

impl SyntheticHand {
    /// All four fingers extended, thumb splayed, wrist at (0.5, 0.9).
    pub fn open() -> Self {
        Self {
            wrist: (0.5, 0.9),
            fingers: [FingerPose::Extended; 4],
            thumb_tip: None,
            index_tip: None,
            fist_thumb: false,
        }
    }

    /// All four fingers curled, thumb tucked clear of the index tip.
    pub fn fist() -> Self {
        Self {
            fingers: [FingerPose::Curled; 4],
            fist_thumb: true,
            ..Self::open()
        }
    }

    /// Open hand pinching at `(x, y)`: thumb and index tips 0.01 apart.
    pub fn pinch_at(x: f64, y: f64) -> Self {
        Self::open()
            .with_thumb_tip(x - 0.005, y)
            .with_index_tip(x + 0.005, y)
    }

    /// Representative pose for a gesture.
    pub fn for_gesture(gesture: Gesture) -> Self {
        match gesture {
            Gesture::OpenPalm => Self::open(),
            Gesture::Fist => Self::fist(),
            Gesture::Pinch => Self::pinch_at(0.45, 0.5),
            Gesture::None => Self::open()
                .with_finger(Finger::Ring, FingerPose::Curled)
                .with_finger(Finger::Pinky, FingerPose::Curled),
        }
    }

    pub fn with_wrist(mut self, x: f64, y: f64) -> Self {
        self.wrist = (x, y);
        self
    }

    pub fn with_finger(mut self, finger: Finger, pose: FingerPose) -> Self {
        self.fingers[slot(finger)] = pose;
        self
    }

    /// Absolute thumb tip position.
    pub fn with_thumb_tip(mut self, x: f64, y: f64) -> Self {
        self.thumb_tip = Some((x, y));
        self
    }

    /// Absolute index tip position, overriding the finger pose for the tip.
    pub fn with_index_tip(mut self, x: f64, y: f64) -> Self {
        self.index_tip = Some((x, y));
        self
    }

    pub fn points(&self) -> Vec<Landmark> {
        self.landmarks().to_vec()
    }

    pub fn frame(&self) -> LandmarkFrame {
        LandmarkFrame::new(self.landmarks())
    }

    pub fn sample(&self, timestamp_ns: TimestampNs) -> DetectionSample {
        DetectionSample::hand(timestamp_ns, self.points())
    }

    fn landmarks(&self) -> [Landmark; LANDMARK_COUNT] {
        let (wx, wy) = self.wrist;
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[index::WRIST] = Landmark::new(wx, wy, 0.0);

        let (tx, ty) = self.thumb_tip.unwrap_or_else(|| {
            let (dx, dy) = if self.fist_thumb {
                FIST_THUMB_TIP
            } else {
                OPEN_THUMB_TIP
            };
            (wx + dx, wy + dy)
        });
        let thumb = [
            index::THUMB_CMC,
            index::THUMB_MCP,
            index::THUMB_IP,
            index::THUMB_TIP,
        ];
        for (i, idx) in thumb.iter().enumerate() {
            let t = (i + 1) as f64 / thumb.len() as f64;
            points[*idx] = Landmark::new(wx + (tx - wx) * t, wy + (ty - wy) * t, 0.0);
        }

        for finger in Finger::ALL {
            let x = wx + column(finger);
            let [mcp, pip, dip, tip] = joint_heights(self.fingers[slot(finger)]);
            let base = finger.pip() - 1;
            points[base] = Landmark::new(x, wy + mcp, 0.0);
            points[base + 1] = Landmark::new(x, wy + pip, 0.0);
            points[base + 2] = Landmark::new(x, wy + dip, 0.0);
            points[base + 3] = Landmark::new(x, wy + tip, 0.0);
        }

        if let Some((x, y)) = self.index_tip {
            points[index::INDEX_TIP] = Landmark::new(x, y, 0.0);
        }

        points
    }
}

fn slot(finger: Finger) -> usize {
    match finger {
        Finger::Index => 0,
        Finger::Middle => 1,
        Finger::Ring => 2,
        Finger::Pinky => 3,
    }
}

/// A detector dump that holds each gesture for `frames_per_step` frames.
///
/// `None` entries in `script` become no-hand samples.
pub fn scripted_samples(
    script: &[Option<Gesture>],
    frames_per_step: usize,
    frame_interval_ns: u64,
) -> Vec<DetectionSample> {
    let mut samples = Vec::with_capacity(script.len() * frames_per_step);
    let mut t = 0u64;
    for step in script {
        for _ in 0..frames_per_step {
            samples.push(match step {
                Some(gesture) => SyntheticHand::for_gesture(*gesture).sample(t),
                None => DetectionSample::no_hand(t),
            });
            t += frame_interval_ns;
        }
    }
    samples
}
