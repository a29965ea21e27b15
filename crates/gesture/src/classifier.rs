//! Geometric gesture classification.
//!
//! # Algorithm
//!
//! Tests run in strict priority order; the first match wins:
//!
//! 1. **Pinch:** planar distance between thumb tip and index tip is below
//!    the pinch threshold. The reading carries their planar midpoint.
//! 2. **Curl test:** a non-thumb finger is *closed* when its tip is strictly
//!    closer to the wrist than its PIP joint (planar distances). This is a
//!    curl proxy, not a joint-angle computation.
//! 3. **Fist:** all four fingers closed.
//! 4. **Open palm:** no finger closed.
//! 5. Anything else is `None`.

use handweave_common::config::ClassifierSettings;
use handweave_common::error::{HandweaveError, HandweaveResult};
use handweave_model::gesture::{Gesture, GestureReading};
use handweave_model::landmark::{Finger, Landmark, LandmarkFrame};
use serde::Serialize;

/// Closed/open state of the four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FingerStates {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn closed_count(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|closed| **closed)
            .count()
    }

    pub fn all_closed(&self) -> bool {
        self.closed_count() == 4
    }

    pub fn all_open(&self) -> bool {
        self.closed_count() == 0
    }
}

/// Result of feeding one frame through [`GestureClassifier::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureUpdate {
    pub reading: GestureReading,
    /// Whether the gesture differs from the previously emitted one.
    pub changed: bool,
}

/// Frame-by-frame gesture classifier.
///
/// The only state is the last emitted reading, used to report changes.
/// It never feeds back into classification.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    pinch_threshold: f64,
    last: GestureReading,
}

impl GestureClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(settings: &ClassifierSettings) -> Self {
        Self {
            pinch_threshold: settings.pinch_threshold,
            last: GestureReading::default(),
        }
    }

    /// Create a classifier with the default pinch threshold (0.05).
    pub fn with_defaults() -> Self {
        Self::new(&ClassifierSettings::default())
    }

    pub fn pinch_threshold(&self) -> f64 {
        self.pinch_threshold
    }

    /// Classify a single frame. Pure: does not touch the last-value register.
    pub fn classify(&self, frame: &LandmarkFrame) -> GestureReading {
        let thumb = frame.thumb_tip();
        let index = frame.index_tip();
        if thumb.planar_distance(index) < self.pinch_threshold {
            return GestureReading::pinch(thumb.planar_midpoint(index));
        }

        let fingers = Self::finger_states(frame);
        if fingers.all_closed() {
            GestureReading::plain(Gesture::Fist)
        } else if fingers.all_open() {
            GestureReading::plain(Gesture::OpenPalm)
        } else {
            GestureReading::plain(Gesture::None)
        }
    }

    /// Classify raw detector points, rejecting frames of the wrong length.
    pub fn classify_points(&self, points: &[Landmark]) -> HandweaveResult<GestureReading> {
        let frame = LandmarkFrame::from_points(points)
            .map_err(|e| HandweaveError::malformed_frame(e.to_string()))?;
        Ok(self.classify(&frame))
    }

    /// Classify a frame and record the reading as the last emitted value.
    pub fn update(&mut self, frame: &LandmarkFrame) -> GestureUpdate {
        let reading = self.classify(frame);
        let changed = reading.gesture != self.last.gesture;
        if changed {
            tracing::debug!(
                from = %self.last.gesture,
                to = %reading.gesture,
                "Gesture changed"
            );
        }
        self.last = reading;
        GestureUpdate { reading, changed }
    }

    /// The last emitted reading. Stays put across skipped cycles.
    pub fn last(&self) -> GestureReading {
        self.last
    }

    /// Per-finger curl state for a frame.
    pub fn finger_states(frame: &LandmarkFrame) -> FingerStates {
        let closed = |finger: Finger| {
            let wrist = frame.wrist();
            frame.get(finger.tip()).planar_distance(wrist)
                < frame.get(finger.pip()).planar_distance(wrist)
        };
        FingerStates {
            index: closed(Finger::Index),
            middle: closed(Finger::Middle),
            ring: closed(Finger::Ring),
            pinky: closed(Finger::Pinky),
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{FingerPose, SyntheticHand};

    #[test]
    fn test_open_palm() {
        let classifier = GestureClassifier::with_defaults();
        let reading = classifier.classify(&SyntheticHand::open().frame());
        assert_eq!(reading, GestureReading::plain(Gesture::OpenPalm));
    }

    #[test]
    fn test_fist() {
        let classifier = GestureClassifier::with_defaults();
        let reading = classifier.classify(&SyntheticHand::fist().frame());
        assert_eq!(reading.gesture, Gesture::Fist);
        assert!(reading.pinch_center.is_none());
    }

    #[test]
    fn test_partial_curl_is_none() {
        let classifier = GestureClassifier::with_defaults();
        let frame = SyntheticHand::open()
            .with_finger(Finger::Ring, FingerPose::Curled)
            .with_finger(Finger::Pinky, FingerPose::Curled)
            .frame();
        let states = GestureClassifier::finger_states(&frame);
        assert_eq!(states.closed_count(), 2);
        assert_eq!(classifier.classify(&frame).gesture, Gesture::None);
    }

    #[test]
    fn test_pinch_scenario_midpoint() {
        let classifier = GestureClassifier::with_defaults();
        let frame = SyntheticHand::open()
            .with_thumb_tip(0.50, 0.50)
            .with_index_tip(0.51, 0.50)
            .frame();
        let reading = classifier.classify(&frame);
        assert_eq!(reading.gesture, Gesture::Pinch);
        let center = reading.pinch_center.unwrap();
        assert!((center.x - 0.505).abs() < 1e-9);
        assert!((center.y - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_beats_fist() {
        let classifier = GestureClassifier::with_defaults();
        let fist = SyntheticHand::fist().frame();
        let index_tip = *fist.index_tip();
        let frame = SyntheticHand::fist()
            .with_thumb_tip(index_tip.x + 0.02, index_tip.y)
            .frame();
        assert!(GestureClassifier::finger_states(&frame).all_closed());
        assert_eq!(classifier.classify(&frame).gesture, Gesture::Pinch);
    }

    #[test]
    fn test_threshold_is_strict() {
        let classifier = GestureClassifier::with_defaults();
        // Exactly 0.0625 apart, above threshold.
        let frame = SyntheticHand::open()
            .with_thumb_tip(0.30, 0.40)
            .with_index_tip(0.3625, 0.40)
            .frame();
        assert_eq!(classifier.classify(&frame).gesture, Gesture::OpenPalm);
    }

    #[test]
    fn test_classify_points_rejects_short_frame() {
        let classifier = GestureClassifier::with_defaults();
        let mut points = SyntheticHand::open().points();
        points.truncate(20);
        let err = classifier.classify_points(&points).unwrap_err();
        assert!(matches!(err, HandweaveError::MalformedFrame { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_update_reports_changes_only() {
        let mut classifier = GestureClassifier::with_defaults();
        let open = SyntheticHand::open().frame();
        let fist = SyntheticHand::fist().frame();

        assert!(classifier.update(&open).changed);
        assert!(!classifier.update(&open).changed);
        assert!(classifier.update(&fist).changed);
        assert_eq!(classifier.last().gesture, Gesture::Fist);
    }

    #[test]
    fn test_classify_does_not_touch_register() {
        let mut classifier = GestureClassifier::with_defaults();
        classifier.update(&SyntheticHand::fist().frame());
        classifier.classify(&SyntheticHand::open().frame());
        assert_eq!(classifier.last().gesture, Gesture::Fist);
    }

    #[test]
    fn test_custom_threshold() {
        let classifier = GestureClassifier::new(&ClassifierSettings {
            pinch_threshold: 0.2,
        });
        let frame = SyntheticHand::open()
            .with_thumb_tip(0.40, 0.40)
            .with_index_tip(0.55, 0.40)
            .frame();
        assert_eq!(classifier.classify(&frame).gesture, Gesture::Pinch);
    }
}
