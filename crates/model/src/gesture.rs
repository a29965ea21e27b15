//! Discrete gesture vocabulary.

use serde::{Deserialize, Serialize};

use crate::spatial::Point2D;

/// The gesture recognized for a single detection cycle.
///
/// Exactly one value is active at a time; there are no compound gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Ambiguous or transitional pose.
    #[default]
    None,
    /// All four non-thumb fingers extended.
    OpenPalm,
    /// All four non-thumb fingers curled.
    Fist,
    /// Thumb tip and index tip close together.
    Pinch,
}

impl Gesture {
    /// Stable label for display and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OpenPalm => "open_palm",
            Self::Fist => "fist",
            Self::Pinch => "pinch",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output: the gesture plus the pinch center while pinching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureReading {
    pub gesture: Gesture,

    /// Planar midpoint of thumb tip and index tip. Present only for `Pinch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinch_center: Option<Point2D>,
}

impl GestureReading {
    /// A reading with no auxiliary point.
    pub fn plain(gesture: Gesture) -> Self {
        debug_assert!(gesture != Gesture::Pinch, "pinch readings carry a center");
        Self {
            gesture,
            pinch_center: None,
        }
    }

    pub fn pinch(center: Point2D) -> Self {
        Self {
            gesture: Gesture::Pinch,
            pinch_center: Some(center),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        let reading = GestureReading::default();
        assert_eq!(reading.gesture, Gesture::None);
        assert!(reading.pinch_center.is_none());
    }

    #[test]
    fn test_reading_json_omits_absent_center() {
        let json = serde_json::to_string(&GestureReading::plain(Gesture::Fist)).unwrap();
        assert_eq!(json, "{\"gesture\":\"fist\"}");

        let json = serde_json::to_string(&GestureReading::pinch(Point2D::new(0.5, 0.25))).unwrap();
        assert!(json.contains("\"gesture\":\"pinch\""));
        assert!(json.contains("\"pinch_center\":{\"x\":0.5,\"y\":0.25}"));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Gesture::OpenPalm.to_string(), "open_palm");
        assert_eq!(Gesture::Pinch.as_str(), "pinch");
    }
}
