//! Handweave Gesture
//!
//! Turns landmark frames into discrete gestures. Landmark acquisition is
//! external; this crate consumes detector output through the
//! [`LandmarkSource`] trait so live detectors and recorded dumps look the
//! same to the session:
//!
//! - **Replay:** JSONL detector dumps read from disk
//! - **Scripted:** in-memory sample queues for tests and demos
//!
//! [`synthetic`] builds plausible hand poses for demos and tests.
//!
//! Classification is a pure geometric function of one frame. There is no
//! smoothing across frames, so readings near a threshold can flicker from
//! one frame to the next.

pub mod classifier;
pub mod source;
pub mod synthetic;

pub use classifier::{FingerStates, GestureClassifier, GestureUpdate};
pub use source::{LandmarkSource, ReplaySource, ScriptedSource};
