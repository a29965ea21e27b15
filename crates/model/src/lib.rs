//! Handweave Model
//!
//! Defines the core data contracts shared by the classifier and the
//! choreography engine:
//! - **Landmarks:** 21-point hand frames as delivered by an external detector
//! - **Gestures:** the discrete gesture vocabulary and its readings
//! - **Spatial:** vectors, Euler rotations, and formation names
//!
//! Landmark coordinates are normalized to the camera frame (`[0.0, 1.0]`
//! on x/y, z relative depth). Spatial coordinates are scene units.

pub mod gesture;
pub mod landmark;
pub mod spatial;

pub use gesture::*;
pub use landmark::*;
pub use spatial::*;
