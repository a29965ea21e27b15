//! Handweave Choreography: formations and motion
//!
//! Drives a fixed population of objects between named formations:
//! - **Catalog:** three precomputed target layouts (scatter, tree, focus)
//! - **Controller:** gesture-driven state machine that publishes target poses
//! - **Motion:** per-tick exponential smoothing of object and camera pose
//!
//! This crate is pure computation with no I/O or timers.
//! All inputs are data; all outputs are data.

pub mod controller;
pub mod formation;
pub mod motion;

pub use controller::{FormationController, FormationState, TargetSet};
pub use formation::{Formation, FormationCatalog};
pub use motion::{CameraState, MotionIntegrator, ObjectPose, RenderFrame};
