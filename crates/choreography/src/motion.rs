//! Per-tick exponential smoothing of object and camera poses.
//!
//! Each tick moves every object a fixed fraction `alpha` of the remaining
//! way to its target, per axis:
//!
//! ```text
//! current <- current + (target - current) * alpha
//! ```
//!
//! After `k` ticks the remaining distance is exactly `(1 - alpha)^k` of the
//! initial distance, so motion never overshoots and settles without a snap.
//! Rotations use the same per-axis rule with no shortest-arc correction;
//! an angular delta above pi is traversed the long way around.
//!
//! The camera is smoothed separately toward a drifting target
//! `rest + (sin(t) * A, cos(t) * A, 0)` and always looks at the origin.

use handweave_common::config::MotionSettings;
use handweave_model::spatial::{Euler, Pose, Vec3};
use serde::Serialize;

use crate::controller::TargetSet;

/// Camera position plus the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// Rendered pose of one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectPose {
    pub index: usize,
    pub position: Vec3,
    pub rotation: Euler,
}

/// Everything the renderer needs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub tick: u64,
    pub objects: Vec<ObjectPose>,
    pub camera: CameraState,
}

/// Owns the current poses and advances them once per tick.
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    poses: Vec<Pose>,
    camera: CameraState,
    object_alpha: f64,
    camera_alpha: f64,
    drift_amplitude: f64,
    camera_rest: Vec3,
    ticks: u64,
}

impl MotionIntegrator {
    /// Objects start exactly on `initial`; the camera starts at rest.
    pub fn new(initial: &TargetSet, settings: &MotionSettings) -> Self {
        let poses = initial
            .positions
            .iter()
            .zip(&initial.rotations)
            .map(|(position, rotation)| Pose {
                position: *position,
                rotation: *rotation,
            })
            .collect();
        let camera_rest = Vec3::from_array(settings.camera_rest);
        Self {
            poses,
            camera: CameraState {
                position: camera_rest,
                look_at: Vec3::ZERO,
            },
            object_alpha: settings.object_smoothing,
            camera_alpha: settings.camera_smoothing,
            drift_amplitude: settings.camera_drift_amplitude,
            camera_rest,
            ticks: 0,
        }
    }

    /// Advance one tick toward `targets`. `elapsed_secs` is the drift phase.
    pub fn tick(&mut self, targets: &TargetSet, elapsed_secs: f64) {
        let alpha = self.object_alpha;
        for ((pose, target_pos), target_rot) in self
            .poses
            .iter_mut()
            .zip(&targets.positions)
            .zip(&targets.rotations)
        {
            pose.position = pose.position.approach(target_pos, alpha);
            pose.rotation = pose.rotation.approach(target_rot, alpha);
        }

        let drift = self.camera_drift_target(elapsed_secs);
        self.camera.position = self.camera.position.approach(&drift, self.camera_alpha);
        self.camera.look_at = Vec3::ZERO;

        self.ticks += 1;
        tracing::trace!(tick = self.ticks, generation = targets.generation, "Motion tick");
    }

    /// Where the camera is heading at phase `t`.
    pub fn camera_drift_target(&self, t: f64) -> Vec3 {
        self.camera_rest
            + Vec3::new(
                t.sin() * self.drift_amplitude,
                t.cos() * self.drift_amplitude,
                0.0,
            )
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Largest object position distance to its target.
    pub fn max_distance_to(&self, targets: &TargetSet) -> f64 {
        self.poses
            .iter()
            .zip(&targets.positions)
            .map(|(pose, target)| pose.position.distance_to(target))
            .fold(0.0, f64::max)
    }

    /// Largest per-axis rotation difference to the targets.
    pub fn max_rotation_delta_to(&self, targets: &TargetSet) -> f64 {
        self.poses
            .iter()
            .zip(&targets.rotations)
            .map(|(pose, target)| pose.rotation.max_axis_delta(target))
            .fold(0.0, f64::max)
    }

    pub fn snapshot(&self) -> RenderFrame {
        RenderFrame {
            tick: self.ticks,
            objects: self
                .poses
                .iter()
                .enumerate()
                .map(|(index, pose)| ObjectPose {
                    index,
                    position: pose.position,
                    rotation: pose.rotation,
                })
                .collect(),
            camera: self.camera,
        }
    }
}
