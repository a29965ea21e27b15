//! Gesture-driven formation state machine.
//!
//! | Gesture    | State       | Formation | Rotation              |
//! |------------|-------------|-----------|-----------------------|
//! | `OpenPalm` | `Scattered` | Scatter   | random per object     |
//! | `Fist`     | `Clustered` | Tree      | face reference point  |
//! | `Pinch`    | `Focused`   | Focus     | face reference point  |
//! | `None`     | unchanged   | unchanged | unchanged             |
//!
//! Every accepted transition builds a complete new [`TargetSet`] and swaps
//! it in as one `Arc`, so readers never see a half-written set.

use std::f64::consts::PI;
use std::sync::Arc;

use handweave_model::gesture::Gesture;
use handweave_model::spatial::{Euler, FormationKind, Pose, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::formation::FormationCatalog;

/// Which layout the population is currently assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationState {
    /// Session start; Scatter positions, no gesture seen yet.
    Idle,
    Scattered,
    Clustered,
    Focused,
}

impl FormationState {
    /// Target state for a gesture. `None` for gestures that do not transition.
    pub fn for_gesture(gesture: Gesture) -> Option<Self> {
        match gesture {
            Gesture::OpenPalm => Some(Self::Scattered),
            Gesture::Fist => Some(Self::Clustered),
            Gesture::Pinch => Some(Self::Focused),
            Gesture::None => None,
        }
    }

    pub fn formation_kind(&self) -> FormationKind {
        match self {
            Self::Idle | Self::Scattered => FormationKind::Scatter,
            Self::Clustered => FormationKind::Tree,
            Self::Focused => FormationKind::Focus,
        }
    }

    /// Whether objects orient toward the reference point in this state.
    pub fn looks_at_reference(&self) -> bool {
        matches!(self, Self::Clustered | Self::Focused)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scattered => "scattered",
            Self::Clustered => "clustered",
            Self::Focused => "focused",
        }
    }
}

impl std::fmt::Display for FormationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-object target poses for one transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSet {
    pub positions: Vec<Vec3>,
    pub rotations: Vec<Euler>,
    /// Bumped on every accepted transition; 0 for the initial set.
    pub generation: u64,
    pub state: FormationState,
}

impl TargetSet {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn pose(&self, i: usize) -> Option<Pose> {
        Some(Pose {
            position: *self.positions.get(i)?,
            rotation: *self.rotations.get(i)?,
        })
    }
}

/// Maps gesture changes onto target reassignments.
pub struct FormationController {
    catalog: Arc<FormationCatalog>,
    look_at: Vec3,
    rng: StdRng,
    targets: Arc<TargetSet>,
}

impl FormationController {
    /// Start in `Idle` on the Scatter layout with random rotations.
    pub fn new(catalog: Arc<FormationCatalog>, look_at: Vec3) -> Self {
        Self::with_rng(catalog, look_at, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a caller-supplied RNG for rotations.
    pub fn with_rng(catalog: Arc<FormationCatalog>, look_at: Vec3, mut rng: StdRng) -> Self {
        let targets = Arc::new(build_targets(
            &catalog,
            FormationState::Idle,
            look_at,
            &mut rng,
            0,
        ));
        Self {
            catalog,
            look_at,
            rng,
            targets,
        }
    }

    pub fn with_seed(catalog: Arc<FormationCatalog>, look_at: Vec3, seed: u64) -> Self {
        Self::with_rng(catalog, look_at, StdRng::seed_from_u64(seed))
    }

    /// Apply a gesture. Returns the new target set if a transition happened.
    ///
    /// `None` and repeats of the current state's gesture are no-ops.
    pub fn on_gesture_changed(&mut self, gesture: Gesture) -> Option<Arc<TargetSet>> {
        let next = FormationState::for_gesture(gesture)?;
        let current = self.targets.state;
        if next == current {
            return None;
        }

        let generation = self.targets.generation + 1;
        let targets = Arc::new(build_targets(
            &self.catalog,
            next,
            self.look_at,
            &mut self.rng,
            generation,
        ));
        tracing::debug!(
            from = %current,
            to = %next,
            generation,
            "Formation transition"
        );
        self.targets = Arc::clone(&targets);
        Some(targets)
    }

    pub fn state(&self) -> FormationState {
        self.targets.state
    }

    pub fn targets(&self) -> Arc<TargetSet> {
        Arc::clone(&self.targets)
    }

    pub fn catalog(&self) -> &FormationCatalog {
        &self.catalog
    }

    pub fn look_at_point(&self) -> Vec3 {
        self.look_at
    }
}

fn build_targets(
    catalog: &FormationCatalog,
    state: FormationState,
    look_at: Vec3,
    rng: &mut StdRng,
    generation: u64,
) -> TargetSet {
    let positions = catalog.get(state.formation_kind()).positions().to_vec();
    let rotations = if state.looks_at_reference() {
        positions
            .iter()
            .map(|p| Euler::look_at(p, &look_at))
            .collect()
    } else {
        positions.iter().map(|_| random_rotation(rng)).collect()
    };
    TargetSet {
        positions,
        rotations,
        generation,
        state,
    }
}

/// Uniform angles in `[0, pi)` per axis.
fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Euler {
    Euler::new(
        rng.gen_range(0.0..PI),
        rng.gen_range(0.0..PI),
        rng.gen_range(0.0..PI),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use handweave_common::config::FormationSettings;

    fn controller() -> FormationController {
        let mut rng = StdRng::seed_from_u64(1);
        let catalog =
            FormationCatalog::generate_with_rng(&FormationSettings::default(), &mut rng).unwrap();
        FormationController::with_seed(Arc::new(catalog), Vec3::new(0.0, 0.0, 3000.0), 2)
    }

    #[test]
    fn test_initial_state_is_idle_scatter() {
        let c = controller();
        let targets = c.targets();
        assert_eq!(c.state(), FormationState::Idle);
        assert_eq!(targets.generation, 0);
        assert_eq!(
            targets.positions,
            c.catalog().get(FormationKind::Scatter).positions()
        );
    }

    #[test]
    fn test_first_open_palm_is_a_transition() {
        let mut c = controller();
        let targets = c.on_gesture_changed(Gesture::OpenPalm).unwrap();
        assert_eq!(targets.state, FormationState::Scattered);
        assert_eq!(targets.generation, 1);
    }

    #[test]
    fn test_none_is_noop() {
        let mut c = controller();
        c.on_gesture_changed(Gesture::Fist);
        let before = c.targets();
        assert!(c.on_gesture_changed(Gesture::None).is_none());
        assert!(Arc::ptr_eq(&before, &c.targets()));
    }

    #[test]
    fn test_repeat_gesture_is_noop() {
        let mut c = controller();
        c.on_gesture_changed(Gesture::OpenPalm);
        let before = c.targets();
        assert!(c.on_gesture_changed(Gesture::OpenPalm).is_none());
        assert!(Arc::ptr_eq(&before, &c.targets()));
    }

    #[test]
    fn test_fist_faces_reference_point() {
        let mut c = controller();
        let targets = c.on_gesture_changed(Gesture::Fist).unwrap();
        let reference = c.look_at_point();
        for i in 0..targets.len() {
            let pose = targets.pose(i).unwrap();
            let Some(expected) = (reference - pose.position).normalized() else {
                continue;
            };
            assert!(pose.rotation.forward().distance_to(&expected) < 1e-9);
        }
    }

    #[test]
    fn test_scatter_rotations_are_random() {
        let mut c = controller();
        let a = c.on_gesture_changed(Gesture::OpenPalm).unwrap();
        c.on_gesture_changed(Gesture::Fist);
        let b = c.on_gesture_changed(Gesture::OpenPalm).unwrap();
        assert_eq!(a.positions, b.positions);
        assert_ne!(a.rotations, b.rotations);
        for r in &a.rotations {
            for angle in [r.x, r.y, r.z] {
                assert!((0.0..PI).contains(&angle));
            }
        }
    }

    #[test]
    fn test_pose_out_of_range() {
        assert!(controller().targets().pose(50).is_none());
    }
}
