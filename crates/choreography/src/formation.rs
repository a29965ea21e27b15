//! Formation generators and the immutable catalog built from them.
//!
//! # Layouts
//!
//! For `N` objects and slot index `i`:
//!
//! * **Scatter:** independent uniform samples in the cube
//!   `[-h, h]^3` (`h = 2000` by default). Not seeded; regenerating
//!   yields a different set.
//! * **Tree:** `phi = acos(-1 + 2i/N)`, `theta = sqrt(N * pi) * phi`,
//!   position `(r cos(theta) sin(phi), i * step + offset, r sin(theta) sin(phi))`
//!   with `r = 800`, `step = 20`, `offset = -500`.
//! * **Focus:** `theta = i * 0.175 + pi`, row `floor(i / 10)`, position
//!   `(R cos(theta), top - row * 180, R sin(theta))` with `R = 1200`, `top = 400`.
//!
//! Slot `i` of every formation always belongs to object `i`.

use std::f64::consts::PI;
use std::ops::Index;

use handweave_common::config::FormationSettings;
use handweave_common::error::{HandweaveError, HandweaveResult};
use handweave_model::spatial::{FormationKind, Vec3};
use rand::Rng;
use serde::Serialize;

/// A named, ordered set of target positions, one per object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formation {
    kind: FormationKind,
    positions: Vec<Vec3>,
}

impl Formation {
    pub fn kind(&self) -> FormationKind {
        self.kind
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Index<usize> for Formation {
    type Output = Vec3;

    fn index(&self, i: usize) -> &Vec3 {
        &self.positions[i]
    }
}

/// Uniform random positions inside the scatter cube.
pub fn scatter_positions<R: Rng + ?Sized>(
    count: usize,
    settings: &FormationSettings,
    rng: &mut R,
) -> Vec<Vec3> {
    let h = settings.scatter_half_extent.abs();
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-h..=h),
                rng.gen_range(-h..=h),
                rng.gen_range(-h..=h),
            )
        })
        .collect()
}

/// Spiral shell around the vertical axis, stacked linearly by index.
pub fn tree_positions(count: usize, settings: &FormationSettings) -> Vec<Vec3> {
    let n = count as f64;
    let twist = (n * PI).sqrt();
    (0..count)
        .map(|i| {
            let i = i as f64;
            let phi = (-1.0 + 2.0 * i / n).acos();
            let theta = twist * phi;
            Vec3::new(
                settings.tree_radius * theta.cos() * phi.sin(),
                i * settings.tree_vertical_step + settings.tree_vertical_offset,
                settings.tree_radius * theta.sin() * phi.sin(),
            )
        })
        .collect()
}

/// Row-major cylindrical arc grid.
pub fn focus_positions(count: usize, settings: &FormationSettings) -> Vec<Vec3> {
    let columns = settings.focus_columns.max(1);
    (0..count)
        .map(|i| {
            let theta = i as f64 * settings.focus_angle_step + PI;
            let row = (i / columns) as f64;
            Vec3::new(
                settings.focus_radius * theta.cos(),
                settings.focus_top - row * settings.focus_row_spacing,
                settings.focus_radius * theta.sin(),
            )
        })
        .collect()
}

/// The three formations for one session, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct FormationCatalog {
    scatter: Formation,
    tree: Formation,
    focus: Formation,
}

impl FormationCatalog {
    /// Generate all formations using thread-local randomness for scatter.
    pub fn generate(settings: &FormationSettings) -> HandweaveResult<Self> {
        Self::generate_with_rng(settings, &mut rand::thread_rng())
    }

    /// Generate all formations with a caller-supplied RNG.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        settings: &FormationSettings,
        rng: &mut R,
    ) -> HandweaveResult<Self> {
        let count = settings.object_count;
        if count == 0 {
            return Err(HandweaveError::formation(
                "cannot build formations for zero objects",
            ));
        }

        let catalog = Self {
            scatter: Formation {
                kind: FormationKind::Scatter,
                positions: scatter_positions(count, settings, rng),
            },
            tree: Formation {
                kind: FormationKind::Tree,
                positions: tree_positions(count, settings),
            },
            focus: Formation {
                kind: FormationKind::Focus,
                positions: focus_positions(count, settings),
            },
        };

        tracing::debug!(objects = count, "Formation catalog generated");
        Ok(catalog)
    }

    pub fn get(&self, kind: FormationKind) -> &Formation {
        match kind {
            FormationKind::Scatter => &self.scatter,
            FormationKind::Tree => &self.tree,
            FormationKind::Focus => &self.focus,
        }
    }

    /// Population size; every formation has exactly this many slots.
    pub fn object_count(&self) -> usize {
        self.scatter.len()
    }
}
