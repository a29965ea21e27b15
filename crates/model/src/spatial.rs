//! Spatial primitives for the choreography engine.
//!
//! Scene coordinates are right-handed with +Y up. Rotations are Euler
//! angles in radians applied in XYZ order.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D normalized point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

/// A 3D vector in scene units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(&self, other: &Vec3) -> f64 {
        (*other - *self).length()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(&self) -> Option<Vec3> {
        let len = self.length();
        if len < 1e-12 {
            return None;
        }
        Some(*self * (1.0 / len))
    }

    /// One exponential-smoothing step: `self + (target - self) * alpha`.
    pub fn approach(&self, target: &Vec3, alpha: f64) -> Vec3 {
        *self + (*target - *self) * alpha
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Three-axis Euler rotation (radians, XYZ order).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Orientation that turns local +Z at `from` toward `to`, with no roll.
    ///
    /// For XYZ order the rotated forward axis is
    /// `(sin y, -sin x cos y, cos x cos y)`, which gives
    /// `y = asin(dx)` and `x = atan2(-dy, dz)`. Coincident points yield
    /// the identity rotation.
    pub fn look_at(from: &Vec3, to: &Vec3) -> Euler {
        match (*to - *from).normalized() {
            Some(dir) => Euler::new((-dir.y).atan2(dir.z), dir.x.clamp(-1.0, 1.0).asin(), 0.0),
            None => Euler::default(),
        }
    }

    /// Local +Z axis after applying this rotation.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.y.sin(),
            -self.x.sin() * self.y.cos(),
            self.x.cos() * self.y.cos(),
        )
    }

    /// Per-axis smoothing step.
    ///
    /// Angles are interpolated numerically with no shortest-arc wrap, so a
    /// delta larger than pi travels the long way around.
    pub fn approach(&self, target: &Euler, alpha: f64) -> Euler {
        Euler::new(
            self.x + (target.x - self.x) * alpha,
            self.y + (target.y - self.y) * alpha,
            self.z + (target.z - self.z) * alpha,
        )
    }

    /// Largest absolute per-axis difference.
    pub fn max_axis_delta(&self, other: &Euler) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

/// Position plus rotation of one managed object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Euler,
}

/// The three precomputed formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationKind {
    /// Uniform random volume.
    Scatter,
    /// Spiral shell stacked along the vertical axis.
    Tree,
    /// Cylindrical arc grid.
    Focus,
}

impl FormationKind {
    pub const ALL: [FormationKind; 3] = [
        FormationKind::Scatter,
        FormationKind::Tree,
        FormationKind::Focus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Tree => "tree",
            Self::Focus => "focus",
        }
    }
}

impl std::str::FromStr for FormationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scatter" => Ok(Self::Scatter),
            "tree" => Ok(Self::Tree),
            "focus" => Ok(Self::Focus),
            other => Err(format!(
                "unknown formation '{other}' (expected scatter|tree|focus)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!(a.distance_to(&b) < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_point2d_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(1.0, 0.0);
        assert!((a.distance_to(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_vec3_approach() {
        let a = Vec3::ZERO;
        let b = Vec3::new(100.0, -20.0, 10.0);
        let c = a.approach(&b, 0.05);
        assert_vec_close(c, Vec3::new(5.0, -1.0, 0.5));
    }

    #[test]
    fn test_look_at_points_forward_axis_at_target() {
        let from = Vec3::new(300.0, -200.0, 100.0);
        let to = Vec3::new(0.0, 0.0, 3000.0);
        let rot = Euler::look_at(&from, &to);
        let expected = (to - from).normalized().unwrap();
        assert_vec_close(rot.forward(), expected);
        assert_eq!(rot.z, 0.0);
    }

    #[test]
    fn test_look_at_straight_ahead_is_identity() {
        let rot = Euler::look_at(&Vec3::ZERO, &Vec3::new(0.0, 0.0, 10.0));
        assert!(rot.max_axis_delta(&Euler::default()) < 1e-12);
    }

    #[test]
    fn test_look_at_behind() {
        // Target directly behind: forward must flip to -Z.
        let rot = Euler::look_at(&Vec3::ZERO, &Vec3::new(0.0, 0.0, -10.0));
        assert_vec_close(rot.forward(), Vec3::new(0.0, 0.0, -1.0));
        assert!((rot.x.abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_look_at_coincident_points() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Euler::look_at(&p, &p), Euler::default());
    }

    #[test]
    fn test_euler_approach_takes_numeric_path() {
        // No wrap-around: going from -3 to +3 passes through 0.
        let a = Euler::new(-3.0, 0.0, 0.0);
        let b = Euler::new(3.0, 0.0, 0.0);
        let c = a.approach(&b, 0.5);
        assert!(c.x.abs() < 1e-12);
    }

    #[test]
    fn test_formation_kind_parse() {
        assert_eq!("Tree".parse::<FormationKind>(), Ok(FormationKind::Tree));
        assert_eq!(" focus ".parse::<FormationKind>(), Ok(FormationKind::Focus));
        assert!("spiral".parse::<FormationKind>().is_err());
    }
}
