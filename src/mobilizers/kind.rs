use std::fmt;

use nalgebra::{DVector, Vector5, Vector6};

use crate::error::{require, MultibodyError, Result};
use crate::math::{self, Real, Transform, Vec2, Vec3};
use crate::mobilizers::motion_flags::MotionFlags;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Tag naming a mobilizer kind without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum MobilizerType {
    Ground,
    Weld,
    Pin,
    Slider,
    Screw,
    Universal,
    Cylinder,
    BendStretch,
    LineOrientation,
    Planar,
    Gimbal,
    Ball,
    Translation,
    FreeLine,
    Free,
    Custom,
}

impl MobilizerType {
    /// Returns the kind name
    pub fn name(self) -> &'static str {
        match self {
            Self::Ground => "Ground",
            Self::Weld => "Weld",
            Self::Pin => "Pin",
            Self::Slider => "Slider",
            Self::Screw => "Screw",
            Self::Universal => "Universal",
            Self::Cylinder => "Cylinder",
            Self::BendStretch => "BendStretch",
            Self::LineOrientation => "LineOrientation",
            Self::Planar => "Planar",
            Self::Gimbal => "Gimbal",
            Self::Ball => "Ball",
            Self::Translation => "Translation",
            Self::FreeLine => "FreeLine",
            Self::Free => "Free",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for MobilizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinate counts and defaults of a user-defined mobilizer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CustomMobilizer {
    n_mobilities: usize,
    default_q: DVector<Real>,
}

impl CustomMobilizer {
    /// Largest number of mobilities a single mobilizer can provide
    pub const MAX_MOBILITIES: usize = 6;

    /// Largest number of coordinates a single mobilizer can use
    pub const MAX_COORDINATES: usize = 7;

    /// Validates the counts and creates a custom mobilizer with zero defaults
    pub fn try_new(n_mobilities: usize, n_coordinates: usize) -> Result<Self> {
        let valid = (1..=Self::MAX_MOBILITIES).contains(&n_mobilities)
            && (n_mobilities..=Self::MAX_COORDINATES).contains(&n_coordinates);
        if !valid {
            return Err(MultibodyError::InvalidCustomCounts {
                n_mobilities,
                n_coordinates,
            });
        }
        Ok(Self {
            n_mobilities,
            default_q: DVector::zeros(n_coordinates),
        })
    }

    /// Number of generalized speeds
    pub fn n_mobilities(&self) -> usize {
        self.n_mobilities
    }

    /// Number of generalized coordinates
    pub fn n_coordinates(&self) -> usize {
        self.default_q.len()
    }
}

/// The closed catalogue of mobilizer kinds, with each kind's default coordinates
///
/// Coordinate conventions, all expressed in the inboard (F) frame:
/// - `Pin`: rotation about z
/// - `Slider`: translation along x
/// - `Screw`: rotation about z coupled to `pitch` translation along z per radian
/// - `Universal`, `LineOrientation`: rotation about x, then about the new y
/// - `Cylinder`: rotation about z, translation along z
/// - `BendStretch`: rotation about z, translation along the rotated x
/// - `Planar`: translation (x, y), rotation about z
/// - `Gimbal`: body-fixed x-y-z angles
/// - `Ball`: rotation vector
/// - `Translation`: translation (x, y, z)
/// - `FreeLine`: `LineOrientation` angles followed by a translation
/// - `Free`: rotation vector followed by a translation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum MobilizerKind {
    Ground,
    Weld,
    Pin { default_q: Real },
    Slider { default_q: Real },
    Screw { pitch: Real, default_q: Real },
    Universal { default_q: Vec2 },
    Cylinder { default_q: Vec2 },
    BendStretch { default_q: Vec2 },
    LineOrientation { default_q: Vec2 },
    Planar { default_q: Vec3 },
    Gimbal { default_q: Vec3 },
    Ball { default_q: Vec3 },
    Translation { default_q: Vec3 },
    FreeLine { default_q: Vector5<Real> },
    Free { default_q: Vector6<Real> },
    Custom(CustomMobilizer),
}

impl MobilizerKind {
    /// Returns the kind tag
    pub fn kind_type(&self) -> MobilizerType {
        match self {
            Self::Ground => MobilizerType::Ground,
            Self::Weld => MobilizerType::Weld,
            Self::Pin { .. } => MobilizerType::Pin,
            Self::Slider { .. } => MobilizerType::Slider,
            Self::Screw { .. } => MobilizerType::Screw,
            Self::Universal { .. } => MobilizerType::Universal,
            Self::Cylinder { .. } => MobilizerType::Cylinder,
            Self::BendStretch { .. } => MobilizerType::BendStretch,
            Self::LineOrientation { .. } => MobilizerType::LineOrientation,
            Self::Planar { .. } => MobilizerType::Planar,
            Self::Gimbal { .. } => MobilizerType::Gimbal,
            Self::Ball { .. } => MobilizerType::Ball,
            Self::Translation { .. } => MobilizerType::Translation,
            Self::FreeLine { .. } => MobilizerType::FreeLine,
            Self::Free { .. } => MobilizerType::Free,
            Self::Custom(_) => MobilizerType::Custom,
        }
    }

    /// Returns the kind name
    pub fn name(&self) -> &'static str {
        self.kind_type().name()
    }

    /// Number of generalized coordinates
    pub fn nq(&self) -> usize {
        self.default_q().len()
    }

    /// Number of generalized speeds
    pub fn nu(&self) -> usize {
        match self {
            Self::Custom(custom) => custom.n_mobilities(),
            _ => self.nq(),
        }
    }

    /// The kinds of relative motion this mobilizer permits
    pub fn motion(&self) -> MotionFlags {
        match self {
            Self::Ground | Self::Weld => MotionFlags::empty(),
            Self::Pin { .. }
            | Self::Universal { .. }
            | Self::LineOrientation { .. }
            | Self::Gimbal { .. }
            | Self::Ball { .. } => MotionFlags::ROTATION,
            Self::Slider { .. } | Self::Translation { .. } => MotionFlags::TRANSLATION,
            Self::Screw { .. }
            | Self::Cylinder { .. }
            | Self::BendStretch { .. }
            | Self::Planar { .. }
            | Self::FreeLine { .. }
            | Self::Free { .. }
            | Self::Custom(_) => MotionFlags::ROTATION | MotionFlags::TRANSLATION,
        }
    }

    /// Default generalized coordinates as a flat slice
    pub fn default_q(&self) -> &[Real] {
        match self {
            Self::Ground | Self::Weld => &[],
            Self::Pin { default_q } | Self::Slider { default_q } | Self::Screw { default_q, .. } => {
                std::slice::from_ref(default_q)
            }
            Self::Universal { default_q }
            | Self::Cylinder { default_q }
            | Self::BendStretch { default_q }
            | Self::LineOrientation { default_q } => default_q.as_slice(),
            Self::Planar { default_q }
            | Self::Gimbal { default_q }
            | Self::Ball { default_q }
            | Self::Translation { default_q } => default_q.as_slice(),
            Self::FreeLine { default_q } => default_q.as_slice(),
            Self::Free { default_q } => default_q.as_slice(),
            Self::Custom(custom) => custom.default_q.as_slice(),
        }
    }

    fn default_q_mut(&mut self) -> &mut [Real] {
        match self {
            Self::Ground | Self::Weld => &mut [],
            Self::Pin { default_q } | Self::Slider { default_q } | Self::Screw { default_q, .. } => {
                std::slice::from_mut(default_q)
            }
            Self::Universal { default_q }
            | Self::Cylinder { default_q }
            | Self::BendStretch { default_q }
            | Self::LineOrientation { default_q } => default_q.as_mut_slice(),
            Self::Planar { default_q }
            | Self::Gimbal { default_q }
            | Self::Ball { default_q }
            | Self::Translation { default_q } => default_q.as_mut_slice(),
            Self::FreeLine { default_q } => default_q.as_mut_slice(),
            Self::Free { default_q } => default_q.as_mut_slice(),
            Self::Custom(custom) => custom.default_q.as_mut_slice(),
        }
    }

    /// Replaces the default coordinates; `q` must have exactly `nq()` values
    pub fn set_default_q(&mut self, q: &[Real]) -> Result<()> {
        let target = self.default_q_mut();
        if target.len() != q.len() {
            return Err(MultibodyError::CoordinateCount {
                expected: target.len(),
                got: q.len(),
            });
        }
        target.copy_from_slice(q);
        Ok(())
    }

    /// Returns the screw pitch, if this is a screw
    pub fn pitch(&self) -> Option<Real> {
        match self {
            Self::Screw { pitch, .. } => Some(*pitch),
            _ => None,
        }
    }

    /// Replaces the screw pitch
    pub fn set_pitch(&mut self, new_pitch: Real) -> Result<()> {
        match self {
            Self::Screw { pitch, .. } => {
                *pitch = new_pitch;
                Ok(())
            }
            other => Err(MultibodyError::WrongKind {
                expected: "Screw",
                actual: other.name(),
            }),
        }
    }

    /// Pose of the outboard (M) frame in the inboard (F) frame for coordinates `q`
    ///
    /// Panics if `q` does not hold exactly `nq()` values.
    #[track_caller]
    pub fn calc_mobilizer_transform(&self, q: &[Real]) -> Transform {
        require(self.try_calc_mobilizer_transform(q))
    }

    /// Pose of the outboard (M) frame in the inboard (F) frame for coordinates `q`
    pub fn try_calc_mobilizer_transform(&self, q: &[Real]) -> Result<Transform> {
        if q.len() != self.nq() {
            return Err(MultibodyError::CoordinateCount {
                expected: self.nq(),
                got: q.len(),
            });
        }

        let x_fm = match self {
            Self::Ground | Self::Weld | Self::Custom(_) => Transform::identity(),
            Self::Pin { .. } => math::transform(math::rotation_z(q[0]), Vec3::zeros()),
            Self::Slider { .. } => math::transform(math::Rotation::identity(), Vec3::new(q[0], 0.0, 0.0)),
            Self::Screw { pitch, .. } => {
                math::transform(math::rotation_z(q[0]), Vec3::new(0.0, 0.0, pitch * q[0]))
            }
            Self::Universal { .. } | Self::LineOrientation { .. } => math::transform(
                math::rotation_x(q[0]) * math::rotation_y(q[1]),
                Vec3::zeros(),
            ),
            Self::Cylinder { .. } => {
                math::transform(math::rotation_z(q[0]), Vec3::new(0.0, 0.0, q[1]))
            }
            Self::BendStretch { .. } => {
                let rotation = math::rotation_z(q[0]);
                let translation = rotation * Vec3::new(q[1], 0.0, 0.0);
                math::transform(rotation, translation)
            }
            Self::Planar { .. } => {
                math::transform(math::rotation_z(q[2]), Vec3::new(q[0], q[1], 0.0))
            }
            Self::Gimbal { .. } => {
                math::transform(math::body_fixed_xyz(&Vec3::new(q[0], q[1], q[2])), Vec3::zeros())
            }
            Self::Ball { .. } => math::transform(
                math::rotation_from_vector(&Vec3::new(q[0], q[1], q[2])),
                Vec3::zeros(),
            ),
            Self::Translation { .. } => {
                math::transform(math::Rotation::identity(), Vec3::new(q[0], q[1], q[2]))
            }
            Self::FreeLine { .. } => math::transform(
                math::rotation_x(q[0]) * math::rotation_y(q[1]),
                Vec3::new(q[2], q[3], q[4]),
            ),
            Self::Free { .. } => math::transform(
                math::rotation_from_vector(&Vec3::new(q[0], q[1], q[2])),
                Vec3::new(q[3], q[4], q[5]),
            ),
        };
        Ok(x_fm)
    }

    /// Pose of M in F at the default coordinates
    pub fn default_mobilizer_transform(&self) -> Transform {
        self.calc_mobilizer_transform(self.default_q())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn built_in_coordinate_counts() {
        let counts = [
            (MobilizerKind::Ground, 0),
            (MobilizerKind::Weld, 0),
            (MobilizerKind::Pin { default_q: 0.0 }, 1),
            (MobilizerKind::Screw { pitch: 0.1, default_q: 0.0 }, 1),
            (MobilizerKind::Cylinder { default_q: Vec2::zeros() }, 2),
            (MobilizerKind::Planar { default_q: Vec3::zeros() }, 3),
            (MobilizerKind::Ball { default_q: Vec3::zeros() }, 3),
            (MobilizerKind::FreeLine { default_q: Vector5::zeros() }, 5),
            (MobilizerKind::Free { default_q: Vector6::zeros() }, 6),
        ];
        for (kind, n) in counts {
            assert_eq!(kind.nq(), n, "{}", kind.name());
            assert_eq!(kind.nu(), n, "{}", kind.name());
        }
    }

    #[test]
    fn custom_counts_are_validated() {
        let custom = CustomMobilizer::try_new(2, 3).unwrap();
        let kind = MobilizerKind::Custom(custom);
        assert_eq!(kind.nu(), 2);
        assert_eq!(kind.nq(), 3);

        assert!(CustomMobilizer::try_new(0, 1).is_err());
        assert!(CustomMobilizer::try_new(3, 2).is_err());
        assert!(CustomMobilizer::try_new(6, 8).is_err());
    }

    #[test]
    fn set_default_q_checks_width() {
        let mut kind = MobilizerKind::Planar { default_q: Vec3::zeros() };
        kind.set_default_q(&[1.0, 2.0, 0.5]).unwrap();
        assert_eq!(kind.default_q(), &[1.0, 2.0, 0.5]);
        assert_eq!(
            kind.set_default_q(&[1.0]),
            Err(MultibodyError::CoordinateCount { expected: 3, got: 1 })
        );
    }

    #[test]
    fn pin_rotates_about_z() {
        let kind = MobilizerKind::Pin { default_q: 0.0 };
        let x_fm = kind.calc_mobilizer_transform(&[FRAC_PI_2]);
        let p = x_fm * nalgebra::Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p.coords, Vec3::new(0.0, 1.0, 0.0), epsilon = 1.0e-12);
    }

    #[test]
    fn screw_couples_rotation_and_translation() {
        let kind = MobilizerKind::Screw { pitch: 0.5, default_q: 0.0 };
        let x_fm = kind.calc_mobilizer_transform(&[2.0]);
        assert_relative_eq!(x_fm.translation.vector, Vec3::new(0.0, 0.0, 1.0), epsilon = 1.0e-12);
        assert_relative_eq!(x_fm.rotation.angle(), 2.0, epsilon = 1.0e-12);
    }

    #[test]
    fn bend_stretch_translates_along_rotated_x() {
        let kind = MobilizerKind::BendStretch { default_q: Vec2::zeros() };
        let x_fm = kind.calc_mobilizer_transform(&[FRAC_PI_2, 2.0]);
        assert_relative_eq!(x_fm.translation.vector, Vec3::new(0.0, 2.0, 0.0), epsilon = 1.0e-12);
    }

    #[test]
    fn motion_flags_match_kind() {
        assert!(MobilizerKind::Weld.motion().is_empty());
        assert_eq!(MobilizerKind::Slider { default_q: 0.0 }.motion(), MotionFlags::TRANSLATION);
        assert!(MobilizerKind::Free { default_q: Vector6::zeros() }
            .motion()
            .contains(MotionFlags::ROTATION | MotionFlags::TRANSLATION));
    }
}
