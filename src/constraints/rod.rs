use nalgebra::Point3;

use crate::constraints::constraint::check_kind;
use crate::constraints::{Constraint, ConstraintKind, ConstraintType};
use crate::core::MatterSubsystem;
use crate::error::{require, MultibodyError, Result};
use crate::math::{Real, Transform, Vec3};
use crate::mobilizers::MobilizedBody;

constraint_view!(
    /// Distance constraint between a point on each of two bodies
    Rod, RodMut, Rod
);

impl Rod<'_> {
    /// Connects the origins of two adopted bodies with a rod of the given length
    ///
    /// Panics if either body is free, the bodies live in different
    /// subsystems, or `length` is not strictly positive.
    #[allow(clippy::new_ret_no_self)]
    #[track_caller]
    pub fn new(matter: &mut MatterSubsystem, body1: &MobilizedBody, body2: &MobilizedBody, length: Real) -> Constraint {
        require(Self::try_new(matter, body1, body2, length))
    }

    /// Fallible form of `new`
    pub fn try_new(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        body2: &MobilizedBody,
        length: Real,
    ) -> Result<Constraint> {
        Self::try_with_points(matter, body1, Vec3::zeros(), body2, Vec3::zeros(), length)
    }

    /// Connects `point1` on `body1` to `point2` on `body2`
    #[track_caller]
    pub fn with_points(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        point1: Vec3,
        body2: &MobilizedBody,
        point2: Vec3,
        length: Real,
    ) -> Constraint {
        require(Self::try_with_points(matter, body1, point1, body2, point2, length))
    }

    /// Fallible form of `with_points`
    pub fn try_with_points(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        point1: Vec3,
        body2: &MobilizedBody,
        point2: Vec3,
        length: Real,
    ) -> Result<Constraint> {
        Constraint::try_create(matter, body1, body2, ConstraintKind::Rod { point1, point2, length })
    }

    #[track_caller]
    fn geometry(&self) -> (Vec3, Vec3, Real) {
        match *self.constraint.kind() {
            ConstraintKind::Rod { point1, point2, length } => (point1, point2, length),
            ref other => require(Err(MultibodyError::WrongKind {
                expected: "Rod",
                actual: other.name(),
            })),
        }
    }

    /// Attachment point on body 1, in body 1's frame
    pub fn default_point_on_body1(&self) -> Vec3 {
        self.geometry().0
    }

    /// Attachment point on body 2, in body 2's frame
    pub fn default_point_on_body2(&self) -> Vec3 {
        self.geometry().1
    }

    /// Required distance between the two points
    pub fn default_rod_length(&self) -> Real {
        self.geometry().2
    }

    /// Current distance between the points minus the rod length
    ///
    /// `x_gb1` and `x_gb2` are the poses of the two bodies in ground.
    pub fn position_error(&self, x_gb1: &Transform, x_gb2: &Transform) -> Real {
        let (point1, point2, length) = self.geometry();
        let p1 = x_gb1.transform_point(&Point3::from(point1));
        let p2 = x_gb2.transform_point(&Point3::from(point2));
        nalgebra::distance(&p1, &p2) - length
    }
}

impl RodMut<'_> {
    /// Moves the attachment point on body 1
    #[track_caller]
    pub fn set_default_point_on_body1(&mut self, point: Vec3) -> &mut Self {
        if let ConstraintKind::Rod { point1, .. } = &mut self.constraint.record_mut("set_default_point_on_body1").kind {
            *point1 = point;
        }
        self
    }

    /// Moves the attachment point on body 2
    #[track_caller]
    pub fn set_default_point_on_body2(&mut self, point: Vec3) -> &mut Self {
        if let ConstraintKind::Rod { point2, .. } = &mut self.constraint.record_mut("set_default_point_on_body2").kind {
            *point2 = point;
        }
        self
    }

    /// Changes the rod length; panics unless `length` is strictly positive
    #[track_caller]
    pub fn set_default_rod_length(&mut self, length: Real) -> &mut Self {
        require(self.try_set_default_rod_length(length));
        self
    }

    /// Fallible form of `set_default_rod_length`
    pub fn try_set_default_rod_length(&mut self, new_length: Real) -> Result<()> {
        if new_length <= 0.0 {
            return Err(MultibodyError::NonPositiveRodLength(new_length));
        }
        if let ConstraintKind::Rod { length, .. } = &mut self.constraint.try_write("set_default_rod_length")?.kind {
            *length = new_length;
        }
        Ok(())
    }
}
