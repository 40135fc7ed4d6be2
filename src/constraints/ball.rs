use nalgebra::Point3;

use crate::constraints::constraint::check_kind;
use crate::constraints::{Constraint, ConstraintKind, ConstraintType};
use crate::core::MatterSubsystem;
use crate::error::{require, MultibodyError, Result};
use crate::math::{Transform, Vec3};
use crate::mobilizers::MobilizedBody;

constraint_view!(
    /// Coincidence of a point on each of two bodies
    Ball, BallMut, Ball
);

impl Ball<'_> {
    /// Joins the origins of two adopted bodies
    ///
    /// Panics if either body is free or the bodies live in different subsystems.
    #[allow(clippy::new_ret_no_self)]
    #[track_caller]
    pub fn new(matter: &mut MatterSubsystem, body1: &MobilizedBody, body2: &MobilizedBody) -> Constraint {
        require(Self::try_new(matter, body1, body2))
    }

    /// Fallible form of `new`
    pub fn try_new(matter: &mut MatterSubsystem, body1: &MobilizedBody, body2: &MobilizedBody) -> Result<Constraint> {
        Self::try_with_points(matter, body1, Vec3::zeros(), body2, Vec3::zeros())
    }

    /// Joins `point1` on `body1` to `point2` on `body2`
    #[track_caller]
    pub fn with_points(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        point1: Vec3,
        body2: &MobilizedBody,
        point2: Vec3,
    ) -> Constraint {
        require(Self::try_with_points(matter, body1, point1, body2, point2))
    }

    /// Fallible form of `with_points`
    pub fn try_with_points(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        point1: Vec3,
        body2: &MobilizedBody,
        point2: Vec3,
    ) -> Result<Constraint> {
        Constraint::try_create(matter, body1, body2, ConstraintKind::Ball { point1, point2 })
    }

    #[track_caller]
    fn points(&self) -> (Vec3, Vec3) {
        match *self.constraint.kind() {
            ConstraintKind::Ball { point1, point2 } => (point1, point2),
            ref other => require(Err(MultibodyError::WrongKind {
                expected: "Ball",
                actual: other.name(),
            })),
        }
    }

    /// Joint center on body 1, in body 1's frame
    pub fn default_point_on_body1(&self) -> Vec3 {
        self.points().0
    }

    /// Joint center on body 2, in body 2's frame
    pub fn default_point_on_body2(&self) -> Vec3 {
        self.points().1
    }

    /// Separation of the two points, expressed in ground
    pub fn position_error(&self, x_gb1: &Transform, x_gb2: &Transform) -> Vec3 {
        let (point1, point2) = self.points();
        x_gb2.transform_point(&Point3::from(point2)) - x_gb1.transform_point(&Point3::from(point1))
    }
}

impl BallMut<'_> {
    /// Moves the joint center on body 1
    #[track_caller]
    pub fn set_default_point_on_body1(&mut self, point: Vec3) -> &mut Self {
        if let ConstraintKind::Ball { point1, .. } = &mut self.constraint.record_mut("set_default_point_on_body1").kind {
            *point1 = point;
        }
        self
    }

    /// Moves the joint center on body 2
    #[track_caller]
    pub fn set_default_point_on_body2(&mut self, point: Vec3) -> &mut Self {
        if let ConstraintKind::Ball { point2, .. } = &mut self.constraint.record_mut("set_default_point_on_body2").kind {
            *point2 = point;
        }
        self
    }
}
