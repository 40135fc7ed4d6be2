use crate::constraints::constraint::check_kind;
use crate::constraints::{Constraint, ConstraintKind, ConstraintType};
use crate::core::MatterSubsystem;
use crate::error::{require, MultibodyError, Result};
use crate::math::{Transform, Vec3};
use crate::mobilizers::MobilizedBody;

constraint_view!(
    /// Coincidence of a frame on each of two bodies
    Weld, WeldMut, Weld
);

impl Weld<'_> {
    /// Welds the body frames of two adopted bodies together
    ///
    /// Panics if either body is free or the bodies live in different subsystems.
    #[allow(clippy::new_ret_no_self)]
    #[track_caller]
    pub fn new(matter: &mut MatterSubsystem, body1: &MobilizedBody, body2: &MobilizedBody) -> Constraint {
        require(Self::try_new(matter, body1, body2))
    }

    /// Fallible form of `new`
    pub fn try_new(matter: &mut MatterSubsystem, body1: &MobilizedBody, body2: &MobilizedBody) -> Result<Constraint> {
        Self::try_with_frames(matter, body1, Transform::identity(), body2, Transform::identity())
    }

    /// Welds `frame1` on `body1` to `frame2` on `body2`
    #[track_caller]
    pub fn with_frames(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        frame1: Transform,
        body2: &MobilizedBody,
        frame2: Transform,
    ) -> Constraint {
        require(Self::try_with_frames(matter, body1, frame1, body2, frame2))
    }

    /// Fallible form of `with_frames`
    pub fn try_with_frames(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        frame1: Transform,
        body2: &MobilizedBody,
        frame2: Transform,
    ) -> Result<Constraint> {
        Constraint::try_create(matter, body1, body2, ConstraintKind::Weld { frame1, frame2 })
    }

    #[track_caller]
    fn frames(&self) -> (Transform, Transform) {
        match *self.constraint.kind() {
            ConstraintKind::Weld { frame1, frame2 } => (frame1, frame2),
            ref other => require(Err(MultibodyError::WrongKind {
                expected: "Weld",
                actual: other.name(),
            })),
        }
    }

    /// Weld frame on body 1
    pub fn default_frame_on_body1(&self) -> Transform {
        self.frames().0
    }

    /// Weld frame on body 2
    pub fn default_frame_on_body2(&self) -> Transform {
        self.frames().1
    }

    /// Pose mismatch of frame 2 relative to frame 1
    ///
    /// Returns the rotation vector and the translation of frame 2 expressed
    /// in frame 1; both vanish when the weld is satisfied.
    pub fn position_error(&self, x_gb1: &Transform, x_gb2: &Transform) -> (Vec3, Vec3) {
        let (frame1, frame2) = self.frames();
        let x_gf1 = x_gb1 * frame1;
        let x_gf2 = x_gb2 * frame2;
        let x_f1f2 = x_gf1.inv_mul(&x_gf2);
        (x_f1f2.rotation.scaled_axis(), x_f1f2.translation.vector)
    }
}

impl WeldMut<'_> {
    /// Replaces the weld frame on body 1
    #[track_caller]
    pub fn set_default_frame_on_body1(&mut self, frame: Transform) -> &mut Self {
        if let ConstraintKind::Weld { frame1, .. } = &mut self.constraint.record_mut("set_default_frame_on_body1").kind {
            *frame1 = frame;
        }
        self
    }

    /// Replaces the weld frame on body 2
    #[track_caller]
    pub fn set_default_frame_on_body2(&mut self, frame: Transform) -> &mut Self {
        if let ConstraintKind::Weld { frame2, .. } = &mut self.constraint.record_mut("set_default_frame_on_body2").kind {
            *frame2 = frame;
        }
        self
    }
}
