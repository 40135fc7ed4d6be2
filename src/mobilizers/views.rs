//! Typed views over a `MobilizedBody`.
//!
//! Each kind has a shared view (`Pin`) and an exclusive view (`PinMut`).
//! `Pin::is_instance_of` tests the kind, `Pin::downcast` and
//! `Pin::upd_downcast` narrow a generic handle, and the kind's associated
//! functions (`Pin::new`, `Pin::attach`) build new mobilizers. Views deref to
//! the generic handle, so everything on `MobilizedBody` stays reachable.

use std::ops::{Deref, DerefMut};

use nalgebra::{Vector5, Vector6};

use crate::bodies::Body;
use crate::core::{MatterSubsystem, State};
use crate::error::{require, MultibodyError, Result};
use crate::math::{Real, Transform, Vec2, Vec3};
use crate::mobilizers::{CustomMobilizer, MobilizedBody, MobilizerKind, MobilizerType};

fn check_kind(mobod: &MobilizedBody, expected: MobilizerType) -> Result<()> {
    let actual = mobod.try_kind_type()?;
    if actual != expected {
        return Err(MultibodyError::WrongKind {
            expected: expected.name(),
            actual: actual.name(),
        });
    }
    Ok(())
}

#[track_caller]
fn fixed_mut<const N: usize>(values: &mut [Real]) -> &mut [Real; N] {
    let got = values.len();
    require(
        values
            .try_into()
            .map_err(|_| MultibodyError::CoordinateCount { expected: N, got }),
    )
}

macro_rules! mobilizer_view {
    ($(#[$attr:meta])* $view:ident, $view_mut:ident, $kind:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy)]
        pub struct $view<'a> {
            mobod: &'a MobilizedBody,
        }

        #[doc = concat!("Exclusive view of a [`", stringify!($view), "`] mobilizer")]
        #[derive(Debug)]
        pub struct $view_mut<'a> {
            mobod: &'a mut MobilizedBody,
        }

        impl<'a> $view<'a> {
            #[doc = concat!("Returns true if `mobod` holds a ", stringify!($kind), " mobilizer")]
            pub fn is_instance_of(mobod: &MobilizedBody) -> bool {
                check_kind(mobod, MobilizerType::$kind).is_ok()
            }

            /// Narrows a generic handle; panics if it holds another kind
            #[track_caller]
            pub fn downcast(mobod: &'a MobilizedBody) -> Self {
                require(Self::try_downcast(mobod))
            }

            /// Narrows a generic handle
            pub fn try_downcast(mobod: &'a MobilizedBody) -> Result<Self> {
                check_kind(mobod, MobilizerType::$kind)?;
                Ok(Self { mobod })
            }

            /// Narrows a generic handle for modification; panics if it holds another kind
            #[track_caller]
            pub fn upd_downcast(mobod: &'a mut MobilizedBody) -> $view_mut<'a> {
                require(Self::try_upd_downcast(mobod))
            }

            /// Narrows a generic handle for modification
            pub fn try_upd_downcast(mobod: &'a mut MobilizedBody) -> Result<$view_mut<'a>> {
                check_kind(mobod, MobilizerType::$kind)?;
                Ok($view_mut { mobod })
            }

            /// The generic handle behind this view
            pub fn mobilized_body(&self) -> &'a MobilizedBody {
                self.mobod
            }
        }

        impl $view_mut<'_> {
            /// Reborrows as a shared view
            pub fn as_view(&self) -> $view<'_> {
                $view { mobod: &*self.mobod }
            }
        }

        impl Deref for $view<'_> {
            type Target = MobilizedBody;

            fn deref(&self) -> &MobilizedBody {
                self.mobod
            }
        }

        impl Deref for $view_mut<'_> {
            type Target = MobilizedBody;

            fn deref(&self) -> &MobilizedBody {
                &*self.mobod
            }
        }

        impl DerefMut for $view_mut<'_> {
            fn deref_mut(&mut self) -> &mut MobilizedBody {
                self.mobod
            }
        }
    };
}

macro_rules! attach_constructors {
    ($view:ident, $default:expr) => {
        impl $view<'_> {
            /// Creates a free mobilizer of this kind at its default coordinates
            #[allow(clippy::new_ret_no_self)]
            pub fn new() -> MobilizedBody {
                MobilizedBody::new($default)
            }

            /// Creates a mobilizer of this kind and adopts it as a child of `parent`
            #[track_caller]
            pub fn attach(matter: &mut MatterSubsystem, parent: &MobilizedBody, body: Body) -> MobilizedBody {
                MobilizedBody::attach(matter, parent, $default, body)
            }

            /// Fallible form of `attach`
            pub fn try_attach(
                matter: &mut MatterSubsystem,
                parent: &MobilizedBody,
                body: Body,
            ) -> Result<MobilizedBody> {
                MobilizedBody::try_attach(matter, parent, $default, body)
            }

            /// Like `attach`, with explicit inboard and outboard frames
            #[track_caller]
            pub fn attach_with_frames(
                matter: &mut MatterSubsystem,
                parent: &MobilizedBody,
                inboard_frame: Transform,
                body: Body,
                outboard_frame: Transform,
            ) -> MobilizedBody {
                MobilizedBody::attach_with_frames(matter, parent, inboard_frame, $default, body, outboard_frame)
            }
        }
    };
}

macro_rules! scalar_coordinate {
    ($view:ident, $view_mut:ident) => {
        impl $view<'_> {
            /// Default value of the coordinate
            pub fn default_q(&self) -> Real {
                self.mobod.default_q()[0]
            }

            /// Current coordinate
            #[track_caller]
            pub fn q(&self, matter: &MatterSubsystem, state: &State) -> Real {
                self.mobod.q(matter, state)[0]
            }

            /// Current coordinate, writable in place
            #[track_caller]
            pub fn upd_q<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut Real {
                &mut self.mobod.upd_q(matter, state)[0]
            }

            /// Current speed
            #[track_caller]
            pub fn u(&self, matter: &MatterSubsystem, state: &State) -> Real {
                self.mobod.u(matter, state)[0]
            }

            /// Current speed, writable in place
            #[track_caller]
            pub fn upd_u<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut Real {
                &mut self.mobod.upd_u(matter, state)[0]
            }

            /// Applied force along the speed
            #[track_caller]
            pub fn mobility_force(&self, matter: &MatterSubsystem, state: &State) -> Real {
                self.mobod.mobility_forces(matter, state)[0]
            }

            /// Applied force along the speed, writable in place
            #[track_caller]
            pub fn upd_mobility_force<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut Real {
                &mut self.mobod.upd_mobility_forces(matter, state)[0]
            }
        }

        impl $view_mut<'_> {
            /// Replaces the default coordinate of a free mobilizer
            #[track_caller]
            pub fn set_default_q(&mut self, q: Real) -> &mut Self {
                self.mobod.set_default_q(&[q]);
                self
            }
        }
    };
}

macro_rules! vector_coordinates {
    ($view:ident, $view_mut:ident, $n:literal, $vector:ty) => {
        impl $view<'_> {
            /// Default coordinates
            pub fn default_q(&self) -> $vector {
                <$vector>::from_column_slice(&self.mobod.default_q())
            }

            /// Current coordinates
            #[track_caller]
            pub fn q(&self, matter: &MatterSubsystem, state: &State) -> $vector {
                <$vector>::from_column_slice(self.mobod.q(matter, state))
            }

            /// Current coordinates, writable in place
            #[track_caller]
            pub fn upd_q<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut [Real; $n] {
                fixed_mut(self.mobod.upd_q(matter, state))
            }

            /// Current speeds
            #[track_caller]
            pub fn u(&self, matter: &MatterSubsystem, state: &State) -> $vector {
                <$vector>::from_column_slice(self.mobod.u(matter, state))
            }

            /// Current speeds, writable in place
            #[track_caller]
            pub fn upd_u<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut [Real; $n] {
                fixed_mut(self.mobod.upd_u(matter, state))
            }

            /// Applied forces along the speeds
            #[track_caller]
            pub fn mobility_forces(&self, matter: &MatterSubsystem, state: &State) -> $vector {
                <$vector>::from_column_slice(self.mobod.mobility_forces(matter, state))
            }

            /// Applied forces along the speeds, writable in place
            #[track_caller]
            pub fn upd_mobility_forces<'s>(
                &self,
                matter: &MatterSubsystem,
                state: &'s mut State,
            ) -> &'s mut [Real; $n] {
                fixed_mut(self.mobod.upd_mobility_forces(matter, state))
            }
        }

        impl $view_mut<'_> {
            /// Replaces the default coordinates of a free mobilizer
            #[track_caller]
            pub fn set_default_q(&mut self, q: $vector) -> &mut Self {
                self.mobod.set_default_q(q.as_slice());
                self
            }
        }
    };
}

mobilizer_view!(
    /// The immovable root of every tree
    Ground, GroundMut, Ground
);

mobilizer_view!(
    /// Rigid attachment to the parent, no coordinates
    Weld, WeldMut, Weld
);
attach_constructors!(Weld, MobilizerKind::Weld);

mobilizer_view!(
    /// Rotation about the common z axis of F and M
    Pin, PinMut, Pin
);
attach_constructors!(Pin, MobilizerKind::Pin { default_q: 0.0 });
scalar_coordinate!(Pin, PinMut);

mobilizer_view!(
    /// Translation along the common x axis of F and M
    Slider, SliderMut, Slider
);
attach_constructors!(Slider, MobilizerKind::Slider { default_q: 0.0 });
scalar_coordinate!(Slider, SliderMut);

mobilizer_view!(
    /// Rotation about z coupled to translation along z
    Screw, ScrewMut, Screw
);
scalar_coordinate!(Screw, ScrewMut);

impl Screw<'_> {
    /// Creates a free screw advancing `pitch` along z per radian
    #[allow(clippy::new_ret_no_self)]
    pub fn new(pitch: Real) -> MobilizedBody {
        MobilizedBody::new(MobilizerKind::Screw { pitch, default_q: 0.0 })
    }

    /// Creates a screw and adopts it as a child of `parent`
    #[track_caller]
    pub fn attach(matter: &mut MatterSubsystem, parent: &MobilizedBody, body: Body, pitch: Real) -> MobilizedBody {
        MobilizedBody::attach(matter, parent, MobilizerKind::Screw { pitch, default_q: 0.0 }, body)
    }

    /// Like `attach`, with explicit inboard and outboard frames
    #[track_caller]
    pub fn attach_with_frames(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        inboard_frame: Transform,
        body: Body,
        outboard_frame: Transform,
        pitch: Real,
    ) -> MobilizedBody {
        MobilizedBody::attach_with_frames(
            matter,
            parent,
            inboard_frame,
            MobilizerKind::Screw { pitch, default_q: 0.0 },
            body,
            outboard_frame,
        )
    }

    /// Translation along z per radian of rotation
    pub fn default_pitch(&self) -> Real {
        self.mobod.kind().pitch().unwrap_or_default()
    }
}

impl ScrewMut<'_> {
    /// Replaces the pitch of a free screw
    #[track_caller]
    pub fn set_default_pitch(&mut self, pitch: Real) -> &mut Self {
        require(self.mobod.try_set_default_pitch(pitch).map(|_| ()));
        self
    }
}

mobilizer_view!(
    /// Rotation about x followed by rotation about the new y
    Universal, UniversalMut, Universal
);
attach_constructors!(Universal, MobilizerKind::Universal { default_q: Vec2::zeros() });
vector_coordinates!(Universal, UniversalMut, 2, Vec2);

mobilizer_view!(
    /// Rotation about and translation along the common z axis
    Cylinder, CylinderMut, Cylinder
);
attach_constructors!(Cylinder, MobilizerKind::Cylinder { default_q: Vec2::zeros() });
vector_coordinates!(Cylinder, CylinderMut, 2, Vec2);

mobilizer_view!(
    /// Rotation about z followed by translation along the rotated x axis
    BendStretch, BendStretchMut, BendStretch
);
attach_constructors!(BendStretch, MobilizerKind::BendStretch { default_q: Vec2::zeros() });
vector_coordinates!(BendStretch, BendStretchMut, 2, Vec2);

mobilizer_view!(
    /// Orientation of a line-like body whose z axis is its axis of symmetry
    LineOrientation, LineOrientationMut, LineOrientation
);
attach_constructors!(LineOrientation, MobilizerKind::LineOrientation { default_q: Vec2::zeros() });
vector_coordinates!(LineOrientation, LineOrientationMut, 2, Vec2);

mobilizer_view!(
    /// Translation in the xy plane plus rotation about z, coordinates (x, y, angle)
    Planar, PlanarMut, Planar
);
attach_constructors!(Planar, MobilizerKind::Planar { default_q: Vec3::zeros() });
vector_coordinates!(Planar, PlanarMut, 3, Vec3);

mobilizer_view!(
    /// Three body-fixed x-y-z rotation angles
    Gimbal, GimbalMut, Gimbal
);
attach_constructors!(Gimbal, MobilizerKind::Gimbal { default_q: Vec3::zeros() });
vector_coordinates!(Gimbal, GimbalMut, 3, Vec3);

mobilizer_view!(
    /// Unrestricted rotation about a common point
    Ball, BallMut, Ball
);
attach_constructors!(Ball, MobilizerKind::Ball { default_q: Vec3::zeros() });
vector_coordinates!(Ball, BallMut, 3, Vec3);

mobilizer_view!(
    /// Unrestricted translation without rotation
    Translation, TranslationMut, Translation
);
attach_constructors!(Translation, MobilizerKind::Translation { default_q: Vec3::zeros() });
vector_coordinates!(Translation, TranslationMut, 3, Vec3);

mobilizer_view!(
    /// Line orientation plus unrestricted translation
    FreeLine, FreeLineMut, FreeLine
);
attach_constructors!(FreeLine, MobilizerKind::FreeLine { default_q: Vector5::zeros() });
vector_coordinates!(FreeLine, FreeLineMut, 5, Vector5<Real>);

mobilizer_view!(
    /// Unrestricted rotation and translation
    Free, FreeMut, Free
);
attach_constructors!(Free, MobilizerKind::Free { default_q: Vector6::zeros() });
vector_coordinates!(Free, FreeMut, 6, Vector6<Real>);

mobilizer_view!(
    /// User-defined mobilizer with explicit coordinate and speed counts
    Custom, CustomMut, Custom
);

impl Custom<'_> {
    /// Creates a free custom mobilizer; panics on invalid counts
    #[allow(clippy::new_ret_no_self)]
    #[track_caller]
    pub fn new(n_mobilities: usize, n_coordinates: usize) -> MobilizedBody {
        require(Self::try_new(n_mobilities, n_coordinates))
    }

    /// Creates a free custom mobilizer
    pub fn try_new(n_mobilities: usize, n_coordinates: usize) -> Result<MobilizedBody> {
        let custom = CustomMobilizer::try_new(n_mobilities, n_coordinates)?;
        Ok(MobilizedBody::new(MobilizerKind::Custom(custom)))
    }

    /// Creates a custom mobilizer and adopts it as a child of `parent`
    #[track_caller]
    pub fn attach(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        body: Body,
        n_mobilities: usize,
        n_coordinates: usize,
    ) -> MobilizedBody {
        require(Self::try_attach(matter, parent, body, n_mobilities, n_coordinates))
    }

    /// Fallible form of `attach`
    pub fn try_attach(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        body: Body,
        n_mobilities: usize,
        n_coordinates: usize,
    ) -> Result<MobilizedBody> {
        let custom = CustomMobilizer::try_new(n_mobilities, n_coordinates)?;
        MobilizedBody::try_attach(matter, parent, MobilizerKind::Custom(custom), body)
    }

    /// Number of generalized speeds
    pub fn n_mobilities(&self) -> usize {
        self.mobod.nu()
    }

    /// Number of generalized coordinates
    pub fn n_coordinates(&self) -> usize {
        self.mobod.nq()
    }
}
