//! The constraint catalogue: the generic `Constraint` handle and typed views
//! for rods, ball joints and welds between two mobilized bodies.

macro_rules! constraint_view {
    ($(#[$attr:meta])* $view:ident, $view_mut:ident, $kind:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy)]
        pub struct $view<'a> {
            constraint: &'a Constraint,
        }

        #[doc = concat!("Exclusive view of a [`", stringify!($view), "`] constraint")]
        #[derive(Debug)]
        pub struct $view_mut<'a> {
            constraint: &'a mut Constraint,
        }

        impl<'a> $view<'a> {
            #[doc = concat!("Returns true if `constraint` holds a ", stringify!($kind), " constraint")]
            pub fn is_instance_of(constraint: &Constraint) -> bool {
                check_kind(constraint, ConstraintType::$kind).is_ok()
            }

            /// Narrows a generic handle; panics if it holds another kind
            #[track_caller]
            pub fn downcast(constraint: &'a Constraint) -> Self {
                require(Self::try_downcast(constraint))
            }

            /// Narrows a generic handle
            pub fn try_downcast(constraint: &'a Constraint) -> Result<Self> {
                check_kind(constraint, ConstraintType::$kind)?;
                Ok(Self { constraint })
            }

            /// Narrows a generic handle for modification; panics if it holds another kind
            #[track_caller]
            pub fn upd_downcast(constraint: &'a mut Constraint) -> $view_mut<'a> {
                require(Self::try_upd_downcast(constraint))
            }

            /// Narrows a generic handle for modification
            pub fn try_upd_downcast(constraint: &'a mut Constraint) -> Result<$view_mut<'a>> {
                check_kind(constraint, ConstraintType::$kind)?;
                Ok($view_mut { constraint })
            }

            /// The generic handle behind this view
            pub fn constraint(&self) -> &'a Constraint {
                self.constraint
            }
        }

        impl $view_mut<'_> {
            /// Reborrows as a shared view
            pub fn as_view(&self) -> $view<'_> {
                $view { constraint: &*self.constraint }
            }
        }

        impl std::ops::Deref for $view<'_> {
            type Target = Constraint;

            fn deref(&self) -> &Constraint {
                self.constraint
            }
        }

        impl std::ops::Deref for $view_mut<'_> {
            type Target = Constraint;

            fn deref(&self) -> &Constraint {
                &*self.constraint
            }
        }

        impl std::ops::DerefMut for $view_mut<'_> {
            fn deref_mut(&mut self) -> &mut Constraint {
                self.constraint
            }
        }
    };
}

mod ball;
mod constraint;
mod rod;
mod weld;

pub use self::ball::{Ball, BallMut};
pub use self::constraint::{Constraint, ConstraintKind, ConstraintRecord, ConstraintType};
pub use self::rod::{Rod, RodMut};
pub use self::weld::{Weld, WeldMut};
