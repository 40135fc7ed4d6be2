//! The mobilizer catalogue: the generic `MobilizedBody` handle, the closed set
//! of kinds it can hold, and typed views reaching each kind's API.

mod kind;
mod mobilized_body;
mod record;
mod views;

pub use self::kind::{CustomMobilizer, MobilizerKind, MobilizerType};
pub use self::mobilized_body::MobilizedBody;
pub use self::motion_flags::MotionFlags;
pub use self::record::MobilizerRecord;
pub use self::views::*;

pub(crate) use self::record::Adoption;

/// Flags describing which relative motions a mobilizer permits
pub mod motion_flags {
    use bitflags::bitflags;

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct MotionFlags: u8 {
            /// The outboard frame can rotate relative to the inboard frame
            const ROTATION = 0x01;
            /// The outboard frame can translate relative to the inboard frame
            const TRANSLATION = 0x02;
        }
    }
}
