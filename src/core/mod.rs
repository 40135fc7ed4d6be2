pub mod config;
pub mod handle;
pub mod state;
pub mod storage;
pub mod subsystem;
mod topology;

pub use self::config::MatterConfig;
pub use self::handle::Handle;
pub use self::state::State;
pub use self::storage::{Arena, ArenaId};
pub use self::subsystem::{MatterSubsystem, StructuralEdit};
pub use self::topology::TopologyCache;

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Stable identifier of a mobilized body within its subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MobilizedBodyId(pub(crate) u32);

impl MobilizedBodyId {
    /// Ground is always the first mobilized body of a subsystem
    pub const GROUND: Self = Self(0);

    /// Returns the id as an index into per-body tables
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this is the ground id
    #[inline]
    pub fn is_ground(self) -> bool {
        self == Self::GROUND
    }
}

impl fmt::Display for MobilizedBodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MobilizedBody#{}", self.0)
    }
}

/// Stable identifier of a constraint within its subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ConstraintId(pub(crate) u32);

impl ConstraintId {
    /// Returns the id as an index into per-constraint tables
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constraint#{}", self.0)
    }
}

/// Identity of a `MatterSubsystem` instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SubsystemId(u32);

impl SubsystemId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
