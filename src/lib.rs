pub mod math;
pub mod error;
pub mod core;
pub mod bodies;
pub mod mobilizers;
pub mod constraints;

/// Re-export common types for easier usage
pub use crate::bodies::{Body, MassProperties};
pub use crate::constraints::{Constraint, ConstraintKind, ConstraintType};
pub use crate::core::{
    ConstraintId, MatterConfig, MatterSubsystem, MobilizedBodyId, State, StructuralEdit, SubsystemId,
};
pub use crate::error::{MultibodyError, Result};
pub use crate::math::{Real, Transform, Vec3};
pub use crate::mobilizers::{MobilizedBody, MobilizerKind, MobilizerType, MotionFlags};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
