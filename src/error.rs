//! Error types for handle, topology and catalogue operations.
//!
//! Every variant is a caller programming error. The plain entry points of the
//! crate panic with the variant's message; the `try_*` twins hand it back.

use thiserror::Error;

use crate::core::{ConstraintId, MobilizedBodyId, SubsystemId};
use crate::math::Real;

/// Errors raised by precondition checks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MultibodyError {
    /// Subsystem-relative information requested from a free handle.
    #[error("{operation}() called on a {entity} that is not part of a subsystem")]
    NotInSubsystem {
        /// The operation that was attempted.
        operation: &'static str,
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// The handle has no record.
    #[error("{operation}() called on an empty {entity} handle")]
    EmptyHandle {
        /// The operation that was attempted.
        operation: &'static str,
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// The owner handle was dropped and the record released.
    #[error("{entity} handle refers to a record released by its owner")]
    ReleasedRecord {
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// `disown` from an empty or non-owner handle.
    #[error("disown() not allowed for an empty or non-owner {entity} handle")]
    NotOwner {
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// `disown` onto a handle that already refers to a record.
    #[error("disown() can only transfer ownership to an empty {entity} handle")]
    TargetNotEmpty {
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// Reference assignment onto an owner handle.
    #[error("you can't reassign the owner handle of a {entity}")]
    ReassignOwner {
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// The handle is already part of a subsystem.
    #[error("{entity} is already part of a subsystem")]
    AlreadyAdopted {
        /// "MobilizedBody" or "Constraint".
        entity: &'static str,
    },

    /// An adopted mobilizer may only be edited through its subsystem.
    #[error("{operation}() on an adopted MobilizedBody must go through MatterSubsystem::edit_mobilized_body, which invalidates the topology cache")]
    AdoptedEdit {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// No mobilized body with this id.
    #[error("unknown mobilized body id {0}")]
    UnknownMobilizedBody(MobilizedBodyId),

    /// No constraint with this id.
    #[error("unknown constraint id {0}")]
    UnknownConstraint(ConstraintId),

    /// The handle belongs to another subsystem instance.
    #[error("handle belongs to subsystem {found}, not {expected}")]
    ForeignSubsystem {
        /// Subsystem the operation was invoked on.
        expected: SubsystemId,
        /// Subsystem the handle belongs to.
        found: SubsystemId,
    },

    /// A constraint body is not adopted yet.
    #[error("Constraint::{kind}(): both bodies must already be in a MatterSubsystem")]
    ConstraintBodyNotAdopted {
        /// Constraint kind being constructed.
        kind: &'static str,
    },

    /// The two constraint bodies live in different subsystems.
    #[error("Constraint::{kind}(): both bodies to be connected must be in the same MatterSubsystem")]
    DifferentSubsystems {
        /// Constraint kind being constructed.
        kind: &'static str,
    },

    /// A constraint connecting a body to itself.
    #[error("Constraint::{kind}(): body1 and body2 are both {body}")]
    SelfConstraint {
        /// Constraint kind being constructed.
        kind: &'static str,
        /// The repeated body.
        body: MobilizedBodyId,
    },

    /// Rod length must be strictly positive.
    #[error("Constraint::Rod(): rod length must always be greater than zero, got {0}")]
    NonPositiveRodLength(Real),

    /// Narrowing to a kind the handle does not hold.
    #[error("downcast to {expected} but the handle holds {actual}")]
    WrongKind {
        /// Requested kind.
        expected: &'static str,
        /// Kind actually held.
        actual: &'static str,
    },

    /// Ground is the root; it has no parent and no editable geometry.
    #[error("the ground mobilized body {0}")]
    Ground(&'static str),

    /// Index lookups need a realized topology.
    #[error("topology of subsystem {0} is not realized; call realize_topology() first")]
    TopologyNotRealized(SubsystemId),

    /// The state was allocated for another topology.
    #[error("state was realized for subsystem {state_subsystem} topology v{state_version}, current is subsystem {subsystem} v{version}")]
    StaleState {
        /// Subsystem the state was allocated by.
        state_subsystem: SubsystemId,
        /// Topology version the state was allocated for.
        state_version: u64,
        /// Subsystem being queried.
        subsystem: SubsystemId,
        /// Current topology version.
        version: u64,
    },

    /// The state's arrays do not match the realized topology.
    #[error("state holds {nq} coordinates and {nu} speeds, topology needs {expected_nq} and {expected_nu}")]
    StateShape {
        /// Coordinates held by the state.
        nq: usize,
        /// Speeds held by the state.
        nu: usize,
        /// Coordinates required by the topology.
        expected_nq: usize,
        /// Speeds required by the topology.
        expected_nu: usize,
    },

    /// Wrong number of values for a coordinate block.
    #[error("expected {expected} coordinates, got {got}")]
    CoordinateCount {
        /// Width of the coordinate block.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Custom mobilizer counts out of range.
    #[error("custom mobilizer needs 1 <= nu <= 6 and nu <= nq <= 7, got nu={n_mobilities}, nq={n_coordinates}")]
    InvalidCustomCounts {
        /// Requested mobilities.
        n_mobilities: usize,
        /// Requested coordinates.
        n_coordinates: usize,
    },

    /// Mass properties failed validation.
    #[error("invalid mass properties: {0}")]
    InvalidMassProperties(String),
}

/// Result type for multibody operations
pub type Result<T> = std::result::Result<T, MultibodyError>;

/// Unwraps a precondition check, treating a failure as a fatal caller bug.
#[track_caller]
pub(crate) fn require<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
