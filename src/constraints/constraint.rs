use std::cell::{Ref, RefMut};
use std::fmt;

use crate::core::handle::Record;
use crate::core::{ConstraintId, Handle, MatterSubsystem, MobilizedBodyId, SubsystemId};
use crate::error::{require, MultibodyError, Result};
use crate::math::{Real, Transform, Vec3};
use crate::mobilizers::MobilizedBody;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Tag naming a constraint kind without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ConstraintType {
    Rod,
    Ball,
    Weld,
}

impl ConstraintType {
    /// Returns the kind name
    pub fn name(self) -> &'static str {
        match self {
            Self::Rod => "Rod",
            Self::Ball => "Ball",
            Self::Weld => "Weld",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The constraint catalogue with each kind's default geometry
///
/// Points are expressed in their body's frame; frames give a pose on their body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ConstraintKind {
    /// Keeps two points a fixed distance apart
    Rod { point1: Vec3, point2: Vec3, length: Real },

    /// Keeps two points coincident
    Ball { point1: Vec3, point2: Vec3 },

    /// Keeps two frames coincident
    Weld { frame1: Transform, frame2: Transform },
}

impl ConstraintKind {
    /// Returns the kind tag
    pub fn kind_type(&self) -> ConstraintType {
        match self {
            Self::Rod { .. } => ConstraintType::Rod,
            Self::Ball { .. } => ConstraintType::Ball,
            Self::Weld { .. } => ConstraintType::Weld,
        }
    }

    /// Returns the kind name
    pub fn name(&self) -> &'static str {
        self.kind_type().name()
    }
}

/// Data shared by every handle referring to one constraint
#[derive(Debug, Clone)]
pub struct ConstraintRecord {
    pub(crate) kind: ConstraintKind,
    pub(crate) body1: MobilizedBodyId,
    pub(crate) body2: MobilizedBodyId,
    pub(crate) subsystem: SubsystemId,
    pub(crate) adoption: Option<ConstraintId>,
}

impl ConstraintRecord {
    /// Returns the kind and its default geometry
    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }
}

impl Record for ConstraintRecord {
    const ENTITY: &'static str = "Constraint";
}

/// Generic handle to a constraint between two mobilized bodies
///
/// A constraint records the ids of its bodies, not handles, so it never
/// keeps a mobilized body alive. Cloning yields a non-owning alias.
#[derive(Debug, Clone, Default)]
pub struct Constraint {
    handle: Handle<ConstraintRecord>,
}

impl Constraint {
    /// Creates an empty handle
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates the bodies, then creates the record and adopts it into `matter`
    pub(crate) fn try_create(
        matter: &mut MatterSubsystem,
        body1: &MobilizedBody,
        body2: &MobilizedBody,
        kind: ConstraintKind,
    ) -> Result<Self> {
        let name = kind.name();
        if !body1.is_in_subsystem() || !body2.is_in_subsystem() {
            return Err(MultibodyError::ConstraintBodyNotAdopted { kind: name });
        }
        if !body1.is_in_same_subsystem(body2) {
            return Err(MultibodyError::DifferentSubsystems { kind: name });
        }
        if let ConstraintKind::Rod { length, .. } = kind {
            if length <= 0.0 {
                return Err(MultibodyError::NonPositiveRodLength(length));
            }
        }

        let body1 = body1.member_id(matter, name)?;
        let body2 = body2.member_id(matter, name)?;
        let mut constraint = Self {
            handle: Handle::owning(ConstraintRecord {
                kind,
                body1,
                body2,
                subsystem: matter.id(),
                adoption: None,
            }),
        };
        matter.try_adopt_constraint(&mut constraint)?;
        Ok(constraint)
    }

    // Ownership

    /// Returns true if this handle has no record
    pub fn is_empty_handle(&self) -> bool {
        self.handle.is_empty_handle()
    }

    /// Returns true if this handle is the designated owner of its record
    pub fn is_owner_handle(&self) -> bool {
        self.handle.is_owner_handle()
    }

    /// Returns true if both handles refer to the same constraint
    pub fn same_record(&self, other: &Constraint) -> bool {
        self.handle.same_record(&other.handle)
    }

    /// Transfers ownership to the empty handle `new_owner`; this handle becomes an alias
    #[track_caller]
    pub fn disown(&mut self, new_owner: &mut Constraint) {
        require(self.try_disown(new_owner))
    }

    /// Fallible form of [`Constraint::disown`]
    pub fn try_disown(&mut self, new_owner: &mut Constraint) -> Result<()> {
        self.handle.try_disown(&mut new_owner.handle)
    }

    /// Makes this empty or non-owner handle alias the constraint of `src`
    #[track_caller]
    pub fn assign_from(&mut self, src: &Constraint) -> &mut Self {
        require(self.try_assign_from(src));
        self
    }

    /// Fallible form of [`Constraint::assign_from`]
    pub fn try_assign_from(&mut self, src: &Constraint) -> Result<()> {
        self.handle.try_assign_from(&src.handle)
    }

    // Record access

    pub(crate) fn try_read(&self, operation: &'static str) -> Result<Ref<'_, ConstraintRecord>> {
        self.handle.try_read(operation)
    }

    pub(crate) fn try_write(&self, operation: &'static str) -> Result<RefMut<'_, ConstraintRecord>> {
        self.handle.try_write(operation)
    }

    #[track_caller]
    pub(crate) fn read(&self, operation: &'static str) -> Ref<'_, ConstraintRecord> {
        require(self.try_read(operation))
    }

    #[track_caller]
    pub(crate) fn record_mut(&self, operation: &'static str) -> RefMut<'_, ConstraintRecord> {
        require(self.try_write(operation))
    }

    /// Borrows the underlying record
    #[track_caller]
    pub fn record(&self) -> Ref<'_, ConstraintRecord> {
        self.read("record")
    }

    pub(crate) fn set_adoption(&mut self, id: ConstraintId) -> Result<()> {
        let mut record = self.try_write("adopt")?;
        if record.adoption.is_some() {
            return Err(MultibodyError::AlreadyAdopted { entity: "Constraint" });
        }
        record.adoption = Some(id);
        Ok(())
    }

    // Subsystem membership

    /// Returns true if this constraint has been adopted by a subsystem
    pub fn is_in_subsystem(&self) -> bool {
        self.try_read("is_in_subsystem")
            .map(|record| record.adoption.is_some())
            .unwrap_or(false)
    }

    /// Returns true if this constraint and `body` are adopted by the same subsystem
    pub fn is_in_same_subsystem(&self, body: &MobilizedBody) -> bool {
        match (self.try_subsystem_id(), body.try_subsystem_id()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Identity of the owning subsystem
    #[track_caller]
    pub fn subsystem_id(&self) -> SubsystemId {
        require(self.try_subsystem_id())
    }

    /// Fallible form of [`Constraint::subsystem_id`]
    pub fn try_subsystem_id(&self) -> Result<SubsystemId> {
        let record = self.try_read("subsystem_id")?;
        match record.adoption {
            Some(_) => Ok(record.subsystem),
            None => Err(MultibodyError::NotInSubsystem {
                operation: "subsystem_id",
                entity: "Constraint",
            }),
        }
    }

    /// Identifier assigned at adoption
    #[track_caller]
    pub fn constraint_id(&self) -> ConstraintId {
        require(self.try_constraint_id())
    }

    /// Fallible form of [`Constraint::constraint_id`]
    pub fn try_constraint_id(&self) -> Result<ConstraintId> {
        self.try_read("constraint_id")?
            .adoption
            .ok_or(MultibodyError::NotInSubsystem {
                operation: "constraint_id",
                entity: "Constraint",
            })
    }

    // Kind and bodies

    /// Borrows the kind and its default geometry
    #[track_caller]
    pub fn kind(&self) -> Ref<'_, ConstraintKind> {
        Ref::map(self.read("kind"), |record| &record.kind)
    }

    /// Returns the kind tag
    #[track_caller]
    pub fn kind_type(&self) -> ConstraintType {
        require(self.try_kind_type())
    }

    /// Fallible form of [`Constraint::kind_type`]
    pub fn try_kind_type(&self) -> Result<ConstraintType> {
        Ok(self.try_read("kind_type")?.kind.kind_type())
    }

    /// Id of the first constrained body
    #[track_caller]
    pub fn body1_id(&self) -> MobilizedBodyId {
        self.read("body1_id").body1
    }

    /// Id of the second constrained body
    #[track_caller]
    pub fn body2_id(&self) -> MobilizedBodyId {
        self.read("body2_id").body2
    }
}

pub(crate) fn check_kind(constraint: &Constraint, expected: ConstraintType) -> Result<()> {
    let actual = constraint.try_kind_type()?;
    if actual != expected {
        return Err(MultibodyError::WrongKind {
            expected: expected.name(),
            actual: actual.name(),
        });
    }
    Ok(())
}
