use crate::bodies::MassProperties;
use crate::error::{MultibodyError, Result};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Mass description carried by a mobilized body
///
/// `Body` has value semantics: cloning it copies the mass properties, so a
/// mobilized body never shares its `Body` with anything else.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Body {
    /// An ordinary rigid body
    Rigid(MassProperties),

    /// The immovable ground body
    Ground,
}

impl Body {
    /// Creates a rigid body with the given mass properties
    pub fn rigid(mass_properties: MassProperties) -> Self {
        Self::Rigid(mass_properties)
    }

    /// Creates the ground body
    pub fn ground() -> Self {
        Self::Ground
    }

    /// Returns the kind name of the body
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Rigid(_) => "Rigid",
            Self::Ground => "Ground",
        }
    }

    /// Returns true if this is a rigid body
    pub fn is_rigid(&self) -> bool {
        matches!(self, Self::Rigid(_))
    }

    /// Returns true if this is the ground body
    pub fn is_ground(&self) -> bool {
        matches!(self, Self::Ground)
    }

    /// Narrows to the rigid body's mass properties
    pub fn as_rigid(&self) -> Option<&MassProperties> {
        match self {
            Self::Rigid(mass_properties) => Some(mass_properties),
            Self::Ground => None,
        }
    }

    /// Narrows to the rigid body's mass properties for modification
    pub fn as_rigid_mut(&mut self) -> Option<&mut MassProperties> {
        match self {
            Self::Rigid(mass_properties) => Some(mass_properties),
            Self::Ground => None,
        }
    }

    /// Returns the default mass properties; ground reports infinite mass
    pub fn default_rigid_body_mass_properties(&self) -> MassProperties {
        match self {
            Self::Rigid(mass_properties) => *mass_properties,
            Self::Ground => MassProperties::infinite(),
        }
    }

    /// Replaces the mass properties of a rigid body
    #[track_caller]
    pub fn set_default_mass_properties(&mut self, mass_properties: MassProperties) -> &mut Self {
        crate::error::require(self.try_set_default_mass_properties(mass_properties));
        self
    }

    /// Replaces the mass properties of a rigid body, failing on ground
    pub fn try_set_default_mass_properties(&mut self, mass_properties: MassProperties) -> Result<()> {
        match self.as_rigid_mut() {
            Some(current) => {
                *current = mass_properties;
                Ok(())
            }
            None => Err(MultibodyError::WrongKind {
                expected: "Rigid",
                actual: "Ground",
            }),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::Rigid(MassProperties::default())
    }
}
