use approx::relative_eq;

use crate::error::{MultibodyError, Result};
use crate::math::{Inertia, Real, Vec3};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Mass, center of mass and inertia of a rigid body, in the body frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MassProperties {
    mass: Real,
    center_of_mass: Vec3,
    inertia: Inertia,
}

impl MassProperties {
    /// Creates mass properties, panicking if they are not physical
    #[track_caller]
    pub fn new(mass: Real, center_of_mass: Vec3, inertia: Inertia) -> Self {
        crate::error::require(Self::try_new(mass, center_of_mass, inertia))
    }

    /// Creates mass properties after validating them
    ///
    /// The mass must be finite and non-negative, and the inertia symmetric.
    pub fn try_new(mass: Real, center_of_mass: Vec3, inertia: Inertia) -> Result<Self> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(MultibodyError::InvalidMassProperties(format!(
                "mass must be finite and non-negative, got {mass}"
            )));
        }
        if !relative_eq!(inertia, inertia.transpose(), epsilon = 1.0e-9) {
            return Err(MultibodyError::InvalidMassProperties(String::from(
                "inertia tensor must be symmetric",
            )));
        }
        Ok(Self {
            mass,
            center_of_mass,
            inertia,
        })
    }

    /// Point mass located at `center_of_mass`
    pub fn point_mass(mass: Real, center_of_mass: Vec3) -> Self {
        Self::new(mass, center_of_mass, Inertia::zeros())
    }

    /// Solid sphere of the given mass and radius, centered at the body origin
    pub fn solid_sphere(mass: Real, radius: Real) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self::new(mass, Vec3::zeros(), Inertia::from_diagonal_element(i))
    }

    /// Infinite mass and inertia, as carried by ground
    pub fn infinite() -> Self {
        Self {
            mass: Real::INFINITY,
            center_of_mass: Vec3::zeros(),
            inertia: Inertia::from_diagonal_element(Real::INFINITY),
        }
    }

    /// Returns the mass
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// Returns the center of mass in the body frame
    pub fn center_of_mass(&self) -> Vec3 {
        self.center_of_mass
    }

    /// Returns the inertia tensor about the body origin
    pub fn inertia(&self) -> Inertia {
        self.inertia
    }

    /// Returns true if the mass is infinite
    pub fn is_infinite(&self) -> bool {
        self.mass.is_infinite()
    }
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 0.0,
            center_of_mass: Vec3::zeros(),
            inertia: Inertia::zeros(),
        }
    }
}
