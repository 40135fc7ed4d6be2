use nalgebra::DVector;

use crate::core::SubsystemId;
use crate::math::Real;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Per-simulation mutable state of a matter subsystem
///
/// Holds the flat generalized coordinate, speed and applied mobility force
/// arrays. Slices of these arrays belong to individual mobilizers at offsets
/// the subsystem computes from its realized topology. The array lengths are
/// fixed at allocation; the `upd_*` accessors hand out slices so they stay
/// that way.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct State {
    subsystem: SubsystemId,
    topology_version: u64,
    q: DVector<Real>,
    u: DVector<Real>,
    mobility_forces: DVector<Real>,
}

impl State {
    pub(crate) fn new(subsystem: SubsystemId, topology_version: u64, nq: usize, nu: usize) -> Self {
        Self {
            subsystem,
            topology_version,
            q: DVector::zeros(nq),
            u: DVector::zeros(nu),
            mobility_forces: DVector::zeros(nu),
        }
    }

    /// Returns the subsystem that allocated this state
    pub fn subsystem_id(&self) -> SubsystemId {
        self.subsystem
    }

    /// Returns the topology version this state was allocated for
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    /// Total number of generalized coordinates
    pub fn nq(&self) -> usize {
        self.q.len()
    }

    /// Total number of generalized speeds
    pub fn nu(&self) -> usize {
        self.u.len()
    }

    /// Returns the generalized coordinates
    pub fn q(&self) -> &DVector<Real> {
        &self.q
    }

    /// Returns the generalized coordinates for modification
    pub fn upd_q(&mut self) -> &mut [Real] {
        self.q.as_mut_slice()
    }

    /// Returns the generalized speeds
    pub fn u(&self) -> &DVector<Real> {
        &self.u
    }

    /// Returns the generalized speeds for modification
    pub fn upd_u(&mut self) -> &mut [Real] {
        self.u.as_mut_slice()
    }

    /// Returns the applied mobility forces, one per generalized speed
    pub fn mobility_forces(&self) -> &DVector<Real> {
        &self.mobility_forces
    }

    /// Returns the applied mobility forces for modification
    pub fn upd_mobility_forces(&mut self) -> &mut [Real] {
        self.mobility_forces.as_mut_slice()
    }

    /// Zeroes all applied mobility forces
    pub fn clear_mobility_forces(&mut self) {
        self.mobility_forces.fill(0.0);
    }
}
