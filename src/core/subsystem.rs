use nalgebra::DVector;
use tracing::{debug, trace, warn};

use crate::bodies::Body;
use crate::constraints::Constraint;
use crate::core::topology::TopologyEntry;
use crate::core::{
    Arena, ConstraintId, MatterConfig, MobilizedBodyId, State, SubsystemId, TopologyCache,
};
use crate::error::{require, MultibodyError, Result};
use crate::math::{Real, Transform};
use crate::mobilizers::{Adoption, MobilizedBody, MobilizerType};

/// The resolver that owns a kinematic tree of mobilized bodies and the
/// constraints between them
///
/// Every adopted mobilizer and constraint is owned by the subsystem; the
/// handles application code holds are aliases. Ids are assigned in adoption
/// order, starting with ground at id 0.
pub struct MatterSubsystem {
    /// Identity of this instance
    id: SubsystemId,

    /// Configuration for the subsystem
    config: MatterConfig,

    /// Owner handles of all mobilized bodies, indexed by id
    mobilized_bodies: Arena<MobilizedBodyId, MobilizedBody>,

    /// Owner handles of all constraints, indexed by id
    constraints: Arena<ConstraintId, Constraint>,

    /// Index tables, present only between realization and the next structural edit
    topology: Option<TopologyCache>,

    /// Bumped by every structural edit
    topology_version: u64,
}

impl MatterSubsystem {
    /// Creates a subsystem holding only ground, with default settings
    pub fn new() -> Self {
        Self::with_config(MatterConfig::default())
    }

    /// Creates a subsystem holding only ground
    pub fn with_config(config: MatterConfig) -> Self {
        let id = SubsystemId::next();
        let mut mobilized_bodies = Arena::with_capacity(config.capacity_hint);
        mobilized_bodies.add(MobilizedBody::ground(id));

        debug!(subsystem = %config.name, id = %id, "created matter subsystem");

        Self {
            id,
            config,
            mobilized_bodies,
            constraints: Arena::new(),
            topology: None,
            topology_version: 0,
        }
    }

    /// Returns the identity of this subsystem
    pub fn id(&self) -> SubsystemId {
        self.id
    }

    /// Returns true if `other` is this very subsystem instance
    pub fn is_same_subsystem(&self, other: &MatterSubsystem) -> bool {
        self.id == other.id
    }

    /// Returns a reference to the configuration
    pub fn get_config(&self) -> &MatterConfig {
        &self.config
    }

    // Tree access

    /// Returns an alias of the ground mobilized body
    pub fn ground(&self) -> MobilizedBody {
        self.mobilized_body(MobilizedBodyId::GROUND)
    }

    /// Returns an alias of the mobilized body with the given id
    #[track_caller]
    pub fn mobilized_body(&self, id: MobilizedBodyId) -> MobilizedBody {
        require(self.try_mobilized_body(id))
    }

    /// Fallible form of [`MatterSubsystem::mobilized_body`]
    pub fn try_mobilized_body(&self, id: MobilizedBodyId) -> Result<MobilizedBody> {
        self.mobilized_bodies
            .get(id)
            .cloned()
            .ok_or(MultibodyError::UnknownMobilizedBody(id))
    }

    /// Returns an alias of the constraint with the given id
    #[track_caller]
    pub fn constraint(&self, id: ConstraintId) -> Constraint {
        require(self.try_constraint(id))
    }

    /// Fallible form of [`MatterSubsystem::constraint`]
    pub fn try_constraint(&self, id: ConstraintId) -> Result<Constraint> {
        self.constraints
            .get(id)
            .cloned()
            .ok_or(MultibodyError::UnknownConstraint(id))
    }

    /// Number of mobilized bodies, ground included
    pub fn num_mobilized_bodies(&self) -> usize {
        self.mobilized_bodies.len()
    }

    /// Number of adopted constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Iterates over the ids of all mobilized bodies in id order
    pub fn mobilized_body_ids(&self) -> impl Iterator<Item = MobilizedBodyId> + '_ {
        self.mobilized_bodies.ids()
    }

    /// Iterates over the ids of all constraints in id order
    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.constraints.ids()
    }

    /// Returns the parent of a mobilized body; `None` for ground
    #[track_caller]
    pub fn inboard_mobilized_body(&self, id: MobilizedBodyId) -> Option<MobilizedBody> {
        self.mobilized_body(id)
            .inboard_mobilized_body_id()
            .map(|parent| self.mobilized_body(parent))
    }

    /// Returns the direct children of a mobilized body in id order
    pub fn children(&self, id: MobilizedBodyId) -> Vec<MobilizedBodyId> {
        self.mobilized_bodies
            .iter()
            .filter(|(_, mobod)| mobod.inboard_mobilized_body_id() == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    // Adoption

    /// Takes ownership of a free mobilizer and attaches it as a child of `parent`
    ///
    /// `child` must be the owner handle; afterwards it is an alias of the
    /// record now owned by the subsystem.
    #[track_caller]
    pub fn adopt_mobilized_body(&mut self, parent: MobilizedBodyId, child: &mut MobilizedBody) -> MobilizedBodyId {
        require(self.try_adopt_mobilized_body(parent, child))
    }

    /// Fallible form of [`MatterSubsystem::adopt_mobilized_body`]
    pub fn try_adopt_mobilized_body(
        &mut self,
        parent: MobilizedBodyId,
        child: &mut MobilizedBody,
    ) -> Result<MobilizedBodyId> {
        if !self.mobilized_bodies.contains(parent) {
            return Err(MultibodyError::UnknownMobilizedBody(parent));
        }
        let kind = {
            let record = child.try_record("adopt_mobilized_body")?;
            if record.adoption.is_some() {
                return Err(MultibodyError::AlreadyAdopted {
                    entity: "MobilizedBody",
                });
            }
            record.kind.kind_type()
        };
        if kind == MobilizerType::Ground {
            return Err(MultibodyError::Ground("cannot be attached to a parent"));
        }
        if !child.is_owner_handle() {
            return Err(MultibodyError::NotOwner {
                entity: "MobilizedBody",
            });
        }

        let id = self.mobilized_bodies.next_id();
        let mut owner = MobilizedBody::empty();
        child.try_disown(&mut owner)?;
        owner.set_adoption(Adoption {
            subsystem: self.id,
            id,
            parent: Some(parent),
        })?;
        self.mobilized_bodies.add(owner);
        self.invalidate_topology_cache();

        debug!(subsystem = %self.config.name, id = %id, parent = %parent, kind = %kind, "adopted mobilized body");
        Ok(id)
    }

    /// Takes ownership of a free constraint
    ///
    /// Both bodies must belong to this subsystem. `constraint` must be the
    /// owner handle and is left an alias.
    #[track_caller]
    pub fn adopt_constraint(&mut self, constraint: &mut Constraint) -> ConstraintId {
        require(self.try_adopt_constraint(constraint))
    }

    /// Fallible form of [`MatterSubsystem::adopt_constraint`]
    pub fn try_adopt_constraint(&mut self, constraint: &mut Constraint) -> Result<ConstraintId> {
        let (kind, subsystem, body1, body2) = {
            let record = constraint.try_read("adopt_constraint")?;
            if record.adoption.is_some() {
                return Err(MultibodyError::AlreadyAdopted {
                    entity: "Constraint",
                });
            }
            (record.kind.name(), record.subsystem, record.body1, record.body2)
        };
        if subsystem != self.id {
            return Err(MultibodyError::ForeignSubsystem {
                expected: self.id,
                found: subsystem,
            });
        }
        for body in [body1, body2] {
            if !self.mobilized_bodies.contains(body) {
                return Err(MultibodyError::UnknownMobilizedBody(body));
            }
        }
        if body1 == body2 {
            if !self.config.allow_self_constraints {
                return Err(MultibodyError::SelfConstraint { kind, body: body1 });
            }
            warn!(subsystem = %self.config.name, kind, body = %body1, "constraint connects a body to itself");
        }
        if !constraint.is_owner_handle() {
            return Err(MultibodyError::NotOwner { entity: "Constraint" });
        }

        let id = self.constraints.next_id();
        let mut owner = Constraint::empty();
        constraint.try_disown(&mut owner)?;
        owner.set_adoption(id)?;
        self.constraints.add(owner);

        debug!(subsystem = %self.config.name, id = %id, kind, body1 = %body1, body2 = %body2, "adopted constraint");
        Ok(id)
    }

    // Structural edits

    /// Opens a structural edit of an adopted mobilized body
    ///
    /// Discards the topology cache; the returned guard holds the subsystem
    /// exclusively until dropped, so no index lookup can observe a half-done
    /// edit.
    #[track_caller]
    pub fn edit_mobilized_body(&mut self, id: MobilizedBodyId) -> StructuralEdit<'_> {
        require(self.try_edit_mobilized_body(id))
    }

    /// Fallible form of [`MatterSubsystem::edit_mobilized_body`]
    pub fn try_edit_mobilized_body(&mut self, id: MobilizedBodyId) -> Result<StructuralEdit<'_>> {
        if id.is_ground() {
            return Err(MultibodyError::Ground("cannot be edited"));
        }
        if !self.mobilized_bodies.contains(id) {
            return Err(MultibodyError::UnknownMobilizedBody(id));
        }
        self.invalidate_topology_cache();

        let mobod = self
            .mobilized_bodies
            .get(id)
            .ok_or(MultibodyError::UnknownMobilizedBody(id))?;
        Ok(StructuralEdit { mobod })
    }

    /// Discards the topology cache and starts a new topology version
    ///
    /// States allocated before this call become stale.
    pub fn invalidate_topology_cache(&mut self) {
        self.topology = None;
        self.topology_version += 1;
        trace!(subsystem = %self.config.name, version = self.topology_version, "topology cache invalidated");
    }

    /// Returns true if the index tables are realized for the current tree
    pub fn is_topology_cache_valid(&self) -> bool {
        self.topology.is_some()
    }

    /// Current topology version
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    /// Returns the realized index tables, if any
    pub fn topology(&self) -> Option<&TopologyCache> {
        self.topology.as_ref()
    }

    /// Builds the index tables for the current tree, if not already built
    pub fn realize_topology(&mut self) -> &TopologyCache {
        let version = self.topology_version;
        let name = &self.config.name;
        let bodies = &self.mobilized_bodies;

        self.topology.get_or_insert_with(|| {
            let cache = TopologyCache::build(
                version,
                bodies.iter().map(|(id, mobod)| {
                    let record = mobod.record();
                    TopologyEntry {
                        id,
                        parent: record.adoption.and_then(|adoption| adoption.parent),
                        nq: record.kind.nq(),
                        nu: record.kind.nu(),
                    }
                }),
            );
            debug!(
                subsystem = %name,
                version,
                bodies = cache.num_mobilized_bodies(),
                nq = cache.nq(),
                nu = cache.nu(),
                "realized topology"
            );
            cache
        })
    }

    /// Realizes the topology and allocates a state holding every mobilizer's
    /// default coordinates, with zero speeds and forces
    pub fn default_state(&mut self) -> State {
        let (nq, nu) = {
            let topology = self.realize_topology();
            (topology.nq(), topology.nu())
        };
        let mut state = State::new(self.id, self.topology_version, nq, nu);

        if let Some(topology) = &self.topology {
            for (id, mobod) in self.mobilized_bodies.iter() {
                if let Some((start, n)) = topology.q_range(id) {
                    state.upd_q()[start..start + n].copy_from_slice(&mobod.default_q());
                }
            }
        }
        state
    }

    // Index lookup

    fn checked_topology(&self, state: &State) -> Result<&TopologyCache> {
        let topology = self
            .topology
            .as_ref()
            .ok_or(MultibodyError::TopologyNotRealized(self.id))?;
        if state.subsystem_id() != self.id {
            return Err(MultibodyError::ForeignSubsystem {
                expected: self.id,
                found: state.subsystem_id(),
            });
        }
        if state.topology_version() != topology.version() {
            return Err(MultibodyError::StaleState {
                state_subsystem: state.subsystem_id(),
                state_version: state.topology_version(),
                subsystem: self.id,
                version: topology.version(),
            });
        }
        if state.nq() != topology.nq()
            || state.nu() != topology.nu()
            || state.mobility_forces().len() != topology.nu()
        {
            return Err(MultibodyError::StateShape {
                nq: state.nq(),
                nu: state.nu(),
                expected_nq: topology.nq(),
                expected_nu: topology.nu(),
            });
        }
        Ok(topology)
    }

    /// Start offset and count of a mobilizer's coordinates in `state`
    #[track_caller]
    pub fn find_mobilizer_qs(&self, state: &State, id: MobilizedBodyId) -> (usize, usize) {
        require(self.try_find_mobilizer_qs(state, id))
    }

    /// Fallible form of [`MatterSubsystem::find_mobilizer_qs`]
    pub fn try_find_mobilizer_qs(&self, state: &State, id: MobilizedBodyId) -> Result<(usize, usize)> {
        self.checked_topology(state)?
            .q_range(id)
            .ok_or(MultibodyError::UnknownMobilizedBody(id))
    }

    /// Start offset and count of a mobilizer's speeds in `state`
    #[track_caller]
    pub fn find_mobilizer_us(&self, state: &State, id: MobilizedBodyId) -> (usize, usize) {
        require(self.try_find_mobilizer_us(state, id))
    }

    /// Fallible form of [`MatterSubsystem::find_mobilizer_us`]
    pub fn try_find_mobilizer_us(&self, state: &State, id: MobilizedBodyId) -> Result<(usize, usize)> {
        self.checked_topology(state)?
            .u_range(id)
            .ok_or(MultibodyError::UnknownMobilizedBody(id))
    }

    // Whole-state arrays, checked against the current topology

    /// Returns all generalized coordinates of `state`
    #[track_caller]
    pub fn get_q<'s>(&self, state: &'s State) -> &'s DVector<Real> {
        require(self.checked_topology(state));
        state.q()
    }

    /// Returns all generalized coordinates of `state` for modification
    #[track_caller]
    pub fn upd_q<'s>(&self, state: &'s mut State) -> &'s mut [Real] {
        require(self.checked_topology(state));
        state.upd_q()
    }

    /// Returns all generalized speeds of `state`
    #[track_caller]
    pub fn get_u<'s>(&self, state: &'s State) -> &'s DVector<Real> {
        require(self.checked_topology(state));
        state.u()
    }

    /// Returns all generalized speeds of `state` for modification
    #[track_caller]
    pub fn upd_u<'s>(&self, state: &'s mut State) -> &'s mut [Real] {
        require(self.checked_topology(state));
        state.upd_u()
    }

    /// Returns all applied mobility forces of `state`
    #[track_caller]
    pub fn get_mobility_forces<'s>(&self, state: &'s State) -> &'s DVector<Real> {
        require(self.checked_topology(state));
        state.mobility_forces()
    }

    /// Returns all applied mobility forces of `state` for modification
    #[track_caller]
    pub fn upd_mobility_forces<'s>(&self, state: &'s mut State) -> &'s mut [Real] {
        require(self.checked_topology(state));
        state.upd_mobility_forces()
    }
}

impl Default for MatterSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatterSubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatterSubsystem")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("mobilized_bodies", &self.mobilized_bodies.len())
            .field("constraints", &self.constraints.len())
            .field("topology_version", &self.topology_version)
            .field("realized", &self.topology.is_some())
            .finish()
    }
}

/// Exclusive access to an adopted mobilized body's topology-affecting defaults
///
/// Obtained from [`MatterSubsystem::edit_mobilized_body`], which has already
/// discarded the topology cache.
#[derive(Debug)]
pub struct StructuralEdit<'a> {
    mobod: &'a MobilizedBody,
}

impl StructuralEdit<'_> {
    /// Id of the mobilized body being edited
    pub fn mobilized_body_id(&self) -> MobilizedBodyId {
        self.mobod.mobilized_body_id()
    }

    /// Sets the pose of F on the parent body
    #[track_caller]
    pub fn set_default_inboard_frame(&mut self, frame: Transform) -> &mut Self {
        require(self.mobod.try_write("set_default_inboard_frame")).default_inboard_frame = frame;
        self
    }

    /// Sets the pose of M on this body
    #[track_caller]
    pub fn set_default_outboard_frame(&mut self, frame: Transform) -> &mut Self {
        require(self.mobod.try_write("set_default_outboard_frame")).default_outboard_frame = frame;
        self
    }

    /// Replaces the mass description
    #[track_caller]
    pub fn set_body(&mut self, body: Body) -> &mut Self {
        require(self.mobod.try_write("set_body")).body = body;
        self
    }

    /// Replaces the default coordinates; `q` must have exactly `nq` values
    #[track_caller]
    pub fn set_default_q(&mut self, q: &[Real]) -> &mut Self {
        require(self.try_set_default_q(q));
        self
    }

    /// Fallible form of [`StructuralEdit::set_default_q`]
    pub fn try_set_default_q(&mut self, q: &[Real]) -> Result<()> {
        self.mobod.try_write("set_default_q")?.kind.set_default_q(q)
    }

    /// Replaces the pitch of a screw mobilizer
    #[track_caller]
    pub fn set_default_pitch(&mut self, pitch: Real) -> &mut Self {
        require(self.try_set_default_pitch(pitch));
        self
    }

    /// Fallible form of [`StructuralEdit::set_default_pitch`]
    pub fn try_set_default_pitch(&mut self, pitch: Real) -> Result<()> {
        self.mobod.try_write("set_default_pitch")?.kind.set_pitch(pitch)
    }
}
