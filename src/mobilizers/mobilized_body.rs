use std::cell::{Ref, RefMut};

use crate::bodies::Body;
use crate::core::{Handle, MatterSubsystem, MobilizedBodyId, State, SubsystemId};
use crate::error::{require, MultibodyError, Result};
use crate::math::{Real, Transform};
use crate::mobilizers::motion_flags::MotionFlags;
use crate::mobilizers::record::{Adoption, MobilizerRecord};
use crate::mobilizers::{MobilizerKind, MobilizerType};

/// Generic handle to a mobilized body: a body plus the mobilizer joining it to its parent
///
/// Cloning a `MobilizedBody` yields a non-owning alias of the same record.
/// Attaching a mobilizer hands ownership to the subsystem, so the handle
/// returned by the `attach*` constructors is an alias.
///
/// The `set_*` mutators only apply to free mobilizers. Frames, body and
/// default coordinates of an adopted mobilizer are changed through
/// [`MatterSubsystem::edit_mobilized_body`], which invalidates the topology
/// cache; the handle-level setters report [`MultibodyError::AdoptedEdit`].
#[derive(Debug, Clone, Default)]
pub struct MobilizedBody {
    handle: Handle<MobilizerRecord>,
}

impl MobilizedBody {
    /// Creates an empty handle
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a free mobilizer of the given kind, owned by the returned handle
    ///
    /// Frames default to identity and the body to a massless rigid body
    /// (ground to the ground body).
    pub fn new(kind: MobilizerKind) -> Self {
        Self {
            handle: Handle::owning(MobilizerRecord::new(kind)),
        }
    }

    /// The root of a new subsystem, adopted on creation
    pub(crate) fn ground(subsystem: SubsystemId) -> Self {
        let mut record = MobilizerRecord::new(MobilizerKind::Ground);
        record.adoption = Some(Adoption {
            subsystem,
            id: MobilizedBodyId::GROUND,
            parent: None,
        });
        Self {
            handle: Handle::owning(record),
        }
    }

    /// Creates a mobilizer and adopts it into `matter` as a child of `parent`
    ///
    /// The inboard frame is the parent body frame and the outboard frame the
    /// new body's own frame.
    #[track_caller]
    pub fn attach(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        kind: MobilizerKind,
        body: Body,
    ) -> Self {
        require(Self::try_attach(matter, parent, kind, body))
    }

    /// Fallible form of [`MobilizedBody::attach`]
    pub fn try_attach(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        kind: MobilizerKind,
        body: Body,
    ) -> Result<Self> {
        Self::try_attach_with_frames(
            matter,
            parent,
            Transform::identity(),
            kind,
            body,
            Transform::identity(),
        )
    }

    /// Creates a mobilizer with explicit frames and adopts it as a child of `parent`
    #[track_caller]
    pub fn attach_with_frames(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        inboard_frame: Transform,
        kind: MobilizerKind,
        body: Body,
        outboard_frame: Transform,
    ) -> Self {
        require(Self::try_attach_with_frames(
            matter,
            parent,
            inboard_frame,
            kind,
            body,
            outboard_frame,
        ))
    }

    /// Fallible form of [`MobilizedBody::attach_with_frames`]
    pub fn try_attach_with_frames(
        matter: &mut MatterSubsystem,
        parent: &MobilizedBody,
        inboard_frame: Transform,
        kind: MobilizerKind,
        body: Body,
        outboard_frame: Transform,
    ) -> Result<Self> {
        let parent_id = parent.member_id(matter, "attach")?;

        let mut mobilizer = Self::new(kind);
        mobilizer
            .try_set_default_inboard_frame(inboard_frame)?
            .try_set_default_outboard_frame(outboard_frame)?
            .try_set_body(body)?;

        matter.try_adopt_mobilized_body(parent_id, &mut mobilizer)?;
        Ok(mobilizer)
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

    /// Returns true if both handles refer to the same mobilized body
    pub fn same_record(&self, other: &MobilizedBody) -> bool {
        self.handle.same_record(&other.handle)
    }

    /// Transfers ownership to the empty handle `new_owner`; this handle becomes an alias
    #[track_caller]
    pub fn disown(&mut self, new_owner: &mut MobilizedBody) {
        require(self.try_disown(new_owner))
    }

    /// Fallible form of [`MobilizedBody::disown`]
    pub fn try_disown(&mut self, new_owner: &mut MobilizedBody) -> Result<()> {
        self.handle.try_disown(&mut new_owner.handle)
    }

    /// Makes this empty or non-owner handle alias the mobilized body of `src`
    #[track_caller]
    pub fn assign_from(&mut self, src: &MobilizedBody) -> &mut Self {
        require(self.try_assign_from(src));
        self
    }

    /// Fallible form of [`MobilizedBody::assign_from`]
    pub fn try_assign_from(&mut self, src: &MobilizedBody) -> Result<()> {
        self.handle.try_assign_from(&src.handle)
    }

    // Record access

    #[track_caller]
    pub(crate) fn read(&self, operation: &'static str) -> Ref<'_, MobilizerRecord> {
        require(self.handle.try_read(operation))
    }

    pub(crate) fn try_write(&self, operation: &'static str) -> Result<RefMut<'_, MobilizerRecord>> {
        self.handle.try_write(operation)
    }

    /// Borrows the underlying record
    #[track_caller]
    pub fn record(&self) -> Ref<'_, MobilizerRecord> {
        self.read("record")
    }

    pub(crate) fn try_record(&self, operation: &'static str) -> Result<Ref<'_, MobilizerRecord>> {
        self.handle.try_read(operation)
    }

    fn adoption(&self, operation: &'static str) -> Result<Adoption> {
        self.handle.try_read(operation)?.adoption.ok_or(MultibodyError::NotInSubsystem {
            operation,
            entity: "MobilizedBody",
        })
    }

    /// Id of this mobilized body, checked to belong to `matter`
    pub(crate) fn member_id(&self, matter: &MatterSubsystem, operation: &'static str) -> Result<MobilizedBodyId> {
        let adoption = self.adoption(operation)?;
        if adoption.subsystem != matter.id() {
            return Err(MultibodyError::ForeignSubsystem {
                expected: matter.id(),
                found: adoption.subsystem,
            });
        }
        Ok(adoption.id)
    }

    pub(crate) fn set_adoption(&mut self, adoption: Adoption) -> Result<()> {
        let mut record = self.try_write("adopt")?;
        if record.adoption.is_some() {
            return Err(MultibodyError::AlreadyAdopted {
                entity: "MobilizedBody",
            });
        }
        record.adoption = Some(adoption);
        Ok(())
    }

    fn free_record(&mut self, operation: &'static str) -> Result<RefMut<'_, MobilizerRecord>> {
        let record = self.try_write(operation)?;
        if record.adoption.is_some() {
            return Err(MultibodyError::AdoptedEdit { operation });
        }
        Ok(record)
    }

    // Subsystem membership

    /// Returns true if this mobilized body has been adopted by a subsystem
    pub fn is_in_subsystem(&self) -> bool {
        self.handle
            .try_read("is_in_subsystem")
            .map(|record| record.adoption.is_some())
            .unwrap_or(false)
    }

    /// Returns true if both mobilized bodies are adopted by the same subsystem
    pub fn is_in_same_subsystem(&self, other: &MobilizedBody) -> bool {
        match (self.adoption("is_in_same_subsystem"), other.adoption("is_in_same_subsystem")) {
            (Ok(a), Ok(b)) => a.subsystem == b.subsystem,
            _ => false,
        }
    }

    /// Identity of the owning subsystem
    #[track_caller]
    pub fn subsystem_id(&self) -> SubsystemId {
        require(self.try_subsystem_id())
    }

    /// Fallible form of [`MobilizedBody::subsystem_id`]
    pub fn try_subsystem_id(&self) -> Result<SubsystemId> {
        Ok(self.adoption("subsystem_id")?.subsystem)
    }

    /// Identifier assigned at adoption
    #[track_caller]
    pub fn mobilized_body_id(&self) -> MobilizedBodyId {
        require(self.try_mobilized_body_id())
    }

    /// Fallible form of [`MobilizedBody::mobilized_body_id`]
    pub fn try_mobilized_body_id(&self) -> Result<MobilizedBodyId> {
        Ok(self.adoption("mobilized_body_id")?.id)
    }

    /// Id of the parent mobilized body; `None` for ground
    #[track_caller]
    pub fn inboard_mobilized_body_id(&self) -> Option<MobilizedBodyId> {
        require(self.adoption("inboard_mobilized_body_id")).parent
    }

    // Defaults

    /// Borrows the kind and its default coordinates
    #[track_caller]
    pub fn kind(&self) -> Ref<'_, MobilizerKind> {
        Ref::map(self.read("kind"), |record| &record.kind)
    }

    /// Returns the kind tag
    #[track_caller]
    pub fn kind_type(&self) -> MobilizerType {
        require(self.try_kind_type())
    }

    /// Fallible form of [`MobilizedBody::kind_type`]
    pub fn try_kind_type(&self) -> Result<MobilizerType> {
        Ok(self.handle.try_read("kind_type")?.kind.kind_type())
    }

    /// Number of generalized coordinates
    #[track_caller]
    pub fn nq(&self) -> usize {
        self.read("nq").kind.nq()
    }

    /// Number of generalized speeds
    #[track_caller]
    pub fn nu(&self) -> usize {
        self.read("nu").kind.nu()
    }

    /// The kinds of relative motion this mobilizer permits
    #[track_caller]
    pub fn motion(&self) -> MotionFlags {
        self.read("motion").kind.motion()
    }

    /// Borrows the default generalized coordinates
    #[track_caller]
    pub fn default_q(&self) -> Ref<'_, [Real]> {
        Ref::map(self.read("default_q"), |record| record.kind.default_q())
    }

    /// Borrows the mass description
    #[track_caller]
    pub fn body(&self) -> Ref<'_, Body> {
        Ref::map(self.read("body"), |record| &record.body)
    }

    /// Pose of the mobilizer's F frame on the parent body
    #[track_caller]
    pub fn default_inboard_frame(&self) -> Transform {
        self.read("default_inboard_frame").default_inboard_frame
    }

    /// Pose of the mobilizer's M frame on this body
    #[track_caller]
    pub fn default_outboard_frame(&self) -> Transform {
        self.read("default_outboard_frame").default_outboard_frame
    }

    /// Pose of M in F at the default coordinates
    #[track_caller]
    pub fn default_mobilizer_transform(&self) -> Transform {
        self.read("default_mobilizer_transform")
            .kind
            .default_mobilizer_transform()
    }

    // Mutators for free mobilizers. On an adopted mobilizer they fail with
    // `AdoptedEdit` instead of invalidating the topology cache behind the
    // subsystem's back; `MatterSubsystem::edit_mobilized_body` performs the
    // same edits and invalidates the cache.

    /// Sets the pose of F on the parent body
    #[track_caller]
    pub fn set_default_inboard_frame(&mut self, frame: Transform) -> &mut Self {
        require(self.try_set_default_inboard_frame(frame))
    }

    /// Fallible form of [`MobilizedBody::set_default_inboard_frame`]
    pub fn try_set_default_inboard_frame(&mut self, frame: Transform) -> Result<&mut Self> {
        self.free_record("set_default_inboard_frame")?.default_inboard_frame = frame;
        Ok(self)
    }

    /// Sets the pose of M on this body
    #[track_caller]
    pub fn set_default_outboard_frame(&mut self, frame: Transform) -> &mut Self {
        require(self.try_set_default_outboard_frame(frame))
    }

    /// Fallible form of [`MobilizedBody::set_default_outboard_frame`]
    pub fn try_set_default_outboard_frame(&mut self, frame: Transform) -> Result<&mut Self> {
        self.free_record("set_default_outboard_frame")?.default_outboard_frame = frame;
        Ok(self)
    }

    /// Replaces the mass description with a copy of `body`
    #[track_caller]
    pub fn set_body(&mut self, body: Body) -> &mut Self {
        require(self.try_set_body(body))
    }

    /// Fallible form of [`MobilizedBody::set_body`]
    pub fn try_set_body(&mut self, body: Body) -> Result<&mut Self> {
        self.free_record("set_body")?.body = body;
        Ok(self)
    }

    /// Replaces the default coordinates; `q` must have exactly `nq()` values
    #[track_caller]
    pub fn set_default_q(&mut self, q: &[Real]) -> &mut Self {
        require(self.try_set_default_q(q))
    }

    /// Fallible form of [`MobilizedBody::set_default_q`]
    pub fn try_set_default_q(&mut self, q: &[Real]) -> Result<&mut Self> {
        self.free_record("set_default_q")?.kind.set_default_q(q)?;
        Ok(self)
    }

    pub(crate) fn try_set_default_pitch(&mut self, pitch: Real) -> Result<&mut Self> {
        self.free_record("set_default_pitch")?.kind.set_pitch(pitch)?;
        Ok(self)
    }

    // State access

    /// Offset of this mobilizer's first coordinate in the state's q array
    #[track_caller]
    pub fn q_index(&self, matter: &MatterSubsystem, state: &State) -> usize {
        require(self.q_range(matter, state, "q_index")).0
    }

    /// Offset of this mobilizer's first speed in the state's u array
    #[track_caller]
    pub fn u_index(&self, matter: &MatterSubsystem, state: &State) -> usize {
        require(self.u_range(matter, state, "u_index")).0
    }

    fn q_range(&self, matter: &MatterSubsystem, state: &State, operation: &'static str) -> Result<(usize, usize)> {
        let id = self.member_id(matter, operation)?;
        matter.try_find_mobilizer_qs(state, id)
    }

    fn u_range(&self, matter: &MatterSubsystem, state: &State, operation: &'static str) -> Result<(usize, usize)> {
        let id = self.member_id(matter, operation)?;
        matter.try_find_mobilizer_us(state, id)
    }

    /// This mobilizer's generalized coordinates
    #[track_caller]
    pub fn q<'s>(&self, matter: &MatterSubsystem, state: &'s State) -> &'s [Real] {
        require(self.try_q(matter, state))
    }

    /// Fallible form of [`MobilizedBody::q`]
    pub fn try_q<'s>(&self, matter: &MatterSubsystem, state: &'s State) -> Result<&'s [Real]> {
        let (start, n) = self.q_range(matter, state, "q")?;
        Ok(&state.q().as_slice()[start..start + n])
    }

    /// This mobilizer's generalized coordinates, writable in place
    #[track_caller]
    pub fn upd_q<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut [Real] {
        require(self.try_upd_q(matter, state))
    }

    /// Fallible form of [`MobilizedBody::upd_q`]
    pub fn try_upd_q<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> Result<&'s mut [Real]> {
        let (start, n) = self.q_range(matter, state, "upd_q")?;
        Ok(&mut state.upd_q()[start..start + n])
    }

    /// This mobilizer's generalized speeds
    #[track_caller]
    pub fn u<'s>(&self, matter: &MatterSubsystem, state: &'s State) -> &'s [Real] {
        require(self.try_u(matter, state))
    }

    /// Fallible form of [`MobilizedBody::u`]
    pub fn try_u<'s>(&self, matter: &MatterSubsystem, state: &'s State) -> Result<&'s [Real]> {
        let (start, n) = self.u_range(matter, state, "u")?;
        Ok(&state.u().as_slice()[start..start + n])
    }

    /// This mobilizer's generalized speeds, writable in place
    #[track_caller]
    pub fn upd_u<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut [Real] {
        require(self.try_upd_u(matter, state))
    }

    /// Fallible form of [`MobilizedBody::upd_u`]
    pub fn try_upd_u<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> Result<&'s mut [Real]> {
        let (start, n) = self.u_range(matter, state, "upd_u")?;
        Ok(&mut state.upd_u()[start..start + n])
    }

    /// Forces applied along this mobilizer's speeds
    #[track_caller]
    pub fn mobility_forces<'s>(&self, matter: &MatterSubsystem, state: &'s State) -> &'s [Real] {
        let (start, n) = require(self.u_range(matter, state, "mobility_forces"));
        &state.mobility_forces().as_slice()[start..start + n]
    }

    /// Forces applied along this mobilizer's speeds, writable in place
    #[track_caller]
    pub fn upd_mobility_forces<'s>(&self, matter: &MatterSubsystem, state: &'s mut State) -> &'s mut [Real] {
        let (start, n) = require(self.u_range(matter, state, "upd_mobility_forces"));
        &mut state.upd_mobility_forces()[start..start + n]
    }

    /// Pose of M in F at this mobilizer's current coordinates
    #[track_caller]
    pub fn mobilizer_transform(&self, matter: &MatterSubsystem, state: &State) -> Transform {
        let q = self.q(matter, state);
        self.read("mobilizer_transform").kind.calc_mobilizer_transform(q)
    }
}
