use crate::bodies::Body;
use crate::core::handle::Record;
use crate::core::{MobilizedBodyId, SubsystemId};
use crate::math::Transform;
use crate::mobilizers::MobilizerKind;

/// Where an adopted mobilizer lives; fixed once set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Adoption {
    pub(crate) subsystem: SubsystemId,
    pub(crate) id: MobilizedBodyId,
    pub(crate) parent: Option<MobilizedBodyId>,
}

/// Data shared by every handle referring to one mobilized body
#[derive(Debug, Clone)]
pub struct MobilizerRecord {
    pub(crate) kind: MobilizerKind,
    pub(crate) body: Body,
    pub(crate) default_inboard_frame: Transform,
    pub(crate) default_outboard_frame: Transform,
    pub(crate) adoption: Option<Adoption>,
}

impl MobilizerRecord {
    pub(crate) fn new(kind: MobilizerKind) -> Self {
        let body = match kind {
            MobilizerKind::Ground => Body::Ground,
            _ => Body::default(),
        };
        Self {
            kind,
            body,
            default_inboard_frame: Transform::identity(),
            default_outboard_frame: Transform::identity(),
            adoption: None,
        }
    }

    /// Returns the kind and its default coordinates
    pub fn kind(&self) -> &MobilizerKind {
        &self.kind
    }

    /// Returns the mass description
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Pose of the mobilizer's F frame on the parent body
    pub fn default_inboard_frame(&self) -> &Transform {
        &self.default_inboard_frame
    }

    /// Pose of the mobilizer's M frame on this body
    pub fn default_outboard_frame(&self) -> &Transform {
        &self.default_outboard_frame
    }
}

impl Record for MobilizerRecord {
    const ENTITY: &'static str = "MobilizedBody";
}
