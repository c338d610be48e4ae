//! Locomotion boundary: how the experience asks the host movement mechanism
//! to relocate the player rig.
//!
//! The transition sequencer never moves the rig itself when an adapter is
//! configured; it emits a single locomotion event and lets the adapter decide
//! how the rig actually travels.

use std::fmt;

use cgmath::{Quaternion, Vector3, Zero};
use serde::{Deserialize, Serialize};
use shipyard::{EntityId, Get, View, World};

use crate::properties::PropTeleportTarget;
use crate::scripts::{Effect, script_util};

/// Identifier stamped on every event the transition sequencer emits.
pub const TELEPORT_IDENTIFIER: i64 = 0;

/// A position plus orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, rotation: Quaternion<f32>) -> Pose {
        Pose { position, rotation }
    }

    pub fn identity() -> Pose {
        Pose {
            position: Vector3::zero(),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn is_finite(&self) -> bool {
        let p = self.position;
        let r = self.rotation;
        p.x.is_finite()
            && p.y.is_finite()
            && p.z.is_finite()
            && r.s.is_finite()
            && r.v.x.is_finite()
            && r.v.y.is_finite()
            && r.v.z.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    Absolute,
    AbsoluteEyeLevel,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    None,
    Absolute,
    Relative,
}

/// The one value crossing the locomotion boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionEvent {
    pub identifier: i64,
    pub pose: Pose,
    pub translation: TranslationMode,
    pub rotation: RotationMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionError {
    /// The event carried a pose with non-finite components.
    InvalidPose,
    /// The adapter's rig entity no longer has a transform to move.
    MissingRig,
}

impl fmt::Display for LocomotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocomotionError::InvalidPose => write!(f, "locomotion event pose is not finite"),
            LocomotionError::MissingRig => write!(f, "locomotion rig entity has no transform"),
        }
    }
}

impl std::error::Error for LocomotionError {}

/// Pluggable relocation mechanism.
///
/// Absence of an adapter is a normal configuration (the sequencer falls back
/// to direct placement), so callers hold `Option<Box<dyn LocomotionAdapter>>`.
pub trait LocomotionAdapter {
    /// Ask the mechanism for the final pose of a teleport to `target`.
    /// `hint` plays the role of an arc hit pose; returns `None` when the
    /// target does not resolve poses itself.
    fn try_resolve_pose(&self, world: &World, target: EntityId, hint: Pose) -> Option<Pose>;

    /// Handle one locomotion event, yielding the world mutations to apply.
    fn dispatch(&mut self, world: &World, event: LocomotionEvent) -> Result<Effect, LocomotionError>;
}

/// Reference adapter that moves a rig root entity directly.
pub struct RigLocomotor {
    rig: EntityId,
}

impl RigLocomotor {
    pub fn new(rig: EntityId) -> RigLocomotor {
        RigLocomotor { rig }
    }
}

impl LocomotionAdapter for RigLocomotor {
    fn try_resolve_pose(&self, world: &World, target: EntityId, _hint: Pose) -> Option<Pose> {
        let v_target = world.borrow::<View<PropTeleportTarget>>().ok()?;
        v_target.get(target).ok().map(|t| t.pose)
    }

    fn dispatch(&mut self, world: &World, event: LocomotionEvent) -> Result<Effect, LocomotionError> {
        if !event.pose.is_finite() {
            return Err(LocomotionError::InvalidPose);
        }

        let position = match event.translation {
            // Eye-level events land the rig root at the pose as well; the rig
            // has no separate eye anchor in this scene graph.
            TranslationMode::Absolute | TranslationMode::AbsoluteEyeLevel => event.pose.position,
            TranslationMode::Relative => {
                let current = script_util::get_position(world, self.rig)
                    .ok_or(LocomotionError::MissingRig)?;
                current + event.pose.position
            }
        };

        engine::locomotion_log!(
            debug,
            "dispatching event {} -> ({:.2}, {:.2}, {:.2})",
            event.identifier,
            position.x,
            position.y,
            position.z
        );

        let effect = match event.rotation {
            RotationMode::None => Effect::SetPosition {
                entity_id: self.rig,
                position,
            },
            RotationMode::Absolute => Effect::SetPositionRotation {
                entity_id: self.rig,
                position,
                rotation: event.pose.rotation,
            },
            RotationMode::Relative => {
                let current = script_util::get_rotation(world, self.rig)
                    .ok_or(LocomotionError::MissingRig)?;
                Effect::SetPositionRotation {
                    entity_id: self.rig,
                    position,
                    rotation: current * event.pose.rotation,
                }
            }
        };

        Ok(effect)
    }
}
