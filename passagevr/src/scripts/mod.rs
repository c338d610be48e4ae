//! Per-entity reactive behaviors.
//!
//! Scripts never mutate the world directly; they return [`Effect`] values
//! that the mission host applies in one place. Messages let scripts react to
//! contact and switch-link events without holding references to each other.

pub mod collider_toggle;
pub mod frame_shader;
pub mod height_toggle;
pub mod script_util;
pub mod wall_proximity;

use cgmath::{Quaternion, Vector3};
use shipyard::{EntityId, World};

use crate::time::Time;

pub use collider_toggle::ColliderToggle;
pub use frame_shader::FrameShader;
pub use height_toggle::{HeightToggle, HeightToggleEntry};
pub use wall_proximity::{WallProximity, WallProximityConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    TurnOn { from: EntityId },
    TurnOff { from: EntityId },
    Collided { with: EntityId },
    Separated { with: EntityId },
    Teleported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub to: EntityId,
    pub payload: MessagePayload,
}

/// World mutations requested by scripts and systems, applied centrally by
/// the mission host.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    NoEffect,
    Multiple(Vec<Effect>),
    SetPosition {
        entity_id: EntityId,
        position: Vector3<f32>,
    },
    SetRotation {
        entity_id: EntityId,
        rotation: Quaternion<f32>,
    },
    SetPositionRotation {
        entity_id: EntityId,
        position: Vector3<f32>,
        rotation: Quaternion<f32>,
    },
    SetBlendShapeWeight {
        entity_id: EntityId,
        index: usize,
        value: f32,
    },
    SetActive {
        entity_id: EntityId,
        is_active: bool,
    },
    SetMaterialFloat {
        entity_id: EntityId,
        name: String,
        value: f32,
    },
    SetMaterialVector {
        entity_id: EntityId,
        name: String,
        value: Vector3<f32>,
    },
    SetMaterialColor {
        entity_id: EntityId,
        color: Vector3<f32>,
    },
    PlayAudioCue {
        entity_id: EntityId,
    },
    Send {
        to: EntityId,
        payload: MessagePayload,
    },
}

impl Effect {
    /// Flatten a batch of effects, dropping no-ops.
    pub fn combine(effects: Vec<Effect>) -> Effect {
        let mut flattened = Vec::new();
        for effect in effects {
            match effect {
                Effect::NoEffect => {}
                Effect::Multiple(inner) => match Effect::combine(inner) {
                    Effect::NoEffect => {}
                    Effect::Multiple(inner) => flattened.extend(inner),
                    other => flattened.push(other),
                },
                other => flattened.push(other),
            }
        }

        match flattened.len() {
            0 => Effect::NoEffect,
            1 => flattened.remove(0),
            _ => Effect::Multiple(flattened),
        }
    }
}

pub trait Script {
    fn initialize(&mut self, _entity_id: EntityId, _world: &World) -> Effect {
        Effect::NoEffect
    }

    fn update(&mut self, _entity_id: EntityId, _world: &World, _time: &Time) -> Effect {
        Effect::NoEffect
    }

    fn handle_message(
        &mut self,
        _entity_id: EntityId,
        _world: &World,
        _msg: &MessagePayload,
    ) -> Effect {
        Effect::NoEffect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    #[test]
    fn test_combine_drops_noops_and_flattens() {
        let id = EntityId::dead();
        let set = Effect::SetActive {
            entity_id: id,
            is_active: true,
        };

        assert_eq!(Effect::combine(vec![]), Effect::NoEffect);
        assert_eq!(
            Effect::combine(vec![Effect::NoEffect, set.clone()]),
            set.clone()
        );

        let nested = Effect::combine(vec![
            Effect::Multiple(vec![set.clone(), Effect::NoEffect]),
            Effect::SetPosition {
                entity_id: id,
                position: vec3(0.0, 0.0, 0.0),
            },
        ]);
        match nested {
            Effect::Multiple(list) => assert_eq!(list.len(), 2),
            other => panic!("expected Multiple, got {:?}", other),
        }
    }
}
