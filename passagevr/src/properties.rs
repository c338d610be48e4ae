//! ECS components shared by the scene behaviors.

use std::collections::HashMap;

use cgmath::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};
use shipyard::{Component, EntityId};

use crate::locomotion::Pose;

#[derive(Debug, Component, Clone, Copy, Serialize, Deserialize)]
pub struct PropPosition {
    pub position: Vector3<f32>,
}

#[derive(Debug, Component, Clone, Copy, Serialize, Deserialize)]
pub struct PropRotation {
    pub rotation: Quaternion<f32>,
}

/// Whether the entity participates in the scene (Unity-style active flag).
#[derive(Debug, Component, Clone, Copy, Serialize, Deserialize)]
pub struct PropActive {
    pub is_active: bool,
}

/// Blend-shape weights on a skinned mesh, in `[0, 100]` per channel.
#[derive(Debug, Component, Clone, Serialize, Deserialize, Default)]
pub struct PropBlendShapes {
    pub weights: Vec<f32>,
}

impl PropBlendShapes {
    pub fn with_channels(count: usize, initial: f32) -> PropBlendShapes {
        PropBlendShapes {
            weights: vec![initial; count],
        }
    }

    pub fn weight(&self, index: usize) -> f32 {
        self.weights.get(index).copied().unwrap_or(0.0)
    }

    pub fn set_weight(&mut self, index: usize, value: f32) {
        if index >= self.weights.len() {
            self.weights.resize(index + 1, 0.0);
        }
        self.weights[index] = value;
    }
}

/// A one-shot audio cue attached to an entity. `play_count` is bumped each
/// time the cue fires, which keeps fire-and-forget playback observable.
#[derive(Debug, Component, Clone, Serialize, Deserialize)]
pub struct PropAudioSource {
    pub cue: String,
    pub play_count: u32,
}

impl PropAudioSource {
    pub fn new(cue: &str) -> PropAudioSource {
        PropAudioSource {
            cue: cue.to_string(),
            play_count: 0,
        }
    }
}

/// Named shader parameters on an entity's material.
#[derive(Debug, Component, Clone, Serialize, Deserialize)]
pub struct PropMaterial {
    pub floats: HashMap<String, f32>,
    pub vectors: HashMap<String, Vector3<f32>>,
    pub color: Vector3<f32>,
}

impl PropMaterial {
    pub fn with_color(color: Vector3<f32>) -> PropMaterial {
        PropMaterial {
            floats: HashMap::new(),
            vectors: HashMap::new(),
            color,
        }
    }
}

/// Axis-aligned bounds, used by proximity checks.
#[derive(Debug, Component, Clone, Copy, Serialize, Deserialize)]
pub struct PropBounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

/// Marks an entity as a teleport destination that resolves its own final
/// pose, instead of being used as a bare position.
#[derive(Debug, Component, Clone, Copy, Serialize, Deserialize)]
pub struct PropTeleportTarget {
    pub pose: Pose,
}

/// Outgoing links for switch-style message fan-out. Entity handles are
/// runtime-scoped, so this component has no serde derives.
#[derive(Debug, Component, Clone)]
pub struct PropSwitchLinks {
    pub links: Vec<EntityId>,
}
