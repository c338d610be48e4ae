use shipyard::{EntityId, World};

use crate::time::Time;

use super::{Effect, Script, script_util};

/// Shader parameter holding the player's head position.
pub const PLAYER_POSITION_PARAM: &str = "player_position";

/// Streams the tracked head position into the frame material every tick so
/// the frame shader can react to the player's approach.
pub struct FrameShader {
    frame: EntityId,
    head: EntityId,
}

impl FrameShader {
    pub fn new(frame: EntityId, head: EntityId) -> FrameShader {
        FrameShader { frame, head }
    }
}

impl Script for FrameShader {
    fn update(&mut self, _entity_id: EntityId, world: &World, _time: &Time) -> Effect {
        match script_util::get_position(world, self.head) {
            Some(position) => Effect::SetMaterialVector {
                entity_id: self.frame,
                name: PLAYER_POSITION_PARAM.to_string(),
                value: position,
            },
            None => Effect::NoEffect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    use crate::properties::{PropMaterial, PropPosition};

    #[test]
    fn test_head_position_lands_in_material() {
        let mut world = World::new();
        let head = world.add_entity((PropPosition {
            position: vec3(1.0, 1.7, -2.0),
        },));
        let frame = world.add_entity((PropMaterial::with_color(vec3(1.0, 1.0, 1.0)),));

        let mut script = FrameShader::new(frame, head);
        assert_eq!(
            script.update(frame, &world, &Time::zero()),
            Effect::SetMaterialVector {
                entity_id: frame,
                name: PLAYER_POSITION_PARAM.to_string(),
                value: vec3(1.0, 1.7, -2.0),
            }
        );
    }
}
