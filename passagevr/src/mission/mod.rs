//! Mission host: owns the world, the script registry and the message queue.
//!
//! Scripts and the transition sequencer only describe mutations as
//! [`Effect`]s; this module is the single place they are applied.

use std::collections::VecDeque;

use shipyard::{EntityId, Get, ViewMut, World};

use engine::mission_log;

use crate::properties::{
    PropActive, PropAudioSource, PropBlendShapes, PropMaterial, PropPosition, PropRotation,
};
use crate::scripts::{Effect, Message, Script};
use crate::time::Time;

/// Apply one effect to the world. `Send` effects are not delivered here;
/// they land in `outbox` for the caller's message queue.
pub fn apply_effect(world: &World, effect: Effect, outbox: &mut Vec<Message>) {
    match effect {
        Effect::NoEffect => {}

        Effect::Multiple(effects) => {
            for effect in effects {
                apply_effect(world, effect, outbox);
            }
        }

        Effect::SetPosition {
            entity_id,
            position,
        } => {
            if let Ok(mut vm_position) = world.borrow::<ViewMut<PropPosition>>() {
                if let Ok(prop) = (&mut vm_position).get(entity_id) {
                    prop.position = position;
                } else {
                    mission_log!(warn, "SetPosition on entity without position: {:?}", entity_id);
                }
            }
        }

        Effect::SetRotation {
            entity_id,
            rotation,
        } => {
            if let Ok(mut vm_rotation) = world.borrow::<ViewMut<PropRotation>>() {
                if let Ok(prop) = (&mut vm_rotation).get(entity_id) {
                    prop.rotation = rotation;
                }
            }
        }

        Effect::SetPositionRotation {
            entity_id,
            position,
            rotation,
        } => {
            apply_effect(
                world,
                Effect::SetPosition {
                    entity_id,
                    position,
                },
                outbox,
            );
            apply_effect(
                world,
                Effect::SetRotation {
                    entity_id,
                    rotation,
                },
                outbox,
            );
        }

        Effect::SetBlendShapeWeight {
            entity_id,
            index,
            value,
        } => {
            if let Ok(mut vm_blend) = world.borrow::<ViewMut<PropBlendShapes>>() {
                if let Ok(blend_shapes) = (&mut vm_blend).get(entity_id) {
                    blend_shapes.set_weight(index, value);
                }
            }
        }

        Effect::SetActive {
            entity_id,
            is_active,
        } => {
            if let Ok(mut vm_active) = world.borrow::<ViewMut<PropActive>>() {
                if let Ok(active) = (&mut vm_active).get(entity_id) {
                    active.is_active = is_active;
                }
            }
        }

        Effect::SetMaterialFloat {
            entity_id,
            name,
            value,
        } => {
            if let Ok(mut vm_material) = world.borrow::<ViewMut<PropMaterial>>() {
                if let Ok(material) = (&mut vm_material).get(entity_id) {
                    material.floats.insert(name, value);
                }
            }
        }

        Effect::SetMaterialVector {
            entity_id,
            name,
            value,
        } => {
            if let Ok(mut vm_material) = world.borrow::<ViewMut<PropMaterial>>() {
                if let Ok(material) = (&mut vm_material).get(entity_id) {
                    material.vectors.insert(name, value);
                }
            }
        }

        Effect::SetMaterialColor { entity_id, color } => {
            if let Ok(mut vm_material) = world.borrow::<ViewMut<PropMaterial>>() {
                if let Ok(material) = (&mut vm_material).get(entity_id) {
                    material.color = color;
                }
            }
        }

        Effect::PlayAudioCue { entity_id } => {
            if let Ok(mut vm_audio) = world.borrow::<ViewMut<PropAudioSource>>() {
                if let Ok(audio) = (&mut vm_audio).get(entity_id) {
                    audio.play_count += 1;
                    mission_log!(debug, "audio cue '{}' fired", audio.cue);
                }
            }
        }

        Effect::Send { to, payload } => outbox.push(Message { to, payload }),
    }
}

pub struct Mission {
    name: String,
    world: World,
    scripts: Vec<(EntityId, Box<dyn Script>)>,
    pending_messages: VecDeque<Message>,
    loaded_scenes: Vec<String>,
}

impl Mission {
    pub fn new(name: &str) -> Mission {
        mission_log!(info, "starting mission '{}'", name);
        Mission {
            name: name.to_string(),
            world: World::new(),
            scripts: Vec::new(),
            pending_messages: VecDeque::new(),
            loaded_scenes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn loaded_scenes(&self) -> &[String] {
        &self.loaded_scenes
    }

    /// Attach a script to an entity. The script's `initialize` runs (and its
    /// effects apply) immediately.
    pub fn add_script(&mut self, entity_id: EntityId, mut script: Box<dyn Script>) {
        let effect = script.initialize(entity_id, &self.world);
        self.handle_effect(effect);
        self.scripts.push((entity_id, script));
    }

    /// Load a scene on top of whatever is already running. The populate
    /// closure spawns entities and hands back the scripts to register;
    /// existing content is untouched.
    pub fn load_scene_additive<F>(&mut self, name: &str, populate: F)
    where
        F: FnOnce(&mut World) -> Vec<(EntityId, Box<dyn Script>)>,
    {
        mission_log!(info, "additively loading scene '{}'", name);
        let scripts = populate(&mut self.world);
        for (entity_id, script) in scripts {
            self.add_script(entity_id, script);
        }
        self.loaded_scenes.push(name.to_string());
    }

    /// One simulation tick: run every script, apply their effects, then
    /// drain the message queue until quiescent.
    pub fn update(&mut self, time: &Time) {
        let mut effects = Vec::new();
        for (entity_id, script) in self.scripts.iter_mut() {
            effects.push(script.update(*entity_id, &self.world, time));
        }
        for effect in effects {
            self.handle_effect(effect);
        }
        self.dispatch_messages();
    }

    pub fn dispatch(&mut self, message: Message) {
        self.pending_messages.push_back(message);
        self.dispatch_messages();
    }

    pub fn handle_effect(&mut self, effect: Effect) {
        let mut outbox = Vec::new();
        apply_effect(&self.world, effect, &mut outbox);
        self.pending_messages.extend(outbox);
    }

    fn dispatch_messages(&mut self) {
        // Messages may fan out into more messages; cap the chain so a script
        // cycle cannot wedge the tick.
        const MAX_DELIVERIES: usize = 1024;

        let mut delivered = 0;
        while let Some(message) = self.pending_messages.pop_front() {
            if delivered >= MAX_DELIVERIES {
                mission_log!(warn, "message chain exceeded {} deliveries, dropping remainder", MAX_DELIVERIES);
                self.pending_messages.clear();
                break;
            }
            delivered += 1;

            let mut effects = Vec::new();
            for (entity_id, script) in self.scripts.iter_mut() {
                if *entity_id == message.to {
                    effects.push(script.handle_message(*entity_id, &self.world, &message.payload));
                }
            }
            for effect in effects {
                let mut outbox = Vec::new();
                apply_effect(&self.world, effect, &mut outbox);
                self.pending_messages.extend(outbox);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;
    use shipyard::{View, World};

    use crate::scripts::MessagePayload;

    struct CountingScript {
        updates: u32,
        target: EntityId,
    }

    impl Script for CountingScript {
        fn update(&mut self, _entity_id: EntityId, _world: &World, _time: &Time) -> Effect {
            self.updates += 1;
            Effect::SetActive {
                entity_id: self.target,
                is_active: self.updates % 2 == 0,
            }
        }

        fn handle_message(
            &mut self,
            _entity_id: EntityId,
            _world: &World,
            msg: &MessagePayload,
        ) -> Effect {
            match msg {
                MessagePayload::TurnOn { .. } => Effect::SetActive {
                    entity_id: self.target,
                    is_active: true,
                },
                _ => Effect::NoEffect,
            }
        }
    }

    fn is_active(world: &World, entity_id: EntityId) -> bool {
        let v_active = world.borrow::<View<PropActive>>().unwrap();
        v_active.get(entity_id).unwrap().is_active
    }

    #[test]
    fn test_additive_load_registers_scripts_and_keeps_existing_content() {
        let mut mission = Mission::new("passage");
        let kept = mission
            .world_mut()
            .add_entity((PropActive { is_active: true },));

        let mut toggled = None;
        mission.load_scene_additive("annex", |world| {
            let lamp = world.add_entity((PropActive { is_active: false },));
            let host = world.add_entity(());
            toggled = Some(lamp);
            vec![(
                host,
                Box::new(CountingScript {
                    updates: 0,
                    target: lamp,
                }) as Box<dyn Script>,
            )]
        });
        let toggled = toggled.unwrap();

        assert_eq!(mission.name(), "passage");
        assert_eq!(mission.loaded_scenes(), &["annex".to_string()]);
        assert!(is_active(mission.world(), kept));

        let time = Time::zero().advanced(std::time::Duration::from_millis(16));
        mission.update(&time);
        assert!(!is_active(mission.world(), toggled));
        mission.update(&time);
        assert!(is_active(mission.world(), toggled));
    }

    #[test]
    fn test_message_dispatch_reaches_target_script() {
        let mut mission = Mission::new("passage");
        let lamp = mission
            .world_mut()
            .add_entity((PropActive { is_active: false },));
        let host = mission.world_mut().add_entity(());
        mission.add_script(
            host,
            Box::new(CountingScript {
                updates: 0,
                target: lamp,
            }),
        );

        mission.dispatch(Message {
            to: host,
            payload: MessagePayload::TurnOn { from: host },
        });
        assert!(is_active(mission.world(), lamp));
    }

    #[test]
    fn test_apply_effect_mutates_components() {
        let mut world = World::new();
        let entity = world.add_entity((
            PropPosition {
                position: vec3(0.0, 0.0, 0.0),
            },
            PropBlendShapes::with_channels(1, 100.0),
            PropAudioSource::new("hum"),
        ));

        let mut outbox = Vec::new();
        apply_effect(
            &world,
            Effect::Multiple(vec![
                Effect::SetPosition {
                    entity_id: entity,
                    position: vec3(1.0, 2.0, 3.0),
                },
                Effect::SetBlendShapeWeight {
                    entity_id: entity,
                    index: 0,
                    value: 42.0,
                },
                Effect::PlayAudioCue { entity_id: entity },
            ]),
            &mut outbox,
        );

        assert!(outbox.is_empty());
        let v_position = world.borrow::<View<PropPosition>>().unwrap();
        assert_eq!(v_position.get(entity).unwrap().position, vec3(1.0, 2.0, 3.0));
        let v_blend = world.borrow::<View<PropBlendShapes>>().unwrap();
        assert_eq!(v_blend.get(entity).unwrap().weight(0), 42.0);
        let v_audio = world.borrow::<View<PropAudioSource>>().unwrap();
        assert_eq!(v_audio.get(entity).unwrap().play_count, 1);
    }
}
