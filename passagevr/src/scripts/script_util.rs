use cgmath::{Quaternion, Vector3};
use shipyard::{EntityId, Get, View, World};

use crate::properties::{PropPosition, PropRotation, PropSwitchLinks};

use super::{Effect, MessagePayload};

pub fn get_position(world: &World, entity_id: EntityId) -> Option<Vector3<f32>> {
    let v_position = world.borrow::<View<PropPosition>>().ok()?;
    v_position.get(entity_id).ok().map(|p| p.position)
}

pub fn get_rotation(world: &World, entity_id: EntityId) -> Option<Quaternion<f32>> {
    let v_rotation = world.borrow::<View<PropRotation>>().ok()?;
    v_rotation.get(entity_id).ok().map(|r| r.rotation)
}

/// Fan a payload out to every switch link of `entity_id`.
pub fn send_to_all_switch_links(
    world: &World,
    entity_id: EntityId,
    payload: MessagePayload,
) -> Effect {
    let links = {
        let v_links = match world.borrow::<View<PropSwitchLinks>>() {
            Ok(v) => v,
            Err(_) => return Effect::NoEffect,
        };
        match v_links.get(entity_id) {
            Ok(switch_links) => switch_links.links.clone(),
            Err(_) => Vec::new(),
        }
    };

    Effect::combine(
        links
            .into_iter()
            .map(|to| Effect::Send {
                to,
                payload: payload.clone(),
            })
            .collect(),
    )
}
