use shipyard::{EntityId, World};

use crate::time::Time;

use super::{Effect, Script, script_util};

/// One object gated by a head-height band.
#[derive(Clone, Debug)]
pub struct HeightToggleEntry {
    pub target: EntityId,
    pub min_height: f32,
    pub max_height: f32,
}

struct EntryState {
    entry: HeightToggleEntry,
    within: bool,
}

/// Toggles objects on and off as the tracked head moves through height
/// bands. Only threshold crossings emit effects, so objects left alone by
/// the player keep whatever state something else gave them.
pub struct HeightToggle {
    head: EntityId,
    entries: Vec<EntryState>,
}

impl HeightToggle {
    /// `head` is the tracked head entity, injected here instead of read from
    /// a global rig accessor.
    pub fn new(head: EntityId, entries: Vec<HeightToggleEntry>) -> HeightToggle {
        HeightToggle {
            head,
            entries: entries
                .into_iter()
                .map(|entry| EntryState {
                    entry,
                    within: false,
                })
                .collect(),
        }
    }
}

impl Script for HeightToggle {
    fn update(&mut self, _entity_id: EntityId, world: &World, _time: &Time) -> Effect {
        let Some(head_position) = script_util::get_position(world, self.head) else {
            return Effect::NoEffect;
        };
        let head_height = head_position.y;

        let mut effects = Vec::new();
        for state in self.entries.iter_mut() {
            let within = head_height >= state.entry.min_height
                && head_height <= state.entry.max_height;
            if within != state.within {
                effects.push(Effect::SetActive {
                    entity_id: state.entry.target,
                    is_active: within,
                });
                state.within = within;
            }
        }
        Effect::combine(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    use crate::properties::{PropActive, PropPosition};

    fn world_with_head(height: f32) -> (World, EntityId, EntityId) {
        let mut world = World::new();
        let head = world.add_entity((PropPosition {
            position: vec3(0.0, height, 0.0),
        },));
        let lamp = world.add_entity((PropActive { is_active: false },));
        (world, head, lamp)
    }

    fn set_head_height(world: &World, head: EntityId, height: f32) {
        use shipyard::{Get, ViewMut};
        let mut vm_position = world.borrow::<ViewMut<PropPosition>>().unwrap();
        (&mut vm_position).get(head).unwrap().position.y = height;
    }

    #[test]
    fn test_crossing_emits_once_per_transition() {
        let (world, head, lamp) = world_with_head(0.5);
        let mut script = HeightToggle::new(
            head,
            vec![HeightToggleEntry {
                target: lamp,
                min_height: 1.0,
                max_height: 2.0,
            }],
        );
        let time = Time::zero();

        // Below the band: entries start outside, so nothing changes.
        assert_eq!(script.update(head, &world, &time), Effect::NoEffect);

        set_head_height(&world, head, 1.5);
        assert_eq!(
            script.update(head, &world, &time),
            Effect::SetActive {
                entity_id: lamp,
                is_active: true,
            }
        );
        // Staying inside the band is quiet.
        assert_eq!(script.update(head, &world, &time), Effect::NoEffect);

        set_head_height(&world, head, 2.5);
        assert_eq!(
            script.update(head, &world, &time),
            Effect::SetActive {
                entity_id: lamp,
                is_active: false,
            }
        );
    }

    #[test]
    fn test_missing_head_is_quiet() {
        let (mut world, _head, lamp) = world_with_head(1.5);
        let detached = world.add_entity(());
        let mut script = HeightToggle::new(
            detached,
            vec![HeightToggleEntry {
                target: lamp,
                min_height: 1.0,
                max_height: 2.0,
            }],
        );

        assert_eq!(
            script.update(detached, &world, &Time::zero()),
            Effect::NoEffect
        );
    }
}
