use shipyard::{EntityId, World};

use super::{Effect, MessagePayload, Script};

/// Enables a set of objects while a watched entity overlaps this trigger
/// volume, and disables them again when it leaves. Contact itself arrives as
/// `Collided`/`Separated` messages from whatever owns collision detection.
pub struct ColliderToggle {
    watched: EntityId,
    toggled: Vec<EntityId>,
}

impl ColliderToggle {
    pub fn new(watched: EntityId, toggled: Vec<EntityId>) -> ColliderToggle {
        ColliderToggle { watched, toggled }
    }

    fn set_all(&self, is_active: bool) -> Effect {
        Effect::combine(
            self.toggled
                .iter()
                .map(|entity_id| Effect::SetActive {
                    entity_id: *entity_id,
                    is_active,
                })
                .collect(),
        )
    }
}

impl Script for ColliderToggle {
    fn handle_message(
        &mut self,
        _entity_id: EntityId,
        _world: &World,
        msg: &MessagePayload,
    ) -> Effect {
        match msg {
            MessagePayload::Collided { with } if *with == self.watched => self.set_all(true),
            MessagePayload::Separated { with } if *with == self.watched => self.set_all(false),
            _ => Effect::NoEffect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::properties::PropActive;

    #[test]
    fn test_only_the_watched_entity_toggles() {
        let mut world = World::new();
        let watched = world.add_entity(());
        let other = world.add_entity(());
        let a = world.add_entity((PropActive { is_active: false },));
        let b = world.add_entity((PropActive { is_active: false },));
        let trigger = world.add_entity(());

        let mut script = ColliderToggle::new(watched, vec![a, b]);

        assert_eq!(
            script.handle_message(trigger, &world, &MessagePayload::Collided { with: other }),
            Effect::NoEffect
        );

        let on = script.handle_message(trigger, &world, &MessagePayload::Collided { with: watched });
        assert_eq!(
            on,
            Effect::Multiple(vec![
                Effect::SetActive {
                    entity_id: a,
                    is_active: true,
                },
                Effect::SetActive {
                    entity_id: b,
                    is_active: true,
                },
            ])
        );

        let off =
            script.handle_message(trigger, &world, &MessagePayload::Separated { with: watched });
        assert_eq!(
            off,
            Effect::Multiple(vec![
                Effect::SetActive {
                    entity_id: a,
                    is_active: false,
                },
                Effect::SetActive {
                    entity_id: b,
                    is_active: false,
                },
            ])
        );
    }
}
