use cgmath::{Vector3, vec3};
use shipyard::{EntityId, Get, View, World};

use engine::script_log;

use crate::properties::{PropBounds, PropMaterial};
use crate::time::Time;
use crate::transition::EasingCurve;

use super::{Effect, MessagePayload, Script, script_util};

/// Shader parameter driven by the wall distance.
pub const PROXIMITY_PARAM: &str = "proximity";

/// Ticks to sit out after a teleport so distance checks resume only once the
/// rig and the box have both settled at their destinations.
const TELEPORT_SETTLE_TICKS: u32 = 10;

#[derive(Clone, Debug)]
pub struct WallProximityConfig {
    /// Box entity whose bounds define the walls.
    pub bounds_source: EntityId,
    /// Entity whose distance to the walls is measured.
    pub tracked: EntityId,
    /// Entity whose material is driven.
    pub frame: EntityId,
    pub threshold: f32,
    pub min_value: f32,
    pub max_value: f32,
    pub target_color: Vector3<f32>,
    pub value_curve: EasingCurve,
    pub color_curve: EasingCurve,
}

/// Drives the frame shader as the tracked entity nears a wall of the box:
/// a float ramps from `min_value` to `max_value` and the material color
/// lerps toward `target_color`, each over its own curve. Entering or leaving
/// the threshold fires the switch links once per crossing.
///
/// Only the X/Z walls count; the floor and ceiling are ignored.
pub struct WallProximity {
    config: WallProximityConfig,
    bounds: Option<PropBounds>,
    original_color: Option<Vector3<f32>>,
    within: bool,
    settle_ticks: u32,
}

impl WallProximity {
    pub fn new(config: WallProximityConfig) -> WallProximity {
        WallProximity {
            config,
            bounds: None,
            original_color: None,
            within: false,
            settle_ticks: 0,
        }
    }

    fn refresh_bounds(&mut self, world: &World) {
        self.bounds = world
            .borrow::<View<PropBounds>>()
            .ok()
            .and_then(|v_bounds| v_bounds.get(self.config.bounds_source).ok().copied());
    }

    fn smallest_wall_distance(&self, position: Vector3<f32>) -> Option<f32> {
        let bounds = self.bounds?;
        let distances = [
            (position.x - bounds.min.x).abs(),
            (position.x - bounds.max.x).abs(),
            (position.z - bounds.min.z).abs(),
            (position.z - bounds.max.z).abs(),
        ];
        distances.into_iter().reduce(f32::min)
    }
}

impl Script for WallProximity {
    fn initialize(&mut self, _entity_id: EntityId, world: &World) -> Effect {
        self.refresh_bounds(world);
        self.original_color = world
            .borrow::<View<PropMaterial>>()
            .ok()
            .and_then(|v_material| v_material.get(self.config.frame).ok().map(|m| m.color));
        Effect::NoEffect
    }

    fn update(&mut self, entity_id: EntityId, world: &World, _time: &Time) -> Effect {
        // Right after a teleport both ends of the measurement are in flux.
        if self.settle_ticks > 0 {
            self.settle_ticks -= 1;
            return Effect::NoEffect;
        }

        let Some(position) = script_util::get_position(world, self.config.tracked) else {
            return Effect::NoEffect;
        };
        let Some(smallest) = self.smallest_wall_distance(position) else {
            return Effect::NoEffect;
        };

        script_log!(trace, "smallest wall distance: {}", smallest);

        let within = smallest < self.config.threshold;
        let mut effects = Vec::new();

        if within {
            let normalized = (1.0 - smallest / self.config.threshold).clamp(0.0, 1.0);

            let value_t = self.config.value_curve.evaluate(normalized);
            effects.push(Effect::SetMaterialFloat {
                entity_id: self.config.frame,
                name: PROXIMITY_PARAM.to_string(),
                value: lerp(self.config.min_value, self.config.max_value, value_t),
            });

            if let Some(original) = self.original_color {
                let color_t = self.config.color_curve.evaluate(normalized);
                effects.push(Effect::SetMaterialColor {
                    entity_id: self.config.frame,
                    color: lerp_vec3(original, self.config.target_color, color_t),
                });
            }
        }

        if within != self.within {
            let payload = if within {
                MessagePayload::TurnOn { from: entity_id }
            } else {
                MessagePayload::TurnOff { from: entity_id }
            };
            effects.push(script_util::send_to_all_switch_links(
                world, entity_id, payload,
            ));
            self.within = within;
        }

        Effect::combine(effects)
    }

    fn handle_message(
        &mut self,
        _entity_id: EntityId,
        world: &World,
        msg: &MessagePayload,
    ) -> Effect {
        if let MessagePayload::Teleported = msg {
            self.settle_ticks = TELEPORT_SETTLE_TICKS;
            self.refresh_bounds(world);
        }
        Effect::NoEffect
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_vec3(a: Vector3<f32>, b: Vector3<f32>, t: f32) -> Vector3<f32> {
    vec3(
        lerp(a.x, b.x, t),
        lerp(a.y, b.y, t),
        lerp(a.z, b.z, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard::ViewMut;

    use crate::properties::{PropPosition, PropSwitchLinks};

    struct Fixture {
        world: World,
        host: EntityId,
        tracked: EntityId,
        listener: EntityId,
        script: WallProximity,
    }

    fn fixture() -> Fixture {
        let mut world = World::new();
        let box_entity = world.add_entity((PropBounds {
            min: vec3(-5.0, 0.0, -5.0),
            max: vec3(5.0, 3.0, 5.0),
        },));
        let tracked = world.add_entity((PropPosition {
            position: vec3(0.0, 0.0, 0.0),
        },));
        let frame = world.add_entity((PropMaterial::with_color(vec3(1.0, 1.0, 1.0)),));
        let listener = world.add_entity(());
        let host = world.add_entity((PropSwitchLinks {
            links: vec![listener],
        },));

        let mut script = WallProximity::new(WallProximityConfig {
            bounds_source: box_entity,
            tracked,
            frame,
            threshold: 1.0,
            min_value: 0.0,
            max_value: 1.0,
            target_color: vec3(1.0, 0.0, 0.0),
            value_curve: EasingCurve::Linear,
            color_curve: EasingCurve::Linear,
        });
        assert_eq!(script.initialize(host, &world), Effect::NoEffect);

        Fixture {
            world,
            host,
            tracked,
            listener,
            script,
        }
    }

    fn move_tracked(fixture: &Fixture, position: Vector3<f32>) {
        let mut vm_position = fixture.world.borrow::<ViewMut<PropPosition>>().unwrap();
        (&mut vm_position).get(fixture.tracked).unwrap().position = position;
    }

    #[test]
    fn test_inside_threshold_drives_material_and_fires_links_once() {
        let mut fixture = fixture();

        // Center of the box: every wall is far away.
        assert_eq!(
            fixture
                .script
                .update(fixture.host, &fixture.world, &Time::zero()),
            Effect::NoEffect
        );

        // Half a meter from the +X wall: halfway into the threshold.
        move_tracked(&fixture, vec3(4.5, 0.0, 0.0));
        let effect = fixture
            .script
            .update(fixture.host, &fixture.world, &Time::zero());
        let Effect::Multiple(effects) = effect else {
            panic!("expected a batch of effects");
        };
        assert!(effects.contains(&Effect::SetMaterialFloat {
            entity_id: fixture.script.config.frame,
            name: PROXIMITY_PARAM.to_string(),
            value: 0.5,
        }));
        assert!(effects.contains(&Effect::SetMaterialColor {
            entity_id: fixture.script.config.frame,
            color: vec3(1.0, 0.5, 0.5),
        }));
        assert!(effects.contains(&Effect::Send {
            to: fixture.listener,
            payload: MessagePayload::TurnOn { from: fixture.host },
        }));

        // Still inside: material keeps updating but no new crossing event.
        let effect = fixture
            .script
            .update(fixture.host, &fixture.world, &Time::zero());
        let Effect::Multiple(effects) = effect else {
            panic!("expected a batch of effects");
        };
        assert!(!effects.iter().any(|e| matches!(e, Effect::Send { .. })));
    }

    #[test]
    fn test_leaving_threshold_fires_turn_off() {
        let mut fixture = fixture();
        move_tracked(&fixture, vec3(4.5, 0.0, 0.0));
        fixture
            .script
            .update(fixture.host, &fixture.world, &Time::zero());

        move_tracked(&fixture, vec3(0.0, 0.0, 0.0));
        assert_eq!(
            fixture
                .script
                .update(fixture.host, &fixture.world, &Time::zero()),
            Effect::Send {
                to: fixture.listener,
                payload: MessagePayload::TurnOff { from: fixture.host },
            }
        );
    }

    #[test]
    fn test_teleport_message_skips_a_settle_window() {
        let mut fixture = fixture();
        move_tracked(&fixture, vec3(4.5, 0.0, 0.0));

        fixture
            .script
            .handle_message(fixture.host, &fixture.world, &MessagePayload::Teleported);

        for _ in 0..10 {
            assert_eq!(
                fixture
                    .script
                    .update(fixture.host, &fixture.world, &Time::zero()),
                Effect::NoEffect
            );
        }

        // Settle window over: measurements resume.
        let effect = fixture
            .script
            .update(fixture.host, &fixture.world, &Time::zero());
        assert!(!matches!(effect, Effect::NoEffect));
    }

    #[test]
    fn test_teleport_refreshes_cached_bounds() {
        let mut fixture = fixture();

        // Shift the box after initialization; the cache still has the old
        // walls until a teleport invalidates it.
        {
            let mut vm_bounds = fixture.world.borrow::<ViewMut<PropBounds>>().unwrap();
            let bounds = (&mut vm_bounds)
                .get(fixture.script.config.bounds_source)
                .unwrap();
            bounds.min = vec3(95.0, 0.0, 95.0);
            bounds.max = vec3(105.0, 3.0, 105.0);
        }

        fixture
            .script
            .handle_message(fixture.host, &fixture.world, &MessagePayload::Teleported);
        move_tracked(&fixture, vec3(104.5, 0.0, 100.0));

        for _ in 0..10 {
            fixture
                .script
                .update(fixture.host, &fixture.world, &Time::zero());
        }
        let effect = fixture
            .script
            .update(fixture.host, &fixture.world, &Time::zero());
        assert!(
            matches!(effect, Effect::Multiple(_)),
            "expected proximity effects near the relocated wall, got {:?}",
            effect
        );
    }
}
