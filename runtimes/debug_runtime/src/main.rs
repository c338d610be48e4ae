// Debug Runtime - headless harness for the passage transition
//
// Assembles the elevator scene without a headset or renderer, drives one
// full transition at a fixed tick rate, and prints a JSON summary. Useful
// for tuning timings and for automation that needs to validate the sequence
// without human interaction.

use std::time::Duration;

use anyhow::{Context, Result};
use cgmath::{Quaternion, vec3};
use clap::{Parser, ValueEnum};
use serde_json::json;
use shipyard::{EntityId, Get, View};
use tracing::info;

use passagevr::locomotion::RigLocomotor;
use passagevr::mission::Mission;
use passagevr::properties::{
    PropAudioSource, PropBlendShapes, PropBounds, PropMaterial, PropPosition, PropRotation,
    PropSwitchLinks,
};
use passagevr::scripts::{
    FrameShader, Message, MessagePayload, Script, WallProximity, WallProximityConfig,
};
use passagevr::time::Time;
use passagevr::transition::{
    EasingCurve, SequencerConfig, TransitionRequest, TransitionSequencer,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CurveArg {
    Linear,
    Ease,
}

impl From<CurveArg> for EasingCurve {
    fn from(arg: CurveArg) -> EasingCurve {
        match arg {
            CurveArg::Linear => EasingCurve::Linear,
            CurveArg::Ease => EasingCurve::EaseInOut,
        }
    }
}

#[derive(Parser)]
#[command(name = "debug_runtime")]
#[command(about = "Headless harness for the passage transition sequencer")]
struct Args {
    /// Blend-shape fade duration in seconds
    #[arg(long, default_value = "1.0")]
    duration: f32,

    /// Hold between fade-down and relocation, in seconds
    #[arg(long, default_value = "1.0")]
    delay: f32,

    /// Easing curve for both fades
    #[arg(long, value_enum, default_value = "ease")]
    curve: CurveArg,

    /// Simulation ticks per second
    #[arg(long, default_value = "72.0")]
    tick_rate: f32,

    /// Skip the locomotion adapter and place the rig directly
    #[arg(long)]
    direct: bool,

    /// Safety cap on simulation ticks
    #[arg(long, default_value = "10000")]
    max_ticks: u32,
}

struct ElevatorScene {
    rig: EntityId,
    door: EntityId,
    door_transform: EntityId,
    target: EntityId,
    proximity_host: EntityId,
}

fn build_scene(mission: &mut Mission) -> ElevatorScene {
    let mut scene = None;
    mission.load_scene_additive("elevator", |world| {
        let rig = world.add_entity((
            PropPosition {
                position: vec3(0.0, 0.0, 0.0),
            },
            PropRotation {
                rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            },
        ));
        let door = world.add_entity((
            PropBlendShapes::with_channels(1, 100.0),
            PropAudioSource::new("door_hum"),
        ));
        let door_transform = world.add_entity((PropPosition {
            position: vec3(0.0, 0.0, 1.5),
        },));
        let target = world.add_entity((
            PropPosition {
                position: vec3(12.0, 0.0, -4.0),
            },
            PropRotation {
                rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            },
        ));

        // Destination cabin walls plus the reactive frame around the player.
        let cabin = world.add_entity((PropBounds {
            min: vec3(10.0, 0.0, -6.0),
            max: vec3(14.0, 3.0, -2.0),
        },));
        let frame = world.add_entity((PropMaterial::with_color(vec3(1.0, 1.0, 1.0)),));
        let proximity_host = world.add_entity((PropSwitchLinks { links: vec![] },));

        scene = Some(ElevatorScene {
            rig,
            door,
            door_transform,
            target,
            proximity_host,
        });

        vec![
            (
                frame,
                Box::new(FrameShader::new(frame, rig)) as Box<dyn Script>,
            ),
            (
                proximity_host,
                Box::new(WallProximity::new(WallProximityConfig {
                    bounds_source: cabin,
                    tracked: rig,
                    frame,
                    threshold: 1.0,
                    min_value: 0.0,
                    max_value: 1.0,
                    target_color: vec3(0.2, 0.6, 1.0),
                    value_curve: EasingCurve::Linear,
                    color_curve: EasingCurve::Linear,
                })) as Box<dyn Script>,
            ),
        ]
    });

    scene.expect("populate closure always runs")
}

fn position_of(mission: &Mission, entity_id: EntityId) -> [f32; 3] {
    let v_position = mission
        .world()
        .borrow::<View<PropPosition>>()
        .expect("position storage");
    let p = v_position.get(entity_id).expect("entity has position").position;
    [p.x, p.y, p.z]
}

fn blend_weight_of(mission: &Mission, entity_id: EntityId) -> f32 {
    let v_blend = mission
        .world()
        .borrow::<View<PropBlendShapes>>()
        .expect("blend storage");
    v_blend.get(entity_id).expect("entity has blend shapes").weight(0)
}

fn cue_count_of(mission: &Mission, entity_id: EntityId) -> u32 {
    let v_audio = mission
        .world()
        .borrow::<View<PropAudioSource>>()
        .expect("audio storage");
    v_audio.get(entity_id).expect("entity has audio source").play_count
}

fn main() -> Result<()> {
    let args = Args::parse();
    engine::init_logging("PASSAGE_LOG");

    let mut mission = Mission::new("passage");
    let scene = build_scene(&mut mission);

    let mut sequencer = TransitionSequencer::new(SequencerConfig {
        interpolation_duration: args.duration,
        post_interpolation_delay: args.delay,
        curve: args.curve.into(),
        blend_shape_index: 0,
    })
    .with_player(scene.rig)
    .with_feedback(scene.door)
    .with_companion(scene.door_transform);

    if !args.direct {
        sequencer = sequencer.with_adapter(Box::new(RigLocomotor::new(scene.rig)));
    }

    // Corrective snap so the door transform starts where the rig starts.
    let snap = sequencer
        .snap_companion_to(mission.world(), scene.rig)
        .context("initial companion snap")?;
    mission.handle_effect(snap);

    let request = TransitionRequest::for_target(mission.world(), scene.target)
        .context("target entity has no pose")?;
    let cue = sequencer
        .begin_transition(mission.world(), request)
        .context("begin transition")?;
    mission.handle_effect(cue);

    let dt = Duration::from_secs_f32(1.0 / args.tick_rate);
    let mut time = Time::zero();
    let mut ticks = 0u32;

    engine::profile!("transition_loop", {
        while !sequencer.is_idle() && ticks < args.max_ticks {
            time = time.advanced(dt);
            mission.update(&time);
            let effect = sequencer.update(mission.world(), &time);
            mission.handle_effect(effect);
            ticks += 1;
        }
    });

    if !sequencer.is_idle() {
        anyhow::bail!("transition did not complete within {} ticks", args.max_ticks);
    }
    info!("transition completed in {} ticks", ticks);

    // Let the proximity script settle at the destination cabin.
    mission.dispatch(Message {
        to: scene.proximity_host,
        payload: MessagePayload::Teleported,
    });
    for _ in 0..12 {
        time = time.advanced(dt);
        mission.update(&time);
    }

    let summary = json!({
        "mission": mission.name(),
        "ticks": ticks,
        "tick_rate": args.tick_rate,
        "adapter": if args.direct { "direct" } else { "rig_locomotor" },
        "player_position": position_of(&mission, scene.rig),
        "companion_position": position_of(&mission, scene.door_transform),
        "door_blend_weight": blend_weight_of(&mission, scene.door),
        "door_cue_count": cue_count_of(&mission, scene.door),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
