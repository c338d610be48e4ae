use std::fmt;

use cgmath::Quaternion;
use shipyard::{EntityId, Get, View, World};

use engine::transition_log;

use crate::locomotion::{
    LocomotionAdapter, LocomotionError, LocomotionEvent, Pose, RotationMode, TELEPORT_IDENTIFIER,
    TranslationMode,
};
use crate::properties::PropAudioSource;
use crate::scripts::{Effect, script_util};
use crate::time::Time;

use super::easing::EasingCurve;

/// Blend-shape weights run 0..100, matching skinned-mesh conventions.
pub const BLEND_WEIGHT_MAX: f32 = 100.0;

/// Configuration for the transition sequencer
#[derive(Clone, Debug)]
pub struct SequencerConfig {
    /// Duration of each blend-shape interpolation phase, in seconds.
    pub interpolation_duration: f32,
    /// Hold time between the fade-down and the relocation, in seconds.
    pub post_interpolation_delay: f32,
    pub curve: EasingCurve,
    /// Which blend-shape channel on the feedback entity to drive.
    pub blend_shape_index: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        SequencerConfig {
            interpolation_duration: 1.0,
            post_interpolation_delay: 1.0,
            curve: EasingCurve::EaseInOut,
            blend_shape_index: 0,
        }
    }
}

/// One accepted move: where to go and which entity the move was aimed at.
/// Immutable once accepted, discarded when the sequence ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionRequest {
    pub target: EntityId,
    pub target_location: Pose,
}

impl TransitionRequest {
    /// Capture the target entity's current pose. Returns `None` when the
    /// entity has no position.
    pub fn for_target(world: &World, target: EntityId) -> Option<TransitionRequest> {
        let position = script_util::get_position(world, target)?;
        let rotation = script_util::get_rotation(world, target)
            .unwrap_or(Quaternion::new(1.0, 0.0, 0.0, 0.0));
        Some(TransitionRequest {
            target,
            target_location: Pose::new(position, rotation),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionPhase {
    Idle,
    InterpolateDown { elapsed: f32 },
    Delay { elapsed: f32 },
    Relocate,
    InterpolateUp { elapsed: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerError {
    /// No player rig configured.
    MissingEntityRef,
    /// No feedback (blend-shape) entity configured.
    MissingFeedbackChannel,
    /// No companion object configured.
    MissingCompanionRef,
    /// The requested target entity has no position.
    InvalidTarget,
    /// A transition is already in flight; at most one per sequencer.
    Busy,
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerError::MissingEntityRef => write!(f, "player entity is not assigned"),
            SequencerError::MissingFeedbackChannel => {
                write!(f, "feedback blend-shape entity is not assigned")
            }
            SequencerError::MissingCompanionRef => {
                write!(f, "companion entity is not assigned")
            }
            SequencerError::InvalidTarget => write!(f, "target entity has no position"),
            SequencerError::Busy => write!(f, "a transition is already in flight"),
        }
    }
}

impl std::error::Error for SequencerError {}

/// Orchestrates the five-phase move: interpolate the blend shape down, hold,
/// relocate the player through the locomotion boundary (or directly when no
/// adapter is configured), drag the companion along, interpolate back up.
///
/// The sequencer suspends exactly at the interpolation ticks and during the
/// hold; `update` resumes it once per simulation tick.
pub struct TransitionSequencer {
    config: SequencerConfig,
    player: Option<EntityId>,
    feedback: Option<EntityId>,
    companion: Option<EntityId>,
    adapter: Option<Box<dyn LocomotionAdapter>>,
    phase: TransitionPhase,
    active_request: Option<TransitionRequest>,
}

impl TransitionSequencer {
    pub fn new(config: SequencerConfig) -> TransitionSequencer {
        TransitionSequencer {
            config,
            player: None,
            feedback: None,
            companion: None,
            adapter: None,
            phase: TransitionPhase::Idle,
            active_request: None,
        }
    }

    pub fn with_player(mut self, player: EntityId) -> Self {
        self.player = Some(player);
        self
    }

    /// The entity whose blend shape (and optional audio cue) communicates
    /// transition progress.
    pub fn with_feedback(mut self, feedback: EntityId) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// The object that travels with the player (e.g. the door transform).
    pub fn with_companion(mut self, companion: EntityId) -> Self {
        self.companion = Some(companion);
        self
    }

    pub fn with_adapter(mut self, adapter: Box<dyn LocomotionAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TransitionPhase::Idle
    }

    /// Start a transition. Preconditions are checked before any side effect;
    /// on failure state is untouched. On success the returned effect carries
    /// the audio cue (when the feedback entity has an audio source) and the
    /// phase machine begins on the next tick.
    pub fn begin_transition(
        &mut self,
        world: &World,
        request: TransitionRequest,
    ) -> Result<Effect, SequencerError> {
        if self.player.is_none() {
            return Err(SequencerError::MissingEntityRef);
        }
        let Some(feedback) = self.feedback else {
            return Err(SequencerError::MissingFeedbackChannel);
        };
        if self.companion.is_none() {
            return Err(SequencerError::MissingCompanionRef);
        }
        if script_util::get_position(world, request.target).is_none() {
            return Err(SequencerError::InvalidTarget);
        }
        if self.phase != TransitionPhase::Idle {
            return Err(SequencerError::Busy);
        }

        transition_log!(info, "beginning transition toward {:?}", request.target);

        // The cue fires up front, once per sequence.
        let cue = if has_audio_source(world, feedback) {
            Effect::PlayAudioCue {
                entity_id: feedback,
            }
        } else {
            Effect::NoEffect
        };

        self.active_request = Some(request);
        self.phase = TransitionPhase::InterpolateDown { elapsed: 0.0 };
        Ok(cue)
    }

    /// Resume the sequence for one simulation tick.
    pub fn update(&mut self, world: &World, time: &Time) -> Effect {
        let dt = time.elapsed.as_secs_f32();
        let duration = self.config.interpolation_duration;
        let mut effects = Vec::new();

        // Zero-length phases cascade within a single tick, the way a
        // coroutine only suspends at its yield points.
        loop {
            match self.phase {
                TransitionPhase::Idle => break,

                TransitionPhase::InterpolateDown { elapsed } => {
                    if duration > 0.0 && elapsed < duration {
                        let t = self.config.curve.evaluate(elapsed / duration);
                        effects.push(self.feedback_effect((1.0 - t) * BLEND_WEIGHT_MAX));
                        self.phase = TransitionPhase::InterpolateDown {
                            elapsed: elapsed + dt,
                        };
                    } else {
                        effects.push(self.feedback_effect(0.0));
                        self.phase = TransitionPhase::Delay { elapsed: 0.0 };
                    }
                    break;
                }

                TransitionPhase::Delay { elapsed } => {
                    // The tick delta counts toward the hold before the
                    // expiry test, so the hold lasts exactly the configured
                    // time rather than one tick longer.
                    let elapsed = elapsed + dt;
                    if elapsed < self.config.post_interpolation_delay {
                        self.phase = TransitionPhase::Delay { elapsed };
                        break;
                    }
                    self.phase = TransitionPhase::Relocate;
                }

                TransitionPhase::Relocate => {
                    let (Some(player), Some(companion), Some(request)) =
                        (self.player, self.companion, self.active_request)
                    else {
                        // Unreachable while the begin-time checks hold.
                        transition_log!(warn, "relocate reached without an active request");
                        self.reset();
                        break;
                    };

                    match self.relocate(world, player, &request) {
                        Ok(effect) => {
                            effects.push(effect);
                            effects.push(Effect::SetPosition {
                                entity_id: companion,
                                position: request.target_location.position,
                            });
                            self.phase = TransitionPhase::InterpolateUp { elapsed: 0.0 };
                        }
                        Err(err) => {
                            // Fatal abort: no retry, no interpolate-up.
                            transition_log!(
                                warn,
                                "relocation failed, abandoning transition: {}",
                                err
                            );
                            self.reset();
                            break;
                        }
                    }
                }

                TransitionPhase::InterpolateUp { elapsed } => {
                    if duration > 0.0 && elapsed < duration {
                        let t = self.config.curve.evaluate(elapsed / duration);
                        effects.push(self.feedback_effect(t * BLEND_WEIGHT_MAX));
                        self.phase = TransitionPhase::InterpolateUp {
                            elapsed: elapsed + dt,
                        };
                    } else {
                        effects.push(self.feedback_effect(BLEND_WEIGHT_MAX));
                        transition_log!(info, "transition complete");
                        self.reset();
                    }
                    break;
                }
            }
        }

        Effect::combine(effects)
    }

    /// Immediately place the companion at the target's position, bypassing
    /// the sequence. Does not touch the phase machine.
    pub fn snap_companion_to(
        &self,
        world: &World,
        target: EntityId,
    ) -> Result<Effect, SequencerError> {
        let Some(companion) = self.companion else {
            return Err(SequencerError::MissingCompanionRef);
        };
        let Some(position) = script_util::get_position(world, target) else {
            return Err(SequencerError::InvalidTarget);
        };
        Ok(Effect::SetPosition {
            entity_id: companion,
            position,
        })
    }

    fn relocate(
        &mut self,
        world: &World,
        player: EntityId,
        request: &TransitionRequest,
    ) -> Result<Effect, LocomotionError> {
        match self.adapter.as_mut() {
            Some(adapter) => {
                // Identity hint: there is no real arc hit pose, the target
                // resolves its own destination when it can.
                let pose = match adapter.try_resolve_pose(world, request.target, Pose::identity())
                {
                    Some(pose) => pose,
                    None => {
                        let rotation = script_util::get_rotation(world, player)
                            .unwrap_or(Quaternion::new(1.0, 0.0, 0.0, 0.0));
                        Pose::new(request.target_location.position, rotation)
                    }
                };

                adapter.dispatch(
                    world,
                    LocomotionEvent {
                        identifier: TELEPORT_IDENTIFIER,
                        pose,
                        translation: TranslationMode::Absolute,
                        rotation: RotationMode::None,
                    },
                )
            }
            None => Ok(Effect::SetPosition {
                entity_id: player,
                position: request.target_location.position,
            }),
        }
    }

    fn feedback_effect(&self, value: f32) -> Effect {
        match self.feedback {
            Some(entity_id) => Effect::SetBlendShapeWeight {
                entity_id,
                index: self.config.blend_shape_index,
                value,
            },
            None => Effect::NoEffect,
        }
    }

    fn reset(&mut self) {
        self.phase = TransitionPhase::Idle;
        self.active_request = None;
    }
}

fn has_audio_source(world: &World, entity_id: EntityId) -> bool {
    world
        .borrow::<View<PropAudioSource>>()
        .map(|v_audio| v_audio.get(entity_id).is_ok())
        .unwrap_or(false)
}
