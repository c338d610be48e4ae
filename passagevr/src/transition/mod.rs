// Sequenced player transition ("elevator" move)
//
// This module implements the multi-phase move used by doorway/elevator
// passages: fade a blend shape down, hold, relocate the rig through the
// locomotion boundary (with a direct-placement fallback), drag the companion
// object along, then fade the blend shape back up.

pub mod easing;
pub mod sequencer;

pub use easing::EasingCurve;
pub use sequencer::{
    SequencerConfig, SequencerError, TransitionPhase, TransitionRequest, TransitionSequencer,
};
