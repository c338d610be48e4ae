pub mod locomotion;
pub mod mission;
pub mod properties;
pub mod scripts;
pub mod time;
pub mod transition;

pub use locomotion::{LocomotionAdapter, LocomotionEvent, Pose, RigLocomotor};
pub use transition::{SequencerConfig, SequencerError, TransitionRequest, TransitionSequencer};
