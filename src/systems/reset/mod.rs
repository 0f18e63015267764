mod baseline;
mod controller;
mod debounce;

pub use baseline::{ActorSnapshot, EpisodeBaseline};
pub use controller::{
    ResetContext, ResetController, ResetError, ResetKind, ResetPhase, ResetProgress,
};
pub use debounce::{Debounce, DebounceStatus};
