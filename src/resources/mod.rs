mod agent;
mod episode;
mod time;

pub use agent::{ActionInjector, ControlMode, StepControl};
pub use episode::EpisodeState;
pub use time::EpisodeClock;
