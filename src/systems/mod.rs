mod agent;
mod hazard;
mod observation;
mod reset;
mod sensor;

pub use agent::{Orchestrator, SimState};
pub use hazard::{HazardTracker, Participation};
pub use observation::ObservationEncoder;
pub use reset::{
    ActorSnapshot, Debounce, DebounceStatus, EpisodeBaseline, ResetContext, ResetController,
    ResetError, ResetKind, ResetPhase, ResetProgress,
};
pub use sensor::{HazardVolume, HitClass, ProximitySensor, SensorReading};
