mod client;
pub mod config;
mod structures;
mod transport;

pub use client::TrainerClient;
pub use config::{
    BossConfig, BridgeConfig, ConfigError, HazardGate, HazardRule, NameMatch, PhaseMarker,
    ResetConfig, SensorConfig, VariableDefault,
};
pub use structures::{Command, CommandType, Observation, StateFlag, COMMAND_READY_OFFSET};
pub use transport::{default_shm_dir, memory_name, SharedMemoryTransport, TransportError};
