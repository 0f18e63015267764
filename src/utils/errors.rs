use thiserror::Error;

use crate::server::{ConfigError, TransportError};
use crate::simulation::SimError;
use crate::systems::ResetError;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reset error: {0}")]
    Reset(#[from] ResetError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
