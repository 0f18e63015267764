//! Boundary between the bridge and the host simulation.

mod traits;
mod types;

pub use traits::{SimError, SimulationQuery};
pub use types::{
    AgentStatus, AnimationFrame, Body, Damager, EntityId, InputState, LayerMask, SceneLoad,
    Variable, WorldHit, WorldObject,
};
