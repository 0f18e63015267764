use bevy::prelude::*;

use super::Orchestrator;
use crate::server::StateFlag;
use crate::simulation::SimulationQuery;

impl Orchestrator {
    /// Encodes a fresh observation and publishes it: observation, then flag,
    /// then signal. Transport failures are logged and dropped.
    pub(super) fn publish<S: SimulationQuery>(&mut self, sim: &S, flag: StateFlag) {
        self.hazards.refresh(sim, &mut self.sensor);
        let observation = self
            .encoder
            .encode(sim, &mut self.sensor, &mut self.episode);
        self.last_observation = observation;

        if let Err(e) = self.transport.write_observation(&observation) {
            error!("Failed to write observation: {}", e);
            return;
        }
        if let Err(e) = self.transport.write_state_flag(flag) {
            error!("Failed to write {:?} flag: {}", flag, e);
            return;
        }
        if let Err(e) = self.transport.signal() {
            error!("Failed to signal trainer: {}", e);
        }
    }
}
