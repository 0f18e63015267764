use bevy::prelude::*;

use super::Orchestrator;
use crate::server::CommandType;
use crate::simulation::SimulationQuery;

impl Orchestrator {
    /// Reads the command record and dispatches it if the trainer marked it
    /// ready. The ready word is cleared only after dispatch.
    pub(super) fn poll_command<S: SimulationQuery>(&mut self, sim: &mut S) {
        let command = match self.transport.read_command() {
            Ok(command) => command,
            Err(e) => {
                error!("Failed to read command: {}", e);
                return;
            }
        };
        if !command.is_ready() {
            return;
        }

        self.injector.apply_command(&command);
        sim.set_input_override(self.injector.effective());

        match command.kind() {
            Ok(CommandType::Step) => self.begin_step(sim),
            Ok(CommandType::Reset) => self.begin_reset(sim),
            Ok(CommandType::None) => debug!("Ignoring empty command"),
            Err(raw) => warn!("Unknown command type {}", raw),
        }

        if let Err(e) = self.transport.clear_command_ready() {
            error!("Failed to clear command ready: {}", e);
        }
    }
}
