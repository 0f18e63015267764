use bevy::prelude::*;

use super::{Orchestrator, SimState};
use crate::server::StateFlag;
use crate::simulation::SimulationQuery;
use crate::systems::DebounceStatus;

impl Orchestrator {
    /// Publishes `Ready` once the agent has accepted input for long enough,
    /// unless a reset got there first.
    pub(super) fn announce_ready<S: SimulationQuery>(&mut self, sim: &mut S) {
        if self.state != SimState::Disabled || self.episode.ready {
            return;
        }
        let Some(debounce) = self.announce.as_mut() else {
            return;
        };

        let accepting = sim
            .agent_status()
            .is_some_and(|status| status.accepting_input);
        if debounce.observe(accepting) == DebounceStatus::Satisfied {
            self.announce = None;
            info!("Agent ready, announcing to trainer");
            self.publish(sim, StateFlag::Ready);
        }
    }
}
