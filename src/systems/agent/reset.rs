use bevy::prelude::*;

use super::{Orchestrator, SimState};
use crate::server::StateFlag;
use crate::simulation::SimulationQuery;
use crate::systems::{ResetContext, ResetProgress};

impl Orchestrator {
    /// Leaves step mode and starts a reset, running its first phase now.
    pub(super) fn begin_reset<S: SimulationQuery>(&mut self, sim: &mut S) {
        self.disable(sim);
        self.state = SimState::Resetting;

        let mut ctx = ResetContext {
            sim: &mut *sim,
            injector: &mut self.injector,
            hazards: &mut self.hazards,
            sensor: &mut self.sensor,
            episode: &mut self.episode,
        };
        self.reset.begin(&mut ctx);
        self.drive_reset(sim);
    }

    /// Advances the reset by one frame and finishes it when complete.
    pub(super) fn drive_reset<S: SimulationQuery>(&mut self, sim: &mut S) {
        let scale = if self.reset.is_loading() {
            self.config.loading_time_scale()
        } else {
            self.config.time_scale
        };
        sim.set_time_scale(scale);

        let mut ctx = ResetContext {
            sim: &mut *sim,
            injector: &mut self.injector,
            hazards: &mut self.hazards,
            sensor: &mut self.sensor,
            episode: &mut self.episode,
        };
        match self.reset.poll(&mut ctx) {
            Ok(ResetProgress::Pending) => {}
            Ok(ResetProgress::Complete) => {
                self.announce = None;
                self.enable(sim);
                self.publish(sim, StateFlag::Reset);
            }
            Err(e) => {
                error!("Reset failed: {}", e);
                self.reset.abort(sim);
                self.disable(sim);
            }
        }
    }
}
