use bevy::prelude::*;

use super::{Orchestrator, SimState};
use crate::server::StateFlag;
use crate::simulation::SimulationQuery;

impl Orchestrator {
    /// Unfreezes the clock for exactly `frames_per_step` fixed ticks.
    pub(super) fn begin_step<S: SimulationQuery>(&mut self, sim: &mut S) {
        self.step_control.set_steps(self.config.frames_per_step);
        sim.set_time_scale(self.config.time_scale);
        self.state = SimState::RunningPhysics;
        debug!("Stepping {} fixed ticks", self.config.frames_per_step);
    }

    /// Counts one fixed tick; the last one freezes the clock and publishes.
    pub(super) fn run_physics<S: SimulationQuery>(&mut self, sim: &mut S) {
        if !self.step_control.consume_step() || self.step_control.is_running() {
            return;
        }
        sim.set_time_scale(0.0);
        self.state = SimState::WaitingForAction;
        self.publish(sim, StateFlag::Step);
    }
}
