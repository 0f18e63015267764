//! Step/reset orchestrator.
//!
//! Owns the simulation time scale and turns trainer commands into ticks,
//! resets and published observations. `update` runs once per rendered
//! frame, `fixed_update` once after every fixed tick.

mod ready;
mod reset;
mod running;
mod sending;
mod waiting;

use bevy::prelude::*;
use std::path::Path;

use super::{Debounce, HazardTracker, ObservationEncoder, ProximitySensor, ResetController};
use crate::resources::{ActionInjector, EpisodeState, StepControl};
use crate::server::{default_shm_dir, BridgeConfig, Observation, SharedMemoryTransport};
use crate::simulation::SimulationQuery;
use crate::utils::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimState {
    /// Playback at the configured rate; commands are accepted.
    Disabled,
    /// Frozen, waiting for the next command.
    WaitingForAction,
    /// A step is consuming its fixed ticks.
    RunningPhysics,
    /// A reset is in progress; commands wait.
    Resetting,
}

#[derive(Resource)]
pub struct Orchestrator {
    config: BridgeConfig,
    transport: SharedMemoryTransport,
    state: SimState,
    step_control: StepControl,
    injector: ActionInjector,
    sensor: ProximitySensor,
    hazards: HazardTracker,
    encoder: ObservationEncoder,
    episode: EpisodeState,
    reset: ResetController,
    announce: Option<Debounce>,
    last_observation: Observation,
}

impl Orchestrator {
    /// Validates `config` and opens its shared region.
    pub fn open(config: BridgeConfig) -> Result<Self> {
        let dir = config.shm_dir.clone().unwrap_or_else(default_shm_dir);
        Self::open_in(config, &dir)
    }

    pub fn open_in(config: BridgeConfig, dir: &Path) -> Result<Self> {
        config.validate()?;
        let transport = SharedMemoryTransport::open_in(dir, config.instance_id)?;
        info!(
            "Opened shared memory at {} ({:?} mode)",
            transport.path().display(),
            config.control_mode
        );
        Ok(Self::new(config, transport))
    }

    pub fn new(config: BridgeConfig, transport: SharedMemoryTransport) -> Self {
        let manual = config.control_mode.is_manual();
        Self {
            transport,
            state: SimState::Disabled,
            step_control: StepControl::default(),
            injector: ActionInjector::new(!manual),
            sensor: ProximitySensor::new(config.sensor.clone()),
            hazards: HazardTracker::new(config.hazards.clone()),
            encoder: ObservationEncoder::new(config.boss.clone()),
            episode: EpisodeState::new(&config.boss),
            reset: ResetController::new(config.reset.clone(), config.boss.clone()),
            announce: (!manual).then(|| Debounce::unbounded(config.reset.consecutive_frames)),
            last_observation: Observation::default(),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    pub fn reset_controller(&self) -> &ResetController {
        &self.reset
    }

    pub fn injector(&self) -> &ActionInjector {
        &self.injector
    }

    pub fn last_observation(&self) -> &Observation {
        &self.last_observation
    }

    /// Freezes the simulation; only step commands advance it from here.
    pub fn enable<S: SimulationQuery>(&mut self, sim: &mut S) {
        sim.set_time_scale(0.0);
        self.step_control.clear();
        self.state = SimState::WaitingForAction;
    }

    /// Returns to playback at the configured rate.
    pub fn disable<S: SimulationQuery>(&mut self, sim: &mut S) {
        sim.set_time_scale(self.config.time_scale);
        self.step_control.clear();
        self.state = SimState::Disabled;
    }

    /// Once per rendered frame.
    pub fn update<S: SimulationQuery>(&mut self, sim: &mut S) {
        if !self.injector.is_enabled() {
            return;
        }
        self.announce_ready(sim);

        match self.state {
            SimState::Disabled | SimState::WaitingForAction => self.poll_command(sim),
            SimState::Resetting => self.drive_reset(sim),
            SimState::RunningPhysics => {}
        }
    }

    /// After every fixed tick.
    pub fn fixed_update<S: SimulationQuery>(&mut self, sim: &mut S) {
        if self.state == SimState::RunningPhysics {
            self.run_physics(sim);
        }
    }
}
