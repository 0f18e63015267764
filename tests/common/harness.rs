use simlink::{
    sandbox::ArenaSim,
    server::{BridgeConfig, CommandType, Observation, StateFlag, TrainerClient},
    simulation::{InputState, SimulationQuery},
    systems::Orchestrator,
};
use std::path::Path;
use tempfile::TempDir;

/// One rendered frame in the order the bevy plugins run it: at most one
/// fixed tick with its post-tick hook, then the simulation's frame work,
/// then the orchestrator.
pub fn run_frame(sim: &mut ArenaSim, bridge: &mut Orchestrator) {
    if sim.advance() {
        bridge.fixed_update(sim);
    }
    sim.end_frame();
    bridge.update(sim);
}

// Builder for a bridge wired to an arena through a private shared region
pub struct TestBridgeBuilder {
    config: BridgeConfig,
    sim: ArenaSim,
}

impl Default for TestBridgeBuilder {
    fn default() -> Self {
        Self {
            config: BridgeConfig::default(),
            sim: ArenaSim::arena(),
        }
    }
}

impl TestBridgeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sim(mut self, sim: ArenaSim) -> Self {
        self.sim = sim;
        self
    }

    pub fn build(self) -> TestBridge {
        let dir = TempDir::new().expect("Failed to create shm dir");
        let bridge = Orchestrator::open_in(self.config.clone(), dir.path())
            .expect("Failed to open orchestrator");
        let client = TrainerClient::connect_in(dir.path(), self.config.instance_id)
            .expect("Failed to connect client");
        TestBridge {
            sim: self.sim,
            bridge,
            client,
            dir,
        }
    }
}

pub struct TestBridge {
    pub sim: ArenaSim,
    pub bridge: Orchestrator,
    pub client: TrainerClient,
    dir: TempDir,
}

impl TestBridge {
    pub fn shm_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn run_frame(&mut self) {
        run_frame(&mut self.sim, &mut self.bridge);
    }

    pub fn run_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.run_frame();
        }
    }

    /// Runs frames until the host publishes `flag`, consuming the signal.
    pub fn run_until_published(&mut self, flag: StateFlag, max_frames: usize) -> Option<Observation> {
        for _ in 0..max_frames {
            self.run_frame();
            if let Some(observation) = self.client.poll_state(flag).unwrap() {
                return Some(observation);
            }
        }
        None
    }

    pub fn send(&mut self, kind: CommandType, inputs: InputState) {
        self.client.send_command(kind, inputs).unwrap();
    }

    #[track_caller]
    pub fn reset(&mut self) -> Observation {
        self.send(CommandType::Reset, InputState::default());
        self.run_until_published(StateFlag::Reset, 200)
            .expect("Reset was never published")
    }

    #[track_caller]
    pub fn step(&mut self, inputs: InputState) -> Observation {
        self.send(CommandType::Step, inputs);
        self.run_until_published(StateFlag::Step, 50)
            .expect("Step was never published")
    }

    pub fn ticks(&self) -> u64 {
        self.sim.fixed_tick_count()
    }
}
