use super::time::EpisodeClock;
use crate::components::BossPhaseTracker;
use crate::server::BossConfig;
use crate::simulation::EntityId;

/// Per-episode view of the world shared by observation and reset.
#[derive(Debug, Clone)]
pub struct EpisodeState {
    /// Resolved boss, `None` until a hard reset finds one.
    pub boss: Option<EntityId>,
    pub phase: BossPhaseTracker,
    pub clock: EpisodeClock,
    /// Set once a reset completes; cleared while one runs.
    pub ready: bool,
}

impl EpisodeState {
    pub fn new(boss: &BossConfig) -> Self {
        Self {
            boss: None,
            phase: BossPhaseTracker::new(boss.phase_markers.clone()),
            clock: EpisodeClock::default(),
            ready: false,
        }
    }

    /// Starts a new episode at simulation time `now`.
    pub fn restart(&mut self, now: f32) {
        self.phase.reset();
        self.clock.reset(now);
        self.ready = true;
    }
}
