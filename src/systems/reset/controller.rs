use bevy::prelude::*;
use glam::Vec2;
use thiserror::Error;

use super::baseline::EpisodeBaseline;
use super::debounce::{Debounce, DebounceStatus};
use crate::components::resolve_boss;
use crate::resources::{ActionInjector, EpisodeState};
use crate::server::{BossConfig, ResetConfig};
use crate::simulation::{EntityId, SimError, SimulationQuery};
use crate::systems::{HazardTracker, ProximitySensor};

#[derive(Error, Debug)]
pub enum ResetError {
    #[error("{phase} did not complete within {frames} frames")]
    Timeout { phase: &'static str, frames: u32 },

    #[error("agent missing while {phase}")]
    MissingAgent { phase: &'static str },

    #[error("{phase} failed: {source}")]
    Simulation {
        phase: &'static str,
        #[source]
        source: SimError,
    },
}

fn sim_failure(phase: &'static str) -> impl FnOnce(SimError) -> ResetError {
    move |source| ResetError::Simulation { phase, source }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Restores the captured baseline in place.
    Soft,
    /// Reloads the scene through the host's own transition.
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetPhase {
    Idle,
    /// Hard: waiting for the post-respawn routine to finish.
    AwaitingRespawn(Debounce),
    /// Hard: scene transition started, waiting for the agent to take input.
    AwaitingInput(Debounce),
    CapturingBaseline,
    Blocking,
    Restoring,
    Settling { frames_left: u32 },
    Ready,
}

impl ResetPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ResetPhase::Idle => "idle",
            ResetPhase::AwaitingRespawn(_) => "awaiting respawn",
            ResetPhase::AwaitingInput(_) => "awaiting input",
            ResetPhase::CapturingBaseline => "capturing baseline",
            ResetPhase::Blocking => "blocking",
            ResetPhase::Restoring => "restoring",
            ResetPhase::Settling { .. } => "settling",
            ResetPhase::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetProgress {
    Pending,
    Complete,
}

/// Everything a reset touches besides the controller itself.
pub struct ResetContext<'a, S: SimulationQuery> {
    pub sim: &'a mut S,
    pub injector: &'a mut ActionInjector,
    pub hazards: &'a mut HazardTracker,
    pub sensor: &'a mut ProximitySensor,
    pub episode: &'a mut EpisodeState,
}

/// Phased episode reset, advanced one phase per rendered frame.
///
/// The first reset, and any reset without a baseline or an agent, reloads
/// the scene (hard). Later resets restore the captured baseline (soft).
#[derive(Debug, Clone)]
pub struct ResetController {
    config: ResetConfig,
    boss: BossConfig,
    phase: ResetPhase,
    kind: ResetKind,
    baseline: Option<EpisodeBaseline>,
    damage_blocked: bool,
    invulnerable: Option<EntityId>,
    force_hard: bool,
}

impl ResetController {
    pub fn new(config: ResetConfig, boss: BossConfig) -> Self {
        Self {
            config,
            boss,
            phase: ResetPhase::Idle,
            kind: ResetKind::Hard,
            baseline: None,
            damage_blocked: false,
            invulnerable: None,
            force_hard: false,
        }
    }

    pub fn phase(&self) -> &ResetPhase {
        &self.phase
    }

    pub fn kind(&self) -> ResetKind {
        self.kind
    }

    pub fn baseline(&self) -> Option<&EpisodeBaseline> {
        self.baseline.as_ref()
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, ResetPhase::Idle | ResetPhase::Ready)
    }

    /// True while a hard reset waits on the host's scene loading.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            ResetPhase::AwaitingRespawn(_) | ResetPhase::AwaitingInput(_)
        )
    }

    pub fn will_force_hard(&self) -> bool {
        self.force_hard
    }

    /// Chooses the reset path and enters its first phase.
    pub fn begin<S: SimulationQuery>(&mut self, ctx: &mut ResetContext<S>) -> ResetKind {
        ctx.episode.ready = false;
        ctx.injector.reset_inputs();
        ctx.sim.set_input_override(ctx.injector.effective());

        let agent_present = ctx.sim.agent().is_some();
        if !self.force_hard && self.baseline.is_some() && agent_present {
            self.kind = ResetKind::Soft;
            self.phase = ResetPhase::Blocking;
        } else {
            if self.baseline.is_some() && !agent_present {
                warn!("Agent missing, falling back to hard reset");
            }
            self.enter_hard(ctx);
        }
        info!("Starting {:?} reset", self.kind);
        self.kind
    }

    fn enter_hard<S: SimulationQuery>(&mut self, ctx: &mut ResetContext<S>) {
        if let Some(boss) = ctx.episode.boss.take() {
            info!("Clearing boss reference {:?}", boss);
        }
        self.kind = ResetKind::Hard;
        self.phase = ResetPhase::AwaitingRespawn(self.debounce());
    }

    fn debounce(&self) -> Debounce {
        Debounce::new(self.config.consecutive_frames, self.config.max_wait_frames)
    }

    /// Advances by one frame. Errors leave the controller idle; call
    /// [`ResetController::abort`] to release anything the reset holds.
    pub fn poll<S: SimulationQuery>(
        &mut self,
        ctx: &mut ResetContext<S>,
    ) -> Result<ResetProgress, ResetError> {
        let phase = std::mem::replace(&mut self.phase, ResetPhase::Idle);
        let next = match phase {
            ResetPhase::Idle | ResetPhase::Ready => {
                self.phase = phase;
                return Ok(ResetProgress::Pending);
            }
            ResetPhase::AwaitingRespawn(mut debounce) => {
                let respawn_clear = ctx
                    .sim
                    .agent_status()
                    .map_or(true, |status| !status.hazard_respawning);
                match debounce.observe(respawn_clear) {
                    DebounceStatus::Waiting => ResetPhase::AwaitingRespawn(debounce),
                    DebounceStatus::Expired => {
                        return Err(ResetError::Timeout {
                            phase: "awaiting respawn",
                            frames: debounce.frames(),
                        })
                    }
                    DebounceStatus::Satisfied => {
                        self.reload(ctx)?;
                        ResetPhase::AwaitingInput(self.debounce())
                    }
                }
            }
            ResetPhase::AwaitingInput(mut debounce) => {
                let accepting = ctx
                    .sim
                    .agent_status()
                    .is_some_and(|status| status.accepting_input);
                match debounce.observe(accepting) {
                    DebounceStatus::Waiting => ResetPhase::AwaitingInput(debounce),
                    DebounceStatus::Expired => {
                        return Err(ResetError::Timeout {
                            phase: "awaiting input",
                            frames: debounce.frames(),
                        })
                    }
                    DebounceStatus::Satisfied => ResetPhase::CapturingBaseline,
                }
            }
            ResetPhase::CapturingBaseline => {
                self.capture(ctx)?;
                return Ok(self.finish(ctx));
            }
            ResetPhase::Blocking => {
                self.block(ctx.sim);
                ResetPhase::Restoring
            }
            ResetPhase::Restoring => match (ctx.sim.agent(), self.baseline) {
                (Some(agent), Some(baseline)) => {
                    self.restore(ctx, agent, baseline)?;
                    ResetPhase::Settling {
                        frames_left: self.config.settle_frames,
                    }
                }
                _ => {
                    warn!("Agent lost during soft reset, switching to hard reset");
                    self.release(ctx.sim);
                    self.enter_hard(ctx);
                    self.phase.clone()
                }
            },
            ResetPhase::Settling { frames_left } => {
                if frames_left > 0 {
                    ResetPhase::Settling {
                        frames_left: frames_left - 1,
                    }
                } else {
                    self.release(ctx.sim);
                    return Ok(self.finish(ctx));
                }
            }
        };
        debug!("Reset phase: {}", next.name());
        self.phase = next;
        Ok(ResetProgress::Pending)
    }

    /// Releases the damage block and invulnerability, if held, and forces
    /// the next reset onto the hard path.
    pub fn abort<S: SimulationQuery>(&mut self, sim: &mut S) {
        self.release(sim);
        self.phase = ResetPhase::Idle;
        self.force_hard = true;
    }

    fn reload<S: SimulationQuery>(&mut self, ctx: &mut ResetContext<S>) -> Result<(), ResetError> {
        if let Some(agent) = ctx.sim.agent() {
            if let Err(e) = ctx.sim.restore_vitals(agent) {
                warn!("Failed to restore agent vitals before reload: {}", e);
            }
        }
        info!(
            "Reloading scene '{}' via '{}'",
            self.config.scene.scene, self.config.scene.entry_gate
        );
        ctx.sim
            .begin_scene_transition(&self.config.scene)
            .map_err(sim_failure("scene transition"))
    }

    fn capture<S: SimulationQuery>(&mut self, ctx: &mut ResetContext<S>) -> Result<(), ResetError> {
        const PHASE: &str = "capturing baseline";
        let agent = ctx
            .sim
            .agent()
            .ok_or(ResetError::MissingAgent { phase: PHASE })?;

        ctx.episode.boss = resolve_boss(&ctx.sim.objects(), &self.boss);
        let baseline = EpisodeBaseline::capture(&*ctx.sim, agent, ctx.episode.boss)
            .ok_or(ResetError::MissingAgent { phase: PHASE })?;
        info!(
            "Captured baseline: agent at {:?}, boss {:?}",
            baseline.agent.position,
            baseline.boss.map(|boss| boss.position)
        );
        self.baseline = Some(baseline);
        ctx.hazards.clear(ctx.sensor);
        Ok(())
    }

    fn block<S: SimulationQuery>(&mut self, sim: &mut S) {
        sim.set_damage_blocked(true);
        self.damage_blocked = true;

        if let Some(agent) = sim.agent() {
            match sim.set_invulnerable(agent, true) {
                Ok(()) => self.invulnerable = Some(agent),
                Err(e) => warn!("Failed to make agent invulnerable: {}", e),
            }
            sim.cancel_pending_actions(agent);
        }
    }

    fn restore<S: SimulationQuery>(
        &mut self,
        ctx: &mut ResetContext<S>,
        agent: EntityId,
        baseline: EpisodeBaseline,
    ) -> Result<(), ResetError> {
        let sim = &mut *ctx.sim;

        sim.cancel_pending_actions(agent);
        sim.clear_transient_state(agent);
        sim.set_body(agent, baseline.agent.position, Vec2::ZERO)
            .map_err(sim_failure("restoring agent"))?;
        sim.restore_vitals(agent)
            .map_err(sim_failure("restoring agent"))?;
        reset_machines(sim, agent);

        if ctx.episode.boss.is_none() {
            ctx.episode.boss = resolve_boss(&sim.objects(), &self.boss);
        }
        match (ctx.episode.boss, baseline.boss) {
            (Some(boss), Some(snapshot)) => {
                sim.cancel_pending_actions(boss);
                sim.clear_transient_state(boss);
                sim.set_body(boss, snapshot.position, snapshot.velocity)
                    .map_err(sim_failure("restoring boss"))?;
                sim.set_health(boss, snapshot.health)
                    .map_err(sim_failure("restoring boss"))?;
                reset_machines(sim, boss);

                for default in &self.boss.variable_defaults {
                    if let Err(e) = sim.set_variable(boss, &default.machine, &default.name, default.value)
                    {
                        warn!("Failed to reset boss variable '{}': {}", default.name, e);
                    }
                }
                if let Some(state) = &self.boss.initial_state {
                    if let Err(e) = sim.set_state(boss, &self.boss.machine, state) {
                        warn!("Failed to force boss state '{}': {}", state, e);
                    }
                }
            }
            _ => warn!("No boss baseline to restore"),
        }

        ctx.hazards.clear(ctx.sensor);
        let removed = ctx.hazards.deactivate_live(ctx.sim);
        if removed > 0 {
            info!("Deactivated {} live hazards", removed);
        }
        Ok(())
    }

    fn release<S: SimulationQuery>(&mut self, sim: &mut S) {
        if self.damage_blocked {
            sim.set_damage_blocked(false);
            self.damage_blocked = false;
        }
        if let Some(agent) = self.invulnerable.take() {
            if let Err(e) = sim.set_invulnerable(agent, false) {
                warn!("Failed to clear agent invulnerability: {}", e);
            }
        }
    }

    fn finish<S: SimulationQuery>(&mut self, ctx: &mut ResetContext<S>) -> ResetProgress {
        ctx.episode.restart(ctx.sim.time());
        ctx.injector.reset_inputs();
        ctx.sim.set_input_override(ctx.injector.effective());
        self.force_hard = false;
        self.phase = ResetPhase::Ready;
        info!("{:?} reset complete", self.kind);
        ResetProgress::Complete
    }
}

/// Resets every behaviour machine on the entity. A machine that fails is
/// logged and skipped.
fn reset_machines<S: SimulationQuery>(sim: &mut S, entity: EntityId) {
    for machine in sim.machines(entity) {
        if let Err(e) = sim.reset_machine(entity, &machine) {
            warn!("Failed to reset machine '{}' on {:?}: {}", machine, entity, e);
        }
    }
}
