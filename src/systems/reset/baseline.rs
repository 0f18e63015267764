use glam::Vec2;

use crate::simulation::{EntityId, SimulationQuery};

/// Kinematic and health snapshot of one actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: i32,
}

/// Episode-start state captured after a successful hard reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeBaseline {
    pub agent: ActorSnapshot,
    pub boss: Option<ActorSnapshot>,
}

impl EpisodeBaseline {
    /// Snapshots the agent and, when resolved, the boss. `None` if the agent
    /// has no body.
    pub fn capture<S: SimulationQuery>(
        sim: &S,
        agent: EntityId,
        boss: Option<EntityId>,
    ) -> Option<Self> {
        let agent = snapshot(sim, agent)?;
        let boss = boss.and_then(|id| snapshot(sim, id));
        Some(Self { agent, boss })
    }
}

fn snapshot<S: SimulationQuery>(sim: &S, id: EntityId) -> Option<ActorSnapshot> {
    let body = sim.body(id)?;
    Some(ActorSnapshot {
        position: body.position,
        velocity: body.velocity,
        health: sim.health(id).unwrap_or(0),
    })
}
