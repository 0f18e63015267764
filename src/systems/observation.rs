use glam::Vec2;

use super::sensor::ProximitySensor;
use crate::components::{AgentAnimation, BossAttackState, BossStateMapper};
use crate::resources::EpisodeState;
use crate::server::{BossConfig, Observation};
use crate::simulation::SimulationQuery;

/// Builds one complete observation from simulation queries.
///
/// Reads only. The single piece of state it advances is the boss phase
/// tracker, which is memoised on the boss state name.
#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    boss: BossConfig,
    states: BossStateMapper,
}

fn flag(value: bool) -> u8 {
    value as u8
}

impl ObservationEncoder {
    pub fn new(boss: BossConfig) -> Self {
        Self {
            boss,
            states: BossStateMapper::default(),
        }
    }

    pub fn encode<S: SimulationQuery>(
        &mut self,
        sim: &S,
        sensor: &mut ProximitySensor,
        episode: &mut EpisodeState,
    ) -> Observation {
        let mut obs = Observation {
            boss_facing_right: 1,
            ..Default::default()
        };

        let agent = sim.agent();
        let agent_body = agent.and_then(|id| sim.body(id));

        if let Some(body) = agent_body {
            obs.agent_pos_x = body.position.x;
            obs.agent_pos_y = body.position.y;
            obs.agent_vel_x = body.velocity.x;
            obs.agent_vel_y = body.velocity.y;
            obs.agent_facing_right = flag(body.facing_right);
        }

        if let Some(status) = agent.and(sim.agent_status()) {
            obs.agent_health = status.health;
            obs.agent_max_health = status.max_health;
            obs.agent_silk = status.silk;
            obs.agent_grounded = flag(status.grounded);
            obs.agent_can_dash = flag(status.can_dash);
            obs.agent_invincible = flag(status.invincible);
            obs.agent_can_attack = flag(status.can_attack);
            obs.agent_attacking = flag(status.attacking);
            obs.agent_dashing = flag(status.dashing);
            obs.agent_jumping = flag(status.jumping);
            obs.agent_falling = flag(status.falling);
            obs.agent_focusing = flag(status.focusing);
            obs.agent_casting = flag(status.casting);
            obs.agent_recoiling = flag(status.recoiling);
            obs.agent_wall_sliding = flag(status.wall_sliding);
        }

        if let Some(id) = agent {
            match sim.animation(id) {
                Some(animation) => {
                    obs.agent_animation_state = AgentAnimation::from_clip(&animation.clip).tag();
                    obs.agent_animation_progress = animation.progress();
                }
                None => obs.agent_animation_state = AgentAnimation::Unknown.tag(),
            }
        }

        let origin = agent_body.map_or(Vec2::ZERO, |body| body.position);
        let reading = sensor.cast(origin, sim);
        obs.ray_distances = reading.normalized();
        obs.ray_hit_types = reading.class_tags();

        let boss = episode
            .boss
            .and_then(|id| sim.body(id).map(|body| (id, body)));
        if let Some((id, body)) = boss {
            obs.boss_pos_x = body.position.x;
            obs.boss_pos_y = body.position.y;
            obs.boss_vel_x = body.velocity.x;
            obs.boss_vel_y = body.velocity.y;
            obs.boss_facing_right = flag(body.facing_right);
            obs.boss_health = sim.health(id).unwrap_or(0);
            obs.boss_max_health = self.boss.max_health;

            let state = sim.active_state(id, &self.boss.machine);
            let attack = match state.as_deref() {
                Some(name) => {
                    episode.phase.observe(name);
                    self.states.classify(name)
                }
                None => BossAttackState::Idle,
            };
            obs.boss_attack_state = attack.tag();
            obs.boss_animation_progress = sim.animation(id).map_or(0.0, |a| a.progress());
        }
        obs.boss_phase = episode.phase.phase();

        obs.episode_time = episode.clock.elapsed_seconds(sim.time());
        obs
    }
}
