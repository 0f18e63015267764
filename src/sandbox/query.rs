use glam::Vec2;

use super::actors::{find, find_mut, Machine};
use super::{ArenaSim, AGENT_HALF_WIDTH, BOSS_RADIUS, DAMAGER_RADIUS, FIXED_DELTA, WALL_X};
use crate::simulation::{
    AgentStatus, AnimationFrame, Body, EntityId, InputState, LayerMask, SceneLoad, SimError,
    SimulationQuery, Variable, WorldHit, WorldObject,
};
use crate::utils::{math, ENEMY_LAYER, EPISODE_SCENE, PROJECTILE_LAYER, TERRAIN_LAYER};

const CLIP_FRAMES: u32 = 8;
const TICKS_PER_FRAME: u32 = 3;

impl ArenaSim {
    fn machines_of(&self, entity: EntityId) -> Option<&[Machine]> {
        if let Some(agent) = self.agent.as_ref().filter(|a| a.id == entity) {
            return Some(agent.machines.as_slice());
        }
        if let Some(boss) = self.boss.as_ref().filter(|b| b.id == entity) {
            return Some(boss.machines.as_slice());
        }
        self.objects
            .iter()
            .find(|object| object.id == entity)
            .map(|object| object.machine.as_slice())
    }

    fn machines_of_mut(&mut self, entity: EntityId) -> Option<&mut [Machine]> {
        if let Some(agent) = self.agent.as_mut().filter(|a| a.id == entity) {
            return Some(agent.machines.as_mut_slice());
        }
        if let Some(boss) = self.boss.as_mut().filter(|b| b.id == entity) {
            return Some(boss.machines.as_mut_slice());
        }
        self.objects
            .iter_mut()
            .find(|object| object.id == entity)
            .map(|object| object.machine.as_mut_slice())
    }

    fn machine_mut(&mut self, entity: EntityId, machine: &str) -> Result<&mut Machine, SimError> {
        let machines = self
            .machines_of_mut(entity)
            .ok_or(SimError::MissingEntity(entity))?;
        find_mut(machines, machine).ok_or_else(|| SimError::UnknownMachine {
            entity,
            machine: machine.to_string(),
        })
    }

    fn agent_clip(&self) -> Option<(&'static str, u32)> {
        let agent = self.agent.as_ref()?;
        let status = self.agent_status()?;
        let clip = if status.hazard_respawning {
            "Hazard Respawn"
        } else if status.recoiling {
            "Recoil"
        } else if status.dashing {
            "Dash"
        } else if status.attacking {
            "Slash"
        } else if status.focusing {
            "BindCharge Ground"
        } else if status.jumping {
            "Airborne"
        } else if status.falling {
            "Fall"
        } else if agent.body.velocity.x != 0.0 {
            "Run"
        } else {
            "Idle"
        };
        Some((clip, agent.anim_ticks))
    }
}

impl SimulationQuery for ArenaSim {
    fn time(&self) -> f32 {
        self.time
    }

    fn fixed_delta(&self) -> f32 {
        FIXED_DELTA
    }

    fn fixed_tick_count(&self) -> u64 {
        self.ticks
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    fn agent(&self) -> Option<EntityId> {
        self.agent.as_ref().map(|agent| agent.id)
    }

    fn agent_status(&self) -> Option<AgentStatus> {
        let agent = self.agent.as_ref()?;
        let accepting_input =
            agent.input_delay_frames == 0 && agent.respawn_frames == 0 && self.loading.is_none();
        let airborne = !agent.grounded;
        let at_wall = agent.body.position.x.abs() >= WALL_X - AGENT_HALF_WIDTH;
        let focusing = find(&agent.machines, "Bind").is_some_and(|m| m.is("Charging"));

        Some(AgentStatus {
            health: agent.health,
            max_health: agent.max_health,
            silk: agent.silk,
            max_silk: agent.max_silk,
            grounded: agent.grounded,
            can_dash: accepting_input && agent.dash_cooldown == 0,
            can_attack: accepting_input && agent.attack_cooldown == 0,
            invincible: agent.invulnerable || agent.hit_invulnerable,
            attacking: agent.attack_ticks > 0,
            dashing: agent.dash_ticks > 0,
            jumping: airborne && agent.body.velocity.y > 0.0,
            falling: airborne && agent.body.velocity.y <= 0.0,
            focusing,
            casting: agent.cast_ticks > 0,
            recoiling: agent.recoil_ticks > 0,
            wall_sliding: airborne && at_wall,
            accepting_input,
            hazard_respawning: agent.respawn_frames > 0,
        })
    }

    fn body(&self, entity: EntityId) -> Option<Body> {
        if let Some(agent) = self.agent.as_ref().filter(|a| a.id == entity) {
            return Some(agent.body);
        }
        if let Some(boss) = self.boss.as_ref().filter(|b| b.id == entity) {
            return Some(boss.body);
        }
        self.objects
            .iter()
            .find(|object| object.id == entity)
            .map(|object| Body {
                position: object.position,
                ..Default::default()
            })
    }

    fn health(&self, entity: EntityId) -> Option<i32> {
        if let Some(agent) = self.agent.as_ref().filter(|a| a.id == entity) {
            return Some(agent.health);
        }
        self.boss
            .as_ref()
            .filter(|b| b.id == entity)
            .map(|boss| boss.health)
    }

    fn animation(&self, entity: EntityId) -> Option<AnimationFrame> {
        if self.agent.as_ref().is_some_and(|a| a.id == entity) {
            let (clip, ticks) = self.agent_clip()?;
            return Some(AnimationFrame {
                clip: clip.to_string(),
                frame: (ticks / TICKS_PER_FRAME) % CLIP_FRAMES,
                frame_count: CLIP_FRAMES,
            });
        }
        let boss = self.boss.as_ref().filter(|b| b.id == entity)?;
        let control = find(&boss.machines, "Control")?;
        Some(AnimationFrame {
            clip: control.active.clone(),
            frame: (boss.state_ticks / TICKS_PER_FRAME) % CLIP_FRAMES,
            frame_count: CLIP_FRAMES,
        })
    }

    fn set_body(&mut self, entity: EntityId, position: Vec2, velocity: Vec2) -> Result<(), SimError> {
        if let Some(agent) = self.agent.as_mut().filter(|a| a.id == entity) {
            agent.body.position = position;
            agent.body.velocity = velocity;
            agent.grounded = position.y <= super::GROUND_Y;
            return Ok(());
        }
        if let Some(boss) = self.boss.as_mut().filter(|b| b.id == entity) {
            boss.body.position = position;
            boss.body.velocity = velocity;
            return Ok(());
        }
        let object = self
            .objects
            .iter_mut()
            .find(|object| object.id == entity)
            .ok_or(SimError::MissingEntity(entity))?;
        object.position = position;
        if let Some(damager) = object.damager.as_mut() {
            damager.position = position;
        }
        Ok(())
    }

    fn set_health(&mut self, entity: EntityId, health: i32) -> Result<(), SimError> {
        if let Some(agent) = self.agent.as_mut().filter(|a| a.id == entity) {
            agent.health = health.clamp(0, agent.max_health);
            return Ok(());
        }
        if let Some(boss) = self.boss.as_mut().filter(|b| b.id == entity) {
            boss.health = health.max(0);
            return Ok(());
        }
        Err(SimError::MissingEntity(entity))
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
        hits: &mut Vec<WorldHit>,
    ) {
        hits.clear();

        if mask.contains(TERRAIN_LAYER) {
            for block in &self.terrain {
                if let Some(distance) = block
                    .ray_entry(origin, direction)
                    .filter(|d| *d > 0.0 && *d <= max_distance)
                {
                    hits.push(WorldHit {
                        distance,
                        layer: TERRAIN_LAYER,
                        has_health: false,
                        damages_agent: false,
                    });
                }
            }
        }

        if mask.contains(ENEMY_LAYER) {
            if let Some(boss) = self.boss.as_ref().filter(|boss| boss.health > 0) {
                if let Some(distance) = math::ray_circle_intersection(
                    origin,
                    direction,
                    boss.body.position,
                    BOSS_RADIUS,
                    max_distance,
                ) {
                    hits.push(WorldHit {
                        distance,
                        layer: ENEMY_LAYER,
                        has_health: true,
                        damages_agent: true,
                    });
                }
            }
        }

        if mask.contains(PROJECTILE_LAYER) {
            let damagers = self
                .objects
                .iter()
                .filter(|object| object.active)
                .filter_map(|object| object.damager)
                .filter(|damager| damager.enabled);
            for damager in damagers {
                if let Some(distance) = math::ray_circle_intersection(
                    origin,
                    direction,
                    damager.position,
                    DAMAGER_RADIUS,
                    max_distance,
                ) {
                    hits.push(WorldHit {
                        distance,
                        layer: PROJECTILE_LAYER,
                        has_health: false,
                        damages_agent: true,
                    });
                }
            }
        }
    }

    fn objects(&self) -> Vec<WorldObject> {
        let boss = self.boss.iter().map(|boss| WorldObject {
            id: boss.id,
            name: boss.name.clone(),
            active: true,
            position: boss.body.position,
            health: Some(boss.health),
            damager: None,
        });
        let transient = self.objects.iter().map(|object| WorldObject {
            id: object.id,
            name: object.name.clone(),
            active: object.active,
            position: object.position,
            health: None,
            damager: object.damager,
        });
        boss.chain(transient).collect()
    }

    fn set_object_active(&mut self, entity: EntityId, active: bool) -> Result<(), SimError> {
        let object = self
            .objects
            .iter_mut()
            .find(|object| object.id == entity)
            .ok_or(SimError::MissingEntity(entity))?;
        object.active = active;
        Ok(())
    }

    fn machines(&self, entity: EntityId) -> Vec<String> {
        self.machines_of(entity)
            .map(|machines| machines.iter().map(|m| m.name.clone()).collect())
            .unwrap_or_default()
    }

    fn active_state(&self, entity: EntityId, machine: &str) -> Option<String> {
        find(self.machines_of(entity)?, machine).map(|m| m.active.clone())
    }

    fn set_state(&mut self, entity: EntityId, machine: &str, state: &str) -> Result<(), SimError> {
        self.machine_mut(entity, machine)?.set_state(state)?;
        if let Some(boss) = self.boss.as_mut().filter(|b| b.id == entity) {
            boss.state_ticks = 0;
        }
        Ok(())
    }

    fn reset_machine(&mut self, entity: EntityId, machine: &str) -> Result<(), SimError> {
        self.machine_mut(entity, machine)?.reset()
    }

    fn variable(&self, entity: EntityId, machine: &str, name: &str) -> Option<Variable> {
        find(self.machines_of(entity)?, machine).and_then(|m| m.variables.get(name).copied())
    }

    fn set_variable(
        &mut self,
        entity: EntityId,
        machine: &str,
        name: &str,
        value: Variable,
    ) -> Result<(), SimError> {
        self.machine_mut(entity, machine)?.set_variable(name, value)
    }

    fn set_damage_blocked(&mut self, blocked: bool) {
        self.damage_blocked = blocked;
    }

    fn set_invulnerable(&mut self, entity: EntityId, invulnerable: bool) -> Result<(), SimError> {
        let agent = self
            .agent
            .as_mut()
            .filter(|a| a.id == entity)
            .ok_or(SimError::MissingEntity(entity))?;
        agent.invulnerable = invulnerable;
        Ok(())
    }

    fn cancel_pending_actions(&mut self, entity: EntityId) {
        if let Some(agent) = self.agent.as_mut().filter(|a| a.id == entity) {
            agent.pending.clear();
        }
        if self.boss.as_ref().is_some_and(|b| b.id == entity) {
            // Attack objects the boss already released die with the pattern.
            self.objects.retain(|object| object.lifetime.is_none());
        }
    }

    fn clear_transient_state(&mut self, entity: EntityId) {
        if let Some(agent) = self.agent.as_mut().filter(|a| a.id == entity) {
            agent.clear_transient();
        }
        if let Some(boss) = self.boss.as_mut().filter(|b| b.id == entity) {
            boss.clear_transient();
        }
    }

    fn restore_vitals(&mut self, entity: EntityId) -> Result<(), SimError> {
        let agent = self
            .agent
            .as_mut()
            .filter(|a| a.id == entity)
            .ok_or(SimError::MissingEntity(entity))?;
        agent.health = agent.max_health;
        agent.silk = agent.max_silk;
        Ok(())
    }

    fn begin_scene_transition(&mut self, load: &SceneLoad) -> Result<(), SimError> {
        if load.scene != EPISODE_SCENE {
            return Err(SimError::Rejected(format!("unknown scene '{}'", load.scene)));
        }
        if self.loading.is_some() {
            return Err(SimError::Rejected("scene transition already running".to_string()));
        }
        self.begin_loading(&load.scene);
        Ok(())
    }

    fn set_input_override(&mut self, inputs: Option<InputState>) {
        self.input = inputs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{AGENT_SPAWN, BOSS_SPAWN};
    use approx::assert_relative_eq;

    #[test]
    fn test_raycast_reports_boss_and_wall() {
        let sim = ArenaSim::arena();
        let mut hits = Vec::new();
        sim.raycast(AGENT_SPAWN, Vec2::X, 100.0, LayerMask::ALL, &mut hits);

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, BOSS_SPAWN.x - AGENT_SPAWN.x - BOSS_RADIUS, epsilon = 1e-4);
        assert!(hits[0].has_health);
        assert_eq!(hits[1].layer, TERRAIN_LAYER);
        assert_relative_eq!(hits[1].distance, WALL_X - AGENT_SPAWN.x, epsilon = 1e-4);

        sim.raycast(AGENT_SPAWN, Vec2::X, 100.0, LayerMask::layer(TERRAIN_LAYER), &mut hits);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_restore_vitals_refills_health_and_silk() {
        let mut sim = ArenaSim::arena();
        let agent = sim.agent().unwrap();
        assert!(sim.hit_agent());
        assert_eq!(sim.agent_status().unwrap().silk, 0);

        sim.restore_vitals(agent).unwrap();
        let status = sim.agent_status().unwrap();
        assert_eq!(status.health, status.max_health);
        assert_eq!(status.silk, crate::sandbox::AGENT_MAX_SILK);

        let boss = sim.boss().unwrap();
        assert!(matches!(
            sim.restore_vitals(boss),
            Err(SimError::MissingEntity(_))
        ));
    }

    #[test]
    fn test_machine_reset_restores_initial_state_and_variables() {
        let mut sim = ArenaSim::arena();
        let boss = sim.boss().unwrap();
        sim.set_state(boss, "Control", "Charge").unwrap();
        sim.set_variable(boss, "Control", "Attack Count", Variable::Int(4))
            .unwrap();

        sim.reset_machine(boss, "Control").unwrap();
        assert_eq!(sim.active_state(boss, "Control").as_deref(), Some("Idle"));
        assert_eq!(
            sim.variable(boss, "Control", "Attack Count"),
            Some(Variable::Int(0))
        );
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let mut sim = ArenaSim::arena();
        let boss = sim.boss().unwrap();
        assert!(matches!(
            sim.set_state(boss, "Control", "Dance"),
            Err(SimError::UnknownState { .. })
        ));
        assert!(matches!(
            sim.set_variable(boss, "Brain", "x", Variable::Bool(true)),
            Err(SimError::UnknownMachine { .. })
        ));
        assert!(matches!(
            sim.set_health(EntityId(999), 1),
            Err(SimError::MissingEntity(_))
        ));
    }

    #[test]
    fn test_failing_machine_survives_respawn() {
        let mut sim = ArenaSim::arena();
        sim.fail_machine_reset("Stun Control");
        let boss = sim.boss().unwrap();
        assert!(sim.reset_machine(boss, "Stun Control").is_err());
        assert!(sim.reset_machine(boss, "Control").is_ok());
    }

    #[test]
    fn test_agent_starts_idle_and_accepting() {
        let sim = ArenaSim::arena();
        let agent = sim.agent().unwrap();
        let status = sim.agent_status().unwrap();
        assert!(status.accepting_input);
        assert!(status.grounded);
        assert_eq!(sim.animation(agent).unwrap().clip, "Idle");
    }
}
