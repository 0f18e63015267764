//! Deterministic stand-in for the game host: one agent, one boss, a walled
//! floor and the boss's transient attack objects.
//!
//! Used by the `simlink_host` binary and by the test suite. Fixed ticks are
//! driven with [`ArenaSim::advance`]; frame-rate work such as scene loading
//! runs in [`ArenaSim::end_frame`].

mod actors;
mod geometry;
mod query;

use bevy::prelude::*;
use glam::Vec2;

use crate::simulation::{Damager, EntityId, InputState};
use crate::utils::{BOSS_MAX_HEALTH, CIRCLE_SLASH_RADIUS, EPISODE_SCENE};
use actors::{find_mut, Agent, ArenaObject, Boss, Machine, Pending, PendingKind};
use geometry::Aabb;

pub const FIXED_DELTA: f32 = 0.02;
pub const GRAVITY: f32 = 40.0;
pub const RUN_SPEED: f32 = 8.0;
pub const JUMP_SPEED: f32 = 15.0;
pub const DASH_SPEED: f32 = 20.0;
pub const GROUND_Y: f32 = 0.5;
pub const WALL_X: f32 = 20.0;
pub const AGENT_SPAWN: Vec2 = Vec2::new(-5.0, GROUND_Y);
pub const BOSS_SPAWN: Vec2 = Vec2::new(5.0, GROUND_Y);
pub const BOSS_RADIUS: f32 = 0.8;
pub const AGENT_MAX_HEALTH: i32 = 5;
pub const AGENT_MAX_SILK: i32 = 9;

/// Frames a scene transition takes before actors spawn.
pub const LOAD_FRAMES: u32 = 5;
/// Frames after spawning before the agent takes input.
pub const INPUT_DELAY_FRAMES: u32 = 5;

const AGENT_HALF_WIDTH: f32 = 0.5;
const DAMAGER_RADIUS: f32 = 0.5;
const BOSS_STATE_TICKS: u32 = 30;
const BOSS_PATTERN: [&str; 7] = [
    "Idle",
    "Hop",
    "ComboSlash 1",
    "ComboSlash 2",
    "Idle",
    "Charge Antic",
    "Charge",
];
const CIRCLE_SLASH_NAME: &str = "lace_circle_slash(Clone)";
const CIRCLE_SLASH_ACTIVE: std::ops::Range<u32> = 5..15;
const CIRCLE_SLASH_LIFETIME: u32 = 25;
const ATTACK_TICKS: u32 = 10;
const ATTACK_COOLDOWN: u32 = 20;
const ATTACK_REACH: f32 = 2.0;
const ATTACK_DAMAGE: i32 = 10;
const DASH_TICKS: u32 = 8;
const DASH_COOLDOWN: u32 = 30;
const RECOIL_TICKS: u32 = 10;
const HIT_INVULNERABLE_TICKS: u32 = 60;
const BIND_COST: i32 = 3;
const CAST_COST: i32 = 2;
const CAST_TICKS: u32 = 12;

/// Scene transition in flight.
#[derive(Debug, Clone, PartialEq)]
struct Loading {
    scene: String,
    frames_left: u32,
}

#[derive(Debug, Clone, PartialEq, Resource)]
pub struct ArenaSim {
    scene: String,
    time: f32,
    ticks: u64,
    time_scale: f32,
    next_id: u64,
    terrain: Vec<Aabb>,
    agent: Option<Agent>,
    boss: Option<Boss>,
    objects: Vec<ArenaObject>,
    input: Option<InputState>,
    damage_blocked: bool,
    loading: Option<Loading>,
    stall_loading: bool,
    failing_machines: Vec<String>,
}

impl ArenaSim {
    /// No terrain and no actors.
    pub fn empty() -> Self {
        Self {
            scene: EPISODE_SCENE.to_string(),
            time: 0.0,
            ticks: 0,
            time_scale: 1.0,
            next_id: 1,
            terrain: Vec::new(),
            agent: None,
            boss: None,
            objects: Vec::new(),
            input: None,
            damage_blocked: false,
            loading: None,
            stall_loading: false,
            failing_machines: Vec::new(),
        }
    }

    /// Walled floor with both actors spawned and the agent taking input.
    pub fn arena() -> Self {
        let mut sim = Self::empty();
        sim.add_terrain(Vec2::new(-WALL_X - 1.0, -1.0), Vec2::new(WALL_X + 1.0, 0.0));
        sim.add_terrain(Vec2::new(-WALL_X - 1.0, -1.0), Vec2::new(-WALL_X, 15.0));
        sim.add_terrain(Vec2::new(WALL_X, -1.0), Vec2::new(WALL_X + 1.0, 15.0));
        sim.spawn_actors(0);
        sim
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn_actors(&mut self, input_delay: u32) {
        let mut agent = Agent::new(self.allocate(), AGENT_SPAWN, AGENT_MAX_HEALTH, AGENT_MAX_SILK);
        agent.input_delay_frames = input_delay;
        let boss = Boss::new(self.allocate(), BOSS_SPAWN, BOSS_MAX_HEALTH, &BOSS_PATTERN);
        self.agent = Some(agent);
        self.boss = Some(boss);
        self.apply_machine_failures();
    }

    fn apply_machine_failures(&mut self) {
        let failing = &self.failing_machines;
        let agent = self.agent.iter_mut().flat_map(|a| a.machines.iter_mut());
        let boss = self.boss.iter_mut().flat_map(|b| b.machines.iter_mut());
        for machine in agent.chain(boss) {
            machine.fail_reset = failing.contains(&machine.name);
        }
    }

    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_damage_blocked(&self) -> bool {
        self.damage_blocked
    }

    pub fn input_override(&self) -> Option<InputState> {
        self.input
    }

    pub fn boss(&self) -> Option<EntityId> {
        self.boss.as_ref().map(|boss| boss.id)
    }

    pub fn add_terrain(&mut self, min: Vec2, max: Vec2) {
        self.terrain.push(Aabb::new(min, max));
    }

    /// Spawns a persistent object with a disabled damager and a `Control`
    /// machine over `Idle`, `Attacking` and `Recover`.
    pub fn spawn_hazard(&mut self, name: &str, position: Vec2) -> EntityId {
        let id = self.allocate();
        self.objects.push(ArenaObject {
            id,
            name: name.to_string(),
            active: true,
            position,
            damager: Some(Damager {
                position,
                enabled: false,
            }),
            machine: Some(Machine::new("Control", &["Idle", "Attacking", "Recover"], &[])),
            age: 0,
            lifetime: None,
        });
        id
    }

    pub fn set_damager_enabled(&mut self, id: EntityId, enabled: bool) {
        if let Some(damager) = self
            .objects
            .iter_mut()
            .find(|object| object.id == id)
            .and_then(|object| object.damager.as_mut())
        {
            damager.enabled = enabled;
        }
    }

    pub fn despawn(&mut self, id: EntityId) {
        self.objects.retain(|object| object.id != id);
    }

    /// Removes the agent, as when the host is between scenes.
    pub fn despawn_agent(&mut self) {
        self.agent = None;
    }

    /// Makes every machine named `name` fail to reset, now and after respawns.
    pub fn fail_machine_reset(&mut self, name: &str) {
        self.failing_machines.push(name.to_string());
        self.apply_machine_failures();
    }

    /// Starts the agent's post-respawn routine for `frames` frames.
    pub fn trigger_hazard_respawn(&mut self, frames: u32) {
        if let Some(agent) = self.agent.as_mut() {
            agent.respawn_frames = frames;
        }
    }

    /// Holds scene transitions at their last loading frame.
    pub fn stall_loading(&mut self, stall: bool) {
        self.stall_loading = stall;
    }

    /// Deals one hit to the agent, subject to damage blocking and
    /// invulnerability. Returns whether it landed.
    pub fn hit_agent(&mut self) -> bool {
        let Some(agent) = self.agent.as_mut() else {
            return false;
        };
        if self.damage_blocked || agent.invulnerable || agent.hit_invulnerable {
            return false;
        }
        agent.health = (agent.health - 1).max(0);
        agent.hit_invulnerable = true;
        agent.recoil_ticks = RECOIL_TICKS;
        agent.pending.push(Pending {
            kind: PendingKind::EndHitInvulnerability,
            ticks_left: HIT_INVULNERABLE_TICKS,
        });
        true
    }

    /// Runs one fixed tick. Returns false, doing nothing, while time is frozen.
    pub fn advance(&mut self) -> bool {
        if self.time_scale <= 0.0 {
            return false;
        }
        self.time += FIXED_DELTA;
        self.ticks += 1;

        let inputs = self.input.unwrap_or_default();
        self.tick_agent(inputs);
        self.tick_boss();
        self.tick_objects();
        self.resolve_contacts();
        true
    }

    /// Frame-rate bookkeeping: scene loading and spawn delays.
    pub fn end_frame(&mut self) {
        if let Some(agent) = self.agent.as_mut() {
            agent.input_delay_frames = agent.input_delay_frames.saturating_sub(1);
            agent.respawn_frames = agent.respawn_frames.saturating_sub(1);
        }

        let Some(loading) = self.loading.as_mut() else {
            return;
        };
        if loading.frames_left > 1 {
            loading.frames_left -= 1;
            return;
        }
        if self.stall_loading {
            return;
        }
        let scene = loading.scene.clone();
        self.loading = None;
        info!("Scene '{}' loaded", scene);
        self.scene = scene;
        self.damage_blocked = false;
        self.spawn_actors(INPUT_DELAY_FRAMES);
    }

    fn begin_loading(&mut self, scene: &str) {
        self.agent = None;
        self.boss = None;
        self.objects.clear();
        self.loading = Some(Loading {
            scene: scene.to_string(),
            frames_left: LOAD_FRAMES,
        });
    }

    fn tick_agent(&mut self, inputs: InputState) {
        let Some(agent) = self.agent.as_mut() else {
            return;
        };
        let accepting = agent.input_delay_frames == 0 && agent.respawn_frames == 0;
        let inputs = if accepting { inputs } else { InputState::default() };

        let mut expired = Vec::new();
        agent.pending.retain_mut(|pending| {
            pending.ticks_left = pending.ticks_left.saturating_sub(1);
            if pending.ticks_left == 0 {
                expired.push(pending.kind);
            }
            pending.ticks_left > 0
        });
        for kind in expired {
            match kind {
                PendingKind::EndHitInvulnerability => agent.hit_invulnerable = false,
            }
        }
        agent.attack_cooldown = agent.attack_cooldown.saturating_sub(1);
        agent.dash_cooldown = agent.dash_cooldown.saturating_sub(1);
        agent.recoil_ticks = agent.recoil_ticks.saturating_sub(1);
        agent.attack_ticks = agent.attack_ticks.saturating_sub(1);
        agent.dash_ticks = agent.dash_ticks.saturating_sub(1);
        agent.cast_ticks = agent.cast_ticks.saturating_sub(1);

        let direction = match (inputs.left, inputs.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        if direction != 0.0 {
            agent.body.facing_right = direction > 0.0;
        }
        let facing = if agent.body.facing_right { 1.0 } else { -1.0 };

        if inputs.dash && agent.dash_cooldown == 0 {
            agent.dash_ticks = DASH_TICKS;
            agent.dash_cooldown = DASH_COOLDOWN;
        }
        if agent.dash_ticks > 0 {
            agent.body.velocity = Vec2::new(facing * DASH_SPEED, 0.0);
        } else {
            agent.body.velocity.x = direction * RUN_SPEED;
            if inputs.jump && agent.grounded {
                agent.body.velocity.y = JUMP_SPEED;
                agent.grounded = false;
            }
            if !agent.grounded {
                agent.body.velocity.y -= GRAVITY * FIXED_DELTA;
            }
        }

        let mut landed_hit = false;
        if inputs.attack && agent.attack_cooldown == 0 {
            agent.attack_ticks = ATTACK_TICKS;
            agent.attack_cooldown = ATTACK_COOLDOWN;
            if let Some(boss) = self.boss.as_mut() {
                let offset = boss.body.position - agent.body.position;
                if boss.health > 0
                    && offset.x * facing >= 0.0
                    && offset.x.abs() <= ATTACK_REACH
                    && offset.y.abs() <= 1.5
                {
                    boss.health = (boss.health - ATTACK_DAMAGE).max(0);
                    landed_hit = true;
                }
            }
        }
        if landed_hit {
            agent.silk = (agent.silk + 1).min(agent.max_silk);
        }

        let focusing = inputs.heal && agent.grounded && agent.silk >= BIND_COST;
        if focusing && agent.health < agent.max_health {
            agent.silk -= BIND_COST;
            agent.health += 1;
        }
        if inputs.skill && agent.cast_ticks == 0 && agent.silk >= CAST_COST {
            agent.silk -= CAST_COST;
            agent.cast_ticks = CAST_TICKS;
        }

        agent.body.position += agent.body.velocity * FIXED_DELTA;
        if agent.body.position.y <= GROUND_Y {
            agent.body.position.y = GROUND_Y;
            agent.body.velocity.y = 0.0;
            agent.grounded = true;
        }
        let limit = WALL_X - AGENT_HALF_WIDTH;
        agent.body.position.x = agent.body.position.x.clamp(-limit, limit);
        agent.anim_ticks += 1;

        let movement = if !agent.grounded {
            "Airborne"
        } else if agent.body.velocity.x != 0.0 {
            "Run"
        } else {
            "Idle"
        };
        let sprint = if agent.dash_ticks > 0 { "Active" } else { "Inactive" };
        let bind = if focusing { "Charging" } else { "Idle" };
        for (machine, state) in [("Movement", movement), ("Sprint", sprint), ("Bind", bind)] {
            if let Some(machine) = find_mut(&mut agent.machines, machine) {
                if !machine.is(state) {
                    machine.active = state.to_string();
                    agent.anim_ticks = 0;
                }
            }
        }
    }

    fn tick_boss(&mut self) {
        let agent_x = self.agent.as_ref().map(|agent| agent.body.position.x);
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        if boss.health <= 0 {
            boss.body.velocity = Vec2::ZERO;
            return;
        }

        let thresholds = [(1, 2, "P2 Shift"), (2, 1, "P3 Roar")];
        let mut entered = None;
        for (phase, thirds, state) in thresholds {
            if boss.phase_reached < phase && boss.health * 3 <= boss.max_health * thirds {
                boss.phase_reached = phase;
                entered = Some(state);
            }
        }

        boss.state_ticks += 1;
        if entered.is_none() && boss.state_ticks >= BOSS_STATE_TICKS {
            boss.pattern_index = (boss.pattern_index + 1) % BOSS_PATTERN.len();
            entered = Some(BOSS_PATTERN[boss.pattern_index]);
        }

        let mut spawn_slash = false;
        if let Some(state) = entered {
            boss.state_ticks = 0;
            if let Some(control) = find_mut(&mut boss.machines, "Control") {
                control.active = state.to_string();
                if state.contains("Slash") || state == "Charge" {
                    control.bump("Attack Count");
                }
            }
            spawn_slash = state == "ComboSlash 2";
        }

        let state = boss
            .machines
            .iter()
            .find(|machine| machine.name == "Control")
            .map(|machine| machine.active.clone())
            .unwrap_or_default();
        if let Some(x) = agent_x {
            if state == "Idle" || state == "Hop" {
                boss.body.facing_right = x > boss.body.position.x;
            }
        }
        let facing = if boss.body.facing_right { 1.0 } else { -1.0 };
        boss.body.velocity.x = match state.as_str() {
            "Hop" => facing * 3.0,
            "Charge" => facing * 10.0,
            _ => 0.0,
        };
        boss.body.position += boss.body.velocity * FIXED_DELTA;
        let limit = WALL_X - BOSS_RADIUS;
        boss.body.position.x = boss.body.position.x.clamp(-limit, limit);

        if spawn_slash {
            let position = boss.body.position;
            let id = self.allocate();
            self.objects.push(ArenaObject {
                id,
                name: CIRCLE_SLASH_NAME.to_string(),
                active: true,
                position,
                damager: Some(Damager {
                    position,
                    enabled: false,
                }),
                machine: None,
                age: 0,
                lifetime: Some(CIRCLE_SLASH_LIFETIME),
            });
        }
    }

    fn tick_objects(&mut self) {
        for object in &mut self.objects {
            if object.lifetime.is_none() {
                continue;
            }
            object.age += 1;
            if let Some(damager) = object.damager.as_mut() {
                damager.enabled = CIRCLE_SLASH_ACTIVE.contains(&object.age);
            }
        }
        self.objects.retain(|object| match object.lifetime {
            Some(lifetime) => object.active && object.age < lifetime,
            None => true,
        });
    }

    fn resolve_contacts(&mut self) {
        let Some(agent) = self.agent.as_ref() else {
            return;
        };
        let position = agent.body.position;

        let boss_contact = self.boss.as_ref().is_some_and(|boss| {
            boss.health > 0 && boss.body.position.distance(position) <= BOSS_RADIUS + AGENT_HALF_WIDTH
        });
        let slash_contact = self.objects.iter().any(|object| {
            object.active
                && object.lifetime.is_some()
                && object.damager.is_some_and(|damager| {
                    damager.enabled && damager.position.distance(position) <= CIRCLE_SLASH_RADIUS
                })
        });
        if boss_contact || slash_contact {
            self.hit_agent();
        }
    }
}
