use bevy::prelude::*;
use std::cmp::Reverse;
use std::collections::HashSet;

use crate::server::{BossConfig, PhaseMarker};
use crate::simulation::{EntityId, WorldObject};

/// Boss behaviour category reported in the observation. Discriminants are
/// part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum BossAttackState {
    #[default]
    Idle = 0,
    Hop = 1,
    Pose = 2,
    ComboSlashAntic = 3,
    ComboSlashAttack = 4,
    CounterAntic = 5,
    CounterStance = 6,
    CounterAttack = 7,
    RapidSlashAntic = 8,
    RapidSlashAttack = 9,
    JSlashAntic = 10,
    JSlashAttack = 11,
    DownstabAntic = 12,
    DownstabAttack = 13,
    ChargeAntic = 14,
    ChargeAttack = 15,
    CrossSlashAntic = 16,
    CrossSlashAttack = 17,
    Evade = 18,
    Stun = 19,
    Teleport = 20,
    PhaseTransition = 21,
    QuickSlashAttack = 22,
    SlashEnd = 23,
    Fall = 24,
    MultihitSlash = 25,
    Multihitting = 26,
    SteamDamage = 27,
    Unknown = 28,
}

const EXACT_STATES: [(&str, BossAttackState); 18] = [
    ("Idle", BossAttackState::Idle),
    ("Land", BossAttackState::Idle),
    ("Wallcling", BossAttackState::Idle),
    ("ComboSlash 1", BossAttackState::ComboSlashAntic),
    ("Counter Antic", BossAttackState::CounterAntic),
    ("Counter Stance", BossAttackState::CounterStance),
    ("RapidSlashAir Antic", BossAttackState::RapidSlashAntic),
    ("RapidSlash Charge", BossAttackState::RapidSlashAntic),
    ("J Slash M Antic", BossAttackState::JSlashAntic),
    ("Downstab Antic", BossAttackState::DownstabAntic),
    ("Charge Antic", BossAttackState::ChargeAntic),
    ("CrossSlash Antic", BossAttackState::CrossSlashAntic),
    ("Crossup Antic", BossAttackState::CrossSlashAntic),
    ("Slash Slam", BossAttackState::CrossSlashAttack),
    ("Bounce Back", BossAttackState::Teleport),
    ("Slash End", BossAttackState::SlashEnd),
    ("Fall", BossAttackState::Fall),
    ("Steam Damage", BossAttackState::SteamDamage),
];

// Checked in order; earlier prefixes shadow later ones.
const PREFIX_STATES: [(&str, BossAttackState); 20] = [
    ("Hop", BossAttackState::Hop),
    ("Pose", BossAttackState::Pose),
    ("Refight", BossAttackState::Pose),
    ("ComboSlash", BossAttackState::ComboSlashAttack),
    ("Combo Strike", BossAttackState::ComboSlashAttack),
    ("Quick Slash", BossAttackState::QuickSlashAttack),
    ("Counter", BossAttackState::CounterAttack),
    ("RapidSlash", BossAttackState::RapidSlashAttack),
    ("J Slash", BossAttackState::JSlashAttack),
    ("Downstab", BossAttackState::DownstabAttack),
    ("Dstab", BossAttackState::DownstabAttack),
    ("Charge", BossAttackState::ChargeAttack),
    ("CrossSlash", BossAttackState::CrossSlashAttack),
    ("Evade", BossAttackState::Evade),
    ("Stun", BossAttackState::Stun),
    ("Tele", BossAttackState::Teleport),
    ("P2 Shift", BossAttackState::PhaseTransition),
    ("P3 Roar", BossAttackState::PhaseTransition),
    ("Multihit Slash", BossAttackState::MultihitSlash),
    ("Multihitting", BossAttackState::Multihitting),
];

impl BossAttackState {
    /// Classifies a behaviour-machine state name. Exact names win over
    /// prefixes; empty names are `Idle`, unmatched names `Unknown`.
    pub fn from_state_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return BossAttackState::Idle;
        }
        if let Some((_, state)) = EXACT_STATES.iter().find(|(exact, _)| *exact == name) {
            return *state;
        }
        PREFIX_STATES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map_or(BossAttackState::Unknown, |(_, state)| *state)
    }

    pub fn tag(self) -> i32 {
        self as i32
    }
}

/// Classifies boss state names, warning once for each unmapped name.
#[derive(Debug, Default, Clone)]
pub struct BossStateMapper {
    unmapped: HashSet<String>,
}

impl BossStateMapper {
    pub fn classify(&mut self, name: &str) -> BossAttackState {
        let state = BossAttackState::from_state_name(name);
        if state == BossAttackState::Unknown && self.unmapped.insert(name.trim().to_string()) {
            warn!("Unmapped boss state: '{}'", name.trim());
        }
        state
    }
}

/// Monotonic boss phase derived from behaviour-machine state names.
///
/// The state name is only examined when it differs from the last one seen,
/// so lingering in a marker state is counted once.
#[derive(Debug, Clone, PartialEq)]
pub struct BossPhaseTracker {
    markers: Vec<PhaseMarker>,
    phase: i32,
    last_state: Option<String>,
}

impl BossPhaseTracker {
    pub fn new(markers: Vec<PhaseMarker>) -> Self {
        Self {
            markers,
            phase: 0,
            last_state: None,
        }
    }

    pub fn phase(&self) -> i32 {
        self.phase
    }

    /// Feeds the current state name. Repeated names are ignored.
    pub fn observe(&mut self, state_name: &str) -> i32 {
        if state_name.is_empty() || self.last_state.as_deref() == Some(state_name) {
            return self.phase;
        }
        self.last_state = Some(state_name.to_string());

        for marker in &self.markers {
            if marker.phase > self.phase && state_name.starts_with(&marker.prefix) {
                info!("Boss entered phase {} via '{}'", marker.phase, state_name);
                self.phase = marker.phase;
            }
        }
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0;
        self.last_state = None;
    }
}

/// Picks the boss among live, health-bearing objects: named with a marker or
/// at least `min_health`, highest health first.
pub fn resolve_boss(objects: &[WorldObject], config: &BossConfig) -> Option<EntityId> {
    let boss = objects
        .iter()
        .filter_map(|object| object.health.map(|health| (object, health)))
        .filter(|(_, health)| *health > 0)
        .filter(|(object, health)| {
            config
                .name_markers
                .iter()
                .any(|marker| object.name.contains(marker.as_str()))
                || *health >= config.min_health
        })
        .min_by_key(|(_, health)| Reverse(*health));

    match boss {
        Some((object, health)) => {
            info!("Resolved boss '{}' with {} health", object.name, health);
            Some(object.id)
        }
        None => {
            warn!("No boss found in scene");
            None
        }
    }
}
