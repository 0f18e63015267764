use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use super::sensor::ProximitySensor;
use crate::server::{HazardGate, HazardRule};
use crate::simulation::{EntityId, SimulationQuery};

/// Participation of a collider-lifecycle hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    /// Damaging collider seen enabled.
    Armed,
    /// Collider was enabled and has since switched off; never reported again.
    Spent,
}

/// Rebuilds the sensor's hazard list from the world's transient objects.
#[derive(Debug, Clone, Default)]
pub struct HazardTracker {
    rules: Vec<HazardRule>,
    entries: HashMap<EntityId, Participation>,
}

impl HazardTracker {
    pub fn new(rules: Vec<HazardRule>) -> Self {
        Self {
            rules,
            entries: HashMap::new(),
        }
    }

    pub fn participation(&self, id: EntityId) -> Option<Participation> {
        self.entries.get(&id).copied()
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }

    /// Replaces the sensor's hazards with the currently live ones. Entries
    /// for objects that are no longer present are dropped.
    pub fn refresh<S: SimulationQuery>(&mut self, sim: &S, sensor: &mut ProximitySensor) {
        sensor.clear_hazards();
        let mut present = HashSet::new();

        for object in sim.objects() {
            if !object.active {
                continue;
            }
            let Some(rule) = self.rules.iter().find(|rule| rule.matches(&object.name)) else {
                continue;
            };
            let Some(damager) = object.damager else {
                continue;
            };

            match &rule.gate {
                HazardGate::ColliderLifecycle => {
                    present.insert(object.id);
                    if damager.enabled {
                        self.entries.entry(object.id).or_insert(Participation::Armed);
                    } else if let Some(entry) = self.entries.get_mut(&object.id) {
                        *entry = Participation::Spent;
                    }
                    if self.entries.get(&object.id) == Some(&Participation::Spent) {
                        continue;
                    }
                }
                HazardGate::ActiveStates { machine, states } => {
                    let active = sim.active_state(object.id, machine);
                    if !active.is_some_and(|state| states.contains(&state)) {
                        continue;
                    }
                }
            }
            sensor.add_hazard(damager.position, rule.radius);
        }

        self.entries.retain(|id, _| present.contains(id));
    }

    pub fn clear(&mut self, sensor: &mut ProximitySensor) {
        self.entries.clear();
        sensor.clear_hazards();
    }

    /// Deactivates every live object matched by a hazard rule. Returns how
    /// many were switched off.
    pub fn deactivate_live<S: SimulationQuery>(&self, sim: &mut S) -> usize {
        let live: Vec<_> = sim
            .objects()
            .into_iter()
            .filter(|object| object.active)
            .filter(|object| self.rules.iter().any(|rule| rule.matches(&object.name)))
            .collect();

        let mut deactivated = 0;
        for object in live {
            match sim.set_object_active(object.id, false) {
                Ok(()) => deactivated += 1,
                Err(e) => warn!("Failed to deactivate hazard '{}': {}", object.name, e),
            }
        }
        deactivated
    }
}
