use glam::Vec2;

use crate::server::SensorConfig;
use crate::simulation::{LayerMask, SimulationQuery, WorldHit};
use crate::utils::{ray_circle_intersection, ring_directions, RAY_COUNT};

/// What a proximity ray ran into. Discriminants are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum HitClass {
    #[default]
    None = 0,
    Terrain = 1,
    Enemy = 2,
    Projectile = 3,
    Hazard = 4,
}

/// Circular hazard volume tracked outside the world's colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardVolume {
    pub center: Vec2,
    pub radius: f32,
}

/// One sample of the ray ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Raw hit distances, `max_distance` when nothing was hit.
    pub distances: [f32; RAY_COUNT],
    pub classes: [HitClass; RAY_COUNT],
    pub max_distance: f32,
}

impl SensorReading {
    /// Distances divided by the sensing radius, in `[0, 1]`.
    pub fn normalized(&self) -> [f32; RAY_COUNT] {
        self.distances.map(|distance| distance / self.max_distance)
    }

    pub fn class_tags(&self) -> [i32; RAY_COUNT] {
        self.classes.map(|class| class as i32)
    }
}

/// Ring of evenly spaced rays cast against the world and tracked hazards.
#[derive(Debug, Clone)]
pub struct ProximitySensor {
    directions: [Vec2; RAY_COUNT],
    config: SensorConfig,
    hazards: Vec<HazardVolume>,
    hits: Vec<WorldHit>,
}

impl ProximitySensor {
    pub fn new(config: SensorConfig) -> Self {
        Self {
            directions: ring_directions::<RAY_COUNT>(),
            config,
            hazards: Vec::new(),
            hits: Vec::with_capacity(16),
        }
    }

    pub fn hazards(&self) -> &[HazardVolume] {
        &self.hazards
    }

    pub fn clear_hazards(&mut self) {
        self.hazards.clear();
    }

    pub fn add_hazard(&mut self, center: Vec2, radius: f32) {
        self.hazards.push(HazardVolume { center, radius });
    }

    /// Casts every ray from `origin`. Tracked hazards are tested first, and a
    /// world hit only replaces the current best if it is strictly closer.
    pub fn cast<S: SimulationQuery>(&mut self, origin: Vec2, sim: &S) -> SensorReading {
        let max_distance = self.config.max_distance;
        let mut reading = SensorReading {
            distances: [max_distance; RAY_COUNT],
            classes: [HitClass::None; RAY_COUNT],
            max_distance,
        };

        for (index, direction) in self.directions.iter().copied().enumerate() {
            let mut closest = max_distance;
            let mut class = HitClass::None;

            for hazard in &self.hazards {
                let hit = ray_circle_intersection(
                    origin,
                    direction,
                    hazard.center,
                    hazard.radius,
                    max_distance,
                );
                if let Some(distance) = hit.filter(|distance| *distance < closest) {
                    closest = distance;
                    class = HitClass::Hazard;
                }
            }

            sim.raycast(origin, direction, max_distance, LayerMask::ALL, &mut self.hits);
            for hit in &self.hits {
                if hit.distance >= closest {
                    continue;
                }
                if let Some(hit_class) = self.classify(hit) {
                    closest = hit.distance;
                    class = hit_class;
                }
            }

            reading.distances[index] = closest;
            reading.classes[index] = class;
        }
        reading
    }

    fn classify(&self, hit: &WorldHit) -> Option<HitClass> {
        if hit.has_health {
            Some(HitClass::Enemy)
        } else if hit.damages_agent {
            Some(HitClass::Hazard)
        } else if hit.layer == self.config.projectile_layer {
            Some(HitClass::Projectile)
        } else if hit.layer == self.config.enemy_layer {
            Some(HitClass::Enemy)
        } else if hit.layer == self.config.terrain_layer {
            Some(HitClass::Terrain)
        } else {
            None
        }
    }
}
