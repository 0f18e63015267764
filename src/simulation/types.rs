use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Opaque identity of an object inside the host simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Kinematic state of a body in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
}

/// Resource counters and status bits of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentStatus {
    pub health: i32,
    pub max_health: i32,
    pub silk: i32,
    pub max_silk: i32,
    pub grounded: bool,
    pub can_dash: bool,
    pub can_attack: bool,
    pub invincible: bool,
    pub attacking: bool,
    pub dashing: bool,
    pub jumping: bool,
    pub falling: bool,
    pub focusing: bool,
    pub casting: bool,
    pub recoiling: bool,
    pub wall_sliding: bool,
    /// The agent responds to input this frame.
    pub accepting_input: bool,
    /// The post-respawn routine is still running.
    pub hazard_respawning: bool,
}

/// Currently playing animation clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub clip: String,
    pub frame: u32,
    pub frame_count: u32,
}

impl AnimationFrame {
    /// Normalised progress through the clip, 0 for empty clips.
    pub fn progress(&self) -> f32 {
        if self.frame_count == 0 {
            0.0
        } else {
            self.frame as f32 / self.frame_count as f32
        }
    }
}

/// Bit set of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn layer(layer: u32) -> Self {
        Self(1 << layer)
    }

    pub const fn contains(self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One collider crossed by a world raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldHit {
    pub distance: f32,
    pub layer: u32,
    /// The collider belongs to something with a health pool.
    pub has_health: bool,
    /// The collider damages the agent on contact.
    pub damages_agent: bool,
}

/// Damaging child collider attached to a world object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damager {
    pub position: Vec2,
    pub enabled: bool,
}

/// Snapshot of one enumerable world object.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
    pub position: Vec2,
    pub health: Option<i32>,
    pub damager: Option<Damager>,
}

/// Value of a named behaviour-machine variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variable {
    Bool(bool),
    Int(i32),
    Float(f32),
}

/// Target of a scene transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneLoad {
    pub scene: String,
    pub entry_gate: String,
}

/// Held state of every logical input the bridge can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
    pub dash: bool,
    pub grapple: bool,
    pub skill: bool,
    pub heal: bool,
}

impl InputState {
    pub fn any(&self) -> bool {
        self.left
            || self.right
            || self.up
            || self.down
            || self.jump
            || self.attack
            || self.dash
            || self.grapple
            || self.skill
            || self.heal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask_union() {
        let mask = LayerMask::layer(8) | LayerMask::layer(11);
        assert!(mask.contains(8));
        assert!(mask.contains(11));
        assert!(!mask.contains(12));
        assert!(!mask.contains(40));
    }

    #[test]
    fn test_animation_progress_handles_empty_clip() {
        let empty = AnimationFrame {
            clip: "Idle".to_string(),
            frame: 3,
            frame_count: 0,
        };
        assert_eq!(empty.progress(), 0.0);

        let half = AnimationFrame {
            frame_count: 6,
            ..empty
        };
        assert_eq!(half.progress(), 0.5);
    }
}
