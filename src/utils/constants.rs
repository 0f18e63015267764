// Wire contract
pub const MEMORY_NAME_BASE: &str = "simlink_shared_memory";
pub const MEMORY_SIZE: usize = 4096;
pub const STATE_OFFSET: usize = 0;
pub const OBSERVATION_OFFSET: usize = 4;
pub const COMMAND_OFFSET: usize = 1024;
pub const SIGNAL_OFFSET: usize = 2048;

pub const RAY_COUNT: usize = 32; // Rays in the proximity ring
pub const MAX_RAY_DISTANCE: f32 = 25.0; // World units

// Collision layers of the reference scene
pub const TERRAIN_LAYER: u32 = 8;
pub const ENEMY_LAYER: u32 = 11;
pub const PROJECTILE_LAYER: u32 = 12;

pub const FRAMES_PER_STEP: u32 = 2; // Fixed ticks per step request
pub const RESET_TIME_SCALE: f32 = 100.0; // Fast-forward while a reset loads the scene
pub const CONSECUTIVE_FRAME_THRESHOLD: u32 = 3;
pub const HOST_FRAME_RATE: f64 = 60.0; // Rendered frames per second of the host loop
pub const MAX_RESET_WAIT_FRAMES: u32 = 3600; // One minute at HOST_FRAME_RATE
pub const SETTLE_FRAMES: u32 = 3;

pub const BOSS_MAX_HEALTH: i32 = 800;
pub const BOSS_MIN_HEALTH: i32 = 100; // Health floor when resolving an unnamed boss

pub const CIRCLE_SLASH_RADIUS: f32 = 3.0;
pub const CROSS_SLASH_RADIUS: f32 = 5.0;

pub const EPISODE_SCENE: &str = "Song_Tower_01";
pub const EPISODE_ENTRY_GATE: &str = "door_cutsceneEndLaceTower";
pub const BEHAVIOUR_MACHINE: &str = "Control";
