use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

use crate::simulation::InputState;
use crate::utils::{COMMAND_OFFSET, MEMORY_SIZE, OBSERVATION_OFFSET, RAY_COUNT, SIGNAL_OFFSET};

/// Host-to-trainer notification written at offset 0 of the shared region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StateFlag {
    None = 0,
    /// The agent spawned and accepts input; sent once at start-up.
    Ready = 1,
    /// A step finished and the observation is fresh.
    Step = 2,
    /// A reset finished and the observation is the first of a new episode.
    Reset = 3,
}

impl TryFrom<i32> for StateFlag {
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, i32> {
        match raw {
            0 => Ok(StateFlag::None),
            1 => Ok(StateFlag::Ready),
            2 => Ok(StateFlag::Step),
            3 => Ok(StateFlag::Reset),
            other => Err(other),
        }
    }
}

/// Trainer-to-host request carried in the command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CommandType {
    None = 0,
    Step = 1,
    Reset = 2,
}

impl TryFrom<i32> for CommandType {
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, i32> {
        match raw {
            0 => Ok(CommandType::None),
            1 => Ok(CommandType::Step),
            2 => Ok(CommandType::Reset),
            other => Err(other),
        }
    }
}

/// Observation record, written by the host at [`OBSERVATION_OFFSET`].
///
/// Layout is fixed: native-endian, naturally aligned, no implicit padding.
/// Booleans are single bytes holding 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Observation {
    pub agent_pos_x: f32,
    pub agent_pos_y: f32,
    pub agent_vel_x: f32,
    pub agent_vel_y: f32,
    pub boss_pos_x: f32,
    pub boss_pos_y: f32,
    pub boss_vel_x: f32,
    pub boss_vel_y: f32,
    /// Seconds of simulation time since the last completed reset.
    pub episode_time: f32,

    pub agent_health: i32,
    pub agent_max_health: i32,
    pub agent_silk: i32,
    pub boss_health: i32,
    pub boss_max_health: i32,
    pub boss_phase: i32,
    pub boss_attack_state: i32,

    pub agent_grounded: u8,
    pub agent_can_dash: u8,
    pub agent_facing_right: u8,
    pub agent_invincible: u8,
    pub boss_facing_right: u8,
    pub terminated: u8,
    pub truncated: u8,
    pub agent_can_attack: u8,
    pub agent_attacking: u8,
    pub agent_dashing: u8,
    pub agent_jumping: u8,
    pub agent_falling: u8,
    pub agent_focusing: u8,
    pub agent_casting: u8,
    pub agent_recoiling: u8,
    pub agent_wall_sliding: u8,

    /// Normalised hit distances, 1.0 for no hit.
    pub ray_distances: [f32; RAY_COUNT],
    /// [`crate::systems::HitClass`] per ray.
    pub ray_hit_types: [i32; RAY_COUNT],

    pub agent_animation_state: i32,
    pub agent_animation_progress: f32,
    pub boss_animation_progress: f32,
}

impl Default for Observation {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Command record, written by the trainer at [`COMMAND_OFFSET`].
///
/// Byte-packed: 18 bytes with `ready` at offset 14, so the ready word is
/// not 4-byte aligned in the region. The trainer writes `ready` last; the
/// host clears it after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Command {
    pub command_type: i32,
    pub left: u8,
    pub right: u8,
    pub up: u8,
    pub down: u8,
    pub jump: u8,
    pub attack: u8,
    pub dash: u8,
    pub grapple: u8,
    pub skill: u8,
    pub heal: u8,
    pub ready: i32,
}

/// Byte offset of `Command::ready` inside the command record.
pub const COMMAND_READY_OFFSET: usize = offset_of!(Command, ready);

const _: () = assert!(size_of::<Observation>() == 348);
const _: () = assert!(OBSERVATION_OFFSET + size_of::<Observation>() <= COMMAND_OFFSET);
const _: () = assert!(COMMAND_OFFSET + size_of::<Command>() <= SIGNAL_OFFSET);
const _: () = assert!(SIGNAL_OFFSET < MEMORY_SIZE);
const _: () = assert!(size_of::<Command>() == 18);
const _: () = assert!(COMMAND_READY_OFFSET == 14);

impl Command {
    pub fn new(command_type: CommandType, inputs: InputState) -> Self {
        let flag = |held: bool| held as u8;
        Self {
            command_type: command_type as i32,
            left: flag(inputs.left),
            right: flag(inputs.right),
            up: flag(inputs.up),
            down: flag(inputs.down),
            jump: flag(inputs.jump),
            attack: flag(inputs.attack),
            dash: flag(inputs.dash),
            grapple: flag(inputs.grapple),
            skill: flag(inputs.skill),
            heal: flag(inputs.heal),
            ready: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        let ready = self.ready;
        ready == 1
    }

    /// Decoded command type, or the raw value if it is not recognised.
    pub fn kind(&self) -> Result<CommandType, i32> {
        let raw = self.command_type;
        CommandType::try_from(raw)
    }

    /// Input bytes decoded as held (`!= 0`) or released.
    pub fn inputs(&self) -> InputState {
        InputState {
            left: self.left != 0,
            right: self.right != 0,
            up: self.up != 0,
            down: self.down != 0,
            jump: self.jump != 0,
            attack: self.attack != 0,
            dash: self.dash != 0,
            grapple: self.grapple != 0,
            skill: self.skill != 0,
            heal: self.heal != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_layout() {
        assert_eq!(size_of::<Command>(), 18);
        assert_eq!(offset_of!(Command, left), 4);
        assert_eq!(offset_of!(Command, heal), 13);
        assert_eq!(COMMAND_READY_OFFSET, 14);
        assert_eq!(COMMAND_OFFSET + COMMAND_READY_OFFSET, 1038);
    }

    #[test]
    fn test_command_bytes_match_packed_record() {
        let mut command = Command::new(
            CommandType::Reset,
            InputState {
                jump: true,
                heal: true,
                ..Default::default()
            },
        );
        command.ready = 1;

        let bytes = bytemuck::bytes_of(&command);
        assert_eq!(&bytes[0..4], &2i32.to_ne_bytes());
        assert_eq!(bytes[8], 1);
        assert_eq!(bytes[13], 1);
        assert_eq!(&bytes[14..18], &1i32.to_ne_bytes());
    }

    #[test]
    fn test_observation_layout() {
        assert_eq!(offset_of!(Observation, episode_time), 32);
        assert_eq!(offset_of!(Observation, agent_health), 36);
        assert_eq!(offset_of!(Observation, agent_grounded), 64);
        assert_eq!(offset_of!(Observation, ray_distances), 80);
        assert_eq!(offset_of!(Observation, ray_hit_types), 208);
        assert_eq!(offset_of!(Observation, agent_animation_state), 336);
    }

    #[test]
    fn test_nonzero_input_bytes_are_held() {
        let mut command = Command::new(CommandType::Step, InputState::default());
        command.jump = 7;
        command.left = 1;

        let inputs = command.inputs();
        assert!(inputs.jump);
        assert!(inputs.left);
        assert!(!inputs.right);
    }

    #[test]
    fn test_unknown_command_type_is_reported() {
        let mut command = Command::new(CommandType::Reset, InputState::default());
        assert_eq!(command.kind(), Ok(CommandType::Reset));

        command.command_type = 9;
        assert_eq!(command.kind(), Err(9));
    }
}
