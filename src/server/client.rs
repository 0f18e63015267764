use std::path::Path;
use std::time::{Duration, Instant};

use super::structures::{Command, CommandType, Observation, StateFlag, COMMAND_READY_OFFSET};
use super::transport::{default_shm_dir, SharedRegion, TransportError};
use crate::simulation::InputState;
use crate::utils::{COMMAND_OFFSET, OBSERVATION_OFFSET, SIGNAL_OFFSET, STATE_OFFSET};

/// Trainer side of the shared region.
///
/// Sends one command at a time and blocks until the host publishes the
/// matching state flag. The client never writes the state flag; it only
/// clears the signal byte it consumes.
pub struct TrainerClient {
    region: SharedRegion,
    timeout: Duration,
}

impl TrainerClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn connect(instance_id: u32) -> Result<Self, TransportError> {
        Self::connect_in(&default_shm_dir(), instance_id)
    }

    pub fn connect_in(dir: &Path, instance_id: u32) -> Result<Self, TransportError> {
        Ok(Self {
            region: SharedRegion::open_in(dir, instance_id)?,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Raw value of the state flag.
    pub fn state_flag(&self) -> Result<i32, TransportError> {
        self.region.load_i32(STATE_OFFSET)
    }

    pub fn is_signalled(&self) -> Result<bool, TransportError> {
        Ok(self.region.load_u8(SIGNAL_OFFSET)? != 0)
    }

    pub fn read_observation(&self) -> Result<Observation, TransportError> {
        self.region.read(OBSERVATION_OFFSET)
    }

    /// Writes a command and marks it ready. The pending signal is cleared
    /// first so the next signal belongs to this command.
    pub fn send_command(
        &mut self,
        kind: CommandType,
        inputs: InputState,
    ) -> Result<(), TransportError> {
        self.region.store_u8(SIGNAL_OFFSET, 0)?;
        self.region
            .write(COMMAND_OFFSET, &Command::new(kind, inputs))?;
        self.region
            .store_i32_unaligned(COMMAND_OFFSET + COMMAND_READY_OFFSET, 1)
    }

    /// Non-blocking check for a published `expected` flag. Consumes the
    /// signal if one is pending.
    pub fn poll_state(&mut self, expected: StateFlag) -> Result<Option<Observation>, TransportError> {
        if !self.is_signalled()? {
            return Ok(None);
        }
        // Clear before reading the flag: a publish racing with us raises the
        // signal again after its flag is visible.
        self.region.store_u8(SIGNAL_OFFSET, 0)?;
        if self.state_flag()? == expected as i32 {
            return self.read_observation().map(Some);
        }
        Ok(None)
    }

    /// Blocks until the host publishes `expected`, ignoring other flags.
    pub fn wait_for_state(&mut self, expected: StateFlag) -> Result<Observation, TransportError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::Timeout(self.timeout));
            }
            self.region.wait_signal(remaining)?;
            if let Some(observation) = self.poll_state(expected)? {
                return Ok(observation);
            }
        }
    }

    pub fn step(&mut self, inputs: InputState) -> Result<Observation, TransportError> {
        self.send_command(CommandType::Step, inputs)?;
        self.wait_for_state(StateFlag::Step)
    }

    pub fn reset(&mut self) -> Result<Observation, TransportError> {
        self.send_command(CommandType::Reset, InputState::default())?;
        self.wait_for_state(StateFlag::Reset)
    }

    /// Whether the host has consumed the last command.
    pub fn command_pending(&self) -> Result<bool, TransportError> {
        Ok(self
            .region
            .load_i32_unaligned(COMMAND_OFFSET + COMMAND_READY_OFFSET)?
            == 1)
    }
}
