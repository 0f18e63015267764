//! Shared-memory region exchanged with the trainer.
//!
//! The region is a fixed 4096-byte file mapping named after the instance id.
//! The host creates it when missing; a trainer opening the same name sees
//! the same bytes. The state flag and signal byte are accessed atomically
//! with release/acquire ordering, so a payload written before its flag is
//! visible to whoever observes the flag. The command ready word sits at an
//! unaligned offset inside the packed command record and is accessed with
//! volatile byte copies fenced the same way.

use bytemuck::Pod;
use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::io;
use std::mem::size_of;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::atomic::{fence, AtomicI32, AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::structures::{Command, Observation, StateFlag, COMMAND_READY_OFFSET};
use crate::utils::{
    COMMAND_OFFSET, MEMORY_NAME_BASE, MEMORY_SIZE, OBSERVATION_OFFSET, SIGNAL_OFFSET, STATE_OFFSET,
};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("shared memory '{}' unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("access of {len} bytes at offset {offset} is outside the shared region")]
    Io { offset: usize, len: usize },

    #[error("shared region is {actual} bytes, expected at least {expected}")]
    Layout { actual: u64, expected: u64 },

    #[error("no signal within {0:?}")]
    Timeout(Duration),
}

/// Name of the shared region for an instance; id 0 keeps the bare base name.
pub fn memory_name(instance_id: u32) -> String {
    if instance_id == 0 {
        MEMORY_NAME_BASE.to_string()
    } else {
        format!("{MEMORY_NAME_BASE}_{instance_id}")
    }
}

/// Directory holding shared regions when none is configured.
pub fn default_shm_dir() -> PathBuf {
    let dev_shm = Path::new("/dev/shm");
    if cfg!(target_os = "linux") && dev_shm.is_dir() {
        return dev_shm.to_path_buf();
    }
    dirs::runtime_dir().unwrap_or_else(std::env::temp_dir)
}

/// Raw mapping plus typed, bounds-checked accessors.
pub(crate) struct SharedRegion {
    path: PathBuf,
    map: MmapMut,
}

impl SharedRegion {
    pub(crate) fn open_in(dir: &Path, instance_id: u32) -> Result<Self, TransportError> {
        let path = dir.join(memory_name(instance_id));
        let unavailable = |source: io::Error| TransportError::Unavailable {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(unavailable)?;

        let len = file.metadata().map_err(unavailable)?.len();
        let expected = MEMORY_SIZE as u64;
        if len == 0 {
            file.set_len(expected).map_err(unavailable)?;
        } else if len < expected {
            return Err(TransportError::Layout {
                actual: len,
                expected,
            });
        }

        // SAFETY: the file is at least MEMORY_SIZE bytes and is never truncated
        // by either side. Concurrent access from the peer process is limited to
        // the handshake words, which are only touched through atomics.
        let map = unsafe { MmapMut::map_mut(&file) }.map_err(unavailable)?;

        Ok(Self { path, map })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn check(&self, offset: usize, len: usize, align: usize) -> Result<(), TransportError> {
        let in_bounds = offset
            .checked_add(len)
            .is_some_and(|end| end <= self.map.len());
        if in_bounds && offset % align == 0 {
            Ok(())
        } else {
            Err(TransportError::Io { offset, len })
        }
    }

    pub(crate) fn load_i32(&self, offset: usize) -> Result<i32, TransportError> {
        self.check(offset, 4, 4)?;
        let ptr = self.map.as_ptr().wrapping_add(offset) as *mut i32;
        // SAFETY: in bounds and 4-aligned (the mapping is page aligned); the
        // word is only ever accessed atomically.
        let word = unsafe { AtomicI32::from_ptr(ptr) };
        Ok(word.load(Ordering::Acquire))
    }

    pub(crate) fn store_i32(&mut self, offset: usize, value: i32) -> Result<(), TransportError> {
        self.check(offset, 4, 4)?;
        let ptr = self.map.as_mut_ptr().wrapping_add(offset) as *mut i32;
        // SAFETY: as in `load_i32`.
        let word = unsafe { AtomicI32::from_ptr(ptr) };
        word.store(value, Ordering::Release);
        Ok(())
    }

    /// Loads an `i32` at any offset. The read completes before any access
    /// that follows it.
    pub(crate) fn load_i32_unaligned(&self, offset: usize) -> Result<i32, TransportError> {
        self.check(offset, 4, 1)?;
        let ptr = self.map.as_ptr().wrapping_add(offset) as *const [u8; 4];
        // SAFETY: in bounds, and `[u8; 4]` has alignment 1.
        let bytes = unsafe { ptr::read_volatile(ptr) };
        fence(Ordering::Acquire);
        Ok(i32::from_ne_bytes(bytes))
    }

    /// Stores an `i32` at any offset after every access that precedes it.
    pub(crate) fn store_i32_unaligned(
        &mut self,
        offset: usize,
        value: i32,
    ) -> Result<(), TransportError> {
        self.check(offset, 4, 1)?;
        fence(Ordering::Release);
        let ptr = self.map.as_mut_ptr().wrapping_add(offset) as *mut [u8; 4];
        // SAFETY: as in `load_i32_unaligned`.
        unsafe { ptr::write_volatile(ptr, value.to_ne_bytes()) };
        Ok(())
    }

    pub(crate) fn load_u8(&self, offset: usize) -> Result<u8, TransportError> {
        self.check(offset, 1, 1)?;
        let ptr = self.map.as_ptr().wrapping_add(offset) as *mut u8;
        // SAFETY: in bounds; the byte is only ever accessed atomically.
        let byte = unsafe { AtomicU8::from_ptr(ptr) };
        Ok(byte.load(Ordering::Acquire))
    }

    pub(crate) fn store_u8(&mut self, offset: usize, value: u8) -> Result<(), TransportError> {
        self.check(offset, 1, 1)?;
        let ptr = self.map.as_mut_ptr().wrapping_add(offset);
        // SAFETY: as in `load_u8`.
        let byte = unsafe { AtomicU8::from_ptr(ptr) };
        byte.store(value, Ordering::Release);
        Ok(())
    }

    pub(crate) fn read<T: Pod>(&self, offset: usize) -> Result<T, TransportError> {
        let len = size_of::<T>();
        self.check(offset, len, 1)?;
        Ok(bytemuck::pod_read_unaligned(&self.map[offset..offset + len]))
    }

    pub(crate) fn write<T: Pod>(&mut self, offset: usize, value: &T) -> Result<(), TransportError> {
        let bytes = bytemuck::bytes_of(value);
        self.check(offset, bytes.len(), 1)?;
        self.map[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Polls the signal byte until it is set or `timeout` elapses.
    pub(crate) fn wait_signal(&self, timeout: Duration) -> Result<(), TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.load_u8(SIGNAL_OFFSET)? != 0 {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Host side of the shared region.
///
/// The host is the only writer of the state flag and the observation. Every
/// publish writes the observation, then the flag, then raises the signal.
pub struct SharedMemoryTransport {
    region: SharedRegion,
}

impl SharedMemoryTransport {
    /// Opens (or creates) the region for `instance_id` in the default directory.
    pub fn open(instance_id: u32) -> Result<Self, TransportError> {
        Self::open_in(&default_shm_dir(), instance_id)
    }

    pub fn open_in(dir: &Path, instance_id: u32) -> Result<Self, TransportError> {
        let region = SharedRegion::open_in(dir, instance_id)?;
        Ok(Self { region })
    }

    pub fn path(&self) -> &Path {
        self.region.path()
    }

    pub fn write_state_flag(&mut self, flag: StateFlag) -> Result<(), TransportError> {
        self.region.store_i32(STATE_OFFSET, flag as i32)
    }

    pub fn state_flag(&self) -> Result<i32, TransportError> {
        self.region.load_i32(STATE_OFFSET)
    }

    pub fn write_observation(&mut self, observation: &Observation) -> Result<(), TransportError> {
        self.region.write(OBSERVATION_OFFSET, observation)
    }

    /// Reads the command record. `ready` is loaded first so the payload read
    /// afterwards is at least as new as the ready word.
    pub fn read_command(&self) -> Result<Command, TransportError> {
        let ready = self
            .region
            .load_i32_unaligned(COMMAND_OFFSET + COMMAND_READY_OFFSET)?;
        let mut command: Command = self.region.read(COMMAND_OFFSET)?;
        command.ready = ready;
        Ok(command)
    }

    pub fn clear_command_ready(&mut self) -> Result<(), TransportError> {
        self.region
            .store_i32_unaligned(COMMAND_OFFSET + COMMAND_READY_OFFSET, 0)
    }

    /// Raises the signal byte the trainer waits on.
    pub fn signal(&mut self) -> Result<(), TransportError> {
        self.region.store_u8(SIGNAL_OFFSET, 1)
    }

    pub fn wait(&self, timeout: Duration) -> Result<(), TransportError> {
        self.region.wait_signal(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::CommandType;
    use crate::simulation::InputState;
    use tempfile::tempdir;

    #[test]
    fn test_memory_name_suffix() {
        assert_eq!(memory_name(0), "simlink_shared_memory");
        assert_eq!(memory_name(3), "simlink_shared_memory_3");
    }

    #[test]
    fn test_open_creates_fixed_size_region() {
        let dir = tempdir().unwrap();
        let transport = SharedMemoryTransport::open_in(dir.path(), 0).unwrap();

        let len = std::fs::metadata(transport.path()).unwrap().len();
        assert_eq!(len, MEMORY_SIZE as u64);
        assert_eq!(transport.state_flag().unwrap(), StateFlag::None as i32);
    }

    #[test]
    fn test_short_region_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(memory_name(1)), [0u8; 64]).unwrap();

        let result = SharedMemoryTransport::open_in(dir.path(), 1);
        assert!(matches!(
            result,
            Err(TransportError::Layout {
                actual: 64,
                expected: 4096
            })
        ));
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");

        let result = SharedMemoryTransport::open_in(&missing, 0);
        assert!(matches!(result, Err(TransportError::Unavailable { .. })));
    }

    #[test]
    fn test_two_mappings_share_bytes() {
        let dir = tempdir().unwrap();
        let mut host = SharedMemoryTransport::open_in(dir.path(), 2).unwrap();
        let mut peer = SharedRegion::open_in(dir.path(), 2).unwrap();

        let command = Command::new(CommandType::Step, InputState::default());
        peer.write(COMMAND_OFFSET, &command).unwrap();
        assert!(!host.read_command().unwrap().is_ready());

        peer.store_i32_unaligned(COMMAND_OFFSET + COMMAND_READY_OFFSET, 1)
            .unwrap();
        let seen = host.read_command().unwrap();
        assert!(seen.is_ready());
        assert_eq!(seen.kind(), Ok(CommandType::Step));

        host.clear_command_ready().unwrap();
        assert_eq!(
            peer.load_i32_unaligned(COMMAND_OFFSET + COMMAND_READY_OFFSET)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_ready_word_read_at_byte_1038() {
        let dir = tempdir().unwrap();
        let host = SharedMemoryTransport::open_in(dir.path(), 4).unwrap();
        let mut peer = SharedRegion::open_in(dir.path(), 4).unwrap();

        let mut record = [0u8; 18];
        record[0..4].copy_from_slice(&(CommandType::Reset as i32).to_ne_bytes());
        record[14..18].copy_from_slice(&1i32.to_ne_bytes());
        peer.write(COMMAND_OFFSET, &record).unwrap();

        assert_eq!(COMMAND_OFFSET + COMMAND_READY_OFFSET, 1038);
        let seen = host.read_command().unwrap();
        assert!(seen.is_ready());
        assert_eq!(seen.kind(), Ok(CommandType::Reset));
    }

    #[test]
    fn test_wait_times_out_without_signal() {
        let dir = tempdir().unwrap();
        let transport = SharedMemoryTransport::open_in(dir.path(), 0).unwrap();

        let result = transport.wait(Duration::from_millis(5));
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[test]
    fn test_out_of_bounds_access_is_io_error() {
        let dir = tempdir().unwrap();
        let region = SharedRegion::open_in(dir.path(), 0).unwrap();

        assert!(matches!(
            region.load_i32(MEMORY_SIZE),
            Err(TransportError::Io { .. })
        ));
        assert!(matches!(region.load_i32(6), Err(TransportError::Io { .. })));
        assert!(matches!(
            region.load_i32_unaligned(MEMORY_SIZE - 2),
            Err(TransportError::Io { .. })
        ));
        assert_eq!(region.load_i32_unaligned(1038).unwrap(), 0);
    }
}
