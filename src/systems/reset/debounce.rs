/// Outcome of one debounced observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceStatus {
    Waiting,
    Satisfied,
    Expired,
}

/// Requires a condition to hold for more than `threshold` consecutive
/// frames, giving up after `max_frames` observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    threshold: u32,
    max_frames: u32,
    run: u32,
    frames: u32,
}

impl Debounce {
    pub fn new(threshold: u32, max_frames: u32) -> Self {
        Self {
            threshold,
            max_frames,
            run: 0,
            frames: 0,
        }
    }

    /// Never expires.
    pub fn unbounded(threshold: u32) -> Self {
        Self::new(threshold, u32::MAX)
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn observe(&mut self, condition: bool) -> DebounceStatus {
        self.frames = self.frames.saturating_add(1);
        self.run = if condition { self.run + 1 } else { 0 };

        if self.run > self.threshold {
            DebounceStatus::Satisfied
        } else if self.frames >= self.max_frames {
            DebounceStatus::Expired
        } else {
            DebounceStatus::Waiting
        }
    }
}
