/// Counts the fixed ticks left in the current step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepControl {
    pub remaining_steps: u32,
}

impl StepControl {
    pub fn is_running(&self) -> bool {
        self.remaining_steps > 0
    }

    pub fn set_steps(&mut self, steps: u32) {
        self.remaining_steps = steps;
    }

    /// Consumes one tick. Returns `true` if a tick was pending.
    pub fn consume_step(&mut self) -> bool {
        if self.remaining_steps > 0 {
            self.remaining_steps -= 1;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.remaining_steps = 0;
    }
}
