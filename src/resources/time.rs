/// Episode clock measured on the simulation clock.
///
/// Stays put while the simulation is frozen, since the simulation clock does.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeClock {
    start_time: f32,
}

impl EpisodeClock {
    pub fn reset(&mut self, now: f32) {
        self.start_time = now;
    }

    pub fn elapsed_seconds(&self, now: f32) -> f32 {
        (now - self.start_time).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_since_reset() {
        let mut clock = EpisodeClock::default();
        assert_eq!(clock.elapsed_seconds(2.5), 2.5);

        clock.reset(2.5);
        assert_eq!(clock.elapsed_seconds(2.5), 0.0);
        assert_eq!(clock.elapsed_seconds(3.0), 0.5);
    }
}
