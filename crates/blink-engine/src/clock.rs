//! Session duration bookkeeping.
//!
//! Time always comes from the caller; nothing here reads a system clock, so
//! tests drive it with synthetic timestamps.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionClock {
    pub started_at_ms: Option<u64>,
    pub accumulated_ms: u64,
    pub running: bool,
}

impl SessionClock {
    pub fn start(&mut self, now_ms: u64) {
        *self = Self {
            started_at_ms: Some(now_ms),
            accumulated_ms: 0,
            running: true,
        };
    }

    /// Fold the running segment into `accumulated_ms` and freeze.
    pub fn pause(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        self.accumulated_ms = self.elapsed_ms(now_ms);
        self.started_at_ms = Some(now_ms);
        self.running = false;
    }

    pub fn resume(&mut self, now_ms: u64) {
        if self.running {
            return;
        }
        self.started_at_ms = Some(now_ms);
        self.running = true;
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match (self.running, self.started_at_ms) {
            (true, Some(segment_start)) => {
                self.accumulated_ms + now_ms.saturating_sub(segment_start)
            }
            _ => self.accumulated_ms,
        }
    }

    pub fn elapsed_seconds(&self, now_ms: u64) -> u32 {
        (self.elapsed_ms(now_ms) / 1_000).min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_while_running() {
        let mut clock = SessionClock::default();
        assert_eq!(clock.elapsed_ms(5_000), 0);

        clock.start(1_000);
        assert_eq!(clock.elapsed_ms(3_500), 2_500);
        assert_eq!(clock.elapsed_seconds(3_500), 2);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut clock = SessionClock::default();
        clock.start(0);
        clock.pause(10_000);
        assert_eq!(clock.elapsed_ms(50_000), 10_000);

        clock.resume(60_000);
        assert_eq!(clock.elapsed_ms(65_000), 15_000);

        // repeated pause is harmless
        clock.pause(70_000);
        clock.pause(90_000);
        assert_eq!(clock.elapsed_ms(95_000), 20_000);
    }

    #[test]
    fn test_time_going_backwards_does_not_underflow() {
        let mut clock = SessionClock::default();
        clock.start(10_000);
        assert_eq!(clock.elapsed_ms(9_000), 0);
    }
}
