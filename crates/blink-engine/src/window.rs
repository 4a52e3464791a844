use std::collections::VecDeque;

use crate::config::WindowParams;
use crate::types::{BlinkEvent, RateBand};

/// Statistics derived from the window and the lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowStats {
    pub rate: u32,
    pub total: u32,
    pub left_count: u32,
    pub right_count: u32,
    pub symmetry: f32,
    pub average_duration_ms: u32,
}

/// Sliding retention of counted blinks.
///
/// `rate` is the number of events retained, which for a 60 s window reads
/// directly as blinks per minute. Lifetime counters are never evicted.
#[derive(Debug, Clone)]
pub struct BlinkWindow {
    params: WindowParams,
    events: VecDeque<BlinkEvent>,
    total: u32,
    left_count: u32,
    right_count: u32,
}

impl BlinkWindow {
    pub fn new(params: WindowParams) -> Self {
        Self {
            params,
            events: VecDeque::with_capacity(64),
            total: 0,
            left_count: 0,
            right_count: 0,
        }
    }

    pub fn push(&mut self, event: BlinkEvent, now_ms: u64) {
        self.total = self.total.saturating_add(1);
        if event.eyes_involved.includes_left() {
            self.left_count = self.left_count.saturating_add(1);
        }
        if event.eyes_involved.includes_right() {
            self.right_count = self.right_count.saturating_add(1);
        }
        self.events.push_back(event);
        self.evict(now_ms);
    }

    /// Drop events at or before `now_ms - window_ms`.
    pub fn evict(&mut self, now_ms: u64) {
        let Some(cutoff) = self.cutoff(now_ms) else {
            return;
        };
        // events arrive in timestamp order, so the stale ones sit at the front
        while self
            .events
            .front()
            .is_some_and(|front| front.timestamp_ms <= cutoff)
        {
            self.events.pop_front();
        }
    }

    /// Pure read: counts only events inside the window at `now_ms`.
    pub fn snapshot(&self, now_ms: u64) -> WindowStats {
        let cutoff = self.cutoff(now_ms);
        let (rate, duration_sum) = self
            .events
            .iter()
            .filter(|e| cutoff.map_or(true, |c| e.timestamp_ms > c))
            .fold((0u32, 0u64), |(n, sum), e| (n + 1, sum + e.duration_ms));

        let average_duration_ms = if rate > 0 {
            (duration_sum / rate as u64) as u32
        } else {
            0
        };

        WindowStats {
            rate,
            total: self.total,
            left_count: self.left_count,
            right_count: self.right_count,
            symmetry: self.symmetry(),
            average_duration_ms,
        }
    }

    pub fn symmetry(&self) -> f32 {
        let diff = self.left_count.abs_diff(self.right_count) as f32;
        let denom = self.total.max(1) as f32;
        (1.0 - diff / denom).clamp(0.0, 1.0)
    }

    /// Classify a rate against the normal range once a full window of
    /// session time has elapsed.
    pub fn rate_band(&self, rate: u32, session_ms: u64) -> RateBand {
        if self.total == 0 || session_ms < self.params.window_ms {
            return RateBand::Unknown;
        }
        if rate < self.params.normal_rate_min {
            RateBand::Low
        } else if rate > self.params.normal_rate_max {
            RateBand::High
        } else {
            RateBand::Normal
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &BlinkEvent> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.total = 0;
        self.left_count = 0;
        self.right_count = 0;
    }

    fn cutoff(&self, now_ms: u64) -> Option<u64> {
        now_ms.checked_sub(self.params.window_ms)
    }
}

impl Default for BlinkWindow {
    fn default() -> Self {
        Self::new(WindowParams::default())
    }
}
