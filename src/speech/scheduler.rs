//! Back-to-back playback scheduling for streamed audio chunks.
//!
//! Inbound live-mode chunks must queue seamlessly: no overlap, no gap.
//! The scheduler owns the monotonically advancing next-start counter and
//! the set of chunks still playing; all mutation goes through it, so the
//! ownership story stays in one place (audio callback plus
//! setup/teardown, never concurrently).

use std::collections::HashSet;

/// A chunk admitted to the playback timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledChunk {
    /// Scheduler-assigned id, used to report completion.
    pub id: u64,
    /// Start position on the playback timeline, in samples.
    pub start: u64,
}

/// Single-owner scheduler for streamed playback.
///
/// Positions are in samples at the output rate; the caller supplies the
/// current timeline position (`now`) when scheduling.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    next_start: u64,
    next_id: u64,
    active: HashSet<u64>,
}

impl PlaybackScheduler {
    /// Create an empty scheduler with the timeline at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a chunk of `duration` samples, given the current timeline
    /// position. The chunk starts at `max(next_start, now)` and advances
    /// the next-start counter by its duration, so in-order arrivals play
    /// back-to-back.
    pub fn schedule(&mut self, duration: u64, now: u64) -> ScheduledChunk {
        let start = self.next_start.max(now);
        self.next_start = start + duration;

        let id = self.next_id;
        self.next_id += 1;
        self.active.insert(id);

        ScheduledChunk { id, start }
    }

    /// Report that a chunk finished playing and drop it from the active set.
    pub fn complete(&mut self, id: u64) {
        self.active.remove(&id);
    }

    /// Number of chunks scheduled but not yet completed.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Reset scheduling state to zero. Called on session teardown.
    pub fn reset(&mut self) {
        self.next_start = 0;
        self.active.clear();
    }

    /// Current next-start position in samples.
    #[must_use]
    pub fn next_start(&self) -> u64 {
        self.next_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_chunks_are_back_to_back() {
        let mut scheduler = PlaybackScheduler::new();
        let durations = [4800_u64, 2400, 9600, 1200];

        let mut expected_start = 0;
        for duration in durations {
            let chunk = scheduler.schedule(duration, 0);
            assert_eq!(chunk.start, expected_start);
            expected_start += duration;
        }
        assert_eq!(scheduler.next_start(), durations.iter().sum::<u64>());
    }

    #[test]
    fn late_arrival_starts_at_now() {
        let mut scheduler = PlaybackScheduler::new();
        scheduler.schedule(100, 0);

        // The timeline has advanced past the queued audio; the next chunk
        // cannot start in the past.
        let chunk = scheduler.schedule(50, 500);
        assert_eq!(chunk.start, 500);
        assert_eq!(scheduler.next_start(), 550);
    }

    #[test]
    fn completion_shrinks_active_set() {
        let mut scheduler = PlaybackScheduler::new();
        let a = scheduler.schedule(10, 0);
        let b = scheduler.schedule(10, 0);
        assert_eq!(scheduler.active_count(), 2);

        scheduler.complete(a.id);
        assert_eq!(scheduler.active_count(), 1);
        scheduler.complete(b.id);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn reset_zeroes_the_timeline() {
        let mut scheduler = PlaybackScheduler::new();
        scheduler.schedule(1000, 0);
        scheduler.reset();
        assert_eq!(scheduler.next_start(), 0);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.schedule(10, 0).start, 0);
    }

    #[test]
    fn ids_are_unique_across_reset() {
        let mut scheduler = PlaybackScheduler::new();
        let a = scheduler.schedule(10, 0);
        scheduler.reset();
        let b = scheduler.schedule(10, 0);
        assert_ne!(a.id, b.id);
    }
}
