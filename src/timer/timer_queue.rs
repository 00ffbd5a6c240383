use std::time::{Duration, Instant};

/**
 * One-shot timers owned by a single thread.
 *
 * The queue never fires anything on its own. The owner asks for `next_deadline()`, waits on it
 * (e.g. with `crossbeam_channel::at`) and then collects whatever has expired with `pop_expired()`.
 * Every scheduled timer gets a unique `TimerHandle`, so a callback that was cancelled or replaced
 * can always be told apart from the one currently armed.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

struct Pending<T> {
    handle: TimerHandle,
    deadline: Instant,
    payload: T,
}

pub struct TimerQueue<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        TimerQueue::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> TimerQueue<T> {
        TimerQueue {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(Pending {
            handle,
            deadline: now + delay,
            payload,
        });
        handle
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Removes every timer due at `now`, earliest deadline first (ties in scheduling order).
    pub fn pop_expired(&mut self, now: Instant) -> Vec<(TimerHandle, T)> {
        let (mut expired, remaining): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.deadline <= now);
        self.pending = remaining;

        expired.sort_by_key(|p| (p.deadline, p.handle));
        expired.into_iter().map(|p| (p.handle, p.payload)).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
