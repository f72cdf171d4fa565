//! Cancellable timer schedule on a simulated clock
//!
//! Entries are `(due_ms, action)` pairs kept sorted by due time, ties broken
//! by insertion order. Nothing fires on its own: the owner advances the clock
//! and pops what is due, so a cancelled entry can never run late.

/// Cancellation token for one scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<A> {
    due_ms: f64,
    id: TimerId,
    action: A,
}

/// Ordered set of pending timers
#[derive(Debug, Clone)]
pub struct Schedule<A> {
    now_ms: f64,
    next_id: u64,
    /// Sorted ascending by (due_ms, id)
    entries: Vec<Entry<A>>,
}

impl<A> Default for Schedule<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Schedule<A> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Current simulated time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `action` to fire `delay_ms` from now.
    /// Negative or NaN delays fire on the next pop.
    pub fn after(&mut self, delay_ms: f64, action: A) -> TimerId {
        let delay_ms = if delay_ms.is_nan() { 0.0 } else { delay_ms.max(0.0) };
        let due_ms = self.now_ms + delay_ms;
        let id = TimerId(self.next_id);
        self.next_id += 1;

        // Insert after every entry due at or before this one (keeps FIFO on ties)
        let pos = self.entries.partition_point(|e| e.due_ms <= due_ms);
        self.entries.insert(pos, Entry { due_ms, id, action });
        id
    }

    /// Due time of the earliest pending entry
    pub fn next_due_ms(&self) -> Option<f64> {
        self.entries.first().map(|e| e.due_ms)
    }

    /// Pop the earliest entry due at or before `horizon_ms`, moving the clock
    /// to its due time. Entries scheduled by the caller in response will be
    /// considered by the next call.
    pub fn pop_due(&mut self, horizon_ms: f64) -> Option<A> {
        if self.entries.first()?.due_ms > horizon_ms {
            return None;
        }
        let entry = self.entries.remove(0);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry.action)
    }

    /// Move the clock forward to `horizon_ms` (never backward)
    pub fn settle(&mut self, horizon_ms: f64) {
        self.now_ms = self.now_ms.max(horizon_ms);
    }

    /// Cancel one entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending entry, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Cancel everything and put the clock back to zero
    pub fn rewind(&mut self) {
        self.cancel_all();
        self.now_ms = 0.0;
    }
}
