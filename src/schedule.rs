//! Time-ordered queue for deferred, fire-and-forget work.
//!
//! The game uses it for staged cosmetic bursts and for the delayed game-over
//! transition.  Items carry everything they need (positions captured at
//! scheduling time, session generation), so whoever drains the queue must
//! re-check validity before acting on them.

/// Items waiting for their due time, kept in insertion order.
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    entries: Vec<(f64, u64, T)>,
    seq: u64,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            seq: 0,
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `item` to fire once the clock reaches `due_at` (seconds).
    pub fn push(&mut self, due_at: f64, item: T) {
        self.entries.push((due_at, self.seq, item));
        self.seq += 1;
    }

    /// Remove and return every item due at or before `now`.
    ///
    /// Items come out ordered by due time; ties keep insertion order.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        if !self.entries.iter().any(|(due, _, _)| *due <= now) {
            return Vec::new();
        }
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(at, _, _)| *at <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, item)| item).collect()
    }

    /// Forget everything still pending.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_early() {
        let mut q = DeferredQueue::new();
        q.push(1.0, "a");
        assert!(q.drain_due(0.5).is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn due_items_come_out_in_time_order() {
        let mut q = DeferredQueue::new();
        q.push(0.4, "late");
        q.push(0.2, "early");
        q.push(0.2, "early-second");
        q.push(9.0, "future");
        assert_eq!(q.drain_due(0.5), vec!["early", "early-second", "late"]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn clear_drops_pending_work() {
        let mut q = DeferredQueue::new();
        q.push(1.0, 1);
        q.clear();
        assert!(q.is_empty());
        assert!(q.drain_due(10.0).is_empty());
    }
}
