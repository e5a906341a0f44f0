//! Cancellable delayed callbacks
//!
//! Deadlines are on the frame clock; the controller fires whatever is due each frame.

/// Work the controller schedules for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Leave `RoundWon` and start the next round
    RoundAdvance,
    /// Accept clicks again after a penalty
    InvincibilityEnd,
}

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending {
    handle: TimerHandle,
    deadline: f64,
    kind: TimerKind,
}

/// Pending timers
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    next: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `kind` once `now + delay_ms` is reached
    pub fn schedule(&mut self, now: f64, delay_ms: f64, kind: TimerKind) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.pending.push(Pending {
            handle,
            deadline: now + delay_ms,
            kind,
        });
        handle
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Deadline of a pending timer
    pub fn deadline(&self, handle: TimerHandle) -> Option<f64> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.deadline)
    }

    /// Remove and return every due timer, earliest deadline first
    pub fn take_due(&mut self, now: f64) -> Vec<(TimerHandle, TimerKind)> {
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.deadline <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));
        due.into_iter().map(|p| (p.handle, p.kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_deadline() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(1000.0, 500.0, TimerKind::InvincibilityEnd);
        assert!(scheduler.take_due(1499.0).is_empty());
        assert_eq!(scheduler.deadline(handle), Some(1500.0));
        assert_eq!(
            scheduler.take_due(1500.0),
            vec![(handle, TimerKind::InvincibilityEnd)]
        );
        assert_eq!(scheduler.deadline(handle), None);
        assert!(scheduler.take_due(5000.0).is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.schedule(0.0, 100.0, TimerKind::RoundAdvance);
        let b = scheduler.schedule(0.0, 200.0, TimerKind::InvincibilityEnd);
        assert!(scheduler.cancel(a));
        assert!(!scheduler.cancel(a));
        assert_eq!(scheduler.take_due(1000.0), vec![(b, TimerKind::InvincibilityEnd)]);
    }

    #[test]
    fn test_due_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        let late = scheduler.schedule(0.0, 300.0, TimerKind::RoundAdvance);
        let early = scheduler.schedule(0.0, 100.0, TimerKind::InvincibilityEnd);
        let due = scheduler.take_due(300.0);
        assert_eq!(due[0].0, early);
        assert_eq!(due[1].0, late);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, 100.0, TimerKind::RoundAdvance);
        scheduler.cancel_all();
        assert!(scheduler.take_due(1e9).is_empty());
    }
}
