//! Delayed work for a session, fired by polling rather than by a timer thread.
//!
//! Every task carries the epoch of the session that scheduled it. Restarting or
//! ending a session bumps the epoch, so a task left over from an older session
//! is dropped instead of fired.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Replace the resolved round with a fresh one.
    AdvanceRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Scheduled {
    id: TaskId,
    due: Instant,
    epoch: u64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, epoch: u64, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due,
            epoch,
            task,
        });
        id
    }

    /// Returns whether the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "cancelling scheduled tasks");
        }
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every task due at `now`, oldest first. Due tasks from
    /// another epoch are discarded.
    pub fn take_due(&mut self, now: Instant, epoch: u64) -> Vec<Task> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = pending;

        due.sort_by_key(|s| (s.due, s.id.0));
        due.into_iter()
            .filter(|s| {
                let current = s.epoch == epoch;
                if !current {
                    tracing::warn!(task = ?s.task, stale_epoch = s.epoch, epoch, "dropping stale task");
                }
                current
            })
            .map(|s| s.task)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_nothing_fires_early() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start + Duration::from_secs(3), 1, Task::AdvanceRound);

        assert!(scheduler.take_due(start, 1).is_empty());
        assert!(scheduler
            .take_due(start + Duration::from_millis(2_999), 1)
            .is_empty());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_due_task_fires_once() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start + Duration::from_secs(3), 1, Task::AdvanceRound);

        let later = start + Duration::from_secs(3);
        assert_eq!(scheduler.take_due(later, 1), vec![Task::AdvanceRound]);
        assert!(scheduler.take_due(later, 1).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(start, 1, Task::AdvanceRound);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.take_due(start, 1).is_empty());
    }

    #[test]
    fn test_stale_epoch_is_dropped() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start, 1, Task::AdvanceRound);
        scheduler.schedule(start, 2, Task::AdvanceRound);

        assert_eq!(scheduler.take_due(start, 2), vec![Task::AdvanceRound]);
        assert!(scheduler.is_empty());
    }
}
