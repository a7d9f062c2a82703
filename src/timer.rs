use std::cmp::Ordering;
use std::collections::BinaryHeap;
use web_time::Instant;

use crate::*;

/// One-shot work item scheduled against the host-driven clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum TimerAction {
    ShowCell(Cell),
    HideCell(Cell),
    PresentationDone,
    AdvanceRound,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct ScheduledTask {
    pub due: Instant,
    pub epoch: u64,
    pub action: TimerAction,
    seq: u64,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    // Reversed so the max-heap pops the earliest deadline, with the insertion
    // counter breaking ties in FIFO order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending one-shot timers ordered by deadline.
///
/// Tasks are never cancelled once scheduled; a task from a superseded epoch
/// stays in the queue and is discarded by the engine when it comes due.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    tasks: BinaryHeap<ScheduledTask>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, epoch: u64, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            due,
            epoch,
            action,
            seq,
        });
    }

    /// Deadline of the next pending task, stale or not.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.peek().map(|task| task.due)
    }

    /// Removes and returns the earliest task whose deadline has passed.
    pub fn pop_due(&mut self, now: Instant) -> Option<ScheduledTask> {
        if self.tasks.peek()?.due <= now {
            self.tasks.pop()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn pops_earliest_deadline_first() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(t0 + ms(300), 0, TimerAction::PresentationDone);
        queue.schedule(t0 + ms(100), 0, TimerAction::ShowCell(2));
        queue.schedule(t0 + ms(200), 0, TimerAction::HideCell(2));

        assert_eq!(queue.next_deadline(), Some(t0 + ms(100)));
        let order: Vec<TimerAction> = std::iter::from_fn(|| queue.pop_due(t0 + ms(300)))
            .map(|task| task.action)
            .collect();
        assert_eq!(
            order,
            vec![
                TimerAction::ShowCell(2),
                TimerAction::HideCell(2),
                TimerAction::PresentationDone,
            ]
        );
    }

    #[test]
    fn equal_deadlines_pop_in_schedule_order() {
        let t0 = Instant::now();
        let due = t0 + ms(50);
        let mut queue = TimerQueue::new();
        queue.schedule(due, 0, TimerAction::ShowCell(0));
        queue.schedule(due, 0, TimerAction::ShowCell(1));
        queue.schedule(due, 0, TimerAction::ShowCell(2));

        let order: Vec<TimerAction> = std::iter::from_fn(|| queue.pop_due(due))
            .map(|task| task.action)
            .collect();
        assert_eq!(
            order,
            vec![
                TimerAction::ShowCell(0),
                TimerAction::ShowCell(1),
                TimerAction::ShowCell(2),
            ]
        );
    }

    #[test]
    fn pop_due_leaves_future_tasks_alone() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(t0 + ms(100), 0, TimerAction::AdvanceRound);

        assert!(queue.pop_due(t0 + ms(99)).is_none());
        assert_eq!(queue.len(), 1);
        let task = queue.pop_due(t0 + ms(100)).unwrap();
        assert_eq!(task.action, TimerAction::AdvanceRound);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn carries_the_epoch_it_was_scheduled_with() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(t0 + ms(10), 3, TimerAction::ShowCell(7));
        queue.schedule(t0 + ms(20), 4, TimerAction::ShowCell(8));

        assert_eq!(queue.pop_due(t0 + ms(30)).unwrap().epoch, 3);
        assert_eq!(queue.pop_due(t0 + ms(30)).unwrap().epoch, 4);
    }
}
