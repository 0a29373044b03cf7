use std::collections::BTreeMap;

use crate::event::ScheduledEvent;
use crate::stage::Stage;

/// Handle to a pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId {
    fire_at: u64,
    seq: u64,
}

/// Ordered queue of one-shot timers keyed by virtual deadline.
///
/// Timers with equal deadlines fire in scheduling order, so the firing
/// sequence is fully determined by the schedule calls and nothing can
/// race. Every timer is owned by a stage; leaving a stage cancels its
/// whole group, which is what keeps stale simulators from mutating
/// state after teardown.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: BTreeMap<(u64, u64), (Stage, ScheduledEvent)>,
    next_seq: u64,
}

impl TimerQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire `delay_ms` after `now_ms`, owned by the
    /// given stage.
    pub fn schedule(
        &mut self,
        now_ms: u64,
        delay_ms: u64,
        owner: Stage,
        event: ScheduledEvent,
    ) -> TimerId {
        let id = TimerId {
            fire_at: now_ms + delay_ms,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert((id.fire_at, id.seq), (owner, event));
        id
    }

    /// Cancel a single timer. Cancelling a timer that already fired or
    /// was already cancelled is a no-op.
    pub fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&(id.fire_at, id.seq));
    }

    /// Cancel every timer owned by `owner`. Returns how many were
    /// cancelled.
    pub fn cancel_stage(&mut self, owner: Stage) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, (stage, _)| *stage != owner);
        before - self.pending.len()
    }

    /// The deadline of the earliest pending timer, if any.
    pub fn next_fire_at(&self) -> Option<u64> {
        self.pending.keys().next().map(|(fire_at, _)| *fire_at)
    }

    /// Pop the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, Stage, ScheduledEvent)> {
        let (fire_at, _) = *self.pending.keys().next()?;
        if fire_at > now_ms {
            return None;
        }
        self.pending
            .pop_first()
            .map(|((at, _), (owner, event))| (at, owner, event))
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Return `true` if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::ParticipantId;

    #[test]
    fn fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(0, 3000, Stage::Lobby, ScheduledEvent::Arrival(ParticipantId(2)));
        queue.schedule(0, 1500, Stage::Lobby, ScheduledEvent::Arrival(ParticipantId(1)));

        let (at, _, event) = queue.pop_due(5000).unwrap();
        assert_eq!(at, 1500);
        assert_eq!(event, ScheduledEvent::Arrival(ParticipantId(1)));

        let (at, _, event) = queue.pop_due(5000).unwrap();
        assert_eq!(at, 3000);
        assert_eq!(event, ScheduledEvent::Arrival(ParticipantId(2)));
        assert!(queue.pop_due(5000).is_none());
    }

    #[test]
    fn equal_deadlines_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(0, 1000, Stage::Lobby, ScheduledEvent::Arrival(ParticipantId(1)));
        queue.schedule(0, 1000, Stage::Lobby, ScheduledEvent::Arrival(ParticipantId(2)));

        let (_, _, first) = queue.pop_due(1000).unwrap();
        let (_, _, second) = queue.pop_due(1000).unwrap();
        assert_eq!(first, ScheduledEvent::Arrival(ParticipantId(1)));
        assert_eq!(second, ScheduledEvent::Arrival(ParticipantId(2)));
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(0, 1500, Stage::Lobby, ScheduledEvent::InviteDelivered);
        assert!(queue.pop_due(1499).is_none());
        assert_eq!(queue.next_fire_at(), Some(1500));
        assert!(queue.pop_due(1500).is_some());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(0, 500, Stage::Voting, ScheduledEvent::PreferenceGraceOver);
        queue.cancel(id);
        queue.cancel(id);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_stage_removes_only_that_group() {
        let mut queue = TimerQueue::new();
        queue.schedule(0, 500, Stage::Lobby, ScheduledEvent::Arrival(ParticipantId(1)));
        queue.schedule(0, 600, Stage::Lobby, ScheduledEvent::Arrival(ParticipantId(2)));
        queue.schedule(
            0,
            700,
            Stage::Preference,
            ScheduledEvent::PreferenceArrival(ParticipantId(1)),
        );

        assert_eq!(queue.cancel_stage(Stage::Lobby), 2);
        assert_eq!(queue.len(), 1);
        let (_, owner, _) = queue.pop_due(1000).unwrap();
        assert_eq!(owner, Stage::Preference);
    }
}
