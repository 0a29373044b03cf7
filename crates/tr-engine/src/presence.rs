use tr_core::ParticipantId;

use crate::context::EngineContext;
use crate::event::{ScheduledEvent, SignalKind};
use crate::stage::Stage;

/// Simulates guests trickling into the lobby.
///
/// The host counts toward the headcount but never gets a timer; they
/// are present from the start. Each invited guest gets one one-shot
/// arrival timer; the all-present advance fires exactly once, after the
/// last arrival.
#[derive(Debug)]
pub struct PresenceSimulator {
    expected_total: usize,
    present: Vec<ParticipantId>,
    advanced: bool,
}

impl PresenceSimulator {
    /// Create a simulator for a table of `expected_total` people, host
    /// included.
    pub fn new(expected_total: usize) -> Self {
        Self {
            expected_total,
            present: vec![ParticipantId::HOST],
            advanced: false,
        }
    }

    /// Schedule one arrival per invited guest at `(i + 1) * interval`.
    /// Returns `true` if there is nobody to wait for, in which case the
    /// caller should advance immediately.
    pub fn begin(&mut self, ctx: &mut EngineContext<'_>, interval_ms: u64) -> bool {
        let invited: Vec<ParticipantId> = ctx.session.invited().iter().map(|p| p.id).collect();
        if invited.is_empty() && !self.advanced {
            self.advanced = true;
            return true;
        }
        for (index, id) in invited.into_iter().enumerate() {
            ctx.schedule(
                (index as u64 + 1) * interval_ms,
                Stage::Lobby,
                ScheduledEvent::Arrival(id),
            );
        }
        false
    }

    /// A guest arrived. Returns `true` when this arrival completes the
    /// table for the first time.
    pub fn on_arrival(&mut self, ctx: &mut EngineContext<'_>, id: ParticipantId) -> bool {
        if self.present.contains(&id) || ctx.session.mark_present(id).is_err() {
            return false;
        }
        self.present.push(id);

        let name = ctx.session.participant_name(id).to_string();
        ctx.emit(
            SignalKind::ParticipantJoined { participant: id },
            format!(
                "{name} joined the lobby ({}/{})",
                self.present.len(),
                self.expected_total
            ),
        );

        if self.present.len() == self.expected_total && !self.advanced {
            self.advanced = true;
            return true;
        }
        false
    }

    /// Everyone present so far, in arrival order, host first.
    pub fn present(&self) -> &[ParticipantId] {
        &self.present
    }

    /// Whether the whole table has arrived.
    pub fn all_present(&self) -> bool {
        self.present.len() >= self.expected_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::{Participant, Session};

    use crate::clock::SimClock;
    use crate::event::SignalLog;
    use crate::timer::TimerQueue;

    fn session(invited: u32) -> Session {
        Session::new(
            "s1",
            "Priya",
            (1..=invited)
                .map(|i| Participant::new(ParticipantId(i), format!("Guest {i}"), "🙂"))
                .collect(),
        )
    }

    #[test]
    fn begin_schedules_one_timer_per_guest() {
        let mut session = session(3);
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        let mut signals = SignalLog::new();
        let mut ctx = EngineContext {
            clock: &clock,
            timers: &mut timers,
            signals: &mut signals,
            session: &mut session,
        };

        let mut presence = PresenceSimulator::new(4);
        assert!(!presence.begin(&mut ctx, 1500));
        assert_eq!(timers.len(), 3);
        assert_eq!(timers.next_fire_at(), Some(1500));
    }

    #[test]
    fn host_only_table_completes_immediately() {
        let mut session = session(0);
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        let mut signals = SignalLog::new();
        let mut ctx = EngineContext {
            clock: &clock,
            timers: &mut timers,
            signals: &mut signals,
            session: &mut session,
        };

        let mut presence = PresenceSimulator::new(1);
        assert!(presence.begin(&mut ctx, 1500));
        // The latch holds: a second begin never re-fires the advance.
        assert!(!presence.begin(&mut ctx, 1500));
        assert!(timers.is_empty());
    }

    #[test]
    fn advance_fires_once_after_the_last_arrival() {
        let mut session = session(3);
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        let mut signals = SignalLog::new();
        let mut ctx = EngineContext {
            clock: &clock,
            timers: &mut timers,
            signals: &mut signals,
            session: &mut session,
        };

        let mut presence = PresenceSimulator::new(4);
        assert!(!presence.on_arrival(&mut ctx, ParticipantId(1)));
        assert!(!presence.on_arrival(&mut ctx, ParticipantId(2)));
        assert!(presence.on_arrival(&mut ctx, ParticipantId(3)));
        assert!(presence.all_present());
        assert_eq!(presence.present().len(), 4);

        // A duplicate arrival neither grows the list nor re-fires.
        assert!(!presence.on_arrival(&mut ctx, ParticipantId(3)));
        assert_eq!(presence.present().len(), 4);
        assert_eq!(signals.len(), 3);
    }

    #[test]
    fn arrival_order_is_preserved() {
        let mut session = session(3);
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        let mut signals = SignalLog::new();
        let mut ctx = EngineContext {
            clock: &clock,
            timers: &mut timers,
            signals: &mut signals,
            session: &mut session,
        };

        let mut presence = PresenceSimulator::new(4);
        presence.on_arrival(&mut ctx, ParticipantId(2));
        presence.on_arrival(&mut ctx, ParticipantId(1));
        assert_eq!(
            presence.present(),
            [ParticipantId::HOST, ParticipantId(2), ParticipantId(1)]
        );
    }

    #[test]
    fn unknown_guest_is_ignored() {
        let mut session = session(1);
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        let mut signals = SignalLog::new();
        let mut ctx = EngineContext {
            clock: &clock,
            timers: &mut timers,
            signals: &mut signals,
            session: &mut session,
        };

        let mut presence = PresenceSimulator::new(2);
        assert!(!presence.on_arrival(&mut ctx, ParticipantId(42)));
        assert_eq!(presence.present().len(), 1);
        assert!(signals.is_empty());
    }
}
