use tr_core::Session;

use crate::clock::SimClock;
use crate::event::{ScheduledEvent, Signal, SignalKind, SignalLog};
use crate::stage::Stage;
use crate::timer::{TimerId, TimerQueue};

/// Mutable view handed to a stage component while an event or local
/// action is applied.
pub struct EngineContext<'a> {
    /// The virtual clock (read-only during dispatch).
    pub clock: &'a SimClock,
    /// The timer queue for scheduling follow-up events.
    pub timers: &'a mut TimerQueue,
    /// The outbound signal log.
    pub signals: &'a mut SignalLog,
    /// The session whose participants the active component may mutate.
    pub session: &'a mut Session,
}

impl EngineContext<'_> {
    /// The current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Emit an outbound signal at the current virtual time.
    pub fn emit(&mut self, kind: SignalKind, description: impl Into<String>) {
        self.signals
            .push(Signal::new(self.clock.now_ms(), kind, description));
    }

    /// Schedule a follow-up event relative to the current virtual time.
    pub fn schedule(&mut self, delay_ms: u64, owner: Stage, event: ScheduledEvent) -> TimerId {
        self.timers
            .schedule(self.clock.now_ms(), delay_ms, owner, event)
    }
}
