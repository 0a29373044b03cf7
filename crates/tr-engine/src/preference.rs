use std::fmt;

use serde::{Deserialize, Serialize};
use tr_core::ParticipantId;

use crate::context::EngineContext;
use crate::event::{ScheduledEvent, SignalKind};
use crate::stage::Stage;

/// Drink options on the preference form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkChoice {
    /// Non-alcoholic only.
    Mocktail,
    /// Alcoholic only.
    Cocktail,
    /// Either is fine.
    Both,
    /// No drinks.
    None,
}

impl fmt::Display for DrinkChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mocktail => write!(f, "mocktail"),
            Self::Cocktail => write!(f, "cocktail"),
            Self::Both => write!(f, "both"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Diet options on the preference form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietChoice {
    /// Vegetarian only.
    Veg,
    /// Non-vegetarian only.
    NonVeg,
    /// Either is fine.
    Both,
}

impl fmt::Display for DietChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Veg => write!(f, "veg"),
            Self::NonVeg => write!(f, "non-veg"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// What the local user asks for: cuisine, vibe, budget, and dietary
/// constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceForm {
    /// Preferred cuisine.
    pub cuisine: String,
    /// Preferred ambiance.
    pub ambiance: String,
    /// Budget per person, whole currency units.
    pub budget_per_person: u32,
    /// How far the venue may be, in kilometres.
    pub vicinity_km: u8,
    /// Drink preference.
    pub drink: DrinkChoice,
    /// Diet preference.
    pub diet: DietChoice,
}

impl Default for PreferenceForm {
    fn default() -> Self {
        Self {
            cuisine: "North Indian".into(),
            ambiance: "Casual Dining".into(),
            budget_per_person: 600,
            vicinity_km: 3,
            drink: DrinkChoice::Mocktail,
            diet: DietChoice::Both,
        }
    }
}

/// Collects the table's preferences: one local form plus N-1 scripted
/// remote submissions.
///
/// The local submission is idempotent; the first call schedules the
/// remote submissions at fixed increments. Once the remote count is
/// full, a single grace timer runs before the stage advances.
#[derive(Debug)]
pub struct PreferenceAggregator {
    expected_remote: usize,
    submitted: usize,
    local_form: Option<PreferenceForm>,
    grace_scheduled: bool,
    advanced: bool,
}

impl PreferenceAggregator {
    /// Create an aggregator expecting `expected_remote` remote forms.
    pub fn new(expected_remote: usize) -> Self {
        Self {
            expected_remote,
            submitted: 0,
            local_form: None,
            grace_scheduled: false,
            advanced: false,
        }
    }

    /// Submit the local form. Returns `false` on resubmission, which is
    /// ignored. The first call schedules the scripted remote
    /// submissions at `(i + 1) * interval`, or goes straight to the
    /// grace period when there is nobody else at the table.
    pub fn submit_local(
        &mut self,
        ctx: &mut EngineContext<'_>,
        form: PreferenceForm,
        interval_ms: u64,
        grace_ms: u64,
    ) -> bool {
        if self.local_form.is_some() {
            return false;
        }
        self.local_form = Some(form);

        let host = ctx.session.host_name().to_string();
        ctx.emit(
            SignalKind::PreferenceSubmitted {
                participant: ParticipantId::HOST,
                submitted: self.submitted,
                expected: self.expected_remote,
            },
            format!("{host} submitted their preferences"),
        );

        let invited: Vec<ParticipantId> = ctx.session.invited().iter().map(|p| p.id).collect();
        for (index, id) in invited.into_iter().enumerate() {
            ctx.schedule(
                (index as u64 + 1) * interval_ms,
                Stage::Preference,
                ScheduledEvent::PreferenceArrival(id),
            );
        }
        if self.expected_remote == 0 {
            self.schedule_grace(ctx, grace_ms);
        }
        true
    }

    /// A scripted remote form came in. Arrivals beyond the expected
    /// count are ignored; the counter is capped.
    pub fn on_remote(&mut self, ctx: &mut EngineContext<'_>, id: ParticipantId, grace_ms: u64) {
        if self.submitted >= self.expected_remote {
            return;
        }
        self.submitted += 1;

        let name = ctx.session.participant_name(id).to_string();
        ctx.emit(
            SignalKind::PreferenceSubmitted {
                participant: id,
                submitted: self.submitted,
                expected: self.expected_remote,
            },
            format!(
                "{name} submitted their preferences ({}/{})",
                self.submitted, self.expected_remote
            ),
        );

        if self.submitted == self.expected_remote {
            self.schedule_grace(ctx, grace_ms);
        }
    }

    fn schedule_grace(&mut self, ctx: &mut EngineContext<'_>, grace_ms: u64) {
        if !self.grace_scheduled {
            self.grace_scheduled = true;
            ctx.schedule(
                grace_ms,
                Stage::Preference,
                ScheduledEvent::PreferenceGraceOver,
            );
        }
    }

    /// The grace period elapsed. Returns `true` exactly once.
    pub fn on_grace(&mut self) -> bool {
        if self.advanced {
            return false;
        }
        self.advanced = true;
        true
    }

    /// Remote submissions received so far.
    pub fn submitted_count(&self) -> usize {
        self.submitted
    }

    /// Remote submissions expected in total.
    pub fn expected_count(&self) -> usize {
        self.expected_remote
    }

    /// The local form, once submitted.
    pub fn local_form(&self) -> Option<&PreferenceForm> {
        self.local_form.as_ref()
    }

    /// Whether the local form and every remote form are in.
    pub fn is_complete(&self) -> bool {
        self.local_form.is_some() && self.submitted >= self.expected_remote
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
    fn local_submit_is_idempotent() {
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

        let mut prefs = PreferenceAggregator::new(3);
        assert!(prefs.submit_local(&mut ctx, PreferenceForm::default(), 1000, 1000));
        assert!(!prefs.submit_local(&mut ctx, PreferenceForm::default(), 1000, 1000));
        // One timer per remote guest, no duplicates from the resubmit.
        assert_eq!(timers.len(), 3);
    }

    #[test]
    fn remote_count_is_capped_and_grace_scheduled_once() {
        let mut session = session(2);
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        let mut signals = SignalLog::new();
        let mut ctx = EngineContext {
            clock: &clock,
            timers: &mut timers,
            signals: &mut signals,
            session: &mut session,
        };

        let mut prefs = PreferenceAggregator::new(2);
        prefs.submit_local(&mut ctx, PreferenceForm::default(), 1000, 1000);
        prefs.on_remote(&mut ctx, ParticipantId(1), 1000);
        assert_eq!(prefs.submitted_count(), 1);
        assert!(!prefs.is_complete());

        prefs.on_remote(&mut ctx, ParticipantId(2), 1000);
        assert_eq!(prefs.submitted_count(), 2);
        assert!(prefs.is_complete());

        // A straggler past the cap changes nothing.
        prefs.on_remote(&mut ctx, ParticipantId(2), 1000);
        assert_eq!(prefs.submitted_count(), 2);

        // 2 remote arrivals + 1 grace timer.
        assert_eq!(timers.len(), 3);
    }

    #[test]
    fn grace_advances_exactly_once() {
        let mut prefs = PreferenceAggregator::new(0);
        assert!(prefs.on_grace());
        assert!(!prefs.on_grace());
    }

    #[test]
    fn solo_table_goes_straight_to_grace() {
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

        let mut prefs = PreferenceAggregator::new(0);
        prefs.submit_local(&mut ctx, PreferenceForm::default(), 1000, 1000);
        assert!(prefs.is_complete());
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_fire_at(), Some(1000));
    }

    #[test]
    fn default_form_matches_the_demo_defaults() {
        let form = PreferenceForm::default();
        assert_eq!(form.cuisine, "North Indian");
        assert_eq!(form.ambiance, "Casual Dining");
        assert_eq!(form.budget_per_person, 600);
        assert_eq!(form.vicinity_km, 3);
        assert_eq!(form.drink, DrinkChoice::Mocktail);
        assert_eq!(form.diet, DietChoice::Both);
    }
}
