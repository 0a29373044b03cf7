use tr_core::{ParticipantId, Session, SessionDataset};

use crate::clock::SimClock;
use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::event::{ScheduledEvent, Signal, SignalKind, SignalLog};
use crate::preference::{PreferenceAggregator, PreferenceForm};
use crate::presence::PresenceSimulator;
use crate::ranker::{Ranked, rank};
use crate::settlement::{CategoryTotals, ParticipantShare, SettlementEngine, ShareCategory};
use crate::stage::{Stage, StageController};
use crate::timer::TimerQueue;
use crate::voting::{VoteTally, VotingEngine};

/// The top-level session orchestrator.
///
/// Owns the session state, the virtual clock, the timer queue, the
/// signal log, and the per-stage components. Local actions are
/// synchronous; everything scripted arrives through the timer queue and
/// is applied by a single reducer, so a whole run is deterministic and
/// replayable. Time only moves through [`SessionEngine::advance_by`],
/// [`SessionEngine::advance_to`], or [`SessionEngine::run_until_idle`].
///
/// Exactly one component owns each stage; leaving a stage cancels its
/// timer group, so a stale simulator can never mutate state after its
/// stage is done.
#[derive(Debug)]
pub struct SessionEngine {
    dataset: SessionDataset,
    session: Session,
    config: EngineConfig,
    stages: StageController,
    clock: SimClock,
    timers: TimerQueue,
    signals: SignalLog,
    invited: bool,
    presence: PresenceSimulator,
    preferences: PreferenceAggregator,
    ranking: Vec<Ranked>,
    voting: VotingEngine,
    settlement: SettlementEngine,
    totals: CategoryTotals,
    consumption: Vec<(ParticipantId, Vec<ShareCategory>)>,
}

impl SessionEngine {
    /// Build an engine over a validated dataset. The session starts at
    /// the invitation stage with the clock at zero.
    pub fn new(dataset: SessionDataset, config: EngineConfig) -> Self {
        let session = dataset.to_session();
        let participant_ids: Vec<ParticipantId> =
            session.participants().iter().map(|p| p.id).collect();
        let headcount = session.participant_count();

        let presence = PresenceSimulator::new(headcount);
        let preferences = PreferenceAggregator::new(headcount - 1);
        let voting = VotingEngine::new(headcount);
        let settlement = SettlementEngine::new(&participant_ids);
        let consumption = participant_ids.into_iter().map(|id| (id, Vec::new())).collect();
        let totals = config.category_totals;

        Self {
            dataset,
            session,
            config,
            stages: StageController::new(),
            clock: SimClock::new(),
            timers: TimerQueue::new(),
            signals: SignalLog::new(),
            invited: false,
            presence,
            preferences,
            ranking: Vec::new(),
            voting,
            settlement,
            totals,
            consumption,
        }
    }

    // -----------------------------------------------------------------------
    // Local actions
    // -----------------------------------------------------------------------

    /// Share the invite. Only meaningful at the invitation stage; later
    /// or repeated calls are no-ops. The lobby opens once the invite
    /// delivery delay elapses.
    pub fn share_invite(&mut self) {
        if self.stages.current() != Stage::Invitation || self.invited {
            return;
        }
        self.invited = true;
        self.timers.schedule(
            self.clock.now_ms(),
            self.config.invite_delivery_ms,
            Stage::Invitation,
            ScheduledEvent::InviteDelivered,
        );
    }

    /// Submit the local preference form. No-op outside the preference
    /// stage; resubmission is ignored.
    pub fn submit_preferences(&mut self, form: PreferenceForm) {
        if self.stages.current() != Stage::Preference {
            return;
        }
        let interval = self.config.preference_interval_ms;
        let grace = self.config.preference_grace_ms;
        let mut ctx = EngineContext {
            clock: &self.clock,
            timers: &mut self.timers,
            signals: &mut self.signals,
            session: &mut self.session,
        };
        self.preferences.submit_local(&mut ctx, form, interval, grace);
    }

    /// Move from the revelation to the voting stage. The local user
    /// owns the revelation stage; out-of-stage calls are no-ops.
    pub fn start_voting(&mut self) -> EngineResult<()> {
        if self.stages.current() != Stage::Revelation {
            return Ok(());
        }
        self.advance_from(Stage::Revelation)
    }

    /// Cast the local ballot. The recommendation id must exist in the
    /// dataset; outside the voting stage (or after the first ballot)
    /// the call is otherwise a no-op.
    pub fn cast_vote(&mut self, recommendation_id: &str) -> EngineResult<()> {
        if self.dataset.recommendation(recommendation_id).is_none() {
            return Err(EngineError::UnknownRecommendation(
                recommendation_id.to_string(),
            ));
        }
        if self.stages.current() != Stage::Voting {
            return Ok(());
        }
        let closed = {
            let mut ctx = EngineContext {
                clock: &self.clock,
                timers: &mut self.timers,
                signals: &mut self.signals,
                session: &mut self.session,
            };
            self.voting.cast_local(&mut ctx, recommendation_id, &self.config)
        };
        if closed.is_some() {
            self.advance_from(Stage::Voting)?;
        }
        Ok(())
    }

    /// Replace the category totals. Before settlement the totals are
    /// stored for stage entry; during settlement the split is
    /// recomputed immediately.
    pub fn set_category_totals(&mut self, totals: CategoryTotals) -> EngineResult<()> {
        Self::validate_totals(&totals)?;
        self.totals = totals;
        if self.stages.current() == Stage::Settlement {
            let mut ctx = EngineContext {
                clock: &self.clock,
                timers: &mut self.timers,
                signals: &mut self.signals,
                session: &mut self.session,
            };
            self.settlement.set_totals(&mut ctx, totals);
        }
        Ok(())
    }

    /// Record which categories each listed participant consumed.
    /// Participants not listed keep their previous assignment. During
    /// settlement the split is recomputed immediately.
    pub fn set_consumption(
        &mut self,
        assignments: Vec<(ParticipantId, Vec<ShareCategory>)>,
    ) -> EngineResult<()> {
        for (id, _) in &assignments {
            if self.session.participant(*id).is_none() {
                return Err(EngineError::UnknownParticipant(*id));
            }
        }
        for (id, categories) in assignments {
            if let Some(entry) = self.consumption.iter_mut().find(|(pid, _)| *pid == id) {
                entry.1 = categories;
            }
        }
        if self.stages.current() == Stage::Settlement {
            let assignments = self.consumption.clone();
            let mut ctx = EngineContext {
                clock: &self.clock,
                timers: &mut self.timers,
                signals: &mut self.signals,
                session: &mut self.session,
            };
            self.settlement.set_assignments(&mut ctx, assignments);
        }
        Ok(())
    }

    /// Pay the host's share. No-op outside settlement; the first call
    /// schedules the remaining scripted payments.
    pub fn pay_share(&mut self) {
        if self.stages.current() != Stage::Settlement {
            return;
        }
        let mut ctx = EngineContext {
            clock: &self.clock,
            timers: &mut self.timers,
            signals: &mut self.signals,
            session: &mut self.session,
        };
        self.settlement.pay_local(&mut ctx, &self.config);
    }

    // -----------------------------------------------------------------------
    // Time control
    // -----------------------------------------------------------------------

    /// Advance virtual time by `delta_ms`, applying every timer due in
    /// the window, in deadline order.
    pub fn advance_by(&mut self, delta_ms: u64) -> EngineResult<()> {
        self.advance_to(self.clock.now_ms() + delta_ms)
    }

    /// Advance virtual time to `deadline_ms`, applying every timer due
    /// at or before it, in deadline order.
    pub fn advance_to(&mut self, deadline_ms: u64) -> EngineResult<()> {
        while let Some((fire_at, owner, event)) = self.timers.pop_due(deadline_ms) {
            self.clock.advance_to(fire_at);
            self.apply(owner, event)?;
        }
        self.clock.advance_to(deadline_ms);
        Ok(())
    }

    /// Run until no timers remain. With the scripted simulation this
    /// carries the session as far as it can go without further local
    /// action.
    pub fn run_until_idle(&mut self) -> EngineResult<()> {
        while let Some(next) = self.timers.next_fire_at() {
            self.advance_to(next)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reducer
    // -----------------------------------------------------------------------

    /// Apply one scheduled event. Events owned by a stage that is no
    /// longer active are dropped; group cancellation on stage exit
    /// makes such stragglers unreachable in practice, this is the
    /// backstop.
    fn apply(&mut self, owner: Stage, event: ScheduledEvent) -> EngineResult<()> {
        if owner != self.stages.current() {
            return Ok(());
        }
        match event {
            ScheduledEvent::InviteDelivered => self.advance_from(Stage::Invitation),
            ScheduledEvent::Arrival(id) => {
                let complete = {
                    let mut ctx = EngineContext {
                        clock: &self.clock,
                        timers: &mut self.timers,
                        signals: &mut self.signals,
                        session: &mut self.session,
                    };
                    self.presence.on_arrival(&mut ctx, id)
                };
                if complete {
                    self.advance_from(Stage::Lobby)?;
                }
                Ok(())
            }
            ScheduledEvent::PreferenceArrival(id) => {
                let grace = self.config.preference_grace_ms;
                let mut ctx = EngineContext {
                    clock: &self.clock,
                    timers: &mut self.timers,
                    signals: &mut self.signals,
                    session: &mut self.session,
                };
                self.preferences.on_remote(&mut ctx, id, grace);
                Ok(())
            }
            ScheduledEvent::PreferenceGraceOver => {
                if self.preferences.on_grace() {
                    self.advance_from(Stage::Preference)?;
                }
                Ok(())
            }
            ScheduledEvent::Ballot {
                voter,
                recommendation,
            } => {
                let closed = {
                    let mut ctx = EngineContext {
                        clock: &self.clock,
                        timers: &mut self.timers,
                        signals: &mut self.signals,
                        session: &mut self.session,
                    };
                    self.voting.on_ballot(&mut ctx, voter, &recommendation)
                };
                if closed.is_some() {
                    self.advance_from(Stage::Voting)?;
                }
                Ok(())
            }
            ScheduledEvent::PaymentClears(id) => {
                let mut ctx = EngineContext {
                    clock: &self.clock,
                    timers: &mut self.timers,
                    signals: &mut self.signals,
                    session: &mut self.session,
                };
                self.settlement.on_payment(&mut ctx, id);
                Ok(())
            }
        }
    }

    /// Move to the next stage on behalf of `origin`, tear down the old
    /// stage's timers, announce the change, and run the new stage's
    /// entry hook.
    fn advance_from(&mut self, origin: Stage) -> EngineResult<()> {
        let from = self.stages.current();
        let to = self.stages.advance(origin)?;
        if to == from {
            return Ok(());
        }
        self.timers.cancel_stage(from);
        self.signals.push(Signal::new(
            self.clock.now_ms(),
            SignalKind::StageChanged { from, to },
            format!("stage: {from} -> {to}"),
        ));
        self.enter(to)
    }

    fn enter(&mut self, stage: Stage) -> EngineResult<()> {
        match stage {
            Stage::Invitation | Stage::Preference | Stage::Voting => {}
            Stage::Lobby => {
                let interval = self.config.arrival_interval_ms;
                let complete = {
                    let mut ctx = EngineContext {
                        clock: &self.clock,
                        timers: &mut self.timers,
                        signals: &mut self.signals,
                        session: &mut self.session,
                    };
                    self.presence.begin(&mut ctx, interval)
                };
                // A host-only table has nobody to wait for.
                if complete {
                    self.advance_from(Stage::Lobby)?;
                }
            }
            Stage::Revelation => {
                self.ranking = rank(&self.dataset.recommendations);
                if let Some(best) = self.ranking.first() {
                    self.signals.push(Signal::new(
                        self.clock.now_ms(),
                        SignalKind::RecommendationsRanked {
                            best_bet: best.recommendation.id.clone(),
                        },
                        format!(
                            "\"{}\" ranked best bet at {}% match",
                            best.recommendation.name, best.recommendation.match_score
                        ),
                    ));
                }
            }
            Stage::Settlement => {
                let totals = self.totals;
                let assignments = self.consumption.clone();
                let mut ctx = EngineContext {
                    clock: &self.clock,
                    timers: &mut self.timers,
                    signals: &mut self.signals,
                    session: &mut self.session,
                };
                self.settlement.configure(&mut ctx, totals, assignments);
            }
        }
        Ok(())
    }

    fn validate_totals(totals: &CategoryTotals) -> EngineResult<()> {
        let fields = [
            ("veg", totals.veg),
            ("non_veg", totals.non_veg),
            ("mocktail", totals.mocktail),
            ("cocktail", totals.cocktail),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidAmount { field, value });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Outbound surface
    // -----------------------------------------------------------------------

    /// The currently active stage.
    pub fn stage(&self) -> Stage {
        self.stages.current()
    }

    /// Every stage visited so far, in order.
    pub fn visited_stages(&self) -> &[Stage] {
        self.stages.visited()
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The read-only input dataset.
    pub fn dataset(&self) -> &SessionDataset {
        &self.dataset
    }

    /// The timing profile in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The outbound signal log.
    pub fn signals(&self) -> &SignalLog {
        &self.signals
    }

    /// Everyone in the lobby so far, in arrival order, host first.
    pub fn present(&self) -> &[ParticipantId] {
        self.presence.present()
    }

    /// Remote preference submissions received so far.
    pub fn submitted_count(&self) -> usize {
        self.preferences.submitted_count()
    }

    /// The ranked candidates, empty before the revelation stage.
    pub fn ranking(&self) -> &[Ranked] {
        &self.ranking
    }

    /// The running vote tally.
    pub fn tally(&self) -> &VoteTally {
        self.voting.tally()
    }

    /// The majority threshold for this table.
    pub fn threshold(&self) -> u32 {
        self.voting.threshold()
    }

    /// The winning recommendation, once voting has closed.
    pub fn winner(&self) -> Option<&str> {
        self.voting.winner()
    }

    /// The current split, in session participant order.
    pub fn shares(&self) -> &[ParticipantShare] {
        self.settlement.shares()
    }

    /// Sum of all category totals before division.
    pub fn computed_total(&self) -> f64 {
        self.settlement.computed_total()
    }

    /// Sum of the paid shares, in whole currency units.
    pub fn total_collected(&self) -> i64 {
        self.settlement.total_collected()
    }

    /// Whether every share has been paid.
    pub fn all_paid(&self) -> bool {
        self.settlement.all_paid()
    }
}
