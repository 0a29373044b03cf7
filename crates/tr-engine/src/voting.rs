use std::collections::HashMap;

use tr_core::ParticipantId;

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::event::{ScheduledEvent, SignalKind};
use crate::stage::Stage;

/// Ballot box lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePhase {
    /// Ballots are being accepted.
    Open,
    /// A winner is fixed. Terminal.
    Closed,
}

/// Running vote counts per recommendation. Counts only ever grow.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    counts: HashMap<String, u32>,
}

impl VoteTally {
    /// Record one vote and return the new count for that option.
    fn record(&mut self, recommendation: &str) -> u32 {
        let count = self.counts.entry(recommendation.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Votes for one option.
    pub fn votes_for(&self, recommendation: &str) -> u32 {
        self.counts.get(recommendation).copied().unwrap_or(0)
    }

    /// Total ballots recorded.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// All counted options and their votes.
    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.counts
    }
}

/// Majority-seeking ballot collection with scripted remote ballots.
///
/// Accepts exactly one local vote; the first one schedules a ballot for
/// every other participant at fixed increasing delays, each naming the
/// SAME option the local user chose. This models the staged demo's
/// converging consensus, not a general voting simulator.
#[derive(Debug)]
pub struct VotingEngine {
    phase: VotePhase,
    participant_count: usize,
    tally: VoteTally,
    ballots: Vec<(ParticipantId, String)>,
    winner: Option<String>,
}

impl VotingEngine {
    /// Create an open ballot box for a table of `participant_count`.
    pub fn new(participant_count: usize) -> Self {
        Self {
            phase: VotePhase::Open,
            participant_count,
            tally: VoteTally::default(),
            ballots: Vec::new(),
            winner: None,
        }
    }

    /// The majority threshold, `ceil(participant_count / 2)`.
    pub fn threshold(&self) -> u32 {
        self.participant_count.div_ceil(2) as u32
    }

    /// Cast the local ballot. Later calls are ignored. Returns the
    /// winner when this very ballot closes the vote (possible at small
    /// tables).
    pub fn cast_local(
        &mut self,
        ctx: &mut EngineContext<'_>,
        recommendation: &str,
        config: &EngineConfig,
    ) -> Option<String> {
        if self.phase == VotePhase::Closed || self.has_voted(ParticipantId::HOST) {
            return None;
        }
        let outcome = self.apply(ctx, ParticipantId::HOST, recommendation);

        if self.phase == VotePhase::Open {
            let invited: Vec<ParticipantId> = ctx.session.invited().iter().map(|p| p.id).collect();
            for (index, voter) in invited.into_iter().enumerate() {
                ctx.schedule(
                    config.ballot_delay_ms(index),
                    Stage::Voting,
                    ScheduledEvent::Ballot {
                        voter,
                        recommendation: recommendation.to_string(),
                    },
                );
            }
        }
        outcome
    }

    /// A scripted ballot landed. Returns the winner when it closes the
    /// vote.
    pub fn on_ballot(
        &mut self,
        ctx: &mut EngineContext<'_>,
        voter: ParticipantId,
        recommendation: &str,
    ) -> Option<String> {
        self.apply(ctx, voter, recommendation)
    }

    fn apply(
        &mut self,
        ctx: &mut EngineContext<'_>,
        voter: ParticipantId,
        recommendation: &str,
    ) -> Option<String> {
        if self.phase == VotePhase::Closed || self.has_voted(voter) {
            return None;
        }
        self.ballots.push((voter, recommendation.to_string()));
        let votes = self.tally.record(recommendation);
        ctx.emit(
            SignalKind::TallyUpdated {
                recommendation: recommendation.to_string(),
                votes,
            },
            format!(
                "\"{recommendation}\" now at {votes} vote(s) ({}/{} ballots in)",
                self.ballots.len(),
                self.participant_count
            ),
        );

        let winner = if votes >= self.threshold() {
            Some(recommendation.to_string())
        } else if self.ballots.len() == self.participant_count {
            self.plurality_winner()
        } else {
            None
        };

        if let Some(winner) = winner {
            self.phase = VotePhase::Closed;
            self.winner = Some(winner.clone());
            ctx.emit(
                SignalKind::WinnerDeclared {
                    recommendation: winner.clone(),
                },
                format!(
                    "\"{winner}\" wins with {} of {} votes",
                    self.tally.votes_for(&winner),
                    self.tally.total()
                ),
            );
            return Some(winner);
        }
        None
    }

    /// Resolve a full ballot box with no majority: plurality wins, ties
    /// broken by the option that reached the top count first.
    fn plurality_winner(&self) -> Option<String> {
        let top = self.tally.counts().values().copied().max()?;
        let mut running: HashMap<&str, u32> = HashMap::new();
        for (_, recommendation) in &self.ballots {
            let count = running.entry(recommendation.as_str()).or_insert(0);
            *count += 1;
            if *count == top {
                return Some(recommendation.clone());
            }
        }
        None
    }

    fn has_voted(&self, voter: ParticipantId) -> bool {
        self.ballots.iter().any(|(id, _)| *id == voter)
    }

    /// Whether the box is open or closed.
    pub fn phase(&self) -> VotePhase {
        self.phase
    }

    /// The winning option, fixed once voting closes.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// The running tally.
    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    /// How many ballots have been cast.
    pub fn ballots_cast(&self) -> usize {
        self.ballots.len()
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

    struct Fixture {
        session: Session,
        clock: SimClock,
        timers: TimerQueue,
        signals: SignalLog,
    }

    impl Fixture {
        fn new(invited: u32) -> Self {
            Self {
                session: session(invited),
                clock: SimClock::new(),
                timers: TimerQueue::new(),
                signals: SignalLog::new(),
            }
        }

        fn ctx(&mut self) -> EngineContext<'_> {
            EngineContext {
                clock: &self.clock,
                timers: &mut self.timers,
                signals: &mut self.signals,
                session: &mut self.session,
            }
        }
    }

    #[test]
    fn threshold_is_ceiling_of_half() {
        assert_eq!(VotingEngine::new(4).threshold(), 2);
        assert_eq!(VotingEngine::new(5).threshold(), 3);
        assert_eq!(VotingEngine::new(1).threshold(), 1);
    }

    #[test]
    fn local_vote_schedules_scripted_ballots() {
        let mut fx = Fixture::new(3);
        let config = EngineConfig::default();
        let mut voting = VotingEngine::new(4);

        let closed = voting.cast_local(&mut fx.ctx(), "r2", &config);
        assert!(closed.is_none());
        assert_eq!(fx.timers.len(), 3);
        assert_eq!(fx.timers.next_fire_at(), Some(500));
        assert_eq!(voting.tally().votes_for("r2"), 1);
    }

    #[test]
    fn second_local_vote_is_ignored() {
        let mut fx = Fixture::new(3);
        let config = EngineConfig::default();
        let mut voting = VotingEngine::new(4);

        voting.cast_local(&mut fx.ctx(), "r2", &config);
        voting.cast_local(&mut fx.ctx(), "r1", &config);
        assert_eq!(voting.tally().votes_for("r1"), 0);
        assert_eq!(voting.ballots_cast(), 1);
        // No second wave of scripted ballots.
        assert_eq!(fx.timers.len(), 3);
    }

    #[test]
    fn majority_closes_the_vote() {
        let mut fx = Fixture::new(3);
        let config = EngineConfig::default();
        let mut voting = VotingEngine::new(4);

        voting.cast_local(&mut fx.ctx(), "r2", &config);
        let closed = voting.on_ballot(&mut fx.ctx(), ParticipantId(1), "r2");
        assert_eq!(closed.as_deref(), Some("r2"));
        assert_eq!(voting.phase(), VotePhase::Closed);
        assert_eq!(voting.winner(), Some("r2"));
        assert!(voting.tally().votes_for("r2") >= voting.threshold());
    }

    #[test]
    fn ballots_after_close_are_ignored() {
        let mut fx = Fixture::new(3);
        let config = EngineConfig::default();
        let mut voting = VotingEngine::new(4);

        voting.cast_local(&mut fx.ctx(), "r2", &config);
        voting.on_ballot(&mut fx.ctx(), ParticipantId(1), "r2");
        let after = voting.on_ballot(&mut fx.ctx(), ParticipantId(2), "r2");
        assert!(after.is_none());
        assert_eq!(voting.tally().total(), 2);
        // The winner never moves once fixed.
        assert_eq!(voting.winner(), Some("r2"));
    }

    #[test]
    fn solo_table_closes_on_the_local_ballot() {
        let mut fx = Fixture::new(0);
        let config = EngineConfig::default();
        let mut voting = VotingEngine::new(1);

        let closed = voting.cast_local(&mut fx.ctx(), "r1", &config);
        assert_eq!(closed.as_deref(), Some("r1"));
        assert!(fx.timers.is_empty());
    }

    #[test]
    fn full_box_without_majority_resolves_by_plurality() {
        // 5 voters, threshold 3, split 2/2/1: "r1" and "r2" tie at 2,
        // but "r1" reached 2 first.
        let mut fx = Fixture::new(4);
        let mut voting = VotingEngine::new(5);

        let mut ctx = fx.ctx();
        assert!(voting.apply(&mut ctx, ParticipantId::HOST, "r1").is_none());
        assert!(voting.apply(&mut ctx, ParticipantId(1), "r2").is_none());
        assert!(voting.apply(&mut ctx, ParticipantId(2), "r1").is_none());
        assert!(voting.apply(&mut ctx, ParticipantId(3), "r2").is_none());
        let closed = voting.apply(&mut ctx, ParticipantId(4), "r3");
        assert_eq!(closed.as_deref(), Some("r1"));
        assert_eq!(voting.phase(), VotePhase::Closed);
    }

    #[test]
    fn winner_dominates_every_other_option() {
        let mut fx = Fixture::new(4);
        let mut voting = VotingEngine::new(5);

        let mut ctx = fx.ctx();
        voting.apply(&mut ctx, ParticipantId::HOST, "r1");
        voting.apply(&mut ctx, ParticipantId(1), "r2");
        voting.apply(&mut ctx, ParticipantId(2), "r2");
        voting.apply(&mut ctx, ParticipantId(3), "r1");
        voting.apply(&mut ctx, ParticipantId(4), "r2");

        let winner = voting.winner().unwrap();
        for (option, votes) in voting.tally().counts() {
            assert!(voting.tally().votes_for(winner) >= *votes, "{option} beats winner");
        }
    }
}
