//! Discrete-event decision engine for Tafelrunde dining sessions.
//!
//! Everything the other participants appear to do (arriving, submitting
//! preferences, voting, paying) is scripted: deferred events on a
//! virtual clock, applied by a single reducer in a deterministic order.
//! The engine runs single-threaded; tests drive time explicitly instead
//! of waiting on wall-clock delays.
//!
//! One component owns each stage of the session, and only that
//! component may mutate state or advance the stage. Leaving a stage
//! cancels its timer group, so a stale simulator can never fire late.

/// The virtual session clock.
pub mod clock;
/// Timing profile for the scripted session.
pub mod config;
/// Mutable context passed to stage components during dispatch.
pub mod context;
/// The session engine orchestrator.
pub mod engine;
/// Error types for the engine crate.
pub mod error;
/// Scheduled event payloads and the outbound signal log.
pub mod event;
/// The preference form and the scripted preference aggregator.
pub mod preference;
/// The scripted lobby presence simulator.
pub mod presence;
/// Pure recommendation ranking.
pub mod ranker;
/// Bill categorization, the split algorithm, and payment tracking.
pub mod settlement;
/// The stage chain and its forward-only controller.
pub mod stage;
/// The ordered one-shot timer queue.
pub mod timer;
/// Vote tallying, scripted ballots, and winner resolution.
pub mod voting;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::EngineConfig`].
pub use config::EngineConfig;
/// Re-export of [`engine::SessionEngine`].
pub use engine::SessionEngine;
/// Re-exports of [`error::EngineError`] and [`error::EngineResult`].
pub use error::{EngineError, EngineResult};
/// Re-exports of [`event::Signal`], [`event::SignalKind`], and [`event::SignalLog`].
pub use event::{Signal, SignalKind, SignalLog};
/// Re-exports of [`preference::PreferenceForm`] and its choice enums.
pub use preference::{DietChoice, DrinkChoice, PreferenceForm};
/// Re-export of [`ranker::Ranked`].
pub use ranker::{Ranked, rank};
/// Re-exports of the settlement types.
pub use settlement::{
    CategoryTotals, ParticipantShare, PaymentStatus, SettlementEngine, ShareCategory,
    compute_split,
};
/// Re-exports of [`stage::Stage`] and [`stage::StageController`].
pub use stage::{Stage, StageController};
/// Re-exports of [`voting::VotePhase`] and [`voting::VoteTally`].
pub use voting::{VotePhase, VoteTally, VotingEngine};
