use std::fmt;

use serde::{Deserialize, Serialize};
use tr_core::ParticipantId;

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::event::{ScheduledEvent, SignalKind};
use crate::stage::Stage;

/// One category of shared consumption on the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareCategory {
    /// Vegetarian dishes.
    Veg,
    /// Non-vegetarian dishes.
    NonVeg,
    /// Non-alcoholic add-ons.
    Mocktail,
    /// Alcoholic add-ons.
    Cocktail,
}

impl ShareCategory {
    /// Every category, in bill order.
    pub const ALL: [Self; 4] = [Self::Veg, Self::NonVeg, Self::Mocktail, Self::Cocktail];
}

impl fmt::Display for ShareCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Veg => write!(f, "veg"),
            Self::NonVeg => write!(f, "non-veg"),
            Self::Mocktail => write!(f, "mocktail"),
            Self::Cocktail => write!(f, "cocktail"),
        }
    }
}

/// Spend per menu category, in whole currency units.
///
/// These are an external input (the host categorizes the bill); the
/// engine never derives them from the itemized bill, and the computed
/// total is reconciled against the nominal bill total for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    /// Vegetarian dish total.
    pub veg: f64,
    /// Non-vegetarian dish total.
    pub non_veg: f64,
    /// Non-alcoholic add-on total.
    pub mocktail: f64,
    /// Alcoholic add-on total.
    pub cocktail: f64,
}

impl CategoryTotals {
    /// Build totals from the four category amounts.
    pub fn new(veg: f64, non_veg: f64, mocktail: f64, cocktail: f64) -> Self {
        Self {
            veg,
            non_veg,
            mocktail,
            cocktail,
        }
    }

    /// The amount for one category.
    pub fn amount(&self, category: ShareCategory) -> f64 {
        match category {
            ShareCategory::Veg => self.veg,
            ShareCategory::NonVeg => self.non_veg,
            ShareCategory::Mocktail => self.mocktail,
            ShareCategory::Cocktail => self.cocktail,
        }
    }

    /// Plain sum of all category totals, before any division.
    pub fn computed_total(&self) -> f64 {
        self.veg + self.non_veg + self.mocktail + self.cocktail
    }
}

/// Payment state of one share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet paid.
    #[default]
    Pending,
    /// Payment cleared.
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// A participant's computed share of the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantShare {
    /// Whose share this is.
    pub participant: ParticipantId,
    /// Amount owed, rounded half-up to whole currency units.
    pub amount: i64,
    /// The categories this participant is tagged into.
    pub categories: Vec<ShareCategory>,
    /// Payment state.
    pub payment: PaymentStatus,
}

/// Round a non-negative amount half-up to the nearest whole unit.
fn round_half_up(amount: f64) -> i64 {
    (amount + 0.5).floor() as i64
}

/// Split category totals across participants by tag assignment.
///
/// Each category total divides evenly among the participants tagged
/// into it; a category nobody is tagged into contributes nothing, so
/// there is no division by zero. Each participant's summed share is
/// rounded half-up once, at the end.
pub fn compute_split(
    totals: &CategoryTotals,
    assignments: &[(ParticipantId, Vec<ShareCategory>)],
) -> Vec<ParticipantShare> {
    let consumers = |category: ShareCategory| {
        assignments
            .iter()
            .filter(|(_, categories)| categories.contains(&category))
            .count()
    };
    let per_head: Vec<(ShareCategory, f64)> = ShareCategory::ALL
        .iter()
        .map(|&category| {
            let count = consumers(category);
            let share = if count == 0 {
                0.0
            } else {
                totals.amount(category) / count as f64
            };
            (category, share)
        })
        .collect();

    assignments
        .iter()
        .map(|(participant, categories)| {
            let exact: f64 = per_head
                .iter()
                .filter(|(category, _)| categories.contains(category))
                .map(|(_, share)| share)
                .sum();
            ParticipantShare {
                participant: *participant,
                amount: round_half_up(exact),
                categories: categories.clone(),
                payment: PaymentStatus::Pending,
            }
        })
        .collect()
}

/// Settlement bookkeeping for the terminal stage: the live split plus
/// the scripted payment flow.
#[derive(Debug)]
pub struct SettlementEngine {
    totals: CategoryTotals,
    assignments: Vec<(ParticipantId, Vec<ShareCategory>)>,
    shares: Vec<ParticipantShare>,
    paid: Vec<ParticipantId>,
}

impl SettlementEngine {
    /// Create the engine with empty assignments for every participant
    /// and zero totals. Shares are recomputed on every input change.
    pub fn new(participants: &[ParticipantId]) -> Self {
        let assignments: Vec<(ParticipantId, Vec<ShareCategory>)> =
            participants.iter().map(|id| (*id, Vec::new())).collect();
        let shares = compute_split(&CategoryTotals::default(), &assignments);
        Self {
            totals: CategoryTotals::default(),
            assignments,
            shares,
            paid: Vec::new(),
        }
    }

    /// Set both inputs at once and recompute, emitting a single signal.
    /// Used on stage entry.
    pub fn configure(
        &mut self,
        ctx: &mut EngineContext<'_>,
        totals: CategoryTotals,
        assignments: Vec<(ParticipantId, Vec<ShareCategory>)>,
    ) {
        self.totals = totals;
        self.assignments = assignments;
        self.recompute(ctx);
    }

    /// Replace the category totals and recompute the split.
    pub fn set_totals(&mut self, ctx: &mut EngineContext<'_>, totals: CategoryTotals) {
        self.totals = totals;
        self.recompute(ctx);
    }

    /// Replace the consumption assignments and recompute the split.
    pub fn set_assignments(
        &mut self,
        ctx: &mut EngineContext<'_>,
        assignments: Vec<(ParticipantId, Vec<ShareCategory>)>,
    ) {
        self.assignments = assignments;
        self.recompute(ctx);
    }

    fn recompute(&mut self, ctx: &mut EngineContext<'_>) {
        self.shares = compute_split(&self.totals, &self.assignments);
        for share in &mut self.shares {
            if self.paid.contains(&share.participant) {
                share.payment = PaymentStatus::Paid;
            }
        }
        let computed_total = self.totals.computed_total();
        ctx.emit(
            SignalKind::SplitRecomputed { computed_total },
            format!(
                "split recomputed across {} shares (computed total {computed_total})",
                self.shares.len()
            ),
        );
    }

    /// The host pays their share. Idempotent; the first call schedules
    /// the remaining participants' scripted payments.
    pub fn pay_local(&mut self, ctx: &mut EngineContext<'_>, config: &EngineConfig) -> bool {
        if self.paid.contains(&ParticipantId::HOST) {
            return false;
        }
        self.mark_paid(ctx, ParticipantId::HOST);

        let unpaid: Vec<ParticipantId> = self
            .assignments
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !id.is_host() && !self.paid.contains(id))
            .collect();
        for (index, id) in unpaid.into_iter().enumerate() {
            ctx.schedule(
                config.payment_delay_ms(index),
                Stage::Settlement,
                ScheduledEvent::PaymentClears(id),
            );
        }
        true
    }

    /// A scripted payment cleared.
    pub fn on_payment(&mut self, ctx: &mut EngineContext<'_>, participant: ParticipantId) {
        if self.paid.contains(&participant)
            || !self.assignments.iter().any(|(id, _)| *id == participant)
        {
            return;
        }
        self.mark_paid(ctx, participant);
    }

    fn mark_paid(&mut self, ctx: &mut EngineContext<'_>, participant: ParticipantId) {
        self.paid.push(participant);
        let mut amount = 0;
        for share in &mut self.shares {
            if share.participant == participant {
                share.payment = PaymentStatus::Paid;
                amount = share.amount;
            }
        }
        let collected = self.total_collected();
        let name = ctx.session.participant_name(participant).to_string();
        ctx.emit(
            SignalKind::PaymentReceived {
                participant,
                collected,
            },
            format!("{name} paid {amount} ({collected} collected)"),
        );
    }

    /// The current split, in session participant order.
    pub fn shares(&self) -> &[ParticipantShare] {
        &self.shares
    }

    /// The current category totals.
    pub fn totals(&self) -> &CategoryTotals {
        &self.totals
    }

    /// Sum of all category totals before division.
    pub fn computed_total(&self) -> f64 {
        self.totals.computed_total()
    }

    /// Sum of the shares that have been paid, in whole units.
    pub fn total_collected(&self) -> i64 {
        self.shares
            .iter()
            .filter(|share| share.payment == PaymentStatus::Paid)
            .map(|share| share.amount)
            .sum()
    }

    /// Whether every share has been paid.
    pub fn all_paid(&self) -> bool {
        self.shares
            .iter()
            .all(|share| share.payment == PaymentStatus::Paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: u32) -> Vec<ParticipantId> {
        (0..n).map(ParticipantId).collect()
    }

    #[test]
    fn demo_scenario_sums_to_the_bill() {
        // 2 veg + 2 non-veg participants, one of each with a drink.
        let assignments = vec![
            (ParticipantId(0), vec![ShareCategory::NonVeg, ShareCategory::Mocktail]),
            (ParticipantId(1), vec![ShareCategory::Veg, ShareCategory::Cocktail]),
            (ParticipantId(2), vec![ShareCategory::NonVeg]),
            (ParticipantId(3), vec![ShareCategory::Veg]),
        ];
        let totals = CategoryTotals::new(400.0, 350.0, 90.0, 90.0);
        let shares = compute_split(&totals, &assignments);

        let amounts: Vec<i64> = shares.iter().map(|share| share.amount).collect();
        // 175 + 90, 200 + 90, 175, 200
        assert_eq!(amounts, [265, 290, 175, 200]);
        assert_eq!(amounts.iter().sum::<i64>(), 930);
        assert!((totals.computed_total() - 930.0).abs() < f64::EPSILON);
    }

    #[test]
    fn category_without_consumers_contributes_nothing() {
        let assignments = vec![
            (ParticipantId(0), vec![ShareCategory::Veg]),
            (ParticipantId(1), vec![ShareCategory::Veg]),
        ];
        let totals = CategoryTotals::new(300.0, 0.0, 0.0, 500.0);
        let shares = compute_split(&totals, &assignments);
        assert_eq!(shares[0].amount, 150);
        assert_eq!(shares[1].amount, 150);
    }

    #[test]
    fn untagged_participant_owes_nothing() {
        let assignments = vec![
            (ParticipantId(0), vec![ShareCategory::NonVeg]),
            (ParticipantId(1), Vec::new()),
        ];
        let totals = CategoryTotals::new(0.0, 420.0, 0.0, 0.0);
        let shares = compute_split(&totals, &assignments);
        assert_eq!(shares[0].amount, 420);
        assert_eq!(shares[1].amount, 0);
    }

    #[test]
    fn rounding_is_half_up() {
        // 100 / 3 = 33.33.. -> 33; 350 / 4 = 87.5 -> 88
        let assignments: Vec<_> = ids(3)
            .into_iter()
            .map(|id| (id, vec![ShareCategory::Veg]))
            .collect();
        let shares = compute_split(&CategoryTotals::new(100.0, 0.0, 0.0, 0.0), &assignments);
        assert!(shares.iter().all(|share| share.amount == 33));

        let assignments: Vec<_> = ids(4)
            .into_iter()
            .map(|id| (id, vec![ShareCategory::NonVeg]))
            .collect();
        let shares = compute_split(&CategoryTotals::new(0.0, 350.0, 0.0, 0.0), &assignments);
        assert!(shares.iter().all(|share| share.amount == 88));
    }

    proptest! {
        #[test]
        fn shares_reconcile_with_consumed_totals(
            veg in 0u32..5000,
            non_veg in 0u32..5000,
            mocktail in 0u32..1000,
            cocktail in 0u32..1000,
            masks in prop::collection::vec(0u8..16, 1..8),
        ) {
            let totals = CategoryTotals::new(
                f64::from(veg),
                f64::from(non_veg),
                f64::from(mocktail),
                f64::from(cocktail),
            );
            let assignments: Vec<(ParticipantId, Vec<ShareCategory>)> = masks
                .iter()
                .enumerate()
                .map(|(i, mask)| {
                    let categories = ShareCategory::ALL
                        .iter()
                        .enumerate()
                        .filter(|(bit, _)| mask & (1 << bit) != 0)
                        .map(|(_, category)| *category)
                        .collect();
                    (ParticipantId(i as u32), categories)
                })
                .collect();

            let shares = compute_split(&totals, &assignments);
            let collected: i64 = shares.iter().map(|share| share.amount).sum();

            // Only categories with at least one consumer are payable.
            let payable: f64 = ShareCategory::ALL
                .iter()
                .copied()
                .filter(|category| {
                    assignments.iter().any(|(_, cats)| cats.contains(category))
                })
                .map(|category| totals.amount(category))
                .sum();

            // Each participant's amount is rounded once, so the drift is
            // at most half a unit per participant.
            let bound = assignments.len() as f64 * 0.5 + 1e-6;
            prop_assert!((collected as f64 - payable).abs() <= bound);
        }
    }
}
