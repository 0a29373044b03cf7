use tr_core::Recommendation;

/// A recommendation with its rank decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    /// The ranked candidate.
    pub recommendation: Recommendation,
    /// Set on the top-ranked entry only. Display hint; carries no
    /// further logic.
    pub best_bet: bool,
}

/// Order candidates by match quality, best first.
///
/// The sort is stable: candidates with equal match scores keep their
/// original relative order.
pub fn rank(recommendations: &[Recommendation]) -> Vec<Ranked> {
    let mut sorted = recommendations.to_vec();
    sorted.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, recommendation)| Ranked {
            recommendation,
            best_bet: index == 0,
        })
        .collect()
}
