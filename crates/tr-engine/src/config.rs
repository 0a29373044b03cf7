use crate::settlement::CategoryTotals;

/// Timing profile for the scripted session.
///
/// All delays are virtual milliseconds. The defaults reproduce the
/// pacing of the staged demo: guests arrive every 1.5 s, preference
/// forms land at 1 s intervals with a 1 s grace period, ballots land at
/// 500/1200/2000 ms, payments clear at 1.5 s and 2.5 s.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between sharing the invite and the lobby opening.
    pub invite_delivery_ms: u64,
    /// Gap between consecutive lobby arrivals.
    pub arrival_interval_ms: u64,
    /// Gap between consecutive remote preference submissions.
    pub preference_interval_ms: u64,
    /// Grace period after the last preference form before advancing.
    pub preference_grace_ms: u64,
    /// Delays after the local ballot at which scripted ballots land.
    pub ballot_delays_ms: Vec<u64>,
    /// Extra gap per scripted ballot beyond the listed delays.
    pub ballot_stride_ms: u64,
    /// Delays after the local payment at which scripted payments clear.
    pub payment_delays_ms: Vec<u64>,
    /// Extra gap per scripted payment beyond the listed delays.
    pub payment_stride_ms: u64,
    /// Category totals applied when the settlement stage is entered.
    pub category_totals: CategoryTotals,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            invite_delivery_ms: 1500,
            arrival_interval_ms: 1500,
            preference_interval_ms: 1000,
            preference_grace_ms: 1000,
            ballot_delays_ms: vec![500, 1200, 2000],
            ballot_stride_ms: 800,
            payment_delays_ms: vec![1500, 2500],
            payment_stride_ms: 1000,
            category_totals: CategoryTotals::default(),
        }
    }
}

impl EngineConfig {
    /// Set the gap between consecutive lobby arrivals.
    pub fn with_arrival_interval_ms(mut self, interval: u64) -> Self {
        self.arrival_interval_ms = interval;
        self
    }

    /// Set the gap between consecutive remote preference submissions.
    pub fn with_preference_interval_ms(mut self, interval: u64) -> Self {
        self.preference_interval_ms = interval;
        self
    }

    /// Set the grace period after the last preference form.
    pub fn with_preference_grace_ms(mut self, grace: u64) -> Self {
        self.preference_grace_ms = grace;
        self
    }

    /// Set the scripted ballot delays.
    pub fn with_ballot_delays_ms(mut self, delays: Vec<u64>) -> Self {
        self.ballot_delays_ms = delays;
        self
    }

    /// Set the category totals applied on entering settlement.
    pub fn with_category_totals(mut self, totals: CategoryTotals) -> Self {
        self.category_totals = totals;
        self
    }

    /// Delay for the `index`-th scripted ballot. Beyond the configured
    /// list, delays keep growing by the ballot stride so firing order
    /// stays strictly increasing for any party size.
    pub fn ballot_delay_ms(&self, index: usize) -> u64 {
        Self::delay_at(&self.ballot_delays_ms, self.ballot_stride_ms, index)
    }

    /// Delay for the `index`-th scripted payment.
    pub fn payment_delay_ms(&self, index: usize) -> u64 {
        Self::delay_at(&self.payment_delays_ms, self.payment_stride_ms, index)
    }

    fn delay_at(delays: &[u64], stride: u64, index: usize) -> u64 {
        match delays.get(index) {
            Some(delay) => *delay,
            None => {
                let last = delays.last().copied().unwrap_or(0);
                let extra = (index + 1 - delays.len()) as u64;
                last + extra * stride
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_pacing() {
        let config = EngineConfig::default();
        assert_eq!(config.arrival_interval_ms, 1500);
        assert_eq!(config.preference_interval_ms, 1000);
        assert_eq!(config.ballot_delay_ms(0), 500);
        assert_eq!(config.ballot_delay_ms(2), 2000);
        assert_eq!(config.payment_delay_ms(1), 2500);
    }

    #[test]
    fn delays_extend_past_the_configured_list() {
        let config = EngineConfig::default();
        assert_eq!(config.ballot_delay_ms(3), 2800);
        assert_eq!(config.ballot_delay_ms(5), 4400);
        assert_eq!(config.payment_delay_ms(2), 3500);
    }

    #[test]
    fn delays_extend_from_an_empty_list() {
        let config = EngineConfig::default().with_ballot_delays_ms(Vec::new());
        assert_eq!(config.ballot_delay_ms(0), 800);
        assert_eq!(config.ballot_delay_ms(1), 1600);
    }

    #[test]
    fn builder_chain() {
        let config = EngineConfig::default()
            .with_arrival_interval_ms(100)
            .with_preference_interval_ms(50)
            .with_preference_grace_ms(25)
            .with_category_totals(CategoryTotals::new(400.0, 350.0, 90.0, 90.0));
        assert_eq!(config.arrival_interval_ms, 100);
        assert_eq!(config.preference_interval_ms, 50);
        assert_eq!(config.preference_grace_ms, 25);
        assert!((config.category_totals.computed_total() - 930.0).abs() < f64::EPSILON);
    }
}
