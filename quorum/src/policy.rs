//! Stake-weighted acceptance threshold.

use serde::{Deserialize, Serialize};

use crate::{QuorumError, StakeView};

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Accepts an aggregate weight once it reaches `threshold_bps` of the total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumPolicy {
    threshold_bps: u32,
}

/// Result of weighing one response against the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tally {
    pub signed_weight: u128,
    pub total_weight: u128,
    pub required_weight: u128,
    pub accepted: bool,
}

impl QuorumPolicy {
    pub fn new(threshold_bps: u32) -> Result<Self, QuorumError> {
        if threshold_bps == 0 || threshold_bps as u128 > BPS_DENOMINATOR {
            return Err(QuorumError::InvalidThreshold(threshold_bps));
        }
        Ok(Self { threshold_bps })
    }

    pub fn threshold_bps(&self) -> u32 {
        self.threshold_bps
    }

    /// ⌈total × bps / 10_000⌉ without intermediate overflow.
    pub fn required_for_total(&self, total: u128) -> u128 {
        let bps = self.threshold_bps as u128;
        let whole = (total / BPS_DENOMINATOR) * bps;
        let rest = ((total % BPS_DENOMINATOR) * bps).div_ceil(BPS_DENOMINATOR);
        whole + rest
    }

    /// Weight a response must reach under the current registry state.
    pub fn required_weight(&self, view: &impl StakeView) -> u128 {
        self.required_for_total(view.total_weight())
    }

    /// Total weight of the quorum under the current registry state.
    pub fn total_weight(&self, view: &impl StakeView) -> u128 {
        view.total_weight()
    }

    /// `aggregate ≥ ⌈total × bps / 10_000⌉`, equivalently
    /// `aggregate × 10_000 ≥ total × bps`. A quorum without weight accepts nothing.
    pub fn accepts_total(&self, aggregate: u128, total: u128) -> bool {
        total > 0 && aggregate >= self.required_for_total(total)
    }

    pub fn accepts(&self, aggregate: u128, view: &impl StakeView) -> bool {
        self.accepts_total(aggregate, view.total_weight())
    }

    pub fn tally(&self, signed_weight: u128, view: &impl StakeView) -> Tally {
        let total_weight = view.total_weight();
        Tally {
            signed_weight,
            total_weight,
            required_weight: self.required_for_total(total_weight),
            accepted: self.accepts_total(signed_weight, total_weight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use trappist_types::OperatorId;

    struct Weights(HashMap<OperatorId, u128>);

    impl StakeView for Weights {
        fn weight_of(&self, operator: &OperatorId) -> u128 {
            self.0.get(operator).copied().unwrap_or(0)
        }

        fn total_weight(&self) -> u128 {
            self.0.values().sum()
        }
    }

    fn view(weights: &[u128]) -> Weights {
        Weights(
            weights
                .iter()
                .enumerate()
                .map(|(i, w)| (OperatorId::new([i as u8; 32]), *w))
                .collect(),
        )
    }

    #[test]
    fn threshold_bounds() {
        assert_eq!(QuorumPolicy::new(0), Err(QuorumError::InvalidThreshold(0)));
        assert_eq!(
            QuorumPolicy::new(10_001),
            Err(QuorumError::InvalidThreshold(10_001))
        );
        assert!(QuorumPolicy::new(10_000).is_ok());
        assert!(QuorumPolicy::new(1).is_ok());
    }

    #[test]
    fn sixty_six_percent_of_hundred() {
        let policy = QuorumPolicy::new(6_600).unwrap();
        let v = view(&[70, 30]);
        assert_eq!(policy.total_weight(&v), 100);
        assert_eq!(policy.required_weight(&v), 66);
        assert!(policy.accepts(70, &v));
        assert!(!policy.accepts(30, &v));
    }

    #[test]
    fn exact_boundary() {
        let policy = QuorumPolicy::new(6_600).unwrap();
        let v = view(&[100]);
        assert!(policy.accepts(66, &v));
        assert!(!policy.accepts(65, &v));
    }

    #[test]
    fn required_rounds_up() {
        let policy = QuorumPolicy::new(6_667).unwrap();
        // 3 × 0.6667 = 2.0001 → 3
        assert_eq!(policy.required_for_total(3), 3);
        let half = QuorumPolicy::new(5_000).unwrap();
        assert_eq!(half.required_for_total(3), 2);
        assert_eq!(half.required_for_total(4), 2);
    }

    #[test]
    fn zero_total_accepts_nothing() {
        let policy = QuorumPolicy::new(6_600).unwrap();
        let v = view(&[]);
        assert_eq!(policy.required_weight(&v), 0);
        assert!(!policy.accepts(0, &v));
    }

    #[test]
    fn huge_totals_do_not_overflow() {
        let policy = QuorumPolicy::new(10_000).unwrap();
        assert_eq!(policy.required_for_total(u128::MAX), u128::MAX);
        assert!(policy.accepts_total(u128::MAX, u128::MAX));
        assert!(!policy.accepts_total(u128::MAX - 1, u128::MAX));
    }

    #[test]
    fn tally_reports_all_figures() {
        let policy = QuorumPolicy::new(6_600).unwrap();
        let t = policy.tally(70, &view(&[70, 30]));
        assert_eq!(
            t,
            Tally {
                signed_weight: 70,
                total_weight: 100,
                required_weight: 66,
                accepted: true
            }
        );
    }
}
