use proptest::prelude::*;

use trappist_quorum::{QuorumPolicy, BPS_DENOMINATOR};

proptest! {
    /// The overflow-free form agrees with the naive cross-multiplication
    /// wherever the naive form does not overflow.
    #[test]
    fn accepts_matches_cross_multiplication(
        bps in 1u32..=10_000,
        total in 1u128..(u64::MAX as u128),
        aggregate in 0u128..(u64::MAX as u128),
    ) {
        let policy = QuorumPolicy::new(bps).unwrap();
        let naive = aggregate * BPS_DENOMINATOR >= total * bps as u128;
        prop_assert_eq!(policy.accepts_total(aggregate, total), naive);
    }

    /// Exactly the required weight is accepted; one unit less is not.
    #[test]
    fn boundary_is_exact(bps in 1u32..=10_000, total in 1u128..1_000_000_000_000) {
        let policy = QuorumPolicy::new(bps).unwrap();
        let required = policy.required_for_total(total);
        prop_assert!(policy.accepts_total(required, total));
        if required > 0 {
            prop_assert!(!policy.accepts_total(required - 1, total));
        }
    }
}
