use proptest::prelude::*;

use regdesk_types::{Amount, Percent, RegistrationIndex, Timestamp};

proptest! {
    /// Percent never goes negative, whatever float arrives on the wire.
    #[test]
    fn percent_from_any_float_is_non_negative(pct in any::<f64>()) {
        let p = Percent::from_percent(pct);
        if !pct.is_finite() || pct <= 0.0 {
            prop_assert!(p.is_zero());
        }
    }

    /// Percent JSON roundtrip preserves basis points.
    #[test]
    fn percent_json_roundtrip(bps in 0u32..1_000_000) {
        let p = Percent::from_basis_points(bps);
        let json = serde_json::to_string(&p).unwrap();
        let back: Percent = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, p);
    }

    /// A share of an amount never exceeds the amount for percentages up to 100.
    #[test]
    fn percent_of_bounded(minor in 0u64..u64::MAX, bps in 0u32..=10_000) {
        let a = Amount::new(minor);
        prop_assert!(a.percent_of(Percent::from_basis_points(bps)) <= a);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(Timestamp::new(a) <= Timestamp::new(b), a <= b);
    }

    /// Registration indices are strictly increasing under `next`.
    #[test]
    fn registration_index_next_increases(n in 0u64..u64::MAX - 1) {
        let idx = RegistrationIndex::new(n);
        prop_assert!(idx.next() > idx);
        prop_assert_eq!(idx.next().get(), n + 1);
    }
}
