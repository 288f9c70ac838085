//! Tests for bucket history derivation.

#[cfg(test)]
mod tests {
    use crate::analysis::values::{AttrKind, BucketAttr, BucketHistory, ValueMap};
    use crate::events::EventId;
    use crate::utils::DateRange;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde::Serialize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    #[serde(rename_all = "camelCase")]
    enum TestAttr {
        Balance,
        Income,
    }

    impl BucketAttr for TestAttr {
        const ALL: &'static [Self] = &[TestAttr::Balance, TestAttr::Income];

        fn kind(self) -> AttrKind {
            AttrKind::Money
        }

        fn is_flow(self) -> bool {
            matches!(self, TestAttr::Income)
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Registers a credit of `amount` on `date` against the history.
    fn credit(history: &mut BucketHistory<TestAttr>, id: u64, date: NaiveDate, amount: Decimal) {
        history.values_mut().add_decimal(TestAttr::Balance, amount);
        history.values_mut().add_decimal(TestAttr::Income, amount);
        history.register_event(EventId(id), date);
    }

    fn sample_history() -> BucketHistory<TestAttr> {
        let mut history = BucketHistory::new();
        credit(&mut history, 1, d(2023, 1, 1), dec!(1000));
        credit(&mut history, 2, d(2023, 2, 1), dec!(-150));
        credit(&mut history, 3, d(2023, 3, 1), dec!(300));
        history
    }

    #[test]
    fn test_register_event_stores_independent_copy() {
        let mut history = BucketHistory::new();
        credit(&mut history, 1, d(2023, 1, 1), dec!(100));
        history.values_mut().set_decimal(TestAttr::Balance, dec!(777));

        let stored = history.values_for_event(EventId(1)).unwrap();
        assert_eq!(stored.decimal(TestAttr::Balance), Some(dec!(100)));
    }

    #[test]
    fn test_registration_is_unconditional_for_zero_amounts() {
        let mut history = BucketHistory::new();
        credit(&mut history, 1, d(2023, 1, 1), dec!(0));
        assert!(!history.is_idle());
        assert!(history.values_for_event(EventId(1)).is_some());
    }

    #[test]
    fn test_delta_for_event() {
        let history = sample_history();
        assert_eq!(
            history.delta_for_event(EventId(1), TestAttr::Balance),
            Some(dec!(1000))
        );
        assert_eq!(
            history.delta_for_event(EventId(2), TestAttr::Balance),
            Some(dec!(-150))
        );
        assert_eq!(history.delta_for_event(EventId(9), TestAttr::Balance), None);
    }

    #[test]
    fn test_dated_truncates_at_cutoff() {
        let base = sample_history();
        let dated = BucketHistory::dated(&base, d(2023, 2, 14));

        assert_eq!(dated.len(), 2);
        assert_eq!(dated.values().decimal(TestAttr::Balance), Some(dec!(850)));
        assert!(dated.values_for_event(EventId(3)).is_none());
    }

    #[test]
    fn test_dated_replay_equivalence() {
        // The dated history must equal a shorter original scan.
        let base = sample_history();

        for (cutoff, ids) in [
            (d(2022, 12, 31), vec![]),
            (d(2023, 1, 1), vec![1u64]),
            (d(2023, 2, 1), vec![1, 2]),
            (d(2023, 12, 31), vec![1, 2, 3]),
        ] {
            let dated = BucketHistory::dated(&base, cutoff);

            let mut replay = BucketHistory::new();
            for &id in &ids {
                let (date, amount) = match id {
                    1 => (d(2023, 1, 1), dec!(1000)),
                    2 => (d(2023, 2, 1), dec!(-150)),
                    _ => (d(2023, 3, 1), dec!(300)),
                };
                credit(&mut replay, id, date, amount);
            }

            assert_eq!(dated.values(), replay.values(), "cutoff {}", cutoff);
            assert_eq!(dated.len(), replay.len(), "cutoff {}", cutoff);
        }
    }

    #[test]
    fn test_dated_with_no_qualifying_events_falls_back_to_base() {
        let base = sample_history();
        let dated = BucketHistory::dated(&base, d(2022, 6, 1));

        assert!(dated.is_idle());
        assert_eq!(dated.values(), dated.base_values());
    }

    #[test]
    fn test_ranged_rebases_in_range_snapshots() {
        let base = sample_history();
        let ranged = BucketHistory::ranged(&base, &DateRange::new(d(2023, 1, 15), d(2023, 2, 15)));

        // Only the February event is in range
        assert_eq!(ranged.len(), 1);
        // Base is the last pre-start snapshot
        assert_eq!(
            ranged.base_values().decimal(TestAttr::Balance),
            Some(dec!(1000))
        );
        // Live values keep the last in-range entry's absolute values
        assert_eq!(ranged.values().decimal(TestAttr::Balance), Some(dec!(850)));
        // The stored snapshot carries the period-relative income delta
        let snapshot = ranged.values_for_event(EventId(2)).unwrap();
        assert_eq!(snapshot.decimal(TestAttr::Income), Some(dec!(-150)));
        assert_eq!(snapshot.decimal(TestAttr::Balance), Some(dec!(850)));
    }

    #[test]
    fn test_ranged_entry_at_start_is_base_and_first_entry() {
        let base = sample_history();
        let ranged = BucketHistory::ranged(&base, &DateRange::new(d(2023, 2, 1), d(2023, 3, 31)));

        // The 2023-02-01 entry defines the base and is retained in range
        assert_eq!(ranged.len(), 2);
        assert_eq!(
            ranged.base_values().decimal(TestAttr::Balance),
            Some(dec!(850))
        );
        let at_start = ranged.values_for_event(EventId(2)).unwrap();
        assert_eq!(at_start.decimal(TestAttr::Income), Some(dec!(0)));
    }

    #[test]
    fn test_ranged_idle_range_keeps_base_values() {
        let base = sample_history();
        let ranged = BucketHistory::ranged(&base, &DateRange::new(d(2023, 4, 1), d(2023, 6, 30)));

        assert!(ranged.is_idle());
        assert_eq!(ranged.values().decimal(TestAttr::Balance), Some(dec!(1150)));
        assert_eq!(
            ranged.base_values().decimal(TestAttr::Balance),
            Some(dec!(1150))
        );
    }

    #[test]
    fn test_adjust_to_base_folds_flows_once() {
        let base = sample_history();
        let mut ranged =
            BucketHistory::ranged(&base, &DateRange::new(d(2023, 1, 15), d(2023, 2, 15)));
        ranged.adjust_to_base();

        assert_eq!(ranged.values().decimal(TestAttr::Income), Some(dec!(-150)));
        assert_eq!(ranged.values().decimal(TestAttr::Balance), Some(dec!(850)));
        assert_eq!(
            ranged.base_values().decimal(TestAttr::Income),
            Some(dec!(0))
        );
        assert_eq!(
            ranged.base_values().decimal(TestAttr::Balance),
            Some(dec!(1000))
        );
    }

    #[test]
    fn test_range_additivity_of_flows() {
        // Splitting a period at any date conserves flow deltas.
        let base = sample_history();
        let full = DateRange::new(d(2023, 1, 1), d(2023, 12, 31));

        let delta_over = |range: DateRange| {
            let mut h = BucketHistory::ranged(&base, &range);
            h.adjust_to_base();
            h.values().decimal_or_zero(TestAttr::Income)
                - h.base_values().decimal_or_zero(TestAttr::Income)
        };

        let whole = delta_over(full);
        for split in [d(2023, 1, 1), d(2023, 1, 20), d(2023, 2, 1), d(2023, 7, 4)] {
            let first = delta_over(DateRange::new(full.start(), split));
            let second = delta_over(DateRange::new(split, full.end()));
            assert_eq!(first + second, whole, "split at {}", split);
        }
    }
}
