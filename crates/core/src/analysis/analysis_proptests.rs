//! Randomized properties over generated event streams.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountCategory, AccountCategoryId, AccountId};
    use crate::analysis::{Analysis, AnalysisManager};
    use crate::categories::{CategoryClass, EventCategory, EventCategoryId};
    use crate::dataset::DataSet;
    use crate::events::{AssetRef, Event, EventId};
    use crate::payees::{Payee, PayeeId};
    use crate::tax::TaxYearConfig;
    use crate::utils::DateRange;
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn config() -> TaxYearConfig {
        TaxYearConfig {
            personal_allowance: dec!(12570),
            allowance_taper_threshold: dec!(100000),
            basic_band: dec!(37700),
            basic_rate: dec!(0.20),
            higher_rate: dec!(0.40),
            dividend_basic_rate: dec!(0.0875),
            dividend_higher_rate: dec!(0.3375),
        }
    }

    /// (day offset, amount in cents, is_income, tax credit in cents)
    type RawEvent = (u64, u32, bool, u32);

    fn raw_events() -> impl Strategy<Value = Vec<RawEvent>> {
        prop::collection::vec((0u64..365, 1u32..500_000, any::<bool>(), 0u32..50_000), 1..40)
    }

    fn cents(value: u32) -> Decimal {
        Decimal::new(value as i64, 2)
    }

    fn build_dataset(raw: &[RawEvent]) -> DataSet {
        let mut data = DataSet::new();
        data.add_account_category(AccountCategory::new(AccountCategoryId(1), "Current"));
        data.add_account(Account::new(AccountId(1), "Checking", AccountCategoryId(1)));
        data.add_payee(Payee::new(PayeeId(1), "Employer"));
        data.add_payee(Payee::new(PayeeId(2), "Shop"));
        data.add_category(EventCategory::new(
            EventCategoryId(1),
            "Salary",
            CategoryClass::TaxedIncome,
        ));
        data.add_category(EventCategory::new(
            EventCategoryId(2),
            "Spending",
            CategoryClass::Expense,
        ));

        let mut sorted: Vec<RawEvent> = raw.to_vec();
        sorted.sort_by_key(|r| r.0);

        for (index, &(offset, amount, is_income, credit)) in sorted.iter().enumerate() {
            let date = start_date() + Days::new(offset);
            let event = if is_income {
                Event::new(
                    EventId(index as u64 + 1),
                    date,
                    cents(amount),
                    AssetRef::Payee(PayeeId(1)),
                    AssetRef::Account(AccountId(1)),
                    EventCategoryId(1),
                )
                .with_tax_credit(cents(credit))
            } else {
                Event::new(
                    EventId(index as u64 + 1),
                    date,
                    cents(amount),
                    AssetRef::Account(AccountId(1)),
                    AssetRef::Payee(PayeeId(2)),
                    EventCategoryId(2),
                )
            };
            data.add_event(event);
        }
        data
    }

    fn build_manager(raw: &[RawEvent]) -> AnalysisManager {
        let analysis = Analysis::new(Arc::new(build_dataset(raw))).unwrap();
        AnalysisManager::new(analysis, config()).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Totals conserve the leaf sums for any generated event set.
        #[test]
        fn prop_rollup_conservation(raw in raw_events()) {
            let manager = build_manager(&raw);
            let analysis = manager.base_analysis();

            let expected_income: Decimal = raw
                .iter()
                .filter(|r| r.2)
                .map(|r| cents(r.1) + cents(r.3))
                .sum();
            let expected_expense: Decimal = raw
                .iter()
                .filter(|r| !r.2)
                .map(|r| cents(r.1))
                .sum();

            let leaf_income: Decimal = analysis
                .event_categories()
                .iter()
                .map(|b| b.income())
                .sum();

            prop_assert_eq!(analysis.event_categories().totals().income(), expected_income);
            prop_assert_eq!(leaf_income, expected_income);
            prop_assert_eq!(analysis.event_categories().totals().expense(), expected_expense);
            prop_assert_eq!(analysis.payees().totals().income(), expected_income);
        }

        /// Splitting any period at any date conserves period flows.
        #[test]
        fn prop_range_additivity(raw in raw_events(), split_offset in 0u64..365) {
            let manager = build_manager(&raw);
            let full = manager.base_analysis().range();
            let split = (start_date() + Days::new(split_offset))
                .clamp(full.start(), full.end());

            let flows = |range: DateRange| {
                let analysis = manager.analysis_for_range(range).unwrap();
                let totals = analysis.event_categories().totals();
                (totals.income(), totals.expense())
            };

            let whole = flows(full);
            let first = flows(DateRange::new(full.start(), split));
            let second = flows(DateRange::new(split, full.end()));

            prop_assert_eq!(first.0 + second.0, whole.0);
            prop_assert_eq!(first.1 + second.1, whole.1);
        }

        /// A dated derivation equals a shorter original scan.
        #[test]
        fn prop_dated_replay_equivalence(raw in raw_events(), cutoff_offset in 0u64..365) {
            let manager = build_manager(&raw);
            let cutoff = start_date() + Days::new(cutoff_offset);
            let dated = manager.analysis_for_date(cutoff).unwrap();

            // Rebuild from scratch with only the event prefix
            let mut sorted: Vec<RawEvent> = raw.to_vec();
            sorted.sort_by_key(|r| r.0);
            let prefix: Vec<RawEvent> = sorted
                .iter()
                .copied()
                .filter(|r| start_date() + Days::new(r.0) <= cutoff)
                .collect();

            let expected_valuation = if prefix.is_empty() {
                Decimal::ZERO
            } else {
                let replay = build_manager(&prefix);
                let analysis = replay.base_analysis();
                analysis
                    .accounts()
                    .bucket(AccountId(1))
                    .map(|b| b.valuation())
                    .unwrap_or_default()
            };

            let actual_valuation = dated
                .accounts()
                .bucket(AccountId(1))
                .map(|b| b.valuation())
                .unwrap_or_default();

            prop_assert_eq!(actual_valuation, expected_valuation);
        }
    }
}
