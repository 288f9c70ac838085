//! End-to-end tests over full, dated and ranged analyses.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountCategory, AccountCategoryId, AccountId};
    use crate::analysis::buckets::{AccountAttr, EventCategoryAttr, SecurityAttr};
    use crate::analysis::{Analysis, AnalysisManager};
    use crate::categories::{CategoryClass, EventCategory, EventCategoryId, TaxBasisClass};
    use crate::dataset::DataSet;
    use crate::dilution::Dilution;
    use crate::events::{AssetRef, Event, EventId};
    use crate::payees::{Payee, PayeeId};
    use crate::securities::{Portfolio, PortfolioId, Security, SecurityId};
    use crate::tax::TaxYearConfig;
    use crate::utils::DateRange;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
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

    /// Two events: a January salary credit with a tax credit, and a
    /// February grocery debit.
    fn salary_and_groceries() -> DataSet {
        let mut data = DataSet::new();
        data.add_account_category(AccountCategory::new(AccountCategoryId(1), "Current"));
        data.add_account(Account::new(AccountId(1), "Checking", AccountCategoryId(1)));
        data.add_payee(Payee::new(PayeeId(1), "Employer"));
        data.add_payee(Payee::new(PayeeId(2), "Grocer"));
        data.add_category(EventCategory::new(
            EventCategoryId(1),
            "Salary",
            CategoryClass::TaxedIncome,
        ));
        data.add_category(EventCategory::new(
            EventCategoryId(2),
            "Groceries",
            CategoryClass::Expense,
        ));

        data.add_event(
            Event::new(
                EventId(1),
                d(2023, 1, 1),
                dec!(1000.00),
                AssetRef::Payee(PayeeId(1)),
                AssetRef::Account(AccountId(1)),
                EventCategoryId(1),
            )
            .with_tax_credit(dec!(200.00)),
        );
        data.add_event(Event::new(
            EventId(2),
            d(2023, 2, 1),
            dec!(150.00),
            AssetRef::Account(AccountId(1)),
            AssetRef::Payee(PayeeId(2)),
            EventCategoryId(2),
        ));
        data
    }

    fn manager(data: DataSet) -> AnalysisManager {
        let analysis = Analysis::new(Arc::new(data)).unwrap();
        AnalysisManager::new(analysis, config()).unwrap()
    }

    #[test]
    fn test_full_history_valuations() {
        let manager = manager(salary_and_groceries());
        let analysis = manager.base_analysis();

        let checking = analysis.accounts().bucket(AccountId(1)).unwrap();
        assert_eq!(checking.valuation(), dec!(850.00));

        let salary = analysis.event_categories().bucket(EventCategoryId(1)).unwrap();
        assert_eq!(salary.income(), dec!(1200.00));

        let employer = analysis.payees().bucket(PayeeId(1)).unwrap();
        assert_eq!(employer.income(), dec!(1200.00));

        let basis = analysis.tax_basis().bucket(TaxBasisClass::GrossSalary).unwrap();
        assert_eq!(basis.gross(), dec!(1200.00));
        assert_eq!(basis.net(), dec!(1000.00));
        assert_eq!(basis.tax_credit(), dec!(200.00));
    }

    #[test]
    fn test_totals_follow_the_rollups() {
        let manager = manager(salary_and_groceries());
        let analysis = manager.base_analysis();

        assert_eq!(analysis.event_categories().totals().income(), dec!(1200.00));
        assert_eq!(analysis.event_categories().totals().expense(), dec!(150.00));
        assert_eq!(analysis.payees().totals().income(), dec!(1200.00));
        assert_eq!(analysis.payees().totals().expense(), dec!(150.00));
        assert_eq!(analysis.account_categories().totals().valuation(), dec!(850.00));
    }

    #[test]
    fn test_dated_analysis_is_balance_as_of_date() {
        let manager = manager(salary_and_groceries());
        let dated = manager.analysis_for_date(d(2023, 1, 15)).unwrap();

        let checking = dated.accounts().bucket(AccountId(1)).unwrap();
        assert_eq!(checking.valuation(), dec!(1000.00));
        // The February debit is not visible yet
        assert!(checking.values_for_event(EventId(2)).is_none());
    }

    #[test]
    fn test_ranged_analysis_shows_period_delta_only() {
        let manager = manager(salary_and_groceries());
        let ranged = manager
            .analysis_for_range(DateRange::new(d(2023, 1, 15), d(2023, 2, 15)))
            .unwrap();

        let checking = ranged.accounts().bucket(AccountId(1)).unwrap();
        assert_eq!(
            checking.values().decimal(AccountAttr::Delta),
            Some(dec!(-150.00))
        );

        // The January credit is outside the range: the salary category
        // must not appear at all
        assert!(ranged.event_categories().bucket(EventCategoryId(1)).is_none());
        let groceries = ranged.event_categories().bucket(EventCategoryId(2)).unwrap();
        assert_eq!(groceries.expense(), dec!(150.00));
        assert_eq!(
            groceries.values().decimal(EventCategoryAttr::Delta),
            Some(dec!(-150.00))
        );
    }

    #[test]
    fn test_manager_memoizes_derived_analyses() {
        let manager = manager(salary_and_groceries());

        let first = manager.analysis_for_date(d(2023, 1, 15)).unwrap();
        let second = manager.analysis_for_date(d(2023, 1, 15)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let range = DateRange::new(d(2023, 1, 15), d(2023, 2, 15));
        let first = manager.analysis_for_range(range).unwrap();
        let second = manager.analysis_for_range(range).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_opening_balance_survives_idle_subperiods() {
        let mut data = salary_and_groceries();
        data.add_account_category(AccountCategory::new(AccountCategoryId(2), "Savings"));
        data.add_account(
            Account::new(AccountId(2), "Nest Egg", AccountCategoryId(2))
                .with_opening_balance(dec!(5000.00)),
        );

        let manager = manager(data);
        let base = manager.base_analysis();
        let nest_egg = base.accounts().bucket(AccountId(2)).unwrap();
        assert_eq!(nest_egg.valuation(), dec!(5000.00));
        // Capital, not income: the delta over the full period is zero
        assert_eq!(
            nest_egg.values().decimal(AccountAttr::Delta),
            Some(dec!(0.00))
        );

        // Idle in every sub-period, but never dropped
        let dated = manager.analysis_for_date(d(2023, 1, 15)).unwrap();
        assert!(dated.accounts().bucket(AccountId(2)).is_some());
    }

    #[test]
    fn test_idle_zero_account_dropped_from_subrange() {
        let mut data = salary_and_groceries();
        data.add_account(Account::new(AccountId(3), "Dormant", AccountCategoryId(1)));

        let manager = manager(data);
        // Zero opening balance and zero events: not in any view
        let base = manager.base_analysis();
        assert!(base.accounts().bucket(AccountId(3)).is_none());
    }

    #[test]
    fn test_unknown_account_fails_construction() {
        let mut data = salary_and_groceries();
        data.add_event(Event::new(
            EventId(9),
            d(2023, 3, 1),
            dec!(10.00),
            AssetRef::Account(AccountId(99)),
            AssetRef::Payee(PayeeId(2)),
            EventCategoryId(2),
        ));

        let result = Analysis::new(Arc::new(data));
        assert!(result.is_err());
        let message = result.err().unwrap().to_string();
        assert!(message.contains("not found"), "unexpected error: {}", message);
    }

    /// A holding bought in January and priced in June; checks the
    /// security, portfolio and account-category rollup chain.
    fn stock_dataset() -> DataSet {
        let mut data = salary_and_groceries();
        data.add_portfolio(Portfolio::new(PortfolioId(1), "Broker"));
        data.add_security(Security::new(SecurityId(1), "Widget Plc", PortfolioId(1)));
        data.add_category(EventCategory::new(
            EventCategoryId(3),
            "Stock Purchase",
            CategoryClass::StockPurchase,
        ));
        data.add_event(
            Event::new(
                EventId(3),
                d(2023, 2, 10),
                dec!(500.00),
                AssetRef::Account(AccountId(1)),
                AssetRef::Security(SecurityId(1)),
                EventCategoryId(3),
            )
            .with_credit_units(dec!(100)),
        );
        data.prices_mut()
            .add_price(SecurityId(1), d(2023, 1, 1), dec!(5.00));
        data.prices_mut()
            .add_price(SecurityId(1), d(2023, 2, 5), dec!(6.00));
        data
    }

    #[test]
    fn test_security_valuation_and_portfolio_rollup() {
        let manager = manager(stock_dataset());
        let analysis = manager.base_analysis();

        let widget = analysis.securities().bucket(SecurityId(1)).unwrap();
        assert_eq!(widget.units(), dec!(100));
        assert_eq!(widget.valuation(), dec!(600.00));
        assert_eq!(
            widget.values().decimal(SecurityAttr::Cost),
            Some(dec!(500.00))
        );

        let broker = analysis.portfolios().bucket(PortfolioId(1)).unwrap();
        assert_eq!(broker.valuation(), dec!(600.00));
        assert_eq!(analysis.portfolios().totals().valuation(), dec!(600.00));

        // Cash 850 - 500 spent on stock, plus the 600 holding, folded
        // into the account-category totals after the portfolio pass
        assert_eq!(
            analysis.account_categories().totals().valuation(),
            dec!(950.00)
        );
    }

    #[test]
    fn test_dilution_compounds_backwards_only() {
        let mut data = stock_dataset();
        data.add_category(EventCategory::new(
            EventCategoryId(4),
            "Rights Taken",
            CategoryClass::StockRightsTaken,
        ));
        data.add_event(
            Event::new(
                EventId(4),
                d(2023, 3, 1),
                dec!(50.00),
                AssetRef::Account(AccountId(1)),
                AssetRef::Security(SecurityId(1)),
                EventCategoryId(4),
            )
            .with_dilution(Dilution::new(dec!(0.8)).unwrap()),
        );

        let manager = manager(data);
        let analysis = manager.base_analysis();

        let factor = analysis.dilution_factor(SecurityId(1), d(2023, 2, 1)).unwrap();
        assert!(factor >= dec!(0.8));
        assert_eq!(factor, dec!(0.8));
        // No forward dilution applies
        assert_eq!(analysis.dilution_factor(SecurityId(1), d(2023, 4, 1)), None);
    }

    #[test]
    fn test_range_additivity_of_category_flows() {
        let manager = manager(salary_and_groceries());
        let full = manager.base_analysis().range();
        let split = d(2023, 1, 20);

        let expense_over = |range: DateRange| {
            manager
                .analysis_for_range(range)
                .unwrap()
                .event_categories()
                .totals()
                .expense()
        };

        let whole = expense_over(full);
        let first = expense_over(DateRange::new(full.start(), split));
        let second = expense_over(DateRange::new(split, full.end()));
        assert_eq!(first + second, whole);
    }
}
