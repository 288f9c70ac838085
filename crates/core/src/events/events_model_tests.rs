//! Tests for event domain models.

#[cfg(test)]
mod tests {
    use crate::accounts::AccountId;
    use crate::categories::EventCategoryId;
    use crate::events::{AssetRef, Event, EventId};
    use crate::payees::PayeeId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_gross_income_folds_side_amounts() {
        let event = Event::new(
            EventId(1),
            d(2023, 1, 1),
            dec!(1000.00),
            AssetRef::Payee(PayeeId(1)),
            AssetRef::Account(AccountId(1)),
            EventCategoryId(1),
        )
        .with_tax_credit(dec!(200.00))
        .with_nat_insurance(dec!(50.00));

        assert_eq!(event.gross_income(), dec!(1250.00));
    }

    #[test]
    fn test_gross_income_without_side_amounts() {
        let event = Event::new(
            EventId(2),
            d(2023, 1, 2),
            dec!(75.25),
            AssetRef::Account(AccountId(1)),
            AssetRef::Payee(PayeeId(2)),
            EventCategoryId(2),
        );
        assert_eq!(event.gross_income(), dec!(75.25));
        assert!(event.tax_credit.is_none());
    }

    #[test]
    fn test_asset_ref_accessors() {
        let debit = AssetRef::Payee(PayeeId(3));
        assert_eq!(debit.as_payee(), Some(PayeeId(3)));
        assert_eq!(debit.as_account(), None);
        assert_eq!(debit.as_security(), None);
    }
}
