//! Tests for security buckets: unit accounting, cost relief, valuation.

#[cfg(test)]
mod tests {
    use crate::accounts::AccountId;
    use crate::analysis::buckets::{SecurityAttr, SecurityBucketList};
    use crate::categories::EventCategoryId;
    use crate::events::{AssetRef, Event, EventId};
    use crate::prices::PriceMap;
    use crate::securities::{PortfolioId, Security, SecurityId};
    use crate::utils::DateRange;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn security() -> Arc<Security> {
        Arc::new(Security::new(SecurityId(1), "Widget Plc", PortfolioId(1)))
    }

    fn event(id: u64, date: NaiveDate, amount: Decimal) -> Event {
        Event::new(
            EventId(id),
            date,
            amount,
            AssetRef::Account(AccountId(1)),
            AssetRef::Security(SecurityId(1)),
            EventCategoryId(1),
        )
    }

    #[test]
    fn test_buy_accumulates_units_and_cost() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        bucket.adjust_for_credit(&event(1, d(2023, 1, 1), dec!(500.00)), dec!(100));
        bucket.adjust_for_credit(&event(2, d(2023, 2, 1), dec!(330.00)), dec!(50));

        assert_eq!(bucket.units(), dec!(150));
        assert_eq!(
            bucket.values().decimal(SecurityAttr::Cost),
            Some(dec!(830.00))
        );
        assert_eq!(
            bucket.values().decimal(SecurityAttr::Invested),
            Some(dec!(830.00))
        );
    }

    #[test]
    fn test_partial_sale_relieves_cost_proportionally() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        bucket.adjust_for_credit(&event(1, d(2023, 1, 1), dec!(900.00)), dec!(90));
        // Sell a third of the holding for 400
        bucket.adjust_for_debit(&event(2, d(2023, 3, 1), dec!(400.00)), dec!(30));

        assert_eq!(bucket.units(), dec!(60));
        assert_eq!(
            bucket.values().decimal(SecurityAttr::Cost),
            Some(dec!(600.00))
        );
        // Gains = proceeds 400 - relieved cost 300
        assert_eq!(
            bucket.values().decimal(SecurityAttr::Gains),
            Some(dec!(100.00))
        );
    }

    #[test]
    fn test_full_sale_relieves_entire_cost() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        bucket.adjust_for_credit(&event(1, d(2023, 1, 1), dec!(900.00)), dec!(90));
        bucket.adjust_for_debit(&event(2, d(2023, 6, 1), dec!(1200.00)), dec!(90));

        assert_eq!(bucket.units(), dec!(0));
        assert_eq!(bucket.values().decimal(SecurityAttr::Cost), Some(dec!(0.00)));
        assert_eq!(
            bucket.values().decimal(SecurityAttr::Gains),
            Some(dec!(300.00))
        );
        assert!(!bucket.is_active());
    }

    #[test]
    fn test_value_asset_prices_both_ends() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        bucket.adjust_for_credit(&event(1, d(2023, 1, 10), dec!(500.00)), dec!(100));

        let mut prices = PriceMap::new();
        prices.add_price(SecurityId(1), d(2023, 1, 1), dec!(5.00));
        prices.add_price(SecurityId(1), d(2023, 6, 1), dec!(7.00));

        let range = DateRange::new(d(2023, 1, 1), d(2023, 12, 31));
        list.value_assets(&prices, &range);

        let bucket = list.bucket(SecurityId(1)).unwrap();
        assert_eq!(
            bucket.values().decimal(SecurityAttr::Price),
            Some(dec!(7.00))
        );
        assert_eq!(bucket.valuation(), dec!(700.00));
        // Base held no units, so the opening valuation is zero
        assert_eq!(
            bucket.base_values().decimal(SecurityAttr::Valuation),
            Some(dec!(0.00))
        );
    }

    #[test]
    fn test_missing_price_leaves_valuation_unset() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        bucket.adjust_for_credit(&event(1, d(2023, 1, 10), dec!(500.00)), dec!(100));

        let prices = PriceMap::new();
        list.value_assets(&prices, &DateRange::new(d(2023, 1, 1), d(2023, 12, 31)));

        let bucket = list.bucket(SecurityId(1)).unwrap();
        assert_eq!(bucket.values().decimal(SecurityAttr::Valuation), None);
    }

    #[test]
    fn test_dividend_grossed_up_by_tax_credit() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        let dividend = event(1, d(2023, 4, 1), dec!(90.00)).with_tax_credit(dec!(10.00));
        bucket.add_dividend(&dividend);

        assert_eq!(
            bucket.values().decimal(SecurityAttr::Dividend),
            Some(dec!(100.00))
        );
    }

    #[test]
    fn test_dated_list_drops_sold_out_holdings() {
        let mut list = SecurityBucketList::new();
        let bucket = list.bucket_mut(&security());
        bucket.adjust_for_credit(&event(1, d(2023, 1, 1), dec!(900.00)), dec!(90));
        bucket.adjust_for_debit(&event(2, d(2023, 6, 1), dec!(1000.00)), dec!(90));

        let prices = PriceMap::new();
        let dated = SecurityBucketList::dated(
            &list,
            &DateRange::new(d(2023, 1, 1), d(2023, 12, 31)),
            &prices,
        );
        assert!(dated.bucket(SecurityId(1)).is_none());

        // But a ranged view over the same period keeps the history
        let ranged = SecurityBucketList::ranged(
            &list,
            &DateRange::new(d(2023, 1, 1), d(2023, 12, 31)),
            &prices,
        );
        assert!(ranged.bucket(SecurityId(1)).is_some());
    }
}
