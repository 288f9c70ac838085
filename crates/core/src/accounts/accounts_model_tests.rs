//! Tests for account domain models.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountCategoryId, AccountId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_id_ordering() {
        let mut ids = vec![AccountId(7), AccountId(1), AccountId(3)];
        ids.sort();
        assert_eq!(ids, vec![AccountId(1), AccountId(3), AccountId(7)]);
    }

    #[test]
    fn test_opening_balance_builder() {
        let account = Account::new(AccountId(1), "Checking", AccountCategoryId(1))
            .with_opening_balance(dec!(250.00));
        assert_eq!(account.opening_balance, Some(dec!(250.00)));
        assert!(!account.closed);
    }

    #[test]
    fn test_account_serializes_camel_case() {
        let account = Account::new(AccountId(4), "Savings", AccountCategoryId(2));
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"name\":\"Savings\""));
        assert!(!json.contains("openingBalance"));
    }
}
