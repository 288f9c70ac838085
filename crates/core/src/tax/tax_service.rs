//! The banded tax-liability calculator.
//!
//! A deterministic sequence over the tax-basis totals of one analysis:
//! allowance, then non-savings income, then savings, then dividends,
//! each consuming the basic band in turn, then top-sliced chargeable
//! gains at the marginal rate.

use log::debug;
use rust_decimal::Decimal;

use crate::analysis::buckets::{TaxBasisBucketList, TaxCategoryBucketList, TaxCategoryClass};
use crate::categories::TaxBasisClass;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::Result;
use crate::tax::{ChargeableGain, TaxYearConfig};
use crate::utils::DateRange;

/// Computes the liability breakdown for one analysed period.
#[derive(Debug, Clone)]
pub struct TaxCalculator {
    config: TaxYearConfig,
}

impl TaxCalculator {
    pub fn new(config: TaxYearConfig) -> Self {
        TaxCalculator { config }
    }

    pub fn config(&self) -> &TaxYearConfig {
        &self.config
    }

    /// Runs the banded sequence against fully-aggregated tax-basis
    /// totals. Chargeable gains outside `range` are ignored.
    pub(crate) fn calculate(
        &self,
        tax_basis: &TaxBasisBucketList,
        charges: &[ChargeableGain],
        range: &DateRange,
    ) -> Result<TaxCategoryBucketList> {
        self.config.validate()?;
        let mut list = TaxCategoryBucketList::new();

        let gross = |basis: TaxBasisClass| {
            tax_basis
                .bucket(basis)
                .map(|b| b.gross())
                .unwrap_or_default()
        };
        let non_savings = gross(TaxBasisClass::GrossSalary) + gross(TaxBasisClass::GrossRental);
        let savings = gross(TaxBasisClass::GrossInterest);
        let dividends = gross(TaxBasisClass::GrossDividend);

        let gains: Vec<&ChargeableGain> = charges
            .iter()
            .filter(|c| range.contains(c.date))
            .collect();
        let gains_total: Decimal = gains.iter().map(|c| c.gain).sum();

        let gross_income = non_savings + savings + dividends + gains_total;
        debug!(
            "Tax computation over {}: gross income {}",
            range, gross_income
        );
        list.bucket_mut(TaxCategoryClass::GrossIncome).record(
            gross_income,
            Decimal::ZERO,
            Decimal::ZERO,
        );

        // Personal allowance, tapered one for two above the threshold
        let mut allowance = self.config.personal_allowance;
        if gross_income > self.config.allowance_taper_threshold {
            let taper = (gross_income - self.config.allowance_taper_threshold)
                / Decimal::from(2);
            allowance = (allowance - taper).max(Decimal::ZERO);
        }
        list.bucket_mut(TaxCategoryClass::PersonalAllowance).record(
            allowance,
            Decimal::ZERO,
            Decimal::ZERO,
        );

        // Non-savings income consumes the allowance, then the basic band
        let mut band_remaining = self.config.basic_band;
        let taxable_non_savings = (non_savings - allowance).max(Decimal::ZERO);
        let mut allowance_remaining = (allowance - non_savings).max(Decimal::ZERO);
        band_remaining -= self.record_band(
            &mut list,
            taxable_non_savings,
            band_remaining,
            TaxCategoryClass::NonSavingsBasic,
            TaxCategoryClass::NonSavingsHigher,
            self.config.basic_rate,
            self.config.higher_rate,
        );

        // Savings income takes any leftover allowance before banding
        let taxable_savings = (savings - allowance_remaining).max(Decimal::ZERO);
        allowance_remaining = (allowance_remaining - savings).max(Decimal::ZERO);
        band_remaining -= self.record_band(
            &mut list,
            taxable_savings,
            band_remaining,
            TaxCategoryClass::SavingsBasic,
            TaxCategoryClass::SavingsHigher,
            self.config.basic_rate,
            self.config.higher_rate,
        );

        // Dividends last, at their own rates
        let taxable_dividends = (dividends - allowance_remaining).max(Decimal::ZERO);
        band_remaining -= self.record_band(
            &mut list,
            taxable_dividends,
            band_remaining,
            TaxCategoryClass::DividendBasic,
            TaxCategoryClass::DividendHigher,
            self.config.dividend_basic_rate,
            self.config.dividend_higher_rate,
        );

        // Chargeable gains: tax one slice at the marginal rate, then
        // multiply back up by the qualifying years
        for charge in gains {
            let basic_part = charge.slice.min(band_remaining.max(Decimal::ZERO));
            let higher_part = charge.slice - basic_part;
            let slice_tax =
                basic_part * self.config.basic_rate + higher_part * self.config.higher_rate;
            let taxation =
                (slice_tax * Decimal::from(charge.years)).round_dp(DISPLAY_DECIMAL_PRECISION);
            let rate = if higher_part.is_zero() {
                self.config.basic_rate
            } else {
                self.config.higher_rate
            };
            list.bucket_mut(TaxCategoryClass::SlicedGains)
                .record(charge.gain, rate, taxation);
            band_remaining -= charge.slice;
        }

        list.produce_totals();
        Ok(list)
    }

    /// Splits `taxable` across the remaining basic band and the higher
    /// band, recording a bucket per non-empty part. Returns the amount
    /// of basic band consumed.
    #[allow(clippy::too_many_arguments)]
    fn record_band(
        &self,
        list: &mut TaxCategoryBucketList,
        taxable: Decimal,
        band_remaining: Decimal,
        basic_class: TaxCategoryClass,
        higher_class: TaxCategoryClass,
        basic_rate: Decimal,
        higher_rate: Decimal,
    ) -> Decimal {
        let basic_part = taxable.min(band_remaining.max(Decimal::ZERO));
        let higher_part = taxable - basic_part;

        if !basic_part.is_zero() {
            list.bucket_mut(basic_class).record(
                basic_part,
                basic_rate,
                (basic_part * basic_rate).round_dp(DISPLAY_DECIMAL_PRECISION),
            );
        }
        if !higher_part.is_zero() {
            list.bucket_mut(higher_class).record(
                higher_part,
                higher_rate,
                (higher_part * higher_rate).round_dp(DISPLAY_DECIMAL_PRECISION),
            );
        }
        basic_part
    }
}
