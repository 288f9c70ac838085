//! The analysis manager.
//!
//! A memoizing cache of dated and ranged analyses derived from one base
//! analysis. Created once per full reload of the dataset and discarded
//! on the next reload. The cache belongs to a single logical session;
//! the mutex only guards the check-then-insert sequence against
//! duplicate derivation.

use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::analysis_model::Analysis;
use crate::errors::Result;
use crate::tax::{TaxCalculator, TaxYearConfig};
use crate::utils::DateRange;

pub struct AnalysisManager {
    base: Arc<Analysis>,
    calculator: TaxCalculator,
    dated_cache: Mutex<HashMap<NaiveDate, Arc<Analysis>>>,
    ranged_cache: Mutex<HashMap<DateRange, Arc<Analysis>>>,
}

impl AnalysisManager {
    /// Takes ownership of a freshly built top-level analysis, runs the
    /// totals-production sequence against it once, and becomes the
    /// source for every derived analysis.
    pub fn new(mut base: Analysis, config: TaxYearConfig) -> Result<Self> {
        let calculator = TaxCalculator::new(config);
        base.produce_totals(&calculator)?;
        Ok(AnalysisManager {
            base: Arc::new(base),
            calculator,
            dated_cache: Mutex::new(HashMap::new()),
            ranged_cache: Mutex::new(HashMap::new()),
        })
    }

    /// The fully-aggregated source analysis.
    pub fn base_analysis(&self) -> Arc<Analysis> {
        self.base.clone()
    }

    /// The balance-as-of-`date` analysis. The effective range runs from
    /// the dataset's start date to `date`, so the date alone is the
    /// cache key. A construction failure propagates and is not cached.
    pub fn analysis_for_date(&self, date: NaiveDate) -> Result<Arc<Analysis>> {
        let mut cache = self.dated_cache.lock().unwrap();
        if let Some(hit) = cache.get(&date) {
            debug!("Dated analysis cache hit for {}", date);
            return Ok(hit.clone());
        }

        let mut analysis = Analysis::dated(&self.base, date);
        analysis.produce_totals(&self.calculator)?;
        let analysis = Arc::new(analysis);
        cache.insert(date, analysis.clone());
        Ok(analysis)
    }

    /// The period analysis over `range`.
    pub fn analysis_for_range(&self, range: DateRange) -> Result<Arc<Analysis>> {
        let mut cache = self.ranged_cache.lock().unwrap();
        if let Some(hit) = cache.get(&range) {
            debug!("Ranged analysis cache hit for {}", range);
            return Ok(hit.clone());
        }

        let mut analysis = Analysis::ranged(&self.base, range);
        analysis.produce_totals(&self.calculator)?;
        let analysis = Arc::new(analysis);
        cache.insert(range, analysis.clone());
        Ok(analysis)
    }
}
