//! Aggregation engine: derives chart series from the filtered working set.
//! All functions are pure and total; an empty working set yields empty (or
//! all-zero, for the regional split) output.

use std::collections::BTreeMap;

use crate::records::{CategoryKey, Record};

/// Categorical series are truncated to this many entries.
pub const CATEGORY_TOP_N: usize = 12;

/// Per-year global sales totals, ascending by year.
///
/// Records with an unparseable year or unparseable global sales are skipped
/// outright, not coerced to zero, and years with no surviving records are
/// absent rather than zero-filled.
pub fn by_year(records: &[&Record]) -> Vec<(i32, f64)> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        if let (Some(year), Some(sales)) = (record.year, record.global_sales) {
            *totals.entry(year).or_insert(0.0) += sales;
        }
    }
    totals.into_iter().collect()
}

/// Per-category global sales totals, descending by total and capped at
/// [`CATEGORY_TOP_N`]. Records with an empty category value are excluded;
/// ties keep the order in which categories were first encountered.
pub fn by_category(records: &[&Record], key: CategoryKey) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        let category = record.category(key);
        if category.is_empty() {
            continue;
        }
        if !totals.contains_key(category) {
            order.push(category.to_string());
        }
        *totals.entry(category.to_string()).or_insert(0.0) +=
            record.global_sales.unwrap_or_default();
    }

    let mut series: Vec<(String, f64)> = order
        .into_iter()
        .map(|category| {
            let total = totals[&category];
            (category, total)
        })
        .collect();
    // Stable sort keeps first-encountered order among equal totals.
    series.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    series.truncate(CATEGORY_TOP_N);
    series
}

/// Regional sales split. Always exactly four totals, in NA/EU/JP/Other
/// order; missing regional values coerce to zero so the fixed-slot chart
/// stays populated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionTotals {
    pub na: f64,
    pub eu: f64,
    pub jp: f64,
    pub other: f64,
}

impl RegionTotals {
    pub fn as_series(&self) -> [(&'static str, f64); 4] {
        [
            ("NA", self.na),
            ("EU", self.eu),
            ("JP", self.jp),
            ("Other", self.other),
        ]
    }

    pub fn total(&self) -> f64 {
        self.na + self.eu + self.jp + self.other
    }
}

pub fn by_region(records: &[&Record]) -> RegionTotals {
    let mut totals = RegionTotals::default();
    for record in records {
        totals.na += record.na_sales.unwrap_or_default();
        totals.eu += record.eu_sales.unwrap_or_default();
        totals.jp += record.jp_sales.unwrap_or_default();
        totals.other += record.other_sales.unwrap_or_default();
    }
    totals
}

/// Trailing-window mean over a series: element `i` is the mean of the up to
/// `window` values ending at `i`. The window shrinks at the start of the
/// series instead of padding with zeros. The input is never mutated.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let start = i.saturating_sub(window - 1);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
