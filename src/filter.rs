//! Filter state and the pure filter engine that produces the working set
//! every downstream view derives from.

use std::collections::HashSet;

use crate::records::{CategoryKey, Record};

/// The user-driven predicate set. Empty platform/genre sets and an empty
/// search string mean "no restriction"; the year interval is inclusive and
/// always kept ordered (start <= end) by swapping on input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub platforms: HashSet<String>,
    pub genres: HashSet<String>,
    year_range: Option<(i32, i32)>,
    pub search: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unrestricted state bounded by the store's observed year range.
    pub fn for_store(records: &[Record]) -> Self {
        Self {
            year_range: crate::records::year_bounds(records),
            ..Self::default()
        }
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        self.year_range
    }

    /// Set the inclusive year interval, swapping the bounds when given in
    /// the wrong order.
    pub fn set_year_range(&mut self, start: i32, end: i32) {
        self.year_range = if start <= end {
            Some((start, end))
        } else {
            Some((end, start))
        };
    }

    pub fn clear_year_range(&mut self) {
        self.year_range = None;
    }

    pub fn selected(&self, key: CategoryKey) -> &HashSet<String> {
        match key {
            CategoryKey::Platform => &self.platforms,
            CategoryKey::Genre => &self.genres,
        }
    }

    pub fn selected_mut(&mut self, key: CategoryKey) -> &mut HashSet<String> {
        match key {
            CategoryKey::Platform => &mut self.platforms,
            CategoryKey::Genre => &mut self.genres,
        }
    }
}

/// Apply the filter to the store, yielding the working set in store order.
///
/// Pure conjunction of: year-in-range (a record with an unparseable year is
/// never excluded by the year bound), platform membership, genre membership,
/// and case-insensitive substring search on the name. Predicates
/// short-circuit but their order does not affect the result.
pub fn apply<'a>(records: &'a [Record], state: &FilterState) -> Vec<&'a Record> {
    let needle = state.search.trim().to_lowercase();
    records
        .iter()
        .filter(|record| {
            if let (Some((start, end)), Some(year)) = (state.year_range, record.year) {
                if year < start || year > end {
                    return false;
                }
            }
            if !state.platforms.is_empty() && !state.platforms.contains(&record.platform) {
                return false;
            }
            if !state.genres.is_empty() && !state.genres.contains(&record.genre) {
                return false;
            }
            if !needle.is_empty() && !record.name.to_lowercase().contains(&needle) {
                return false;
            }
            true
        })
        .collect()
}
