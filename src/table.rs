//! Table view engine: stable sort plus pagination over the working set.

use std::cmp::Ordering;

use crate::records::Record;

/// Sortable leaderboard columns (the numeric/year fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Year,
    #[default]
    GlobalSales,
    NaSales,
    EuSales,
    JpSales,
    OtherSales,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Year => "Year",
            SortKey::GlobalSales => "Global",
            SortKey::NaSales => "NA",
            SortKey::EuSales => "EU",
            SortKey::JpSales => "JP",
            SortKey::OtherSales => "Other",
        }
    }

    /// The next key in the cycling order used by the sort control.
    pub fn next(&self) -> Self {
        match self {
            SortKey::Year => SortKey::GlobalSales,
            SortKey::GlobalSales => SortKey::NaSales,
            SortKey::NaSales => SortKey::EuSales,
            SortKey::EuSales => SortKey::JpSales,
            SortKey::JpSales => SortKey::OtherSales,
            SortKey::OtherSales => SortKey::Year,
        }
    }

    fn sales(&self, record: &Record) -> Option<f64> {
        match self {
            SortKey::Year => None,
            SortKey::GlobalSales => record.global_sales,
            SortKey::NaSales => record.na_sales,
            SortKey::EuSales => record.eu_sales,
            SortKey::JpSales => record.jp_sales,
            SortKey::OtherSales => record.other_sales,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Ascending,
    #[default]
    Descending,
}

impl SortDir {
    pub fn toggle(&self) -> Self {
        match self {
            SortDir::Ascending => SortDir::Descending,
            SortDir::Descending => SortDir::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Ascending => "asc",
            SortDir::Descending => "desc",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDir::Ascending => ordering,
            SortDir::Descending => ordering.reverse(),
        }
    }
}

/// Page is 1-based and clamped into `[1, total_pages]` after every change
/// to the working set; sort settings persist across filter changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub page: usize,
    pub per_page: usize,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
}

impl TableState {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            sort_key: SortKey::default(),
            sort_dir: SortDir::default(),
        }
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }
}

/// One derived table page.
#[derive(Debug)]
pub struct TableView<'a> {
    pub page_items: Vec<&'a Record>,
    pub total_pages: usize,
    /// The page actually shown after clamping into `[1, total_pages]`.
    pub page: usize,
    pub total_rows: usize,
}

/// Stable sort of the working set by the given key and direction.
///
/// Years compare as integers and unparseable years sort after parseable
/// ones regardless of direction; for the sales keys, any comparison that
/// involves a missing value is `Equal`, so the stable sort leaves those
/// records in their incoming order.
pub fn sorted<'a>(records: &[&'a Record], key: SortKey, dir: SortDir) -> Vec<&'a Record> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| match key {
        SortKey::Year => match (a.year, b.year) {
            (Some(x), Some(y)) => dir.apply(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        _ => match (key.sales(a), key.sales(b)) {
            (Some(x), Some(y)) => dir.apply(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
            _ => Ordering::Equal,
        },
    });
    out
}

/// Sort and paginate the working set.
pub fn view<'a>(records: &[&'a Record], state: &TableState) -> TableView<'a> {
    let sorted_rows = sorted(records, state.sort_key, state.sort_dir);
    let total_rows = sorted_rows.len();
    let total_pages = total_rows.div_ceil(state.per_page).max(1);
    let page = state.page.clamp(1, total_pages);

    let start = (page - 1) * state.per_page;
    let end = (start + state.per_page).min(total_rows);
    let page_items = if start < total_rows {
        sorted_rows[start..end].to_vec()
    } else {
        Vec::new()
    };

    TableView {
        page_items,
        total_pages,
        page,
        total_rows,
    }
}
