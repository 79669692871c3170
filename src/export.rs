//! Export engine: serializes the current filtered-and-sorted view (never
//! the raw store, never paginated) to delimited text.

use crate::filter::FilterState;
use crate::records::Record;

/// Fixed column order of the exported file.
pub const COLUMNS: [&str; 9] = [
    "Name",
    "Platform",
    "Genre",
    "Year",
    "Global_Sales",
    "NA_Sales",
    "EU_Sales",
    "JP_Sales",
    "Other_Sales",
];

const DELIMITER: char = ',';

/// Serialize the given rows. Absent values become empty fields; any field
/// containing a comma, double quote, or newline is quoted with internal
/// quotes doubled. Empty input produces a header-only file.
pub fn to_delimited_text(records: &[&Record]) -> String {
    let mut out = String::new();
    write_row(&mut out, COLUMNS.iter().map(|c| c.to_string()));
    for record in records {
        write_row(
            &mut out,
            [
                record.name.clone(),
                record.platform.clone(),
                record.genre.clone(),
                opt_to_field(record.year.map(|y| y.to_string())),
                opt_to_field(record.global_sales.map(|v| v.to_string())),
                opt_to_field(record.na_sales.map(|v| v.to_string())),
                opt_to_field(record.eu_sales.map(|v| v.to_string())),
                opt_to_field(record.jp_sales.map(|v| v.to_string())),
                opt_to_field(record.other_sales.map(|v| v.to_string())),
            ]
            .into_iter(),
        );
    }
    out
}

/// Build the download filename from the active filter selection; empty
/// selections fall back to a literal `all` token.
pub fn export_filename(filter: &FilterState) -> String {
    let platforms = join_selection(filter.platforms.iter());
    let genres = join_selection(filter.genres.iter());
    let years = match filter.year_range() {
        Some((start, end)) => format!("{start}-{end}"),
        None => "all".to_string(),
    };
    format!("vgsales_{platforms}_{genres}_{years}.csv")
}

fn join_selection<'a>(values: impl Iterator<Item = &'a String>) -> String {
    let mut list: Vec<&str> = values.map(String::as_str).collect();
    if list.is_empty() {
        return "all".to_string();
    }
    // Selection sets are unordered; sort for a deterministic name.
    list.sort_unstable();
    list.join("-")
}

fn opt_to_field(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn write_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(DELIMITER);
        }
        first = false;
        out.push_str(&escape_field(&field));
    }
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
