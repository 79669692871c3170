//! Record model for the video-game sales dataset and helpers over the
//! loaded store (year bounds, category enumeration, display formatting).

use serde::de::Deserializer;
use serde::Deserialize;

/// Placeholder shown in the table and detail views for missing values.
/// Aggregation never sees this; it works on the typed options directly.
pub const UNKNOWN: &str = "N/A";

/// One row of the sales dataset. Identity is positional; the store never
/// mutates a record after load.
///
/// The backend serializes missing numerics as JSON null and sometimes emits
/// years as floats (`2006.0`), so every numeric field decodes tolerantly:
/// anything unparseable becomes `None` rather than failing the fetch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    #[serde(rename = "Name", default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(rename = "Platform", default, deserialize_with = "text_or_empty")]
    pub platform: String,
    #[serde(rename = "Genre", default, deserialize_with = "text_or_empty")]
    pub genre: String,
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(rename = "Global_Sales", default, deserialize_with = "lenient_f64")]
    pub global_sales: Option<f64>,
    #[serde(rename = "NA_Sales", default, deserialize_with = "lenient_f64")]
    pub na_sales: Option<f64>,
    #[serde(rename = "EU_Sales", default, deserialize_with = "lenient_f64")]
    pub eu_sales: Option<f64>,
    #[serde(rename = "JP_Sales", default, deserialize_with = "lenient_f64")]
    pub jp_sales: Option<f64>,
    #[serde(rename = "Other_Sales", default, deserialize_with = "lenient_f64")]
    pub other_sales: Option<f64>,
}

/// Categorical grouping dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKey {
    Platform,
    Genre,
}

impl CategoryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Platform => "Platform",
            CategoryKey::Genre => "Genre",
        }
    }
}

impl Record {
    pub fn category(&self, key: CategoryKey) -> &str {
        match key {
            CategoryKey::Platform => &self.platform,
            CategoryKey::Genre => &self.genre,
        }
    }

    /// Year for display: the placeholder when unparseable.
    pub fn year_display(&self) -> String {
        match self.year {
            Some(y) => y.to_string(),
            None => UNKNOWN.to_string(),
        }
    }

    /// A sales figure for display, in millions with two decimals.
    pub fn sales_display(value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.2}", v),
            None => UNKNOWN.to_string(),
        }
    }
}

/// Min/max parseable year across the store. `None` when no record carries
/// a usable year.
pub fn year_bounds(records: &[Record]) -> Option<(i32, i32)> {
    let mut bounds: Option<(i32, i32)> = None;
    for year in records.iter().filter_map(|r| r.year) {
        bounds = match bounds {
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
            None => Some((year, year)),
        };
    }
    bounds
}

/// Distinct non-empty values of a category, sorted for stable list display.
pub fn distinct_categories(records: &[Record], key: CategoryKey) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .map(|r| r.category(key))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Accepts a JSON number, numeric string, or null/absent.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            LenientNumber::Int(i) => Some(*i as f64),
            LenientNumber::Float(f) if f.is_finite() => Some(*f),
            LenientNumber::Float(_) => None,
            LenientNumber::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.as_f64()))
}

fn lenient_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    // Years arrive as 2006, 2006.0, or "2006"; anything non-integral is junk.
    Ok(raw.and_then(|n| n.as_f64()).and_then(|f| {
        let truncated = f.trunc();
        if truncated == f && (i32::MIN as f64..=i32::MAX as f64).contains(&truncated) {
            Some(truncated as i32)
        } else {
            None
        }
    }))
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn decodes_complete_record() {
        let r = decode(
            r#"{"Name":"Wii Sports","Platform":"Wii","Genre":"Sports","Year":2006,
                "Global_Sales":82.74,"NA_Sales":41.49,"EU_Sales":29.02,
                "JP_Sales":3.77,"Other_Sales":8.46}"#,
        );
        assert_eq!(r.name, "Wii Sports");
        assert_eq!(r.year, Some(2006));
        assert_eq!(r.global_sales, Some(82.74));
        assert_eq!(r.jp_sales, Some(3.77));
    }

    #[test]
    fn decodes_float_and_string_years() {
        assert_eq!(decode(r#"{"Name":"a","Year":2006.0}"#).year, Some(2006));
        assert_eq!(decode(r#"{"Name":"a","Year":"1999"}"#).year, Some(1999));
        assert_eq!(decode(r#"{"Name":"a","Year":2006.5}"#).year, None);
        assert_eq!(decode(r#"{"Name":"a","Year":null}"#).year, None);
        assert_eq!(decode(r#"{"Name":"a"}"#).year, None);
    }

    #[test]
    fn null_numerics_stay_absent() {
        let r = decode(r#"{"Name":"a","Global_Sales":null,"NA_Sales":"bogus"}"#);
        assert_eq!(r.global_sales, None);
        assert_eq!(r.na_sales, None);
        assert_eq!(r.eu_sales, None);
    }

    #[test]
    fn null_text_becomes_empty() {
        let r = decode(r#"{"Name":null,"Platform":null,"Year":2001}"#);
        assert_eq!(r.name, "");
        assert_eq!(r.platform, "");
        assert_eq!(r.genre, "");
    }

    #[test]
    fn year_bounds_skip_unparseable() {
        let records = vec![
            decode(r#"{"Name":"a","Year":2001}"#),
            decode(r#"{"Name":"b","Year":null}"#),
            decode(r#"{"Name":"c","Year":1985}"#),
        ];
        assert_eq!(year_bounds(&records), Some((1985, 2001)));
        assert_eq!(year_bounds(&[]), None);
    }

    #[test]
    fn distinct_categories_sorted_and_nonempty() {
        let records = vec![
            decode(r#"{"Name":"a","Platform":"Wii"}"#),
            decode(r#"{"Name":"b","Platform":"PS2"}"#),
            decode(r#"{"Name":"c","Platform":null}"#),
            decode(r#"{"Name":"d","Platform":"Wii"}"#),
        ];
        assert_eq!(
            distinct_categories(&records, CategoryKey::Platform),
            vec!["PS2".to_string(), "Wii".to_string()]
        );
    }

    #[test]
    fn display_placeholders() {
        let r = decode(r#"{"Name":"a"}"#);
        assert_eq!(r.year_display(), UNKNOWN);
        assert_eq!(Record::sales_display(r.global_sales), UNKNOWN);
        assert_eq!(Record::sales_display(Some(1.5)), "1.50");
    }
}
