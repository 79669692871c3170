//! Chart presentation adapter: turns aggregate series into the
//! label/series/color frames the render layer draws. Frames are rebuilt
//! whole on every re-derivation; the render layer never patches them.

use ratatui::style::Color;

use crate::aggregate::{rolling_average, RegionTotals};
use crate::records::CategoryKey;

/// Fixed palette, assigned positionally and cyclically: the Nth label (or
/// dataset) always gets `PALETTE[N % PALETTE.len()]`.
pub const PALETTE: [Color; 7] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
    Color::LightCyan,
];

pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// One plotted series within a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub label: String,
    pub values: Vec<f64>,
    pub color: Color,
}

/// Everything the render layer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartFrame {
    pub title: String,
    pub labels: Vec<String>,
    /// Positional per-label colors, used by the bar charts.
    pub label_colors: Vec<Color>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartFrame {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn frame(title: String, labels: Vec<String>, datasets: Vec<ChartDataset>) -> ChartFrame {
    let label_colors = (0..labels.len()).map(palette_color).collect();
    ChartFrame {
        title,
        labels,
        label_colors,
        datasets,
    }
}

/// Sales-by-year trend, optionally overlaid with a trailing rolling mean.
pub fn year_frame(series: &[(i32, f64)], rolling_window: Option<usize>) -> ChartFrame {
    let labels: Vec<String> = series.iter().map(|(year, _)| year.to_string()).collect();
    let values: Vec<f64> = series.iter().map(|(_, total)| *total).collect();

    let mut datasets = vec![ChartDataset {
        label: "Global sales".to_string(),
        color: palette_color(0),
        values: values.clone(),
    }];
    if let Some(window) = rolling_window {
        datasets.push(ChartDataset {
            label: format!("Rolling mean ({window})"),
            color: palette_color(1),
            values: rolling_average(&values, window),
        });
    }

    frame("Global sales by year".to_string(), labels, datasets)
}

/// Top categories (platforms or genres) by summed global sales.
pub fn category_frame(series: &[(String, f64)], key: CategoryKey) -> ChartFrame {
    let labels: Vec<String> = series.iter().map(|(label, _)| label.clone()).collect();
    let values: Vec<f64> = series.iter().map(|(_, total)| *total).collect();
    frame(
        format!("Top {}s by global sales", key.as_str().to_lowercase()),
        labels,
        vec![ChartDataset {
            label: "Global sales".to_string(),
            color: palette_color(0),
            values,
        }],
    )
}

/// Regional split: always the four fixed NA/EU/JP/Other slots.
pub fn region_frame(totals: &RegionTotals) -> ChartFrame {
    let series = totals.as_series();
    let labels: Vec<String> = series.iter().map(|(label, _)| label.to_string()).collect();
    let values: Vec<f64> = series.iter().map(|(_, total)| *total).collect();
    frame(
        "Sales by region".to_string(),
        labels,
        vec![ChartDataset {
            label: "Sales".to_string(),
            color: palette_color(0),
            values,
        }],
    )
}
