use std::sync::mpsc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use vgdash::{
    aggregate, export, filter, table, App, AppConfig, AppEvent, CategoryKey, FilterState, Record,
    SortDir, SortKey, TableState,
};

fn dataset() -> Vec<Record> {
    serde_json::from_str(
        r#"[
        {"Name": "Gran Turismo 4", "Platform": "PS2", "Genre": "Racing",
         "Year": 2004, "Global_Sales": 11.66, "NA_Sales": 3.01, "EU_Sales": 0.01,
         "JP_Sales": 1.1, "Other_Sales": 7.53},
        {"Name": "God of War", "Platform": "PS2", "Genre": "Action",
         "Year": 2005, "Global_Sales": 4.62, "NA_Sales": 2.91, "EU_Sales": 1.06,
         "JP_Sales": 0.01, "Other_Sales": 0.64},
        {"Name": "Shadow of the Colossus", "Platform": "PS2", "Genre": "Action",
         "Year": 2005, "Global_Sales": 1.14, "NA_Sales": 0.55, "EU_Sales": 0.36,
         "JP_Sales": 0.14, "Other_Sales": 0.09},
        {"Name": "Gears of War", "Platform": "X360", "Genre": "Shooter",
         "Year": 2006, "Global_Sales": 5.11, "NA_Sales": 3.66, "EU_Sales": 1.01,
         "JP_Sales": 0.05, "Other_Sales": 0.39},
        {"Name": "Unreleased Demo", "Platform": "PS2", "Genre": "Action",
         "Year": "N/A", "Global_Sales": 0.02, "NA_Sales": 0.02}
    ]"#,
    )
    .unwrap()
}

fn app_with(records: Vec<Record>, config: AppConfig) -> App {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx, None, &config);
    app.load_store(records);
    app
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

#[test]
fn fresh_store_derives_leaderboard_and_charts_together() {
    let app = app_with(dataset(), AppConfig::default());

    assert_eq!(app.working_count, 5);
    // Unparseable years never appear in the trend but stay in the table.
    assert_eq!(
        app.year_series,
        vec![(2004, 11.66), (2005, 5.76), (2006, 5.11)]
    );
    assert_eq!(app.table_rows.len(), 5);
    assert_eq!(app.table_rows[0][0], "Gran Turismo 4");
    assert_eq!(app.table_rows[4][0], "Unreleased Demo");
    assert_eq!(app.table_rows[4][3], "N/A");

    let regions = app.region_totals;
    assert!((regions.na - 10.15).abs() < 1e-9);
    assert!((regions.eu - 2.44).abs() < 1e-9);
}

#[test]
fn year_bound_never_drops_unparseable_years() {
    let mut app = app_with(dataset(), AppConfig::default());

    let mut state = app.filter.clone();
    state.set_year_range(2005, 2006);
    app.event(&AppEvent::Filter(state));

    // Three records match the year interval; the year-less record is kept.
    assert_eq!(app.working_count, 4);
    let names: Vec<&str> = app.table_rows.iter().map(|r| r[0].as_str()).collect();
    assert!(names.contains(&"Unreleased Demo"));
    assert!(!names.contains(&"Gran Turismo 4"));
}

#[test]
fn platform_filter_narrows_every_derived_view() {
    let mut app = app_with(dataset(), AppConfig::default());

    let mut state = app.filter.clone();
    state.platforms.insert("X360".to_string());
    app.event(&AppEvent::Filter(state));

    assert_eq!(app.working_count, 1);
    assert_eq!(app.year_series, vec![(2006, 5.11)]);
    assert_eq!(app.category_series, vec![("X360".to_string(), 5.11)]);

    let text = app.export_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Name,Platform,Genre,Year,Global_Sales,NA_Sales,EU_Sales,JP_Sales,Other_Sales"
    );
    assert!(lines[1].starts_with("Gears of War,X360,Shooter,2006,5.11"));
}

#[test]
fn search_composes_with_category_filters() {
    let mut app = app_with(dataset(), AppConfig::default());

    let mut state = app.filter.clone();
    state.genres.insert("Action".to_string());
    state.search = "war".to_string();
    app.event(&AppEvent::Filter(state));

    // "Gears of War" matches the search but not the genre selection.
    assert_eq!(app.working_count, 1);
    assert_eq!(app.table_rows[0][0], "God of War");
}

#[test]
fn export_filename_tracks_the_active_filter() {
    let mut state = FilterState::new();
    assert_eq!(export::export_filename(&state), "vgsales_all_all_all.csv");

    state.platforms.insert("X360".to_string());
    state.platforms.insert("PS2".to_string());
    state.set_year_range(2004, 2006);
    assert_eq!(
        export::export_filename(&state),
        "vgsales_PS2-X360_all_2004-2006.csv"
    );
}

#[test]
fn pagination_windows_concatenate_to_the_sorted_set() {
    let records = dataset();
    let refs: Vec<&Record> = records.iter().collect();
    let mut state = TableState::new(2);
    state.sort_key = SortKey::Year;
    state.sort_dir = SortDir::Ascending;

    let mut seen = Vec::new();
    let mut page = 1;
    loop {
        state.page = page;
        let view = table::view(&refs, &state);
        seen.extend(view.page_items.iter().map(|r| r.name.clone()));
        if page >= view.total_pages {
            break;
        }
        page += 1;
    }

    let sorted: Vec<String> = table::sorted(&refs, state.sort_key, state.sort_dir)
        .iter()
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(seen, sorted);
    // Ascending or not, year-less rows sort to the end.
    assert_eq!(seen.last().map(String::as_str), Some("Unreleased Demo"));
}

#[test]
fn rolling_overlay_shrinks_at_the_left_edge() {
    let records = dataset();
    let state = FilterState::new();
    let working = filter::apply(&records, &state);
    let series = aggregate::by_year(&working);
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

    let smoothed = aggregate::rolling_average(&values, 3);
    assert_eq!(smoothed.len(), values.len());
    assert!((smoothed[0] - 11.66).abs() < 1e-9);
    assert!((smoothed[1] - (11.66 + 5.76) / 2.0).abs() < 1e-9);
    assert!((smoothed[2] - (11.66 + 5.76 + 5.11) / 3.0).abs() < 1e-9);
}

#[test]
fn category_dimension_switch_regroups_totals() {
    let mut app = app_with(dataset(), AppConfig::default());
    assert_eq!(app.category_key, CategoryKey::Platform);

    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.category_key, CategoryKey::Genre);
    let labels: Vec<&str> = app
        .category_series
        .iter()
        .map(|(label, _)| label.as_str())
        .collect();
    // Descending by total: Racing 11.66, Action 5.78, Shooter 5.11.
    assert_eq!(labels, vec!["Racing", "Action", "Shooter"]);
}

#[test]
fn quit_key_requests_exit() {
    let mut app = app_with(dataset(), AppConfig::default());
    assert!(matches!(press(&mut app, KeyCode::Char('q')), Some(AppEvent::Exit)));
}
