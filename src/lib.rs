use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::Sender;
use std::time::Duration;
use tracing::{debug, info, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, List,
    ListItem, Paragraph, Row, StatefulWidget, Table,
};

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod filter_modal;
pub mod records;
pub mod table;
pub mod widgets;

pub use cache::FetchCache;
pub use cli::Args;
pub use config::{AppConfig, ConfigManager};
pub use fetch::{ApiClient, FetchError, Overview, OVERVIEW_RESOURCE, RECORDS_RESOURCE};
pub use filter::FilterState;
pub use records::{CategoryKey, Record};
pub use table::{SortDir, SortKey, TableState};

use aggregate::RegionTotals;
use chart::ChartFrame;
use debounce::Debouncer;
use filter_modal::{FilterFocus, FilterModal};
use widgets::controls::Controls;

/// Application name used for the config directory and log file
pub const APP_NAME: &str = "vgdash";

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Invalidate every cache, then fetch. Split from [`AppEvent::DoFetch`]
    /// so a loading frame gets drawn before the blocking fetch runs.
    Refresh,
    DoFetch,
    Search(String),
    Filter(FilterState),
    Export,
    Exit,
    Crash(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum View {
    #[default]
    Table,
    Charts,
}

pub struct App {
    events: Sender<AppEvent>,
    client: Option<ApiClient>,
    records_cache: FetchCache<Vec<Record>>,
    overview_cache: FetchCache<Overview>,

    /// Full unfiltered dataset, frozen per load cycle.
    pub store: Vec<Record>,
    pub overview: Option<Overview>,
    pub records_error: Option<String>,
    pub overview_error: Option<String>,
    loading: bool,
    store_initialized: bool,

    pub filter: FilterState,
    pub table_state: TableState,
    pub view: View,
    pub category_key: CategoryKey,
    pub show_rolling: bool,
    rolling_window: usize,

    pub input_mode: InputMode,
    pub input: String,
    input_cursor: usize, // Cursor position in input string (chars)
    debouncer: Debouncer,
    pub filter_modal: FilterModal,
    pub status: Option<String>,

    // Derived views, rebuilt whole by `rederive` after every state mutation.
    pub working_count: usize,
    pub table_rows: Vec<[String; 9]>,
    pub total_pages: usize,
    pub year_series: Vec<(i32, f64)>,
    pub category_series: Vec<(String, f64)>,
    pub region_totals: RegionTotals,
    year_chart: ChartFrame,
    category_chart: ChartFrame,
    region_chart: ChartFrame,
}

impl App {
    pub fn new(events: Sender<AppEvent>, client: Option<ApiClient>, config: &AppConfig) -> App {
        App {
            events,
            client,
            records_cache: FetchCache::new(),
            overview_cache: FetchCache::new(),
            store: Vec::new(),
            overview: None,
            records_error: None,
            overview_error: None,
            loading: false,
            store_initialized: false,
            filter: FilterState::new(),
            table_state: TableState::new(config.per_page),
            view: View::default(),
            category_key: CategoryKey::Platform,
            show_rolling: false,
            rolling_window: config.rolling_window,
            input_mode: InputMode::default(),
            input: String::new(),
            input_cursor: 0,
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            filter_modal: FilterModal::new(),
            status: None,
            working_count: 0,
            table_rows: Vec::new(),
            total_pages: 1,
            year_series: Vec::new(),
            category_series: Vec::new(),
            region_totals: RegionTotals::default(),
            year_chart: ChartFrame::default(),
            category_chart: ChartFrame::default(),
            region_chart: ChartFrame::default(),
        }
    }

    pub fn send_event(&mut self, event: AppEvent) {
        if self.events.send(event).is_err() {
            warn!("event channel closed");
        }
    }

    /// Handle one event; a returned event should be queued by the caller.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.on_key(*key),
            AppEvent::Resize(_, _) => None,
            AppEvent::Refresh => {
                self.loading = true;
                self.status = None;
                self.records_cache.invalidate();
                self.overview_cache.invalidate();
                Some(AppEvent::DoFetch)
            }
            AppEvent::DoFetch => {
                self.fetch_sections();
                None
            }
            AppEvent::Search(query) => {
                self.apply_search(query.clone());
                None
            }
            AppEvent::Filter(state) => {
                self.apply_filter(state.clone());
                None
            }
            AppEvent::Export => {
                self.do_export();
                None
            }
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    /// Fixed-interval tick from the event loop; fires a due search debounce.
    /// Returns true when a re-derivation happened.
    pub fn tick(&mut self) -> bool {
        if self.debouncer.fire_due() {
            let query = self.input.clone();
            self.apply_search(query);
            true
        } else {
            false
        }
    }

    /// Install a freshly fetched (or injected) record store and re-derive.
    /// The filter is seeded from the dataset's year range on the first load
    /// and preserved across refreshes.
    pub fn load_store(&mut self, records: Vec<Record>) {
        self.store = records;
        self.records_error = None;
        if !self.store_initialized {
            self.filter = FilterState::for_store(&self.store);
            self.store_initialized = true;
        }
        // New composition: back to the first page.
        self.table_state.reset_page();
        self.rederive();
    }

    fn fetch_sections(&mut self) {
        let Some(client) = self.client.clone() else {
            self.loading = false;
            return;
        };

        match self
            .records_cache
            .get_or_fetch(RECORDS_RESOURCE, || client.fetch_records())
        {
            Ok(records) => {
                let records = records.clone();
                info!(count = records.len(), "record list loaded");
                self.load_store(records);
            }
            Err(err) => {
                warn!(error = %err, "record list fetch failed");
                self.records_error = Some(err.to_string());
            }
        }

        match self
            .overview_cache
            .get_or_fetch(OVERVIEW_RESOURCE, || client.fetch_overview())
        {
            Ok(overview) => {
                self.overview = Some(overview.clone());
                self.overview_error = None;
            }
            Err(err) => {
                warn!(error = %err, "overview fetch failed");
                self.overview_error = Some(err.to_string());
            }
        }

        self.loading = false;
        self.rederive();
    }

    /// One mutation, one re-derivation pass: rebuild every derived view
    /// (table page, chart frames) from the current store and filter state.
    fn rederive(&mut self) {
        let working = filter::apply(&self.store, &self.filter);
        self.working_count = working.len();

        let view = table::view(&working, &self.table_state);
        self.table_state.page = view.page;
        self.total_pages = view.total_pages;
        self.table_rows = view
            .page_items
            .iter()
            .map(|r| {
                [
                    r.name.clone(),
                    r.platform.clone(),
                    r.genre.clone(),
                    r.year_display(),
                    Record::sales_display(r.global_sales),
                    Record::sales_display(r.na_sales),
                    Record::sales_display(r.eu_sales),
                    Record::sales_display(r.jp_sales),
                    Record::sales_display(r.other_sales),
                ]
            })
            .collect();

        self.year_series = aggregate::by_year(&working);
        self.category_series = aggregate::by_category(&working, self.category_key);
        self.region_totals = aggregate::by_region(&working);

        let rolling = self.show_rolling.then_some(self.rolling_window);
        self.year_chart = chart::year_frame(&self.year_series, rolling);
        self.category_chart = chart::category_frame(&self.category_series, self.category_key);
        self.region_chart = chart::region_frame(&self.region_totals);

        debug!(
            working = self.working_count,
            page = self.table_state.page,
            pages = self.total_pages,
            "re-derived views"
        );
    }

    fn apply_filter(&mut self, state: FilterState) {
        self.filter = state;
        self.input = self.filter.search.clone();
        self.input_cursor = self.input.chars().count();
        self.table_state.reset_page();
        self.rederive();
    }

    fn apply_search(&mut self, query: String) {
        if query == self.filter.search {
            return;
        }
        self.filter.search = query;
        self.table_state.reset_page();
        self.rederive();
    }

    fn do_export(&mut self) {
        let working = filter::apply(&self.store, &self.filter);
        let sorted = table::sorted(&working, self.table_state.sort_key, self.table_state.sort_dir);
        let text = export::to_delimited_text(&sorted);
        let filename = export::export_filename(&self.filter);
        match std::fs::write(&filename, &text) {
            Ok(()) => {
                info!(rows = sorted.len(), file = %filename, "exported view");
                self.status = Some(format!("Exported {} rows to {}", sorted.len(), filename));
            }
            Err(err) => {
                warn!(error = %err, file = %filename, "export failed");
                self.status = Some(format!("Export failed: {err}"));
            }
        }
    }

    /// The export text for the current filtered-and-sorted view, ignoring
    /// pagination. Exposed for the one-shot CLI export mode and tests.
    pub fn export_text(&self) -> String {
        let working = filter::apply(&self.store, &self.filter);
        let sorted = table::sorted(&working, self.table_state.sort_key, self.table_state.sort_dir);
        export::to_delimited_text(&sorted)
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if self.filter_modal.active {
            return self.on_filter_modal_key(key);
        }
        match self.input_mode {
            InputMode::Search => self.on_search_key(key),
            InputMode::Normal => self.on_normal_key(key),
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
            }
            KeyCode::Char('f') => {
                let platforms = records::distinct_categories(&self.store, CategoryKey::Platform);
                let genres = records::distinct_categories(&self.store, CategoryKey::Genre);
                let years = records::year_bounds(&self.store);
                self.filter_modal.open(platforms, genres, &self.filter, years);
            }
            KeyCode::Char('s') => {
                self.table_state.sort_key = self.table_state.sort_key.next();
                self.rederive();
            }
            KeyCode::Char('d') => {
                self.table_state.sort_dir = self.table_state.sort_dir.toggle();
                self.rederive();
            }
            KeyCode::Char('c') => {
                self.view = match self.view {
                    View::Table => View::Charts,
                    View::Charts => View::Table,
                };
            }
            KeyCode::Char('g') => {
                self.category_key = match self.category_key {
                    CategoryKey::Platform => CategoryKey::Genre,
                    CategoryKey::Genre => CategoryKey::Platform,
                };
                self.rederive();
            }
            KeyCode::Char('a') => {
                self.show_rolling = !self.show_rolling;
                self.rederive();
            }
            KeyCode::Char('e') => return Some(AppEvent::Export),
            KeyCode::Char('r') => return Some(AppEvent::Refresh),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
                if self.table_state.page > 1 {
                    self.table_state.page -= 1;
                    self.rederive();
                }
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => {
                if self.table_state.page < self.total_pages {
                    self.table_state.page += 1;
                    self.rederive();
                }
            }
            _ => {}
        }
        None
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Enter => {
                // Immediate apply cancels any pending debounce.
                self.debouncer.cancel();
                let query = self.input.clone();
                self.apply_search(query);
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.debouncer.cancel();
                self.input = self.filter.search.clone();
                self.input_cursor = self.input.chars().count();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                if self.input_cursor > 0 {
                    let idx = byte_index(&self.input, self.input_cursor - 1);
                    self.input.remove(idx);
                    self.input_cursor -= 1;
                    self.debouncer.arm();
                }
            }
            KeyCode::Left => {
                self.input_cursor = self.input_cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let idx = byte_index(&self.input, self.input_cursor);
                self.input.insert(idx, c);
                self.input_cursor += 1;
                self.debouncer.arm();
            }
            _ => {}
        }
        None
    }

    fn on_filter_modal_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Esc => self.filter_modal.close(),
            KeyCode::Tab => self.filter_modal.focus = self.filter_modal.focus.next(),
            KeyCode::BackTab => self.filter_modal.focus = self.filter_modal.focus.prev(),
            KeyCode::Up => self.filter_modal.move_selection(-1),
            KeyCode::Down => self.filter_modal.move_selection(1),
            KeyCode::Char(' ') => self.filter_modal.toggle_current(),
            KeyCode::Backspace => self.filter_modal.backspace(),
            KeyCode::Enter => {
                if self.filter_modal.focus == FilterFocus::Clear {
                    self.filter_modal.clear();
                } else {
                    let state = self.filter_modal.confirm(self.filter.search.clone());
                    self.filter_modal.close();
                    return Some(AppEvent::Filter(state));
                }
            }
            KeyCode::Char(c) => self.filter_modal.input_char(c),
            _ => {}
        }
        None
    }

    fn render_overview(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" vgdash ");
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.loading {
            Line::from("Loading...")
        } else if let Some(err) = &self.overview_error {
            Line::from(Span::styled(
                format!("Overview unavailable: {err} (r to retry)"),
                Style::default().fg(Color::Red),
            ))
        } else if let Some(overview) = &self.overview {
            Line::from(vec![
                Span::raw(format!("Rows: {}", overview.rows)),
                Span::raw("   "),
                Span::raw(format!("Columns: {}", overview.columns)),
                Span::raw("   "),
                Span::raw(format!(
                    "Total global sales: {:.2}M",
                    overview.total_global_sales
                )),
            ])
        } else {
            Line::from(Span::styled(
                "No overview loaded",
                Style::default().fg(Color::DarkGray),
            ))
        };
        Paragraph::new(line).render(inner, buf);
    }

    fn render_table_view(&self, area: Rect, buf: &mut Buffer) {
        let sort_key = self.table_state.sort_key;
        let arrow = match self.table_state.sort_dir {
            SortDir::Ascending => "▲",
            SortDir::Descending => "▼",
        };
        let headers = [
            "Name", "Platform", "Genre", "Year", "Global", "NA", "EU", "JP", "Other",
        ];
        let header = Row::new(headers.iter().map(|h| {
            if *h == sort_key.as_str() {
                Span::styled(
                    format!("{h} {arrow}"),
                    Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
                )
            } else {
                Span::styled(*h, Style::default().add_modifier(Modifier::BOLD))
            }
        }));

        let rows = self
            .table_rows
            .iter()
            .map(|cells| Row::new(cells.iter().map(|c| Span::raw(c.as_str()))));

        let widths = [
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ];

        let mut title = format!(
            " Leaderboard — page {}/{} ({} rows) ",
            self.table_state.page, self.total_pages, self.working_count
        );
        if let Some(err) = &self.records_error {
            title = format!(" Data error: {err} (r to retry) ");
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title));
        Widget::render(table, area, buf);
    }

    fn render_charts_view(&self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(area);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(rows[1]);

        render_line_chart(&self.year_chart, rows[0], buf);
        render_bar_chart(&self.category_chart, bottom[0], buf);
        render_bar_chart(&self.region_chart, bottom[1], buf);
    }

    fn render_input_strip(&self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(area);

        let mut spans = vec![Span::styled(
            "Search: ",
            Style::default().fg(if self.input_mode == InputMode::Search {
                Color::Cyan
            } else {
                Color::DarkGray
            }),
        )];
        if self.input_mode == InputMode::Search {
            // Draw a block cursor by inverting the char under it.
            let chars: Vec<char> = self.input.chars().collect();
            let (before, at_after) = chars.split_at(self.input_cursor.min(chars.len()));
            spans.push(Span::raw(before.iter().collect::<String>()));
            let cursor_char = at_after.first().copied().unwrap_or(' ');
            spans.push(Span::styled(
                cursor_char.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
            spans.push(Span::raw(at_after.iter().skip(1).collect::<String>()));
        } else {
            spans.push(Span::raw(self.input.as_str()));
        }
        Paragraph::new(Line::from(spans)).render(layout[0], buf);

        if let Some(status) = &self.status {
            Paragraph::new(status.as_str())
                .style(Style::default().fg(Color::Green))
                .right_aligned()
                .render(layout[1], buf);
        }
    }

    fn render_filter_modal(&mut self, area: Rect, buf: &mut Buffer) {
        let modal_area = centered_rect(70, 80, area);
        Clear.render(modal_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Filters ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),   // Checkbox lists
                Constraint::Length(3), // Year interval
                Constraint::Length(1), // Buttons
            ])
            .split(inner);
        let lists = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(layout[0]);

        let focus = self.filter_modal.focus;
        render_checkbox_list(
            "Platforms",
            &self.filter_modal.platform_options,
            &self.filter_modal.platform_selected,
            focus == FilterFocus::Platforms,
            lists[0],
            buf,
            &mut self.filter_modal.platform_list,
        );
        render_checkbox_list(
            "Genres",
            &self.filter_modal.genre_options,
            &self.filter_modal.genre_selected,
            focus == FilterFocus::Genres,
            lists[1],
            buf,
            &mut self.filter_modal.genre_list,
        );

        let years = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1)])
            .split(layout[1]);
        render_year_input(
            "From",
            &self.filter_modal.year_start_input,
            focus == FilterFocus::YearStart,
            years[0],
            buf,
        );
        render_year_input(
            "To",
            &self.filter_modal.year_end_input,
            focus == FilterFocus::YearEnd,
            years[1],
            buf,
        );

        let confirm_style = if focus == FilterFocus::Confirm {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let clear_style = if focus == FilterFocus::Clear {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Paragraph::new(Line::from(vec![
            Span::styled("[ Apply ]", confirm_style),
            Span::raw("  "),
            Span::styled("[ Clear ]", clear_style),
            Span::raw("   Space toggles, Tab moves focus, Enter applies"),
        ]))
        .render(layout[2], buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Overview strip
                Constraint::Fill(1),   // Main view
                Constraint::Length(1), // Search strip / status
                Constraint::Length(1), // Controls
            ])
            .split(area);

        self.render_overview(layout[0], buf);

        if self.store.is_empty() {
            let message = if self.loading {
                "Loading dataset...".to_string()
            } else if let Some(err) = &self.records_error {
                format!("Could not load dataset: {err}\nPress r to retry")
            } else {
                "No data. Press r to fetch the dataset.".to_string()
            };
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .centered()
                .render(layout[1], buf);
        } else {
            match self.view {
                View::Table => self.render_table_view(layout[1], buf),
                View::Charts => self.render_charts_view(layout[1], buf),
            }
        }

        self.render_input_strip(layout[2], buf);

        Controls::with_row_count(self.working_count)
            .with_dimmed(self.filter_modal.active)
            .with_search_active(self.input_mode == InputMode::Search)
            .render(layout[3], buf);

        if self.filter_modal.active {
            self.render_filter_modal(area, buf);
        }
    }
}

/// Line chart for the year trend frame.
fn render_line_chart(frame: &ChartFrame, area: Rect, buf: &mut Buffer) {
    if frame.is_empty() {
        Paragraph::new("No data for current filters")
            .style(Style::default().fg(Color::DarkGray))
            .centered()
            .render(area, buf);
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = frame
        .datasets
        .iter()
        .map(|ds| {
            ds.values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        })
        .collect();

    let mut y_max = f64::NEG_INFINITY;
    for series in &points {
        for &(_, y) in series {
            y_max = y_max.max(y);
        }
    }
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };
    let x_max = (frame.labels.len().saturating_sub(1)).max(1) as f64;

    let datasets: Vec<Dataset> = frame
        .datasets
        .iter()
        .zip(points.iter())
        .map(|(ds, pts)| {
            Dataset::default()
                .name(ds.label.as_str())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(ds.color))
                .data(pts)
        })
        .collect();

    let mid = frame.labels.len() / 2;
    let x_labels = vec![
        Span::raw(frame.labels.first().cloned().unwrap_or_default()),
        Span::raw(frame.labels.get(mid).cloned().unwrap_or_default()),
        Span::raw(frame.labels.last().cloned().unwrap_or_default()),
    ];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.1}", y_max / 2.0)),
        Span::raw(format!("{:.1}", y_max)),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", frame.title)),
        )
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(Axis::default().bounds([0.0, y_max]).labels(y_labels))
        .legend_position(Some(ratatui::widgets::LegendPosition::TopRight));
    chart.render(area, buf);
}

/// Bar chart for categorical/regional frames; bar colors are the frame's
/// positional palette assignment.
fn render_bar_chart(frame: &ChartFrame, area: Rect, buf: &mut Buffer) {
    if frame.is_empty() || frame.datasets.is_empty() {
        Paragraph::new("No data for current filters")
            .style(Style::default().fg(Color::DarkGray))
            .centered()
            .render(area, buf);
        return;
    }

    let values = &frame.datasets[0].values;
    let bars: Vec<Bar> = frame
        .labels
        .iter()
        .zip(values.iter())
        .zip(frame.label_colors.iter())
        .map(|((label, value), color)| {
            // Scale to hundredths so sub-1.0 totals still get a bar.
            Bar::default()
                .label(Line::from(label.as_str()))
                .value((value * 100.0).round().max(0.0) as u64)
                .text_value(format!("{value:.1}"))
                .style(Style::default().fg(*color))
        })
        .collect();

    BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", frame.title)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1)
        .render(area, buf);
}

#[allow(clippy::too_many_arguments)]
fn render_checkbox_list(
    title: &str,
    options: &[String],
    selected: &std::collections::HashSet<String>,
    focused: bool,
    area: Rect,
    buf: &mut Buffer,
    state: &mut ratatui::widgets::ListState,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let items: Vec<ListItem> = options
        .iter()
        .map(|option| {
            let marker = if selected.contains(option) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{marker} {option}"))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {title} ")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    StatefulWidget::render(list, area, buf, state);
}

fn render_year_input(label: &str, value: &str, focused: bool, area: Rect, buf: &mut Buffer) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {label} "));
    let inner = block.inner(area);
    block.render(area, buf);
    let text = if focused {
        format!("{value}█")
    } else {
        value.to_string()
    };
    Paragraph::new(text).render(inner, buf);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn sample_records() -> Vec<Record> {
        serde_json::from_value(serde_json::json!([
            {"Name": "Alpha", "Platform": "PS2", "Genre": "Action", "Year": 2005, "Global_Sales": 1.0},
            {"Name": "Beta", "Platform": "PS2", "Genre": "Action", "Year": 2005, "Global_Sales": 2.0},
            {"Name": "Gamma", "Platform": "X360", "Genre": "Sports", "Year": 2006, "Global_Sales": 0.5},
        ]))
        .unwrap()
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::channel();
        let config = AppConfig {
            debounce_ms: 0,
            ..AppConfig::default()
        };
        let mut app = App::new(tx, None, &config);
        app.load_store(sample_records());
        app
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn loading_a_store_derives_all_views() {
        let app = test_app();
        assert_eq!(app.working_count, 3);
        assert_eq!(app.year_series, vec![(2005, 3.0), (2006, 0.5)]);
        assert_eq!(
            app.category_series,
            vec![("PS2".to_string(), 3.0), ("X360".to_string(), 0.5)]
        );
        // Default leaderboard order: global sales descending.
        let names: Vec<&str> = app.table_rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha", "Gamma"]);
        assert_eq!(app.filter.year_range(), Some((2005, 2006)));
    }

    #[test]
    fn sort_keys_cycle_and_direction_toggles() {
        let mut app = test_app();
        app.event(&key(KeyCode::Char('d')));
        assert_eq!(app.table_state.sort_dir, SortDir::Ascending);
        let names: Vec<&str> = app.table_rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);

        app.event(&key(KeyCode::Char('s')));
        assert_eq!(app.table_state.sort_key, SortKey::NaSales);
    }

    #[test]
    fn search_keystrokes_apply_after_debounce_tick() {
        let mut app = test_app();
        app.event(&key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);

        for c in "gam".chars() {
            app.event(&key(KeyCode::Char(c)));
        }
        // Not yet applied: the debounce is pending.
        assert_eq!(app.working_count, 3);

        assert!(app.tick());
        assert_eq!(app.working_count, 1);
        assert_eq!(app.table_rows[0][0], "Gamma");
        assert_eq!(app.table_state.page, 1);
        // No further fires without new keystrokes.
        assert!(!app.tick());
    }

    #[test]
    fn escape_restores_the_applied_search() {
        let mut app = test_app();
        app.event(&key(KeyCode::Char('/')));
        for c in "alpha".chars() {
            app.event(&key(KeyCode::Char(c)));
        }
        app.event(&key(KeyCode::Enter));
        assert_eq!(app.working_count, 1);

        app.event(&key(KeyCode::Char('/')));
        for c in "zzz".chars() {
            app.event(&key(KeyCode::Char(c)));
        }
        app.event(&key(KeyCode::Esc));
        assert_eq!(app.input, "alpha");
        // The pending debounce was cancelled; ticking changes nothing.
        assert!(!app.tick());
        assert_eq!(app.working_count, 1);
    }

    #[test]
    fn filter_modal_confirm_is_one_atomic_mutation() {
        let mut app = test_app();
        app.event(&key(KeyCode::Char('f')));
        assert!(app.filter_modal.active);

        // Select X360 (second platform option alphabetically).
        app.event(&key(KeyCode::Down));
        app.event(&key(KeyCode::Char(' ')));
        let follow_up = app.event(&key(KeyCode::Enter)).unwrap();
        assert!(!app.filter_modal.active);

        app.event(&follow_up);
        assert_eq!(app.working_count, 1);
        assert_eq!(app.table_rows[0][0], "Gamma");
        assert_eq!(app.year_series, vec![(2006, 0.5)]);
    }

    #[test]
    fn paging_is_clamped_to_total_pages() {
        let (tx, _rx) = mpsc::channel();
        let config = AppConfig {
            per_page: 2,
            ..AppConfig::default()
        };
        let mut app = App::new(tx, None, &config);
        app.load_store(sample_records());
        assert_eq!(app.total_pages, 2);

        app.event(&key(KeyCode::Right));
        assert_eq!(app.table_state.page, 2);
        app.event(&key(KeyCode::Right));
        assert_eq!(app.table_state.page, 2);
        app.event(&key(KeyCode::Left));
        assert_eq!(app.table_state.page, 1);
    }

    #[test]
    fn sort_persists_across_filter_changes_but_page_resets() {
        let (tx, _rx) = mpsc::channel();
        let config = AppConfig {
            per_page: 1,
            ..AppConfig::default()
        };
        let mut app = App::new(tx, None, &config);
        app.load_store(sample_records());
        app.table_state.sort_dir = SortDir::Ascending;
        app.event(&key(KeyCode::Right)); // page 2

        let mut state = app.filter.clone();
        state.platforms.insert("PS2".to_string());
        app.event(&AppEvent::Filter(state));

        assert_eq!(app.table_state.page, 1);
        assert_eq!(app.table_state.sort_dir, SortDir::Ascending);
        assert_eq!(app.working_count, 2);
    }

    #[test]
    fn export_text_covers_the_whole_filtered_view() {
        let mut app = test_app();
        let mut state = app.filter.clone();
        state.platforms.insert("X360".to_string());
        app.event(&AppEvent::Filter(state));

        let text = app.export_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2); // header + one row
        assert!(lines[1].starts_with("Gamma,X360,Sports,2006,0.5"));
    }

    #[test]
    fn refresh_without_a_client_clears_loading() {
        let mut app = test_app();
        let follow_up = app.event(&AppEvent::Refresh).unwrap();
        assert!(matches!(follow_up, AppEvent::DoFetch));
        app.event(&follow_up);
        assert!(!app.loading);
    }

    #[test]
    fn rolling_toggle_adds_an_overlay_dataset() {
        let mut app = test_app();
        assert_eq!(app.year_chart.datasets.len(), 1);
        app.event(&key(KeyCode::Char('a')));
        assert_eq!(app.year_chart.datasets.len(), 2);
        app.event(&key(KeyCode::Char('a')));
        assert_eq!(app.year_chart.datasets.len(), 1);
    }

    #[test]
    fn category_dimension_switches_between_platform_and_genre() {
        let mut app = test_app();
        app.event(&key(KeyCode::Char('g')));
        assert_eq!(app.category_key, CategoryKey::Genre);
        assert_eq!(
            app.category_series,
            vec![("Action".to_string(), 3.0), ("Sports".to_string(), 0.5)]
        );
    }
}
