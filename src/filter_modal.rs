//! Filter modal: checkbox lists for platform/genre selection plus the year
//! interval inputs. Edits accumulate in the modal and are applied to the
//! app's filter state atomically on confirm.

use std::collections::HashSet;

use ratatui::widgets::ListState;

use crate::filter::FilterState;
use crate::records::CategoryKey;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FilterFocus {
    #[default]
    Platforms,
    Genres,
    YearStart,
    YearEnd,
    Confirm,
    Clear,
}

impl FilterFocus {
    pub fn next(&self) -> Self {
        match self {
            FilterFocus::Platforms => FilterFocus::Genres,
            FilterFocus::Genres => FilterFocus::YearStart,
            FilterFocus::YearStart => FilterFocus::YearEnd,
            FilterFocus::YearEnd => FilterFocus::Confirm,
            FilterFocus::Confirm => FilterFocus::Clear,
            FilterFocus::Clear => FilterFocus::Platforms,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FilterFocus::Platforms => FilterFocus::Clear,
            FilterFocus::Genres => FilterFocus::Platforms,
            FilterFocus::YearStart => FilterFocus::Genres,
            FilterFocus::YearEnd => FilterFocus::YearStart,
            FilterFocus::Confirm => FilterFocus::YearEnd,
            FilterFocus::Clear => FilterFocus::Confirm,
        }
    }
}

#[derive(Default)]
pub struct FilterModal {
    pub active: bool,
    pub focus: FilterFocus,

    pub platform_options: Vec<String>,
    pub genre_options: Vec<String>,
    pub platform_selected: HashSet<String>,
    pub genre_selected: HashSet<String>,
    pub platform_list: ListState,
    pub genre_list: ListState,

    pub year_start_input: String,
    pub year_end_input: String,
    dataset_years: Option<(i32, i32)>,
}

impl FilterModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the modal seeded with the store's option lists and a working
    /// copy of the currently applied filter.
    pub fn open(
        &mut self,
        platform_options: Vec<String>,
        genre_options: Vec<String>,
        current: &FilterState,
        dataset_years: Option<(i32, i32)>,
    ) {
        self.platform_options = platform_options;
        self.genre_options = genre_options;
        self.platform_selected = current.platforms.clone();
        self.genre_selected = current.genres.clone();
        self.dataset_years = dataset_years;

        let (start, end) = current.year_range().or(dataset_years).unzip();
        self.year_start_input = start.map(|y| y.to_string()).unwrap_or_default();
        self.year_end_input = end.map(|y| y.to_string()).unwrap_or_default();

        self.focus = FilterFocus::Platforms;
        self.platform_list.select(Some(0));
        self.genre_list.select(Some(0));
        self.active = true;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    fn focused_list(&mut self) -> Option<(&Vec<String>, &mut ListState)> {
        match self.focus {
            FilterFocus::Platforms => Some((&self.platform_options, &mut self.platform_list)),
            FilterFocus::Genres => Some((&self.genre_options, &mut self.genre_list)),
            _ => None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if let Some((options, list)) = self.focused_list() {
            if options.is_empty() {
                list.select(None);
                return;
            }
            let current = list.selected().unwrap_or(0) as isize;
            let next = (current + delta).clamp(0, options.len() as isize - 1);
            list.select(Some(next as usize));
        }
    }

    /// Toggle the highlighted entry of the focused checkbox list.
    pub fn toggle_current(&mut self) {
        let (value, key) = match self.focus {
            FilterFocus::Platforms => (
                self.platform_list
                    .selected()
                    .and_then(|i| self.platform_options.get(i).cloned()),
                CategoryKey::Platform,
            ),
            FilterFocus::Genres => (
                self.genre_list
                    .selected()
                    .and_then(|i| self.genre_options.get(i).cloned()),
                CategoryKey::Genre,
            ),
            _ => return,
        };
        let Some(value) = value else { return };
        let selected = match key {
            CategoryKey::Platform => &mut self.platform_selected,
            CategoryKey::Genre => &mut self.genre_selected,
        };
        if !selected.remove(&value) {
            selected.insert(value);
        }
    }

    pub fn input_char(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        match self.focus {
            FilterFocus::YearStart => self.year_start_input.push(c),
            FilterFocus::YearEnd => self.year_end_input.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FilterFocus::YearStart => {
                self.year_start_input.pop();
            }
            FilterFocus::YearEnd => {
                self.year_end_input.pop();
            }
            _ => {}
        }
    }

    /// Reset the working copy to no restriction over the full dataset range.
    pub fn clear(&mut self) {
        self.platform_selected.clear();
        self.genre_selected.clear();
        let (start, end) = self.dataset_years.unzip();
        self.year_start_input = start.map(|y| y.to_string()).unwrap_or_default();
        self.year_end_input = end.map(|y| y.to_string()).unwrap_or_default();
    }

    /// Build the filter state this modal would apply. The caller owns the
    /// search string; it is carried over untouched so one confirm remains
    /// one atomic mutation.
    pub fn confirm(&self, search: String) -> FilterState {
        let mut state = FilterState::new();
        state.platforms = self.platform_selected.clone();
        state.genres = self.genre_selected.clone();
        state.search = search;

        let start = parse_year(&self.year_start_input).or(self.dataset_years.map(|(lo, _)| lo));
        let end = parse_year(&self.year_end_input).or(self.dataset_years.map(|(_, hi)| hi));
        match (start, end) {
            (Some(start), Some(end)) => state.set_year_range(start, end),
            _ => state.clear_year_range(),
        }
        state
    }
}

fn parse_year(input: &str) -> Option<i32> {
    input.trim().parse::<i32>().ok()
}
