use crate::collab::date_key;
use crate::state::AppState;
use chrono::NaiveDate;
use log::{debug, info};

/// Which task collection is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Inbox,
    Daily(NaiveDate),
    Project { section: usize, page: usize },
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Inbox => "Inbox",
            View::Daily(_) => "Journal",
            View::Project { .. } => "Project",
        }
    }

    /// Inbox and journal rows are plain checkboxes; project pages are tables.
    pub fn is_tabular(&self) -> bool {
        matches!(self, View::Project { .. })
    }

    pub fn journal_date(&self) -> Option<NaiveDate> {
        match self {
            View::Daily(date) => Some(*date),
            _ => None,
        }
    }
}

impl AppState {
    pub fn switch_to_inbox(&mut self) {
        self.view = View::Inbox;
    }

    /// Opens the journal on the picker's date, defaulting the picker to today.
    pub fn switch_to_daily(&mut self) {
        let date = match self.picker.date() {
            Some(date) => date,
            None => {
                let today = self.clock.today();
                self.picker.set_value(&date_key(today));
                today
            }
        };
        self.view = View::Daily(date);
    }

    /// Caller passes indices taken from the current sidebar.
    pub fn switch_page(&mut self, section: usize, page: usize) {
        self.view = View::Project { section, page };
    }

    /// Opens a journal day from history without going through the picker.
    pub fn load_specific_date(&mut self, date: NaiveDate) {
        self.picker.set_value(&date_key(date));
        self.view = View::Daily(date);
    }

    /// The picker was edited; an open journal follows it when it holds a valid date.
    pub fn change_journal_date(&mut self) {
        if let (View::Daily(current), Some(picked)) = (self.view, self.picker.date()) {
            if current != picked {
                debug!("journal date changed to {}", picked);
                self.view = View::Daily(picked);
            }
        }
    }

    /// Drops a project selection that no longer points at a page.
    /// Returns true when the view had to fall back to the inbox.
    pub fn heal_selection(&mut self) -> bool {
        if let View::Project { section, page } = self.view {
            if !self.workspace.contains_page(section, page) {
                info!(
                    "page {}/{} no longer exists; returning to inbox",
                    section, page
                );
                self.view = View::Inbox;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{fresh, today};

    #[test]
    fn initial_view_is_inbox() {
        let (state, _) = fresh();
        assert_eq!(state.view(), &View::Inbox);
    }

    #[test]
    fn daily_uses_picker_value() {
        let (mut state, _) = fresh();
        state.picker_mut().set_value("2026-01-02");
        state.switch_to_daily();
        assert_eq!(
            state.view(),
            &View::Daily(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap())
        );
    }

    #[test]
    fn daily_defaults_empty_picker_to_today() {
        let (mut state, _) = fresh();
        state.picker_mut().set_value("");
        state.switch_to_daily();
        assert_eq!(state.view(), &View::Daily(today()));
        assert_eq!(state.picker().value(), "2026-10-18");
    }

    #[test]
    fn specific_date_updates_picker() {
        let (mut state, _) = fresh();
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        state.load_specific_date(date);
        assert_eq!(state.view(), &View::Daily(date));
        assert_eq!(state.picker().value(), "2025-12-31");
    }

    #[test]
    fn picker_edit_moves_open_journal_only() {
        let (mut state, _) = fresh();
        state.picker_mut().set_value("2026-05-05");
        state.change_journal_date();
        assert_eq!(state.view(), &View::Inbox);

        state.switch_to_daily();
        state.picker_mut().set_value("2026-05-06");
        state.change_journal_date();
        assert_eq!(
            state.view(),
            &View::Daily(NaiveDate::from_ymd_opt(2026, 5, 6).unwrap())
        );

        state.picker_mut().set_value("garbage");
        state.change_journal_date();
        assert_eq!(
            state.view(),
            &View::Daily(NaiveDate::from_ymd_opt(2026, 5, 6).unwrap())
        );
    }

    #[test]
    fn stale_project_selection_heals_to_inbox() {
        let (mut state, _) = fresh();
        state.switch_page(0, 0);
        assert!(!state.heal_selection());
        state.switch_page(0, 4);
        assert!(state.heal_selection());
        assert_eq!(state.view(), &View::Inbox);
    }
}
