use crate::collab::date_key;
use crate::model::{Priority, Status, Task};
use crate::nav::View;
use crate::state::AppState;
use chrono::NaiveDate;

/// Everything a front end needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub view: View,
    pub folder: String,
    pub breadcrumb: String,
    pub title: String,
    pub description: String,
    pub columns: Columns,
    pub layout: RowLayout,
    pub tasks: Vec<TaskRow>,
    pub sidebar: Sidebar,
}

/// Which controls the current view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Columns {
    pub table_header: bool,
    pub priority_input: bool,
    pub delete_page: bool,
    pub date_picker: bool,
}

/// Checkbox rows for the inbox and journal, status/priority table for pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    Simple,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub text: String,
    pub status: Status,
    pub status_label: &'static str,
    pub priority: Priority,
    pub priority_class: &'static str,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sidebar {
    pub inbox_active: bool,
    pub daily_active: bool,
    pub inbox_count: usize,
    pub sections: Vec<SidebarSection>,
    /// Non-empty journal days, most recent first.
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarSection {
    pub title: String,
    pub pages: Vec<SidebarPage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarPage {
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub active: bool,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        TaskRow {
            text: task.text.clone(),
            status: task.status,
            status_label: task.status.label(),
            priority: task.priority,
            priority_class: task.priority.style_class(),
            completed: task.is_done(),
        }
    }
}

impl AppState {
    /// Projects the current state for rendering. A stale project selection is
    /// dropped first, and an open journal day is created if it does not exist yet.
    pub fn view_model(&mut self) -> ViewModel {
        self.heal_selection();
        let view = self.view;
        let (folder, breadcrumb, title, description) = match view {
            View::Inbox => (
                "Home".to_string(),
                "Inbox".to_string(),
                "Inbox".to_string(),
                "Dump your ideas. Sort them later.".to_string(),
            ),
            View::Daily(date) => (
                "Journal".to_string(),
                date_key(date),
                long_date(date),
                "Daily log and tasks.".to_string(),
            ),
            View::Project { section, page } => {
                let s = &self.workspace.sections[section];
                let p = &s.pages[page];
                (
                    s.title.clone(),
                    p.title.clone(),
                    p.title.clone(),
                    "Project Database".to_string(),
                )
            }
        };
        let tabular = view.is_tabular();
        let columns = Columns {
            table_header: tabular,
            priority_input: tabular,
            delete_page: tabular,
            date_picker: matches!(view, View::Daily(_)),
        };
        let layout = if tabular {
            RowLayout::Table
        } else {
            RowLayout::Simple
        };
        let tasks = match self.resolve_view(view) {
            Ok(tasks) => tasks.iter().map(TaskRow::from).collect(),
            Err(_) => Vec::new(),
        };
        ViewModel {
            view,
            folder,
            breadcrumb,
            title,
            description,
            columns,
            layout,
            tasks,
            sidebar: self.sidebar(),
        }
    }

    pub fn sidebar(&self) -> Sidebar {
        let sections = self
            .workspace
            .sections
            .iter()
            .enumerate()
            .map(|(s_idx, section)| SidebarSection {
                title: section.title.clone(),
                pages: section
                    .pages
                    .iter()
                    .enumerate()
                    .map(|(p_idx, page)| SidebarPage {
                        title: page.title.clone(),
                        active: self.view
                            == View::Project {
                                section: s_idx,
                                page: p_idx,
                            },
                    })
                    .collect(),
            })
            .collect();
        let open_day = self.view.journal_date();
        let history = self
            .journal
            .iter()
            .rev()
            .filter(|(_, tasks)| !tasks.is_empty())
            .map(|(date, _)| HistoryEntry {
                date: *date,
                active: open_day == Some(*date),
            })
            .collect();
        Sidebar {
            inbox_active: self.view == View::Inbox,
            daily_active: open_day.is_some(),
            inbox_count: self.inbox.len(),
            sections,
            history,
        }
    }
}

/// `Sunday, October 18, 2026`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
