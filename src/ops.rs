use crate::collab::{date_key, NoticeKind, Notifier, Prompter};
use crate::model::{take_task, task_mut, ModelError, Page, Priority, Section, Status, Task};
use crate::nav::View;
use crate::state::AppState;
use chrono::NaiveDate;
use log::info;

/// A structural change that waits on the user before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateSection,
    AddPage { section: usize },
    DeletePage { section: usize, page: usize },
    DeleteCurrentPage,
    DeleteJournalDay(NaiveDate),
}

/// What the presentation layer has to ask before resuming an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ask {
    Confirm(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Confirmed(bool),
    /// `None` when the prompt was cancelled.
    Text(Option<String>),
}

impl Intent {
    pub fn ask(&self, state: &AppState) -> Ask {
        match self {
            Intent::CreateSection => Ask::Text("New Section".into()),
            Intent::AddPage { section } => match state.workspace.section(*section) {
                Ok(s) => Ask::Text(format!("New Page in {}", s.title)),
                Err(_) => Ask::Text("New Page".into()),
            },
            Intent::DeletePage { section, page } => {
                Ask::Confirm(delete_page_message(state, *section, *page))
            }
            Intent::DeleteCurrentPage => match state.view {
                View::Project { section, page } => {
                    Ask::Confirm(delete_page_message(state, section, page))
                }
                _ => Ask::Confirm("Delete page?".into()),
            },
            Intent::DeleteJournalDay(date) => Ask::Confirm(format!(
                "Delete entry? Journal for {} will be deleted.",
                date_key(*date)
            )),
        }
    }
}

fn delete_page_message(state: &AppState, section: usize, page: usize) -> String {
    match state.workspace.page(section, page) {
        Ok(p) => format!("Delete page \"{}\"?", p.title),
        Err(_) => "Delete page?".into(),
    }
}

impl AppState {
    /// Adds a `todo` task to the current view. Blank text is ignored.
    /// Returns whether a task was added.
    pub fn add_task(&mut self, raw_text: &str, priority: Priority) -> Result<bool, ModelError> {
        let Ok(task) = Task::new(raw_text, priority) else {
            return Ok(false);
        };
        if let (View::Daily(_), Some(picked)) = (self.view, self.picker.date()) {
            self.view = View::Daily(picked);
        }
        self.resolve()?.push(task);
        self.persist();
        Ok(true)
    }

    /// Advances the task's status and returns the new one.
    pub fn cycle_status(&mut self, index: usize) -> Result<Status, ModelError> {
        let tabular = self.view.is_tabular();
        let task = task_mut(self.resolve()?, index)?;
        task.status = if tabular {
            task.status.cycled()
        } else {
            task.status.toggled()
        };
        let status = task.status;
        self.persist();
        Ok(status)
    }

    pub fn delete_task(&mut self, index: usize) -> Result<Task, ModelError> {
        let removed = take_task(self.resolve()?, index)?;
        self.persist();
        Ok(removed)
    }

    /// Returns false, touching nothing, when the title is blank.
    pub fn create_section(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let section = Section::new(title);
        info!("created section {}", section.title);
        self.workspace.sections.push(section);
        self.persist();
        true
    }

    /// Appends a page and opens it unless a project page is already open.
    pub fn add_page_to_section(&mut self, section: usize, title: &str) -> Result<bool, ModelError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }
        let page = self.workspace.push_page(section, title)?;
        info!("created page {}/{} {:?}", section, page, title);
        self.persist();
        if !self.view.is_tabular() {
            self.switch_page(section, page);
        }
        Ok(true)
    }

    pub fn delete_specific_page(&mut self, section: usize, page: usize) -> Result<Page, ModelError> {
        let removed = self.workspace.remove_page(section, page)?;
        info!("deleted page {}/{} {:?}", section, page, removed.title);
        if let View::Project {
            section: active_section,
            page: active_page,
        } = self.view
        {
            if active_section == section {
                if active_page == page {
                    self.view = View::Inbox;
                } else if active_page > page {
                    self.view = View::Project {
                        section,
                        page: active_page - 1,
                    };
                }
            }
        }
        self.persist();
        Ok(removed)
    }

    /// Removes a journal day outright, moving an open journal on it back to today.
    pub fn delete_journal_entry(&mut self, date: NaiveDate) -> Option<Vec<Task>> {
        let removed = self.journal.remove(&date);
        info!("deleted journal day {}", date_key(date));
        let today = self.clock.today();
        if self.view == View::Daily(date) {
            self.view = View::Daily(today);
        }
        if self.picker.date() == Some(date) {
            self.picker.set_value(&date_key(today));
        }
        self.persist();
        removed
    }

    pub fn finish_daily_entry(&mut self, notifier: &mut dyn Notifier) {
        self.persist();
        let today = self.clock.today();
        self.picker.set_value(&date_key(today));
        if let View::Daily(_) = self.view {
            self.view = View::Daily(today);
        }
        notifier.notify("Journal saved. Returned to today.", NoticeKind::Success);
    }

    /// Applies an intent once the user has answered. Declined confirmations and
    /// cancelled prompts change nothing. Returns whether anything changed.
    pub fn resume(&mut self, intent: &Intent, reply: Reply) -> Result<bool, ModelError> {
        match (intent, reply) {
            (Intent::CreateSection, Reply::Text(Some(title))) => Ok(self.create_section(&title)),
            (Intent::AddPage { section }, Reply::Text(Some(title))) => {
                self.add_page_to_section(*section, &title)
            }
            (Intent::DeletePage { section, page }, Reply::Confirmed(true)) => {
                self.delete_specific_page(*section, *page).map(|_| true)
            }
            (Intent::DeleteCurrentPage, Reply::Confirmed(true)) => match self.view {
                View::Project { section, page } => {
                    self.delete_specific_page(section, page).map(|_| true)
                }
                _ => Ok(false),
            },
            (Intent::DeleteJournalDay(date), Reply::Confirmed(true)) => {
                self.delete_journal_entry(*date);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Asks through `prompter`, then resumes with the answer.
    pub fn run_intent(
        &mut self,
        intent: &Intent,
        prompter: &mut dyn Prompter,
    ) -> Result<bool, ModelError> {
        let reply = match intent.ask(self) {
            Ask::Confirm(message) => Reply::Confirmed(prompter.confirm(&message)),
            Ask::Text(message) => Reply::Text(prompter.prompt_text(&message)),
        };
        self.resume(intent, reply)
    }
}
