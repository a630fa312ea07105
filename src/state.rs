use crate::collab::{date_key, Clock, DatePicker, PickerField, SystemClock};
use crate::model::{Inbox, Journal, Workspace};
use crate::nav::View;
use crate::storage::{backup_key, Storage};
use log::{info, warn};

/// Everything one board session owns. Every intent is a `&mut self` method.
pub struct AppState {
    pub(crate) workspace: Workspace,
    pub(crate) inbox: Inbox,
    pub(crate) journal: Journal,
    pub(crate) view: View,
    pub(crate) picker: Box<dyn DatePicker>,
    pub(crate) clock: Box<dyn Clock>,
    storage: Storage,
    save_warning: Option<String>,
}

impl AppState {
    /// Loads the three roots, substituting defaults for whichever are missing,
    /// and writes the result back when anything had to be filled in.
    pub fn open(storage: Storage) -> Self {
        Self::open_with(storage, Box::new(SystemClock))
    }

    pub fn open_with(mut storage: Storage, clock: Box<dyn Clock>) -> Self {
        let loaded = storage.load();
        let mut needs_write = !loaded.is_complete();
        let damage = damage_warning(&loaded.damaged, &loaded.unpreserved);
        let workspace = match loaded.workspace {
            Some(ws) if !ws.is_empty() => ws,
            _ => {
                info!("starting with the default workspace");
                needs_write = true;
                Workspace::starter()
            }
        };
        let today = clock.today();
        let mut state = AppState {
            workspace,
            inbox: loaded.inbox.unwrap_or_default(),
            journal: loaded.journal.unwrap_or_default(),
            view: View::Inbox,
            picker: Box::new(PickerField::new(date_key(today))),
            clock,
            storage,
            save_warning: None,
        };
        info!(
            "opened board: {} sections, {} inbox tasks, {} journal days",
            state.workspace.sections.len(),
            state.inbox.len(),
            state.journal.len()
        );
        if needs_write {
            state.persist();
        }
        if let Some(warning) = damage {
            warn!("{}", warning);
            state.save_warning = Some(warning);
        }
        state
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    #[cfg(test)]
    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn picker(&self) -> &dyn DatePicker {
        self.picker.as_ref()
    }

    pub fn picker_mut(&mut self) -> &mut dyn DatePicker {
        self.picker.as_mut()
    }

    /// Writes all roots. Failures are kept as a warning; the in-memory change stands.
    pub(crate) fn persist(&mut self) {
        if let Err(err) = self
            .storage
            .save(&self.workspace, &self.inbox, &self.journal)
        {
            warn!("save failed: {:#}", err);
            self.save_warning = Some(format!("Save failed: {:#}", err));
        }
    }

    /// The last save failure, if any, cleared on read.
    pub fn take_save_warning(&mut self) -> Option<String> {
        self.save_warning.take()
    }
}

fn damage_warning(damaged: &[&str], unpreserved: &[&str]) -> Option<String> {
    if !unpreserved.is_empty() {
        return Some(format!(
            "Could not read or back up {}; changes to it will not be saved",
            unpreserved.join(", ")
        ));
    }
    if damaged.is_empty() {
        return None;
    }
    let kept: Vec<String> = damaged.iter().map(|key| backup_key(key)).collect();
    Some(format!(
        "Unreadable {} replaced with defaults; original kept as {}",
        damaged.join(", "),
        kept.join(", ")
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::collab::FixedClock;
    use crate::model::{Priority, Task};
    use crate::storage::{MemoryStore, INBOX_KEY, JOURNAL_KEY, WORKSPACE_KEY};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    /// Fresh state over an empty in-memory store with a fixed clock.
    pub(crate) fn fresh() -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState::open_with(
            Storage::new(store.clone()),
            Box::new(FixedClock(today())),
        );
        (state, store)
    }

    #[test]
    fn empty_store_gets_defaults_and_is_written() {
        let (state, store) = fresh();
        assert_eq!(state.workspace(), &Workspace::starter());
        assert!(state.inbox().is_empty());
        assert!(state.journal().is_empty());
        assert_eq!(state.view(), &View::Inbox);
        assert_eq!(state.picker().value(), "2026-10-18");
        assert_eq!(store.writes(), 3);
        assert!(store.raw(WORKSPACE_KEY).is_some());
    }

    #[test]
    fn empty_workspace_is_replaced_by_starter() {
        let store = MemoryStore::new();
        store.insert(WORKSPACE_KEY, "[]");
        let state = AppState::open_with(Storage::new(store), Box::new(FixedClock(today())));
        assert_eq!(state.workspace(), &Workspace::starter());
    }

    #[test]
    fn corrupt_root_does_not_block_others() {
        let store = MemoryStore::new();
        store.insert(INBOX_KEY, r#"[{"text":"keep me","status":"todo","priority":"HIGH"}]"#);
        store.insert(JOURNAL_KEY, "{ broken");
        let state = AppState::open_with(Storage::new(store), Box::new(FixedClock(today())));
        assert_eq!(
            state.inbox(),
            &vec![Task::new("keep me", Priority::High).unwrap()]
        );
        assert!(state.journal().is_empty());
    }

    #[test]
    fn complete_store_opens_without_writing() {
        let (_, store) = fresh();
        let writes = store.writes();
        let state = AppState::open_with(
            Storage::new(store.clone()),
            Box::new(FixedClock(today())),
        );
        assert_eq!(state.workspace(), &Workspace::starter());
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn unreadable_roots_are_kept_aside_on_open() {
        let store = MemoryStore::new();
        let inbox = r#"[{"text":"keep me","status":"todo","priority":"LOW"},{"text":"odd","status":"blocked","priority":"LOW"}]"#;
        let journal = r#"{"someday":[{"text":"x","status":"todo","priority":"LOW"}]}"#;
        store.insert(INBOX_KEY, inbox);
        store.insert(JOURNAL_KEY, journal);

        let mut state =
            AppState::open_with(Storage::new(store.clone()), Box::new(FixedClock(today())));
        assert!(state.inbox().is_empty());
        assert!(state.journal().is_empty());
        assert_eq!(store.raw(&backup_key(INBOX_KEY)).as_deref(), Some(inbox));
        assert_eq!(store.raw(&backup_key(JOURNAL_KEY)).as_deref(), Some(journal));
        assert_eq!(store.raw(INBOX_KEY).as_deref(), Some("[]"));
        let warning = state.take_save_warning().unwrap();
        assert!(warning.contains("inbox.bak"));
        assert!(warning.contains("journal.bak"));
    }

    #[test]
    fn unreadable_root_without_backup_is_never_overwritten() {
        let store = MemoryStore::new();
        let inbox = r#"[{"text":"keep me","status":"blocked"}]"#;
        store.insert(INBOX_KEY, inbox);
        store.fail_writes(true);
        let mut state =
            AppState::open_with(Storage::new(store.clone()), Box::new(FixedClock(today())));
        assert!(state
            .take_save_warning()
            .unwrap()
            .starts_with("Could not read or back up inbox"));

        store.fail_writes(false);
        state.add_task("new", Priority::Low).unwrap();
        assert_eq!(store.raw(INBOX_KEY).as_deref(), Some(inbox));
        assert!(store.raw(WORKSPACE_KEY).is_some());
    }

    #[test]
    fn save_failure_becomes_a_warning() {
        let (mut state, store) = fresh();
        store.fail_writes(true);
        state.persist();
        let warning = state.take_save_warning().unwrap();
        assert!(warning.starts_with("Save failed"));
        assert!(state.take_save_warning().is_none());
    }
}
