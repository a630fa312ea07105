use crate::model::{ModelError, Task};
use crate::nav::View;
use crate::state::AppState;

impl AppState {
    /// The task list behind the current view.
    pub fn resolve(&mut self) -> Result<&mut Vec<Task>, ModelError> {
        let view = self.view;
        self.resolve_view(view)
    }

    /// The task list behind `view`. Visiting a journal day creates its list.
    /// A project selection that no longer exists is an error, not a fallback.
    pub fn resolve_view(&mut self, view: View) -> Result<&mut Vec<Task>, ModelError> {
        match view {
            View::Inbox => Ok(&mut self.inbox),
            View::Daily(date) => Ok(self.journal.entry(date).or_default()),
            View::Project { section, page } => {
                Ok(&mut self.workspace.page_mut(section, page)?.tasks)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::state::tests::{fresh, today};

    #[test]
    fn inbox_resolves_to_inbox() {
        let (mut state, _) = fresh();
        state
            .resolve()
            .unwrap()
            .push(Task::new("idea", Priority::Low).unwrap());
        assert_eq!(state.inbox().len(), 1);
    }

    #[test]
    fn visiting_a_day_creates_it() {
        let (mut state, _) = fresh();
        assert!(state.journal().get(&today()).is_none());
        assert!(state.resolve_view(View::Daily(today())).unwrap().is_empty());
        assert_eq!(state.journal().get(&today()), Some(&Vec::new()));
    }

    #[test]
    fn project_resolves_to_page_tasks() {
        let (mut state, _) = fresh();
        state.switch_page(0, 0);
        state
            .resolve()
            .unwrap()
            .push(Task::new("draft", Priority::High).unwrap());
        assert_eq!(state.workspace().sections[0].pages[0].tasks.len(), 1);
    }

    #[test]
    fn stale_project_fails_closed() {
        let (mut state, _) = fresh();
        state.switch_page(2, 0);
        assert_eq!(
            state.resolve().unwrap_err(),
            ModelError::SectionNotFound(2)
        );
        assert!(state.inbox().is_empty());
    }
}
