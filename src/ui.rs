use crate::collab::{date_key, parse_date_key, NoticeKind, Notifier};
use crate::model::{ModelError, Priority, Status};
use crate::nav::View;
use crate::ops::{Ask, Intent, Reply};
use crate::state::AppState;
use crate::storage::StoreLocation;
use crate::view_model::{RowLayout, Sidebar, TaskRow, ViewModel};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::debug;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;

pub fn run(state: AppState, location: StoreLocation, default_priority: Priority) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(state, location, default_priority);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    state: AppState,
    location: StoreLocation,
    focus: Focus,
    sidebar_idx: usize,
    task_idx: usize,
    priority: Priority,
    status: StatusLine,
    mode: Mode,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Sidebar,
    Tasks,
}

enum Mode {
    Normal,
    Adding(FieldValue),
    Prompt {
        intent: Intent,
        message: String,
        field: FieldValue,
    },
    Confirm {
        intent: Intent,
        message: String,
    },
    PickDate(FieldValue),
}

/// One selectable row of the sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Entry {
    Inbox,
    Journal,
    Section(usize),
    Page(usize, usize),
    HistoryHeading,
    Day(NaiveDate),
}

struct StatusLine {
    text: String,
    kind: NoticeKind,
}

impl StatusLine {
    fn set(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.text = text.into();
        self.kind = kind;
    }

    fn color(&self) -> Color {
        match self.kind {
            NoticeKind::Info => Color::Gray,
            NoticeKind::Success => Color::LightGreen,
            NoticeKind::Warning => Color::LightRed,
        }
    }
}

impl Notifier for StatusLine {
    fn notify(&mut self, message: &str, kind: NoticeKind) {
        self.set(message, kind);
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            let prev = self.cursor - ch.len_utf8();
            self.value.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    /// Shared editing keys. Returns false for keys the field does not handle.
    fn handle(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c)
            }
            _ => return false,
        }
        true
    }
}

impl App {
    fn new(state: AppState, location: StoreLocation, priority: Priority) -> Self {
        let status = StatusLine {
            text: format!("Loaded board from {}", location.dir.display()),
            kind: NoticeKind::Info,
        };
        let mut app = App {
            state,
            location,
            focus: Focus::Sidebar,
            sidebar_idx: 0,
            task_idx: 0,
            priority,
            status,
            mode: Mode::Normal,
        };
        app.check_save();
        app
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            let vm = self.state.view_model();
            self.clamp(&vm);
            terminal.draw(|f| self.draw(f, &vm))?;
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let quit = match mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::Adding(field) => {
                self.handle_adding_key(field, key);
                false
            }
            Mode::Prompt {
                intent,
                message,
                field,
            } => {
                self.handle_prompt_key(intent, message, field, key);
                false
            }
            Mode::Confirm { intent, message } => {
                self.handle_confirm_key(intent, message, key);
                false
            }
            Mode::PickDate(field) => {
                self.handle_date_key(field, key);
                false
            }
        };
        self.check_save();
        Ok(quit)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('i') => {
                self.state.switch_to_inbox();
                self.task_idx = 0;
            }
            KeyCode::Char('t') => {
                self.state.switch_to_daily();
                self.task_idx = 0;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Tasks,
                    Focus::Tasks => Focus::Sidebar,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter => {
                if self.focus == Focus::Sidebar {
                    self.open_entry();
                }
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Adding(FieldValue::new(""));
                self.status
                    .set("New task (Enter save, Tab priority, Esc cancel)", NoticeKind::Info);
            }
            KeyCode::Char('p') => {
                self.priority = self.priority.raised();
                self.status
                    .set(format!("New tasks get {}", self.priority), NoticeKind::Info);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.cycle_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('S') => self.begin(Intent::CreateSection),
            KeyCode::Char('P') => match self.selected_section() {
                Some(section) => self.begin(Intent::AddPage { section }),
                None => self
                    .status
                    .set("Select a section in the sidebar first", NoticeKind::Warning),
            },
            KeyCode::Char('D') => {
                if self.state.view().is_tabular() {
                    self.begin(Intent::DeleteCurrentPage);
                } else {
                    self.status.set("No page open", NoticeKind::Warning);
                }
            }
            KeyCode::Char('g') => {
                let current = self.state.picker().value();
                self.mode = Mode::PickDate(FieldValue::new(&current));
                self.status
                    .set("Journal date (YYYY-MM-DD, Enter open, Esc cancel)", NoticeKind::Info);
            }
            KeyCode::Char('f') => {
                self.state.finish_daily_entry(&mut self.status);
                self.task_idx = 0;
            }
            _ => {}
        }
        self.check_save();
        Ok(false)
    }

    fn handle_adding_key(&mut self, mut field: FieldValue, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.status.set("Canceled", NoticeKind::Info),
            KeyCode::Tab => {
                self.priority = self.priority.raised();
                self.mode = Mode::Adding(field);
            }
            KeyCode::Enter => match self.state.add_task(&field.value, self.priority) {
                Ok(true) => {
                    self.task_idx = self.state.resolve().map_or(0, |t| t.len().saturating_sub(1));
                    self.status.set("Task added", NoticeKind::Success);
                }
                Ok(false) => self.status.set("Nothing to add", NoticeKind::Info),
                Err(err) => self.fail(err),
            },
            _ => {
                field.handle(key);
                self.mode = Mode::Adding(field);
            }
        }
    }

    fn handle_prompt_key(
        &mut self,
        intent: Intent,
        message: String,
        mut field: FieldValue,
        key: KeyEvent,
    ) {
        match key.code {
            KeyCode::Esc => self.finish_intent(&intent, Reply::Text(None)),
            KeyCode::Enter => {
                let text = field.value.clone();
                self.finish_intent(&intent, Reply::Text(Some(text)));
            }
            _ => {
                field.handle(key);
                self.mode = Mode::Prompt {
                    intent,
                    message,
                    field,
                };
            }
        }
    }

    fn handle_confirm_key(&mut self, intent: Intent, message: String, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.finish_intent(&intent, Reply::Confirmed(true))
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.finish_intent(&intent, Reply::Confirmed(false))
            }
            _ => self.mode = Mode::Confirm { intent, message },
        }
    }

    fn handle_date_key(&mut self, mut field: FieldValue, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.status.set("Canceled", NoticeKind::Info),
            KeyCode::Enter => match parse_date_key(&field.value) {
                Some(date) => {
                    self.state.picker_mut().set_value(&date_key(date));
                    if matches!(self.state.view(), View::Daily(_)) {
                        self.state.change_journal_date();
                    } else {
                        self.state.switch_to_daily();
                    }
                    self.task_idx = 0;
                }
                None => {
                    self.status
                        .set(format!("Not a date: {}", field.value), NoticeKind::Warning);
                    self.mode = Mode::PickDate(field);
                }
            },
            _ => {
                field.handle(key);
                self.mode = Mode::PickDate(field);
            }
        }
    }

    /// Shows the prompt an intent needs; the answer arrives through `finish_intent`.
    fn begin(&mut self, intent: Intent) {
        self.mode = match intent.ask(&self.state) {
            Ask::Confirm(message) => Mode::Confirm { intent, message },
            Ask::Text(message) => Mode::Prompt {
                intent,
                message,
                field: FieldValue::new(""),
            },
        };
    }

    fn finish_intent(&mut self, intent: &Intent, reply: Reply) {
        debug!("resuming {:?} with {:?}", intent, reply);
        match self.state.resume(intent, reply) {
            Ok(true) => self.status.set(done_message(intent), NoticeKind::Success),
            Ok(false) => self.status.set("Canceled", NoticeKind::Info),
            Err(err) => self.fail(err),
        }
    }

    fn open_entry(&mut self) {
        let sidebar = self.state.sidebar();
        let entries = sidebar_entries(&sidebar);
        match entries.get(self.sidebar_idx) {
            Some(Entry::Inbox) => self.state.switch_to_inbox(),
            Some(Entry::Journal) => self.state.switch_to_daily(),
            Some(Entry::Page(section, page)) => self.state.switch_page(*section, *page),
            Some(Entry::Day(date)) => self.state.load_specific_date(*date),
            Some(Entry::Section(section)) => {
                self.begin(Intent::AddPage { section: *section });
                return;
            }
            Some(Entry::HistoryHeading) | None => return,
        }
        self.task_idx = 0;
        self.focus = Focus::Tasks;
    }

    fn cycle_selected(&mut self) {
        if self.focus != Focus::Tasks {
            self.status.set("Focus the task list first (Tab)", NoticeKind::Info);
            return;
        }
        match self.state.cycle_status(self.task_idx) {
            Ok(status) => self
                .status
                .set(format!("Marked {}", status.label()), NoticeKind::Info),
            Err(ModelError::TaskOutOfRange { .. }) => {
                self.status.set("No task selected", NoticeKind::Info)
            }
            Err(err) => self.fail(err),
        }
    }

    fn delete_selected(&mut self) {
        if self.focus == Focus::Tasks {
            match self.state.delete_task(self.task_idx) {
                Ok(task) => self
                    .status
                    .set(format!("Deleted \"{}\"", task.text), NoticeKind::Success),
                Err(ModelError::TaskOutOfRange { .. }) => {
                    self.status.set("No task selected", NoticeKind::Info)
                }
                Err(err) => self.fail(err),
            }
            return;
        }
        let entries = sidebar_entries(&self.state.sidebar());
        match entries.get(self.sidebar_idx) {
            Some(Entry::Page(section, page)) => self.begin(Intent::DeletePage {
                section: *section,
                page: *page,
            }),
            Some(Entry::Day(date)) => self.begin(Intent::DeleteJournalDay(*date)),
            _ => self
                .status
                .set("Only pages and journal days can be deleted", NoticeKind::Info),
        }
    }

    fn selected_section(&self) -> Option<usize> {
        let entries = sidebar_entries(&self.state.sidebar());
        match entries.get(self.sidebar_idx) {
            Some(Entry::Section(section)) | Some(Entry::Page(section, _)) => Some(*section),
            _ => match self.state.view() {
                View::Project { section, .. } => Some(*section),
                _ => None,
            },
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let idx = match self.focus {
            Focus::Sidebar => &mut self.sidebar_idx,
            Focus::Tasks => &mut self.task_idx,
        };
        *idx = idx.saturating_add_signed(delta);
    }

    /// Keeps both cursors inside the lists that are about to be drawn.
    fn clamp(&mut self, vm: &ViewModel) {
        let entries = sidebar_entries(&vm.sidebar).len();
        self.sidebar_idx = self.sidebar_idx.min(entries.saturating_sub(1));
        self.task_idx = self.task_idx.min(vm.tasks.len().saturating_sub(1));
    }

    fn fail(&mut self, err: ModelError) {
        self.status.set(err.to_string(), NoticeKind::Warning);
    }

    fn check_save(&mut self) {
        if let Some(warning) = self.state.take_save_warning() {
            self.status.set(warning, NoticeKind::Warning);
        }
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>, vm: &ViewModel) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0], vm);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(layout[1]);
        self.draw_sidebar(f, body[0], &vm.sidebar);
        self.draw_tasks(f, body[1], vm);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Adding(field) => self.draw_input(f, "New Task", field, Some(self.priority)),
            Mode::Prompt { message, field, .. } => self.draw_input(f, message, field, None),
            Mode::PickDate(field) => self.draw_input(f, "Journal Date", field, None),
            Mode::Confirm { message, .. } => self.draw_confirm(f, message),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect, vm: &ViewModel) {
        let title = Line::from(vec![
            Span::styled(
                "daybook ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} / {}", vm.folder, vm.breadcrumb),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(self.location.scope.label(), Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.dir.display()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_sidebar(&self, f: &mut ratatui::Frame<'_>, area: Rect, sidebar: &Sidebar) {
        let active = Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD);
        let items = sidebar_entries(sidebar)
            .into_iter()
            .map(|entry| match entry {
                Entry::Inbox => ListItem::new(Line::from(Span::styled(
                    format!("Inbox ({})", sidebar.inbox_count),
                    if sidebar.inbox_active { active } else { Style::default() },
                ))),
                Entry::Journal => ListItem::new(Line::from(Span::styled(
                    "Journal",
                    if sidebar.daily_active { active } else { Style::default() },
                ))),
                Entry::Section(s) => ListItem::new(Line::from(Span::styled(
                    sidebar.sections[s].title.clone(),
                    Style::default()
                        .fg(Color::LightMagenta)
                        .add_modifier(Modifier::BOLD),
                ))),
                Entry::Page(s, p) => {
                    let page = &sidebar.sections[s].pages[p];
                    ListItem::new(Line::from(Span::styled(
                        format!("  {}", page.title),
                        if page.active { active } else { Style::default() },
                    )))
                }
                Entry::HistoryHeading => ListItem::new(Line::from(Span::styled(
                    "JOURNAL HISTORY",
                    Style::default()
                        .fg(Color::LightYellow)
                        .add_modifier(Modifier::BOLD),
                ))),
                Entry::Day(date) => {
                    let is_active = sidebar
                        .history
                        .iter()
                        .any(|h| h.date == date && h.active);
                    ListItem::new(Line::from(Span::styled(
                        format!("  {}", date_key(date)),
                        if is_active { active } else { Style::default() },
                    )))
                }
            })
            .collect::<Vec<_>>();

        let mut state = ListState::default();
        if self.focus == Focus::Sidebar {
            state.select(Some(self.sidebar_idx));
        }
        let list = List::new(items)
            .block(pane_block("Workspace", self.focus == Focus::Sidebar))
            .highlight_style(Style::default().bg(Color::DarkGray));
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_tasks(&self, f: &mut ratatui::Frame<'_>, area: Rect, vm: &ViewModel) {
        let mut header = vec![Line::from(Span::styled(
            vm.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        header.push(Line::from(Span::styled(
            vm.description.clone(),
            Style::default().fg(Color::Gray),
        )));
        if vm.columns.date_picker {
            header.push(Line::from(vec![
                Span::styled("Date ", Style::default().fg(Color::DarkGray)),
                Span::raw(self.state.picker().value()),
                Span::styled("  (g change, f save & reset)", Style::default().fg(Color::DarkGray)),
            ]));
        }
        if vm.columns.priority_input {
            header.push(Line::from(vec![
                Span::styled("New task priority ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    self.priority.to_string(),
                    priority_style(self.priority.style_class()),
                ),
            ]));
        }
        if vm.columns.table_header {
            header.push(Line::from(Span::styled(
                format!("{:<36} {:<12} {}", "Task", "Status", "Priority"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::UNDERLINED),
            )));
        }

        let block = pane_block(vm.view.label(), self.focus == Focus::Tasks);
        let inner = block.inner(area);
        f.render_widget(block, area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(header.len() as u16), Constraint::Min(1)])
            .split(inner);
        f.render_widget(Paragraph::new(header), rows[0]);

        if vm.tasks.is_empty() {
            let empty = Paragraph::new("Nothing here yet. Press a to add a task.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, rows[1]);
            return;
        }
        let items = vm
            .tasks
            .iter()
            .map(|row| task_item(row, vm.layout))
            .collect::<Vec<_>>();
        let mut state = ListState::default();
        if self.focus == Focus::Tasks {
            state.select(Some(self.task_idx));
        }
        let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray));
        f.render_stateful_widget(list, rows[1], &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(Span::styled(
            self.status.text.clone(),
            Style::default().fg(self.status.color()),
        ))
        .wrap(Wrap { trim: true });
        f.render_widget(status, rows[1]);
    }

    fn draw_input(
        &self,
        f: &mut ratatui::Frame<'_>,
        title: &str,
        field: &FieldValue,
        priority: Option<Priority>,
    ) {
        let area = centered_rect(60, 30, f.size());
        let mut lines = vec![Line::from(field.with_caret()), Line::from("")];
        if let Some(priority) = priority {
            lines.push(Line::from(vec![
                Span::raw("Priority "),
                Span::styled(priority.to_string(), priority_style(priority.style_class())),
                Span::styled("  (Tab to change)", Style::default().fg(Color::Gray)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, message: &str) {
        let area = centered_rect(50, 30, f.size());
        let body = vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Confirm Delete",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightRed)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn sidebar_entries(sidebar: &Sidebar) -> Vec<Entry> {
    let mut entries = vec![Entry::Inbox, Entry::Journal];
    for (s, section) in sidebar.sections.iter().enumerate() {
        entries.push(Entry::Section(s));
        entries.extend((0..section.pages.len()).map(|p| Entry::Page(s, p)));
    }
    if !sidebar.history.is_empty() {
        entries.push(Entry::HistoryHeading);
        entries.extend(sidebar.history.iter().map(|h| Entry::Day(h.date)));
    }
    entries
}

fn done_message(intent: &Intent) -> &'static str {
    match intent {
        Intent::CreateSection => "Section created",
        Intent::AddPage { .. } => "Page created",
        Intent::DeletePage { .. } | Intent::DeleteCurrentPage => "Page deleted",
        Intent::DeleteJournalDay(_) => "Journal day deleted",
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn task_item(row: &TaskRow, layout: RowLayout) -> ListItem<'static> {
    let text_style = if row.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    if layout == RowLayout::Simple {
        let check = if row.completed { "[x] " } else { "[ ] " };
        return ListItem::new(Line::from(vec![
            Span::styled(check, Style::default().fg(Color::LightGreen)),
            Span::styled(row.text.clone(), text_style),
        ]));
    }
    let status_color = match row.status {
        Status::Todo => Color::Gray,
        Status::Progress => Color::LightBlue,
        Status::Done => Color::LightGreen,
    };
    ListItem::new(Line::from(vec![
        Span::styled(format!("{:<36} ", truncate_text(&row.text, 36)), text_style),
        Span::styled(
            format!("{:<12} ", row.status_label),
            Style::default().fg(status_color),
        ),
        Span::styled(row.priority.to_string(), priority_style(row.priority_class)),
    ]))
}

fn priority_style(class: &str) -> Style {
    let color = match class {
        "priority-high" => Color::LightRed,
        "priority-medium" => Color::LightYellow,
        _ => Color::LightGreen,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn help_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("i/t", Style::default().fg(Color::LightCyan)),
        Span::raw(" inbox/today  "),
        Span::styled("Tab ↑↓ Enter", Style::default().fg(Color::LightCyan)),
        Span::raw(" browse  "),
        Span::styled("a", Style::default().fg(Color::LightMagenta)),
        Span::raw(" add  "),
        Span::styled("x", Style::default().fg(Color::LightYellow)),
        Span::raw(" status  "),
        Span::styled("S/P", Style::default().fg(Color::LightMagenta)),
        Span::raw(" section/page  "),
        Span::styled("d/D", Style::default().fg(Color::LightRed)),
        Span::raw(" delete  "),
        Span::styled("g/f", Style::default().fg(Color::LightYellow)),
        Span::raw(" date/finish  "),
        Span::styled("q", Style::default().fg(Color::LightRed)),
        Span::raw(" quit"),
    ])
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::fresh;
    use crate::storage::StoreScope;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn app() -> App {
        let (state, _) = fresh();
        let location = StoreLocation {
            dir: PathBuf::from("/tmp/daybook-test"),
            scope: StoreScope::Project,
        };
        App::new(state, location, Priority::Low)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn render(app: &mut App) -> String {
        let vm = app.state.view_model();
        app.clamp(&vm);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f, &vm)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn sidebar_lists_pages_and_history() {
        let (mut state, _) = fresh();
        state.load_specific_date(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        state.add_task("note", Priority::Low).unwrap();
        let entries = sidebar_entries(&state.sidebar());
        assert_eq!(
            entries,
            vec![
                Entry::Inbox,
                Entry::Journal,
                Entry::Section(0),
                Entry::Page(0, 0),
                Entry::HistoryHeading,
                Entry::Day(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            ]
        );
    }

    #[test]
    fn typing_a_task_adds_it_to_the_inbox() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "water plants");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.inbox()[0].text, "water plants");
        assert!(matches!(app.mode, Mode::Normal));
        assert!(render(&mut app).contains("water plants"));
    }

    #[test]
    fn enter_on_a_page_opens_it() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.state.view(),
            &View::Project {
                section: 0,
                page: 0
            }
        );
        assert_eq!(app.focus, Focus::Tasks);
        let screen = render(&mut app);
        assert!(screen.contains("GENERAL / Quick Notes"));
        assert!(screen.contains("Project Database"));
    }

    #[test]
    fn deleting_a_page_waits_for_confirmation() {
        let mut app = app();
        app.sidebar_idx = 3;
        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::Confirm { .. }));
        assert!(render(&mut app).contains("Delete page \"Quick Notes\"?"));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state.workspace().sections[0].pages.len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.state.workspace().sections[0].pages.is_empty());
        assert_eq!(app.status.text, "Page deleted");
    }

    #[test]
    fn new_section_prompt_creates_upper_cased_section() {
        let mut app = app();
        press(&mut app, KeyCode::Char('S'));
        type_text(&mut app, "errands");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.workspace().sections[1].title, "ERRANDS");
    }

    #[test]
    fn date_picker_opens_the_journal() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        for _ in 0..10 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "2026-07-04");
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.state.view(),
            &View::Daily(NaiveDate::from_ymd_opt(2026, 7, 4).unwrap())
        );
        assert!(render(&mut app).contains("Saturday, July 4, 2026"));
    }

    #[test]
    fn status_changes_only_with_the_task_list_focused() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "call bank");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, Focus::Sidebar);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state.inbox()[0].status, Status::Todo);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state.inbox()[0].status, Status::Done);
    }

    #[test]
    fn row_colour_follows_priority_class() {
        let (mut state, _) = fresh();
        state.switch_page(0, 0);
        state.add_task("urgent fix", Priority::High).unwrap();
        let vm = state.view_model();
        assert_eq!(vm.tasks[0].priority_class, "priority-high");
        assert_eq!(
            priority_style(vm.tasks[0].priority_class).fg,
            Some(Color::LightRed)
        );
        assert_eq!(priority_style("priority-medium").fg, Some(Color::LightYellow));
        assert_eq!(priority_style("priority-low").fg, Some(Color::LightGreen));
    }

    #[test]
    fn save_failures_reach_the_status_line() {
        let store = crate::storage::MemoryStore::new();
        let state = AppState::open_with(
            crate::storage::Storage::new(store.clone()),
            Box::new(crate::collab::FixedClock(crate::state::tests::today())),
        );
        let location = StoreLocation {
            dir: PathBuf::from("/tmp/daybook-test"),
            scope: StoreScope::Global,
        };
        let mut app = App::new(state, location, Priority::Low);
        store.fail_writes(true);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "lost?");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.inbox().len(), 1);
        assert_eq!(app.status.kind, NoticeKind::Warning);
        assert!(app.status.text.starts_with("Save failed"));
    }
}
