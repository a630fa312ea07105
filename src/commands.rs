use crate::cli::Target;
use crate::collab::{date_key, parse_date_key, NoticeKind, Notifier, Prompter};
use crate::config::Config;
use crate::model::{ModelError, Priority};
use crate::ops::{Intent, Reply};
use crate::state::AppState;
use crate::storage::{init_project_store, locate_store, Storage, StoreLocation};
use crate::ui;
use crate::view_model::{long_date, RowLayout, TaskRow, ViewModel};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};

pub fn init() -> Result<()> {
    let location = init_project_store()?;
    let mut state = AppState::open(Storage::new(location.open()));
    report_save_warning(&mut state);
    println!("Initialized board at {}", location.dir.display());
    Ok(())
}

pub fn show(config: &Config, target: Target) -> Result<()> {
    let (mut state, location) = open_board(config)?;
    apply_target(&mut state, &target)?;
    let vm = state.view_model();
    println!(
        "Board: {} ({})",
        location.dir.display(),
        location.scope.label()
    );
    print_view(&vm);
    report_save_warning(&mut state);
    Ok(())
}

pub fn add(config: &Config, text: String, priority: Option<String>, target: Target) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    apply_target(&mut state, &target)?;
    let priority = match priority {
        Some(raw) => raw.parse::<Priority>()?,
        None => config.default_priority,
    };
    if state.add_task(&text, priority)? {
        println!("Added to {}", describe(&mut state));
    } else {
        println!("Nothing to add");
    }
    report_save_warning(&mut state);
    Ok(())
}

pub fn toggle(config: &Config, index: usize, target: Target) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    apply_target(&mut state, &target)?;
    let status = state
        .cycle_status(index)
        .with_context(|| format!("updating task {}", index))?;
    println!("Task {} is now {}", index, status.label());
    report_save_warning(&mut state);
    Ok(())
}

pub fn remove(config: &Config, index: usize, target: Target) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    apply_target(&mut state, &target)?;
    let removed = state
        .delete_task(index)
        .with_context(|| format!("deleting task {}", index))?;
    println!("Deleted \"{}\"", removed.text);
    report_save_warning(&mut state);
    Ok(())
}

pub fn section(config: &Config, title: Option<String>) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    let intent = Intent::CreateSection;
    let created = match title {
        Some(title) => state.resume(&intent, Reply::Text(Some(title)))?,
        None => state.run_intent(&intent, &mut ConsolePrompter::new(false))?,
    };
    if created {
        let count = state.workspace().sections.len();
        println!("Created section {}", count - 1);
    } else {
        println!("No section created");
    }
    report_save_warning(&mut state);
    Ok(())
}

pub fn page(config: &Config, section: usize, title: Option<String>) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    let intent = Intent::AddPage { section };
    let created = match title {
        Some(title) => state.resume(&intent, Reply::Text(Some(title)))?,
        None => state.run_intent(&intent, &mut ConsolePrompter::new(false))?,
    };
    if created {
        println!("Added page to {}", state.workspace().section(section)?.title);
    } else {
        println!("No page created");
    }
    report_save_warning(&mut state);
    Ok(())
}

pub fn delete_page(config: &Config, section: usize, page: usize, yes: bool) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    state.workspace().page(section, page)?;
    let deleted = state.run_intent(
        &Intent::DeletePage { section, page },
        &mut ConsolePrompter::new(yes),
    )?;
    println!("{}", if deleted { "Page deleted" } else { "Kept page" });
    report_save_warning(&mut state);
    Ok(())
}

pub fn delete_day(config: &Config, date: String, yes: bool) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    let date = parse_date_key(&date).ok_or(ModelError::InvalidDate(date))?;
    let deleted = state.run_intent(
        &Intent::DeleteJournalDay(date),
        &mut ConsolePrompter::new(yes),
    )?;
    println!(
        "{}",
        if deleted {
            format!("Deleted journal for {}", date_key(date))
        } else {
            "Kept journal day".to_string()
        }
    );
    report_save_warning(&mut state);
    Ok(())
}

pub fn finish(config: &Config) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    state.switch_to_daily();
    state.finish_daily_entry(&mut ConsoleNotifier);
    report_save_warning(&mut state);
    Ok(())
}

pub fn history(config: &Config) -> Result<()> {
    let (mut state, _) = open_board(config)?;
    report_save_warning(&mut state);
    let sidebar = state.sidebar();
    if sidebar.history.is_empty() {
        println!("(no journal entries)");
    }
    for entry in sidebar.history {
        let count = state.journal().get(&entry.date).map_or(0, Vec::len);
        println!(
            "{}  {}  ({} task(s))",
            date_key(entry.date),
            long_date(entry.date),
            count
        );
    }
    Ok(())
}

pub fn tui(config: &Config) -> Result<()> {
    let (state, location) = open_board(config)?;
    ui::run(state, location, config.default_priority)
}

fn open_board(config: &Config) -> Result<(AppState, StoreLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_store(&cwd, config.data_dir.as_deref())?;
    let state = AppState::open(Storage::new(location.open()));
    Ok((state, location))
}

fn apply_target(state: &mut AppState, target: &Target) -> Result<()> {
    if let (Some(section), Some(page)) = (target.section, target.page) {
        state.workspace().page(section, page)?;
        state.switch_page(section, page);
    } else if let Some(raw) = &target.date {
        let date =
            parse_date_key(raw).ok_or_else(|| ModelError::InvalidDate(raw.clone()))?;
        state.load_specific_date(date);
    } else if target.today {
        state.switch_to_daily();
    } else {
        state.switch_to_inbox();
    }
    Ok(())
}

fn describe(state: &mut AppState) -> String {
    let vm = state.view_model();
    format!("{} / {}", vm.folder, vm.breadcrumb)
}

fn report_save_warning(state: &mut AppState) {
    if let Some(warning) = state.take_save_warning() {
        eprintln!("warning: {}", warning);
    }
}

fn print_view(vm: &ViewModel) {
    println!("{} / {}", vm.folder, vm.breadcrumb);
    println!("{}", vm.title);
    println!("  {}", vm.description);
    println!();
    if vm.tasks.is_empty() {
        println!("  (empty)");
    }
    for (idx, row) in vm.tasks.iter().enumerate() {
        print_task(idx, row, vm.layout);
    }
    println!();
    println!("Sections:");
    for (s_idx, section) in vm.sidebar.sections.iter().enumerate() {
        println!("  {} {}", s_idx, section.title);
        for (p_idx, page) in section.pages.iter().enumerate() {
            let marker = if page.active { "*" } else { " " };
            println!("    {}{} {}", marker, p_idx, page.title);
        }
    }
    if !vm.sidebar.history.is_empty() {
        println!("Journal history:");
        for entry in &vm.sidebar.history {
            let marker = if entry.active { "*" } else { " " };
            println!("   {}{}", marker, date_key(entry.date));
        }
    }
}

fn print_task(idx: usize, row: &TaskRow, layout: RowLayout) {
    if layout == RowLayout::Table {
        println!(
            "  {:>2}  {:<40} {:<12} {}",
            idx, row.text, row.status_label, row.priority
        );
    } else {
        let check = if row.completed { "[x]" } else { "[ ]" };
        println!("  {:>2}  {} {}", idx, check, row.text);
    }
}

/// Prompts on stdin. `assume_yes` answers every confirmation with yes.
struct ConsolePrompter {
    assume_yes: bool,
}

impl ConsolePrompter {
    fn new(assume_yes: bool) -> Self {
        ConsolePrompter { assume_yes }
    }

    fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        matches!(
            self.read_line(&format!("{} [y/N] ", message)).as_deref(),
            Some("y") | Some("Y") | Some("yes")
        )
    }

    fn prompt_text(&mut self, message: &str) -> Option<String> {
        self.read_line(&format!("{}: ", message))
            .filter(|line| !line.is_empty())
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Warning => eprintln!("warning: {}", message),
            NoticeKind::Info | NoticeKind::Success => println!("{}", message),
        }
    }
}
