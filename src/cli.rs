use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "daybook",
    version,
    about = "Terminal inbox, journal and project board"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Which task list a command works on. Defaults to the inbox.
#[derive(Args, Debug, Clone, Default)]
pub struct Target {
    /// Journal day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["today", "section"])]
    pub date: Option<String>,
    /// Today's journal
    #[arg(long, conflicts_with = "section")]
    pub today: bool,
    /// Section index of a project page
    #[arg(long, requires = "page")]
    pub section: Option<usize>,
    /// Page index within the section
    #[arg(long, requires = "section")]
    pub page: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a board in the current directory
    Init,
    /// Print a task list and the sidebar
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Add a task
    Add {
        /// Task text
        text: String,
        /// LOW, MEDIUM or HIGH (defaults to the configured priority)
        #[arg(long, short = 'p')]
        priority: Option<String>,
        #[command(flatten)]
        target: Target,
    },
    /// Advance a task's status
    Toggle {
        /// Task index as printed by `show`
        index: usize,
        #[command(flatten)]
        target: Target,
    },
    /// Delete a task
    Rm {
        /// Task index as printed by `show`
        index: usize,
        #[command(flatten)]
        target: Target,
    },
    /// Create a section (prompts when no title is given)
    Section {
        title: Option<String>,
    },
    /// Add a page to a section (prompts when no title is given)
    Page {
        /// Section index
        section: usize,
        title: Option<String>,
    },
    /// Delete a project page
    DeletePage {
        section: usize,
        page: usize,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Delete a journal day
    DeleteDay {
        /// Day to delete (YYYY-MM-DD)
        date: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Save the journal and return to today
    Finish,
    /// List journal days that have tasks
    History,
    /// Launch the interactive TUI
    Tui,
}
