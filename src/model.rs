use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Date-keyed task lists, iterated oldest first.
pub type Journal = BTreeMap<NaiveDate, Vec<Task>>;

pub type Inbox = Vec<Task>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("section not found: {0}")]
    SectionNotFound(usize),
    #[error("page not found: section {section}, page {page}")]
    PageNotFound { section: usize, page: usize },
    #[error("task index {index} out of range (list has {len})")]
    TaskOutOfRange { index: usize, len: usize },
    #[error("task text is empty")]
    EmptyText,
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    #[error("invalid date (use YYYY-MM-DD): {0}")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Todo,
    Progress,
    Done,
}

impl Status {
    /// Checkbox toggle used by the inbox and journal: anything not done becomes done.
    pub fn toggled(self) -> Status {
        match self {
            Status::Done => Status::Todo,
            Status::Todo | Status::Progress => Status::Done,
        }
    }

    /// Three-state cycle used by project pages.
    pub fn cycled(self) -> Status {
        match self {
            Status::Todo => Status::Progress,
            Status::Progress => Status::Done,
            Status::Done => Status::Todo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "Not started",
            Status::Progress => "In progress",
            Status::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    pub fn style_class(self) -> &'static str {
        match self {
            Priority::Low => "priority-low",
            Priority::Medium => "priority-medium",
            Priority::High => "priority-high",
        }
    }

    pub fn raised(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ModelError::UnknownPriority(s.to_string())),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    /// Builds a fresh `todo` task from user input, trimming surrounding whitespace.
    pub fn new(raw_text: &str, priority: Priority) -> Result<Self, ModelError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ModelError::EmptyText);
        }
        Ok(Task {
            text: text.to_string(),
            status: Status::Todo,
            priority,
        })
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Page {
            title: title.into(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Section {
            title: title.to_uppercase(),
            pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workspace {
    pub sections: Vec<Section>,
}

impl Workspace {
    /// The workspace a fresh board starts with.
    pub fn starter() -> Self {
        let mut general = Section::new("General");
        general.pages.push(Page::new("Quick Notes"));
        Workspace {
            sections: vec![general],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, section: usize) -> Result<&Section, ModelError> {
        self.sections
            .get(section)
            .ok_or(ModelError::SectionNotFound(section))
    }

    pub fn section_mut(&mut self, section: usize) -> Result<&mut Section, ModelError> {
        self.sections
            .get_mut(section)
            .ok_or(ModelError::SectionNotFound(section))
    }

    pub fn page(&self, section: usize, page: usize) -> Result<&Page, ModelError> {
        self.section(section)?
            .pages
            .get(page)
            .ok_or(ModelError::PageNotFound { section, page })
    }

    pub fn page_mut(&mut self, section: usize, page: usize) -> Result<&mut Page, ModelError> {
        self.section_mut(section)?
            .pages
            .get_mut(page)
            .ok_or(ModelError::PageNotFound { section, page })
    }

    pub fn contains_page(&self, section: usize, page: usize) -> bool {
        self.page(section, page).is_ok()
    }

    /// Appends a page and returns its index within the section.
    pub fn push_page(&mut self, section: usize, title: &str) -> Result<usize, ModelError> {
        let target = self.section_mut(section)?;
        target.pages.push(Page::new(title));
        Ok(target.pages.len() - 1)
    }

    pub fn remove_page(&mut self, section: usize, page: usize) -> Result<Page, ModelError> {
        let target = self.section_mut(section)?;
        if page >= target.pages.len() {
            return Err(ModelError::PageNotFound { section, page });
        }
        Ok(target.pages.remove(page))
    }
}

/// Removes the task at `index`, reporting the list length when out of range.
pub fn take_task(tasks: &mut Vec<Task>, index: usize) -> Result<Task, ModelError> {
    if index >= tasks.len() {
        return Err(ModelError::TaskOutOfRange {
            index,
            len: tasks.len(),
        });
    }
    Ok(tasks.remove(index))
}

pub fn task_mut(tasks: &mut [Task], index: usize) -> Result<&mut Task, ModelError> {
    let len = tasks.len();
    tasks
        .get_mut(index)
        .ok_or(ModelError::TaskOutOfRange { index, len })
}
