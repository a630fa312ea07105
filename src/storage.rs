use crate::model::{Inbox, Journal, Workspace};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::rc::Rc;

pub const WORKSPACE_KEY: &str = "workspace";
pub const INBOX_KEY: &str = "inbox";
pub const JOURNAL_KEY: &str = "journal";

const PROJECT_DIR_NAME: &str = ".daybook";

/// Durable string store addressed by fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
        Ok(Some(data))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {:?}", self.dir))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    writes: usize,
    fail_writes: bool,
}

/// In-process store. Clones share the same entries.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .entries
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            anyhow::bail!("store rejected write for {}", key);
        }
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

/// Whatever could be recovered from the store; each root stands alone.
#[derive(Debug, Default)]
pub struct Loaded {
    pub workspace: Option<Workspace>,
    pub inbox: Option<Inbox>,
    pub journal: Option<Journal>,
    /// Keys that were stored but unreadable.
    pub damaged: Vec<&'static str>,
    /// Damaged keys whose contents could not be copied aside. Writing these
    /// would lose the only copy.
    pub unpreserved: Vec<&'static str>,
}

impl Loaded {
    /// True when every root came back from the store as-is.
    pub fn is_complete(&self) -> bool {
        self.workspace.is_some() && self.inbox.is_some() && self.journal.is_some()
    }
}

pub struct Storage {
    store: Box<dyn KeyValueStore>,
    /// Keys never written this session: unreadable and not backed up.
    held: Vec<&'static str>,
}

impl Storage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Storage {
            store: Box::new(store),
            held: Vec::new(),
        }
    }

    /// Writes all three roots. Every write is attempted; the first failure is returned.
    /// Held keys are skipped.
    pub fn save(&mut self, workspace: &Workspace, inbox: &Inbox, journal: &Journal) -> Result<()> {
        let results = [
            self.save_root(WORKSPACE_KEY, workspace),
            self.save_root(INBOX_KEY, inbox),
            self.save_root(JOURNAL_KEY, journal),
        ];
        results.into_iter().collect::<Result<Vec<()>>>()?;
        debug!("saved workspace, inbox and journal");
        Ok(())
    }

    /// Reads all three roots. A stored root that does not parse is copied to
    /// `<key>.bak` before anything can overwrite it.
    pub fn load(&mut self) -> Loaded {
        let mut loaded = Loaded::default();
        loaded.workspace = self.load_root(WORKSPACE_KEY, &mut loaded);
        loaded.inbox = self.load_root(INBOX_KEY, &mut loaded);
        loaded.journal = self.load_root(JOURNAL_KEY, &mut loaded);
        self.held = loaded.unpreserved.clone();
        loaded
    }

    fn save_root<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        if self.held.iter().any(|held| *held == key) {
            debug!("not writing {}: stored copy is unreadable", key);
            return Ok(());
        }
        let serialized =
            serde_json::to_string(value).with_context(|| format!("serializing {}", key))?;
        self.store.set(key, &serialized)
    }

    fn load_root<T: DeserializeOwned>(
        &mut self,
        key: &'static str,
        loaded: &mut Loaded,
    ) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("could not read {}: {:#}", key, err);
                loaded.damaged.push(key);
                loaded.unpreserved.push(key);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("discarding unreadable {}: {}", key, err);
                loaded.damaged.push(key);
                let backup = backup_key(key);
                match self.store.set(&backup, &raw) {
                    Ok(()) => info!("kept unreadable {} as {}", key, backup),
                    Err(err) => {
                        warn!("could not back up {}: {:#}", key, err);
                        loaded.unpreserved.push(key);
                    }
                }
                None
            }
        }
    }
}

pub fn backup_key(key: &str) -> String {
    format!("{}.bak", key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub dir: PathBuf,
    pub scope: StoreScope,
}

impl StoreLocation {
    pub fn open(&self) -> FileStore {
        FileStore::new(&self.dir)
    }
}

impl StoreScope {
    pub fn label(self) -> &'static str {
        match self {
            StoreScope::Project => "project",
            StoreScope::Global => "global",
        }
    }
}

pub fn init_project_store() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR_NAME);
    fs::create_dir_all(&dir).context("failed to create .daybook directory")?;
    Ok(StoreLocation {
        dir,
        scope: StoreScope::Project,
    })
}

/// Nearest `.daybook` directory above `start`, else the global data directory.
pub fn locate_store(start: &Path, global_override: Option<&Path>) -> Result<StoreLocation> {
    locate_store_below(start, None, global_override)
}

/// Like `locate_store`, but never searches above `ceiling`.
fn locate_store_below(
    start: &Path,
    ceiling: Option<&Path>,
    global_override: Option<&Path>,
) -> Result<StoreLocation> {
    if let Some(dir) = find_project_store(start, ceiling) {
        return Ok(StoreLocation {
            dir,
            scope: StoreScope::Project,
        });
    }
    let dir = match global_override {
        Some(dir) => dir.to_path_buf(),
        None => global_data_dir()?,
    };
    Ok(StoreLocation {
        dir,
        scope: StoreScope::Global,
    })
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "daybook").context("locating data directory")
}

fn find_project_store(start: &Path, ceiling: Option<&Path>) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if Some(current) == ceiling {
            break;
        }
        dir = current.parent();
    }
    None
}

fn global_data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}
