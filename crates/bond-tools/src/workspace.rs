//! Workspace Isolation
//!
//! Keeps demos, test scaffolding and scratch sessions out of the project
//! tree, under `<base>/.workspace`:
//!
//! ```text
//! .workspace/
//! ├── demos/   <name>_<YYYYmmdd_HHMMSS>/README.md
//! ├── tests/   <kind>_<YYYYmmdd_HHMMSS>/
//! └── temp/    session_<YYYYmmdd_HHMMSS>/
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Local;
use tracing::{debug, info};

use crate::error::{Result, WorkspaceError};

const SESSION_PREFIX: &str = "session_";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Handle on one `.workspace` directory tree
#[derive(Clone, Debug)]
pub struct WorkspaceManager {
    base_dir: PathBuf,
    demos_dir: PathBuf,
    tests_dir: PathBuf,
    temp_dir: PathBuf,
}

impl WorkspaceManager {
    /// Open (creating if needed) the workspace at `root/.workspace`
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::at(root.as_ref().join(".workspace"))
    }

    /// Open (creating if needed) a workspace rooted exactly at `base_dir`
    pub fn at(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let manager = Self {
            demos_dir: base_dir.join("demos"),
            tests_dir: base_dir.join("tests"),
            temp_dir: base_dir.join("temp"),
            base_dir,
        };

        for dir in [&manager.base_dir, &manager.demos_dir, &manager.tests_dir, &manager.temp_dir] {
            create_dir(dir)?;
        }
        debug!(base = %manager.base_dir.display(), "workspace ready");
        Ok(manager)
    }

    /// Workspace under the current directory
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| WorkspaceError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        Self::new(cwd)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn demos_dir(&self) -> &Path {
        &self.demos_dir
    }

    pub fn tests_dir(&self) -> &Path {
        &self.tests_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// New demo directory with a README describing it
    pub fn create_demo_workspace(&self, name: &str) -> Result<PathBuf> {
        let path = self.demos_dir.join(stamped(&sanitize(name)?));
        create_dir(&path)?;

        let readme = path.join("README.md");
        let body = format!(
            "# Demo: {name}\n\n\
             Created by Bond at {}\n\n\
             This is an isolated demo workspace.\n\
             All files here are temporary and can be safely deleted.\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        std::fs::write(&readme, body).map_err(|source| WorkspaceError::Create { path: readme, source })?;

        info!(path = %path.display(), "created demo workspace");
        Ok(path)
    }

    /// New test directory for a kind of test (e.g. "unit", "integration")
    pub fn create_test_workspace(&self, kind: &str) -> Result<PathBuf> {
        let path = self.tests_dir.join(stamped(&sanitize(kind)?));
        create_dir(&path)?;
        Ok(path)
    }

    /// New scratch session directory
    pub fn create_temp_session(&self) -> Result<PathBuf> {
        let path = self.temp_dir.join(stamped(SESSION_PREFIX.trim_end_matches('_')));
        create_dir(&path)?;
        Ok(path)
    }

    /// Remove temp sessions last modified at least `days` ago.
    /// Returns the names of the removed directories.
    pub fn cleanup_old_sessions(&self, days: u64) -> Result<Vec<String>> {
        let max_age = Duration::from_secs(days.saturating_mul(86_400));
        let now = SystemTime::now();
        let mut cleaned = Vec::new();

        for session in self.list_temp_sessions()? {
            let modified = std::fs::metadata(&session)
                .and_then(|m| m.modified())
                .map_err(|source| WorkspaceError::Read {
                    path: session.clone(),
                    source,
                })?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age >= max_age {
                remove_dir(&session)?;
                if let Some(name) = session.file_name() {
                    cleaned.push(name.to_string_lossy().into_owned());
                }
            }
        }

        if !cleaned.is_empty() {
            info!(count = cleaned.len(), days, "cleaned up old sessions");
        }
        Ok(cleaned)
    }

    pub fn list_demos(&self) -> Result<Vec<PathBuf>> {
        list_dir(&self.demos_dir, |_| true)
    }

    pub fn list_tests(&self) -> Result<Vec<PathBuf>> {
        list_dir(&self.tests_dir, |_| true)
    }

    pub fn list_temp_sessions(&self) -> Result<Vec<PathBuf>> {
        list_dir(&self.temp_dir, |name| name.starts_with(SESSION_PREFIX))
    }

    /// The current directory, if it lies inside this workspace
    pub fn current_workspace(&self) -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        self.contains(&cwd).then_some(cwd)
    }

    /// Whether `path` lies inside this workspace
    pub fn contains(&self, path: &Path) -> bool {
        let base = self.base_dir.canonicalize().unwrap_or_else(|_| self.base_dir.clone());
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        path.starts_with(base)
    }

    /// Remove every demo workspace; returns how many entries were listed
    pub fn clean_all_demos(&self) -> Result<usize> {
        clean_all(self.list_demos()?)
    }

    /// Remove every test workspace; returns how many entries were listed
    pub fn clean_all_tests(&self) -> Result<usize> {
        clean_all(self.list_tests()?)
    }
}

/// Keep alphanumerics and `._-`; everything else becomes `_`
fn sanitize(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(WorkspaceError::InvalidName(name.to_string()));
    }
    Ok(name
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect())
}

fn stamped(name: &str) -> String {
    format!("{name}_{}", Local::now().format(STAMP_FORMAT))
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| WorkspaceError::Create {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_dir(path: &Path) -> Result<()> {
    std::fs::remove_dir_all(path).map_err(|source| WorkspaceError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

fn list_dir(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let read_err = |source: std::io::Error| WorkspaceError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if keep(&entry.file_name().to_string_lossy()) {
            entries.push(entry.path());
        }
    }
    entries.sort();
    Ok(entries)
}

fn clean_all(entries: Vec<PathBuf>) -> Result<usize> {
    let count = entries.len();
    for entry in entries.iter().filter(|p| p.is_dir()) {
        remove_dir(entry)?;
    }
    Ok(count)
}
