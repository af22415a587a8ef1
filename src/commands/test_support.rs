//! In-memory port implementations shared by the command tests.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::TrackerError;
use crate::ports::{Clock, FileSystem, FilterSpec, Issue, IssueTracker, SearchFuture};

/// In-memory filesystem for testing commands without touching disk.
pub struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemFs {
    pub fn with(files: &[(&str, &str)]) -> Self {
        Self {
            files: Mutex::new(
                files.iter().map(|(p, c)| (PathBuf::from(p), (*c).to_string())).collect(),
            ),
        }
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if path.starts_with("/readonly") {
            return Err(format!("permission denied: {}", path.display()).into());
        }
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Serves scripted results in order; searches past the script find nothing.
pub struct ScriptedTracker {
    results: Mutex<VecDeque<Result<Vec<Issue>, TrackerError>>>,
}

impl ScriptedTracker {
    pub fn new(results: Vec<Result<Vec<Issue>, TrackerError>>) -> Self {
        Self { results: Mutex::new(results.into()) }
    }
}

impl IssueTracker for ScriptedTracker {
    fn search<'a>(&'a self, _filter: &'a FilterSpec) -> SearchFuture<'a> {
        let next = self.results.lock().unwrap().pop_front().unwrap_or(Ok(vec![]));
        Box::pin(async move { next })
    }
}
