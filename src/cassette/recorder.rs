//! Records searches into a cassette file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::format::{Cassette, Interaction, Outcome};
use crate::error::TrackerError;
use crate::ports::Issue;

/// Accumulates searches and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    server: String,
    recorded_at: DateTime<Utc>,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Creates a recorder that will write to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        server: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            server: server.into(),
            recorded_at,
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Records one search. The `seq` field is assigned automatically.
    pub fn record(&mut self, filter: &str, result: &Result<Vec<Issue>, TrackerError>) {
        let outcome = match result {
            Ok(issues) => Outcome::Issues(issues.clone()),
            Err(err) => Outcome::Error(err.clone()),
        };
        self.interactions.push(Interaction {
            seq: self.next_seq,
            filter: filter.to_string(),
            outcome,
        });
        self.next_seq += 1;
    }

    /// Number of searches recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Writes the cassette YAML file, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            server: self.server.clone(),
            recorded_at: self.recorded_at,
            interactions: self.interactions.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}
