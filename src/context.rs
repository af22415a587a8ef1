//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::{JiraTracker, LiveFileSystem, SystemClock};
use crate::adapters::recording::RecordingTracker;
use crate::adapters::replaying::{ReplayingClock, ReplayingTracker};
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::ports::{Clock, FileSystem, IssueTracker};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire
/// up different adapter implementations (live, recording, replaying).
pub struct ServiceContext {
    /// Clock the reporting window is derived from.
    pub clock: Box<dyn Clock>,
    /// Filesystem for catalogs, scratch files and dumps.
    pub fs: Box<dyn FileSystem>,
    /// Issue tracker searched for every section.
    pub tracker: Box<dyn IssueTracker>,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        tracker: Box<dyn IssueTracker>,
    ) -> Self {
        Self { clock, fs, tracker, recorder: None }
    }

    /// Creates a live context talking to the configured Jira server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn live(config: &Config) -> Result<Self, String> {
        let tracker = JiraTracker::new(&config.server, config.token())?;
        Ok(Self::new(Box::new(SystemClock), Box::new(LiveFileSystem), Box::new(tracker)))
    }

    /// Creates a live context whose searches are recorded to `path`.
    ///
    /// The cassette is written when the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn recording(config: &Config, path: impl Into<PathBuf>) -> Result<Self, String> {
        let tracker = JiraTracker::new(&config.server, config.token())?;
        Ok(Self::recording_over(
            Box::new(SystemClock),
            Box::new(LiveFileSystem),
            Box::new(tracker),
            path,
            &config.server.url,
        ))
    }

    /// Wraps `inner` in a recording tracker writing to `path` on drop.
    #[must_use]
    pub fn recording_over(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        inner: Box<dyn IssueTracker>,
        path: impl Into<PathBuf>,
        server: &str,
    ) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, server, clock.now())));
        let tracker = RecordingTracker::new(inner, Arc::clone(&recorder));
        Self { clock, fs, tracker: Box::new(tracker), recorder: Some(recorder) }
    }

    /// Creates a context that replays a cassette instead of searching.
    ///
    /// The clock is frozen at the recording time; the filesystem is live.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let replayer = CassetteReplayer::load(path)?;
        tracing::info!(cassette = %path.display(), "replaying recorded searches");
        Ok(Self::new(
            Box::new(ReplayingClock::new(replayer.recorded_at())),
            Box::new(LiveFileSystem),
            Box::new(ReplayingTracker::new(replayer)),
        ))
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let written = match recorder.lock() {
            Ok(recorder) => recorder.write().map_err(|e| e.to_string()),
            Err(_) => Err("recorder lock poisoned".to_string()),
        };
        match written {
            Ok(path) => tracing::info!(cassette = %path.display(), "recording saved"),
            Err(e) => tracing::warn!(error = %e, "failed to write cassette"),
        }
    }
}
