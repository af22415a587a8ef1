//! Recording adapters that capture searches to cassettes.

pub mod tracker;

pub use tracker::RecordingTracker;
