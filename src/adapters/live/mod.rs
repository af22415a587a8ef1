//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod tracker;

pub use clock::SystemClock;
pub use filesystem::LiveFileSystem;
pub use tracker::JiraTracker;
