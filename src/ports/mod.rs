//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the digest pipeline and an
//! external system (time, filesystem, issue tracker). Implementations live
//! in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod tracker;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use tracker::{FilterSpec, Issue, IssueTracker, SearchFuture};
