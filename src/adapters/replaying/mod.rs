//! Replaying adapters that serve a recorded cassette.

pub mod clock;
pub mod tracker;

pub use clock::ReplayingClock;
pub use tracker::ReplayingTracker;
