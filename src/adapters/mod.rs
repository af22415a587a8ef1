//! Port implementations.
//!
//! `live` talks to the real world, `recording` wraps a live tracker and
//! captures every search into a cassette, `replaying` serves a cassette
//! back without network access.

pub mod live;
pub mod recording;
pub mod replaying;
