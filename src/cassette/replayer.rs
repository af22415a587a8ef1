//! Replays recorded searches from a cassette.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::format::{Cassette, Interaction};

/// Serves a cassette's searches back in recorded order.
pub struct CassetteReplayer {
    recorded_at: DateTime<Utc>,
    queue: VecDeque<Interaction>,
}

impl CassetteReplayer {
    /// Creates a replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self {
            recorded_at: cassette.recorded_at,
            queue: cassette.interactions.iter().cloned().collect(),
        }
    }

    /// Reads and parses a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::new(&cassette))
    }

    /// When the cassette was recorded.
    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Returns the next recorded search for `filter`.
    ///
    /// Searches are matched by position. A filter that differs from the
    /// recorded one is logged and served anyway, since expanded filters
    /// legitimately change when a catalog is edited.
    ///
    /// # Errors
    ///
    /// Returns an error once every recorded search has been consumed.
    pub fn next_interaction(&mut self, filter: &str) -> Result<Interaction, String> {
        let interaction = self.queue.pop_front().ok_or_else(|| {
            format!("Cassette exhausted: no recorded search left for filter {filter:?}")
        })?;
        if interaction.filter != filter {
            tracing::warn!(
                seq = interaction.seq,
                recorded = %interaction.filter,
                requested = %filter,
                "replayed filter differs from recording"
            );
        }
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Outcome;
    use chrono::TimeZone;

    fn make_cassette(filters: &[&str]) -> Cassette {
        Cassette {
            server: "https://issues.example.com".into(),
            recorded_at: Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap(),
            interactions: filters
                .iter()
                .zip(0..)
                .map(|(filter, seq)| Interaction {
                    seq,
                    filter: (*filter).to_string(),
                    outcome: Outcome::Issues(vec![]),
                })
                .collect(),
        }
    }

    #[test]
    fn replays_in_recorded_order() {
        let mut replayer = CassetteReplayer::new(&make_cassette(&["a", "b"]));
        assert_eq!(replayer.next_interaction("a").unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("b").unwrap().seq, 1);
    }

    #[test]
    fn mismatched_filter_is_still_served() {
        let mut replayer = CassetteReplayer::new(&make_cassette(&["a"]));
        assert_eq!(replayer.next_interaction("changed").unwrap().filter, "a");
    }

    #[test]
    fn exhausted_replayer_reports_requested_filter() {
        let mut replayer = CassetteReplayer::new(&make_cassette(&[]));
        let err = replayer.next_interaction("project = X").unwrap_err();
        assert!(err.contains("Cassette exhausted"));
        assert!(err.contains("project = X"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CassetteReplayer::load(Path::new("/nonexistent/digest.cassette.yaml"))
            .err()
            .unwrap();
        assert!(err.contains("Failed to read cassette file"));
    }
}
