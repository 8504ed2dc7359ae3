//! High score leaderboard
//!
//! Fed from end-of-round summaries; keeps the top 10 by total score. Storage
//! belongs to whoever embeds the game (the table is serde-serializable).

use serde::{Deserialize, Serialize};

use crate::sim::RoundSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Total score across agents
    pub score: u64,
    /// Level reached
    pub level: u32,
    pub pellets: u32,
    pub pursuers_eaten: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies; returns the rank achieved (1-indexed)
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Sorted descending; ties keep the earlier entry ahead
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        log::debug!("High score rank {} of {}", rank, self.entries.len());
        Some(rank)
    }

    /// Record a finished round
    pub fn add_summary(&mut self, summary: &RoundSummary) -> Option<usize> {
        self.add(HighScoreEntry {
            score: summary.final_score,
            level: summary.level_reached,
            pellets: summary.stats.pellets,
            pursuers_eaten: summary.stats.pursuers_eaten,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RoundStats;

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry { score, level: 1, pellets: 0, pursuers_eaten: 0 }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_sorted_insert_and_truncate() {
        let mut scores = HighScores::new();
        for s in [500, 100, 900, 300] {
            scores.add(entry(s));
        }
        let ordered: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![900, 500, 300, 100]);
        assert_eq!(scores.potential_rank(400), Some(3));

        for s in 1..=20 {
            scores.add(entry(s * 1000));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(20_000));
        assert!(!scores.qualifies(50));
        assert_eq!(scores.add(entry(50)), None);
    }

    #[test]
    fn test_add_summary() {
        let mut scores = HighScores::new();
        let summary = RoundSummary {
            final_score: 4_210,
            agent_scores: vec![4_000, 210],
            level_reached: 3,
            stats: RoundStats { pellets: 300, pursuers_eaten: 5, ..RoundStats::default() },
        };
        assert_eq!(scores.add_summary(&summary), Some(1));
        assert_eq!(
            scores.entries[0],
            HighScoreEntry {
                score: 4_210,
                level: 3,
                pellets: 300,
                pursuers_eaten: 5
            }
        );
    }
}
