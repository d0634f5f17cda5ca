//! Per-run generation context.
//!
//! The original binary kept the unique-event set, rarity caches and active
//! sector/difficulty in global mutable state. Here that state is scoped to
//! one [`GenContext`] owned exclusively by the caller: one context per
//! generation run, never shared between concurrent runs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SECTOR_NUMBER;
use crate::rarity::RarityCache;

/// Game difficulty. Shifts the working sector number used by crew and
/// reward resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Mutable state scoped to a single generation run.
#[derive(Debug, Clone)]
pub struct GenContext {
    sector_id: String,
    sector_number: u32,
    difficulty: Difficulty,
    seen_unique: HashSet<String>,
    pub(crate) rarity: RarityCache,
}

impl GenContext {
    /// Create a fresh context. Sector numbers are clamped to the 0..=7
    /// range the lookup tables are defined for.
    #[must_use]
    pub fn new(sector_id: impl Into<String>, sector_number: u32, difficulty: Difficulty) -> Self {
        Self {
            sector_id: sector_id.into(),
            sector_number: sector_number.min(MAX_SECTOR_NUMBER),
            difficulty,
            seen_unique: HashSet::new(),
            rarity: RarityCache::default(),
        }
    }

    /// Clear all session state so the context can drive a new independent
    /// run with the same sector settings.
    pub fn reset(&mut self) {
        self.seen_unique.clear();
        self.rarity = RarityCache::default();
    }

    #[must_use]
    pub fn sector_id(&self) -> &str {
        &self.sector_id
    }

    #[must_use]
    pub const fn sector_number(&self) -> u32 {
        self.sector_number
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Sector number adjusted for difficulty: +1 on easy, -1 on hard
    /// (floored at 0). Indexes the 0..=8 skill and reward tables.
    #[must_use]
    pub(crate) const fn adjusted_sector_number(&self) -> u32 {
        match self.difficulty {
            Difficulty::Easy => self.sector_number + 1,
            Difficulty::Hard => self.sector_number.saturating_sub(1),
            Difficulty::Normal => self.sector_number,
        }
    }

    /// Record a unique event id. Returns false, recording nothing, when
    /// the id was already consumed this session.
    pub(crate) fn mark_unique(&mut self, id: &str) -> bool {
        if self.seen_unique.contains(id) {
            return false;
        }
        self.seen_unique.insert(id.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_shifts_sector_number() {
        let easy = GenContext::new("STANDARD_SPACE", 3, Difficulty::Easy);
        let normal = GenContext::new("STANDARD_SPACE", 3, Difficulty::Normal);
        let hard = GenContext::new("STANDARD_SPACE", 3, Difficulty::Hard);
        assert_eq!(easy.adjusted_sector_number(), 4);
        assert_eq!(normal.adjusted_sector_number(), 3);
        assert_eq!(hard.adjusted_sector_number(), 2);
    }

    #[test]
    fn hard_floor_stays_at_zero() {
        let ctx = GenContext::new("STANDARD_SPACE", 0, Difficulty::Hard);
        assert_eq!(ctx.adjusted_sector_number(), 0);
    }

    #[test]
    fn sector_number_is_clamped() {
        let ctx = GenContext::new("STANDARD_SPACE", 12, Difficulty::Easy);
        assert_eq!(ctx.sector_number(), 7);
        assert_eq!(ctx.adjusted_sector_number(), 8);
    }

    #[test]
    fn unique_marking_records_once() {
        let mut ctx = GenContext::new("STANDARD_SPACE", 0, Difficulty::Normal);
        assert!(ctx.mark_unique("QUEST_DERELICT"));
        assert!(!ctx.mark_unique("QUEST_DERELICT"));
        ctx.reset();
        assert!(ctx.mark_unique("QUEST_DERELICT"));
    }
}
