//! Rarity-weighted blueprint sampling.
//!
//! Each blueprint category gets a 1-indexed array-backed binary tree built
//! lazily from the catalog table, with sector-description overrides folded
//! in at build time. An entry's own weight is `6 - rarity`; entries whose
//! effective rarity is 0 are excluded entirely. Subtree weights accumulate
//! bottom-up so a single uniform draw over the total weight can walk down
//! to the matching entry.

use log::debug;

use crate::data::{BlueprintKind, Catalog, SectorDescription};
use crate::error::GenError;
use crate::rng::RandomSource;

const RARITY_WEIGHT_BASE: i32 = 6;

#[derive(Debug, Clone)]
struct RarityNode {
    id: String,
    weight: i32,
    subtree: i32,
}

/// Weighted sampling tree for one blueprint category.
#[derive(Debug, Clone)]
pub struct RarityTable {
    /// 1-indexed; nodes[0] is an unused sentinel.
    nodes: Vec<RarityNode>,
}

impl RarityTable {
    /// Build the tree for a category, applying sector overrides.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::EmptyRarityPool`] when no entry has nonzero
    /// effective rarity.
    pub fn build(
        catalog: &Catalog,
        sector: Option<&SectorDescription>,
        kind: BlueprintKind,
    ) -> Result<Self, GenError> {
        let mut nodes = vec![RarityNode {
            id: String::new(),
            weight: 0,
            subtree: 0,
        }];

        for entry in catalog.blueprints(kind) {
            let rarity = match sector.and_then(|desc| desc.rarity_override(&entry.id)) {
                Some(value) => {
                    debug!("{kind} {} rarity {value} override", entry.id);
                    value
                }
                None => entry.rarity,
            };
            if rarity == 0 {
                continue;
            }
            let weight = RARITY_WEIGHT_BASE - rarity;
            nodes.push(RarityNode {
                id: entry.id.clone(),
                weight,
                subtree: weight,
            });
        }

        // Accumulate child weights into parents, last index down to 1.
        // Index 1's share lands in the sentinel, as in the original.
        for i in (1..nodes.len()).rev() {
            let subtree = nodes[i].subtree;
            nodes[i >> 1].subtree += subtree;
        }

        if nodes.len() < 2 || nodes[1].subtree <= 0 {
            return Err(GenError::EmptyRarityPool { category: kind });
        }
        Ok(Self { nodes })
    }

    /// Total weight across all sampled entries.
    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.nodes[1].subtree.unsigned_abs()
    }

    /// Draw one value and walk the tree to the entry it lands on.
    pub fn sample<R: RandomSource>(&self, rng: &mut R) -> &str {
        let mut v = (rng.draw() % self.total_weight()) as i32;
        let mut j = 1;
        while v >= self.nodes[j].weight {
            v -= self.nodes[j].weight;
            j <<= 1;
            if v >= self.nodes[j].subtree {
                v -= self.nodes[j].subtree;
                j += 1;
            }
        }
        &self.nodes[j].id
    }
}

/// Lazily built per-category tables, cached for the life of one
/// generation context.
#[derive(Debug, Clone, Default)]
pub struct RarityCache {
    tables: [Option<RarityTable>; 4],
}

impl RarityCache {
    const fn slot(kind: BlueprintKind) -> usize {
        match kind {
            BlueprintKind::Crew => 0,
            BlueprintKind::Weapon => 1,
            BlueprintKind::Drone => 2,
            BlueprintKind::Augment => 3,
        }
    }

    /// Sample a blueprint id from a category, building its table on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::EmptyRarityPool`] when the category has no
    /// entries with nonzero effective rarity.
    pub fn pick<R: RandomSource>(
        &mut self,
        catalog: &Catalog,
        sector: Option<&SectorDescription>,
        kind: BlueprintKind,
        rng: &mut R,
    ) -> Result<String, GenError> {
        let slot = Self::slot(kind);
        if self.tables[slot].is_none() {
            self.tables[slot] = Some(RarityTable::build(catalog, sector, kind)?);
        }
        let table = self.tables[slot]
            .as_ref()
            .ok_or(GenError::EmptyRarityPool { category: kind })?;
        Ok(table.sample(rng).to_string())
    }
}
