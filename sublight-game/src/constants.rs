//! Centralized geometry and balance constants for the generation core.
//!
//! Every magic number the legacy binary bakes into its map and event
//! generation lives here. None of these are data-driven: changing one is a
//! deliberate break from save compatibility and must go through review.

/// Re-roll threshold for a layout's worst-case nearest-neighbor distance.
///
/// Determined empirically against the original game; layouts measured just
/// below this value were kept, layouts just above it were re-rolled.
pub const ISOLATION_THRESHOLD: f64 = 165.0;

/// Layout attempts allowed before modern-format generation gives up.
pub const MAX_LAYOUT_ATTEMPTS: u32 = 50;

// Grid shape shared by both map variants ----------------------------------
pub(crate) const MAP_COLUMNS: usize = 6;
pub(crate) const MAP_ROWS: usize = 4;

/// Lowest linear index the finish-beacon band can produce (col 4, row 0).
pub(crate) const FINISH_BAND_FLOOR: usize = 16;

// Per-cell skip rule -------------------------------------------------------
pub(crate) const SKIP_DIE: u32 = 5;
pub(crate) const SKIP_RATIO_LIMIT: u32 = 4;

pub(crate) const THROB_TICKS_MOD: u32 = 2001;

// Legacy variant geometry (original 530x346 canvas) ------------------------
pub(crate) const LEGACY_CANVAS: (u32, u32) = (530, 346);
pub(crate) const LEGACY_FUDGE_MOD: u32 = 294;
pub(crate) const LEGACY_CELL_JITTER: u32 = 66;
pub(crate) const LEGACY_CELL_STRIDE: i32 = 86;
pub(crate) const LEGACY_X_TUCK_LIMIT: i32 = 450;
pub(crate) const LEGACY_Y_TUCK_LIMIT: i32 = 278;

// Modern variant geometry (enlarged 640x488 canvas) ------------------------
pub(crate) const MODERN_CANVAS: (u32, u32) = (640, 488);
pub(crate) const MODERN_FUDGE_MOD: u32 = 250;
pub(crate) const MODERN_CELL_JITTER: u32 = 90;
pub(crate) const MODERN_CELL_STRIDE: i32 = 110;
pub(crate) const MODERN_Y_CLAMP: i32 = 415;
pub(crate) const MODERN_TOP_ROW_MIN_Y: i32 = 30;

pub(crate) const FUDGE_BASE: u32 = 50;
pub(crate) const CELL_MARGIN: i32 = 10;
pub(crate) const CELL_TUCK: i32 = 10;

// Nebula cluster placement -------------------------------------------------
pub(crate) const NEBULA_MODEL_W: [i32; 4] = [119, 67, 89, 117];
pub(crate) const NEBULA_MODEL_H: [i32; 4] = [63, 110, 67, 108];
pub(crate) const NEBULA_INSET: i32 = 5;
pub(crate) const NEBULA_STALL_LIMIT: u32 = 21;
pub(crate) const MIN_OPEN_BEACONS: usize = 4;

pub(crate) const NEBULA_PREFIX: &str = "NEBULA";
pub(crate) const DEFAULT_NEBULA_EVENT: &str = "NEBULA";
pub(crate) const FINISH_BEACON_EVENT: &str = "FINISH_BEACON";
pub(crate) const FINISH_BEACON_NEBULA_EVENT: &str = "FINISH_BEACON_NEBULA";

// Event resolution ---------------------------------------------------------
pub(crate) const ITEM_OFFER_BUDGET: u32 = 100;

pub(crate) const SPECIES_RANDOM: &str = "random";
pub(crate) const SPECIES_TRAITOR: &str = "traitor";
pub(crate) const ITEM_RANDOM: &str = "RANDOM";
pub(crate) const CREW_NAME_PLACEHOLDER: &str = "UNNAMED";

/// Crew skill raise bounds, indexed by the difficulty-adjusted sector
/// number (0..=8).
pub(crate) const SKILL_AMOUNT_MIN: [u32; 9] = [0, 0, 0, 0, 1, 1, 1, 2, 0];
pub(crate) const SKILL_AMOUNT_MAX: [u32; 9] = [0, 0, 1, 2, 2, 2, 3, 3, 0];
pub(crate) const SKILL_SLOTS: u32 = 6;

// Automatic reward quantity tables, indexed by reward level 0..=2 ----------
//
// Scrap bounds are f32 on purpose: the original converts them through
// single-precision thousandths before drawing. Keeping the same
// conversion keeps the draw-value ranges identical.
pub(crate) const REWARD_SCRAP_MIN: [f32; 3] = [0.5, 0.8, 1.3];
pub(crate) const REWARD_SCRAP_MAX: [f32; 3] = [0.7, 1.3, 1.55];
pub(crate) const REWARD_FUEL_MIN: [i32; 3] = [1, 2, 3];
pub(crate) const REWARD_FUEL_MAX: [i32; 3] = [3, 4, 6];
pub(crate) const REWARD_MISSILES_MIN: [i32; 3] = [1, 2, 4];
pub(crate) const REWARD_MISSILES_MAX: [i32; 3] = [2, 4, 8];
pub(crate) const REWARD_DRONEPARTS_MIN: [i32; 3] = [1, 1, 1];
pub(crate) const REWARD_DRONEPARTS_MAX: [i32; 3] = [1, 1, 2];

pub(crate) const SCRAP_SECTOR_SCALE: i32 = 6;
pub(crate) const SCRAP_SECTOR_OFFSET: i32 = 15;

/// Chance (percent) that a standard / stuff reward upgrades to an item.
pub(crate) const REWARD_UPGRADE_PCT_STANDARD: u32 = 3;
pub(crate) const REWARD_UPGRADE_PCT_STUFF: u32 = 6;

pub(crate) const TRAILING_DRAW_MIN: u32 = 1;
pub(crate) const TRAILING_DRAW_MAX: u32 = 5;

/// Highest sector number the skill and reward tables are defined for.
pub(crate) const MAX_SECTOR_NUMBER: u32 = 7;
