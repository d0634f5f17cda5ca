//! Sector map generation.
//!
//! Two wire-compatible variants exist: the legacy one rolls a single
//! layout on a 530x346 canvas and binds no events, the modern one rolls
//! on a 640x488 canvas, re-rolls layouts that fail the isolation gate,
//! then binds start/finish events and nebula clusters. Both consume draws
//! in a fixed order; see [`crate::rng`].

use log::{info, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    CELL_MARGIN, CELL_TUCK, DEFAULT_NEBULA_EVENT, FINISH_BAND_FLOOR, FINISH_BEACON_EVENT,
    FINISH_BEACON_NEBULA_EVENT, FUDGE_BASE, ISOLATION_THRESHOLD, LEGACY_CANVAS, LEGACY_CELL_JITTER,
    LEGACY_CELL_STRIDE, LEGACY_FUDGE_MOD, LEGACY_X_TUCK_LIMIT, LEGACY_Y_TUCK_LIMIT, MAP_COLUMNS,
    MAP_ROWS, MAX_LAYOUT_ATTEMPTS, MIN_OPEN_BEACONS, MODERN_CANVAS, MODERN_CELL_JITTER,
    MODERN_CELL_STRIDE, MODERN_FUDGE_MOD, MODERN_TOP_ROW_MIN_Y, MODERN_Y_CLAMP, NEBULA_INSET,
    NEBULA_MODEL_H, NEBULA_MODEL_W, NEBULA_PREFIX, NEBULA_STALL_LIMIT, SKIP_DIE, SKIP_RATIO_LIMIT,
    THROB_TICKS_MOD,
};
use crate::context::{Difficulty, GenContext};
use crate::data::Catalog;
use crate::error::GenError;
use crate::events::{EventResolver, ResolvedEvent};
use crate::isolation::max_isolation;
use crate::rng::RandomSource;

/// Map generation variant, keyed by save file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapFormat {
    /// File format 2: single layout roll, no events.
    Legacy,
    /// File formats 7, 8, 9 and 11: isolation-gated layout plus events.
    Modern,
}

impl MapFormat {
    /// Map a save file format number to its generation variant.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::UnsupportedFormat`] for format numbers with no
    /// known map variant.
    pub const fn from_file_format(format: u32) -> Result<Self, GenError> {
        match format {
            2 => Ok(Self::Legacy),
            7 | 8 | 9 | 11 => Ok(Self::Modern),
            _ => Err(GenError::UnsupportedFormat { format }),
        }
    }
}

/// One generated beacon. Coordinates are canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub throb_ticks: u32,
    #[serde(default)]
    pub event: Option<ResolvedEvent>,
}

/// A complete generated sector map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMap {
    pub width: u32,
    pub height: u32,
    pub rebel_fleet_fudge: u32,
    pub beacons: Vec<Beacon>,
}

/// Grid shape knobs. Production uses the fixed 6x4 grid with cell
/// skipping on; shrinking the grid or disabling skips is a test seam for
/// hand-traced layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCfg {
    pub columns: usize,
    pub rows: usize,
    pub skip_enabled: bool,
}

impl Default for GridCfg {
    fn default() -> Self {
        Self {
            columns: MAP_COLUMNS,
            rows: MAP_ROWS,
            skip_enabled: true,
        }
    }
}

/// Nebula cluster rectangle, kept for chaining follow-up clusters.
#[derive(Debug, Clone, Copy)]
struct NebulaRect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

/// A beacon not yet claimed by nebula placement.
struct OpenBeacon {
    id: usize,
    x: i32,
    y: i32,
    event_id: Option<String>,
}

/// Generates sector maps for one sector at one difficulty.
#[derive(Debug, Clone)]
pub struct SectorMapGenerator {
    pub sector_id: String,
    pub sector_number: u32,
    pub difficulty: Difficulty,
    pub grid: GridCfg,
}

impl Default for SectorMapGenerator {
    fn default() -> Self {
        Self::new("STANDARD_SPACE", 0, Difficulty::Normal)
    }
}

impl SectorMapGenerator {
    #[must_use]
    pub fn new(sector_id: impl Into<String>, sector_number: u32, difficulty: Difficulty) -> Self {
        Self {
            sector_id: sector_id.into(),
            sector_number,
            difficulty,
            grid: GridCfg::default(),
        }
    }

    /// Generate a sector map, consuming draws from `rng`.
    ///
    /// The legacy variant ignores the catalog entirely; the modern variant
    /// reads the sector description, events and blueprints from it.
    ///
    /// # Errors
    ///
    /// Returns [`GenError`] on exhausted layout attempts or missing
    /// catalog data.
    pub fn generate<R: RandomSource>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
        format: MapFormat,
    ) -> Result<GeneratedMap, GenError> {
        match format {
            MapFormat::Legacy => Ok(self.generate_legacy(rng)),
            MapFormat::Modern => self.generate_modern(catalog, rng),
        }
    }

    fn generate_legacy<R: RandomSource>(&self, rng: &mut R) -> GeneratedMap {
        let fudge = rng.draw() % LEGACY_FUDGE_MOD + FUDGE_BASE;
        let beacons = self.roll_layout(rng, MapFormat::Legacy);
        GeneratedMap {
            width: LEGACY_CANVAS.0,
            height: LEGACY_CANVAS.1,
            rebel_fleet_fudge: fudge,
            beacons,
        }
    }

    fn generate_modern<R: RandomSource>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<GeneratedMap, GenError> {
        // The fudge draw happens once, before any layout attempt.
        let fudge = rng.draw() % MODERN_FUDGE_MOD + FUDGE_BASE;
        let mut beacons = self.roll_modern_layout(rng)?;

        let sector = catalog
            .sector(&self.sector_id)
            .ok_or_else(|| GenError::UnknownSector {
                id: self.sector_id.clone(),
            })?;
        let mut ctx = GenContext::new(&self.sector_id, self.sector_number, self.difficulty);

        // The finish band indexes assume a near-full grid; the original
        // would index out of bounds here instead.
        if beacons.len() <= FINISH_BAND_FLOOR {
            return Err(GenError::SparseLayout {
                beacons: beacons.len(),
            });
        }

        // Start beacon: uniform over the first four slots.
        let start = (rng.draw() & 3) as usize;
        beacons[start].event = load_event(catalog, &mut ctx, rng, &sector.start_event)?;

        // Finish beacon: redraw a (row, column) pair in the right-hand
        // band until its linear index lands on an existing beacon. The
        // index math ignores skipped cells, as the original did.
        let finish = loop {
            let row = (rng.draw() & 3) as usize;
            let col = ((rng.draw() & 1) as usize) + 4;
            let idx = col * MAP_ROWS + row;
            if idx < beacons.len() {
                break idx;
            }
        };
        beacons[finish].event = load_event(catalog, &mut ctx, rng, FINISH_BEACON_EVENT)?;

        self.place_nebula_clusters(catalog, &mut ctx, rng, sector, &mut beacons)?;

        Ok(GeneratedMap {
            width: MODERN_CANVAS.0,
            height: MODERN_CANVAS.1,
            rebel_fleet_fudge: fudge,
            beacons,
        })
    }

    /// Roll modern layouts until one passes the isolation gate.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::LayoutRejected`] after
    /// [`MAX_LAYOUT_ATTEMPTS`] failed rolls.
    pub(crate) fn roll_modern_layout<R: RandomSource>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<Beacon>, GenError> {
        let mut attempts = 0;
        loop {
            let beacons = self.roll_layout(rng, MapFormat::Modern);
            attempts += 1;

            let isolation = max_isolation(&beacons);
            if isolation <= ISOLATION_THRESHOLD {
                return Ok(beacons);
            }
            info!(
                "re-rolling sector map: attempt #{attempts} has isolated beacons \
                 (threshold dist {ISOLATION_THRESHOLD:.2}): {isolation:.2}"
            );
            if attempts >= MAX_LAYOUT_ATTEMPTS {
                return Err(GenError::LayoutRejected { attempts });
            }
        }
    }

    /// Roll one grid layout: column-outer, row-inner, one skip check and
    /// three placement draws per visited cell.
    fn roll_layout<R: RandomSource>(&self, rng: &mut R, format: MapFormat) -> Vec<Beacon> {
        let (jitter, stride) = match format {
            MapFormat::Legacy => (LEGACY_CELL_JITTER, LEGACY_CELL_STRIDE),
            MapFormat::Modern => (MODERN_CELL_JITTER, MODERN_CELL_STRIDE),
        };

        let mut beacons = Vec::with_capacity(self.grid.columns * self.grid.rows);
        let mut visited = 0u32;
        let mut z = 0u32;

        for c in 0..self.grid.columns {
            for r in 0..self.grid.rows {
                if self.grid.skip_enabled {
                    let n = rng.draw();
                    if n % SKIP_DIE == 0 {
                        z += 1;
                        if visited / z > SKIP_RATIO_LIMIT {
                            visited += 1;
                            continue;
                        }
                    }
                }

                let throb_ticks = rng.draw() % THROB_TICKS_MOD;
                let mut x = (rng.draw() % jitter) as i32 + c as i32 * stride + CELL_MARGIN;
                let mut y = (rng.draw() % jitter) as i32 + r as i32 * stride + CELL_MARGIN;

                match format {
                    MapFormat::Legacy => {
                        // Faithful edge tucks from the original layout.
                        if c == self.grid.columns - 1 && x > LEGACY_X_TUCK_LIMIT {
                            x -= CELL_TUCK;
                        }
                        if r == self.grid.rows - 1 && y > LEGACY_Y_TUCK_LIMIT {
                            y -= CELL_TUCK;
                        }
                    }
                    MapFormat::Modern => {
                        y = y.min(MODERN_Y_CLAMP);
                        // Columns past the fourth keep the top row clear
                        // of the map header.
                        if c > 3 && r == 0 {
                            y = y.max(MODERN_TOP_ROW_MIN_Y);
                        }
                    }
                }

                beacons.push(Beacon {
                    id: beacons.len(),
                    x,
                    y,
                    throb_ticks,
                    event: None,
                });
                visited += 1;
            }
        }

        beacons
    }

    /// Bind nebula events to beacons covered by a chain of overlapping
    /// cluster rectangles.
    fn place_nebula_clusters<R: RandomSource>(
        &self,
        catalog: &Catalog,
        ctx: &mut GenContext,
        rng: &mut R,
        sector: &crate::data::SectorDescription,
        beacons: &mut [Beacon],
    ) -> Result<(), GenError> {
        // Expand the sector's distribution table into a flat multiset of
        // nebula event names, one quantity draw per entry.
        let mut pool: Vec<String> = Vec::new();
        for dist in &sector.event_distributions {
            if !dist.name.starts_with(NEBULA_PREFIX) {
                continue;
            }
            let Some(span) = (dist.max + 1).checked_sub(dist.min).filter(|span| *span > 0) else {
                warn!("nebula distribution {} has inverted bounds", dist.name);
                continue;
            };
            let m = rng.draw() % span + dist.min;
            for _ in 0..m {
                pool.push(dist.name.clone());
            }
        }
        info!("generated {} nebula events", pool.len());

        let mut open: Vec<OpenBeacon> = beacons
            .iter()
            .map(|beacon| OpenBeacon {
                id: beacon.id,
                x: beacon.x,
                y: beacon.y,
                event_id: beacon.event.as_ref().and_then(|event| event.id.clone()),
            })
            .collect();

        // Preset roll happens before the trim loop.
        let mut preset = (rng.draw() as usize) % NEBULA_MODEL_W.len();

        // Keep at least four non-nebula beacons.
        while open.len().saturating_sub(pool.len()) < MIN_OPEN_BEACONS {
            if pool.is_empty() {
                break;
            }
            let k = (rng.draw() as usize) % pool.len();
            pool.remove(k);
        }

        if open.is_empty() {
            return Ok(());
        }

        // First cluster is centered on a uniformly chosen beacon.
        let pick = (rng.draw() as usize) % open.len();
        info!("starting nebula beacon: {pick}");
        let mut w = NEBULA_MODEL_W[preset];
        let mut h = NEBULA_MODEL_H[preset];
        let mut x = open[pick].x - w / 2;
        let mut y = open[pick].y - h / 2;

        let mut rects: SmallVec<[NebulaRect; 8]> = SmallVec::new();
        let mut stalled = 0u32;

        loop {
            let mut covered_new = false;

            let mut i = 0;
            while i < open.len() {
                let inside = open[i].x > x + NEBULA_INSET
                    && open[i].x < x + w - NEBULA_INSET
                    && open[i].y > y + NEBULA_INSET
                    && open[i].y < y + h - NEBULA_INSET;
                if !inside {
                    i += 1;
                    continue;
                }

                let covered = open.remove(i);
                covered_new = true;
                match covered.event_id.as_deref() {
                    None => {
                        let name = if pool.is_empty() {
                            DEFAULT_NEBULA_EVENT.to_string()
                        } else {
                            let ne = (rng.draw() as usize) % pool.len();
                            pool.remove(ne)
                        };
                        beacons[covered.id].event = load_event(catalog, ctx, rng, &name)?;
                        info!(
                            "nebula event at beacon {} ({},{})",
                            covered.id, covered.x, covered.y
                        );
                    }
                    Some(FINISH_BEACON_EVENT) => {
                        beacons[covered.id].event =
                            load_event(catalog, ctx, rng, FINISH_BEACON_NEBULA_EVENT)?;
                        info!("nebula finish event at beacon {}", covered.id);
                    }
                    Some(_) => {}
                }
            }

            if !covered_new {
                stalled += 1;
            }
            rects.push(NebulaRect { x, y, w, h });

            // The chain draws run even on the final pass; the loop
            // condition is only checked afterwards.
            if stalled < NEBULA_STALL_LIMIT {
                // Overlap a new rectangle with a previously placed one.
                let prior = rects[(rng.draw() as usize) % rects.len()];
                preset = (rng.draw() as usize) % NEBULA_MODEL_W.len();
                w = NEBULA_MODEL_W[preset];
                h = NEBULA_MODEL_H[preset];
                x = prior.x - w + (rng.draw() % (prior.w + w) as u32) as i32;
                y = prior.y - h + (rng.draw() % (prior.h + h) as u32) as i32;
            } else {
                // Too many barren passes: recenter on a fresh open
                // beacon, keeping the current preset.
                if open.is_empty() {
                    warn!(
                        "nebula placement ran out of open beacons with {} events left",
                        pool.len()
                    );
                    return Ok(());
                }
                let anchor = &open[(rng.draw() as usize) % open.len()];
                x = anchor.x - w / 2;
                y = anchor.y - h / 2;
            }

            if pool.is_empty() {
                break;
            }
        }

        Ok(())
    }
}

/// Resolve an event id for a beacon; a unique conflict leaves it unbound.
fn load_event<R: RandomSource>(
    catalog: &Catalog,
    ctx: &mut GenContext,
    rng: &mut R,
    id: &str,
) -> Result<Option<ResolvedEvent>, GenError> {
    Ok(EventResolver::new(catalog, ctx, rng)
        .resolve_id(id)?
        .into_event())
}
