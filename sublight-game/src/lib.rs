//! Sublight Generation Core
//!
//! Platform-agnostic reimplementation of a legacy starship roguelike's
//! sector-map and narrative-event generation. Given the same catalog data
//! and the same pseudo-random draw sequence, it reproduces the original
//! binary's output bit for bit: every draw is positionally significant,
//! including draws whose results are discarded.
//!
//! The crate never defines a random algorithm of its own; callers plug a
//! [`RandomSource`] in (see [`rng`]) and supply catalog data through a
//! [`CatalogLoader`].

pub mod constants;
pub mod context;
pub mod data;
pub mod error;
pub mod events;
pub mod isolation;
pub mod mapgen;
pub mod rarity;
pub mod rng;

// Re-export commonly used types
pub use constants::{ISOLATION_THRESHOLD, MAX_LAYOUT_ATTEMPTS};
pub use context::{Difficulty, GenContext};
pub use data::{
    AutoRewardSpec, BlueprintEntry, BlueprintKind, Catalog, ChoiceTemplate, CrewDirective,
    EventDistribution, EventList, EventTemplate, ItemDirective, ItemOffer, RarityOverride,
    SectorDescription, ShipDirective, TextList, TextRef,
};
pub use error::GenError;
pub use events::{
    EventOutcome, EventResolver, ResolvedChoice, ResolvedCrew, ResolvedEvent, ResolvedOffer,
    ResolvedReward, ResolvedShip, SkillPlan,
};
pub use isolation::max_isolation;
pub use mapgen::{Beacon, GeneratedMap, GridCfg, MapFormat, SectorMapGenerator};
pub use rarity::{RarityCache, RarityTable};
pub use rng::{AdapterSource, CountingSource, DRAW_MASK, RandomSource, ScriptedSource};

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the full data catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog data cannot be loaded.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Main entry point tying a catalog source to the generation core.
pub struct GenEngine<L>
where
    L: CatalogLoader,
{
    catalog_loader: L,
}

impl<L> GenEngine<L>
where
    L: CatalogLoader,
{
    /// Create a new engine with the provided catalog loader.
    pub const fn new(catalog_loader: L) -> Self {
        Self { catalog_loader }
    }

    /// Generate a sector map for a save file format number.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded, the format is
    /// unsupported, or generation fails.
    pub fn generate_map<R: RandomSource>(
        &self,
        generator: &SectorMapGenerator,
        rng: &mut R,
        file_format: u32,
    ) -> Result<GeneratedMap, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.catalog_loader.load_catalog().map_err(Into::into)?;
        let format = MapFormat::from_file_format(file_format)?;
        Ok(generator.generate(&catalog, rng, format)?)
    }

    /// Resolve a single event id against a freshly loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or resolution
    /// hits missing catalog data.
    pub fn resolve_event<R: RandomSource>(
        &self,
        ctx: &mut GenContext,
        rng: &mut R,
        event_id: &str,
    ) -> Result<EventOutcome, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.catalog_loader.load_catalog().map_err(Into::into)?;
        let outcome = EventResolver::new(&catalog, ctx, rng).resolve_id(event_id)?;
        Ok(outcome)
    }
}
