//! Immutable catalog data model.
//!
//! Templates loaded here are never mutated by generation: resolution
//! produces derived values instead. Loading the real game assets into this
//! model is a platform concern (see [`crate::CatalogLoader`]); the core
//! only consumes an already-parsed [`Catalog`].

use serde::{Deserialize, Serialize};

/// Reference to display text: either an inline string or a named text
/// list to draw from at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextRef {
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Ordered sequence of texts selected by uniform index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextList {
    pub id: String,
    #[serde(default)]
    pub texts: Vec<String>,
}

/// Declared `[min, max]` quantity range for one offered resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOffer {
    pub kind: String,
    #[serde(default)]
    pub min: u32,
    #[serde(default)]
    pub max: u32,
}

const fn unset_skill() -> i32 {
    -1
}

/// Crew granted by an event.
///
/// Skill fields use -1 as the "unset" sentinel the original data carries;
/// when all of them are unset the resolver draws a random skill plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewDirective {
    #[serde(default)]
    pub amount: i32,
    /// Species id, or the sentinels `random` / `traitor`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "unset_skill")]
    pub weapons: i32,
    #[serde(default = "unset_skill")]
    pub shields: i32,
    #[serde(default = "unset_skill")]
    pub pilot: i32,
    #[serde(default = "unset_skill")]
    pub engines: i32,
    #[serde(default = "unset_skill")]
    pub combat: i32,
    #[serde(default = "unset_skill")]
    pub repair: i32,
    #[serde(default = "unset_skill")]
    pub all_skills: i32,
}

impl CrewDirective {
    /// True when any skill field was set explicitly in the data.
    #[must_use]
    pub const fn has_explicit_skills(&self) -> bool {
        self.weapons != -1
            || self.shields != -1
            || self.pilot != -1
            || self.engines != -1
            || self.combat != -1
            || self.repair != -1
            || self.all_skills != -1
    }
}

/// Weapon/augment/drone granted by an event; `RANDOM` defers the pick to
/// the rarity sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemDirective {
    #[serde(default)]
    pub name: Option<String>,
}

/// Automatic reward block: a level label and a reward kind string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AutoRewardSpec {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub reward: String,
}

/// Hostile/neutral ship attached to an event. Only the seed draw is
/// interpreted here; the rest rides along for downstream ship generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShipDirective {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub auto_blueprint: Option<String>,
    #[serde(default)]
    pub hostile: bool,
}

/// A player choice nested in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceTemplate {
    #[serde(default)]
    pub text: Option<TextRef>,
    pub event: EventTemplate,
}

/// An event template as declared in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventTemplate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub unique: bool,
    /// Redirect: resolve this id instead of the template body.
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub text: Option<TextRef>,
    #[serde(default)]
    pub offers: Vec<ItemOffer>,
    #[serde(default)]
    pub crew: Option<CrewDirective>,
    #[serde(default)]
    pub weapon: Option<ItemDirective>,
    #[serde(default)]
    pub augment: Option<ItemDirective>,
    #[serde(default)]
    pub drone: Option<ItemDirective>,
    #[serde(default)]
    pub auto_reward: Option<AutoRewardSpec>,
    #[serde(default)]
    pub ship: Option<ShipDirective>,
    #[serde(default)]
    pub choices: Vec<ChoiceTemplate>,
}

/// Ordered pool of event templates selected by uniform index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventList {
    pub id: String,
    #[serde(default)]
    pub events: Vec<EventTemplate>,
}

/// Blueprint categories the rarity sampler operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlueprintKind {
    Crew,
    Weapon,
    Drone,
    Augment,
}

impl BlueprintKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crew => "crew",
            Self::Weapon => "weapon",
            Self::Drone => "drone",
            Self::Augment => "augment",
        }
    }
}

impl std::fmt::Display for BlueprintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog blueprint with its declared rarity.
///
/// `sprite_layers` is the crew-specific visual layer count; other
/// categories leave it 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintEntry {
    pub id: String,
    #[serde(default)]
    pub rarity: i32,
    #[serde(default)]
    pub sprite_layers: u32,
}

/// Sector-scoped rarity override for a single blueprint id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityOverride {
    pub id: String,
    pub rarity: i32,
}

/// One entry of a sector's event distribution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDistribution {
    pub name: String,
    #[serde(default)]
    pub min: u32,
    #[serde(default)]
    pub max: u32,
}

/// Static description of a sector type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorDescription {
    pub id: String,
    #[serde(default)]
    pub start_event: String,
    #[serde(default)]
    pub rarities: Vec<RarityOverride>,
    #[serde(default)]
    pub event_distributions: Vec<EventDistribution>,
}

impl SectorDescription {
    /// Sector override for a blueprint id, if one is declared.
    #[must_use]
    pub fn rarity_override(&self, id: &str) -> Option<i32> {
        self.rarities
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.rarity)
    }
}

/// The full data catalog generation reads from.
///
/// Blueprint tables keep declaration order; the rarity sampler walks them
/// in that order, which is what makes a catalog + seed fully reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub events: Vec<EventTemplate>,
    #[serde(default)]
    pub event_lists: Vec<EventList>,
    #[serde(default)]
    pub text_lists: Vec<TextList>,
    #[serde(default)]
    pub crew: Vec<BlueprintEntry>,
    #[serde(default)]
    pub weapons: Vec<BlueprintEntry>,
    #[serde(default)]
    pub drones: Vec<BlueprintEntry>,
    #[serde(default)]
    pub augments: Vec<BlueprintEntry>,
    #[serde(default)]
    pub sectors: Vec<SectorDescription>,
}

impl Catalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid catalog
    /// data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn event(&self, id: &str) -> Option<&EventTemplate> {
        self.events
            .iter()
            .find(|event| event.id.as_deref() == Some(id))
    }

    #[must_use]
    pub fn event_list(&self, id: &str) -> Option<&EventList> {
        self.event_lists.iter().find(|list| list.id == id)
    }

    #[must_use]
    pub fn text_list(&self, id: &str) -> Option<&TextList> {
        self.text_lists.iter().find(|list| list.id == id)
    }

    #[must_use]
    pub fn sector(&self, id: &str) -> Option<&SectorDescription> {
        self.sectors.iter().find(|sector| sector.id == id)
    }

    /// The blueprint table for a category, in declaration order.
    #[must_use]
    pub fn blueprints(&self, kind: BlueprintKind) -> &[BlueprintEntry] {
        match kind {
            BlueprintKind::Crew => &self.crew,
            BlueprintKind::Weapon => &self.weapons,
            BlueprintKind::Drone => &self.drones,
            BlueprintKind::Augment => &self.augments,
        }
    }

    #[must_use]
    pub fn blueprint(&self, kind: BlueprintKind, id: &str) -> Option<&BlueprintEntry> {
        self.blueprints(kind).iter().find(|entry| entry.id == id)
    }
}
