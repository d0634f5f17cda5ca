//! Fatal generation errors.
//!
//! Only configuration problems and exhausted retry budgets surface here.
//! The expected soft outcome of re-drawing an already consumed unique
//! event is *not* an error; see [`crate::events::EventOutcome`].

use thiserror::Error;

use crate::data::BlueprintKind;

/// Fatal, non-retryable failure of a generation call.
///
/// Generation is all-or-nothing: when one of these is returned, no partial
/// map or event value exists.
#[derive(Debug, Error)]
pub enum GenError {
    /// The save file format does not map to a supported map variant.
    #[error("sector maps for file format {format} are not supported")]
    UnsupportedFormat { format: u32 },

    /// No layout passed the isolation gate within the attempt budget.
    #[error("no valid map layout after {attempts} attempts")]
    LayoutRejected { attempts: u32 },

    /// The layout kept too few beacons for start/finish placement.
    #[error("layout kept only {beacons} beacons, too few to place mandatory beacons")]
    SparseLayout { beacons: usize },

    /// An event id names neither an event nor an event list.
    #[error("unknown event id {id}")]
    UnknownEvent { id: String },

    /// An event list exists but contains no entries to draw from.
    #[error("event list {id} is empty")]
    EmptyEventList { id: String },

    /// A template references a text list missing from the catalog.
    #[error("unknown text list {id}")]
    UnknownTextList { id: String },

    /// A referenced text list has no entries to draw from.
    #[error("text list {id} is empty")]
    EmptyTextList { id: String },

    /// The generator's sector id has no catalog description.
    #[error("unknown sector description {id}")]
    UnknownSector { id: String },

    /// A directive names a blueprint absent from its category table.
    #[error("unknown {category} blueprint {id}")]
    UnknownBlueprint { category: BlueprintKind, id: String },

    /// A blueprint category has no entries with nonzero effective rarity.
    #[error("no {category} blueprints with nonzero effective rarity")]
    EmptyRarityPool { category: BlueprintKind },
}
