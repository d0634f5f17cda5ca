//! Event template resolution.
//!
//! Resolution expands an immutable catalog template into a fully resolved
//! event value, consuming pseudo-random draws in a fixed order. The order
//! is load-bearing: several steps draw values whose results are discarded,
//! and skipping or reordering any of them desynchronizes every draw that
//! follows. Each step below is annotated with what it consumes.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CREW_NAME_PLACEHOLDER, ITEM_OFFER_BUDGET, ITEM_RANDOM, REWARD_DRONEPARTS_MAX,
    REWARD_DRONEPARTS_MIN, REWARD_FUEL_MAX, REWARD_FUEL_MIN, REWARD_MISSILES_MAX,
    REWARD_MISSILES_MIN, REWARD_SCRAP_MAX, REWARD_SCRAP_MIN, REWARD_UPGRADE_PCT_STANDARD,
    REWARD_UPGRADE_PCT_STUFF, SCRAP_SECTOR_OFFSET, SCRAP_SECTOR_SCALE, SKILL_AMOUNT_MAX,
    SKILL_AMOUNT_MIN, SKILL_SLOTS, SPECIES_RANDOM, SPECIES_TRAITOR, TRAILING_DRAW_MAX,
    TRAILING_DRAW_MIN,
};
use crate::context::GenContext;
use crate::data::{
    AutoRewardSpec, BlueprintKind, Catalog, CrewDirective, EventTemplate, ItemDirective, TextRef,
};
use crate::error::GenError;
use crate::rng::RandomSource;

/// Secondary reward resources, in slot order.
const REWARD_RESOURCES: [&str; 3] = ["fuel", "missiles", "droneparts"];

/// A resource quantity the event will offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOffer {
    pub kind: String,
    pub amount: u32,
}

/// Randomly drawn crew skill plan.
///
/// The two skill indices and the amount are drawn exactly as the original
/// does, but how the per-point draws map onto stat increments has not been
/// verified against the binary, so the plan is surfaced without applying
/// any increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPlan {
    pub amount: u32,
    pub first: u32,
    pub second: u32,
}

/// Crew granted by a resolved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCrew {
    pub count: i32,
    /// Resolved species id; `None` for the unresolved `traitor` sentinel.
    pub species: Option<String>,
    pub name: String,
    pub skill_plan: Option<SkillPlan>,
}

/// Automatic reward after quantity and item rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResolvedReward {
    pub kind: String,
    pub level: u32,
    pub scrap: i32,
    /// fuel / missiles / drone parts, in slot order.
    pub resources: [i32; 3],
    pub weapon: Option<String>,
    pub augment: Option<String>,
    pub drone: Option<String>,
}

/// Ship attached to a resolved event; the seed drives downstream
/// ship-specific generation and is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResolvedShip {
    pub seed: u32,
    pub name: Option<String>,
    /// Ship template reference for downstream ship generation.
    pub load: Option<String>,
    pub auto_blueprint: Option<String>,
    pub hostile: bool,
}

/// A resolved player choice. A nested unique conflict leaves the event
/// unset; callers re-draw explicitly if they need one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResolvedChoice {
    pub text: Option<String>,
    pub event: Option<ResolvedEvent>,
}

/// A fully resolved event, derived from a catalog template without
/// mutating it. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResolvedEvent {
    pub id: Option<String>,
    pub text: Option<String>,
    pub offers: Vec<ResolvedOffer>,
    pub crew: Option<ResolvedCrew>,
    pub weapon: Option<String>,
    pub augment: Option<String>,
    pub drone: Option<String>,
    pub reward: Option<ResolvedReward>,
    pub ship: Option<ResolvedShip>,
    pub choices: Vec<ResolvedChoice>,
}

/// Outcome of resolving a template.
///
/// `UniqueConflict` is the expected soft signal that a unique event was
/// already consumed this session; it is distinct from [`GenError`] so
/// callers can re-draw without treating it as corruption.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Event(ResolvedEvent),
    UniqueConflict,
}

impl EventOutcome {
    #[must_use]
    pub fn into_event(self) -> Option<ResolvedEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::UniqueConflict => None,
        }
    }

    #[must_use]
    pub const fn is_unique_conflict(&self) -> bool {
        matches!(self, Self::UniqueConflict)
    }
}

/// Resolves event templates against a catalog, a per-run context and a
/// shared draw source.
pub struct EventResolver<'a, R: RandomSource> {
    catalog: &'a Catalog,
    ctx: &'a mut GenContext,
    rng: &'a mut R,
}

impl<'a, R: RandomSource> EventResolver<'a, R> {
    pub fn new(catalog: &'a Catalog, ctx: &'a mut GenContext, rng: &'a mut R) -> Self {
        Self { catalog, ctx, rng }
    }

    /// Resolve an id naming either an event list or a single event.
    ///
    /// List entries are re-drawn until one resolves. The redraw loop is
    /// unbounded, matching the original: a list consisting entirely of
    /// already-consumed unique events never terminates.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the id is unknown or resolution
    /// hits missing catalog data.
    pub fn resolve_id(&mut self, id: &str) -> Result<EventOutcome, GenError> {
        info!("load event id {id}");
        let catalog = self.catalog;

        if let Some(list) = catalog.event_list(id) {
            if list.events.is_empty() {
                return Err(GenError::EmptyEventList { id: id.to_string() });
            }
            loop {
                let e = self.rng.draw() as usize % list.events.len();
                match self.resolve(&list.events[e])? {
                    EventOutcome::UniqueConflict => debug!("unique conflict, re-drawing from {id}"),
                    outcome => return Ok(outcome),
                }
            }
        }

        let template = catalog
            .event(id)
            .ok_or_else(|| GenError::UnknownEvent { id: id.to_string() })?;
        self.resolve(template)
    }

    /// Resolve a single template. Step order is fixed; see module docs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on missing/empty text lists or
    /// unknown blueprint and event references.
    pub fn resolve(&mut self, template: &EventTemplate) -> Result<EventOutcome, GenError> {
        debug!("resolve event {:?}", template.id);

        // Unique events resolve at most once per session; a conflict
        // records nothing.
        if template.unique
            && let Some(id) = template.id.as_deref()
            && !self.ctx.mark_unique(id)
        {
            return Ok(EventOutcome::UniqueConflict);
        }

        // A load reference delegates the entire resolution.
        if let Some(load) = template.load.as_deref() {
            return self.resolve_id(load);
        }

        let text = match template.text.as_ref() {
            Some(tref) => self.bind_text(tref)?,
            None => None,
        };

        let offers = self.roll_offers(template);

        let crew = match template.crew.as_ref() {
            Some(spec) if spec.amount > 0 => Some(self.resolve_crew(spec)?),
            _ => None,
        };

        let weapon = self.resolve_item(template.weapon.as_ref(), BlueprintKind::Weapon)?;
        let augment = self.resolve_item(template.augment.as_ref(), BlueprintKind::Augment)?;
        let drone = self.resolve_item(template.drone.as_ref(), BlueprintKind::Drone)?;

        let reward = match template.auto_reward.as_ref() {
            Some(spec) => Some(self.resolve_reward(spec)?),
            None => None,
        };

        let ship = template.ship.as_ref().map(|directive| ResolvedShip {
            seed: self.rng.draw(),
            name: directive.name.clone(),
            load: directive.load.clone(),
            auto_blueprint: directive.auto_blueprint.clone(),
            hostile: directive.hostile,
        });

        let mut choices = Vec::with_capacity(template.choices.len());
        for choice in &template.choices {
            let choice_text = match choice.text.as_ref() {
                Some(tref) => self.bind_text(tref)?,
                None => None,
            };
            let event = self.resolve_choice_event(&choice.event)?.into_event();
            choices.push(ResolvedChoice {
                text: choice_text,
                event,
            });
        }

        // Unconditional trailing draw; the game folds it into a small
        // range and discards the result, but the position matters.
        let n = self.rng.draw();
        debug!(
            "trailing draw {}",
            n % (TRAILING_DRAW_MAX + 1 - TRAILING_DRAW_MIN) + TRAILING_DRAW_MIN
        );

        Ok(EventOutcome::Event(ResolvedEvent {
            id: template.id.clone(),
            text,
            offers,
            crew,
            weapon,
            augment,
            drone,
            reward,
            ship,
            choices,
        }))
    }

    /// Resolve a choice's nested event, applying the data fix where an
    /// event carrying an explicit id resolves by that id (at least one
    /// stock entry fills `name` where it means `load`).
    fn resolve_choice_event(&mut self, nested: &EventTemplate) -> Result<EventOutcome, GenError> {
        if let Some(id) = nested.id.as_deref() {
            if nested.unique && !self.ctx.mark_unique(id) {
                return Ok(EventOutcome::UniqueConflict);
            }
            return self.resolve_id(id);
        }
        self.resolve(nested)
    }

    /// Bind a text reference, drawing a uniform index when it names a
    /// text list.
    fn bind_text(&mut self, tref: &TextRef) -> Result<Option<String>, GenError> {
        let catalog = self.catalog;
        let Some(list_id) = tref.load.as_deref() else {
            return Ok(tref.text.clone());
        };
        let list = catalog
            .text_list(list_id)
            .ok_or_else(|| GenError::UnknownTextList {
                id: list_id.to_string(),
            })?;
        if list.texts.is_empty() {
            return Err(GenError::EmptyTextList {
                id: list_id.to_string(),
            });
        }
        let n = self.rng.draw() as usize % list.texts.len();
        Ok(Some(list.texts[n].clone()))
    }

    /// Resource-offer randomization: one eligibility draw per kind in the
    /// fixed order missiles, drones, fuel, scrap, whether or not the
    /// template declares that kind. The eligibility masks differ per kind
    /// exactly as in the original; with the budget starting at 100 they
    /// always pass, but the draws still advance the sequence.
    fn roll_offers(&mut self, template: &EventTemplate) -> Vec<ResolvedOffer> {
        let mut budget = ITEM_OFFER_BUDGET;
        let mut offers = Vec::new();

        let n = self.rng.draw();
        if (n & 3) < budget
            && let Some(amount) = self.offer_quantity(template, "missiles")
        {
            if amount > 0 {
                budget -= 1;
            }
            offers.push(ResolvedOffer {
                kind: "missiles".to_string(),
                amount,
            });
        }

        let n = self.rng.draw();
        if (n % 3) < budget
            && let Some(amount) = self.offer_quantity(template, "drones")
        {
            if amount > 0 {
                budget -= 1;
            }
            offers.push(ResolvedOffer {
                kind: "drones".to_string(),
                amount,
            });
        }

        let n = self.rng.draw();
        if (n & 1) < budget
            && let Some(amount) = self.offer_quantity(template, "fuel")
        {
            if amount > 0 {
                budget -= 1;
            }
            offers.push(ResolvedOffer {
                kind: "fuel".to_string(),
                amount,
            });
        }

        self.rng.draw();
        if budget > 0
            && let Some(amount) = self.offer_quantity(template, "scrap")
        {
            offers.push(ResolvedOffer {
                kind: "scrap".to_string(),
                amount,
            });
        }

        offers
    }

    /// Draw a quantity for one offered kind, if the template declares it
    /// with a nonzero maximum. Undeclared kinds consume no draw.
    fn offer_quantity(&mut self, template: &EventTemplate, kind: &str) -> Option<u32> {
        let offer = template.offers.iter().find(|offer| offer.kind == kind)?;
        if offer.max == 0 {
            return None;
        }
        let span = (offer.max + 1).saturating_sub(offer.min).max(1);
        let amount = self.rng.draw() % span + offer.min;
        debug!("random quantity of {kind} is {amount}");
        Some(amount)
    }

    fn pick_blueprint(&mut self, kind: BlueprintKind) -> Result<String, GenError> {
        let catalog = self.catalog;
        let sector = catalog.sector(self.ctx.sector_id());
        self.ctx
            .rarity
            .pick(catalog, sector, kind, &mut *self.rng)
    }

    /// Replace a `RANDOM` item directive with a rarity-sampled id;
    /// explicit names pass through untouched.
    fn resolve_item(
        &mut self,
        directive: Option<&ItemDirective>,
        kind: BlueprintKind,
    ) -> Result<Option<String>, GenError> {
        let Some(directive) = directive else {
            return Ok(None);
        };
        match directive.name.as_deref() {
            Some(ITEM_RANDOM) => Ok(Some(self.pick_blueprint(kind)?)),
            other => Ok(other.map(String::from)),
        }
    }

    fn resolve_crew(&mut self, spec: &CrewDirective) -> Result<ResolvedCrew, GenError> {
        info!("generating crew member");
        let catalog = self.catalog;
        let requested = spec.id.as_deref().unwrap_or(SPECIES_RANDOM);

        let mut species = None;
        let mut blueprint = None;
        if requested == SPECIES_TRAITOR {
            // Observed in data, never with a positive count in practice.
            warn!("traitor crew directive with positive count; species left unresolved");
        } else if requested == SPECIES_RANDOM {
            let id = self.pick_blueprint(BlueprintKind::Crew)?;
            debug!("generated crew species {id}");
            blueprint = catalog.blueprint(BlueprintKind::Crew, &id);
            species = Some(id);
        } else {
            blueprint = Some(catalog.blueprint(BlueprintKind::Crew, requested).ok_or_else(
                || GenError::UnknownBlueprint {
                    category: BlueprintKind::Crew,
                    id: requested.to_string(),
                },
            )?);
            // Name pre-roll the game performs here and later overwrites.
            self.rng.draw();
            species = Some(requested.to_string());
        }

        // One discarded draw per visual tint layer of the resolved
        // species; the traitor sentinel has none.
        if let Some(entry) = blueprint {
            for _ in 0..entry.sprite_layers {
                self.rng.draw();
            }
        }

        let name = if spec.name.is_empty() {
            self.rng.draw();
            CREW_NAME_PLACEHOLDER.to_string()
        } else {
            spec.name.clone()
        };

        let skill_plan = if spec.has_explicit_skills() {
            None
        } else {
            let idx = self.ctx.adjusted_sector_number() as usize;
            let min = SKILL_AMOUNT_MIN[idx];
            let max = SKILL_AMOUNT_MAX[idx];
            let amount = min + self.rng.draw() % (max + 1 - min);

            let first = self.rng.draw() % SKILL_SLOTS;
            let mut second = self.rng.draw() % SKILL_SLOTS;
            while second == first {
                second = self.rng.draw() % SKILL_SLOTS;
            }

            // One draw per point. How the points land on the two chosen
            // skills is unverified, so the plan is surfaced unapplied.
            for _ in 0..amount {
                self.rng.draw();
            }
            Some(SkillPlan {
                amount,
                first,
                second,
            })
        };

        Ok(ResolvedCrew {
            count: spec.amount,
            species,
            name,
            skill_plan,
        })
    }

    fn resolve_reward(&mut self, spec: &AutoRewardSpec) -> Result<ResolvedReward, GenError> {
        info!(
            "generating auto reward, level {} kind {}",
            spec.level, spec.reward
        );
        let sector_level = self.ctx.adjusted_sector_number();

        let level = match spec.level.as_str() {
            "LOW" => 0,
            "MED" => 1,
            "HIGH" => 2,
            // RANDOM, plus any unrecognized label: the stock data carries
            // at least one MEDIUM typo that falls through to a roll.
            _ => (self.rng.draw() % 3) as usize,
        };

        let mut kind = spec.reward.clone();
        let mut scrap = 0i32;
        let mut resources = [0i32; 3];
        let mut upgrade = false;

        match kind.as_str() {
            "standard" => {
                scrap = self.reward_quantity("scrap", level, sector_level);
                let (one, two) = self.pick_two_resources();
                resources[one] = self.reward_quantity(REWARD_RESOURCES[one], 0, 0);
                resources[two] = self.reward_quantity(REWARD_RESOURCES[two], 0, 0);
                upgrade = self.rng.draw() % 100 < REWARD_UPGRADE_PCT_STANDARD;
            }
            "stuff" => {
                scrap = self.reward_quantity("scrap", 0, sector_level);
                let (one, two) = self.pick_two_resources();
                resources[one] = self.reward_quantity(REWARD_RESOURCES[one], level, 0);
                resources[two] = self.reward_quantity(REWARD_RESOURCES[two], level, 0);
                upgrade = self.rng.draw() % 100 < REWARD_UPGRADE_PCT_STUFF;
            }
            "scrap_only" => scrap = self.reward_quantity("scrap", level, sector_level),
            "fuel" => {
                scrap = self.reward_quantity("scrap", level, sector_level);
                resources[0] = self.reward_quantity("fuel", level, 0);
            }
            "missiles" => {
                scrap = self.reward_quantity("scrap", level, sector_level);
                resources[1] = self.reward_quantity("missiles", level, 0);
            }
            "droneparts" => {
                scrap = self.reward_quantity("scrap", level, sector_level);
                resources[2] = self.reward_quantity("droneparts", level, 0);
            }
            "fuel_only" => resources[0] = self.reward_quantity("fuel", level, 0),
            "missiles_only" => resources[1] = self.reward_quantity("missiles", level, 0),
            "droneparts_only" => resources[2] = self.reward_quantity("droneparts", level, 0),
            _ => {}
        }

        if upgrade {
            kind = match self.rng.draw() % 3 {
                0 => "weapon",
                1 => "drone",
                _ => "augment",
            }
            .to_string();
        }

        let mut weapon = None;
        let mut augment = None;
        let mut drone = None;
        match kind.as_str() {
            "weapon" => {
                weapon = Some(self.pick_blueprint(BlueprintKind::Weapon)?);
                scrap = self.reward_quantity("scrap", level, sector_level);
            }
            "augment" => {
                augment = Some(self.pick_blueprint(BlueprintKind::Augment)?);
                scrap = self.reward_quantity("scrap", level, sector_level);
            }
            "drone" => {
                drone = Some(self.pick_blueprint(BlueprintKind::Drone)?);
                scrap = self.reward_quantity("scrap", level, sector_level);
            }
            _ => {}
        }

        Ok(ResolvedReward {
            kind,
            level: level as u32,
            scrap,
            resources,
            weapon,
            augment,
            drone,
        })
    }

    /// Two distinct secondary resource slots, second re-drawn until
    /// distinct from the first.
    fn pick_two_resources(&mut self) -> (usize, usize) {
        let one = (self.rng.draw() % 3) as usize;
        let mut two = (self.rng.draw() % 3) as usize;
        while two == one {
            two = (self.rng.draw() % 3) as usize;
        }
        (one, two)
    }

    /// Reward quantity for one resource at a reward level.
    ///
    /// Scrap goes through single-precision thousandths exactly as the
    /// original computes it, then scales by the sector factor; other
    /// resources draw a plain uniform integer in their level's range.
    fn reward_quantity(&mut self, resource: &str, level: usize, sector_level: u32) -> i32 {
        if resource == "scrap" {
            let min_t = (REWARD_SCRAP_MIN[level] * 1000.0) as i32;
            let max_t = (REWARD_SCRAP_MAX[level] * 1000.0) as i32;
            let range = (max_t + 1 - min_t) as u32;
            let qint = min_t + (self.rng.draw() % range) as i32;
            let scale = sector_level as i32 * SCRAP_SECTOR_SCALE + SCRAP_SECTOR_OFFSET;
            let quantity = ((qint as f32 / 1000.0) * scale as f32) as i32;
            debug!("auto reward scrap: {quantity}");
            return quantity;
        }

        let (min, max) = match resource {
            "fuel" => (REWARD_FUEL_MIN[level], REWARD_FUEL_MAX[level]),
            "missiles" => (REWARD_MISSILES_MIN[level], REWARD_MISSILES_MAX[level]),
            "droneparts" => (REWARD_DRONEPARTS_MIN[level], REWARD_DRONEPARTS_MAX[level]),
            _ => (0, 0),
        };
        let quantity = min + (self.rng.draw() % (max + 1 - min) as u32) as i32;
        debug!("auto reward {resource}: {quantity}");
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Difficulty;
    use crate::data::{BlueprintEntry, ChoiceTemplate, EventList, ItemOffer, ShipDirective, TextList};
    use crate::rng::{CountingSource, ScriptedSource};

    fn ctx() -> GenContext {
        GenContext::new("STANDARD_SPACE", 0, Difficulty::Normal)
    }

    fn plain_event(id: &str) -> EventTemplate {
        EventTemplate {
            id: Some(id.to_string()),
            ..EventTemplate::default()
        }
    }

    #[test]
    fn minimal_event_consumes_five_draws() {
        // Four offer eligibility draws plus the trailing draw.
        let catalog = Catalog::empty();
        let mut session = ctx();
        let mut rng = CountingSource::new(ScriptedSource::new([0; 5]));
        let template = plain_event("EMPTY_BEACON");

        let outcome = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap();
        let event = outcome.into_event().unwrap();
        assert_eq!(event.id.as_deref(), Some("EMPTY_BEACON"));
        assert_eq!(rng.draws(), 5);
    }

    #[test]
    fn unique_conflict_consumes_no_draws_and_records_nothing() {
        let catalog = Catalog::empty();
        let mut session = ctx();
        let mut template = plain_event("QUEST_ARTIFACT");
        template.unique = true;

        let mut rng = CountingSource::new(ScriptedSource::new([0; 5]));
        let first = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap();
        assert!(!first.is_unique_conflict());
        assert_eq!(rng.draws(), 5);

        let mut rng = CountingSource::new(ScriptedSource::new([0; 5]));
        let second = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap();
        assert!(second.is_unique_conflict());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn text_list_binding_draws_uniform_index() {
        let catalog = Catalog {
            text_lists: vec![TextList {
                id: "HAIL_TEXTS".to_string(),
                texts: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            }],
            ..Catalog::default()
        };
        let mut session = ctx();
        let mut template = plain_event("HAIL");
        template.text = Some(TextRef {
            load: Some("HAIL_TEXTS".to_string()),
            text: None,
        });

        // text index, four offers, trailing.
        let mut rng = ScriptedSource::new([1, 0, 0, 0, 0, 9]);
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(event.text.as_deref(), Some("b"));
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn missing_text_list_is_fatal() {
        let catalog = Catalog::empty();
        let mut session = ctx();
        let mut template = plain_event("HAIL");
        template.text = Some(TextRef {
            load: Some("NO_SUCH_LIST".to_string()),
            text: None,
        });
        let mut rng = ScriptedSource::new([0; 8]);
        let err = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap_err();
        assert!(matches!(err, GenError::UnknownTextList { .. }));
    }

    #[test]
    fn declared_offer_draws_quantity_in_range() {
        let catalog = Catalog::empty();
        let mut session = ctx();
        let mut template = plain_event("CACHE");
        template.offers = vec![ItemOffer {
            kind: "missiles".to_string(),
            min: 1,
            max: 3,
        }];

        // missiles eligibility, missiles quantity, three more
        // eligibility draws, trailing.
        let mut rng = ScriptedSource::new([0, 2, 0, 0, 0, 0]);
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(
            event.offers,
            vec![ResolvedOffer {
                kind: "missiles".to_string(),
                amount: 3,
            }]
        );
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn event_list_redraws_past_unique_conflicts() {
        let mut unique = plain_event("POOL_UNIQUE");
        unique.unique = true;
        let normal = plain_event("POOL_NORMAL");
        let catalog = Catalog {
            event_lists: vec![EventList {
                id: "POOL".to_string(),
                events: vec![unique, normal],
            }],
            ..Catalog::default()
        };
        let mut session = ctx();

        // First pass consumes the unique entry.
        let mut rng = ScriptedSource::new([0, 0, 0, 0, 0, 0]);
        let first = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve_id("POOL")
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(first.id.as_deref(), Some("POOL_UNIQUE"));

        // Second pass hits the conflict at index 0 and re-draws index 1.
        let mut rng = CountingSource::new(ScriptedSource::new([0, 1, 0, 0, 0, 0, 0]));
        let second = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve_id("POOL")
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(second.id.as_deref(), Some("POOL_NORMAL"));
        assert_eq!(rng.draws(), 7);
    }

    #[test]
    fn random_crew_resolves_species_and_skill_plan() {
        let catalog = Catalog {
            crew: vec![BlueprintEntry {
                id: "human".to_string(),
                rarity: 1,
                sprite_layers: 2,
            }],
            ..Catalog::default()
        };
        let mut session = ctx();
        let mut template = plain_event("CREW_GIFT");
        template.crew = Some(CrewDirective {
            amount: 1,
            id: Some("random".to_string()),
            name: String::new(),
            weapons: -1,
            shields: -1,
            pilot: -1,
            engines: -1,
            combat: -1,
            repair: -1,
            all_skills: -1,
        });

        // offers x4, species pick, layers x2, name, skill amount,
        // skill one, skill two, trailing.
        let script = [0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 4, 0];
        let mut rng = CountingSource::new(ScriptedSource::new(script));
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();

        let crew = event.crew.unwrap();
        assert_eq!(crew.species.as_deref(), Some("human"));
        assert_eq!(crew.name, CREW_NAME_PLACEHOLDER);
        assert_eq!(
            crew.skill_plan,
            Some(SkillPlan {
                amount: 0,
                first: 2,
                second: 4,
            })
        );
        assert_eq!(rng.draws(), 12);
    }

    #[test]
    fn explicit_crew_keeps_name_and_draws_name_preroll() {
        let catalog = Catalog {
            crew: vec![BlueprintEntry {
                id: "human".to_string(),
                rarity: 1,
                sprite_layers: 2,
            }],
            ..Catalog::default()
        };
        let mut session = ctx();
        let mut template = plain_event("CREW_GIFT");
        template.crew = Some(CrewDirective {
            amount: 1,
            id: Some("human".to_string()),
            name: "Kazaaak".to_string(),
            weapons: -1,
            shields: -1,
            pilot: 1,
            engines: -1,
            combat: -1,
            repair: -1,
            all_skills: -1,
        });

        // offers x4, name pre-roll, layers x2, trailing.
        let mut rng = CountingSource::new(ScriptedSource::new([0; 8]));
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();
        let crew = event.crew.unwrap();
        assert_eq!(crew.species.as_deref(), Some("human"));
        assert_eq!(crew.name, "Kazaaak");
        assert!(crew.skill_plan.is_none());
        assert_eq!(rng.draws(), 8);
    }

    #[test]
    fn traitor_crew_stays_unresolved_without_species_draws() {
        let catalog = Catalog::empty();
        let mut session = ctx();
        let mut template = plain_event("TRAITOR_EVENT");
        template.crew = Some(CrewDirective {
            amount: 1,
            id: Some("traitor".to_string()),
            name: String::new(),
            weapons: -1,
            shields: -1,
            pilot: -1,
            engines: -1,
            combat: -1,
            repair: -1,
            all_skills: -1,
        });

        // offers x4, name, skill amount, skill one, skill two, trailing.
        let mut rng = CountingSource::new(ScriptedSource::new([0, 0, 0, 0, 0, 0, 1, 3, 0]));
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();
        assert!(event.crew.unwrap().species.is_none());
        assert_eq!(rng.draws(), 9);
    }

    #[test]
    fn standard_reward_hand_trace() {
        let catalog = Catalog::empty();
        let mut session = ctx();
        let mut template = plain_event("PIRATE_SURRENDER");
        template.auto_reward = Some(AutoRewardSpec {
            level: "MED".to_string(),
            reward: "standard".to_string(),
        });

        // offers x4; scrap qint 800+200=1000 -> 15 at sector 0;
        // resources fuel(0) and missiles(1); fuel 1+2=3; missiles 1+1=2;
        // upgrade roll 50 fails; trailing.
        let script = [0, 0, 0, 0, 200, 0, 1, 2, 1, 50, 0];
        let mut rng = ScriptedSource::new(script);
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();

        let reward = event.reward.unwrap();
        assert_eq!(reward.kind, "standard");
        assert_eq!(reward.level, 1);
        assert_eq!(reward.scrap, 15);
        assert_eq!(reward.resources, [3, 2, 0]);
        assert!(reward.weapon.is_none());
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn stuff_reward_upgrades_to_drone() {
        let catalog = Catalog {
            drones: vec![BlueprintEntry {
                id: "DEFENSE_1".to_string(),
                rarity: 1,
                sprite_layers: 0,
            }],
            ..Catalog::default()
        };
        let mut session = ctx();
        let mut template = plain_event("SMUGGLER_STASH");
        template.auto_reward = Some(AutoRewardSpec {
            level: "LOW".to_string(),
            reward: "stuff".to_string(),
        });

        // offers x4; scrap 500 -> 7; resources droneparts(2) then a
        // redraw collision then fuel(0); droneparts 1; fuel 1; upgrade
        // roll 5 < 6; upgrade pick 1 -> drone; drone sample; scrap
        // recompute 700 -> 10; trailing.
        let script = [0, 0, 0, 0, 0, 2, 2, 0, 0, 0, 5, 1, 0, 200, 0];
        let mut rng = ScriptedSource::new(script);
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();

        let reward = event.reward.unwrap();
        assert_eq!(reward.kind, "drone");
        assert_eq!(reward.drone.as_deref(), Some("DEFENSE_1"));
        assert_eq!(reward.scrap, 10);
        assert_eq!(reward.resources, [1, 0, 1]);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn choice_id_doubles_as_load_reference() {
        let target = plain_event("TARGET");
        let mut parent = plain_event("PARENT");
        parent.ship = Some(ShipDirective {
            name: Some("Redshift".to_string()),
            load: Some("PIRATE_SHIP".to_string()),
            auto_blueprint: Some("PIRATE_SCOUT".to_string()),
            hostile: true,
        });
        parent.choices = vec![ChoiceTemplate {
            text: None,
            event: plain_event("TARGET"),
        }];
        let catalog = Catalog {
            events: vec![target, parent.clone()],
            ..Catalog::default()
        };
        let mut session = ctx();

        // offers x4, ship seed, nested TARGET (5 draws), trailing.
        let script = [0, 0, 0, 0, 777, 0, 0, 0, 0, 0, 0];
        let mut rng = CountingSource::new(ScriptedSource::new(script));
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&parent)
            .unwrap()
            .into_event()
            .unwrap();

        let ship = event.ship.unwrap();
        assert_eq!(ship.seed, 777);
        assert_eq!(ship.name.as_deref(), Some("Redshift"));
        assert_eq!(ship.load.as_deref(), Some("PIRATE_SHIP"));
        assert_eq!(ship.auto_blueprint.as_deref(), Some("PIRATE_SCOUT"));
        assert!(ship.hostile);
        let nested = event.choices[0].event.as_ref().unwrap();
        assert_eq!(nested.id.as_deref(), Some("TARGET"));
        assert_eq!(rng.draws(), 11);
    }

    #[test]
    fn random_weapon_directive_uses_rarity_sampler() {
        let catalog = Catalog {
            weapons: vec![
                BlueprintEntry {
                    id: "LASER_MK1".to_string(),
                    rarity: 5,
                    sprite_layers: 0,
                },
                BlueprintEntry {
                    id: "ION_BLAST".to_string(),
                    rarity: 2,
                    sprite_layers: 0,
                },
            ],
            ..Catalog::default()
        };
        let mut session = ctx();
        let mut template = plain_event("WEAPON_CACHE");
        template.weapon = Some(ItemDirective {
            name: Some("RANDOM".to_string()),
        });

        // offers x4, weapon sample (value 1 lands on ION_BLAST after
        // LASER_MK1's weight 1), trailing.
        let mut rng = ScriptedSource::new([0, 0, 0, 0, 1, 0]);
        let event = EventResolver::new(&catalog, &mut session, &mut rng)
            .resolve(&template)
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(event.weapon.as_deref(), Some("ION_BLAST"));
    }
}
