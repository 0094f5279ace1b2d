//! Character state: the aggregate rebuilt by replaying moments.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of boxes on a progress track.
pub const MAX_PROGRESS_BOXES: i32 = 10;

/// Raw ticks that fill one progress box.
pub const TICKS_PER_BOX: i32 = 4;

/// Number of upgrade slots on an asset.
pub const ASSET_UPGRADE_SLOTS: usize = 3;

/// Property id every inventory item carries.
pub const QUANTITY_PROPERTY_ID: &str = "quantity";

/// Display name of the quantity property.
pub const QUANTITY_PROPERTY_NAME: &str = "Quantity";

/// Normalizes a display name into a map key.
#[must_use]
pub fn normalize_id(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The fixed set of numeric character stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    Edge,
    Heart,
    Iron,
    Shadow,
    Wits,
    Health,
    Supply,
    Spirit,
    Momentum,
    MomentumMax,
    MomentumReset,
    Experience,
    ExperienceSpent,
    Bonds,
}

impl Stat {
    /// Every stat, in sheet order.
    pub const ALL: [Stat; 14] = [
        Stat::Edge,
        Stat::Heart,
        Stat::Iron,
        Stat::Shadow,
        Stat::Wits,
        Stat::Health,
        Stat::Supply,
        Stat::Spirit,
        Stat::Momentum,
        Stat::MomentumMax,
        Stat::MomentumReset,
        Stat::Experience,
        Stat::ExperienceSpent,
        Stat::Bonds,
    ];

    /// The stat's canonical name, as written on the sheet.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stat::Edge => "edge",
            Stat::Heart => "heart",
            Stat::Iron => "iron",
            Stat::Shadow => "shadow",
            Stat::Wits => "wits",
            Stat::Health => "health",
            Stat::Supply => "supply",
            Stat::Spirit => "spirit",
            Stat::Momentum => "momentum",
            Stat::MomentumMax => "momentumMax",
            Stat::MomentumReset => "momentumReset",
            Stat::Experience => "experience",
            Stat::ExperienceSpent => "experienceSpent",
            Stat::Bonds => "bonds",
        }
    }

    /// Looks a stat up by name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Stat> {
        Stat::ALL
            .into_iter()
            .find(|stat| stat.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric stat values. Every stat is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Stats {
    pub edge: i32,
    pub heart: i32,
    pub iron: i32,
    pub shadow: i32,
    pub wits: i32,
    pub health: i32,
    pub supply: i32,
    pub spirit: i32,
    pub momentum: i32,
    pub momentum_max: i32,
    pub momentum_reset: i32,
    pub experience: i32,
    pub experience_spent: i32,
    pub bonds: i32,
}

impl Stats {
    /// Returns the value of `stat`.
    #[must_use]
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Edge => self.edge,
            Stat::Heart => self.heart,
            Stat::Iron => self.iron,
            Stat::Shadow => self.shadow,
            Stat::Wits => self.wits,
            Stat::Health => self.health,
            Stat::Supply => self.supply,
            Stat::Spirit => self.spirit,
            Stat::Momentum => self.momentum,
            Stat::MomentumMax => self.momentum_max,
            Stat::MomentumReset => self.momentum_reset,
            Stat::Experience => self.experience,
            Stat::ExperienceSpent => self.experience_spent,
            Stat::Bonds => self.bonds,
        }
    }

    /// Returns a mutable reference to `stat`.
    pub fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Edge => &mut self.edge,
            Stat::Heart => &mut self.heart,
            Stat::Iron => &mut self.iron,
            Stat::Shadow => &mut self.shadow,
            Stat::Wits => &mut self.wits,
            Stat::Health => &mut self.health,
            Stat::Supply => &mut self.supply,
            Stat::Spirit => &mut self.spirit,
            Stat::Momentum => &mut self.momentum,
            Stat::MomentumMax => &mut self.momentum_max,
            Stat::MomentumReset => &mut self.momentum_reset,
            Stat::Experience => &mut self.experience,
            Stat::ExperienceSpent => &mut self.experience_spent,
            Stat::Bonds => &mut self.bonds,
        }
    }
}

/// Lasting conditions that lower the momentum caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Debility {
    Wounded,
    Shaken,
    Unprepared,
    Encumbered,
    Maimed,
    Corrupted,
    Cursed,
    Tormented,
}

impl Debility {
    /// Every debility, in sheet order.
    pub const ALL: [Debility; 8] = [
        Debility::Wounded,
        Debility::Shaken,
        Debility::Unprepared,
        Debility::Encumbered,
        Debility::Maimed,
        Debility::Corrupted,
        Debility::Cursed,
        Debility::Tormented,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Debility::Wounded => "wounded",
            Debility::Shaken => "shaken",
            Debility::Unprepared => "unprepared",
            Debility::Encumbered => "encumbered",
            Debility::Maimed => "maimed",
            Debility::Corrupted => "corrupted",
            Debility::Cursed => "cursed",
            Debility::Tormented => "tormented",
        }
    }

    /// Looks a debility up by name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Debility> {
        Debility::ALL
            .into_iter()
            .find(|debility| debility.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Debility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Debility flags. Every debility is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct Debilities {
    pub wounded: bool,
    pub shaken: bool,
    pub unprepared: bool,
    pub encumbered: bool,
    pub maimed: bool,
    pub corrupted: bool,
    pub cursed: bool,
    pub tormented: bool,
}

impl Debilities {
    #[must_use]
    pub fn get(&self, debility: Debility) -> bool {
        match debility {
            Debility::Wounded => self.wounded,
            Debility::Shaken => self.shaken,
            Debility::Unprepared => self.unprepared,
            Debility::Encumbered => self.encumbered,
            Debility::Maimed => self.maimed,
            Debility::Corrupted => self.corrupted,
            Debility::Cursed => self.cursed,
            Debility::Tormented => self.tormented,
        }
    }

    pub fn set(&mut self, debility: Debility, value: bool) {
        let flag = match debility {
            Debility::Wounded => &mut self.wounded,
            Debility::Shaken => &mut self.shaken,
            Debility::Unprepared => &mut self.unprepared,
            Debility::Encumbered => &mut self.encumbered,
            Debility::Maimed => &mut self.maimed,
            Debility::Corrupted => &mut self.corrupted,
            Debility::Cursed => &mut self.cursed,
            Debility::Tormented => &mut self.tormented,
        };
        *flag = value;
    }

    /// Debilities currently marked.
    pub fn active(&self) -> impl Iterator<Item = Debility> + '_ {
        Debility::ALL.into_iter().filter(|d| self.get(*d))
    }
}

/// Challenge rank of a progress track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Troublesome,
    Dangerous,
    Formidable,
    Extreme,
    Epic,
}

impl Rank {
    const ALL: [Rank; 5] = [
        Rank::Troublesome,
        Rank::Dangerous,
        Rank::Formidable,
        Rank::Extreme,
        Rank::Epic,
    ];

    /// Raw ticks gained each time progress is marked.
    #[must_use]
    pub fn ticks_per_mark(self) -> i32 {
        match self {
            Rank::Troublesome => 12,
            Rank::Dangerous => 8,
            Rank::Formidable => 4,
            Rank::Extreme => 2,
            Rank::Epic => 1,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Rank::Troublesome => "troublesome",
            Rank::Dangerous => "dangerous",
            Rank::Formidable => "formidable",
            Rank::Extreme => "extreme",
            Rank::Epic => "epic",
        }
    }

    /// Looks a rank up by name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Rank> {
        Rank::ALL
            .into_iter()
            .find(|rank| rank.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named progress track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTrack {
    pub name: String,
    pub rank: Rank,
    /// Raw ticks; never clamped.
    pub ticks: i32,
}

impl ProgressTrack {
    #[must_use]
    pub fn new(name: impl Into<String>, rank: Rank) -> Self {
        Self {
            name: name.into(),
            rank,
            ticks: 0,
        }
    }

    /// Whole boxes filled, as used for progress rolls.
    #[must_use]
    pub fn progress_score(&self) -> i32 {
        self.ticks.div_euclid(TICKS_PER_BOX)
    }

    /// Filled boxes for display, within `0..=MAX_PROGRESS_BOXES`.
    #[must_use]
    pub fn filled_boxes(&self) -> i32 {
        self.progress_score().clamp(0, MAX_PROGRESS_BOXES)
    }
}

/// A relationship entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub name: String,
}

/// The value of an asset or item property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(i32),
    Text(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Text(text) => f.write_str(text),
        }
    }
}

/// A named property on an asset or item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

/// An asset card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub upgrades: [bool; ASSET_UPGRADE_SLOTS],
    pub properties: BTreeMap<String, Property>,
}

impl Asset {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upgrades: [false; ASSET_UPGRADE_SLOTS],
            properties: BTreeMap::new(),
        }
    }
}

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub properties: BTreeMap<String, Property>,
}

impl Item {
    /// A new item holding a quantity of 1.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(
            QUANTITY_PROPERTY_ID.to_owned(),
            Property {
                name: QUANTITY_PROPERTY_NAME.to_owned(),
                value: PropertyValue::Number(1),
            },
        );
        Self {
            name: name.into(),
            properties,
        }
    }

    /// The numeric quantity, if the property holds a number.
    #[must_use]
    pub fn quantity(&self) -> Option<i32> {
        match self.properties.get(QUANTITY_PROPERTY_ID).map(|p| &p.value) {
            Some(PropertyValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

/// The character sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub character_name: String,
    pub stats: Stats,
    pub debilities: Debilities,
    pub progress: BTreeMap<String, ProgressTrack>,
    pub bonds: BTreeMap<String, Bond>,
    pub assets: BTreeMap<String, Asset>,
    pub items: BTreeMap<String, Item>,
}

impl GameState {
    #[must_use]
    pub fn stat(&self, stat: Stat) -> i32 {
        self.stats.get(stat)
    }

    /// Sets a stat, then re-applies the momentum reset floor.
    pub fn set_stat(&mut self, stat: Stat, value: i32) {
        *self.stats.get_mut(stat) = value;
        self.clamp_momentum_reset();
    }

    /// Adjusts a stat by `delta`, then re-applies the momentum reset floor.
    pub fn adjust_stat(&mut self, stat: Stat, delta: i32) {
        let value = self.stats.get_mut(stat);
        *value = value.saturating_add(delta);
        self.clamp_momentum_reset();
    }

    fn clamp_momentum_reset(&mut self) {
        if self.stats.momentum_reset < 0 {
            self.stats.momentum_reset = 0;
        }
    }

    /// Recomputes the bonds stat from the bond map.
    pub fn sync_bond_count(&mut self) {
        self.stats.bonds = i32::try_from(self.bonds.len()).unwrap_or(i32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_parse_ignores_case() {
        assert_eq!(Stat::parse("momentumMax"), Some(Stat::MomentumMax));
        assert_eq!(Stat::parse("MOMENTUMMAX"), Some(Stat::MomentumMax));
        assert_eq!(Stat::parse("iron"), Some(Stat::Iron));
        assert_eq!(Stat::parse("strength"), None);
    }

    #[test]
    fn test_stats_serialize_with_sheet_names() {
        let json = serde_json::to_value(Stats::default()).unwrap();

        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for stat in Stat::ALL {
            assert!(keys.contains(&stat.name()), "missing {stat}");
        }
        assert_eq!(keys.len(), Stat::ALL.len());
    }

    #[test]
    fn test_momentum_reset_never_drops_below_zero() {
        let mut state = GameState::default();
        state.set_stat(Stat::MomentumReset, 1);

        state.adjust_stat(Stat::MomentumReset, -3);

        assert_eq!(state.stat(Stat::MomentumReset), 0);
    }

    #[test]
    fn test_other_stats_may_go_negative() {
        let mut state = GameState::default();

        state.adjust_stat(Stat::Momentum, -6);

        assert_eq!(state.stat(Stat::Momentum), -6);
    }

    #[test]
    fn test_rank_weights() {
        assert_eq!(Rank::Troublesome.ticks_per_mark(), 12);
        assert_eq!(Rank::Dangerous.ticks_per_mark(), 8);
        assert_eq!(Rank::Formidable.ticks_per_mark(), 4);
        assert_eq!(Rank::Extreme.ticks_per_mark(), 2);
        assert_eq!(Rank::Epic.ticks_per_mark(), 1);
        assert_eq!(Rank::parse("Dangerous"), Some(Rank::Dangerous));
        assert_eq!(Rank::parse("deadly"), None);
    }

    #[test]
    fn test_progress_boxes_clamp_for_display_only() {
        let mut track = ProgressTrack::new("Escape", Rank::Epic);
        track.ticks = 47;

        assert_eq!(track.progress_score(), 11);
        assert_eq!(track.filled_boxes(), 10);
    }

    #[test]
    fn test_new_item_holds_one() {
        let item = Item::new("Torch");

        assert_eq!(item.quantity(), Some(1));
        assert_eq!(item.properties["quantity"].name, "Quantity");
    }

    #[test]
    fn test_sync_bond_count_matches_map() {
        let mut state = GameState::default();
        state.bonds.insert("greta".into(), Bond { name: "Greta".into() });
        state.bonds.insert("ivar".into(), Bond { name: "Ivar".into() });

        state.sync_bond_count();

        assert_eq!(state.stats.bonds, 2);
    }

    #[test]
    fn test_normalize_id_lowercases_and_trims() {
        assert_eq!(normalize_id(" Great Bow "), "great bow");
    }
}
