//! Typed, replayable state mutations.
//!
//! Every action is decided entirely by its own fields. Whether a bond,
//! track or asset exists is checked when the action is applied, never when
//! it is built, so replaying the same history always yields the same state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bookmarks::{Bookmark, BookmarkIndex, BookmarkKind};
use super::roll::Roll;
use super::state::{
    ASSET_UPGRADE_SLOTS, Asset, Bond, Debility, GameState, Item, Property, PropertyValue,
    ProgressTrack, Rank, Stat,
};

/// A numeric change: an absolute value or a signed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Set(i32),
    Add(i32),
}

impl Adjustment {
    /// Parses `5` as a set and `+5` / `-5` as a delta.
    ///
    /// Anything other than an optional sign followed by ASCII digits, or a
    /// value outside `i32`, is rejected.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let (relative, digits) = match token.as_bytes().first() {
            Some(b'+' | b'-') => (true, &token[1..]),
            _ => (false, token),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: i32 = token.parse().ok()?;
        Some(if relative {
            Adjustment::Add(value)
        } else {
            Adjustment::Set(value)
        })
    }

    #[must_use]
    pub fn apply_to(self, current: i32) -> i32 {
        match self {
            Adjustment::Set(value) => value,
            Adjustment::Add(delta) => current.saturating_add(delta),
        }
    }
}

/// A change to an asset or item property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyUpdate {
    Number(Adjustment),
    Text(String),
}

impl PropertyUpdate {
    /// Numeric tokens adjust a counter; anything else sets free text.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        Adjustment::parse(token).map_or_else(
            || PropertyUpdate::Text(token.to_owned()),
            PropertyUpdate::Number,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondChange {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressChange {
    /// Advance by the track's rank weight.
    Mark,
    /// Set or adjust raw ticks.
    Ticks(Adjustment),
    /// Remove the track.
    Complete,
    /// Create the track if it does not exist.
    Start(Rank),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetChange {
    /// (Re)create the asset with no upgrades or properties.
    Create,
    /// Mark a 1-based upgrade slot.
    Upgrade(usize),
    Update {
        property_id: String,
        property_name: String,
        update: PropertyUpdate,
    },
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemChange {
    /// (Re)create the item holding a quantity of 1.
    Create,
    /// Update a property, creating the item first if it is absent.
    Update {
        property_id: String,
        property_name: String,
        update: PropertyUpdate,
    },
    Remove,
}

/// One atomic mutation recorded in a moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Stat {
        stat: Stat,
        adjustment: Adjustment,
    },
    Bond {
        id: String,
        name: String,
        change: BondChange,
    },
    Progress {
        id: String,
        name: String,
        change: ProgressChange,
    },
    /// Marks or clears a debility, moving both momentum caps with it.
    Debility {
        debility: Debility,
        afflicted: bool,
    },
    Rename {
        name: String,
    },
    Asset {
        id: String,
        name: String,
        change: AssetChange,
    },
    Item {
        id: String,
        name: String,
        change: ItemChange,
    },
    Bookmark {
        name: String,
        kind: BookmarkKind,
        automatic: bool,
    },
    /// A consulted oracle answer. Never mutates state.
    Oracle {
        table: String,
        answer: String,
    },
    Roll(Roll),
}

/// Moment-level context an action needs while it is applied or reversed.
pub struct ActionContext<'a> {
    /// History position of the owning moment.
    pub position: usize,
    /// State immediately before the owning moment was first applied.
    pub snapshot: &'a GameState,
    pub bookmarks: &'a mut BookmarkIndex,
}

impl Action {
    /// Applies the action to `state`.
    ///
    /// Returns replacement display text for actions that describe their own
    /// result.
    pub fn apply(&self, state: &mut GameState, ctx: &mut ActionContext<'_>) -> Option<String> {
        match self {
            Action::Stat { stat, adjustment } => {
                let value = adjustment.apply_to(state.stat(*stat));
                state.set_stat(*stat, value);
            }
            Action::Bond { id, name, change } => {
                match change {
                    BondChange::Add => {
                        state
                            .bonds
                            .entry(id.clone())
                            .or_insert_with(|| Bond { name: name.clone() });
                    }
                    BondChange::Remove => {
                        state.bonds.remove(id);
                    }
                }
                state.sync_bond_count();
            }
            Action::Progress { id, name, change } => apply_progress(state, id, name, *change),
            Action::Debility {
                debility,
                afflicted,
            } => {
                let delta = if *afflicted { -1 } else { 1 };
                state.debilities.set(*debility, *afflicted);
                state.adjust_stat(Stat::MomentumMax, delta);
                state.adjust_stat(Stat::MomentumReset, delta);
            }
            Action::Rename { name } => state.character_name.clone_from(name),
            Action::Asset { id, name, change } => apply_asset(state, id, name, change),
            Action::Item { id, name, change } => apply_item(state, id, name, change),
            Action::Bookmark { name, kind, .. } => ctx.bookmarks.record(
                ctx.position,
                Bookmark {
                    name: name.clone(),
                    kind: *kind,
                },
            ),
            Action::Oracle { table, answer } => return Some(oracle_text(table, answer)),
            Action::Roll(roll) => return Some(roll.describe(state)),
        }
        None
    }

    /// Reverses the action by restoring the fields it touches from the
    /// owning moment's snapshot.
    pub fn unapply(&self, state: &mut GameState, ctx: &mut ActionContext<'_>) {
        let snapshot = ctx.snapshot;
        match self {
            Action::Stat { stat, .. } => {
                *state.stats.get_mut(*stat) = snapshot.stat(*stat);
                state.stats.momentum_reset = snapshot.stats.momentum_reset;
            }
            Action::Bond { id, .. } => {
                restore_entry(&mut state.bonds, &snapshot.bonds, id);
                state.sync_bond_count();
            }
            Action::Progress { id, .. } => restore_entry(&mut state.progress, &snapshot.progress, id),
            Action::Debility { debility, .. } => {
                state
                    .debilities
                    .set(*debility, snapshot.debilities.get(*debility));
                state.stats.momentum_max = snapshot.stats.momentum_max;
                state.stats.momentum_reset = snapshot.stats.momentum_reset;
            }
            Action::Rename { .. } => state.character_name.clone_from(&snapshot.character_name),
            Action::Asset { id, .. } => restore_entry(&mut state.assets, &snapshot.assets, id),
            Action::Item { id, .. } => restore_entry(&mut state.items, &snapshot.items, id),
            Action::Bookmark { .. } => ctx.bookmarks.clear(ctx.position),
            Action::Oracle { .. } | Action::Roll(_) => {}
        }
    }

    /// The bookmark this action records about itself, if any.
    #[must_use]
    pub fn auto_bookmark(&self) -> Option<Action> {
        let (name, kind) = match self {
            Action::Bond {
                name,
                change: BondChange::Add,
                ..
            } => (format!("Bond: {name}"), BookmarkKind::Bond),
            Action::Bond {
                name,
                change: BondChange::Remove,
                ..
            } => (format!("Unbond: {name}"), BookmarkKind::Unbond),
            Action::Progress { name, change, .. } => match change {
                ProgressChange::Start(_) => (format!("Started: {name}"), BookmarkKind::ProgressAdd),
                ProgressChange::Mark | ProgressChange::Ticks(_) => {
                    (format!("Progressed: {name}"), BookmarkKind::ProgressProgress)
                }
                ProgressChange::Complete => {
                    (format!("Completed: {name}"), BookmarkKind::ProgressComplete)
                }
            },
            Action::Debility {
                debility,
                afflicted: true,
            } => (format!("Is {debility}"), BookmarkKind::Debility),
            Action::Debility {
                debility,
                afflicted: false,
            } => (format!("No longer {debility}"), BookmarkKind::Debility),
            Action::Rename { name } => (format!("Renamed: {name}"), BookmarkKind::Rename),
            Action::Asset { name, change, .. } => {
                let label = match change {
                    AssetChange::Create => "Asset",
                    AssetChange::Upgrade(_) => "Upgraded",
                    AssetChange::Update { .. } => "Updated",
                    AssetChange::Remove => "Removed asset",
                };
                (format!("{label}: {name}"), BookmarkKind::Asset)
            }
            Action::Item { name, change, .. } => {
                let label = match change {
                    ItemChange::Create => "Item",
                    ItemChange::Update { .. } => "Updated",
                    ItemChange::Remove => "Removed item",
                };
                (format!("{label}: {name}"), BookmarkKind::Item)
            }
            Action::Stat { .. }
            | Action::Bookmark { .. }
            | Action::Oracle { .. }
            | Action::Roll(_) => return None,
        };
        Some(Action::Bookmark {
            name,
            kind,
            automatic: true,
        })
    }
}

/// Display text of a consulted oracle.
#[must_use]
pub fn oracle_text(table: &str, answer: &str) -> String {
    format!("Ask the Oracle ({table}): {answer}")
}

fn apply_progress(state: &mut GameState, id: &str, name: &str, change: ProgressChange) {
    match change {
        ProgressChange::Mark => {
            if let Some(track) = state.progress.get_mut(id) {
                track.ticks = track.ticks.saturating_add(track.rank.ticks_per_mark());
            }
        }
        ProgressChange::Ticks(adjustment) => {
            if let Some(track) = state.progress.get_mut(id) {
                track.ticks = adjustment.apply_to(track.ticks);
            }
        }
        ProgressChange::Complete => {
            state.progress.remove(id);
        }
        ProgressChange::Start(rank) => {
            state
                .progress
                .entry(id.to_owned())
                .or_insert_with(|| ProgressTrack::new(name, rank));
        }
    }
}

fn apply_asset(state: &mut GameState, id: &str, name: &str, change: &AssetChange) {
    match change {
        AssetChange::Create => {
            state.assets.insert(id.to_owned(), Asset::new(name));
        }
        AssetChange::Upgrade(slot) => {
            if !(1..=ASSET_UPGRADE_SLOTS).contains(slot) {
                return;
            }
            if let Some(asset) = state.assets.get_mut(id) {
                asset.upgrades[slot - 1] = true;
            }
        }
        AssetChange::Update {
            property_id,
            property_name,
            update,
        } => {
            if let Some(asset) = state.assets.get_mut(id) {
                update_property(&mut asset.properties, property_id, property_name, update);
            }
        }
        AssetChange::Remove => {
            state.assets.remove(id);
        }
    }
}

fn apply_item(state: &mut GameState, id: &str, name: &str, change: &ItemChange) {
    match change {
        ItemChange::Create => {
            state.items.insert(id.to_owned(), Item::new(name));
        }
        ItemChange::Update {
            property_id,
            property_name,
            update,
        } => {
            let item = state
                .items
                .entry(id.to_owned())
                .or_insert_with(|| Item::new(name));
            update_property(&mut item.properties, property_id, property_name, update);
        }
        ItemChange::Remove => {
            state.items.remove(id);
        }
    }
}

/// Applies `update` to a property, creating it from zero when absent.
fn update_property(
    properties: &mut BTreeMap<String, Property>,
    id: &str,
    name: &str,
    update: &PropertyUpdate,
) {
    let property = properties.entry(id.to_owned()).or_insert_with(|| Property {
        name: name.to_owned(),
        value: PropertyValue::Number(0),
    });
    let value = match (update, &property.value) {
        (PropertyUpdate::Text(text), _) => PropertyValue::Text(text.clone()),
        (PropertyUpdate::Number(adjustment), PropertyValue::Number(current)) => {
            PropertyValue::Number(adjustment.apply_to(*current))
        }
        (PropertyUpdate::Number(adjustment), PropertyValue::Text(_)) => {
            PropertyValue::Number(adjustment.apply_to(0))
        }
    };
    property.value = value;
}

/// Makes `live[id]` match `snapshot[id]`, including absence.
fn restore_entry<T: Clone>(
    live: &mut BTreeMap<String, T>,
    snapshot: &BTreeMap<String, T>,
    id: &str,
) {
    match snapshot.get(id) {
        Some(value) => {
            live.insert(id.to_owned(), value.clone());
        }
        None => {
            live.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(state: &mut GameState, actions: &[Action]) -> BookmarkIndex {
        let snapshot = state.clone();
        let mut bookmarks = BookmarkIndex::new();
        let mut ctx = ActionContext {
            position: 0,
            snapshot: &snapshot,
            bookmarks: &mut bookmarks,
        };
        for action in actions {
            action.apply(state, &mut ctx);
        }
        bookmarks
    }

    fn bond(name: &str, change: BondChange) -> Action {
        Action::Bond {
            id: name.to_lowercase(),
            name: name.to_owned(),
            change,
        }
    }

    #[test]
    fn test_adjustment_parse() {
        assert_eq!(Adjustment::parse("5"), Some(Adjustment::Set(5)));
        assert_eq!(Adjustment::parse("+2"), Some(Adjustment::Add(2)));
        assert_eq!(Adjustment::parse("-3"), Some(Adjustment::Add(-3)));
        assert_eq!(Adjustment::parse("-"), None);
        assert_eq!(Adjustment::parse("4x"), None);
        assert_eq!(Adjustment::parse("1.5"), None);
        assert_eq!(Adjustment::parse("99999999999"), None);
    }

    #[test]
    fn test_bond_add_is_idempotent() {
        let mut state = GameState::default();

        apply_all(
            &mut state,
            &[bond("Greta", BondChange::Add), bond("Greta", BondChange::Add)],
        );

        assert_eq!(state.bonds.len(), 1);
        assert_eq!(state.stats.bonds, 1);
    }

    #[test]
    fn test_unbond_missing_is_noop() {
        let mut state = GameState::default();

        apply_all(&mut state, &[bond("Ivar", BondChange::Remove)]);

        assert!(state.bonds.is_empty());
        assert_eq!(state.stats.bonds, 0);
    }

    #[test]
    fn test_mark_progress_uses_rank_weight() {
        let mut state = GameState::default();
        let progress = |change| Action::Progress {
            id: "vow".into(),
            name: "Vow".into(),
            change,
        };

        apply_all(
            &mut state,
            &[
                progress(ProgressChange::Start(Rank::Dangerous)),
                progress(ProgressChange::Mark),
            ],
        );

        assert_eq!(state.progress["vow"].ticks, 8);
    }

    #[test]
    fn test_start_progress_does_not_reset_existing_track() {
        let mut state = GameState::default();
        let mut track = ProgressTrack::new("Vow", Rank::Epic);
        track.ticks = 9;
        state.progress.insert("vow".into(), track);

        apply_all(
            &mut state,
            &[Action::Progress {
                id: "vow".into(),
                name: "Vow".into(),
                change: ProgressChange::Start(Rank::Troublesome),
            }],
        );

        assert_eq!(state.progress["vow"].ticks, 9);
        assert_eq!(state.progress["vow"].rank, Rank::Epic);
    }

    #[test]
    fn test_debility_moves_both_caps() {
        let mut state = GameState::default();
        state.set_stat(Stat::MomentumMax, 10);
        state.set_stat(Stat::MomentumReset, 2);

        apply_all(
            &mut state,
            &[Action::Debility {
                debility: Debility::Wounded,
                afflicted: true,
            }],
        );

        assert!(state.debilities.wounded);
        assert_eq!(state.stat(Stat::MomentumMax), 9);
        assert_eq!(state.stat(Stat::MomentumReset), 1);
    }

    #[test]
    fn test_asset_update_on_missing_asset_is_noop() {
        let mut state = GameState::default();

        apply_all(
            &mut state,
            &[Action::Asset {
                id: "great bow".into(),
                name: "Great Bow".into(),
                change: AssetChange::Update {
                    property_id: "arrow count".into(),
                    property_name: "Arrow Count".into(),
                    update: PropertyUpdate::Number(Adjustment::Set(10)),
                },
            }],
        );

        assert!(state.assets.is_empty());
    }

    #[test]
    fn test_item_update_seeds_quantity_then_applies() {
        let mut state = GameState::default();

        apply_all(
            &mut state,
            &[Action::Item {
                id: "torch".into(),
                name: "Torch".into(),
                change: ItemChange::Update {
                    property_id: "quantity".into(),
                    property_name: "Quantity".into(),
                    update: PropertyUpdate::Number(Adjustment::Add(2)),
                },
            }],
        );

        assert_eq!(state.items["torch"].quantity(), Some(3));
    }

    #[test]
    fn test_text_property_replaced_by_number_counts_from_zero() {
        let mut properties = BTreeMap::new();
        update_property(
            &mut properties,
            "mood",
            "Mood",
            &PropertyUpdate::Text("grim".into()),
        );

        update_property(
            &mut properties,
            "mood",
            "Mood",
            &PropertyUpdate::Number(Adjustment::Add(2)),
        );

        assert_eq!(properties["mood"].value, PropertyValue::Number(2));
    }

    #[test]
    fn test_unapply_restores_snapshot_fields() {
        let mut state = GameState::default();
        state.set_stat(Stat::MomentumMax, 10);
        state.set_stat(Stat::MomentumReset, 0);
        let before = state.clone();
        let actions = [
            Action::Debility {
                debility: Debility::Shaken,
                afflicted: true,
            },
            Action::Stat {
                stat: Stat::MomentumReset,
                adjustment: Adjustment::Add(3),
            },
            bond("Greta", BondChange::Add),
        ];
        let mut bookmarks = BookmarkIndex::new();
        let mut ctx = ActionContext {
            position: 0,
            snapshot: &before,
            bookmarks: &mut bookmarks,
        };

        for action in &actions {
            action.apply(&mut state, &mut ctx);
        }
        for action in &actions {
            action.unapply(&mut state, &mut ctx);
        }

        assert_eq!(state, before);
    }

    #[test]
    fn test_auto_bookmark_names() {
        let names: Vec<String> = [
            bond("Greta", BondChange::Add),
            bond("Greta", BondChange::Remove),
            Action::Debility {
                debility: Debility::Wounded,
                afflicted: false,
            },
            Action::Rename {
                name: "Kira".into(),
            },
        ]
        .iter()
        .filter_map(Action::auto_bookmark)
        .filter_map(|a| match a {
            Action::Bookmark { name, .. } => Some(name),
            _ => None,
        })
        .collect();

        assert_eq!(
            names,
            vec!["Bond: Greta", "Unbond: Greta", "No longer wounded", "Renamed: Kira"]
        );
    }

    #[test]
    fn test_stat_and_roll_have_no_auto_bookmark() {
        let stat = Action::Stat {
            stat: Stat::Health,
            adjustment: Adjustment::Add(-1),
        };

        assert!(stat.auto_bookmark().is_none());
    }

    #[test]
    fn test_bookmark_records_at_position() {
        let mut state = GameState::default();

        let bookmarks = apply_all(
            &mut state,
            &[Action::Bookmark {
                name: "Arrival".into(),
                kind: BookmarkKind::Fiction,
                automatic: false,
            }],
        );

        assert_eq!(bookmarks.at(0)[0].name, "Arrival");
    }

    #[test]
    fn test_actions_serialize_with_type_tag() {
        let action = bond("Greta", BondChange::Add);

        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json["type"], "bond");
        assert_eq!(json["change"], "add");
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }
}
