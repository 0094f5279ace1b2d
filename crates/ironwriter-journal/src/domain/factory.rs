//! Maps parsed command tags to actions.

use tracing::debug;

use super::actions::{
    Action, Adjustment, AssetChange, BondChange, ItemChange, ProgressChange, PropertyUpdate,
};
use super::bookmarks::BookmarkKind;
use super::moment::Category;
use super::state::{
    ASSET_UPGRADE_SLOTS, Debility, QUANTITY_PROPERTY_ID, QUANTITY_PROPERTY_NAME, Rank, Stat,
    normalize_id,
};
use super::tags::{Tag, parse_tags};

/// Builds the ordered action list for an entry.
///
/// Each recognized tag contributes at most one action, immediately followed
/// by that action's automatic bookmark. Unknown or malformed tags are
/// dropped.
#[must_use]
pub fn actions_for_entry(text: &str, category: Category) -> Vec<Action> {
    let mut actions = Vec::new();
    for tag in parse_tags(text) {
        let Some(action) = action_for_tag(&tag, category) else {
            debug!(tag = %tag.name, args = ?tag.args, "dropping unrecognized or malformed tag");
            continue;
        };
        let auto = action.auto_bookmark();
        actions.push(action);
        actions.extend(auto);
    }
    actions
}

/// Builds the action for a single tag.
#[must_use]
pub fn action_for_tag(tag: &Tag, category: Category) -> Option<Action> {
    let args = tag.args.as_slice();
    match tag.name.as_str() {
        "bond" => bond(args, BondChange::Add),
        "unbond" => bond(args, BondChange::Remove),
        "progress" => progress(args),
        "rename" => joined(args).map(|name| Action::Rename { name }),
        "is" => debility(args, true),
        "not" => debility(args, false),
        "asset" => asset(args),
        "removeasset" => first_name(args).map(|name| Action::Asset {
            id: normalize_id(name),
            name: name.to_owned(),
            change: AssetChange::Remove,
        }),
        "item" => item(args),
        "removeitem" => first_name(args).map(|name| Action::Item {
            id: normalize_id(name),
            name: name.to_owned(),
            change: ItemChange::Remove,
        }),
        "bookmark" => joined(args).map(|name| Action::Bookmark {
            name,
            kind: match category {
                Category::Meta => BookmarkKind::Meta,
                _ => BookmarkKind::Fiction,
            },
            automatic: false,
        }),
        other => stat(other, args),
    }
}

/// A name made of blanks is treated as missing.
fn non_blank(name: &str) -> Option<&str> {
    (!normalize_id(name).is_empty()).then_some(name)
}

fn first_name(args: &[String]) -> Option<&str> {
    args.first().map(String::as_str).and_then(non_blank)
}

fn joined(args: &[String]) -> Option<String> {
    let name = args.join(" ");
    non_blank(&name)?;
    Some(name)
}

fn stat(tag: &str, args: &[String]) -> Option<Action> {
    let stat = Stat::parse(tag).filter(|stat| *stat != Stat::Bonds)?;
    let adjustment = Adjustment::parse(args.first()?)?;
    Some(Action::Stat { stat, adjustment })
}

fn bond(args: &[String], change: BondChange) -> Option<Action> {
    let name = first_name(args)?;
    Some(Action::Bond {
        id: normalize_id(name),
        name: name.to_owned(),
        change,
    })
}

fn progress(args: &[String]) -> Option<Action> {
    let name = first_name(args)?;
    let change = match args.get(1) {
        None => ProgressChange::Mark,
        Some(option) if option.eq_ignore_ascii_case("complete") => ProgressChange::Complete,
        Some(option) => match Adjustment::parse(option) {
            Some(adjustment) => ProgressChange::Ticks(adjustment),
            None => ProgressChange::Start(Rank::parse(option)?),
        },
    };
    Some(Action::Progress {
        id: normalize_id(name),
        name: name.to_owned(),
        change,
    })
}

fn debility(args: &[String], afflicted: bool) -> Option<Action> {
    let debility = Debility::parse(args.first()?)?;
    Some(Action::Debility {
        debility,
        afflicted,
    })
}

fn asset(args: &[String]) -> Option<Action> {
    let (name, rest) = args.split_first()?;
    let name = non_blank(name)?;
    let change = match rest {
        [] => AssetChange::Create,
        [slot, ..] if slot.bytes().all(|b| b.is_ascii_digit()) => {
            let slot: usize = slot.parse().ok()?;
            if !(1..=ASSET_UPGRADE_SLOTS).contains(&slot) {
                return None;
            }
            AssetChange::Upgrade(slot)
        }
        [property, value, ..] => AssetChange::Update {
            property_id: normalize_id(non_blank(property)?),
            property_name: property.clone(),
            update: PropertyUpdate::parse(value),
        },
        [_] => return None,
    };
    Some(Action::Asset {
        id: normalize_id(name),
        name: name.to_owned(),
        change,
    })
}

fn item(args: &[String]) -> Option<Action> {
    let (name, rest) = args.split_first()?;
    let name = non_blank(name)?;
    let change = match rest {
        [] => ItemChange::Create,
        [quantity] => ItemChange::Update {
            property_id: QUANTITY_PROPERTY_ID.to_owned(),
            property_name: QUANTITY_PROPERTY_NAME.to_owned(),
            update: PropertyUpdate::Number(Adjustment::parse(quantity)?),
        },
        [property, value, ..] => ItemChange::Update {
            property_id: normalize_id(non_blank(property)?),
            property_name: property.clone(),
            update: PropertyUpdate::parse(value),
        },
    };
    Some(Action::Item {
        id: normalize_id(name),
        name: name.to_owned(),
        change,
    })
}
