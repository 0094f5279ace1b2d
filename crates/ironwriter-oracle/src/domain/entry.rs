//! Oracle table entries and the weighted walk.

use std::collections::BTreeMap;

use ironwriter_core::rng::DeterministicRng;
use serde::Deserialize;

/// Highest face of the percentile die.
pub const PERCENTILE_SIDES: u32 = 100;

/// One node of an oracle table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEntry")]
pub enum OracleEntry {
    /// A terminal answer.
    Literal(String),
    /// Sub-entries resolved in order and concatenated.
    Sequence(Vec<OracleEntry>),
    /// Percentile ranges: `(upper_bound, entry)` pairs sorted by bound. A
    /// d100 roll selects the first pair whose bound is at least the roll.
    Ranges(Vec<(u32, OracleEntry)>),
}

impl OracleEntry {
    /// Walks the entry down to a literal answer, drawing one d100 for every
    /// range table visited.
    pub fn resolve(&self, rng: &mut dyn DeterministicRng) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Sequence(parts) => {
                let mut answer = String::new();
                for part in parts {
                    answer.push_str(&part.resolve(rng));
                }
                answer
            }
            Self::Ranges(ranges) => {
                let roll = rng.roll_dice(1, PERCENTILE_SIDES).first().copied().unwrap_or(1);
                let idx = ranges.partition_point(|(bound, _)| *bound < roll);
                // Validation guarantees the last bound covers the die; clamp anyway.
                match ranges.get(idx).or_else(|| ranges.last()) {
                    Some((_, entry)) => entry.resolve(rng),
                    None => String::new(),
                }
            }
        }
    }
}

/// Serialized shape of an entry: a string, a list, or a map keyed by
/// upper bounds written either as integers (YAML) or strings (JSON).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Literal(String),
    Sequence(Vec<RawEntry>),
    Ranges(BTreeMap<RawBound, RawEntry>),
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(u32),
    Text(String),
}

impl RawBound {
    fn value(&self) -> Result<u32, String> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("range bound {text:?} is not a number")),
        }
    }
}

impl TryFrom<RawEntry> for OracleEntry {
    type Error = String;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        match raw {
            RawEntry::Literal(text) => Ok(Self::Literal(text)),
            RawEntry::Sequence(parts) => {
                if parts.is_empty() {
                    return Err("sequence must not be empty".to_owned());
                }
                parts
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Sequence)
            }
            RawEntry::Ranges(map) => {
                let mut ranges = Vec::with_capacity(map.len());
                for (bound, entry) in map {
                    let bound = bound.value()?;
                    if bound == 0 {
                        return Err("range bound must be at least 1".to_owned());
                    }
                    ranges.push((bound, Self::try_from(entry)?));
                }
                ranges.sort_by_key(|(bound, _)| *bound);
                if ranges.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                    return Err("duplicate range bound".to_owned());
                }
                match ranges.last() {
                    None => Err("range table must not be empty".to_owned()),
                    Some((max, _)) if *max < PERCENTILE_SIDES => Err(format!(
                        "range table tops out at {max}; it must cover {PERCENTILE_SIDES}"
                    )),
                    Some(_) => Ok(Self::Ranges(ranges)),
                }
            }
        }
    }
}
