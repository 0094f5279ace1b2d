//! Action and progress rolls.

use std::fmt;

use ironwriter_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

use super::state::{GameState, Stat, normalize_id};

/// Sides on each challenge die.
pub const CHALLENGE_SIDES: u32 = 10;

/// Sides on the action die.
pub const ACTION_SIDES: u32 = 6;

/// Where the action value of a roll comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RollSource {
    #[default]
    ActionDie,
    /// Whole boxes of the progress track with this id.
    Progress { id: String },
}

impl RollSource {
    /// Accepts a track's display name as well as its id.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            RollSource::Progress { id } => RollSource::Progress {
                id: normalize_id(&id),
            },
            RollSource::ActionDie => RollSource::ActionDie,
        }
    }
}

/// Result band of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    StrongHit,
    WeakHit,
    Miss,
}

impl Outcome {
    /// Compares an action total against both challenge dice.
    #[must_use]
    pub fn evaluate(total: i32, challenge: [u32; 2]) -> Self {
        let beats = |die: u32| i64::from(total) > i64::from(die);
        match (beats(challenge[0]), beats(challenge[1])) {
            (true, true) => Outcome::StrongHit,
            (false, false) => Outcome::Miss,
            _ => Outcome::WeakHit,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::StrongHit => "Strong Hit",
            Outcome::WeakHit => "Weak Hit",
            Outcome::Miss => "Miss",
        })
    }
}

/// A resolved roll with the dice it drew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    /// Stat whose current value is added.
    pub stat: Option<Stat>,
    /// Flat modifier.
    pub add: i32,
    pub source: RollSource,
    pub challenge: [u32; 2],
    pub action: u32,
}

impl Roll {
    /// Draws fresh dice for a roll.
    pub fn new(
        stat: Option<Stat>,
        add: i32,
        source: RollSource,
        rng: &mut dyn DeterministicRng,
    ) -> Self {
        let mut roll = Self {
            stat,
            add,
            source,
            challenge: [1, 1],
            action: 1,
        };
        roll.reroll(rng);
        roll
    }

    /// Replaces the dice, keeping stat, modifier and source.
    pub fn reroll(&mut self, rng: &mut dyn DeterministicRng) {
        let challenge = rng.roll_dice(2, CHALLENGE_SIDES);
        self.challenge = [
            challenge.first().copied().unwrap_or(1),
            challenge.get(1).copied().unwrap_or(1),
        ];
        self.action = rng
            .roll_dice(1, ACTION_SIDES)
            .first()
            .copied()
            .unwrap_or(1);
    }

    /// Outcome of the roll against `state`.
    #[must_use]
    pub fn outcome(&self, state: &GameState) -> Outcome {
        self.resolve(state).outcome
    }

    /// Renders the three-line roll summary against `state`.
    ///
    /// A progress source whose track no longer exists falls back to the
    /// action die.
    #[must_use]
    pub fn describe(&self, state: &GameState) -> String {
        let resolved = self.resolve(state);

        let mut action_line = match resolved.track_name {
            Some(name) => format!("Action: {} ({name})", resolved.action_value),
            None => format!("Action: [{}]", resolved.action_value),
        };
        if let Some(stat) = self.stat {
            action_line.push_str(&format!(" + {} ({stat})", resolved.stat_value));
        }
        if self.add > 0 {
            action_line.push_str(&format!(" + {}", self.add));
        } else if self.add < 0 {
            action_line.push_str(&format!(" - {}", self.add.unsigned_abs()));
        }
        if self.stat.is_some() || self.add != 0 {
            action_line.push_str(&format!(" = {}", resolved.total));
        }

        let mut result = format!("> {}", resolved.outcome);
        if self.challenge[0] == self.challenge[1] {
            result.push_str(" (Match)");
        }

        format!(
            "Challenge: [{}, {}]\n{action_line}\n{result}",
            self.challenge[0], self.challenge[1]
        )
    }

    fn resolve<'a>(&self, state: &'a GameState) -> Resolved<'a> {
        let track = match &self.source {
            RollSource::ActionDie => None,
            RollSource::Progress { id } => state.progress.get(id),
        };
        let action_value = match track {
            Some(track) => track.progress_score(),
            None => i32::try_from(self.action).unwrap_or(i32::MAX),
        };
        let stat_value = self.stat.map_or(0, |stat| state.stat(stat));
        let total = action_value
            .saturating_add(stat_value)
            .saturating_add(self.add);
        Resolved {
            track_name: track.map(|t| t.name.as_str()),
            action_value,
            stat_value,
            total,
            outcome: Outcome::evaluate(total, self.challenge),
        }
    }
}

struct Resolved<'a> {
    track_name: Option<&'a str>,
    action_value: i32,
    stat_value: i32,
    total: i32,
    outcome: Outcome,
}
