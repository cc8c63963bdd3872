// Data-driven configuration: simulation tunables and level definitions.
//
// `SimConfig` holds the gameplay-wide constants the simulation reads instead
// of hard-coding: tick length, fall distances, spawn pacing, bomber timing.
// Every field has a serde default, so a partial JSON object (or `{}`) loads.
// Per-action frame thresholds stay in the handlers; they are part of the
// replay contract and are not meant to be tuned.
//
// `LevelDefinition` is the narrow interface to the external level loader:
// terrain rows, spawn points, counts, time limit, skill allotments, and
// object-derived trigger zones. The loader decodes the original asset format
// and hands over this struct (or its JSON form). `validate()` rejects
// definitions the simulation cannot run.
//
// See also: `game.rs` which consumes both, `terrain.rs` for the row format,
// `trigger.rs` for `Trigger`.
//
// **Critical constraint: determinism.** Config and level feed directly into
// simulation logic. A replay is only valid against the same level and config.

use crate::terrain::Terrain;
use crate::trigger::Trigger;
use crate::types::{Point, Skill, TriggerType};
use crate::victory::MAX_RELEASE_RATE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Simulation tunables
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Nominal wall-clock length of one tick, in milliseconds.
    pub tick_ms: u64,
    /// Spawn interval is `release_interval_base - release_rate` ticks.
    pub release_interval_base: u32,
    /// Falls longer than this (in pixels) end in a splat.
    pub max_fall_distance: u32,
    /// Fall distance after which a floater opens its parachute.
    pub parachute_open_distance: u32,
    /// Ticks between arming a bomber and its "oh no".
    pub bomber_countdown_ticks: u32,
    /// Ticks represented by one numeral of the bomber countdown display.
    pub countdown_ticks_per_numeral: u32,
    /// How far below the bottom row a lemming may go before it is removed.
    pub out_of_level_margin: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 60,
            release_interval_base: 104,
            max_fall_distance: 60,
            parachute_open_distance: 16,
            bomber_countdown_ticks: 5,
            countdown_ticks_per_numeral: 1,
            out_of_level_margin: 6,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Ticks between two releases at the given rate.
    pub fn release_interval(&self, release_rate: u32) -> u32 {
        self.release_interval_base.saturating_sub(release_rate)
    }
}

// ---------------------------------------------------------------------------
// Level definition
// ---------------------------------------------------------------------------

/// A trigger zone as described by the level loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDef {
    pub kind: TriggerType,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    #[serde(default)]
    pub disable_ticks: u64,
}

impl TriggerDef {
    pub fn to_trigger(&self) -> Trigger {
        Trigger::new(
            self.kind,
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.disable_ticks,
            None,
        )
    }
}

/// Everything the simulation needs to know about one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    #[serde(default)]
    pub name: String,
    /// Terrain as ASCII rows: `#` solid, anything else empty.
    pub terrain: Vec<String>,
    /// Spawn points, used round-robin.
    pub entrances: Vec<Point>,
    pub release_count: u32,
    pub need_count: u32,
    pub release_rate: u32,
    pub time_limit_secs: u32,
    #[serde(default)]
    pub skills: BTreeMap<Skill, u32>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

/// Reasons a level definition cannot be run.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("terrain is empty")]
    EmptyTerrain,
    #[error("terrain row {row} has {actual} columns, expected {expected}")]
    RaggedTerrain {
        row: usize,
        actual: usize,
        expected: usize,
    },
    #[error("level releases {0} lemmings but has no entrance")]
    NoEntrance(u32),
    #[error("release rate {0} exceeds the maximum of 99")]
    ReleaseRateTooHigh(u32),
    #[error("time limit must be positive")]
    NoTime,
}

impl LevelDefinition {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        let expected = match self.terrain.first() {
            Some(row) => row.chars().count(),
            None => return Err(LevelError::EmptyTerrain),
        };
        if expected == 0 {
            return Err(LevelError::EmptyTerrain);
        }
        for (row, line) in self.terrain.iter().enumerate() {
            let actual = line.chars().count();
            if actual != expected {
                return Err(LevelError::RaggedTerrain {
                    row,
                    actual,
                    expected,
                });
            }
        }
        if self.release_count > 0 && self.entrances.is_empty() {
            return Err(LevelError::NoEntrance(self.release_count));
        }
        if self.release_rate > MAX_RELEASE_RATE {
            return Err(LevelError::ReleaseRateTooHigh(self.release_rate));
        }
        if self.time_limit_secs == 0 {
            return Err(LevelError::NoTime);
        }
        Ok(())
    }

    pub fn build_terrain(&self) -> Terrain {
        Terrain::from_rows(&self.terrain)
    }

    pub fn build_triggers(&self) -> Vec<Trigger> {
        self.triggers.iter().map(TriggerDef::to_trigger).collect()
    }
}
