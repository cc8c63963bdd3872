// Core types shared across the simulation.
//
// Defines the lemming identifier (a stable index into the manager's lemming
// list), the finite action-state enum that keys the handler table, the
// assignable skills with their replay integer codes, trigger zone kinds, and
// the overall game outcome. All types derive `Serialize` and `Deserialize` so
// they can appear in level JSON, render snapshots, and game results.
//
// **Critical constraint: determinism.** `LemmingId`s are assigned in spawn
// order and never reused. Commands reference lemmings by id, so index
// stability is what makes replays valid.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identifier for a lemming: its index in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LemmingId(pub u32);

impl LemmingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LemmingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lemming#{}", self.0)
    }
}

/// A pixel position in terrain coordinates. `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Action states
// ---------------------------------------------------------------------------

/// Every state a lemming can be in. Each non-terminal state has exactly one
/// handler in the action table; `OutOfLevel` is handled by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LemmingState {
    Walking,
    Falling,
    Jumping,
    Digging,
    Climbing,
    Hoisting,
    Building,
    Blocking,
    Bashing,
    Floating,
    Mining,
    Drowning,
    Exiting,
    Ohno,
    Exploding,
    Shrugging,
    Splatting,
    OutOfLevel,
}

impl LemmingState {
    /// Number of variants; the size of the handler table.
    pub const COUNT: usize = 18;

    pub const ALL: [LemmingState; Self::COUNT] = [
        LemmingState::Walking,
        LemmingState::Falling,
        LemmingState::Jumping,
        LemmingState::Digging,
        LemmingState::Climbing,
        LemmingState::Hoisting,
        LemmingState::Building,
        LemmingState::Blocking,
        LemmingState::Bashing,
        LemmingState::Floating,
        LemmingState::Mining,
        LemmingState::Drowning,
        LemmingState::Exiting,
        LemmingState::Ohno,
        LemmingState::Exploding,
        LemmingState::Shrugging,
        LemmingState::Splatting,
        LemmingState::OutOfLevel,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Limited-count abilities the player assigns to individual lemmings.
///
/// The integer codes are part of the replay format (`s<code>`) and must not
/// change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    Climber,
    Floater,
    Bomber,
    Blocker,
    Builder,
    Basher,
    Miner,
    Digger,
}

impl Skill {
    pub const ALL: [Skill; 8] = [
        Skill::Climber,
        Skill::Floater,
        Skill::Bomber,
        Skill::Blocker,
        Skill::Builder,
        Skill::Basher,
        Skill::Miner,
        Skill::Digger,
    ];

    /// Replay code for this skill.
    pub fn code(self) -> i64 {
        match self {
            Skill::Climber => 1,
            Skill::Floater => 2,
            Skill::Bomber => 3,
            Skill::Blocker => 4,
            Skill::Builder => 5,
            Skill::Basher => 6,
            Skill::Miner => 7,
            Skill::Digger => 8,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

// ---------------------------------------------------------------------------
// Triggers and outcomes
// ---------------------------------------------------------------------------

/// What a trigger zone does to a lemming that enters it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerType {
    /// Sentinel: no zone matched (or all matches are cooling down).
    None,
    Drown,
    ExitLevel,
    Kill,
    Trap,
    BlockerLeft,
    BlockerRight,
}

/// Overall game outcome as seen by the victory check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Running,
    Succeeded,
    FailedOutOfTime,
    FailedLessLemmings,
}

impl GameState {
    pub fn is_finished(self) -> bool {
        self != GameState::Running
    }
}
