// Narrative simulation events.
//
// The simulation emits `SimEvent`s as output so external collaborators
// (sound effects, UI notifications, the headless runner's log) can react
// without polling state. Events are informational only: nothing inside the
// simulation reads them back, and dropping them changes nothing.
//
// See also: `manager.rs` and `game.rs`, which push events during a tick, and
// `game.rs` for `StepResult`, which hands them to the caller.

use crate::types::{GameState, LemmingId, LemmingState, Skill};
use serde::{Deserialize, Serialize};

/// A narrative event emitted during a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A lemming dropped out of an entrance.
    LemmingReleased { lemming_id: LemmingId },
    /// A lemming accepted a skill.
    SkillAssigned { lemming_id: LemmingId, skill: Skill },
    /// A lemming changed action.
    ActionChanged {
        lemming_id: LemmingId,
        from: LemmingState,
        to: LemmingState,
    },
    /// A lemming left play. `saved` is true if it walked out of an exit.
    LemmingRemoved { lemming_id: LemmingId, saved: bool },
    /// The nuke was armed.
    NukeStarted,
    /// The level was decided.
    GameFinished { state: GameState },
}
