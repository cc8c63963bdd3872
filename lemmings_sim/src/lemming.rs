// The lemming agent.
//
// A `Lemming` is plain data: position, facing, a tick-local frame counter,
// a per-action scratch counter (`state`), permanent abilities (climbing,
// parachute), lifecycle flags, the current `LemmingState`, and the optional
// bomber countdown. All behavior lives in the action handlers; the manager
// switches `action` when a handler returns a transition.
//
// Lemmings are never deleted from the manager's list. `removed` marks them
// dead or saved; their index stays valid so replayed commands keep
// targeting the same lemming.
//
// `disabled` means the lemming is in a terminal animation (exiting,
// drowning, splatting, exploding). Disabled lemmings ignore triggers and
// reject every skill.
//
// See also: `action/` for the handlers, `manager.rs` for the tick loop.

use crate::types::{LemmingId, LemmingState};
use serde::{Deserialize, Serialize};

/// A single lemming.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lemming {
    pub id: LemmingId,
    /// Foot pixel; the lemming stands when `(x, y)` is solid.
    pub x: i32,
    pub y: i32,
    pub look_right: bool,
    /// Animation / sub-step counter. Reset to 0 on every action change.
    pub frame_index: u32,
    /// Scratch counter whose meaning depends on the action (fall distance,
    /// bricks laid, entry flag). Reset to 0 on every action change.
    pub state: u32,
    pub can_climb: bool,
    pub has_parachute: bool,
    pub disabled: bool,
    pub removed: bool,
    pub action: LemmingState,
    /// Ticks left until the bomber goes "oh no". `None` when not armed.
    pub countdown: Option<u32>,
}

impl Lemming {
    pub fn new(id: LemmingId, x: i32, y: i32) -> Self {
        Self {
            id,
            x,
            y,
            look_right: true,
            frame_index: 0,
            state: 0,
            can_climb: false,
            has_parachute: false,
            disabled: false,
            removed: false,
            action: LemmingState::Falling,
            countdown: None,
        }
    }

    /// Switch to a new action, resetting the per-action counters.
    pub fn set_action(&mut self, action: LemmingState) {
        self.action = action;
        self.frame_index = 0;
        self.state = 0;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn remove(&mut self) {
        self.removed = true;
        self.countdown = None;
    }

    /// True while the lemming is in play and able to react to the world.
    pub fn is_active(&self) -> bool {
        !self.removed && !self.disabled
    }

    /// Horizontal unit step in the facing direction.
    pub fn dir(&self) -> i32 {
        if self.look_right { 1 } else { -1 }
    }

    pub fn turn_around(&mut self) {
        self.look_right = !self.look_right;
    }

    /// The numeral a renderer shows above an armed bomber (5, 4, ... 1).
    pub fn countdown_numeral(&self, ticks_per_numeral: u32) -> Option<u32> {
        self.countdown
            .map(|ticks| ticks.div_ceil(ticks_per_numeral.max(1)))
    }
}

/// Read-only render state for one lemming, produced once per tick for the
/// external renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LemmingView {
    pub id: LemmingId,
    pub x: i32,
    pub y: i32,
    pub look_right: bool,
    pub action: &'static str,
    pub frame_index: u32,
    pub countdown_numeral: Option<u32>,
}
