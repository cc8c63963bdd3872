// Release and survival bookkeeping, and the win/lose decision.
//
// `VictoryTracker` is a bag of counters:
// - `left_count`:     lemmings still waiting in the entrance.
// - `out_count`:      lemmings released and still in play.
// - `survivor_count`: lemmings that reached an exit.
// - `release_rate`:   current spawn rate, clamped to `[min_release_rate, 99]`.
//
// The level is decided once nothing is waiting and nothing is in play, or
// when time runs out, whichever comes first. Reaching `need_count` survivors
// is a success in both cases.
//
// After `finalize()` every mutator is a no-op, so stray calls from a
// still-running handler after the game ends cannot change the result.
//
// See also: `manager.rs` (spawn / out-of-level calls), `action/terminal.rs`
// (exiting adds survivors), `command.rs` (release-rate and nuke commands),
// `game.rs` (finalization).

use crate::types::GameState;
use serde::{Deserialize, Serialize};

/// Highest release rate the player can select.
pub const MAX_RELEASE_RATE: u32 = 99;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryTracker {
    need_count: u32,
    release_count: u32,
    left_count: u32,
    out_count: u32,
    survivor_count: u32,
    min_release_rate: u32,
    release_rate: u32,
    finalized: bool,
}

impl VictoryTracker {
    /// The level's starting release rate is also the lowest the player can
    /// dial it down to.
    pub fn new(need_count: u32, release_count: u32, release_rate: u32) -> Self {
        let release_rate = release_rate.min(MAX_RELEASE_RATE);
        Self {
            need_count,
            release_count,
            left_count: release_count,
            out_count: 0,
            survivor_count: 0,
            min_release_rate: release_rate,
            release_rate,
            finalized: false,
        }
    }

    /// One lemming left the entrance.
    pub fn release_one(&mut self) {
        if self.finalized {
            return;
        }
        self.left_count = self.left_count.saturating_sub(1);
        self.out_count += 1;
    }

    /// One lemming left play (saved or dead).
    pub fn remove_one(&mut self) {
        if self.finalized {
            return;
        }
        self.out_count = self.out_count.saturating_sub(1);
    }

    pub fn add_survivor(&mut self) {
        if self.finalized {
            return;
        }
        self.survivor_count += 1;
    }

    /// Nuke: nobody else gets released.
    pub fn do_nuke(&mut self) {
        if self.finalized {
            return;
        }
        self.left_count = 0;
    }

    /// Change the release rate by `delta`, clamped to the allowed range.
    /// Returns `false` if the rate did not change.
    pub fn change_release_rate(&mut self, delta: i64) -> bool {
        if self.finalized {
            return false;
        }
        let wanted = i64::from(self.release_rate).saturating_add(delta);
        let bounded = wanted.clamp(
            i64::from(self.min_release_rate),
            i64::from(MAX_RELEASE_RATE),
        ) as u32;
        if bounded == self.release_rate {
            return false;
        }
        self.release_rate = bounded;
        true
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn need_count(&self) -> u32 {
        self.need_count
    }

    pub fn release_count(&self) -> u32 {
        self.release_count
    }

    pub fn left_count(&self) -> u32 {
        self.left_count
    }

    pub fn out_count(&self) -> u32 {
        self.out_count
    }

    pub fn survivor_count(&self) -> u32 {
        self.survivor_count
    }

    pub fn release_rate(&self) -> u32 {
        self.release_rate
    }

    pub fn min_release_rate(&self) -> u32 {
        self.min_release_rate
    }

    /// Whole-number percentage of the level's lemmings that survived.
    pub fn survivor_percentage(&self) -> u32 {
        if self.release_count == 0 {
            return 0;
        }
        self.survivor_count * 100 / self.release_count
    }

    /// Decide the game state given the remaining time in ticks.
    pub fn game_state(&self, left_ticks: u64) -> GameState {
        let has_won = self.survivor_count >= self.need_count;
        if left_ticks == 0 {
            return if has_won {
                GameState::Succeeded
            } else {
                GameState::FailedOutOfTime
            };
        }
        if self.left_count > 0 || self.out_count > 0 {
            return GameState::Running;
        }
        if has_won {
            GameState::Succeeded
        } else {
            GameState::FailedLessLemmings
        }
    }
}
