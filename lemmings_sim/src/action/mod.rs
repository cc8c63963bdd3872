// Action handlers: the per-lemming state machine.
//
// Each `LemmingState` (except the terminal `OutOfLevel`) has one stateless
// handler implementing `ActionHandler`. All per-lemming data lives on the
// `Lemming` itself (`frame_index`, `state`, position), so a single handler
// instance serves every lemming in that state.
//
// `process()` runs once per tick for a lemming in the handler's state. It
// mutates the lemming (and, for some actions, the terrain or trigger
// registry through `ActionContext`) and returns either `None` (stay) or the
// next state. The manager applies the transition, which resets
// `frame_index` and `state`.
//
// `trigger_lem_action()` is the entry point for skill assignment. Only the
// skill-bearing handlers (digging, climbing, floating, blocking, bashing,
// building, mining) can accept; the default implementation rejects. The
// bomber skill is not a state: it arms a countdown (see `countdown.rs`)
// that later forces `Ohno`, which in turn leads to `Exploding`.
//
// Handlers are grouped by file:
// - `movement.rs`:  walking, falling, jumping, climbing, hoisting, floating.
// - `skill.rs`:     digging, building, bashing, mining, blocking.
// - `terminal.rs`:  drowning, exiting, splatting, oh-no, exploding, shrugging.
// - `countdown.rs`: the bomber countdown.
//
// `ActionTable` maps each state to its handler. A missing entry is an
// internal-consistency fault handled by the manager, not a gameplay event.
//
// **Critical constraint: determinism.** Frame thresholds in the handlers
// (`% 16 > 10` for bashing, mask frames 2..=5, etc.) define observable
// gameplay. Changing any of them invalidates every recorded replay.

pub mod countdown;
pub mod movement;
pub mod skill;
pub mod terminal;

use crate::config::SimConfig;
use crate::lemming::Lemming;
use crate::terrain::{MaskSet, Terrain};
use crate::trigger::TriggerRegistry;
use crate::types::LemmingState;
use crate::victory::VictoryTracker;
use std::fmt;

/// The world a handler may read and edit while processing one lemming.
pub struct ActionContext<'a> {
    pub terrain: &'a mut Terrain,
    pub triggers: &'a mut TriggerRegistry,
    pub victory: &'a mut VictoryTracker,
    pub masks: &'a MaskSet,
    pub config: &'a SimConfig,
    pub tick: u64,
}

/// One strategy per action state.
pub trait ActionHandler {
    /// The state this handler implements.
    fn state(&self) -> LemmingState;

    /// Short name reported to the renderer.
    fn name(&self) -> &'static str;

    /// Advance `lem` by one tick. Returns the next state, if any.
    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState>;

    /// Try to put `lem` into this action because the player assigned the
    /// matching skill. Returns `true` if accepted.
    fn trigger_lem_action(&self, _lem: &mut Lemming) -> bool {
        false
    }
}

/// True if `lem` may switch to the task action `target` (digging, building,
/// bashing, mining, blocking).
///
/// Only lemmings on their feet and not already doing `target` qualify.
/// Blockers never leave blocking through a skill.
pub(crate) fn accepts_task(lem: &Lemming, target: LemmingState) -> bool {
    if !lem.is_active() || lem.action == target {
        return false;
    }
    matches!(
        lem.action,
        LemmingState::Walking
            | LemmingState::Shrugging
            | LemmingState::Digging
            | LemmingState::Building
            | LemmingState::Bashing
            | LemmingState::Mining
    )
}

/// Dispatch table from state to handler.
pub struct ActionTable {
    handlers: [Option<Box<dyn ActionHandler>>; LemmingState::COUNT],
}

impl ActionTable {
    /// A table with no handlers registered.
    pub fn empty() -> Self {
        Self {
            handlers: std::array::from_fn(|_| None),
        }
    }

    /// The full set of handlers used by the game.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(Box::new(movement::Walking));
        table.register(Box::new(movement::Falling));
        table.register(Box::new(movement::Jumping));
        table.register(Box::new(movement::Climbing));
        table.register(Box::new(movement::Hoisting));
        table.register(Box::new(movement::Floating));
        table.register(Box::new(skill::Digging));
        table.register(Box::new(skill::Building));
        table.register(Box::new(skill::Bashing));
        table.register(Box::new(skill::Mining));
        table.register(Box::new(skill::Blocking));
        table.register(Box::new(terminal::Drowning));
        table.register(Box::new(terminal::Exiting));
        table.register(Box::new(terminal::Splatting));
        table.register(Box::new(terminal::Ohno));
        table.register(Box::new(terminal::Exploding));
        table.register(Box::new(terminal::Shrugging));
        table
    }

    /// Install `handler` under its own state, replacing any previous one.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) {
        let index = handler.state().index();
        self.handlers[index] = Some(handler);
    }

    /// Remove the handler for `state`, returning it.
    pub fn unregister(&mut self, state: LemmingState) -> Option<Box<dyn ActionHandler>> {
        self.handlers[state.index()].take()
    }

    pub fn get(&self, state: LemmingState) -> Option<&dyn ActionHandler> {
        self.handlers[state.index()].as_deref()
    }

    pub fn name_of(&self, state: LemmingState) -> &'static str {
        self.get(state).map_or("unknown", |h| h.name())
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().flatten().map(|h| h.name()))
            .finish()
    }
}
