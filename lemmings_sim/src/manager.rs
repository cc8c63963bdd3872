// Lemming manager: owns every lemming and runs the per-tick agent loop.
//
// One `tick()` does, in order:
// 1. Spawn: while lemmings are left to release, count ticks toward the
//    release interval (`release_interval_base - release_rate`) and drop a
//    new falling lemming at the next entrance (round-robin) each time the
//    counter wraps.
// 2. Nuke: once armed, give the next eligible lemming a bomber countdown.
//    Exactly one per tick, in id order.
// 3. Agents, in id order: out-of-level check, action `process()` and its
//    transition, trigger hit-test and its transition (skipped for removed
//    or disabled lemmings), bomber countdown.
//
// Entering drowning, exiting, splatting or exploding disables the lemming at
// once, so skills and a running countdown can't touch it later in the tick.
//
// Lemmings are never deleted from the vector; a removed lemming keeps its
// slot so `LemmingId` stays a stable index. Lemmings released during step 1
// are processed in step 3 of the same tick.
//
// See also: `action/` for the handlers, `sim.rs` which owns the manager
// alongside the world it acts on, `victory.rs` for the counts updated here.
//
// **Critical constraint: determinism.** Processing order is the vector
// order. `skill_actions` is an `FxHashMap` but is only ever used for
// lookups, never iterated.

use crate::action::countdown::BomberCountdown;
use crate::action::{ActionContext, ActionTable};
use crate::config::SimConfig;
use crate::event::{SimEvent, SimEventKind};
use crate::lemming::{Lemming, LemmingView};
use crate::types::{LemmingId, LemmingState, Point, Skill, TriggerType};
use rustc_hash::FxHashMap;
use std::fmt;

/// Half-size of the hit box `lemming_at` uses, centred on the body.
const HIT_RADIUS: i32 = 5;

pub struct LemmingManager {
    lemmings: Vec<Lemming>,
    actions: ActionTable,
    /// Which handler accepts each state-changing skill. Bomber is absent:
    /// it goes through `bomber`.
    skill_actions: FxHashMap<Skill, LemmingState>,
    bomber: BomberCountdown,
    entrances: Vec<Point>,
    next_entrance: usize,
    release_tick_index: u32,
    /// Index of the next lemming to arm, once the nuke is on.
    nuke_cursor: Option<usize>,
}

impl LemmingManager {
    pub fn new(entrances: Vec<Point>, config: &SimConfig) -> Self {
        Self::with_actions(entrances, config, ActionTable::standard())
    }

    /// A manager using a custom handler table.
    pub fn with_actions(entrances: Vec<Point>, config: &SimConfig, actions: ActionTable) -> Self {
        let skill_actions = [
            (Skill::Climber, LemmingState::Climbing),
            (Skill::Floater, LemmingState::Floating),
            (Skill::Blocker, LemmingState::Blocking),
            (Skill::Builder, LemmingState::Building),
            (Skill::Basher, LemmingState::Bashing),
            (Skill::Miner, LemmingState::Mining),
            (Skill::Digger, LemmingState::Digging),
        ]
        .into_iter()
        .collect();

        Self {
            lemmings: Vec::new(),
            actions,
            skill_actions,
            bomber: BomberCountdown::new(config.bomber_countdown_ticks),
            entrances,
            next_entrance: 0,
            release_tick_index: 0,
            nuke_cursor: None,
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    pub fn tick(&mut self, ctx: &mut ActionContext<'_>, events: &mut Vec<SimEvent>) {
        self.spawn(ctx, events);
        self.advance_nuke();

        for index in 0..self.lemmings.len() {
            self.process_lemming(index, ctx, events);
        }
    }

    fn spawn(&mut self, ctx: &mut ActionContext<'_>, events: &mut Vec<SimEvent>) {
        if ctx.victory.left_count() == 0 || self.entrances.is_empty() {
            return;
        }

        let interval = ctx.config.release_interval(ctx.victory.release_rate()).max(1);
        self.release_tick_index += 1;
        if self.release_tick_index < interval {
            return;
        }
        self.release_tick_index = 0;

        let entrance = self.entrances[self.next_entrance % self.entrances.len()];
        self.next_entrance += 1;

        let id = LemmingId(self.lemmings.len() as u32);
        self.lemmings.push(Lemming::new(id, entrance.x, entrance.y));
        ctx.victory.release_one();

        tracing::debug!(tick = ctx.tick, %id, x = entrance.x, y = entrance.y, "lemming released");
        events.push(SimEvent {
            tick: ctx.tick,
            kind: SimEventKind::LemmingReleased { lemming_id: id },
        });
    }

    fn advance_nuke(&mut self) {
        let Some(mut cursor) = self.nuke_cursor else {
            return;
        };
        while cursor < self.lemmings.len() {
            let armed = self.bomber.arm(&mut self.lemmings[cursor]);
            cursor += 1;
            if armed {
                break;
            }
        }
        self.nuke_cursor = Some(cursor);
    }

    fn process_lemming(
        &mut self,
        index: usize,
        ctx: &mut ActionContext<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        if self.lemmings[index].removed {
            return;
        }

        if self.is_outside(&self.lemmings[index], ctx) {
            self.transition(index, LemmingState::OutOfLevel, ctx, events);
            return;
        }

        let action = self.lemmings[index].action;
        let Some(handler) = self.actions.get(action) else {
            tracing::error!(
                tick = ctx.tick,
                id = %self.lemmings[index].id,
                ?action,
                "no handler registered for action; removing lemming"
            );
            self.transition(index, LemmingState::OutOfLevel, ctx, events);
            return;
        };
        if let Some(next) = handler.process(ctx, &mut self.lemmings[index]) {
            self.transition(index, next, ctx, events);
        }

        let lem = &mut self.lemmings[index];
        if lem.is_active() {
            let next = match ctx.triggers.test(lem.x, lem.y, ctx.tick) {
                TriggerType::None => None,
                TriggerType::Drown => Some(LemmingState::Drowning),
                TriggerType::ExitLevel => Some(LemmingState::Exiting),
                TriggerType::Kill => Some(LemmingState::Splatting),
                TriggerType::Trap => Some(LemmingState::Hoisting),
                TriggerType::BlockerLeft => {
                    lem.look_right = false;
                    None
                }
                TriggerType::BlockerRight => {
                    lem.look_right = true;
                    None
                }
            };
            if let Some(next) = next {
                self.transition(index, next, ctx, events);
            }
        }

        if let Some(next) = self.bomber.process(&mut self.lemmings[index]) {
            self.transition(index, next, ctx, events);
        }
    }

    fn is_outside(&self, lem: &Lemming, ctx: &ActionContext<'_>) -> bool {
        let terrain = &*ctx.terrain;
        lem.x < 0
            || lem.x >= terrain.width as i32
            || lem.y >= terrain.height as i32 + ctx.config.out_of_level_margin
    }

    /// Move lemming `index` into `next`. `OutOfLevel` takes it out of play.
    fn transition(
        &mut self,
        index: usize,
        next: LemmingState,
        ctx: &mut ActionContext<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        let lem = &mut self.lemmings[index];
        let from = lem.action;

        if next == LemmingState::OutOfLevel {
            let saved = from == LemmingState::Exiting;
            lem.action = LemmingState::OutOfLevel;
            lem.remove();
            ctx.victory.remove_one();
            tracing::debug!(tick = ctx.tick, id = %lem.id, saved, "lemming removed");
            events.push(SimEvent {
                tick: ctx.tick,
                kind: SimEventKind::LemmingRemoved {
                    lemming_id: lem.id,
                    saved,
                },
            });
            return;
        }

        lem.set_action(next);
        if matches!(
            next,
            LemmingState::Drowning
                | LemmingState::Exiting
                | LemmingState::Splatting
                | LemmingState::Exploding
        ) {
            lem.disable();
        }
        tracing::debug!(tick = ctx.tick, id = %lem.id, ?from, to = ?next, "action changed");
        events.push(SimEvent {
            tick: ctx.tick,
            kind: SimEventKind::ActionChanged {
                lemming_id: lem.id,
                from,
                to: next,
            },
        });
    }

    // -----------------------------------------------------------------------
    // Player actions
    // -----------------------------------------------------------------------

    /// Offer `skill` to lemming `id`. Returns `true` if it was accepted.
    /// Unknown ids and removed lemmings reject.
    pub fn do_lemming_action(&mut self, id: LemmingId, skill: Skill) -> bool {
        let Some(lem) = self.lemmings.get_mut(id.index()) else {
            return false;
        };
        if lem.removed {
            return false;
        }
        if skill == Skill::Bomber {
            return self.bomber.arm(lem);
        }
        let Some(&state) = self.skill_actions.get(&skill) else {
            return false;
        };
        match self.actions.get(state) {
            Some(handler) => handler.trigger_lem_action(lem),
            None => false,
        }
    }

    /// Start the nuke. Returns `false` if it was already running.
    pub fn do_nuke_all_lemmings(&mut self) -> bool {
        if self.nuke_cursor.is_some() {
            return false;
        }
        self.nuke_cursor = Some(0);
        true
    }

    pub fn is_nuking(&self) -> bool {
        self.nuke_cursor.is_some()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn lemming(&self, id: LemmingId) -> Option<&Lemming> {
        self.lemmings.get(id.index())
    }

    /// Every lemming ever released, including removed ones.
    pub fn lemmings(&self) -> &[Lemming] {
        &self.lemmings
    }

    /// Lemmings still in play.
    pub fn live_count(&self) -> usize {
        self.lemmings.iter().filter(|l| !l.removed).count()
    }

    /// Render snapshot of every lemming still in play.
    pub fn lemming_views(&self, config: &SimConfig) -> Vec<LemmingView> {
        self.lemmings
            .iter()
            .filter(|l| !l.removed)
            .map(|l| LemmingView {
                id: l.id,
                x: l.x,
                y: l.y,
                look_right: l.look_right,
                action: self.actions.name_of(l.action),
                frame_index: l.frame_index,
                countdown_numeral: l.countdown_numeral(config.countdown_ticks_per_numeral),
            })
            .collect()
    }

    /// The first active lemming whose body is near `(x, y)`.
    pub fn lemming_at(&self, x: i32, y: i32) -> Option<LemmingId> {
        self.lemmings
            .iter()
            .find(|l| {
                l.is_active()
                    && (l.x - x).abs() <= HIT_RADIUS
                    && (l.y - HIT_RADIUS - y).abs() <= HIT_RADIUS
            })
            .map(|l| l.id)
    }
}

impl fmt::Debug for LemmingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LemmingManager")
            .field("lemmings", &self.lemmings.len())
            .field("actions", &self.actions)
            .field("release_tick_index", &self.release_tick_index)
            .field("nuke_cursor", &self.nuke_cursor)
            .finish()
    }
}
