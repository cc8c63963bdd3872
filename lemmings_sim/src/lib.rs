// lemmings_sim: pure Rust simulation library for a lemmings colony.
//
// This crate contains all simulation logic: the mutable terrain bitmap, the
// per-lemming action state machine, trigger zones, release/victory
// bookkeeping, the fixed-step clock, and the command log that makes a run
// reproducible from a compact replay string. It has no rendering, audio or
// asset-decoding dependencies and can be tested, benchmarked, and run
// headless.
//
// Module overview:
// - `types.rs`:    LemmingId, LemmingState, Skill, TriggerType, GameState.
// - `config.rs`:   SimConfig tunables + LevelDefinition (JSON-loadable level metadata).
// - `terrain.rs`:  Solid/empty bitmap, palette buffer, Mask stamping, MaskSet.
// - `trigger.rs`:  Rectangular trigger zones with cooldown and owner ids.
// - `lemming.rs`:  The Lemming agent and its render view.
// - `action/`:     ActionHandler trait, dispatch table, one handler per state,
//                  and the bomber countdown.
// - `manager.rs`:  LemmingManager: spawning, nuking, per-lemming tick loop.
// - `victory.rs`:  VictoryTracker: release/survivor counters, win/lose decision.
// - `skills.rs`:   GameSkills: remaining skill counts and the selected skill.
// - `clock.rs`:    Clock: tick counter and fixed-step scheduling.
// - `command.rs`:  Command: the five replayable user operations.
// - `replay.rs`:   CommandLog + CommandDispatcher: logging, parsing, replay.
// - `event.rs`:    SimEvent: narrative output for audio/UI collaborators.
// - `sim.rs`:      SimState: terrain, triggers, lemmings, victory, skills.
// - `game.rs`:     Game: clock + dispatcher + SimState; the tick driver.
//
// **Critical constraint: determinism.** The simulation is a pure function of
// `(level, config, masks, replay)`. There is no randomness, no system time
// inside a tick, and no `HashMap` iteration. Use `BTreeMap` or index order
// wherever iteration order is observable.

pub mod action;
pub mod clock;
pub mod command;
pub mod config;
pub mod event;
pub mod game;
pub mod lemming;
pub mod manager;
pub mod replay;
pub mod sim;
pub mod skills;
pub mod terrain;
pub mod trigger;
pub mod types;
pub mod victory;
