// Game: the tick driver for one level.
//
// `Game` owns the clock, the command dispatcher and the `SimState`, and
// runs the fixed tick sequence:
//
//   before-tick:  dispatcher applies replayed commands due before this tick
//   tick:         clock.tick(), sim.step(), victory check
//
// When the victory tracker reports a terminal state, the game finalizes the
// tracker, stops the clock and stores a `GameResult` (state, survivors,
// duration, replay text). After that every tick and command is a no-op and
// the result stays queryable.
//
// Real-time frontends call `advance(elapsed)`, which asks the clock how many
// ticks are due. Tests and the headless runner call `tick()` or
// `run_to_end()` directly.
//
// See also: `clock.rs`, `replay.rs`, `sim.rs`.

use crate::clock::Clock;
use crate::command::Command;
use crate::config::{LevelDefinition, LevelError, SimConfig};
use crate::event::{SimEvent, SimEventKind};
use crate::lemming::LemmingView;
use crate::replay::CommandDispatcher;
use crate::sim::SimState;
use crate::terrain::MaskSet;
use crate::types::GameState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output of running one or more ticks.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    /// Narrative events emitted, in order.
    pub events: Vec<SimEvent>,
}

/// Final outcome of a level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub state: GameState,
    pub survivors: u32,
    pub survivor_percentage: u32,
    /// Ticks played.
    pub duration: u64,
    /// Replay text reproducing the run.
    pub replay: String,
}

#[derive(Debug)]
pub struct Game {
    level_name: String,
    clock: Clock,
    dispatcher: CommandDispatcher,
    sim: SimState,
    state: GameState,
    result: Option<GameResult>,
}

impl Game {
    /// Set up `level`. The clock starts running.
    pub fn new(level: &LevelDefinition, config: SimConfig, masks: MaskSet) -> Result<Self, LevelError> {
        level.validate()?;
        let mut clock = Clock::new(level.time_limit_secs, config.tick_ms);
        clock.resume();
        tracing::debug!(level = %level.name, ticks = clock.ticks_time_limit(), "game created");

        Ok(Self {
            level_name: level.name.clone(),
            clock,
            dispatcher: CommandDispatcher::new(),
            sim: SimState::from_level(level, config, masks),
            state: GameState::Running,
            result: None,
        })
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// Run one tick. No-op once the game is decided.
    pub fn tick(&mut self) -> StepResult {
        if self.state.is_finished() {
            return StepResult::default();
        }

        let next = self.clock.tick_index() + 1;
        self.dispatcher.before_tick(next, &mut self.sim);
        let tick = self.clock.tick();
        let mut events = self.sim.step(tick);

        self.state = self.sim.victory.game_state(self.clock.left_ticks());
        if self.state.is_finished() {
            self.finish();
            events.push(SimEvent {
                tick,
                kind: SimEventKind::GameFinished { state: self.state },
            });
        }
        StepResult { events }
    }

    /// Account for `elapsed` wall time and run the ticks that are due.
    pub fn advance(&mut self, elapsed: Duration) -> StepResult {
        let due = self.clock.advance(elapsed);
        let mut result = StepResult::default();
        for _ in 0..due {
            if self.state.is_finished() {
                break;
            }
            result.events.extend(self.tick().events);
        }
        result
    }

    /// Tick until the game is decided or `max_ticks` ticks have run.
    pub fn run_to_end(&mut self, max_ticks: u64) -> Option<&GameResult> {
        for _ in 0..max_ticks {
            if self.state.is_finished() {
                break;
            }
            self.tick();
        }
        self.result.as_ref()
    }

    fn finish(&mut self) {
        self.sim.victory.finalize();
        self.clock.stop();
        let result = GameResult {
            state: self.state,
            survivors: self.sim.victory.survivor_count(),
            survivor_percentage: self.sim.victory.survivor_percentage(),
            duration: self.clock.tick_index(),
            replay: self.dispatcher.serialize(),
        };
        tracing::debug!(
            level = %self.level_name,
            state = ?result.state,
            survivors = result.survivors,
            duration = result.duration,
            "game finished"
        );
        self.result = Some(result);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Execute a live command at the current tick.
    pub fn queue_command(&mut self, command: Command) -> bool {
        if self.state.is_finished() {
            return false;
        }
        self.dispatcher
            .queue_command(command, self.clock.tick_index(), &mut self.sim)
    }

    /// Schedule a recorded run. Returns how many commands were scheduled.
    pub fn load_replay(&mut self, text: &str) -> usize {
        self.dispatcher.load_replay(text)
    }

    /// Replay text of everything executed so far.
    pub fn replay_text(&self) -> String {
        self.dispatcher.serialize()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn sim(&self) -> &SimState {
        &self.sim
    }

    pub fn views(&self) -> Vec<LemmingView> {
        self.sim.views()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Skill};
    use std::collections::BTreeMap;

    fn level(time_limit_secs: u32) -> LevelDefinition {
        let mut terrain = vec![".".repeat(40); 30];
        for row in terrain.iter_mut().skip(20) {
            *row = "#".repeat(40);
        }
        LevelDefinition {
            name: "test".into(),
            terrain,
            entrances: vec![Point::new(10, 10)],
            release_count: 1,
            need_count: 1,
            release_rate: 99,
            time_limit_secs,
            skills: BTreeMap::from([(Skill::Bomber, 1)]),
            triggers: Vec::new(),
        }
    }

    #[test]
    fn invalid_level_is_refused() {
        let mut bad = level(10);
        bad.time_limit_secs = 0;
        assert!(matches!(
            Game::new(&bad, SimConfig::default(), MaskSet::builtin()),
            Err(LevelError::NoTime)
        ));
    }

    #[test]
    fn runs_out_of_time() {
        let mut game = Game::new(&level(1), SimConfig::default(), MaskSet::builtin()).unwrap();
        let result = game.run_to_end(1000).cloned().unwrap();
        assert_eq!(result.state, GameState::FailedOutOfTime);
        assert_eq!(result.duration, 16);
        assert!(game.clock().is_stopped());
        assert!(game.tick().events.is_empty());
        assert!(!game.queue_command(Command::Nuke));
    }

    #[test]
    fn advance_runs_due_ticks() {
        let mut game = Game::new(&level(60), SimConfig::default(), MaskSet::builtin()).unwrap();
        let result = game.advance(Duration::from_millis(300));
        assert_eq!(game.clock().tick_index(), 5);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::LemmingReleased { .. })));

        game.clock_mut().suspend();
        game.advance(Duration::from_secs(1));
        assert_eq!(game.clock().tick_index(), 5);
    }

    #[test]
    fn bombing_the_only_lemming_fails_the_level() {
        let mut game = Game::new(&level(60), SimConfig::default(), MaskSet::builtin()).unwrap();
        for _ in 0..10 {
            game.tick();
        }
        assert!(game.queue_command(Command::SelectSkill {
            skill: Skill::Bomber
        }));
        assert!(game.queue_command(Command::AssignSkill {
            lemming_id: crate::types::LemmingId(0)
        }));

        let result = game.run_to_end(1000).cloned().unwrap();
        assert_eq!(result.state, GameState::FailedLessLemmings);
        assert_eq!(result.survivors, 0);
        assert_eq!(result.replay, "10=s3&10=l0");
        assert_eq!(game.result(), Some(&result));
    }
}
