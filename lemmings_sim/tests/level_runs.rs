// End-to-end runs of whole levels through `Game`.
//
// Each test builds a small level in memory, drives it with live commands
// and/or replay text, and checks the outcome the player would see: release
// timing, win/lose state, skill accounting, and bit-identical replays.

use std::collections::BTreeMap;

use lemmings_sim::command::Command;
use lemmings_sim::config::{LevelDefinition, SimConfig, TriggerDef};
use lemmings_sim::event::SimEventKind;
use lemmings_sim::game::Game;
use lemmings_sim::terrain::{BRICK_PALETTE_INDEX, MaskSet};
use lemmings_sim::types::{GameState, LemmingId, LemmingState, Point, Skill, TriggerType};

const WIDTH: usize = 80;
const HEIGHT: usize = 40;
const FLOOR_Y: usize = 30;

/// Flat 80x40 level with a 10 px thick floor, one entrance at x=10 and an
/// exit zone at x=70.
fn flat_level(release_count: u32, need_count: u32, release_rate: u32) -> LevelDefinition {
    let terrain = (0..HEIGHT)
        .map(|y| {
            let cell = if y >= FLOOR_Y { "#" } else { "." };
            cell.repeat(WIDTH)
        })
        .collect();
    LevelDefinition {
        name: "flat".into(),
        terrain,
        entrances: vec![Point::new(10, 20)],
        release_count,
        need_count,
        release_rate,
        time_limit_secs: 60,
        skills: BTreeMap::from([(Skill::Digger, 1), (Skill::Builder, 2)]),
        triggers: vec![TriggerDef {
            kind: TriggerType::ExitLevel,
            x1: 70,
            y1: 25,
            x2: 72,
            y2: FLOOR_Y as i32,
            disable_ticks: 0,
        }],
    }
}

fn new_game(level: &LevelDefinition) -> Game {
    Game::new(level, SimConfig::default(), MaskSet::builtin()).unwrap()
}

fn tick_n(game: &mut Game, n: u64) {
    for _ in 0..n {
        game.tick();
    }
}

fn action_of(game: &Game, id: u32) -> Option<LemmingState> {
    game.sim().lemmings.lemming(LemmingId(id)).map(|l| l.action)
}

#[test]
fn first_release_waits_one_full_interval() {
    let mut game = new_game(&flat_level(3, 1, 50));
    for tick in 1..=53 {
        let released = game
            .tick()
            .events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::LemmingReleased { .. }));
        assert!(!released, "released early at tick {tick}");
    }
    let events = game.tick().events;
    assert!(events.iter().any(|e| e.tick == 54
        && e.kind
            == SimEventKind::LemmingReleased {
                lemming_id: LemmingId(0)
            }));
    tick_n(&mut game, 54);
    assert_eq!(game.sim().lemmings.lemmings().len(), 2);
}

#[test]
fn everyone_walks_home() {
    let mut game = new_game(&flat_level(2, 2, 99));
    let result = game.run_to_end(2000).cloned().unwrap();
    assert_eq!(result.state, GameState::Succeeded);
    assert_eq!(result.survivors, 2);
    assert_eq!(result.survivor_percentage, 100);
    assert!(result.replay.is_empty());
}

#[test]
fn nuke_kills_everyone() {
    let mut game = new_game(&flat_level(3, 1, 99));
    tick_n(&mut game, 20);
    assert!(game.queue_command(Command::Nuke));
    assert!(!game.queue_command(Command::Nuke), "already nuking");

    let events = game.tick().events;
    assert!(events.iter().any(|e| e.kind == SimEventKind::NukeStarted));

    let result = game.run_to_end(2000).cloned().unwrap();
    assert_eq!(result.state, GameState::FailedLessLemmings);
    assert_eq!(result.survivors, 0);
    assert_eq!(result.replay, "20=n");
}

#[test]
fn exiting_lemming_refuses_skills_for_free() {
    let mut game = new_game(&flat_level(1, 1, 99));
    let mut ticks = 0;
    while action_of(&game, 0) != Some(LemmingState::Exiting) {
        game.tick();
        ticks += 1;
        assert!(ticks < 200, "never reached the exit");
    }

    assert!(game.queue_command(Command::SelectSkill {
        skill: Skill::Builder
    }));
    assert!(!game.queue_command(Command::AssignSkill {
        lemming_id: LemmingId(0)
    }));
    assert_eq!(game.sim().skills.count(Skill::Builder), 2);
    assert_eq!(game.replay_text(), format!("{ticks}=s5"));
}

#[test]
fn builder_on_a_walker_lays_bricks() {
    let mut game = new_game(&flat_level(1, 1, 99));
    tick_n(&mut game, 15);
    assert_eq!(action_of(&game, 0), Some(LemmingState::Walking));
    let (x, y) = {
        let lem = game.sim().lemmings.lemming(LemmingId(0)).unwrap();
        (lem.x, lem.y)
    };

    assert!(game.queue_command(Command::SelectSkill {
        skill: Skill::Builder
    }));
    assert!(game.queue_command(Command::AssignSkill {
        lemming_id: LemmingId(0)
    }));
    assert_eq!(game.sim().skills.count(Skill::Builder), 1);
    assert_eq!(action_of(&game, 0), Some(LemmingState::Building));

    tick_n(&mut game, 10);
    assert_eq!(game.sim().terrain.palette_at(x, y - 1), BRICK_PALETTE_INDEX);
    assert_eq!(game.sim().terrain.palette_at(x + 5, y - 1), BRICK_PALETTE_INDEX);
}

#[test]
fn replay_reproduces_the_run() {
    let level = flat_level(5, 3, 90);

    let mut live = new_game(&level);
    tick_n(&mut live, 30);
    assert_eq!(action_of(&live, 0), Some(LemmingState::Walking));
    assert!(live.queue_command(Command::SelectSkill {
        skill: Skill::Digger
    }));
    assert!(live.queue_command(Command::AssignSkill {
        lemming_id: LemmingId(0)
    }));
    tick_n(&mut live, 10);
    assert!(live.queue_command(Command::IncreaseReleaseRate { amount: 9 }));
    let live_result = live.run_to_end(5000).cloned().unwrap();
    assert_eq!(live_result.replay, "30=s8&30=l0&40=i9");

    let mut replayed = new_game(&level);
    assert_eq!(replayed.load_replay(&live_result.replay), 3);
    let replay_result = replayed.run_to_end(5000).cloned().unwrap();

    assert_eq!(replay_result, live_result);
    assert_eq!(replayed.sim().terrain, live.sim().terrain);
    assert_eq!(
        replayed.sim().lemmings.lemmings(),
        live.sim().lemmings.lemmings()
    );
}

/// Like `flat_level`, with a 20 px wall at x=40..45 and no exit.
fn walled_level() -> LevelDefinition {
    let mut level = flat_level(3, 1, 99);
    for (y, row) in level.terrain.iter_mut().enumerate() {
        if (10..FLOOR_Y).contains(&y) {
            row.replace_range(40..45, "#####");
        }
    }
    level.skills = BTreeMap::from([(Skill::Basher, 1), (Skill::Bomber, 1)]);
    level.triggers.clear();
    level
}

#[test]
fn replay_reproduces_bashing_and_explosions() {
    let level = walled_level();

    let mut live = new_game(&level);
    let untouched = live.sim().terrain.solid_count();
    tick_n(&mut live, 30);
    assert!(live.queue_command(Command::SelectSkill {
        skill: Skill::Basher
    }));
    assert!(live.queue_command(Command::AssignSkill {
        lemming_id: LemmingId(0)
    }));
    tick_n(&mut live, 5);
    assert!(live.queue_command(Command::SelectSkill {
        skill: Skill::Bomber
    }));
    assert!(live.queue_command(Command::AssignSkill {
        lemming_id: LemmingId(1)
    }));
    tick_n(&mut live, 25);
    assert!(live.queue_command(Command::Nuke));

    let live_result = live.run_to_end(5000).cloned().unwrap();
    assert_eq!(live_result.state, GameState::FailedLessLemmings);
    assert_eq!(live_result.replay, "30=s6&30=l0&35=s3&35=l1&60=n");
    assert!(live.sim().terrain.solid_count() < untouched);

    let mut replayed = new_game(&level);
    assert_eq!(replayed.load_replay(&live_result.replay), 5);
    let replay_result = replayed.run_to_end(5000).cloned().unwrap();

    assert_eq!(replay_result, live_result);
    assert_eq!(replayed.sim().terrain, live.sim().terrain);
    assert_eq!(
        replayed.sim().lemmings.lemmings(),
        live.sim().lemmings.lemmings()
    );
}

#[test]
fn malformed_replay_records_are_skipped() {
    let level = flat_level(2, 2, 99);
    let mut game = new_game(&level);
    assert_eq!(game.load_replay("nonsense&3=z9&4=i1"), 1);
    let result = game.run_to_end(2000).cloned().unwrap();
    // The release rate is already at its maximum, so `i1` does nothing and
    // is not logged.
    assert_eq!(result.replay, "");
    assert_eq!(result.state, GameState::Succeeded);
}
