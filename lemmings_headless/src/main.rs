// Headless level runner: CLI entry point.
//
// Loads a level (and optionally a config and a replay), runs it to the end
// without rendering, and prints the `GameResult` as JSON on stdout. Useful
// for checking that a recorded replay still produces the same outcome.
//
// Usage:
//   cargo run -p lemmings_headless -- <level.json> [--config config.json]
//     [--replay TEXT] [--replay-file path] [--max-ticks N] [--snapshot-every N]
//
// `--snapshot-every N` also prints the lemming render views every N ticks as
// one JSON line each, on stderr. Log verbosity follows `RUST_LOG`.

use lemmings_sim::config::{LevelDefinition, SimConfig};
use lemmings_sim::game::Game;
use lemmings_sim::terrain::MaskSet;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(level_path) = args.get(1).filter(|s| !s.starts_with("--")) else {
        eprintln!("usage: lemmings-run <level.json> [--config FILE] [--replay TEXT] [--replay-file FILE] [--max-ticks N] [--snapshot-every N]");
        return ExitCode::from(2);
    };

    match run(level_path, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(level_path: &str, args: &[String]) -> Result<(), String> {
    let level_json = read(level_path)?;
    let level = LevelDefinition::from_json(&level_json)
        .map_err(|e| format!("{level_path}: {e}"))?;

    let config = match parse_flag::<String>(args, "--config") {
        Some(path) => SimConfig::from_json(&read(&path)?).map_err(|e| format!("{path}: {e}"))?,
        None => SimConfig::default(),
    };

    let replay = match (
        parse_flag::<String>(args, "--replay"),
        parse_flag::<String>(args, "--replay-file"),
    ) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(read(&path)?.trim().to_owned()),
        (None, None) => None,
    };

    let mut game = Game::new(&level, config, MaskSet::builtin()).map_err(|e| e.to_string())?;
    if let Some(text) = replay {
        let scheduled = game.load_replay(&text);
        tracing::info!(scheduled, "replay loaded");
    }

    let max_ticks = parse_flag(args, "--max-ticks").unwrap_or_else(|| game.clock().ticks_time_limit() + 1);
    let snapshot_every: u64 = parse_flag(args, "--snapshot-every").unwrap_or(0);

    tracing::info!(level = %game.level_name(), max_ticks, "running");
    for _ in 0..max_ticks {
        if game.state().is_finished() {
            break;
        }
        game.tick();
        let tick = game.clock().tick_index();
        if snapshot_every > 0 && tick % snapshot_every == 0 {
            let views = serde_json::to_string(&game.views()).map_err(|e| e.to_string())?;
            eprintln!("{{\"tick\":{tick},\"lemmings\":{views}}}");
        }
    }

    let Some(result) = game.result() else {
        return Err(format!(
            "level still running after {} ticks",
            game.clock().tick_index()
        ));
    };
    let json = serde_json::to_string_pretty(result).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn read(path: &str) -> Result<String, String> {
    std::fs::read_to_string(Path::new(path)).map_err(|e| format!("{path}: {e}"))
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
