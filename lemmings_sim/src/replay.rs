// Command log, replay text, and the dispatcher that ties them to the tick
// loop.
//
// `CommandLog` maps tick -> commands executed at that tick, in execution
// order. It is a `BTreeMap` so serialization is always ascending by tick
// regardless of insertion order.
//
// Replay text is a `&`-joined list of records `<tick>=<key><p1>:<p2>...`,
// e.g. `54=s8&60=l0&120=i10`. Parsing is lenient: a malformed record is
// skipped with a `tracing::warn!` and the rest still load.
//
// `CommandDispatcher` has two jobs:
// - `queue_command`: run a live command now and, if it succeeded, log it at
//   the current tick.
// - `before_tick`: run every scheduled (replayed) command recorded before the
//   tick about to run, logging each at its recorded tick.
// A command issued while the clock reads T therefore takes effect before
// tick T+1 both live and on replay, which is what makes replays exact.
//
// See also: `command.rs` for the command set and its wire form, `game.rs`
// for the before-tick hook.

use crate::command::{Command, CommandParams};
use crate::sim::SimState;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Why a replay record could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("record `{0}` has no `=`")]
    MissingSeparator(String),
    #[error("record `{0}` has a bad tick")]
    BadTick(String),
    #[error("record `{0}` has no command")]
    EmptyCommand(String),
    #[error("unknown command key `{0}`")]
    UnknownKey(char),
    #[error("record `{0}` has a non-integer parameter")]
    BadParam(String),
    #[error("command `{key}` takes {expected} parameter(s), got {actual}")]
    ParamCount {
        key: char,
        expected: usize,
        actual: usize,
    },
    #[error("unknown skill code {0}")]
    UnknownSkill(i64),
    #[error("invalid lemming id {0}")]
    BadLemmingId(i64),
}

// ---------------------------------------------------------------------------
// CommandLog
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandLog {
    entries: BTreeMap<u64, Vec<Command>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tick: u64, command: Command) {
        self.entries.entry(tick).or_default().push(command);
    }

    /// All commands in replay order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Command)> {
        self.entries
            .iter()
            .flat_map(|(&tick, cmds)| cmds.iter().map(move |cmd| (tick, cmd)))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry recorded strictly before `tick`.
    fn take_before(&mut self, tick: u64) -> BTreeMap<u64, Vec<Command>> {
        let later = self.entries.split_off(&tick);
        std::mem::replace(&mut self.entries, later)
    }

    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Parse replay text, skipping (and logging) records that are malformed.
    pub fn parse(text: &str) -> Self {
        let mut log = Self::new();
        for record in text.split('&').map(str::trim).filter(|r| !r.is_empty()) {
            match parse_record(record) {
                Ok((tick, command)) => log.record(tick, command),
                Err(err) => tracing::warn!(record, %err, "skipping replay record"),
            }
        }
        log
    }
}

impl fmt::Display for CommandLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (tick, command)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{tick}={}", command.key())?;
            for (j, param) in command.params().iter().enumerate() {
                if j > 0 {
                    f.write_str(":")?;
                }
                write!(f, "{param}")?;
            }
        }
        Ok(())
    }
}

/// Parse one `<tick>=<key><params>` record.
pub fn parse_record(record: &str) -> Result<(u64, Command), ReplayError> {
    let (tick, body) = record
        .split_once('=')
        .ok_or_else(|| ReplayError::MissingSeparator(record.to_owned()))?;
    let tick: u64 = tick
        .trim()
        .parse()
        .map_err(|_| ReplayError::BadTick(record.to_owned()))?;

    let mut chars = body.chars();
    let key = chars
        .next()
        .ok_or_else(|| ReplayError::EmptyCommand(record.to_owned()))?;
    let rest = chars.as_str();

    let params = if rest.is_empty() {
        CommandParams::new()
    } else {
        rest.split(':')
            .map(|p| p.parse::<i64>())
            .collect::<Result<CommandParams, _>>()
            .map_err(|_| ReplayError::BadParam(record.to_owned()))?
    };

    Ok((tick, Command::from_parts(key, &params)?))
}

// ---------------------------------------------------------------------------
// CommandDispatcher
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct CommandDispatcher {
    log: CommandLog,
    scheduled: CommandLog,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute `command` now. It is logged at `tick_index` only if it
    /// succeeded.
    pub fn queue_command(&mut self, command: Command, tick_index: u64, sim: &mut SimState) -> bool {
        if !command.execute(sim) {
            tracing::debug!(tick = tick_index, ?command, "command had no effect");
            return false;
        }
        self.log.record(tick_index, command);
        true
    }

    /// Schedule every valid record in `text` for replay. Returns how many
    /// commands were scheduled.
    pub fn load_replay(&mut self, text: &str) -> usize {
        let parsed = CommandLog::parse(text);
        let count = parsed.len();
        for (tick, command) in parsed.iter() {
            self.scheduled.record(tick, *command);
        }
        count
    }

    /// Run scheduled commands recorded before `tick`. Returns how many
    /// succeeded.
    pub fn before_tick(&mut self, tick: u64, sim: &mut SimState) -> usize {
        let mut applied = 0;
        for (recorded, commands) in self.scheduled.take_before(tick) {
            for command in commands {
                if command.execute(sim) {
                    self.log.record(recorded, command);
                    applied += 1;
                } else {
                    tracing::warn!(tick = recorded, ?command, "replayed command had no effect");
                }
            }
        }
        applied
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Commands still waiting for their tick.
    pub fn pending(&self) -> usize {
        self.scheduled.len()
    }

    pub fn serialize(&self) -> String {
        self.log.serialize()
    }
}
