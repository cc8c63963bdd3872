// Commands: the only way player input changes the simulation.
//
// Every user intent (select a skill, assign it to a lemming, change the
// release rate, nuke) is a `Command`. Commands are executed against a
// `SimState` between ticks. `execute()` returns whether it changed anything;
// only successful commands are logged, so a replay reproduces exactly the
// effects the player saw.
//
// Each command has a one-character key and a flat integer parameter list,
// which is its replay wire form (see `replay.rs`):
//
//   l<lemming_id>   assign the selected skill to a lemming
//   n               nuke
//   s<skill_code>   select a skill (codes 1..=8, see `Skill::code`)
//   i<amount>       raise the release rate
//   d<amount>       lower the release rate
//
// **Critical constraint: determinism.** A command must behave identically
// when replayed, so `execute()` only reads `SimState`.

use crate::replay::ReplayError;
use crate::sim::SimState;
use crate::types::{LemmingId, Skill};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Flat integer parameters of a command.
pub type CommandParams = SmallVec<[i64; 2]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Give the currently selected skill to a lemming.
    AssignSkill { lemming_id: LemmingId },
    Nuke,
    SelectSkill { skill: Skill },
    IncreaseReleaseRate { amount: i64 },
    DecreaseReleaseRate { amount: i64 },
}

impl Command {
    pub fn key(&self) -> char {
        match self {
            Command::AssignSkill { .. } => 'l',
            Command::Nuke => 'n',
            Command::SelectSkill { .. } => 's',
            Command::IncreaseReleaseRate { .. } => 'i',
            Command::DecreaseReleaseRate { .. } => 'd',
        }
    }

    pub fn params(&self) -> CommandParams {
        match *self {
            Command::AssignSkill { lemming_id } => smallvec![i64::from(lemming_id.0)],
            Command::Nuke => SmallVec::new(),
            Command::SelectSkill { skill } => smallvec![skill.code()],
            Command::IncreaseReleaseRate { amount } | Command::DecreaseReleaseRate { amount } => {
                smallvec![amount]
            }
        }
    }

    /// Rebuild a command from its key and parameters.
    pub fn from_parts(key: char, params: &[i64]) -> Result<Self, ReplayError> {
        let expected = match key {
            'n' => 0,
            'l' | 's' | 'i' | 'd' => 1,
            _ => return Err(ReplayError::UnknownKey(key)),
        };
        if params.len() != expected {
            return Err(ReplayError::ParamCount {
                key,
                expected,
                actual: params.len(),
            });
        }

        Ok(match key {
            'n' => Command::Nuke,
            'l' => {
                let id = u32::try_from(params[0])
                    .map_err(|_| ReplayError::BadLemmingId(params[0]))?;
                Command::AssignSkill {
                    lemming_id: LemmingId(id),
                }
            }
            's' => {
                let skill =
                    Skill::from_code(params[0]).ok_or(ReplayError::UnknownSkill(params[0]))?;
                Command::SelectSkill { skill }
            }
            'i' => Command::IncreaseReleaseRate { amount: params[0] },
            _ => Command::DecreaseReleaseRate { amount: params[0] },
        })
    }

    /// Apply the command. Returns `false` (and changes nothing) if it had no
    /// effect: game already decided, no skill selected or left, lemming
    /// refused the skill, release rate already at its bound, nuke already on.
    pub fn execute(&self, sim: &mut SimState) -> bool {
        if sim.victory.is_finalized() {
            return false;
        }
        match *self {
            Command::AssignSkill { lemming_id } => {
                let Some(skill) = sim.skills.selected() else {
                    return false;
                };
                if !sim.skills.can_reduce(skill) {
                    return false;
                }
                if !sim.assign_skill(lemming_id, skill) {
                    return false;
                }
                sim.skills.reduce(skill)
            }
            Command::Nuke => sim.nuke_all(),
            Command::SelectSkill { skill } => sim.skills.set_selected(skill),
            Command::IncreaseReleaseRate { amount } => sim.victory.change_release_rate(amount),
            Command::DecreaseReleaseRate { amount } => {
                sim.victory.change_release_rate(amount.saturating_neg())
            }
        }
    }
}
