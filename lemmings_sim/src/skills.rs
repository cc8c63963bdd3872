// Skill inventory: how many of each skill the player has left, and which
// skill is currently selected for assignment.
//
// Counts start from the level's allotments. A skill is only spent after the
// lemming actually accepted it (see `Command::AssignSkill` in `command.rs`),
// so a rejected assignment never costs anything.
//
// **Critical constraint: determinism.** Counts are stored in a `BTreeMap`
// so any iteration (UI listing, serialization) is in `Skill` order.

use crate::types::Skill;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSkills {
    counts: BTreeMap<Skill, u32>,
    selected: Option<Skill>,
}

impl GameSkills {
    pub fn new(allotments: &BTreeMap<Skill, u32>) -> Self {
        Self {
            counts: allotments.clone(),
            selected: None,
        }
    }

    pub fn count(&self, skill: Skill) -> u32 {
        self.counts.get(&skill).copied().unwrap_or(0)
    }

    pub fn can_reduce(&self, skill: Skill) -> bool {
        self.count(skill) > 0
    }

    /// Spend one use of `skill`. Returns `false` if none are left.
    pub fn reduce(&mut self, skill: Skill) -> bool {
        match self.counts.get_mut(&skill) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn selected(&self) -> Option<Skill> {
        self.selected
    }

    /// Select a skill. Returns `false` if it was already selected.
    pub fn set_selected(&mut self, skill: Skill) -> bool {
        if self.selected == Some(skill) {
            return false;
        }
        self.selected = Some(skill);
        true
    }

    pub fn counts(&self) -> &BTreeMap<Skill, u32> {
        &self.counts
    }
}
