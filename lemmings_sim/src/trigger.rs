// Trigger zones: axis-aligned rectangles that yield a typed effect when a
// lemming's foot pixel is inside them.
//
// Triggers come from two places: level objects (water, exits, traps), which
// the level loader supplies up front, and blockers, which register a pair of
// zones on either side of themselves while they stand. A blocker's zones are
// tagged with its `LemmingId` so they can be removed when it falls or
// explodes. The owner is a plain id, never a reference into the lemming list.
//
// Each trigger has a cooldown: after firing at tick `t` it stays silent until
// `t + disable_ticks`. `TriggerRegistry::test()` returns the first matching
// zone in insertion order that is not cooling down.
//
// See also: `manager.rs` which tests triggers after each lemming moves,
// `action/skill.rs` for the blocker zones, `config.rs` for `TriggerDef`.
//
// **Critical constraint: determinism.** First-match-wins in insertion order.
// Cooldowns are measured in simulation ticks, never wall-clock time.

use crate::types::{LemmingId, TriggerType};
use serde::{Deserialize, Serialize};

/// A single trigger zone. Bounds are inclusive and normalized so that
/// `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerType,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Ticks the trigger stays silent after firing.
    pub disable_ticks: u64,
    /// The trigger cannot fire before this tick.
    pub disabled_until_tick: u64,
    pub owner: Option<LemmingId>,
}

impl Trigger {
    /// Create a trigger from two corners in any order.
    pub fn new(
        kind: TriggerType,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        disable_ticks: u64,
        owner: Option<LemmingId>,
    ) -> Self {
        Self {
            kind,
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
            disable_ticks,
            disabled_until_tick: 0,
            owner,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Fire if `(x, y)` is inside and the cooldown has elapsed.
    fn try_fire(&mut self, x: i32, y: i32, tick: u64) -> bool {
        if tick < self.disabled_until_tick || !self.contains(x, y) {
            return false;
        }
        self.disabled_until_tick = tick + self.disable_ticks;
        true
    }
}

/// Ordered list of trigger zones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRegistry {
    triggers: Vec<Trigger>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn add_range(&mut self, triggers: impl IntoIterator<Item = Trigger>) {
        self.triggers.extend(triggers);
    }

    /// Remove every trigger owned by `owner`. Returns how many were removed.
    pub fn remove_by_owner(&mut self, owner: LemmingId) -> usize {
        let before = self.triggers.len();
        self.triggers.retain(|t| t.owner != Some(owner));
        before - self.triggers.len()
    }

    /// Hit-test a point. The first live match wins and starts its cooldown.
    pub fn test(&mut self, x: i32, y: i32, tick: u64) -> TriggerType {
        self.triggers
            .iter_mut()
            .find_map(|t| t.try_fire(x, y, tick).then_some(t.kind))
            .unwrap_or(TriggerType::None)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let t = Trigger::new(TriggerType::Kill, 10, 20, 4, 2, 0, None);
        assert_eq!((t.x1, t.y1, t.x2, t.y2), (4, 2, 10, 20));
        assert!(t.contains(4, 2));
        assert!(t.contains(10, 20));
        assert!(!t.contains(11, 20));
    }

    #[test]
    fn miss_returns_none() {
        let mut reg = TriggerRegistry::new();
        reg.add(Trigger::new(TriggerType::Drown, 0, 0, 5, 5, 0, None));
        assert_eq!(reg.test(6, 6, 0), TriggerType::None);
        assert_eq!(reg.test(-1, 0, 0), TriggerType::None);
        assert_eq!(reg.test(3, 3, 0), TriggerType::Drown);
    }

    #[test]
    fn first_match_wins() {
        let mut reg = TriggerRegistry::new();
        reg.add_range([
            Trigger::new(TriggerType::ExitLevel, 0, 0, 10, 10, 0, None),
            Trigger::new(TriggerType::Kill, 0, 0, 10, 10, 0, None),
        ]);
        assert_eq!(reg.test(5, 5, 0), TriggerType::ExitLevel);
    }

    #[test]
    fn cooldown_blocks_refire_until_elapsed() {
        let mut reg = TriggerRegistry::new();
        reg.add(Trigger::new(TriggerType::Trap, 0, 0, 10, 10, 5, None));
        assert_eq!(reg.test(5, 5, 10), TriggerType::Trap);
        for tick in 11..15 {
            assert_eq!(reg.test(5, 5, tick), TriggerType::None, "tick {tick}");
        }
        assert_eq!(reg.test(5, 5, 15), TriggerType::Trap);
    }

    #[test]
    fn cooling_trigger_falls_through_to_next_match() {
        let mut reg = TriggerRegistry::new();
        reg.add_range([
            Trigger::new(TriggerType::Trap, 0, 0, 10, 10, 100, None),
            Trigger::new(TriggerType::Kill, 0, 0, 10, 10, 0, None),
        ]);
        assert_eq!(reg.test(1, 1, 0), TriggerType::Trap);
        assert_eq!(reg.test(1, 1, 1), TriggerType::Kill);
    }

    #[test]
    fn remove_by_owner_only_touches_owned() {
        let mut reg = TriggerRegistry::new();
        let a = LemmingId(3);
        let b = LemmingId(4);
        reg.add_range([
            Trigger::new(TriggerType::BlockerLeft, 0, 0, 1, 1, 0, Some(a)),
            Trigger::new(TriggerType::Drown, 0, 0, 1, 1, 0, None),
            Trigger::new(TriggerType::BlockerRight, 0, 0, 1, 1, 0, Some(a)),
            Trigger::new(TriggerType::BlockerLeft, 0, 0, 1, 1, 0, Some(b)),
        ]);
        assert_eq!(reg.remove_by_owner(a), 2);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.remove_by_owner(a), 0);
        assert!(reg.iter().all(|t| t.owner != Some(a)));
    }
}
