// Task handlers: digging, building, bashing, mining, blocking.
//
// These are the actions a player assigns through a skill. Each one accepts
// the skill via `assign_task`, which only switches lemmings that are on
// their feet (see `accepts_task` in `mod.rs`). All five edit the world:
// diggers clear rows, builders lay bricks, bashers and miners stamp masks,
// and blockers register a pair of trigger zones owned by themselves.
//
// See also: `terrain.rs` for `MaskSet`, `trigger.rs` for the owner-tagged
// blocker zones.

use super::{ActionContext, ActionHandler, accepts_task};
use crate::lemming::Lemming;
use crate::terrain::{BRICK_PALETTE_INDEX, Terrain};
use crate::trigger::Trigger;
use crate::types::{LemmingState, TriggerType};

fn assign_task(lem: &mut Lemming, target: LemmingState) -> bool {
    if !accepts_task(lem, target) {
        return false;
    }
    lem.set_action(target);
    true
}

// ---------------------------------------------------------------------------
// Digging
// ---------------------------------------------------------------------------

/// Half-width of the hole a digger makes.
const DIG_HALF_WIDTH: i32 = 4;

/// Clear one 9 px row centred on `x`. Returns true if any ground was there.
fn dig_row(terrain: &mut Terrain, x: i32, y: i32) -> bool {
    let mut removed = false;
    for gx in x - DIG_HALF_WIDTH..=x + DIG_HALF_WIDTH {
        if terrain.has_ground_at(gx, y) {
            terrain.clear_ground_at(gx, y);
            removed = true;
        }
    }
    removed
}

pub struct Digging;

impl ActionHandler for Digging {
    fn state(&self) -> LemmingState {
        LemmingState::Digging
    }

    fn name(&self) -> &'static str {
        "digging"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        if lem.state == 0 {
            dig_row(ctx.terrain, lem.x, lem.y - 2);
            dig_row(ctx.terrain, lem.x, lem.y - 1);
            lem.state = 1;
        } else {
            lem.frame_index = (lem.frame_index + 1) % 16;
        }

        if lem.frame_index % 8 == 0 {
            lem.y += 1;
            if ctx.terrain.is_out_of_level(lem.y) || !dig_row(ctx.terrain, lem.x, lem.y - 1) {
                return Some(LemmingState::Falling);
            }
        }
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        assign_task(lem, LemmingState::Digging)
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

const BRICK_LENGTH: i32 = 6;
const BRICKS_PER_BUILDER: u32 = 12;

pub struct Building;

impl ActionHandler for Building {
    fn state(&self) -> LemmingState {
        LemmingState::Building
    }

    fn name(&self) -> &'static str {
        "building"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index = (lem.frame_index + 1) % 16;

        if lem.frame_index == 9 {
            let start = if lem.look_right { lem.x } else { lem.x - 4 };
            for i in 0..BRICK_LENGTH {
                ctx.terrain
                    .set_ground_at(start + i, lem.y - 1, BRICK_PALETTE_INDEX);
            }
            return None;
        }

        if lem.frame_index == 0 {
            lem.y -= 1;
            for _ in 0..2 {
                lem.x += lem.dir();
                if ctx.terrain.has_ground_at(lem.x, lem.y - 1) {
                    lem.turn_around();
                    return Some(LemmingState::Walking);
                }
            }

            lem.state += 1;
            if lem.state >= BRICKS_PER_BUILDER {
                return Some(LemmingState::Shrugging);
            }

            if ctx.terrain.has_ground_at(lem.x + 2 * lem.dir(), lem.y - 9) {
                lem.turn_around();
                return Some(LemmingState::Walking);
            }
        }
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        assign_task(lem, LemmingState::Building)
    }
}

// ---------------------------------------------------------------------------
// Bashing
// ---------------------------------------------------------------------------

pub struct Bashing;

impl ActionHandler for Bashing {
    fn state(&self) -> LemmingState {
        LemmingState::Bashing
    }

    fn name(&self) -> &'static str {
        "bashing"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        let sub = lem.frame_index % 16;

        if sub > 10 {
            lem.x += lem.dir();
            let gap = (0..3)
                .find(|&i| ctx.terrain.has_ground_at(lem.x, lem.y + i))
                .unwrap_or(3);
            lem.y += gap;
            if gap == 3 {
                return Some(LemmingState::Falling);
            }
        }

        if (2..6).contains(&sub) {
            if let Some(mask) = ctx.masks.bash.get(lem.look_right, (sub - 2) as usize) {
                ctx.terrain.clear_ground_with_mask(mask, lem.x, lem.y);
            }
        }

        // Nothing left to bash within reach: stop.
        if sub == 5 {
            let probe_x = lem.x + 8 * lem.dir();
            let clear = (0..4)
                .all(|i| !ctx.terrain.has_ground_at(probe_x + i * lem.dir(), lem.y - 6));
            if clear {
                return Some(LemmingState::Walking);
            }
        }
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        assign_task(lem, LemmingState::Bashing)
    }
}

// ---------------------------------------------------------------------------
// Mining
// ---------------------------------------------------------------------------

pub struct Mining;

impl ActionHandler for Mining {
    fn state(&self) -> LemmingState {
        LemmingState::Mining
    }

    fn name(&self) -> &'static str {
        "mining"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index = (lem.frame_index + 1) % 24;

        match lem.frame_index {
            1 | 2 => {
                let frame = (lem.frame_index - 1) as usize;
                if let Some(mask) = ctx.masks.mine.get(lem.look_right, frame) {
                    ctx.terrain.clear_ground_with_mask(mask, lem.x, lem.y);
                }
            }
            3 | 15 => {
                if lem.frame_index == 3 {
                    lem.y += 1;
                }
                lem.x += lem.dir();
                if !ctx.terrain.has_ground_at(lem.x, lem.y) {
                    return Some(LemmingState::Falling);
                }
            }
            _ => {}
        }
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        assign_task(lem, LemmingState::Mining)
    }
}

// ---------------------------------------------------------------------------
// Blocking
// ---------------------------------------------------------------------------

/// Stands still and turns walkers around with two owned trigger zones, one
/// on each side. The zones are withdrawn when the blocker falls or explodes.
pub struct Blocking;

impl ActionHandler for Blocking {
    fn state(&self) -> LemmingState {
        LemmingState::Blocking
    }

    fn name(&self) -> &'static str {
        "blocking"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        if lem.state == 0 {
            let (x, y) = (lem.x, lem.y);
            ctx.triggers.add(Trigger::new(
                TriggerType::BlockerLeft,
                x - 6,
                y + 4,
                x - 3,
                y - 10,
                0,
                Some(lem.id),
            ));
            ctx.triggers.add(Trigger::new(
                TriggerType::BlockerRight,
                x + 7,
                y + 4,
                x + 4,
                y - 10,
                0,
                Some(lem.id),
            ));
            lem.state = 1;
        }

        lem.frame_index += 1;

        if !ctx.terrain.has_ground_at(lem.x, lem.y + 1) {
            ctx.triggers.remove_by_owner(lem.id);
            return Some(LemmingState::Falling);
        }
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        assign_task(lem, LemmingState::Blocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support::Fixture;
    use crate::types::LemmingId;

    /// Terrain with solid rows `top..bottom` only.
    fn slab(width: usize, height: usize, top: i32, bottom: i32) -> Fixture {
        let mut fix = Fixture::floor(width, height, top as usize);
        for y in bottom..height as i32 {
            for x in 0..width as i32 {
                fix.terrain.clear_ground_at(x, y);
            }
        }
        fix
    }

    fn lem_at(x: i32, y: i32, action: LemmingState) -> Lemming {
        let mut lem = Lemming::new(LemmingId(3), x, y);
        lem.set_action(action);
        lem
    }

    #[test]
    fn digger_goes_through_a_slab_and_falls() {
        let mut fix = slab(20, 30, 10, 15);
        let mut lem = lem_at(10, 10, LemmingState::Digging);

        let result = fix.run_until_transition(&Digging, &mut lem, 100);
        assert_eq!(result, Some((LemmingState::Falling, 41)));
        assert_eq!(lem.y, 16);
        for y in 10..15 {
            for x in 6..=14 {
                assert!(!fix.terrain.has_ground_at(x, y), "({x},{y}) left behind");
            }
            assert!(fix.terrain.has_ground_at(5, y));
            assert!(fix.terrain.has_ground_at(15, y));
        }
    }

    #[test]
    fn digger_stops_at_level_bottom() {
        let mut fix = Fixture::floor(20, 12, 10);
        let mut lem = lem_at(10, 10, LemmingState::Digging);
        let result = fix.run_until_transition(&Digging, &mut lem, 100);
        assert_eq!(result.map(|r| r.0), Some(LemmingState::Falling));
        assert_eq!(lem.y, 12);
    }

    #[test]
    fn builder_lays_twelve_bricks_then_shrugs() {
        let mut fix = Fixture::floor(40, 30, 20);
        let mut lem = lem_at(10, 20, LemmingState::Building);

        let result = fix.run_until_transition(&Building, &mut lem, 500);
        assert_eq!(result, Some((LemmingState::Shrugging, 192)));
        assert_eq!((lem.x, lem.y), (34, 8));
        assert_eq!(fix.terrain.palette_at(10, 19), BRICK_PALETTE_INDEX);
        assert!(fix.terrain.has_ground_at(15, 19));
        assert!(fix.terrain.has_ground_at(37, 8));
        assert!(!fix.terrain.has_ground_at(38, 8));
    }

    #[test]
    fn builder_turns_back_at_a_wall() {
        let mut fix = Fixture::floor(40, 30, 20);
        for y in 0..20 {
            for x in 14..20 {
                fix.terrain.set_ground_at(x, y, 1);
            }
        }
        let mut lem = lem_at(10, 20, LemmingState::Building);
        let result = fix.run_until_transition(&Building, &mut lem, 100);
        assert_eq!(result, Some((LemmingState::Walking, 16)));
        assert!(!lem.look_right);
    }

    #[test]
    fn basher_tunnels_through_a_wall() {
        let mut fix = Fixture::floor(40, 30, 20);
        for y in 10..20 {
            for x in 14..24 {
                fix.terrain.set_ground_at(x, y, 1);
            }
        }
        let mut lem = lem_at(10, 20, LemmingState::Bashing);

        let result = fix.run_until_transition(&Bashing, &mut lem, 200);
        assert_eq!(result, Some((LemmingState::Walking, 37)));
        assert_eq!((lem.x, lem.y), (20, 20));
        assert!(!fix.terrain.has_ground_at(16, 15));
        assert!(!fix.terrain.has_ground_at(23, 10));
        assert!(fix.terrain.has_ground_at(16, 20), "floor untouched");
    }

    #[test]
    fn basher_with_nothing_ahead_stops() {
        let mut fix = Fixture::floor(40, 30, 20);
        let mut lem = lem_at(10, 20, LemmingState::Bashing);
        let result = fix.run_until_transition(&Bashing, &mut lem, 20);
        assert_eq!(result, Some((LemmingState::Walking, 5)));
    }

    #[test]
    fn miner_descends_diagonally() {
        let mut fix = Fixture::floor(40, 30, 10);
        let mut lem = lem_at(10, 10, LemmingState::Mining);

        assert_eq!(fix.run_until_transition(&Mining, &mut lem, 48), None);
        assert_eq!((lem.x, lem.y), (14, 12));
        assert!(fix.terrain.has_ground_at(10, 10));
        assert!(!fix.terrain.has_ground_at(11, 10));
        assert!(!fix.terrain.has_ground_at(14, 11));
        assert!(fix.terrain.has_ground_at(14, 12));
    }

    #[test]
    fn miner_falls_out_of_a_thin_floor() {
        let mut fix = slab(40, 30, 10, 12);
        let mut lem = lem_at(10, 10, LemmingState::Mining);
        let result = fix.run_until_transition(&Mining, &mut lem, 100);
        assert_eq!(result, Some((LemmingState::Falling, 27)));
    }

    #[test]
    fn blocker_registers_and_withdraws_zones() {
        let mut fix = Fixture::floor(40, 30, 20);
        let mut lem = lem_at(10, 20, LemmingState::Blocking);

        assert_eq!(Blocking.process(&mut fix.ctx(), &mut lem), None);
        assert_eq!(fix.triggers.len(), 2);
        assert_eq!(fix.triggers.test(5, 20, 1), TriggerType::BlockerLeft);
        assert_eq!(fix.triggers.test(15, 20, 1), TriggerType::BlockerRight);
        assert_eq!(fix.triggers.test(10, 20, 1), TriggerType::None);

        assert_eq!(Blocking.process(&mut fix.ctx(), &mut lem), None);
        assert_eq!(fix.triggers.len(), 2, "zones added once");

        for y in 20..30 {
            fix.terrain.clear_ground_at(10, y);
        }
        assert_eq!(
            Blocking.process(&mut fix.ctx(), &mut lem),
            Some(LemmingState::Falling)
        );
        assert!(fix.triggers.is_empty());
    }

    #[test]
    fn tasks_only_start_from_the_ground() {
        let mut walker = lem_at(0, 0, LemmingState::Walking);
        assert!(Digging.trigger_lem_action(&mut walker));
        assert_eq!(walker.action, LemmingState::Digging);
        assert!(!Digging.trigger_lem_action(&mut walker));
        assert!(Blocking.trigger_lem_action(&mut walker));
        assert!(!Building.trigger_lem_action(&mut walker));
        assert_eq!(walker.action, LemmingState::Blocking);

        let mut faller = lem_at(0, 0, LemmingState::Falling);
        assert!(!Mining.trigger_lem_action(&mut faller));
        assert!(!Bashing.trigger_lem_action(&mut faller));
        assert_eq!(faller.action, LemmingState::Falling);
    }
}
