// Locomotion handlers: walking, falling, jumping, climbing, hoisting,
// floating.
//
// All positions are the lemming's foot pixel, which sits on the top solid
// cell of whatever it stands on. "Ground at y+i" probes downward from the
// foot, "ground at y-i" probes the body column upward.
//
// Climbing and floating double as the climber and floater skills: their
// `trigger_lem_action` grants the ability flag without changing the
// lemming's current action.

use super::{ActionContext, ActionHandler};
use crate::lemming::Lemming;
use crate::terrain::Terrain;
use crate::types::LemmingState;

/// Height of a wall that stops a walker (or starts a climber).
const WALL_HEIGHT: i32 = 8;
/// Steps taller than this are jumped rather than walked.
const MAX_STEP_UP: i32 = 3;
/// Deepest drop a walker follows without falling.
const MAX_STEP_DOWN: i32 = 3;
/// Pixels a faller covers per tick.
const FALL_SPEED: i32 = 3;

/// Vertical movement per floating frame. The first frames are the drop
/// before the parachute fills; the `-1` is the canopy jerk.
const FLOAT_SPEED: [i32; 16] = [3, 3, 3, 3, -1, 0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2];

/// How many cells of the body column above the foot are solid, counting
/// the foot cell itself. Capped at `WALL_HEIGHT`.
fn step_height(terrain: &Terrain, x: i32, y: i32) -> i32 {
    (0..WALL_HEIGHT)
        .find(|&i| !terrain.has_ground_at(x, y - i))
        .unwrap_or(WALL_HEIGHT)
}

/// Distance to the first solid cell below the foot, or
/// `MAX_STEP_DOWN + 1` if none is within reach.
fn step_depth(terrain: &Terrain, x: i32, y: i32) -> i32 {
    (1..=MAX_STEP_DOWN)
        .find(|&i| terrain.has_ground_at(x, y + i))
        .unwrap_or(MAX_STEP_DOWN + 1)
}

pub struct Walking;

impl ActionHandler for Walking {
    fn state(&self) -> LemmingState {
        LemmingState::Walking
    }

    fn name(&self) -> &'static str {
        "walking"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        lem.x += lem.dir();

        let up = step_height(ctx.terrain, lem.x, lem.y);
        if up == WALL_HEIGHT {
            if lem.can_climb {
                return Some(LemmingState::Climbing);
            }
            lem.turn_around();
            return None;
        }
        if up > 0 {
            lem.y -= up - 1;
            return (up > MAX_STEP_UP).then_some(LemmingState::Jumping);
        }

        let down = step_depth(ctx.terrain, lem.x, lem.y);
        if down > MAX_STEP_DOWN {
            return Some(LemmingState::Falling);
        }
        lem.y += down;
        None
    }
}

/// Free fall. `lem.state` accumulates the distance fallen.
pub struct Falling;

impl ActionHandler for Falling {
    fn state(&self) -> LemmingState {
        LemmingState::Falling
    }

    fn name(&self) -> &'static str {
        "falling"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        if lem.has_parachute && lem.state > ctx.config.parachute_open_distance {
            return Some(LemmingState::Floating);
        }

        let drop = (0..FALL_SPEED)
            .find(|&i| ctx.terrain.has_ground_at(lem.x, lem.y + i))
            .unwrap_or(FALL_SPEED);
        lem.y += drop;
        if drop == FALL_SPEED {
            lem.state += FALL_SPEED as u32;
            return None;
        }

        if lem.state > ctx.config.max_fall_distance {
            Some(LemmingState::Splatting)
        } else {
            Some(LemmingState::Walking)
        }
    }
}

pub struct Jumping;

impl ActionHandler for Jumping {
    fn state(&self) -> LemmingState {
        LemmingState::Jumping
    }

    fn name(&self) -> &'static str {
        "jumping"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        let rise = (0..2)
            .find(|&i| !ctx.terrain.has_ground_at(lem.x, lem.y + i - 1))
            .unwrap_or(2);
        lem.y -= rise;
        (rise < 2).then_some(LemmingState::Walking)
    }
}

/// Climbing a wall. Frames 0..4 look for the top of the wall, frames 4..8
/// move up and check for an overhang behind the climber.
pub struct Climbing;

impl ActionHandler for Climbing {
    fn state(&self) -> LemmingState {
        LemmingState::Climbing
    }

    fn name(&self) -> &'static str {
        "climbing"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index = (lem.frame_index + 1) % 8;
        let frame = lem.frame_index as i32;

        if frame < 4 {
            if !ctx.terrain.has_ground_at(lem.x, lem.y - frame - 7) {
                lem.y = lem.y - frame + 2;
                return Some(LemmingState::Hoisting);
            }
            return None;
        }

        lem.y -= 1;
        if ctx.terrain.has_ground_at(lem.x - lem.dir(), lem.y - 8) {
            lem.turn_around();
            lem.x += 2 * lem.dir();
            return Some(LemmingState::Falling);
        }
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        if !lem.is_active() || lem.can_climb {
            return false;
        }
        lem.can_climb = true;
        true
    }
}

/// Pulling up over the top of a wall.
pub struct Hoisting;

impl ActionHandler for Hoisting {
    fn state(&self) -> LemmingState {
        LemmingState::Hoisting
    }

    fn name(&self) -> &'static str {
        "hoisting"
    }

    fn process(&self, _ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        if lem.frame_index <= 4 {
            lem.y -= 2;
            return None;
        }
        (lem.frame_index >= 8).then_some(LemmingState::Walking)
    }
}

pub struct Floating;

impl ActionHandler for Floating {
    fn state(&self) -> LemmingState {
        LemmingState::Floating
    }

    fn name(&self) -> &'static str {
        "floating"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        let frame = (lem.frame_index as usize).min(FLOAT_SPEED.len() - 1);
        let speed = FLOAT_SPEED[frame];

        for i in 0..speed {
            if ctx.terrain.has_ground_at(lem.x, lem.y + i) {
                lem.y += i;
                return Some(LemmingState::Walking);
            }
        }
        lem.y += speed;
        None
    }

    fn trigger_lem_action(&self, lem: &mut Lemming) -> bool {
        if !lem.is_active() || lem.has_parachute {
            return false;
        }
        lem.has_parachute = true;
        true
    }
}
