// Timed handlers that end in a fixed next state: drowning, exiting,
// splatting, oh-no, exploding, shrugging.
//
// Drowning, exiting, splatting and exploding disable the lemming. The manager
// does it on the transition into them, and the handlers repeat it for a
// lemming placed straight into one of these states. A disabled lemming
// ignores triggers and skills but keeps being processed until its handler
// returns `OutOfLevel`, at which point the manager removes it and updates the
// victory counts.

use super::{ActionContext, ActionHandler};
use crate::lemming::Lemming;
use crate::types::LemmingState;

pub struct Drowning;

impl ActionHandler for Drowning {
    fn state(&self) -> LemmingState {
        LemmingState::Drowning
    }

    fn name(&self) -> &'static str {
        "drowning"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.disable();
        lem.frame_index += 1;
        if lem.frame_index >= 16 {
            return Some(LemmingState::OutOfLevel);
        }
        // Drift with the current until a bank is 8 px ahead.
        if ctx.terrain.has_ground_at(lem.x + 8 * lem.dir(), lem.y) {
            lem.turn_around();
        } else {
            lem.x += lem.dir();
        }
        None
    }
}

pub struct Exiting;

impl ActionHandler for Exiting {
    fn state(&self) -> LemmingState {
        LemmingState::Exiting
    }

    fn name(&self) -> &'static str {
        "exiting"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.disable();
        lem.frame_index += 1;
        if lem.frame_index >= 8 {
            ctx.victory.add_survivor();
            return Some(LemmingState::OutOfLevel);
        }
        None
    }
}

pub struct Splatting;

impl ActionHandler for Splatting {
    fn state(&self) -> LemmingState {
        LemmingState::Splatting
    }

    fn name(&self) -> &'static str {
        "splatting"
    }

    fn process(&self, _ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.disable();
        lem.frame_index += 1;
        (lem.frame_index >= 16).then_some(LemmingState::OutOfLevel)
    }
}

/// The "oh no!" before a bomber explodes. Still reacts to triggers.
pub struct Ohno;

impl ActionHandler for Ohno {
    fn state(&self) -> LemmingState {
        LemmingState::Ohno
    }

    fn name(&self) -> &'static str {
        "ohno"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        if lem.frame_index == 16 {
            return Some(LemmingState::Exploding);
        }
        for _ in 0..3 {
            if ctx.terrain.has_ground_at(lem.x, lem.y + 1) {
                break;
            }
            lem.y += 1;
        }
        None
    }
}

pub struct Exploding;

impl ActionHandler for Exploding {
    fn state(&self) -> LemmingState {
        LemmingState::Exploding
    }

    fn name(&self) -> &'static str {
        "exploding"
    }

    fn process(&self, ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.disable();
        lem.frame_index += 1;
        if lem.frame_index == 1 {
            ctx.triggers.remove_by_owner(lem.id);
            ctx.terrain
                .clear_ground_with_mask(&ctx.masks.explosion, lem.x, lem.y);
        }
        (lem.frame_index == 52).then_some(LemmingState::OutOfLevel)
    }
}

pub struct Shrugging;

impl ActionHandler for Shrugging {
    fn state(&self) -> LemmingState {
        LemmingState::Shrugging
    }

    fn name(&self) -> &'static str {
        "shrugging"
    }

    fn process(&self, _ctx: &mut ActionContext<'_>, lem: &mut Lemming) -> Option<LemmingState> {
        lem.frame_index += 1;
        (lem.frame_index >= 8).then_some(LemmingState::Walking)
    }
}
