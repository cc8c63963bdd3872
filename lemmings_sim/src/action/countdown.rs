// Bomber countdown.
//
// The bomber skill does not change a lemming's action. It arms a countdown
// that runs alongside whatever the lemming is doing; when it reaches zero the
// manager forces the lemming into `Ohno`. The countdown is processed once
// per tick, after the lemming's action and trigger checks.

use crate::lemming::Lemming;
use crate::types::LemmingState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BomberCountdown {
    ticks: u32,
}

impl BomberCountdown {
    pub fn new(ticks: u32) -> Self {
        Self {
            ticks: ticks.max(1),
        }
    }

    /// Arm the countdown on `lem`. Returns `false` if it is already armed,
    /// already going off, or out of play.
    pub fn arm(&self, lem: &mut Lemming) -> bool {
        if !lem.is_active()
            || lem.countdown.is_some()
            || matches!(lem.action, LemmingState::Ohno | LemmingState::Exploding)
        {
            return false;
        }
        lem.countdown = Some(self.ticks);
        true
    }

    /// Count down one tick. Returns `Some(Ohno)` when time is up.
    ///
    /// A lemming that got disabled meanwhile (exiting, drowning, ...) loses
    /// its countdown.
    pub fn process(&self, lem: &mut Lemming) -> Option<LemmingState> {
        let left = lem.countdown?;
        if lem.disabled {
            lem.countdown = None;
            return None;
        }
        match left.saturating_sub(1) {
            0 => {
                lem.countdown = None;
                Some(LemmingState::Ohno)
            }
            n => {
                lem.countdown = Some(n);
                None
            }
        }
    }
}
