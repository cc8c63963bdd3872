// Simulation state: the world one tick operates on.
//
// `SimState` bundles the terrain, trigger registry, lemming manager, victory
// tracker, skill inventory, masks and config. `step()` runs exactly one
// simulation tick (spawn, nuke, per-lemming loop) and returns the narrative
// events it produced. It knows nothing about wall-clock time or the replay
// log; `game.rs` drives it and `command.rs` mutates it between ticks.
//
// Events raised by player actions between two ticks (skill assigned, nuke
// started) are buffered and handed out with the next step's events.
//
// See also: `manager.rs` for the agent loop, `game.rs` for the tick driver,
// `command.rs` for the operations that change this state from outside.
//
// **Critical constraint: determinism.** `step()` must be a pure function of
// the current state and the tick number.

use crate::action::ActionContext;
use crate::config::{LevelDefinition, SimConfig};
use crate::event::{SimEvent, SimEventKind};
use crate::lemming::LemmingView;
use crate::manager::LemmingManager;
use crate::skills::GameSkills;
use crate::terrain::{MaskSet, Terrain};
use crate::trigger::TriggerRegistry;
use crate::types::{LemmingId, Skill};
use crate::victory::VictoryTracker;

#[derive(Debug)]
pub struct SimState {
    pub terrain: Terrain,
    pub triggers: TriggerRegistry,
    pub lemmings: LemmingManager,
    pub victory: VictoryTracker,
    pub skills: GameSkills,
    pub masks: MaskSet,
    pub config: SimConfig,
    /// The last tick `step()` ran.
    pub tick: u64,
    pending_events: Vec<SimEvent>,
}

impl SimState {
    /// Build the initial state for `level`. The level should already have
    /// passed `LevelDefinition::validate`.
    pub fn from_level(level: &LevelDefinition, config: SimConfig, masks: MaskSet) -> Self {
        let mut triggers = TriggerRegistry::new();
        triggers.add_range(level.build_triggers());

        Self {
            terrain: level.build_terrain(),
            triggers,
            lemmings: LemmingManager::new(level.entrances.clone(), &config),
            victory: VictoryTracker::new(level.need_count, level.release_count, level.release_rate),
            skills: GameSkills::new(&level.skills),
            masks,
            config,
            tick: 0,
            pending_events: Vec::new(),
        }
    }

    /// Run simulation tick `tick`.
    pub fn step(&mut self, tick: u64) -> Vec<SimEvent> {
        self.tick = tick;
        let mut events = std::mem::take(&mut self.pending_events);

        let mut ctx = ActionContext {
            terrain: &mut self.terrain,
            triggers: &mut self.triggers,
            victory: &mut self.victory,
            masks: &self.masks,
            config: &self.config,
            tick,
        };
        self.lemmings.tick(&mut ctx, &mut events);

        events
    }

    /// Offer `skill` to lemming `id`. Does not touch the skill inventory.
    pub fn assign_skill(&mut self, id: LemmingId, skill: Skill) -> bool {
        if !self.lemmings.do_lemming_action(id, skill) {
            return false;
        }
        tracing::debug!(tick = self.tick, %id, ?skill, "skill assigned");
        self.push_event(SimEventKind::SkillAssigned {
            lemming_id: id,
            skill,
        });
        true
    }

    /// Start the nuke: stop releasing and arm every lemming, one per tick.
    /// Returns `false` if the nuke was already on.
    pub fn nuke_all(&mut self) -> bool {
        if !self.lemmings.do_nuke_all_lemmings() {
            return false;
        }
        self.victory.do_nuke();
        tracing::debug!(tick = self.tick, "nuke started");
        self.push_event(SimEventKind::NukeStarted);
        true
    }

    pub fn views(&self) -> Vec<LemmingView> {
        self.lemmings.lemming_views(&self.config)
    }

    fn push_event(&mut self, kind: SimEventKind) {
        self.pending_events.push(SimEvent {
            tick: self.tick,
            kind,
        });
    }
}
