//! Combatant arena and per-combatant state.
//!
//! The roster is a fixed-capacity arena indexed by [`CombatantId`]. Slots are
//! assigned once when the roster is assembled and reused across battles via
//! explicit reset rather than destruction and recreation.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::types::{CombatantId, Side};

/// Flat stat block referenced by a combatant.
///
/// `speed` is the scheduler priority: higher speed acts earlier in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub speed: i32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub max_power: u32,
}

impl Stats {
    pub const fn new(speed: i32, max_hp: u32, attack: u32, defense: u32, max_power: u32) -> Self {
        Self {
            speed,
            max_hp,
            attack,
            defense,
            max_power,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(10, 100, 10, 4, 50)
    }
}

/// Kinds of conditions a combatant can carry.
///
/// The first four are incapacitating: a combatant carrying any of them skips
/// the command and action phases of its turn. `Defending` is a stance set by
/// the Defend command and cleared at the defender's next turn start.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ConditionKind {
    Stunned,
    Frozen,
    Petrified,
    Broken,
    Defending,
}

impl ConditionKind {
    /// Whether this condition prevents the combatant from acting.
    pub const fn is_incapacitating(self) -> bool {
        !matches!(self, ConditionKind::Defending)
    }
}

/// A single active condition with a remaining-turn counter.
///
/// Counters are decremented in the owner's end-of-turn hook; a condition is
/// removed when its counter reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub remaining_turns: u8,
}

/// Active conditions on one combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    effects: ArrayVec<Condition, { BattleConfig::MAX_CONDITIONS }>,
}

impl Conditions {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        self.effects.iter().any(|c| c.kind == kind)
    }

    /// Adds a condition. If already present, extends to the longer duration.
    pub fn add(&mut self, kind: ConditionKind, turns: u8) {
        if let Some(existing) = self.effects.iter_mut().find(|c| c.kind == kind) {
            existing.remaining_turns = existing.remaining_turns.max(turns);
            return;
        }

        if !self.effects.is_full() {
            self.effects.push(Condition {
                kind,
                remaining_turns: turns,
            });
        }
    }

    pub fn remove(&mut self, kind: ConditionKind) {
        self.effects.retain(|c| c.kind != kind);
    }

    /// Decrements every counter by one turn and removes expired conditions.
    /// Returns the kinds that expired, in storage order.
    pub fn tick(&mut self) -> ArrayVec<ConditionKind, { BattleConfig::MAX_CONDITIONS }> {
        let mut expired = ArrayVec::new();
        for c in self.effects.iter_mut() {
            c.remaining_turns = c.remaining_turns.saturating_sub(1);
            if c.remaining_turns == 0 {
                expired.push(c.kind);
            }
        }
        self.effects.retain(|c| c.remaining_turns > 0);
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// One participant in the battle, owned by the roster arena.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub side: Side,
    pub name: String,
    /// Position slot within the side's formation, used by the positioning
    /// provider lookup.
    pub slot: u8,
    pub alive: bool,
    pub stats: Stats,
    pub hp: u32,
    pub power: u32,
    pub conditions: Conditions,
}

impl Combatant {
    fn new(id: CombatantId, side: Side, slot: u8, name: String, stats: Stats) -> Self {
        Self {
            id,
            side,
            name,
            slot,
            alive: true,
            stats,
            hp: stats.max_hp,
            power: 0,
            conditions: Conditions::empty(),
        }
    }

    /// Whether this combatant may act on its turn. Dead or incapacitated
    /// combatants skip command selection and action execution.
    pub fn can_act(&self) -> bool {
        self.alive && !self.conditions.iter().any(|c| c.kind.is_incapacitating())
    }

    pub fn is_defending(&self) -> bool {
        self.conditions.has(ConditionKind::Defending)
    }

    /// Applies damage clamped to current HP. Returns `(actual, lethal)`;
    /// a lethal hit drops the alive flag immediately.
    pub fn apply_damage(&mut self, amount: u32) -> (u32, bool) {
        let actual = amount.min(self.hp);
        self.hp -= actual;
        let lethal = self.alive && self.hp == 0;
        if lethal {
            self.alive = false;
        }
        (actual, lethal)
    }

    /// Spends up to `amount` power. Returns how much was actually deducted.
    pub fn spend_power(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.power);
        self.power -= actual;
        actual
    }

    /// Regains power clamped to the maximum pool. Returns the actual gain.
    pub fn regen_power(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.stats.max_power - self.power);
        self.power += actual;
        actual
    }

    /// Resets the slot in place for a battle restart.
    pub fn reset(&mut self) {
        self.alive = true;
        self.hp = self.stats.max_hp;
        self.power = 0;
        self.conditions = Conditions::empty();
    }
}

/// Errors raised when assembling a roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("roster is full ({max} combatants)", max = BattleConfig::MAX_COMBATANTS)]
    Full,
}

/// Fixed-capacity combatant arena indexed by [`CombatantId`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    slots: ArrayVec<Combatant, { BattleConfig::MAX_COMBATANTS }>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combatant, assigning the next free arena slot as its id and
    /// the next per-side formation slot as its position.
    pub fn push(
        &mut self,
        side: Side,
        name: impl Into<String>,
        stats: Stats,
    ) -> Result<CombatantId, RosterError> {
        if self.slots.is_full() {
            return Err(RosterError::Full);
        }
        let id = CombatantId(self.slots.len() as u8);
        let formation_slot = self.side_iter(side).count() as u8;
        self.slots
            .push(Combatant::new(id, side, formation_slot, name.into(), stats));
        Ok(id)
    }

    pub fn add_ally(
        &mut self,
        name: impl Into<String>,
        stats: Stats,
    ) -> Result<CombatantId, RosterError> {
        self.push(Side::Ally, name, stats)
    }

    pub fn add_enemy(
        &mut self,
        name: impl Into<String>,
        stats: Stats,
    ) -> Result<CombatantId, RosterError> {
        self.push(Side::Enemy, name, stats)
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.slots.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.slots.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.slots.iter()
    }

    pub fn side_iter(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.slots.iter().filter(move |c| c.side == side)
    }

    /// Live combatants of one side, in roster insertion order.
    pub fn live(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.side_iter(side).filter(|c| c.alive)
    }

    /// The first live combatant of a side: the documented fallback target
    /// for basic attacks.
    pub fn first_live(&self, side: Side) -> Option<&Combatant> {
        self.live(side).next()
    }

    pub fn has_live(&self, side: Side) -> bool {
        self.live(side).next().is_some()
    }

    pub fn live_count(&self, side: Side) -> usize {
        self.live(side).count()
    }

    /// Returns true if `id` refers to a live combatant of the given side.
    pub fn is_live_on(&self, id: CombatantId, side: Side) -> bool {
        self.get(id).is_some_and(|c| c.alive && c.side == side)
    }

    /// Resets every slot in place for a battle restart.
    pub fn reset_all(&mut self) {
        for c in self.slots.iter_mut() {
            c.reset();
        }
    }
}
