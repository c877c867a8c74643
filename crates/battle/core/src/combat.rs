//! Combat resolution.
//!
//! The orchestration core treats combat math as a collaborator behind the
//! [`CombatResolver`] trait: given a committed command, it returns the
//! damage/status/resource deltas to apply. [`BasicResolver`] is the default
//! implementation; all of its functions are deterministic and side-effect
//! free, the action pipeline owns applying the deltas and publishing them as
//! events.

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, ConditionKind};
use crate::command::{Command, CommandKind};
use crate::types::CombatantId;

/// A single state delta produced by combat resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEffect {
    /// Deal damage to a target. The pipeline clamps to current HP.
    Damage { target: CombatantId, amount: u32 },
    /// Inflict a condition for a number of the target's turns.
    Status {
        target: CombatantId,
        condition: ConditionKind,
        turns: u8,
    },
    /// Spend power from the actor's pool. The pipeline clamps to the
    /// available amount.
    PowerSpent { actor: CombatantId, amount: u32 },
}

/// Ordered list of deltas for one committed command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub effects: Vec<CombatEffect>,
}

impl CombatOutcome {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Boundary contract for combat math. Formulas are outside the
/// orchestration core's scope; the pipeline only applies returned deltas.
pub trait CombatResolver: Send + Sync {
    fn resolve(
        &self,
        command: &Command,
        actor: &Combatant,
        target: Option<&Combatant>,
    ) -> CombatOutcome;
}

/// Default combat math.
///
/// - Attack: `attack + power spent - defense / 2`, floor 1; halved against
///   a defending target.
/// - Skill: attack damage scaled by 3/2.
/// - Defend: sets the Defending stance until the actor's next turn start.
/// - Skip: no deltas.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicResolver;

impl BasicResolver {
    pub fn new() -> Self {
        Self
    }

    fn strike_damage(actor: &Combatant, target: &Combatant, power_spent: u32) -> u32 {
        let raw = (actor.stats.attack + power_spent).saturating_sub(target.stats.defense / 2);
        let mut damage = raw.max(1);
        if target.is_defending() {
            damage = (damage / 2).max(1);
        }
        damage
    }
}

impl CombatResolver for BasicResolver {
    fn resolve(
        &self,
        command: &Command,
        actor: &Combatant,
        target: Option<&Combatant>,
    ) -> CombatOutcome {
        let power_spent = command.power_cost.min(actor.power);
        let mut effects = Vec::new();

        if power_spent > 0 {
            effects.push(CombatEffect::PowerSpent {
                actor: actor.id,
                amount: power_spent,
            });
        }

        match (command.kind, target) {
            (CommandKind::Attack, Some(target)) => {
                effects.push(CombatEffect::Damage {
                    target: target.id,
                    amount: Self::strike_damage(actor, target, power_spent),
                });
            }
            (CommandKind::Skill(_), Some(target)) => {
                let base = Self::strike_damage(actor, target, power_spent);
                effects.push(CombatEffect::Damage {
                    target: target.id,
                    amount: base * 3 / 2,
                });
            }
            (CommandKind::Defend, _) => {
                // Two turns: the stance must survive the defender's own
                // end-of-turn tick and is instead cleared explicitly at its
                // next turn start.
                effects.push(CombatEffect::Status {
                    target: actor.id,
                    condition: ConditionKind::Defending,
                    turns: 2,
                });
            }
            // Skip, or a targeted command whose target vanished: no deltas.
            _ => {}
        }

        CombatOutcome { effects }
    }
}
