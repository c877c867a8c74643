//! Commands and decisions.
//!
//! A [`Command`] is what the resolution protocol hands to the action
//! pipeline: produced by exactly one of the three resolution paths, consumed
//! once, never persisted beyond the turn. A [`Decision`] is the untrusted
//! output of the autonomous decision maker and must be validated before it
//! becomes a command.

use serde::{Deserialize, Serialize};

use crate::combatant::Roster;
use crate::types::{CombatantId, Side, SkillId};

/// The kind of action a combatant commits to for its turn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    Attack,
    Skill(SkillId),
    Defend,
    Skip,
}

impl CommandKind {
    /// Whether this command must resolve against an enemy target.
    pub const fn requires_target(self) -> bool {
        matches!(self, CommandKind::Attack | CommandKind::Skill(_))
    }
}

/// A fully resolved command plus optional target and power expenditure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    pub target: Option<CombatantId>,
    /// Bounded "power" expenditure enhancing the action. Clamped to the
    /// actor's available pool when applied.
    pub power_cost: u32,
}

impl Command {
    pub const fn attack(target: CombatantId) -> Self {
        Self {
            kind: CommandKind::Attack,
            target: Some(target),
            power_cost: 0,
        }
    }

    pub const fn skill(id: SkillId, target: CombatantId, power_cost: u32) -> Self {
        Self {
            kind: CommandKind::Skill(id),
            target: Some(target),
            power_cost,
        }
    }

    pub const fn defend() -> Self {
        Self {
            kind: CommandKind::Defend,
            target: None,
            power_cost: 0,
        }
    }

    pub const fn skip() -> Self {
        Self {
            kind: CommandKind::Skip,
            target: None,
            power_cost: 0,
        }
    }

    /// The documented fallback for every resolution failure: a plain attack
    /// against the first live enemy, or Skip when no enemy remains.
    pub fn fallback(roster: &Roster, actor_side: Side) -> Self {
        match roster.first_live(actor_side.opponent()) {
            Some(target) => Self::attack(target.id),
            None => Self::skip(),
        }
    }

    pub const fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Output of the autonomous decision maker.
///
/// Treated as untrusted input: [`Decision::validate`] checks target liveness
/// and legality before the decision is allowed to become a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub kind: CommandKind,
    pub target: Option<CombatantId>,
    pub power_cost: u32,
}

impl Decision {
    pub const fn new(kind: CommandKind, target: Option<CombatantId>, power_cost: u32) -> Self {
        Self {
            kind,
            target,
            power_cost,
        }
    }

    /// Validates the decision against the roster and converts it into a
    /// command, falling back to a basic attack on the first live enemy when
    /// the target is missing, dead, or on the wrong side.
    pub fn validate(self, roster: &Roster, actor_side: Side) -> Command {
        if !self.kind.requires_target() {
            return Command {
                kind: self.kind,
                target: None,
                power_cost: self.power_cost,
            };
        }

        match self.target {
            Some(target) if roster.is_live_on(target, actor_side.opponent()) => Command {
                kind: self.kind,
                target: Some(target),
                power_cost: self.power_cost,
            },
            _ => Command::fallback(roster, actor_side),
        }
    }
}
