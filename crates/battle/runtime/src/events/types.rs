//! Event payloads published by the battle session.

use serde::{Deserialize, Serialize};

use battle_core::{BattlePhase, Command, CombatantId, ConditionKind, Verdict};

/// Coarse routing key. Subscribers register per topic and only see events
/// mapped to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Battle lifecycle and phase transitions.
    Battle,
    /// Round boundaries.
    Round,
    /// Per-turn lifecycle.
    Turn,
    /// Command resolution and combat effects.
    Combat,
}

/// Everything observable about a running battle.
///
/// Events are facts about state that already changed; subscribers cannot
/// veto or reorder them. Serializable so observers can persist or ship
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    BattleStarted {
        allies: Vec<CombatantId>,
        enemies: Vec<CombatantId>,
    },
    BattleEnded {
        verdict: Verdict,
    },
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
    },
    RoundStarted {
        round: u32,
    },
    RoundEnded {
        round: u32,
    },
    TurnStarted {
        combatant: CombatantId,
        round: u32,
        index_in_round: usize,
    },
    TurnEnded {
        combatant: CombatantId,
    },
    /// The combatant could not act this turn (dead slot or incapacitating
    /// status); its turn was consumed without a command phase.
    TurnSkipped {
        combatant: CombatantId,
    },
    CommandResolved {
        combatant: CombatantId,
        command: Command,
    },
    DamageApplied {
        attacker: CombatantId,
        target: CombatantId,
        amount: u32,
        lethal: bool,
    },
    StatusInflicted {
        target: CombatantId,
        condition: ConditionKind,
        turns: u8,
    },
    StatusExpired {
        combatant: CombatantId,
        condition: ConditionKind,
    },
    PowerSpent {
        combatant: CombatantId,
        amount: u32,
    },
    PowerRegenerated {
        combatant: CombatantId,
        amount: u32,
    },
    CombatantDied {
        combatant: CombatantId,
    },
    /// A turn sub-phase failed unexpectedly; the session terminates after
    /// publishing this.
    TurnFailed {
        combatant: CombatantId,
        message: String,
    },
}

impl BattleEvent {
    /// Topic this event is delivered on.
    pub fn topic(&self) -> Topic {
        match self {
            Self::BattleStarted { .. } | Self::BattleEnded { .. } | Self::PhaseChanged { .. } => {
                Topic::Battle
            }
            Self::RoundStarted { .. } | Self::RoundEnded { .. } => Topic::Round,
            Self::TurnStarted { .. }
            | Self::TurnEnded { .. }
            | Self::TurnSkipped { .. }
            | Self::TurnFailed { .. } => Topic::Turn,
            Self::CommandResolved { .. }
            | Self::DamageApplied { .. }
            | Self::StatusInflicted { .. }
            | Self::StatusExpired { .. }
            | Self::PowerSpent { .. }
            | Self::PowerRegenerated { .. }
            | Self::CombatantDied { .. } => Topic::Combat,
        }
    }
}
