use serde::{Deserialize, Serialize};

/// Enumerated state of the battle state machine.
///
/// Exactly one phase is active at a time. The per-turn phases (TurnStart
/// through TurnEnd) are revisited every turn; the machine is cyclic, not a
/// DAG. `BattleEnd` is terminal.
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
pub enum BattlePhase {
    Initialize,
    BattleStart,
    TurnStart,
    CharacterMove,
    CommandSelect,
    ActionExecute,
    CharacterReturn,
    TurnEnd,
    BattleResult,
    BattleEnd,
}

impl BattlePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::BattleEnd)
    }

    /// Whether this phase belongs to the per-turn cycle.
    pub const fn is_turn_phase(self) -> bool {
        matches!(
            self,
            BattlePhase::TurnStart
                | BattlePhase::CharacterMove
                | BattlePhase::CommandSelect
                | BattlePhase::ActionExecute
                | BattlePhase::CharacterReturn
                | BattlePhase::TurnEnd
        )
    }
}
