//! Battle-end evaluation.
//!
//! A pure predicate over the two roster sides. The session consults it after
//! action execution and after every death event, so battle end is detected
//! in the same turn the last death occurs.

use serde::{Deserialize, Serialize};

use crate::combatant::Roster;
use crate::types::Side;

/// Outcome of evaluating the battle-end condition.
///
/// `Draw` covers the degenerate case of both sides being empty at once; the
/// session treats it as an invariant violation degraded to a defeat-style
/// ending rather than corrupting state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Verdict {
    Ongoing,
    AllyVictory,
    EnemyVictory,
    Draw,
}

impl Verdict {
    pub const fn is_over(self) -> bool {
        !matches!(self, Verdict::Ongoing)
    }
}

/// Evaluates whether the battle is over.
pub fn evaluate(roster: &Roster) -> Verdict {
    let allies_alive = roster.has_live(Side::Ally);
    let enemies_alive = roster.has_live(Side::Enemy);

    match (allies_alive, enemies_alive) {
        (true, true) => Verdict::Ongoing,
        (true, false) => Verdict::AllyVictory,
        (false, true) => Verdict::EnemyVictory,
        (false, false) => Verdict::Draw,
    }
}
