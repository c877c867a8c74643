//! Round-based turn order scheduling.
//!
//! The scheduler materializes one round's order at round start, sorted by
//! descending speed. Ties break ally-side-first, then roster insertion
//! order; this is an explicit, documented rule (see [`order_key`]), not an
//! artifact of traversal order.
//!
//! Death removal is idempotent and safe mid-round: entries behind the cursor
//! are already history, entries ahead of it are dropped, and `next_turn`
//! additionally filters liveness so a stale entry can never be served.

use std::cmp::Reverse;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, Roster};
use crate::config::BattleConfig;
use crate::types::CombatantId;

/// Errors that can occur during scheduling operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("cannot schedule a round with no live combatants")]
    EmptyRoster,
}

/// An immutable value describing one scheduled turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEntry {
    pub combatant: CombatantId,
    pub is_ally: bool,
    /// Zero-based position of this turn within its round.
    pub index_in_round: usize,
}

/// `(current, total)` turn counters for the active round, for UI display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundProgress {
    pub current: usize,
    pub total: usize,
}

/// Sort key for round ordering: descending speed, allies before enemies on
/// exact speed ties, roster insertion order last.
fn order_key(c: &Combatant) -> (Reverse<i32>, u8, CombatantId) {
    (Reverse(c.stats.speed), c.side.order_rank(), c.id)
}

/// Priority-ordered turn scheduler operating in discrete rounds.
#[derive(Clone, Debug, Default)]
pub struct TurnScheduler {
    /// Materialized order for the current round. Entries ahead of `cursor`
    /// are upcoming; entries behind it have already been served.
    order: ArrayVec<CombatantId, { BattleConfig::MAX_COMBATANTS }>,
    cursor: usize,
    /// Turns actually served this round (dead entries skipped by the cursor
    /// do not count).
    served: usize,
    round: u32,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the first round from the full roster. Called once per battle
    /// and again on restart.
    pub fn initialize(&mut self, roster: &Roster) -> Result<(), SchedulerError> {
        self.round = 1;
        self.rebuild(roster)?;
        Ok(())
    }

    fn rebuild(&mut self, roster: &Roster) -> Result<(), SchedulerError> {
        self.order = Self::compute_order(roster);
        self.cursor = 0;
        self.served = 0;
        if self.order.is_empty() {
            return Err(SchedulerError::EmptyRoster);
        }
        Ok(())
    }

    fn compute_order(roster: &Roster) -> ArrayVec<CombatantId, { BattleConfig::MAX_COMBATANTS }> {
        let mut live: ArrayVec<&Combatant, { BattleConfig::MAX_COMBATANTS }> =
            roster.iter().filter(|c| c.alive).collect();
        live.sort_by_key(|c| order_key(c));
        live.iter().map(|c| c.id).collect()
    }

    /// Pops and returns the next live turn, or `None` when the round is
    /// exhausted. Dead combatants still present in the order are skipped,
    /// never served.
    pub fn next_turn(&mut self, roster: &Roster) -> Option<TurnEntry> {
        while self.cursor < self.order.len() {
            let id = self.order[self.cursor];
            self.cursor += 1;

            match roster.get(id) {
                Some(c) if c.alive => {
                    let entry = TurnEntry {
                        combatant: id,
                        is_ally: c.side == crate::types::Side::Ally,
                        index_in_round: self.served,
                    };
                    self.served += 1;
                    return Some(entry);
                }
                _ => continue,
            }
        }
        None
    }

    /// True iff no further live entries remain in the current round.
    pub fn is_round_complete(&self, roster: &Roster) -> bool {
        self.remaining_turns(roster).next().is_none()
    }

    /// `(current, total)` counters for the active round.
    pub fn round_progress(&self) -> RoundProgress {
        RoundProgress {
            current: self.served,
            total: self.order.len(),
        }
    }

    /// Lazily produced sequence of the upcoming live turns in this round.
    /// Each call restarts from the current cursor; iterating never mutates
    /// scheduler state.
    pub fn remaining_turns<'a>(
        &'a self,
        roster: &'a Roster,
    ) -> impl Iterator<Item = TurnEntry> + 'a {
        let served = self.served;
        self.order[self.cursor..]
            .iter()
            .filter_map(move |&id| {
                let c = roster.get(id)?;
                c.alive.then_some((id, c.side))
            })
            .enumerate()
            .map(move |(offset, (id, side))| TurnEntry {
                combatant: id,
                is_ally: side == crate::types::Side::Ally,
                index_in_round: served + offset,
            })
    }

    /// Preview of the round that has not started yet, computed from current
    /// roster liveness without touching current-round state.
    pub fn next_round_preview<'a>(
        &'a self,
        roster: &'a Roster,
    ) -> impl Iterator<Item = TurnEntry> + 'a {
        Self::compute_order(roster)
            .into_iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let c = roster.get(id)?;
                Some(TurnEntry {
                    combatant: id,
                    is_ally: c.side == crate::types::Side::Ally,
                    index_in_round: index,
                })
            })
    }

    /// Removes a combatant from the remainder of the current round. Called
    /// on death notification; idempotent, and safe while a round is in
    /// progress. Returns whether an upcoming entry was actually dropped.
    pub fn remove_combatant(&mut self, id: CombatantId) -> bool {
        let Some(pos) = self.order[self.cursor..].iter().position(|&o| o == id) else {
            return false;
        };
        self.order.remove(self.cursor + pos);
        true
    }

    /// Liveness guard distinguishing "round boundary" from "battle over":
    /// the main loop breaks out only when `next_turn` is `None` and this is
    /// false.
    pub fn has_alive_combatants(&self, roster: &Roster) -> bool {
        roster.iter().any(|c| c.alive)
    }

    pub fn current_round(&self) -> u32 {
        self.round
    }

    /// Advances to the next round, rebuilding the order from current roster
    /// liveness.
    pub fn start_next_round(&mut self, roster: &Roster) -> Result<(), SchedulerError> {
        self.round += 1;
        self.rebuild(roster)
    }
}
