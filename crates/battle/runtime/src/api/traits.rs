//! Boundary contracts consumed by the battle session.
//!
//! All collaborators are injected at session construction (capability
//! injection, never runtime discovery) and treated as black boxes with the
//! stated shape only.

use std::time::Duration;

use async_trait::async_trait;

use battle_core::{CombatantId, Decision, Roster, Side, WorldPos};

use super::errors::Result;
use crate::cancel::CancelSignal;

/// Source of autonomous decisions.
///
/// Different implementations can handle scripted AI, auto-battle toggles,
/// replayed fixtures, or test stubs. Decisions are untrusted: the resolution
/// protocol validates them before use.
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    /// Computes a decision for the acting combatant. Suspending; the
    /// session races it against the battle cancel signal, and `cancel` is
    /// also passed through so long-running implementations can bail early.
    async fn make_decision(
        &self,
        actor: CombatantId,
        roster: &Roster,
        cancel: &CancelSignal,
    ) -> Result<Decision>;

    /// Non-suspending probe for a decision that became available while the
    /// human path was waiting (auto-battle toggled mid-turn). Checked every
    /// poll iteration.
    fn immediate_decision(&self, actor: CombatantId, roster: &Roster) -> Option<Decision>;

    /// Whether this combatant is under autonomous control.
    fn controls(&self, actor: CombatantId, roster: &Roster) -> bool;
}

/// Interactive target selection collaborator.
#[async_trait]
pub trait TargetSelector: Send + Sync {
    /// Suspends until a target is picked. `None` means the selection was
    /// cancelled; the human path then returns to command selection instead
    /// of committing.
    async fn start_selection(
        &self,
        candidates: &[CombatantId],
        default: Option<CombatantId>,
        requester: CombatantId,
    ) -> Option<CombatantId>;

    /// Aborts any pending selection. Called when a forced command wins.
    fn cancel_selection(&self);
}

/// Fire-and-forget notifications toward the presentation layer.
///
/// These are not suspension points, and their absence must not break the
/// simulation; every method defaults to a no-op.
pub trait PresentationSink: Send + Sync {
    fn show_command_ui(&self, _actor: CombatantId) {}
    fn hide_command_ui(&self) {}
    fn highlight_turn(&self, _combatant: CombatantId) {}
    fn update_timer(&self, _remaining: Duration) {}
}

/// World-space position lookup for the movement interpolation.
///
/// Purely a lookup keyed by formation slot and side; no side effects on the
/// core.
pub trait PositionProvider: Send + Sync {
    fn attack_position(&self, slot: u8, side: Side) -> WorldPos;
    fn stand_position(&self, slot: u8, side: Side) -> WorldPos;
}
