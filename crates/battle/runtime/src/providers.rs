//! Default collaborator implementations.
//!
//! These are the batteries the session builder installs when the embedder
//! supplies nothing: an auto-battler decision maker, a first-candidate target
//! selector, a straight-line formation, and a silent presentation sink.

use async_trait::async_trait;

use battle_core::{CombatantId, CommandKind, Decision, Roster, Side, WorldPos};

use crate::api::{DecisionMaker, PositionProvider, PresentationSink, Result, TargetSelector};
use crate::cancel::CancelSignal;

/// Decision maker that always attacks the first live opponent.
///
/// Controls every combatant, or just one side when built with
/// [`AutoBattler::for_side`]. Useful as the enemy AI and in headless runs
/// where both sides fight on autopilot.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoBattler {
    side: Option<Side>,
}

impl AutoBattler {
    /// Controls every combatant.
    pub const fn all() -> Self {
        Self { side: None }
    }

    /// Controls only the given side; the other side falls through to the
    /// human path.
    pub const fn for_side(side: Side) -> Self {
        Self { side: Some(side) }
    }

    fn decide(actor: CombatantId, roster: &Roster) -> Option<Decision> {
        let side = roster.get(actor)?.side;
        let target = roster.first_live(side.opponent())?;
        Some(Decision::new(CommandKind::Attack, Some(target.id), 0))
    }
}

#[async_trait]
impl DecisionMaker for AutoBattler {
    async fn make_decision(
        &self,
        actor: CombatantId,
        roster: &Roster,
        _cancel: &CancelSignal,
    ) -> Result<Decision> {
        Ok(Self::decide(actor, roster).unwrap_or(Decision::new(CommandKind::Skip, None, 0)))
    }

    fn immediate_decision(&self, actor: CombatantId, roster: &Roster) -> Option<Decision> {
        if self.controls(actor, roster) {
            Self::decide(actor, roster)
        } else {
            None
        }
    }

    fn controls(&self, actor: CombatantId, roster: &Roster) -> bool {
        match self.side {
            None => true,
            Some(side) => roster.get(actor).is_some_and(|c| c.side == side),
        }
    }
}

/// Decision maker that controls nobody; every combatant goes through the
/// human path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDecisionMaker;

#[async_trait]
impl DecisionMaker for NullDecisionMaker {
    async fn make_decision(
        &self,
        _actor: CombatantId,
        _roster: &Roster,
        _cancel: &CancelSignal,
    ) -> Result<Decision> {
        Ok(Decision::new(CommandKind::Skip, None, 0))
    }

    fn immediate_decision(&self, _actor: CombatantId, _roster: &Roster) -> Option<Decision> {
        None
    }

    fn controls(&self, _actor: CombatantId, _roster: &Roster) -> bool {
        false
    }
}

/// Target selector that immediately confirms the default candidate, or the
/// first one when no default is given.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstCandidateSelector;

#[async_trait]
impl TargetSelector for FirstCandidateSelector {
    async fn start_selection(
        &self,
        candidates: &[CombatantId],
        default: Option<CombatantId>,
        _requester: CombatantId,
    ) -> Option<CombatantId> {
        default
            .filter(|id| candidates.contains(id))
            .or_else(|| candidates.first().copied())
    }

    fn cancel_selection(&self) {}
}

/// Silent presentation sink; every notification stays a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresentation;

impl PresentationSink for NullPresentation {}

/// Two opposing lines along the x axis, one formation slot apart on z.
///
/// Allies stand at negative x, enemies at positive x; the attack position
/// sits just short of the opposing line so approach and return have a fixed
/// travel distance.
#[derive(Clone, Copy, Debug)]
pub struct LineFormation {
    pub line_distance: f32,
    pub slot_spacing: f32,
    pub engage_gap: f32,
}

impl Default for LineFormation {
    fn default() -> Self {
        Self {
            line_distance: 6.0,
            slot_spacing: 2.0,
            engage_gap: 1.5,
        }
    }
}

impl LineFormation {
    fn line_x(&self, side: Side) -> f32 {
        match side {
            Side::Ally => -self.line_distance,
            Side::Enemy => self.line_distance,
        }
    }
}

impl PositionProvider for LineFormation {
    fn attack_position(&self, slot: u8, side: Side) -> WorldPos {
        let facing = self.line_x(side.opponent());
        let gap = match side {
            Side::Ally => -self.engage_gap,
            Side::Enemy => self.engage_gap,
        };
        WorldPos {
            x: facing + gap,
            y: 0.0,
            z: f32::from(slot) * self.slot_spacing,
        }
    }

    fn stand_position(&self, slot: u8, side: Side) -> WorldPos {
        WorldPos {
            x: self.line_x(side),
            y: 0.0,
            z: f32::from(slot) * self.slot_spacing,
        }
    }
}
