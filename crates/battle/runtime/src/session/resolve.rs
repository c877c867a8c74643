//! Three-path command resolution.
//!
//! Priority order, re-checked on every poll iteration:
//!   1. forced command injected through the surface
//!   2. autonomous decision for combatants under the decision maker
//!   3. human input, bounded by the command timeout
//!
//! Every failure inside resolution degrades to the same fallback, a basic
//! attack on the first live enemy, so a turn always produces exactly one
//! command.

use battle_core::{Command, CombatantId, Side};

use crate::api::{Result, SessionError};

use super::BattleSession;

impl BattleSession {
    pub(super) async fn resolve_command(&self, actor: CombatantId) -> Result<Command> {
        let side = self.combatant(actor)?.side;

        if let Some(command) = self.surface.take_forced() {
            tracing::debug!(target: "battle::resolve", combatant = %actor, "forced command");
            self.targets.cancel_selection();
            return Ok(command);
        }

        if self.decisions.controls(actor, &self.roster) {
            return self.autonomous_path(actor, side).await;
        }

        let resolved = self.human_path(actor, side).await;
        self.presentation.hide_command_ui();
        resolved
    }

    async fn autonomous_path(&self, actor: CombatantId, side: Side) -> Result<Command> {
        let decision = tokio::select! {
            _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
            decision = self.decisions.make_decision(actor, &self.roster, &self.cancel) => decision,
        };

        match decision {
            Ok(decision) => Ok(decision.validate(&self.roster, side)),
            Err(err) => {
                tracing::warn!(
                    target: "battle::resolve",
                    combatant = %actor,
                    error = %err,
                    "decision maker failed, using fallback"
                );
                Ok(Command::fallback(&self.roster, side))
            }
        }
    }

    /// Polls for human input until something resolves or the timeout lands.
    async fn human_path(&self, actor: CombatantId, side: Side) -> Result<Command> {
        self.presentation.show_command_ui(actor);
        let deadline = tokio::time::Instant::now() + self.config.command_timeout;

        loop {
            // Forced commands win even mid-wait, aborting any selection.
            if let Some(command) = self.surface.take_forced() {
                tracing::debug!(target: "battle::resolve", combatant = %actor, "forced command");
                self.targets.cancel_selection();
                return Ok(command);
            }

            // An autonomous decision that appeared mid-wait (auto-battle
            // toggled on) takes over from the human.
            if let Some(decision) = self.decisions.immediate_decision(actor, &self.roster) {
                tracing::debug!(target: "battle::resolve", combatant = %actor, "autonomous takeover");
                return Ok(decision.validate(&self.roster, side));
            }

            if let Some(command) = self.surface.take_pending() {
                match self.complete_human_command(actor, side, command).await? {
                    Some(command) => return Ok(command),
                    // Selection cancelled: back to command selection.
                    None => {
                        self.presentation.show_command_ui(actor);
                        continue;
                    }
                }
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                tracing::debug!(target: "battle::resolve", combatant = %actor, "input timed out");
                return Ok(Command::fallback(&self.roster, side));
            }
            self.presentation.update_timer(deadline - now);

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Fills in the missing target of a human command, driving interactive
    /// selection when needed. `None` means the selection was cancelled.
    async fn complete_human_command(
        &self,
        actor: CombatantId,
        side: Side,
        command: Command,
    ) -> Result<Option<Command>> {
        if !command.kind.requires_target() {
            return Ok(Some(command));
        }

        if let Some(target) = command.target {
            // Explicit targets still get liveness-checked; a stale pick
            // degrades to the fallback instead of hitting a corpse.
            if self.roster.is_live_on(target, side.opponent()) {
                return Ok(Some(command));
            }
            tracing::debug!(target: "battle::resolve", combatant = %actor, "stale target");
            return Ok(Some(Command::fallback(&self.roster, side)));
        }

        let candidates: Vec<CombatantId> =
            self.roster.live(side.opponent()).map(|c| c.id).collect();
        if candidates.is_empty() {
            return Ok(Some(Command::skip()));
        }

        let default = candidates.first().copied();
        let selection = self.targets.start_selection(&candidates, default, actor);
        tokio::pin!(selection);
        // The forced slot stays authoritative while selection is suspended:
        // keep polling it at the input cadence and abort the selection the
        // moment a forced command appears.
        let picked = loop {
            if let Some(forced) = self.surface.take_forced() {
                tracing::debug!(target: "battle::resolve", combatant = %actor, "forced command");
                self.targets.cancel_selection();
                return Ok(Some(forced));
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
                picked = &mut selection => break picked,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        };
        Ok(picked.map(|target| command.with_target(target)))
    }
}
