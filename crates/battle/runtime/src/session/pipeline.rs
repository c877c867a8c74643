//! Per-turn action execution pipeline.
//!
//! One turn walks the sub-phases in order: turn start (stance cleanup,
//! highlight), approach movement, command resolution, action execution,
//! return movement, turn end (condition ticks, power regen). Battle end is
//! re-evaluated after action execution and again after the end-of-turn
//! hooks, so the verdict lands in the same turn as the killing blow and the
//! loser never takes a posthumous return walk.

use battle_core::{
    BattlePhase, CombatEffect, Command, CombatantId, ConditionKind, TurnEntry, Verdict, WorldPos,
    evaluate,
};

use crate::api::Result;
use crate::events::BattleEvent;

use super::BattleSession;

impl BattleSession {
    /// Runs one combatant's full turn. Returns the verdict when the battle
    /// ended during it.
    pub(super) async fn play_turn(&mut self, entry: TurnEntry) -> Result<Option<Verdict>> {
        self.check_cancelled()?;
        let actor = entry.combatant;

        self.transition_to(BattlePhase::TurnStart);
        self.presentation.highlight_turn(actor);
        tracing::debug!(
            target: "battle::pipeline",
            combatant = %actor,
            round = self.scheduler.current_round(),
            index = entry.index_in_round,
            "turn started"
        );
        self.bus.publish(&BattleEvent::TurnStarted {
            combatant: actor,
            round: self.scheduler.current_round(),
            index_in_round: entry.index_in_round,
        });
        self.clear_stance(actor);

        if !self.combatant(actor)?.can_act() {
            tracing::debug!(target: "battle::pipeline", combatant = %actor, "turn skipped");
            self.bus.publish(&BattleEvent::TurnSkipped { combatant: actor });
            self.sleep_cancellable(self.config.skip_turn_delay).await?;
            return self.finish_turn(actor);
        }

        self.transition_to(BattlePhase::CharacterMove);
        let (slot, side) = {
            let c = self.combatant(actor)?;
            (c.slot, c.side)
        };
        self.glide(actor, self.positions.attack_position(slot, side))
            .await?;

        self.transition_to(BattlePhase::CommandSelect);
        let command = self.resolve_command(actor).await?;
        self.bus.publish(&BattleEvent::CommandResolved {
            combatant: actor,
            command,
        });

        self.transition_to(BattlePhase::ActionExecute);
        let verdict = self.execute_command(actor, command)?;
        if verdict.is_over() {
            // Same-turn battle end: no return walk, no end-of-turn hooks.
            return Ok(Some(verdict));
        }

        self.transition_to(BattlePhase::CharacterReturn);
        if self.combatant(actor)?.alive {
            self.glide(actor, self.positions.stand_position(slot, side))
                .await?;
        }

        self.finish_turn(actor)
    }

    /// End-of-turn hooks plus the TurnEnd transition, shared by acted and
    /// skipped turns.
    fn finish_turn(&mut self, actor: CombatantId) -> Result<Option<Verdict>> {
        // Forced commands are scoped to the turn they were injected into; a
        // leftover one must not leak to the next combatant.
        if self.surface.take_forced().is_some() {
            tracing::debug!(
                target: "battle::pipeline",
                combatant = %actor,
                "stale forced command dropped"
            );
        }
        self.transition_to(BattlePhase::TurnEnd);

        let regen = self.config.power_regen_per_turn;
        let mut events = Vec::new();
        if let Some(c) = self.roster.get_mut(actor) {
            if c.alive {
                let gained = c.regen_power(regen);
                if gained > 0 {
                    events.push(BattleEvent::PowerRegenerated {
                        combatant: actor,
                        amount: gained,
                    });
                }
            }
            for condition in c.conditions.tick() {
                events.push(BattleEvent::StatusExpired {
                    combatant: actor,
                    condition,
                });
            }
        }
        for event in &events {
            self.bus.publish(event);
        }
        self.bus.publish(&BattleEvent::TurnEnded { combatant: actor });

        let verdict = evaluate(&self.roster);
        Ok(verdict.is_over().then_some(verdict))
    }

    /// Drops a leftover Defending stance at the owner's turn start.
    fn clear_stance(&mut self, actor: CombatantId) {
        let Some(c) = self.roster.get_mut(actor) else {
            return;
        };
        if c.is_defending() {
            c.conditions.remove(ConditionKind::Defending);
            self.bus.publish(&BattleEvent::StatusExpired {
                combatant: actor,
                condition: ConditionKind::Defending,
            });
        }
    }

    /// Applies the resolver's deltas in order and re-evaluates battle end.
    fn execute_command(&mut self, actor: CombatantId, command: Command) -> Result<Verdict> {
        let outcome = {
            let actor_ref = self.combatant(actor)?;
            let target_ref = command.target.and_then(|id| self.roster.get(id));
            self.resolver.resolve(&command, actor_ref, target_ref)
        };

        for effect in outcome.effects {
            match effect {
                CombatEffect::PowerSpent { actor: who, amount } => {
                    let spent = self
                        .roster
                        .get_mut(who)
                        .map_or(0, |c| c.spend_power(amount));
                    if spent > 0 {
                        self.bus.publish(&BattleEvent::PowerSpent {
                            combatant: who,
                            amount: spent,
                        });
                    }
                }
                CombatEffect::Damage { target, amount } => {
                    let Some(c) = self.roster.get_mut(target) else {
                        debug_assert!(false, "damage effect for unknown combatant {target}");
                        continue;
                    };
                    let (actual, lethal) = c.apply_damage(amount);
                    self.bus.publish(&BattleEvent::DamageApplied {
                        attacker: actor,
                        target,
                        amount: actual,
                        lethal,
                    });
                    if lethal {
                        tracing::debug!(target: "battle::pipeline", combatant = %target, "died");
                        self.scheduler.remove_combatant(target);
                        self.bus
                            .publish(&BattleEvent::CombatantDied { combatant: target });
                    }
                }
                CombatEffect::Status {
                    target,
                    condition,
                    turns,
                } => {
                    let Some(c) = self.roster.get_mut(target) else {
                        continue;
                    };
                    c.conditions.add(condition, turns);
                    self.bus.publish(&BattleEvent::StatusInflicted {
                        target,
                        condition,
                        turns,
                    });
                }
            }
        }

        Ok(evaluate(&self.roster))
    }

    /// Movement interpolation placeholder: the destination comes from the
    /// position provider, the duration from config. Instant motion skips the
    /// wait entirely.
    async fn glide(&self, combatant: CombatantId, to: WorldPos) -> Result<()> {
        tracing::trace!(
            target: "battle::pipeline",
            combatant = %combatant,
            x = to.x,
            z = to.z,
            "moving"
        );
        if self.config.instant_motion {
            return self.check_cancelled();
        }
        self.sleep_cancellable(self.config.move_duration).await
    }
}
