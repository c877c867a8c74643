//! Battle session and main loop.
//!
//! [`BattleSession`] owns the battle state machine and drives it as one
//! cooperative loop on the caller's task: phases advance strictly in order,
//! and everything that takes time (movement, input waits, presentation
//! delays) is a suspension point racing the battle-scoped cancel signal.
//! No per-turn tasks are spawned; losing the session drops the whole battle.
//!
//! The per-turn sub-phases live in [`pipeline`], command resolution in
//! [`resolve`].

mod pipeline;
mod resolve;

use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    BasicResolver, BattleConfig, BattlePhase, CombatResolver, Combatant, CombatantId, Roster,
    Side, TurnScheduler, Verdict,
};

use crate::api::{
    DecisionMaker, PositionProvider, PresentationSink, Result, SessionError, TargetSelector,
};
use crate::cancel::CancelSignal;
use crate::events::{BattleEvent, EventBus};
use crate::providers::{FirstCandidateSelector, LineFormation, NullDecisionMaker, NullPresentation};
use crate::surface::CommandSurface;

/// How a finished `run` ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The battle ran to its natural end with this verdict.
    Finished(Verdict),
    /// The battle was cancelled mid-run and unwound cleanly.
    Cancelled,
}

/// Builder wiring collaborators into a [`BattleSession`].
///
/// Every collaborator has a working default, so `builder().build(roster)`
/// yields a headless-capable session where both sides must be driven through
/// the command surface.
pub struct BattleSessionBuilder {
    config: BattleConfig,
    bus: EventBus,
    surface: CommandSurface,
    decisions: Arc<dyn DecisionMaker>,
    targets: Arc<dyn TargetSelector>,
    resolver: Arc<dyn CombatResolver>,
    positions: Arc<dyn PositionProvider>,
    presentation: Arc<dyn PresentationSink>,
}

impl Default for BattleSessionBuilder {
    fn default() -> Self {
        Self {
            config: BattleConfig::new(),
            bus: EventBus::new(),
            surface: CommandSurface::new(),
            decisions: Arc::new(NullDecisionMaker),
            targets: Arc::new(FirstCandidateSelector),
            resolver: Arc::new(BasicResolver::new()),
            positions: Arc::new(LineFormation::default()),
            presentation: Arc::new(NullPresentation),
        }
    }
}

impl BattleSessionBuilder {
    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs a pre-built bus so observers can subscribe before `run`.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn command_surface(mut self, surface: CommandSurface) -> Self {
        self.surface = surface;
        self
    }

    pub fn decision_maker(mut self, decisions: impl DecisionMaker + 'static) -> Self {
        self.decisions = Arc::new(decisions);
        self
    }

    pub fn target_selector(mut self, targets: impl TargetSelector + 'static) -> Self {
        self.targets = Arc::new(targets);
        self
    }

    pub fn combat_resolver(mut self, resolver: impl CombatResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn position_provider(mut self, positions: impl PositionProvider + 'static) -> Self {
        self.positions = Arc::new(positions);
        self
    }

    pub fn presentation(mut self, presentation: impl PresentationSink + 'static) -> Self {
        self.presentation = Arc::new(presentation);
        self
    }

    pub fn build(self, roster: Roster) -> BattleSession {
        BattleSession {
            roster,
            scheduler: TurnScheduler::new(),
            phase: BattlePhase::Initialize,
            config: self.config,
            bus: self.bus,
            surface: self.surface,
            cancel: CancelSignal::new(),
            decisions: self.decisions,
            targets: self.targets,
            resolver: self.resolver,
            positions: self.positions,
            presentation: self.presentation,
        }
    }
}

/// A single battle from initialization to its terminal phase.
pub struct BattleSession {
    roster: Roster,
    scheduler: TurnScheduler,
    phase: BattlePhase,
    config: BattleConfig,
    bus: EventBus,
    surface: CommandSurface,
    cancel: CancelSignal,
    decisions: Arc<dyn DecisionMaker>,
    targets: Arc<dyn TargetSelector>,
    resolver: Arc<dyn CombatResolver>,
    positions: Arc<dyn PositionProvider>,
    presentation: Arc<dyn PresentationSink>,
}

impl BattleSession {
    pub fn builder() -> BattleSessionBuilder {
        BattleSessionBuilder::default()
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Cheap clone of the shared bus, for subscribing observers.
    pub fn event_bus(&self) -> EventBus {
        self.bus.clone()
    }

    /// Cheap clone of the command surface, for external input injection.
    pub fn surface(&self) -> CommandSurface {
        self.surface.clone()
    }

    /// Handle to the current battle's cancel signal. Invalidated by
    /// `restart`, which installs a fresh signal.
    pub fn cancel_handle(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Drives the battle to its terminal phase.
    ///
    /// Cancellation is not an error at this level: a cancelled run unwinds
    /// to `Ok(SessionOutcome::Cancelled)` with the machine parked in its
    /// terminal phase. Everything else surfaces as [`SessionError`].
    pub async fn run(&mut self) -> Result<SessionOutcome> {
        match self.run_inner().await {
            Ok(verdict) => Ok(SessionOutcome::Finished(verdict)),
            Err(SessionError::Cancelled) => {
                tracing::info!(target: "battle::session", phase = %self.phase, "battle cancelled");
                self.presentation.hide_command_ui();
                self.transition_to(BattlePhase::BattleEnd);
                Ok(SessionOutcome::Cancelled)
            }
            Err(err) => Err(err),
        }
    }

    async fn run_inner(&mut self) -> Result<Verdict> {
        if self.phase != BattlePhase::Initialize {
            return Err(SessionError::NotRestarted);
        }
        self.check_cancelled()?;

        if !self.roster.has_live(Side::Ally) || !self.roster.has_live(Side::Enemy) {
            return Err(SessionError::InvalidRoster);
        }
        self.scheduler.initialize(&self.roster)?;

        tracing::info!(
            target: "battle::session",
            allies = self.roster.live_count(Side::Ally),
            enemies = self.roster.live_count(Side::Enemy),
            "battle starting"
        );
        self.transition_to(BattlePhase::BattleStart);
        self.bus.publish(&BattleEvent::BattleStarted {
            allies: self.roster.live(Side::Ally).map(|c| c.id).collect(),
            enemies: self.roster.live(Side::Enemy).map(|c| c.id).collect(),
        });
        self.bus.publish(&BattleEvent::RoundStarted {
            round: self.scheduler.current_round(),
        });

        let verdict = loop {
            match self.scheduler.next_turn(&self.roster) {
                Some(entry) => match self.play_turn(entry).await {
                    Ok(Some(verdict)) => break verdict,
                    Ok(None) => {}
                    Err(SessionError::TurnFailed { combatant, message }) => {
                        tracing::error!(
                            target: "battle::session",
                            %combatant,
                            reason = %message,
                            "turn failed"
                        );
                        self.bus.publish(&BattleEvent::TurnFailed {
                            combatant,
                            message: message.clone(),
                        });
                        return Err(SessionError::TurnFailed { combatant, message });
                    }
                    Err(err) => return Err(err),
                },
                None => {
                    // Round boundary or battle over; the liveness guard
                    // tells them apart.
                    if !self.scheduler.has_alive_combatants(&self.roster) {
                        break Verdict::Draw;
                    }
                    let finished = self.scheduler.current_round();
                    self.bus.publish(&BattleEvent::RoundEnded { round: finished });
                    self.scheduler.start_next_round(&self.roster)?;
                    tracing::debug!(
                        target: "battle::session",
                        round = self.scheduler.current_round(),
                        "round started"
                    );
                    self.bus.publish(&BattleEvent::RoundStarted {
                        round: self.scheduler.current_round(),
                    });
                }
            }
        };

        tracing::info!(target: "battle::session", %verdict, "battle over");
        self.transition_to(BattlePhase::BattleResult);
        self.bus.publish(&BattleEvent::BattleEnded { verdict });
        // Cancellation during the result presentation only skips the delay;
        // the verdict already stands.
        let _ = self.sleep_cancellable(self.config.result_delay).await;

        self.transition_to(BattlePhase::BattleEnd);
        Ok(verdict)
    }

    /// Resets the session for a rematch with the same roster: combatants
    /// restored in place, scheduler and surface cleared, every subscription
    /// dropped, and a fresh cancel signal installed.
    pub fn restart(&mut self) {
        tracing::info!(target: "battle::session", "restart requested");
        self.roster.reset_all();
        self.scheduler = TurnScheduler::new();
        self.bus.clear();
        self.surface.clear();
        self.cancel = CancelSignal::new();
        self.phase = BattlePhase::Initialize;
    }

    fn transition_to(&mut self, to: BattlePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        tracing::trace!(target: "battle::session", %from, %to, "phase transition");
        self.bus.publish(&BattleEvent::PhaseChanged { from, to });
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }

    /// Sleeps for `duration` unless cancelled first.
    async fn sleep_cancellable(&self, duration: Duration) -> Result<()> {
        self.check_cancelled()?;
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(SessionError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn combatant(&self, id: CombatantId) -> Result<&Combatant> {
        self.roster.get(id).ok_or_else(|| SessionError::TurnFailed {
            combatant: id,
            message: "combatant missing from roster".into(),
        })
    }
}
