//! Exercises the three command resolution paths and their priority order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use battle_core::{
    BattleConfig, Command, CommandKind, CombatantId, Decision, Roster, Side, SkillId, Stats,
    Verdict,
};
use battle_runtime::{
    AutoBattler, BattleEvent, BattleSession, CancelSignal, DecisionMaker, EventBus, SessionError,
    SessionOutcome, TargetSelector, Topic,
};

fn collect_commands(bus: &EventBus) -> Arc<Mutex<Vec<(CombatantId, Command)>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    bus.subscribe(Topic::Combat, move |event| {
        if let BattleEvent::CommandResolved { combatant, command } = event {
            sink.lock().unwrap().push((*combatant, *command));
        }
    });
    log
}

fn duel_roster() -> (Roster, CombatantId, CombatantId) {
    let mut roster = Roster::new();
    let hero = roster.add_ally("hero", Stats::new(10, 100, 20, 4, 50)).unwrap();
    let slime = roster.add_enemy("slime", Stats::new(5, 30, 8, 6, 30)).unwrap();
    (roster, hero, slime)
}

/// Target selector that records every call and answers from a script,
/// falling back to the offered default once the script runs dry.
#[derive(Clone, Default)]
struct RecordingSelector(Arc<SelectorState>);

#[derive(Default)]
struct SelectorState {
    calls: AtomicUsize,
    cancels: AtomicUsize,
    seen: Mutex<Vec<Vec<CombatantId>>>,
    script: Mutex<VecDeque<Option<CombatantId>>>,
}

impl RecordingSelector {
    fn scripted(responses: impl IntoIterator<Item = Option<CombatantId>>) -> Self {
        let selector = Self::default();
        selector
            .0
            .script
            .lock()
            .unwrap()
            .extend(responses);
        selector
    }

    fn calls(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }

    fn cancels(&self) -> usize {
        self.0.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetSelector for RecordingSelector {
    async fn start_selection(
        &self,
        candidates: &[CombatantId],
        default: Option<CombatantId>,
        _requester: CombatantId,
    ) -> Option<CombatantId> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0.seen.lock().unwrap().push(candidates.to_vec());
        match self.0.script.lock().unwrap().pop_front() {
            Some(response) => response,
            None => default,
        }
    }

    fn cancel_selection(&self) {
        self.0.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Target selector that never resolves on its own; a selection it starts
/// can only end from the outside.
#[derive(Clone, Default)]
struct StallingSelector(Arc<StallState>);

#[derive(Default)]
struct StallState {
    calls: AtomicUsize,
    cancels: AtomicUsize,
}

#[async_trait]
impl TargetSelector for StallingSelector {
    async fn start_selection(
        &self,
        _candidates: &[CombatantId],
        _default: Option<CombatantId>,
        _requester: CombatantId,
    ) -> Option<CombatantId> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    fn cancel_selection(&self) {
        self.0.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Decision maker whose suspending path always fails.
struct FailingDecisions;

#[async_trait]
impl DecisionMaker for FailingDecisions {
    async fn make_decision(
        &self,
        actor: CombatantId,
        _roster: &Roster,
        _cancel: &CancelSignal,
    ) -> battle_runtime::Result<Decision> {
        Err(SessionError::DecisionMaker {
            actor,
            message: "no script for this actor".into(),
        })
    }

    fn immediate_decision(&self, _actor: CombatantId, _roster: &Roster) -> Option<Decision> {
        None
    }

    fn controls(&self, _actor: CombatantId, _roster: &Roster) -> bool {
        true
    }
}

/// Stand-in for an auto-battle toggle flipped mid-turn: controls nobody, but
/// once armed it produces immediate decisions for everyone.
#[derive(Clone, Default)]
struct ToggleAuto(Arc<AtomicBool>);

#[async_trait]
impl DecisionMaker for ToggleAuto {
    async fn make_decision(
        &self,
        _actor: CombatantId,
        _roster: &Roster,
        _cancel: &CancelSignal,
    ) -> battle_runtime::Result<Decision> {
        Ok(Decision::new(CommandKind::Skip, None, 0))
    }

    fn immediate_decision(&self, actor: CombatantId, roster: &Roster) -> Option<Decision> {
        if !self.0.load(Ordering::SeqCst) {
            return None;
        }
        let side = roster.get(actor)?.side;
        let target = roster.first_live(side.opponent())?;
        Some(Decision::new(CommandKind::Attack, Some(target.id), 0))
    }

    fn controls(&self, _actor: CombatantId, _roster: &Roster) -> bool {
        false
    }
}

#[tokio::test(start_paused = true)]
async fn human_timeout_falls_back_to_basic_attack() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, slime) = duel_roster();

    // Hero is human with nobody at the controls; slime is on autopilot.
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .build(roster);

    let started = tokio::time::Instant::now();
    let outcome = session.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Finished(Verdict::AllyVictory));

    // Every hero command degraded to the fallback after a full timeout.
    assert!(started.elapsed() >= BattleConfig::DEFAULT_COMMAND_TIMEOUT);
    for (combatant, command) in commands.lock().unwrap().iter() {
        if *combatant == hero {
            assert_eq!(command.kind, CommandKind::Attack);
            assert_eq!(command.target, Some(slime));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn forced_command_skips_selection_entirely() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, slime) = duel_roster();
    let selector = RecordingSelector::default();

    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .target_selector(selector.clone())
        .build(roster);
    session
        .surface()
        .force_command(Command::skill(SkillId(1), slime, 0));

    let outcome = session.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Finished(Verdict::AllyVictory));

    // The forced command went straight through: the selector was never
    // consulted, and any pending selection was told to abort.
    assert_eq!(selector.calls(), 0);
    assert!(selector.cancels() >= 1);

    let commands = commands.lock().unwrap();
    let (first_actor, first_command) = commands[0];
    assert_eq!(first_actor, hero);
    assert_eq!(first_command.kind, CommandKind::Skill(SkillId(1)));
    assert_eq!(first_command.target, Some(slime));
}

#[tokio::test(start_paused = true)]
async fn forced_command_interrupts_a_suspended_selection() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, slime) = duel_roster();

    let selector = StallingSelector::default();
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .target_selector(selector.clone())
        .build(roster);

    // An untargeted command parks the turn inside target selection; the
    // forced command arrives while that selection is suspended.
    let surface = session.surface();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        surface.on_command_selected("attack").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        surface.force_command(Command::defend());
    });

    session.run().await.unwrap();

    // The selection was aborted in favor of the forced command, and the
    // forced command was consumed by the turn it was injected into: the
    // following enemy turn resolved its own attack, not a leftover Defend.
    assert_eq!(selector.0.calls.load(Ordering::SeqCst), 1);
    assert!(selector.0.cancels.load(Ordering::SeqCst) >= 1);

    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1.kind, CommandKind::Defend);
    let (second_actor, second_command) = commands[1];
    assert_eq!(second_actor, slime);
    assert_eq!(second_command.kind, CommandKind::Attack);
}

#[tokio::test(start_paused = true)]
async fn forced_command_lands_mid_wait_without_opening_selection() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let mut roster = Roster::new();
    let hero = roster.add_ally("hero", Stats::new(10, 100, 20, 4, 50)).unwrap();
    // Weak enough for the forced skill to end the battle on the spot.
    let slime = roster.add_enemy("slime", Stats::new(5, 20, 8, 6, 30)).unwrap();

    let selector = RecordingSelector::default();
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .target_selector(selector.clone())
        .build(roster);

    // The human path is already polling when the forced command arrives.
    let surface = session.surface();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        surface.force_command(Command::skill(SkillId(2), slime, 0));
    });

    let started = tokio::time::Instant::now();
    let outcome = session.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Finished(Verdict::AllyVictory));

    // Picked up within a poll iteration, nowhere near the input timeout,
    // and the selection UI never opened.
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(selector.calls(), 0);
    let commands = commands.lock().unwrap();
    assert_eq!(commands[0], (hero, Command::skill(SkillId(2), slime, 0)));
}

#[tokio::test]
async fn forced_command_beats_the_autonomous_path() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, _) = duel_roster();

    // Everyone is on autopilot, but a forced Defend is waiting for the
    // first turn.
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::all())
        .build(roster);
    session.surface().force_command(Command::defend());

    session.run().await.unwrap();

    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1.kind, CommandKind::Defend);
    // Subsequent turns resume the autonomous path.
    assert!(commands[1..].iter().all(|(_, c)| c.kind == CommandKind::Attack));
}

#[tokio::test]
async fn failing_decision_maker_degrades_to_the_fallback() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, _, slime) = duel_roster();

    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(FailingDecisions)
        .build(roster);

    let outcome = session.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Finished(Verdict::AllyVictory));

    let commands = commands.lock().unwrap();
    let (_, first_command) = commands[0];
    assert_eq!(first_command.kind, CommandKind::Attack);
    assert_eq!(first_command.target, Some(slime));
}

#[tokio::test(start_paused = true)]
async fn human_command_arrives_through_the_surface() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, _) = duel_roster();

    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .build(roster);

    let surface = session.surface();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        surface.on_command_selected("defend").unwrap();
    });

    session.run().await.unwrap();

    // Defend cannot come from the timeout fallback, so the input was
    // consumed before the deadline.
    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1.kind, CommandKind::Defend);
}

#[tokio::test(start_paused = true)]
async fn untargeted_command_drives_interactive_selection() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let mut roster = Roster::new();
    let hero = roster.add_ally("hero", Stats::new(10, 100, 20, 4, 50)).unwrap();
    let slime = roster.add_enemy("slime", Stats::new(5, 30, 8, 6, 30)).unwrap();
    let bat = roster.add_enemy("bat", Stats::new(4, 20, 6, 2, 10)).unwrap();

    let selector = RecordingSelector::default();
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .target_selector(selector.clone())
        .build(roster);

    let surface = session.surface();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        surface.on_command_selected("attack").unwrap();
    });

    session.run().await.unwrap();

    // The selector saw both live enemies and confirmed the default.
    assert!(selector.calls() >= 1);
    assert_eq!(selector.0.seen.lock().unwrap()[0], vec![slime, bat]);

    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1.target, Some(slime));
}

#[tokio::test(start_paused = true)]
async fn cancelled_selection_returns_to_command_select() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, _) = duel_roster();

    let selector = RecordingSelector::scripted([None]);
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .target_selector(selector.clone())
        .build(roster);

    let surface = session.surface();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        surface.on_command_selected("attack").unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        surface.on_command_selected("defend").unwrap();
    });

    session.run().await.unwrap();

    // First selection was backed out of; the turn then resolved from the
    // replacement input instead of committing anything.
    assert_eq!(selector.calls(), 1);
    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1.kind, CommandKind::Defend);
}

#[tokio::test(start_paused = true)]
async fn stale_explicit_target_degrades_to_the_fallback() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let mut roster = Roster::new();
    let hero = roster.add_ally("hero", Stats::new(10, 100, 20, 4, 50)).unwrap();
    let dead = roster.add_enemy("slime", Stats::new(5, 30, 8, 6, 30)).unwrap();
    let bat = roster.add_enemy("bat", Stats::new(4, 20, 6, 2, 10)).unwrap();
    roster.get_mut(dead).unwrap().apply_damage(1000);

    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(AutoBattler::for_side(Side::Enemy))
        .build(roster);

    let surface = session.surface();
    let stale = format!("attack@{}", dead.0);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        surface.on_command_selected(&stale).unwrap();
    });

    session.run().await.unwrap();

    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1.kind, CommandKind::Attack);
    assert_eq!(commands[0].1.target, Some(bat));
}

#[tokio::test(start_paused = true)]
async fn immediate_decision_takes_over_a_waiting_human() {
    let bus = EventBus::new();
    let commands = collect_commands(&bus);
    let (roster, hero, slime) = duel_roster();

    let toggle = ToggleAuto::default();
    let mut session = BattleSession::builder()
        .config(BattleConfig::headless())
        .event_bus(bus)
        .decision_maker(toggle.clone())
        .build(roster);

    let armed = Arc::clone(&toggle.0);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        armed.store(true, Ordering::SeqCst);
    });

    let started = tokio::time::Instant::now();
    let outcome = session.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Finished(Verdict::AllyVictory));

    // Once armed, every poll resolves instantly: no turn ever waits out the
    // full timeout.
    assert!(started.elapsed() < BattleConfig::DEFAULT_COMMAND_TIMEOUT);
    let commands = commands.lock().unwrap();
    assert_eq!(commands[0].0, hero);
    assert_eq!(commands[0].1, Command::attack(slime));
}
