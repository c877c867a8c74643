//! Deterministic battle logic and data types shared across clients.
//!
//! `battle-core` defines the canonical rules of a turn-based battle: the
//! combatant arena, commands, the round scheduler, the battle-end evaluator,
//! and the default combat-math resolver. Everything here is pure and
//! synchronous; orchestration (phases, timers, input) lives in the runtime
//! crate, which depends on the types re-exported here.
pub mod combat;
pub mod combatant;
pub mod command;
pub mod config;
pub mod evaluator;
pub mod phase;
pub mod scheduler;
pub mod types;

pub use combat::{BasicResolver, CombatEffect, CombatOutcome, CombatResolver};
pub use combatant::{Combatant, ConditionKind, Conditions, Roster, RosterError, Stats};
pub use command::{Command, CommandKind, Decision};
pub use config::BattleConfig;
pub use evaluator::{Verdict, evaluate};
pub use phase::BattlePhase;
pub use scheduler::{RoundProgress, SchedulerError, TurnEntry, TurnScheduler};
pub use types::{CombatantId, Side, SkillId, WorldPos};
