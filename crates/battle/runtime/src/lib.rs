//! Runtime orchestration for turn-based battles.
//!
//! This crate wires the pure logic of `battle-core` into a running battle:
//! the session state machine and its cooperative main loop, the three-path
//! command resolution protocol, the action execution pipeline, the typed
//! event bus, and the boundary traits external collaborators implement.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the battle session, builder, and main loop
//! - [`api`] exposes the boundary traits and error types
//! - [`events`] provides the topic-based event bus observers subscribe to
//! - [`surface`] is the external command surface (human input, forced commands)
//! - [`providers`] offers ready-made collaborator implementations
//! - [`cancel`] carries the battle-scoped cancellation signal
pub mod api;
pub mod cancel;
pub mod events;
pub mod providers;
pub mod session;
pub mod surface;

pub use api::{
    DecisionMaker, PositionProvider, PresentationSink, Result, SessionError, TargetSelector,
};
pub use cancel::CancelSignal;
pub use events::{BattleEvent, EventBus, SubscriptionId, Topic};
pub use providers::{
    AutoBattler, FirstCandidateSelector, LineFormation, NullDecisionMaker, NullPresentation,
};
pub use session::{BattleSession, BattleSessionBuilder, SessionOutcome};
pub use surface::{CommandParseError, CommandSurface};
