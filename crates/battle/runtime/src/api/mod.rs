//! Public runtime API surface.
//!
//! Gathers the boundary traits external collaborators implement and the
//! error types the session surfaces, so the orchestration modules can stay
//! focused on the main loop.

pub mod errors;
pub mod traits;

pub use errors::{Result, SessionError};
pub use traits::{DecisionMaker, PositionProvider, PresentationSink, TargetSelector};

// Combat math is a battle-core concern; re-exported here because runtime
// consumers inject it at session construction like the other collaborators.
pub use battle_core::CombatResolver;
