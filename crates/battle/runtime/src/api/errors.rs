//! Unified error types surfaced by the battle session.

use thiserror::Error;

use battle_core::{CombatantId, SchedulerError};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The expected, non-error way to stop a battle early. Caught once at
    /// the top of the main loop and treated as a clean exit.
    #[error("battle cancelled")]
    Cancelled,

    #[error("roster needs at least one live combatant per side")]
    InvalidRoster,

    /// `run` was called on a session that already finished; `restart` must
    /// reset it first.
    #[error("session already ran; call restart before running again")]
    NotRestarted,

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The autonomous decision maker failed for an actor. Recovered inside
    /// command resolution via the basic-attack fallback; surfaced only when
    /// logged.
    #[error("decision maker failed for {actor}: {message}")]
    DecisionMaker { actor: CombatantId, message: String },

    /// Unexpected failure during a turn sub-phase. Terminates the session;
    /// there is no per-turn retry.
    #[error("turn failed for {combatant}: {message}")]
    TurnFailed {
        combatant: CombatantId,
        message: String,
    },
}
