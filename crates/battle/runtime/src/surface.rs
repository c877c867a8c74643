//! External command surface.
//!
//! [`CommandSurface`] is the cloneable façade through which an external
//! caller feeds the resolution protocol: `on_command_selected` stores the
//! pending human command, `force_command` stores a forced command that wins
//! over every other path. Both slots are consumed exactly once by the
//! session's poll loop; the surface itself never drives the simulation.

use std::sync::{Arc, Mutex, MutexGuard};

use battle_core::{Command, CommandKind, CombatantId, SkillId};

/// Errors from parsing a raw command string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("invalid skill id in {0:?}")]
    InvalidSkillId(String),

    #[error("invalid target in {0:?}")]
    InvalidTarget(String),
}

#[derive(Debug, Default)]
struct SurfaceState {
    pending: Option<Command>,
    forced: Option<Command>,
}

/// Cloneable handle for injecting commands from outside the session.
#[derive(Clone, Debug, Default)]
pub struct CommandSurface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl CommandSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Parses and stores the pending human command. An un-consumed previous
    /// command is replaced.
    ///
    /// Accepted forms: `attack`, `attack@<target>`, `skill:<id>`,
    /// `skill:<id>@<target>`, `defend`, `skip`.
    pub fn on_command_selected(&self, raw: &str) -> Result<(), CommandParseError> {
        let command = Self::parse(raw)?;
        self.lock().pending = Some(command);
        Ok(())
    }

    /// Stores a forced command. Forced commands short-circuit the other two
    /// resolution paths, even mid-poll, and are consumed once.
    pub fn force_command(&self, command: Command) {
        self.lock().forced = Some(command);
    }

    pub(crate) fn take_pending(&self) -> Option<Command> {
        self.lock().pending.take()
    }

    pub(crate) fn take_forced(&self) -> Option<Command> {
        self.lock().forced.take()
    }

    /// Drops both slots. Called on battle restart.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.pending = None;
        state.forced = None;
    }

    fn parse(raw: &str) -> Result<Command, CommandParseError> {
        let trimmed = raw.trim();
        let (body, target) = match trimmed.split_once('@') {
            Some((body, target)) => {
                let slot: u8 = target
                    .parse()
                    .map_err(|_| CommandParseError::InvalidTarget(trimmed.to_owned()))?;
                (body, Some(CombatantId(slot)))
            }
            None => (trimmed, None),
        };

        let kind = match body.split_once(':') {
            Some(("skill", id)) => {
                let id: u16 = id
                    .parse()
                    .map_err(|_| CommandParseError::InvalidSkillId(trimmed.to_owned()))?;
                CommandKind::Skill(SkillId(id))
            }
            Some(_) => return Err(CommandParseError::UnknownCommand(trimmed.to_owned())),
            None => match body {
                "attack" => CommandKind::Attack,
                "defend" => CommandKind::Defend,
                "skip" => CommandKind::Skip,
                _ => return Err(CommandParseError::UnknownCommand(trimmed.to_owned())),
            },
        };

        Ok(Command {
            kind,
            target,
            power_cost: 0,
        })
    }
}
