use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a combatant: its slot index in the [`Roster`] arena.
///
/// Slots are assigned at roster assembly time and stay stable for the whole
/// battle session, including across restarts.
///
/// [`Roster`]: crate::combatant::Roster
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u8);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which roster a combatant belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    /// Returns the opposing side.
    pub const fn opponent(self) -> Self {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }

    /// Ordering rank used by the scheduler tie-break: allies act before
    /// enemies on equal speed. This is an explicit design choice, not an
    /// artifact of iteration order.
    pub(crate) const fn order_rank(self) -> u8 {
        match self {
            Side::Ally => 0,
            Side::Enemy => 1,
        }
    }
}

/// Identifier of a skill definition owned by the content layer.
///
/// The orchestration core never interprets skill ids beyond routing them to
/// the combat-math resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SkillId(pub u16);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skill:{}", self.0)
    }
}

/// World-space position used for the approach/return interpolation.
///
/// Produced by the positioning provider; the simulation treats it as opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
