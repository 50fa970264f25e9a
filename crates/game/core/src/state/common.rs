use std::fmt;

/// Server-issued, session-scoped unit identifier.
///
/// Identifiers are allocated when a session is created (`player`, `a1`, `e1`,
/// ...) and are never reused within the session. Battles copy units with the
/// same identifiers so reconciliation never depends on client-echoed ids.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UnitId(pub String);

impl UnitId {
    /// Identifier reserved for the controllable player unit.
    pub const PLAYER: &'static str = "player";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn player() -> Self {
        Self(Self::PLAYER.to_owned())
    }

    pub fn ally(index: usize) -> Self {
        Self(format!("a{}", index + 1))
    }

    pub fn enemy(index: usize) -> Self {
        Self(format!("e{}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.0 == Self::PLAYER
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, used for movement reach.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev distance (chessboard distance), used for attack and skill range.
    ///
    /// This is `max(|dx|, |dy|)`, so diagonal neighbours count as adjacent.
    pub fn chebyshev(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which side a unit fights for. The player and allies share a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Which side may act within the current turn.
///
/// Phases follow the fixed cycle `player -> enemy -> player -> ...`; the turn
/// counter advances when the cycle wraps back to `player`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Player,
    Enemy,
}

impl Phase {
    /// The side that owns this phase.
    pub const fn owner(self) -> Side {
        match self {
            Phase::Player => Side::Player,
            Phase::Enemy => Side::Enemy,
        }
    }

    /// The phase that follows this one in the cycle.
    pub const fn next(self) -> Self {
        match self {
            Phase::Player => Phase::Enemy,
            Phase::Enemy => Phase::Player,
        }
    }

    /// Returns true if stepping from `self` wraps into a new turn.
    pub const fn wraps(self) -> bool {
        matches!(self, Phase::Enemy)
    }
}

/// Lifecycle status of a session or battle.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    /// Terminal sessions accept no further mutation.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}
