//! Text command parsing for the websocket control channel.
//!
//! The browser UI sends one command per message, as comma separated text:
//!
//! ```text
//! cameraPan,<delta>
//! cameraTilt,<delta>
//! move,<x>,<y>
//! ```
//!
//! Parsing is a single step from text to the closed [`Command`] enum. Any
//! problem (unknown kind, missing or malformed number) is reported as a
//! [`ParseError`] and nothing is actuated for that message.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::command::{Command, MoveCommand, ParseError};
//!
//! assert_eq!(Command::parse("cameraPan,5.0"), Ok(Command::Pan(5.0)));
//! assert_eq!(
//!     Command::parse("move,0.5,-1"),
//!     Ok(Command::Move(MoveCommand::new(0.5, -1.0)))
//! );
//! assert!(matches!(
//!     Command::parse("cameraPan,abc"),
//!     Err(ParseError::InvalidNumber { .. })
//! ));
//! ```

use core::fmt;

// ============================================================================
// Command Kind
// ============================================================================

/// How the first token of a message is matched against command names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KindMatch {
    /// The token must equal the command name.
    #[default]
    Exact,
    /// The token must start with the command name (`cameraPanXYZ` is a pan).
    Prefix,
}

/// The kinds of command the control channel understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandKind {
    /// `cameraPan` - relative pan adjustment.
    Pan,
    /// `cameraTilt` - relative tilt adjustment.
    Tilt,
    /// `move` - two-axis drive vector.
    Move,
}

impl CommandKind {
    const ALL: [CommandKind; 3] = [CommandKind::Pan, CommandKind::Tilt, CommandKind::Move];

    /// Wire name of the command.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Pan => "cameraPan",
            CommandKind::Tilt => "cameraTilt",
            CommandKind::Move => "move",
        }
    }

    /// Number of numeric arguments the command takes.
    pub const fn arity(&self) -> usize {
        match self {
            CommandKind::Pan | CommandKind::Tilt => 1,
            CommandKind::Move => 2,
        }
    }

    /// Look up the kind named by `token`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_rover::command::{CommandKind, KindMatch};
    ///
    /// assert_eq!(CommandKind::from_token("move", KindMatch::Exact), Some(CommandKind::Move));
    /// assert_eq!(CommandKind::from_token("cameraPanXYZ", KindMatch::Exact), None);
    /// assert_eq!(
    ///     CommandKind::from_token("cameraPanXYZ", KindMatch::Prefix),
    ///     Some(CommandKind::Pan)
    /// );
    /// ```
    pub fn from_token(token: &str, matching: KindMatch) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| match matching {
            KindMatch::Exact => token == kind.as_str(),
            KindMatch::Prefix => token.starts_with(kind.as_str()),
        })
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Two-axis joystick vector.
///
/// Both axes are nominally in `[-1.0, 1.0]` but are not range checked here;
/// the [`ActuationMapper`](crate::mapper::ActuationMapper) clamps its outputs
/// for any finite input. Negative `y_axis` is stick-forward.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveCommand {
    /// Horizontal deflection, positive to the right.
    pub x_axis: f32,
    /// Vertical deflection, negative forward.
    pub y_axis: f32,
}

impl MoveCommand {
    /// Create a move vector.
    pub const fn new(x_axis: f32, y_axis: f32) -> Self {
        Self { x_axis, y_axis }
    }
}

/// A parsed control-channel command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Pan the camera by `delta` steps (positive pans left).
    Pan(f32),
    /// Tilt the camera by `delta` steps (positive tilts up).
    Tilt(f32),
    /// Drive with a joystick vector.
    Move(MoveCommand),
}

impl Command {
    /// Parse a message with exact command-name matching.
    pub fn parse(message: &str) -> Result<Self, ParseError> {
        Self::parse_with(message, KindMatch::Exact)
    }

    /// Parse a message with the given command-name matching rule.
    ///
    /// Tokens are separated by `,` and trimmed. Arguments beyond the
    /// command's arity are ignored.
    pub fn parse_with(message: &str, matching: KindMatch) -> Result<Self, ParseError> {
        let mut tokens = message.split(',').map(str::trim);

        let name = tokens.next().unwrap_or("");
        if name.is_empty() {
            return Err(ParseError::Empty);
        }
        let kind = CommandKind::from_token(name, matching).ok_or(ParseError::UnknownKind)?;

        let mut args = [0.0_f32; 2];
        for (index, slot) in args.iter_mut().take(kind.arity()).enumerate() {
            let token = tokens
                .next()
                .ok_or(ParseError::MissingArgument { kind, index })?;
            *slot = parse_axis(token).map_err(|reason| reason.at(kind, index))?;
        }

        Ok(match kind {
            CommandKind::Pan => Command::Pan(args[0]),
            CommandKind::Tilt => Command::Tilt(args[0]),
            CommandKind::Move => Command::Move(MoveCommand::new(args[0], args[1])),
        })
    }

    /// The kind of this command.
    pub const fn kind(&self) -> CommandKind {
        match self {
            Command::Pan(_) => CommandKind::Pan,
            Command::Tilt(_) => CommandKind::Tilt,
            Command::Move(_) => CommandKind::Move,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a message could not be turned into a [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The message had no command name.
    Empty,
    /// The command name is not one of `cameraPan`, `cameraTilt`, `move`.
    UnknownKind,
    /// Fewer arguments than the command needs.
    MissingArgument {
        /// Command being parsed.
        kind: CommandKind,
        /// Zero-based argument position.
        index: usize,
    },
    /// An argument was not a decimal number.
    InvalidNumber {
        /// Command being parsed.
        kind: CommandKind,
        /// Zero-based argument position.
        index: usize,
    },
    /// An argument parsed to NaN or infinity.
    NonFinite {
        /// Command being parsed.
        kind: CommandKind,
        /// Zero-based argument position.
        index: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::UnknownKind => f.write_str("unknown command kind"),
            ParseError::MissingArgument { kind, index } => {
                write!(f, "{} is missing argument {}", kind, index + 1)
            }
            ParseError::InvalidNumber { kind, index } => {
                write!(f, "cannot convert argument {} of {} to a number", index + 1, kind)
            }
            ParseError::NonFinite { kind, index } => {
                write!(f, "argument {} of {} is not finite", index + 1, kind)
            }
        }
    }
}

enum AxisError {
    Invalid,
    NonFinite,
}

impl AxisError {
    fn at(self, kind: CommandKind, index: usize) -> ParseError {
        match self {
            AxisError::Invalid => ParseError::InvalidNumber { kind, index },
            AxisError::NonFinite => ParseError::NonFinite { kind, index },
        }
    }
}

fn parse_axis(token: &str) -> Result<f32, AxisError> {
    let value: f32 = token.parse().map_err(|_| AxisError::Invalid)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AxisError::NonFinite)
    }
}
