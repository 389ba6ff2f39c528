//! Control message parsing and rendering.

use std::fmt;

use keycode::KeyCode;

/// Field separator on the wire.
const SEP: char = '|';

/// One parsed control message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Reload the hosted page.
    Refresh,
    /// Press and release a key.
    KeyClick(KeyCode),
    /// Press a key.
    KeyDown(KeyCode),
    /// Release a key.
    KeyUp(KeyCode),
    /// Type literal text at human speed.
    Text(String),
}

impl Command {
    /// Parse one message.
    ///
    /// `refresh` in the first field wins regardless of what follows it. Any
    /// other message needs exactly two fields: an action name and its
    /// argument. Unknown actions, wrong field counts and key codes that are
    /// not decimal integers all yield `None`.
    pub fn parse(msg: &str) -> Option<Self> {
        let fields: Vec<&str> = msg.split(SEP).collect();
        if fields[0] == "refresh" {
            return Some(Self::Refresh);
        }
        let [action, arg] = fields.as_slice() else {
            return None;
        };
        let code = || arg.parse::<KeyCode>().ok();
        match *action {
            "keyClick" => code().map(Self::KeyClick),
            "keyDown" => code().map(Self::KeyDown),
            "keyUp" => code().map(Self::KeyUp),
            "text" => Some(Self::Text((*arg).to_string())),
            _ => None,
        }
    }

    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::KeyClick(_) => "keyClick",
            Self::KeyDown(_) => "keyDown",
            Self::KeyUp(_) => "keyUp",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh => f.write_str(self.action()),
            Self::KeyClick(c) | Self::KeyDown(c) | Self::KeyUp(c) => {
                write!(f, "{}{SEP}{c}", self.action())
            }
            Self::Text(t) => write!(f, "{}{SEP}{t}", self.action()),
        }
    }
}

/// Split one received segment into messages.
///
/// Controllers either write one bare message per write or newline-terminated
/// lines; both are accepted. Trailing `\r` is dropped and blank lines are
/// skipped.
pub fn segments(segment: &str) -> impl Iterator<Item = &str> {
    segment
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.is_empty())
}
