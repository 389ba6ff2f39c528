use std::{fmt, num::ParseIntError, str::FromStr};

use thiserror::Error;

/// A numeric key code as sent by a controller.
///
/// Codes are not validated against any table; every `u32` is a valid code
/// and resolves to something.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u32);

/// Error returned when text is not a decimal key code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid key code {text:?}: {source}")]
pub struct ParseKeyCodeError {
    /// The offending input.
    pub text: String,
    /// Underlying integer parse failure.
    #[source]
    pub source: ParseIntError,
}

impl KeyCode {
    /// Raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for KeyCode {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl FromStr for KeyCode {
    type Err = ParseKeyCodeError;

    /// Parses decimal text, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|source| ParseKeyCodeError {
                text: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
