//! Relays synthetic key input into a hosted content surface.
//!
//! A `RelayKey` resolves numeric key codes (see `keycode`) and posts
//! KeyDown/KeyUp events to a `Surface`, focusing the surface first when it is
//! not focused. Text is typed one `Char` event at a time with a short pause
//! between characters so the page sees human-speed input.
//!
//! Events are posted directly; there is no queueing and no synthetic repeat.
//! Surface failures are returned to the caller unchanged.
#![warn(missing_docs)]
use std::{fmt, time::Duration};

use keycode::{KeyCode, ResolvedKey, resolve};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

mod error;
pub use error::{Error, Result};

#[cfg(any(test, feature = "test-utils"))]
mod recording;
#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingSurface;

/// Default pause after each typed character.
pub const DEFAULT_TYPE_DELAY: Duration = Duration::from_millis(10);

/// A synthetic input event delivered to a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Key press.
    KeyDown {
        /// Resolved key identifier.
        key: ResolvedKey,
    },
    /// Key release.
    KeyUp {
        /// Resolved key identifier.
        key: ResolvedKey,
    },
    /// A typed character.
    Char {
        /// The literal character.
        ch: char,
    },
}

impl InputEvent {
    /// DOM-style event type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyDown { .. } => "keyDown",
            Self::KeyUp { .. } => "keyUp",
            Self::Char { .. } => "char",
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyDown { key } | Self::KeyUp { key } => write!(f, "{}({key})", self.kind()),
            Self::Char { ch } => write!(f, "char({ch:?})"),
        }
    }
}

/// The renderable area of a hosted window that receives synthetic input.
///
/// Implementations are borrowed per call; the relay never owns a surface.
pub trait Surface: Send + Sync {
    /// Whether the surface currently has keyboard focus.
    fn is_focused(&self) -> bool;
    /// Give the surface keyboard focus.
    fn focus(&self) -> Result<()>;
    /// Deliver one input event.
    fn send_input_event(&self, event: InputEvent) -> Result<()>;
}

/// Focus `surface` unless it already has focus.
fn ensure_focus(surface: &dyn Surface) -> Result<()> {
    if !surface.is_focused() {
        trace!("surface_focus");
        surface.focus()?;
    }
    Ok(())
}

/// Key relay with a configurable typing cadence.
#[derive(Clone, Debug)]
pub struct RelayKey {
    type_delay: Duration,
}

impl Default for RelayKey {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayKey {
    /// Create a relay using [`DEFAULT_TYPE_DELAY`].
    pub fn new() -> Self {
        Self {
            type_delay: DEFAULT_TYPE_DELAY,
        }
    }

    /// Override the pause after each typed character.
    pub fn with_type_delay(mut self, delay: Duration) -> Self {
        self.type_delay = delay;
        self
    }

    /// Pause applied after each typed character.
    pub fn type_delay(&self) -> Duration {
        self.type_delay
    }

    /// Focus, resolve `code`, then post KeyDown if `press` and KeyUp if
    /// `release`, in that order. With both flags false only the focus step
    /// happens.
    pub fn dispatch(
        &self,
        surface: &dyn Surface,
        code: KeyCode,
        press: bool,
        release: bool,
    ) -> Result<()> {
        ensure_focus(surface)?;
        let key = resolve(code);
        trace!(%code, %key, press, release, "dispatch");
        if press {
            surface.send_input_event(InputEvent::KeyDown { key })?;
        }
        if release {
            surface.send_input_event(InputEvent::KeyUp { key })?;
        }
        Ok(())
    }

    /// Press and release.
    pub fn click(&self, surface: &dyn Surface, code: KeyCode) -> Result<()> {
        self.dispatch(surface, code, true, true)
    }

    /// Press only.
    pub fn key_down(&self, surface: &dyn Surface, code: KeyCode) -> Result<()> {
        self.dispatch(surface, code, true, false)
    }

    /// Release only.
    pub fn key_up(&self, surface: &dyn Surface, code: KeyCode) -> Result<()> {
        self.dispatch(surface, code, false, true)
    }

    /// Type `text` one character at a time, pausing after each character.
    ///
    /// Other tasks on the same runtime may run during each pause, so input
    /// from elsewhere can land between two characters.
    pub async fn type_text(&self, surface: &dyn Surface, text: &str) -> Result<()> {
        ensure_focus(surface)?;
        for ch in text.chars() {
            surface.send_input_event(InputEvent::Char { ch })?;
            sleep(self.type_delay).await;
        }
        debug!(chars = text.chars().count(), "typed_text");
        Ok(())
    }

    /// Like [`RelayKey::type_text`], but stops before the next character once
    /// `cancel` fires. Returns `false` when typing was cut short.
    pub async fn type_text_until(
        &self,
        surface: &dyn Surface,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        ensure_focus(surface)?;
        for (typed, ch) in text.chars().enumerate() {
            if cancel.is_cancelled() {
                debug!(typed, "typing_cancelled");
                return Ok(false);
            }
            surface.send_input_event(InputEvent::Char { ch })?;
            tokio::select! {
                _ = sleep(self.type_delay) => {}
                _ = cancel.cancelled() => {
                    debug!(typed = typed + 1, "typing_cancelled");
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
