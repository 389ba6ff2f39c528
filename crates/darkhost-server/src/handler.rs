//! Routes parsed commands to the hosted window.

use relaykey::RelayKey;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{Command, HostContext, Result};

/// Applies control commands to whatever window the context currently holds.
#[derive(Clone)]
pub struct Handler {
    ctx: HostContext,
    relay: RelayKey,
    /// Cuts in-flight typing short when the server shuts down.
    cancel: CancellationToken,
}

impl Handler {
    /// Create a handler with the default relay.
    pub fn new(ctx: HostContext) -> Self {
        Self {
            ctx,
            relay: RelayKey::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use a custom relay (e.g. a different typing delay).
    pub fn with_relay(mut self, relay: RelayKey) -> Self {
        self.relay = relay;
        self
    }

    /// Stop typing when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Parse and apply one raw message. Unparseable messages are dropped.
    pub async fn handle_message(&self, msg: &str) -> Result<()> {
        match Command::parse(msg) {
            Some(cmd) => self.handle(cmd).await,
            None => {
                trace!(msg, "ignored_message");
                Ok(())
            }
        }
    }

    /// Apply one command. Without a hosted window this does nothing.
    pub async fn handle(&self, cmd: Command) -> Result<()> {
        let Some(window) = self.ctx.window() else {
            trace!(action = cmd.action(), "no_host_window");
            return Ok(());
        };
        debug!(action = cmd.action(), "control_command");
        let surface = window.surface();
        match cmd {
            Command::Refresh => window.reload()?,
            Command::KeyClick(code) => self.relay.click(surface, code)?,
            Command::KeyDown(code) => self.relay.key_down(surface, code)?,
            Command::KeyUp(code) => self.relay.key_up(surface, code)?,
            Command::Text(text) => {
                self.relay
                    .type_text_until(surface, &text, &self.cancel)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use keycode::{KeyCode, ResolvedKey};
    use relaykey::{Error as RelayError, InputEvent};

    use super::*;
    use crate::{Error, test_support::RecordingWindow};

    fn setup() -> (Handler, Arc<RecordingWindow>) {
        let ctx = HostContext::new();
        let win = Arc::new(RecordingWindow::default());
        ctx.set_window(win.clone());
        (Handler::new(ctx), win)
    }

    #[tokio::test(start_paused = true)]
    async fn key_click_matches_direct_dispatch() {
        let (h, win) = setup();
        h.handle_message("keyClick|65").await.unwrap();

        let direct = relaykey::RecordingSurface::new();
        RelayKey::new().click(&direct, KeyCode(65)).unwrap();
        assert_eq!(win.surface.events(), direct.events());
        assert_eq!(
            win.surface.events(),
            vec![
                InputEvent::KeyDown {
                    key: ResolvedKey::Char('A')
                },
                InputEvent::KeyUp {
                    key: ResolvedKey::Char('A')
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn key_down_and_up_route_separately() {
        let (h, win) = setup();
        win.surface.set_focused(true);
        h.handle(Command::KeyDown(KeyCode(13))).await.unwrap();
        h.handle(Command::KeyUp(KeyCode(13))).await.unwrap();
        assert_eq!(win.surface.focus_calls(), 0);
        assert_eq!(
            win.surface.events(),
            vec![
                InputEvent::KeyDown {
                    key: ResolvedKey::Named("Enter")
                },
                InputEvent::KeyUp {
                    key: ResolvedKey::Named("Enter")
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_action_does_nothing() {
        let (h, win) = setup();
        h.handle_message("bogusAction|65").await.unwrap();
        h.handle_message("keyClick").await.unwrap();
        assert!(win.surface.events().is_empty());
        assert_eq!(win.surface.focus_calls(), 0);
        assert_eq!(win.reloads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_reloads_once_without_input() {
        let (h, win) = setup();
        h.handle_message("refresh|anything|ignored").await.unwrap();
        assert_eq!(win.reloads(), 1);
        assert!(win.surface.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn text_types_each_char() {
        let (h, win) = setup();
        h.handle_message("text|ab").await.unwrap();
        assert_eq!(
            win.surface.events(),
            vec![InputEvent::Char { ch: 'a' }, InputEvent::Char { ch: 'b' }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_window_means_no_effect() {
        let h = Handler::new(HostContext::new());
        for msg in ["refresh", "keyClick|13", "text|abc", "junk"] {
            h.handle_message(msg).await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn surface_fault_is_returned() {
        let (h, win) = setup();
        win.surface.fail_with(RelayError::SurfaceGone);
        let err = h.handle_message("keyDown|13").await.unwrap_err();
        assert!(matches!(err, Error::Relay(RelayError::SurfaceGone)));
    }
}
