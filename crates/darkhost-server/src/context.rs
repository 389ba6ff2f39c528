use std::sync::Arc;

use parking_lot::RwLock;
use relaykey::Surface;
use tracing::debug;

/// A hosted browser window as seen by the control endpoint.
pub trait HostWindow: Send + Sync {
    /// The window's content surface.
    fn surface(&self) -> &dyn Surface;
    /// Reload the window's page.
    fn reload(&self) -> relaykey::Result<()>;
}

/// Shared handle to the current hosted window.
///
/// The window host sets it when the main window is created and clears it
/// when that window closes; the endpoint only reads it. Clones share state.
#[derive(Clone, Default)]
pub struct HostContext {
    window: Arc<RwLock<Option<Arc<dyn HostWindow>>>>,
}

impl HostContext {
    /// Empty context: every command is a no-op until a window is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Window created: make it the target of subsequent commands.
    pub fn set_window(&self, window: Arc<dyn HostWindow>) {
        *self.window.write() = Some(window);
        debug!("host_window_set");
    }

    /// Window closed: subsequent commands become no-ops.
    pub fn clear_window(&self) {
        *self.window.write() = None;
        debug!("host_window_cleared");
    }

    /// Current window, if any.
    pub fn window(&self) -> Option<Arc<dyn HostWindow>> {
        self.window.read().clone()
    }

    /// Whether a window is set.
    pub fn has_window(&self) -> bool {
        self.window.read().is_some()
    }
}
