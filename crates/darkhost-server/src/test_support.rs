//! Test doubles for the control endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};

use relaykey::{RecordingSurface, Surface};

use crate::HostWindow;

/// Window that records input on its surface and counts reloads.
#[derive(Default)]
pub(crate) struct RecordingWindow {
    pub(crate) surface: RecordingSurface,
    reloads: AtomicUsize,
}

impl RecordingWindow {
    pub(crate) fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl HostWindow for RecordingWindow {
    fn surface(&self) -> &dyn Surface {
        &self.surface
    }

    fn reload(&self) -> relaykey::Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
