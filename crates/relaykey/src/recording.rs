use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{Error, InputEvent, Result, Surface};

/// In-memory surface that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    focused: AtomicBool,
    focus_calls: AtomicUsize,
    events: Mutex<Vec<InputEvent>>,
    fail: Mutex<Option<Error>>,
}

impl RecordingSurface {
    /// New unfocused surface with no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of received events in arrival order.
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().clone()
    }

    /// Number of `focus` calls seen.
    pub fn focus_calls(&self) -> usize {
        self.focus_calls.load(Ordering::SeqCst)
    }

    /// Force focus state without counting a focus call.
    pub fn set_focused(&self, v: bool) {
        self.focused.store(v, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: Error) {
        *self.fail.lock() = Some(err);
    }

    fn check(&self) -> Result<()> {
        match self.fail.lock().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Surface for RecordingSurface {
    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn focus(&self) -> Result<()> {
        self.check()?;
        self.focus_calls.fetch_add(1, Ordering::SeqCst);
        self.focused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn send_input_event(&self, event: InputEvent) -> Result<()> {
        self.check()?;
        self.events.lock().push(event);
        Ok(())
    }
}
