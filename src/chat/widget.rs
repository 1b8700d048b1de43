//! The chat input as seen by the coordinator.
//!
//! Only two pieces of UI state matter here: whether the input is disabled and
//! whether the busy indicator is shown. Both are set and cleared together by
//! [`BusyGuard`], so dropping the guard on any path restores the input.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Visible state of the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatWidgetState {
    pub disabled: bool,
    pub busy_indicator: bool,
    pub focused: bool,
}

impl Default for ChatWidgetState {
    fn default() -> Self {
        Self {
            disabled: false,
            busy_indicator: false,
            focused: true,
        }
    }
}

/// A chat input plus its single send slot
#[derive(Debug)]
pub struct ChatWidget {
    id: String,
    state: Mutex<ChatWidgetState>,
    send_slot: tokio::sync::Mutex<()>,
}

impl ChatWidget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(ChatWidgetState::default()),
            send_slot: tokio::sync::Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ChatWidgetState {
        *self.lock_state()
    }

    pub fn is_disabled(&self) -> bool {
        self.lock_state().disabled
    }

    /// Disable or enable the input from outside (e.g. the host form is locked)
    pub fn set_disabled(&self, disabled: bool) {
        self.lock_state().disabled = disabled;
    }

    /// Claim the send slot; `None` if another send already holds it
    pub fn try_reserve(&self) -> Option<SendReservation<'_>> {
        let slot = self.send_slot.try_lock().ok()?;
        Some(SendReservation { widget: self, _slot: slot })
    }

    fn set_busy(&self, busy: bool) {
        let mut state = self.lock_state();
        state.busy_indicator = busy;
        state.disabled = busy;
        state.focused = !busy;
    }

    fn lock_state(&self) -> MutexGuard<'_, ChatWidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive right to send from a widget, held until dropped
pub struct SendReservation<'a> {
    widget: &'a ChatWidget,
    _slot: tokio::sync::MutexGuard<'a, ()>,
}

impl<'a> SendReservation<'a> {
    /// Show the busy indicator and disable the input until the guard drops
    pub fn mark_busy(self) -> BusyGuard<'a> {
        self.widget.set_busy(true);
        BusyGuard { reservation: self }
    }
}

/// Restores the widget to enabled, idle and focused when dropped
pub struct BusyGuard<'a> {
    reservation: SendReservation<'a>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.reservation.widget.set_busy(false);
    }
}
