//! In-process stand-in for the device shell.
//!
//! Holds a bounded input hook table and a display, and delivers events to
//! hooks one at a time on the caller's thread.

use crate::framebuffer::SharedDisplay;
use crate::plugin::{HookId, HookRegistry, HostError, InputHook};
use crate::scancode::InputEvent;

/// Hook slots available by default.
pub const DEFAULT_HOOK_CAPACITY: usize = 8;

pub struct LocalHost {
    hooks: Vec<(HookId, Box<dyn InputHook>)>,
    capacity: usize,
    next_id: u32,
    display: SharedDisplay,
}

impl LocalHost {
    pub fn new(display: SharedDisplay) -> Self {
        LocalHost::with_capacity(display, DEFAULT_HOOK_CAPACITY)
    }

    pub fn with_capacity(display: SharedDisplay, capacity: usize) -> Self {
        LocalHost {
            hooks: Vec::new(),
            capacity,
            next_id: 0,
            display,
        }
    }

    /// Handle to the host's display, suitable as a framebuffer source.
    pub fn display(&self) -> SharedDisplay {
        self.display.clone()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Offer `event` to each hook in registration order.
    ///
    /// Returns `true` if a hook consumed it; later hooks do not see it.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        self.hooks
            .iter_mut()
            .any(|(_, hook)| hook.on_input(event))
    }
}

impl HookRegistry for LocalHost {
    fn register_input_hook(&mut self, hook: Box<dyn InputHook>) -> Result<HookId, HostError> {
        if self.hooks.len() >= self.capacity {
            return Err(HostError::HookTableFull {
                capacity: self.capacity,
            });
        }
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, hook));
        Ok(id)
    }

    fn unregister_input_hook(&mut self, id: HookId) {
        self.hooks.retain(|(hook_id, _)| *hook_id != id);
    }
}
