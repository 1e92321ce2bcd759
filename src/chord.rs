//! LOGO+P chord detection over the raw scancode stream.
//!
//! The detector tracks a single bit, whether either LOGO key is held, and
//! fires the exporter when `P` is pressed while it is set. After a capture
//! the bit is cleared even if the LOGO key is still physically down, so a
//! second `P` needs a fresh LOGO press before it captures again.
//!
//! Events must be delivered serially from one thread; the detector holds no
//! lock around its state.

use crate::export::{Exporter, LOG_TARGET};
use crate::scancode::{
    InputEvent, SCANCODE_LEFTMETA, SCANCODE_LEFTMETA_REL, SCANCODE_P, SCANCODE_RIGHTMETA,
    SCANCODE_RIGHTMETA_REL,
};

/// Whether an input event should continue down the host's input pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookVerdict {
    /// The event was swallowed by the hook.
    Consumed,
    /// The event continues to the rest of the pipeline.
    PassThrough,
}

impl HookVerdict {
    pub fn is_consumed(self) -> bool {
        self == HookVerdict::Consumed
    }
}

/// Converts scancodes into capture requests.
pub struct ChordDetector<E> {
    exporter: E,
    logo_held: bool,
}

impl<E: Exporter> ChordDetector<E> {
    pub fn new(exporter: E) -> Self {
        ChordDetector {
            exporter,
            logo_held: false,
        }
    }

    /// Whether a LOGO key is currently considered held.
    pub fn logo_held(&self) -> bool {
        self.logo_held
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn into_exporter(self) -> E {
        self.exporter
    }

    /// Inspect one event, capturing synchronously on LOGO+P.
    ///
    /// Capture failures are logged by the exporter and never change the verdict.
    pub fn handle(&mut self, event: &InputEvent) -> HookVerdict {
        let Some(code) = event.scancode() else {
            return HookVerdict::PassThrough;
        };

        match code {
            SCANCODE_LEFTMETA | SCANCODE_RIGHTMETA => {
                self.logo_held = true;
                HookVerdict::PassThrough
            }
            SCANCODE_LEFTMETA_REL | SCANCODE_RIGHTMETA_REL => {
                self.logo_held = false;
                HookVerdict::PassThrough
            }
            SCANCODE_P if self.logo_held => {
                log::info!(target: LOG_TARGET, "LOGO+P detected, taking screenshot...");
                if let Err(e) = self.exporter.export() {
                    if e.may_leave_file() {
                        log::debug!(target: LOG_TARGET, "Capture abandoned, partial file left: {}", e);
                    } else {
                        log::debug!(target: LOG_TARGET, "Capture abandoned: {}", e);
                    }
                }
                // Both keys are assumed released by the time the capture returns.
                self.logo_held = false;
                HookVerdict::Consumed
            }
            _ => HookVerdict::PassThrough,
        }
    }
}
