//! Desktop keyboard bridge.
//!
//! Listens for global key events with rdev and forwards them as vendor
//! scancodes over a channel, so the chord detector keeps running on the
//! receiving thread with serialized delivery.

use rdev::{listen, Event, EventType, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::export::LOG_TARGET;
use crate::scancode::{release_of, SCANCODE_LEFTMETA, SCANCODE_P, SCANCODE_RIGHTMETA};

/// Vendor press code for a desktop key, if it is one the plugin cares about.
fn press_code(key: Key) -> Option<u32> {
    match key {
        Key::MetaLeft => Some(SCANCODE_LEFTMETA),
        Key::MetaRight => Some(SCANCODE_RIGHTMETA),
        Key::KeyP => Some(SCANCODE_P),
        _ => None,
    }
}

/// Translate an rdev event into a vendor scancode.
pub fn translate(event_type: &EventType) -> Option<u32> {
    match event_type {
        EventType::KeyPress(key) => press_code(*key),
        EventType::KeyRelease(key) => press_code(*key).map(release_of),
        _ => None,
    }
}

/// Owns the background rdev listener thread.
pub struct KeyListener {
    stop_flag: Arc<AtomicBool>,
    listener_thread: Option<JoinHandle<()>>,
}

impl KeyListener {
    pub fn new() -> Self {
        KeyListener {
            stop_flag: Arc::new(AtomicBool::new(false)),
            listener_thread: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener_thread.is_some()
    }

    /// Start forwarding scancodes to `sender`.
    ///
    /// Returns an error if the listener is already running.
    pub fn start(&mut self, sender: Sender<u32>) -> Result<(), String> {
        if self.listener_thread.is_some() {
            return Err("Key listener already running".to_string());
        }

        let stop_flag = self.stop_flag.clone();
        let handle = thread::spawn(move || {
            let callback = move |event: Event| {
                if stop_flag.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(code) = translate(&event.event_type) {
                    // Receiver gone means the main loop exited.
                    let _ = sender.send(code);
                }
            };

            // Blocks until error; on macOS this needs Accessibility permission.
            if let Err(e) = listen(callback) {
                log::error!(target: LOG_TARGET, "Key listener error: {:?}", e);
            }
        });

        self.listener_thread = Some(handle);
        Ok(())
    }

    /// Stop forwarding events.
    ///
    /// rdev's `listen` cannot be interrupted, so the thread lingers until the
    /// process exits but no longer sends anything.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        self.listener_thread = None;
    }
}

impl Default for KeyListener {
    fn default() -> Self {
        KeyListener::new()
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}
