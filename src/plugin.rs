//! Host plugin contract and the screenshot plugin's lifecycle.
//!
//! The host owns the hook table. The plugin registers one input hook on
//! `init` and removes it on `cleanup`; nothing else is held between the two.

use std::fmt;
use thiserror::Error;

use crate::chord::ChordDetector;
use crate::export::{Exporter, LOG_TARGET};
use crate::scancode::InputEvent;

/// Plugin ABI revision this crate was built against.
pub const PLUGIN_API_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginType {
    /// Shows up in the launcher menu.
    Menu,
    /// Long-running background service.
    Service,
    /// Hooks host events without UI of its own.
    Hook,
}

/// Static plugin metadata reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub slug: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub api_version: u32,
    pub plugin_type: PluginType,
    pub flags: u32,
}

pub static PLUGIN_INFO: PluginInfo = PluginInfo {
    name: "Screenshot",
    slug: "screenshot",
    version: "1.0.0",
    author: "Tanmatsu",
    description: "Capture screenshots with LOGO+P",
    api_version: PLUGIN_API_VERSION,
    plugin_type: PluginType::Hook,
    flags: 0,
};

/// Identifier the host hands out for a registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub u32);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receives every input event the host delivers.
pub trait InputHook {
    /// Return `true` to consume the event.
    fn on_input(&mut self, event: &InputEvent) -> bool;
}

impl<E: Exporter> InputHook for ChordDetector<E> {
    fn on_input(&mut self, event: &InputEvent) -> bool {
        self.handle(event).is_consumed()
    }
}

/// Errors reported by the host's hook table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("input hook table full ({capacity} hooks)")]
    HookTableFull { capacity: usize },
}

/// The host side of hook registration.
pub trait HookRegistry {
    fn register_input_hook(&mut self, hook: Box<dyn InputHook>) -> Result<HookId, HostError>;
    fn unregister_input_hook(&mut self, id: HookId);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin already initialized (hook {0})")]
    AlreadyInitialized(HookId),
    #[error("Failed to register input hook: {0}")]
    HookRegistration(#[from] HostError),
}

/// Registration state for the screenshot plugin.
#[derive(Debug, Default)]
pub struct ScreenshotPlugin {
    hook: Option<HookId>,
}

impl ScreenshotPlugin {
    pub fn new() -> Self {
        ScreenshotPlugin::default()
    }

    pub fn info(&self) -> &'static PluginInfo {
        &PLUGIN_INFO
    }

    /// The registered hook, if initialized.
    pub fn hook_id(&self) -> Option<HookId> {
        self.hook
    }

    pub fn is_initialized(&self) -> bool {
        self.hook.is_some()
    }

    /// Register `detector` as this plugin's input hook.
    ///
    /// Fails if already initialized; call [`cleanup`](Self::cleanup) first.
    pub fn init<R, E>(
        &mut self,
        registry: &mut R,
        detector: ChordDetector<E>,
    ) -> Result<HookId, PluginError>
    where
        R: HookRegistry + ?Sized,
        E: Exporter + 'static,
    {
        if let Some(id) = self.hook {
            return Err(PluginError::AlreadyInitialized(id));
        }

        log::info!(target: LOG_TARGET, "Screenshot plugin initializing...");

        let id = registry
            .register_input_hook(Box::new(detector))
            .inspect_err(|_| log::error!(target: LOG_TARGET, "Failed to register input hook"))?;
        self.hook = Some(id);

        log::info!(
            target: LOG_TARGET,
            "Screenshot plugin initialized, hook_id={}",
            id
        );
        Ok(id)
    }

    /// Unregister the hook. Safe to call when not initialized.
    pub fn cleanup<R: HookRegistry + ?Sized>(&mut self, registry: &mut R) {
        if let Some(id) = self.hook.take() {
            registry.unregister_input_hook(id);
        }
        log::info!(target: LOG_TARGET, "Screenshot plugin cleaned up");
    }
}
