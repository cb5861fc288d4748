//! Event types and listener handles.

use crate::target::{NodeId, RenderTarget};

/// Events the expander listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    /// Resource finished loading.
    Load,
    /// Resource failed to load.
    Error,
    /// Document finished parsing.
    DomContentLoaded,
}

impl DomEvent {
    /// DOM event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Error => "error",
            Self::DomContentLoaded => "DOMContentLoaded",
        }
    }
}

impl std::fmt::Display for DomEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

type Callback = Box<dyn FnMut(&mut dyn RenderTarget, NodeId)>;

/// A registered event listener.
pub struct EventHandler {
    once: bool,
    callback: Callback,
}

impl EventHandler {
    /// Listener that stays registered after firing.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&mut dyn RenderTarget, NodeId) + 'static,
    {
        Self {
            once: false,
            callback: Box::new(callback),
        }
    }

    /// Listener removed after its first invocation.
    pub fn once<F>(callback: F) -> Self
    where
        F: FnMut(&mut dyn RenderTarget, NodeId) + 'static,
    {
        Self {
            once: true,
            callback: Box::new(callback),
        }
    }

    /// Whether the listener is dropped after firing.
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Invoke the listener for `node`.
    pub fn call(&mut self, target: &mut dyn RenderTarget, node: NodeId) {
        (self.callback)(target, node);
    }
}

impl std::fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandler")
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}
