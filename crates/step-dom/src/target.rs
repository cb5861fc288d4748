//! The render-target capability interface.

use crate::event::{DomEvent, EventHandler};
use crate::selector::Selector;

/// Handle to a node owned by a [`RenderTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Document loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// Still parsing; `DOMContentLoaded` has not fired.
    Loading,
    /// Parsed; subresources may still be loading.
    Interactive,
    /// Fully loaded.
    #[default]
    Complete,
}

/// Document operations the expander needs.
///
/// Object safe, so event handlers receive `&mut dyn RenderTarget` and can
/// mutate the document they were dispatched from.
pub trait RenderTarget {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Put `replacement` where `old` is and detach `old`.
    fn replace_node(&mut self, old: NodeId, replacement: NodeId);

    /// Detach a node from its parent.
    fn remove_node(&mut self, node: NodeId);

    /// Register a listener for an event on a node.
    fn add_event_listener(&mut self, node: NodeId, event: DomEvent, handler: EventHandler);

    /// Read an attribute.
    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute, replacing any previous value.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute if present.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Replace a node's children with a single text node.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    /// Attached elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// First attached element matching `selector`.
    fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// The `<head>` element.
    fn head(&self) -> NodeId;

    /// The root `<html>` element.
    fn document_element(&self) -> NodeId;

    /// Current loading state.
    fn ready_state(&self) -> ReadyState;
}
