//! In-memory document implementing [`RenderTarget`].

use crate::event::{DomEvent, EventHandler};
use crate::selector::Selector;
use crate::target::{NodeId, ReadyState, RenderTarget};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "meta", "link", "input"];

/// Elements whose text is serialized verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<(DomEvent, EventHandler)>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

/// Arena-backed document tree.
///
/// Nodes are never freed; removal only detaches. Handles stay valid for the
/// document's lifetime, so listeners may refer to detached nodes safely.
#[derive(Debug)]
pub struct VirtualDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    ready_state: ReadyState,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDocument {
    /// Create `<html><head></head><body></body></html>`, fully loaded.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            ready_state: ReadyState::Complete,
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.head);
        doc.append_child(doc.root, doc.body);
        doc
    }

    /// Create a document that is still loading.
    pub fn loading() -> Self {
        let mut doc = Self::new();
        doc.ready_state = ReadyState::Loading;
        doc
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Mark parsing as finished and fire `DOMContentLoaded` on the root.
    pub fn finish_loading(&mut self) -> usize {
        self.ready_state = ReadyState::Interactive;
        let fired = self.dispatch(self.root, DomEvent::DomContentLoaded);
        self.ready_state = ReadyState::Complete;
        fired
    }

    /// Fire `event` on `node`, returning how many listeners ran.
    ///
    /// One-shot listeners are dropped after running; listeners registered
    /// while dispatching are kept but not invoked for this event.
    pub fn dispatch(&mut self, node: NodeId, event: DomEvent) -> usize {
        let Some(data) = self.nodes.get_mut(node.0) else {
            return 0;
        };
        let (mut matching, others): (Vec<_>, Vec<_>) = std::mem::take(&mut data.listeners)
            .into_iter()
            .partition(|(e, _)| *e == event);
        data.listeners = others;

        let fired = matching.len();
        for (_, handler) in matching.iter_mut() {
            handler.call(self, node);
        }

        let kept: Vec<_> = matching.into_iter().filter(|(_, h)| !h.is_once()).collect();
        let data = &mut self.nodes[node.0];
        let added = std::mem::replace(&mut data.listeners, kept);
        data.listeners.extend(added);
        fired
    }

    /// Number of listeners registered on a node.
    pub fn listener_count(&self, node: NodeId, event: DomEvent) -> usize {
        self.nodes
            .get(node.0)
            .map(|d| d.listeners.iter().filter(|(e, _)| *e == event).count())
            .unwrap_or(0)
    }

    /// Lower-cased tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Child nodes, including text nodes.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child elements only.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.tag_name(*c).is_some())
            .collect()
    }

    /// Parent node, if attached to one.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// Whether a node is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Parse-free builder helper: create an element with attributes and
    /// append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.outer_html(self.root)
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, false, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, raw_text: bool, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => {
                if raw_text {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_html(text));
                }
            }
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    if value.is_empty() {
                        out.push_str(&format!(" {}", name));
                    } else {
                        out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                    }
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }

                let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
                for child in &data.children {
                    self.write_html(*child, raw, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|d| d.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
    }

    fn collect_matches(&self, node: NodeId, selector: &Selector, out: &mut Vec<NodeId>) {
        let data = &self.nodes[node.0];
        if let NodeKind::Element { tag, attributes } = &data.kind {
            let lookup = |name: &str| {
                attributes
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v.clone())
            };
            if selector.matches(tag, &lookup) {
                out.push(node);
            }
        }
        for child in &data.children {
            self.collect_matches(*child, selector, out);
        }
    }

    fn attributes_mut(&mut self, node: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }
}

impl RenderTarget for VirtualDocument {
    fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }));
        id
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn replace_node(&mut self, old: NodeId, replacement: NodeId) {
        if old == replacement || replacement.0 >= self.nodes.len() {
            return;
        }
        if self.parent(old).is_none() {
            return;
        }
        self.detach(replacement);
        // Re-read the parent: detaching may have shifted sibling positions.
        let Some(parent) = self.parent(old) else {
            return;
        };
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(index) = siblings.iter().position(|c| *c == old) {
            siblings[index] = replacement;
            self.nodes[replacement.0].parent = Some(parent);
            self.nodes[old.0].parent = None;
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn add_event_listener(&mut self, node: NodeId, event: DomEvent, handler: EventHandler) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.listeners.push((event, handler));
        }
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(attributes) = self.attributes_mut(node) else {
            return;
        };
        match attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(attributes) = self.attributes_mut(node) {
            attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if node.0 >= self.nodes.len() {
            return;
        }
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text_node = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(NodeKind::Text(text.to_string())));
        self.nodes[node.0].children.push(text_node);
        self.nodes[text_node.0].parent = Some(node);
    }

    fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_matches(self.root, selector, &mut out);
        out
    }

    fn head(&self) -> NodeId {
        self.head
    }

    fn document_element(&self) -> NodeId {
        self.root
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_new_document_structure() {
        let doc = VirtualDocument::new();
        assert_eq!(doc.to_html(), "<html><head></head><body></body></html>");
        assert_eq!(doc.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut doc = VirtualDocument::new();
        let body = doc.body();
        let a = doc.append_element(body, "p", &[]);
        let b = doc.append_element(body, "mk", &[("src", "x")]);
        let c = doc.append_element(body, "p", &[]);

        let div = doc.create_element("div");
        doc.replace_node(b, div);

        assert_eq!(doc.children(body), &[a, div, c]);
        assert!(!doc.is_attached(b));
        assert!(doc.is_attached(div));
    }

    #[test]
    fn test_replace_detached_is_noop() {
        let mut doc = VirtualDocument::new();
        let orphan = doc.create_element("mk");
        let div = doc.create_element("div");
        doc.replace_node(orphan, div);
        assert!(!doc.is_attached(div));
    }

    #[test]
    fn test_query_in_document_order_skips_detached() {
        let mut doc = VirtualDocument::new();
        let body = doc.body();
        let section = doc.append_element(body, "section", &[]);
        let first = doc.append_element(section, "mk", &[("img", ""), ("src", "a")]);
        let second = doc.append_element(body, "mk", &[("img", ""), ("src", "b")]);
        let _missing_marker = doc.append_element(body, "mk", &[("src", "c")]);
        let _detached = doc.create_element("mk");

        let selector = Selector::tag("mk").with_attribute("img").with_attribute("src");
        assert_eq!(doc.query_selector_all(&selector), vec![first, second]);
        assert_eq!(doc.query_selector(&selector), Some(first));
    }

    #[test]
    fn test_once_listener_fires_once() {
        let mut doc = VirtualDocument::new();
        let img = doc.append_element(doc.body(), "img", &[("src", "a.png")]);
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        doc.add_event_listener(
            img,
            DomEvent::Error,
            EventHandler::once(move |target, node| {
                seen.set(seen.get() + 1);
                target.set_attribute(node, "src", "fallback.png");
            }),
        );

        assert_eq!(doc.dispatch(img, DomEvent::Error), 1);
        assert_eq!(doc.dispatch(img, DomEvent::Error), 0);
        assert_eq!(count.get(), 1);
        assert_eq!(doc.get_attribute(img, "src").as_deref(), Some("fallback.png"));
    }

    #[test]
    fn test_persistent_listener_and_other_events() {
        let mut doc = VirtualDocument::new();
        let node = doc.append_element(doc.body(), "script", &[]);
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        doc.add_event_listener(
            node,
            DomEvent::Load,
            EventHandler::new(move |_, _| seen.set(seen.get() + 1)),
        );

        assert_eq!(doc.dispatch(node, DomEvent::Error), 0);
        doc.dispatch(node, DomEvent::Load);
        doc.dispatch(node, DomEvent::Load);
        assert_eq!(count.get(), 2);
        assert_eq!(doc.listener_count(node, DomEvent::Load), 1);
    }

    #[test]
    fn test_finish_loading_fires_dom_content_loaded() {
        let mut doc = VirtualDocument::loading();
        assert_eq!(doc.ready_state(), ReadyState::Loading);
        let root = doc.document_element();
        doc.add_event_listener(
            root,
            DomEvent::DomContentLoaded,
            EventHandler::once(|target, _| {
                let head = target.head();
                let meta = target.create_element("meta");
                target.append_child(head, meta);
            }),
        );

        assert_eq!(doc.finish_loading(), 1);
        assert_eq!(doc.ready_state(), ReadyState::Complete);
        assert_eq!(doc.element_children(doc.head()).len(), 1);
    }

    #[test]
    fn test_serialization_escapes() {
        let mut doc = VirtualDocument::new();
        let p = doc.append_element(doc.body(), "p", &[("title", "a \"b\" <c>")]);
        doc.set_text_content(p, "1 < 2 & 3");
        let style = doc.append_element(doc.head(), "style", &[]);
        doc.set_text_content(style, ".a>.b{}");
        let img = doc.append_element(doc.body(), "img", &[("src", "a.png"), ("hidden", "")]);

        assert_eq!(
            doc.outer_html(p),
            "<p title=\"a &quot;b&quot; &lt;c&gt;\">1 &lt; 2 &amp; 3</p>"
        );
        assert_eq!(doc.outer_html(style), "<style>.a>.b{}</style>");
        assert_eq!(doc.outer_html(img), "<img src=\"a.png\" hidden>");
    }

    #[test]
    fn test_attribute_roundtrip_and_text() {
        let mut doc = VirtualDocument::new();
        let root = doc.document_element();
        doc.set_attribute(root, "data-mk", "https://cdn/x.js");
        assert_eq!(doc.get_attribute(root, "DATA-MK").as_deref(), Some("https://cdn/x.js"));
        doc.remove_attribute(root, "data-mk");
        assert!(doc.get_attribute(root, "data-mk").is_none());

        let span = doc.append_element(doc.body(), "span", &[]);
        doc.set_text_content(span, "→");
        doc.set_text_content(span, "⇒");
        assert_eq!(doc.text_content(span), "⇒");
        assert_eq!(doc.children(span).len(), 1);
    }
}
