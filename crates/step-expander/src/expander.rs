//! Tag discovery, replacement and initialization.

use std::sync::{Arc, Mutex};

use step_core::{ExpanderPhase, InitGuard, StepConfig};
use step_dom::{DomEvent, EventHandler, NodeId, ReadyState, RenderTarget, Selector};
use step_observability::StructuredLogger;

use crate::descriptor::StepTagDescriptor;
use crate::placeholder::placeholder_data_uri;
use crate::style::stylesheet;

/// Custom tag name.
pub const STEP_TAG: &str = "mk";
/// Presence-only marker attribute.
pub const MARKER_ATTRIBUTE: &str = "img";
/// Path-list attribute.
pub const PATH_ATTRIBUTE: &str = "src";
/// Root-element attribute naming a remote copy of the library.
pub const REMOTE_SCRIPT_ATTRIBUTE: &str = "data-mk";

static GLOBAL_INIT: InitGuard = InitGuard::new();

/// Why a step tag was removed without replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Path attribute absent or empty.
    MissingPaths,
    /// Only delimiters and whitespace.
    NoValidPaths,
}

/// Nodes created for one expanded tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContainer {
    /// The container element now in place of the tag.
    pub node: NodeId,
    /// Image elements in order.
    pub images: Vec<NodeId>,
    /// Arrow elements; always one fewer than images.
    pub arrows: Vec<NodeId>,
}

/// Result of expanding a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Replaced(StepContainer),
    Removed(RemovalReason),
}

/// Counts from one pass over the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub replaced: usize,
    pub removed: usize,
}

impl ParseSummary {
    /// Whether the pass touched nothing.
    pub fn is_noop(&self) -> bool {
        self.replaced == 0 && self.removed == 0
    }
}

/// Result of [`StepExpander::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The guard was already claimed; nothing ran.
    AlreadyInitialized,
    /// Document still loading; parsing runs on `DOMContentLoaded`.
    Deferred,
    /// Tags parsed immediately.
    Parsed(ParseSummary),
}

/// Expands step tags in a [`RenderTarget`].
///
/// Cloning is cheap and clones share the lifecycle phase, so event handlers
/// carry their own copy.
#[derive(Debug, Clone)]
pub struct StepExpander {
    config: Arc<StepConfig>,
    logger: StructuredLogger,
    phase: Arc<Mutex<ExpanderPhase>>,
}

impl StepExpander {
    /// Create an expander with an explicit configuration.
    pub fn new(config: StepConfig) -> Self {
        Self {
            config: Arc::new(config),
            logger: StructuredLogger::for_component("expander"),
            phase: Arc::new(Mutex::new(ExpanderPhase::Uninitialized)),
        }
    }

    /// Create an expander from the process-wide configuration.
    pub fn from_global() -> Self {
        Self::new(StepConfig::global().clone())
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ExpanderPhase {
        match self.phase.lock() {
            Ok(phase) => *phase,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_phase(&self, next: ExpanderPhase) {
        match self.phase.lock() {
            Ok(mut phase) => *phase = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Selector for tags eligible for expansion: `mk[img][src]`.
    pub fn tag_selector() -> Selector {
        Selector::tag(STEP_TAG)
            .with_attribute(MARKER_ATTRIBUTE)
            .with_attribute(PATH_ATTRIBUTE)
    }

    /// Append a style block for the configured classes to the head.
    ///
    /// Not deduplicated: each call appends another block.
    pub fn inject_style(&self, doc: &mut dyn RenderTarget) -> NodeId {
        let style = doc.create_element("style");
        doc.set_attribute(style, "type", "text/css");
        doc.set_text_content(style, &stylesheet(&self.config));
        let head = doc.head();
        doc.append_child(head, style);
        style
    }

    /// Replace one step tag with its image sequence, or remove it.
    pub fn parse_single_tag(&self, doc: &mut dyn RenderTarget, tag: NodeId) -> TagOutcome {
        let raw = doc.get_attribute(tag, PATH_ATTRIBUTE).unwrap_or_default();
        if raw.is_empty() {
            doc.remove_node(tag);
            return TagOutcome::Removed(RemovalReason::MissingPaths);
        }

        let Some(descriptor) = StepTagDescriptor::parse(&raw, &self.config.split_char) else {
            doc.remove_node(tag);
            return TagOutcome::Removed(RemovalReason::NoValidPaths);
        };

        let container = doc.create_element("div");
        doc.set_attribute(container, "class", &self.config.container_class);

        let mut images = Vec::with_capacity(descriptor.len());
        let mut arrows = Vec::with_capacity(descriptor.arrow_count());

        for step in descriptor.steps() {
            let img = doc.create_element("img");
            doc.set_attribute(img, "src", step.path);
            doc.set_attribute(img, "alt", &step.alt_text());
            doc.set_attribute(img, "class", &self.config.img_class);

            let failed_alt = step.failed_alt_text();
            doc.add_event_listener(
                img,
                DomEvent::Error,
                EventHandler::once(move |target, node| {
                    target.set_attribute(node, "src", placeholder_data_uri());
                    target.set_attribute(node, "alt", &failed_alt);
                }),
            );
            doc.append_child(container, img);
            images.push(img);

            if !step.is_last {
                let arrow = doc.create_element("span");
                doc.set_attribute(arrow, "class", &self.config.arrow_class);
                doc.set_text_content(arrow, &self.config.arrow_text);
                doc.append_child(container, arrow);
                arrows.push(arrow);
            }
        }

        doc.replace_node(tag, container);

        TagOutcome::Replaced(StepContainer {
            node: container,
            images,
            arrows,
        })
    }

    /// Expand every `mk[img][src]` tag, in document order.
    ///
    /// Safe to call repeatedly: replaced tags no longer match.
    pub fn parse_all_tags(&self, doc: &mut dyn RenderTarget) -> ParseSummary {
        let mut summary = ParseSummary::default();

        for tag in doc.query_selector_all(&Self::tag_selector()) {
            match self.parse_single_tag(doc, tag) {
                TagOutcome::Replaced(_) => summary.replaced += 1,
                TagOutcome::Removed(_) => summary.removed += 1,
            }
        }

        if !summary.is_noop() {
            self.logger
                .debug_builder("Step tags expanded")
                .field_i64("replaced", summary.replaced as i64)
                .field_i64("removed", summary.removed as i64)
                .emit();
        }

        summary
    }

    /// Load the remote library named on the root element, once.
    ///
    /// Either outcome re-runs [`parse_all_tags`](Self::parse_all_tags); local
    /// parsing has already happened, so a failed load only logs a warning.
    pub fn auto_load_remote_script(&self, doc: &mut dyn RenderTarget) -> Option<NodeId> {
        let root = doc.document_element();
        let url = doc.get_attribute(root, REMOTE_SCRIPT_ATTRIBUTE)?;
        if url.is_empty() {
            return None;
        }

        let existing = Selector::tag("script").with_attribute_value("src", url.as_str());
        if doc.query_selector(&existing).is_some() {
            return None;
        }

        let script = doc.create_element("script");
        doc.set_attribute(script, "src", &url);

        let on_load = self.clone();
        doc.add_event_listener(
            script,
            DomEvent::Load,
            EventHandler::once(move |target, _| {
                on_load.set_phase(ExpanderPhase::RemoteScriptLoaded);
                on_load.parse_all_tags(target);
            }),
        );

        let on_error = self.clone();
        let failed_url = url.clone();
        doc.add_event_listener(
            script,
            DomEvent::Error,
            EventHandler::once(move |target, _| {
                on_error
                    .logger
                    .warn_builder("Remote script failed to load; using local parsing")
                    .field("url", failed_url.as_str())
                    .emit();
                on_error.set_phase(ExpanderPhase::RemoteScriptFailed);
                on_error.parse_all_tags(target);
            }),
        );

        let head = doc.head();
        doc.append_child(head, script);
        doc.remove_attribute(root, REMOTE_SCRIPT_ATTRIBUTE);
        self.set_phase(ExpanderPhase::RemoteScriptRequested);

        self.logger
            .debug_builder("Remote script requested")
            .field("url", url)
            .emit();

        Some(script)
    }

    /// Run the full startup sequence unless `guard` was already claimed.
    ///
    /// Style first, then tag parsing and the remote bootstrap, deferred to
    /// `DOMContentLoaded` while the document is still loading.
    pub fn init(&self, doc: &mut dyn RenderTarget, guard: &InitGuard) -> InitOutcome {
        if !guard.try_claim() {
            return InitOutcome::AlreadyInitialized;
        }

        self.inject_style(doc);
        self.set_phase(ExpanderPhase::StyleInjected);

        if doc.ready_state() == ReadyState::Loading {
            let expander = self.clone();
            let root = doc.document_element();
            doc.add_event_listener(
                root,
                DomEvent::DomContentLoaded,
                EventHandler::once(move |target, _| {
                    expander.run_startup_parse(target);
                }),
            );
            self.set_phase(ExpanderPhase::WaitingForDom);
            return InitOutcome::Deferred;
        }

        InitOutcome::Parsed(self.run_startup_parse(doc))
    }

    /// [`init`](Self::init) against the process-wide guard.
    pub fn init_once(&self, doc: &mut dyn RenderTarget) -> InitOutcome {
        self.init(doc, &GLOBAL_INIT)
    }

    fn run_startup_parse(&self, doc: &mut dyn RenderTarget) -> ParseSummary {
        let summary = self.parse_all_tags(doc);
        self.set_phase(ExpanderPhase::Parsed);
        self.auto_load_remote_script(doc);
        summary
    }
}
