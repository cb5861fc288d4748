//! End-to-end expansion of a document.

use step_core::{ExpanderPhase, InitGuard, StepConfig, StepConfigOverrides};
use step_dom::{DomEvent, RenderTarget, VirtualDocument};
use step_expander::{
    placeholder_data_uri, InitOutcome, ParseSummary, StepExpander, MARKER_ATTRIBUTE,
    PATH_ATTRIBUTE, REMOTE_SCRIPT_ATTRIBUTE, STEP_TAG,
};

fn page() -> VirtualDocument {
    let mut doc = VirtualDocument::new();
    let body = doc.body();
    doc.append_element(body, "h1", &[]);
    doc.append_element(
        body,
        STEP_TAG,
        &[(MARKER_ATTRIBUTE, ""), (PATH_ATTRIBUTE, "1.png=>2.png")],
    );
    doc.append_element(body, "p", &[]);
    doc
}

#[test]
fn test_expanded_markup() {
    let mut doc = page();
    let expander = StepExpander::new(StepConfig::default());
    let outcome = expander.init(&mut doc, &InitGuard::new());

    assert_eq!(
        outcome,
        InitOutcome::Parsed(ParseSummary { replaced: 1, removed: 0 })
    );

    let body = doc.outer_html(doc.body());
    assert_eq!(
        body,
        concat!(
            "<body><h1></h1>",
            "<div class=\"mk-step-container\">",
            "<img src=\"1.png\" alt=\"Step 1\" class=\"mk-step-img\">",
            "<span class=\"mk-step-arrow\">→</span>",
            "<img src=\"2.png\" alt=\"Step 2\" class=\"mk-step-img\">",
            "</div>",
            "<p></p></body>"
        )
    );
}

#[test]
fn test_dynamic_tags_after_init() {
    let mut doc = page();
    let expander = StepExpander::new(StepConfig::default());
    expander.init(&mut doc, &InitGuard::new());

    let body = doc.body();
    doc.append_element(
        body,
        STEP_TAG,
        &[(MARKER_ATTRIBUTE, ""), (PATH_ATTRIBUTE, "a=>b=>c")],
    );

    let summary = expander.parse_all_tags(&mut doc);
    assert_eq!(summary.replaced, 1);
    assert!(expander.parse_all_tags(&mut doc).is_noop());
}

#[test]
fn test_offline_remote_bootstrap_degrades_to_local() {
    let mut doc = VirtualDocument::loading();
    let root = doc.document_element();
    doc.set_attribute(root, REMOTE_SCRIPT_ATTRIBUTE, "https://cdn.example.com/step.js");
    let body = doc.body();
    doc.append_element(
        body,
        STEP_TAG,
        &[(MARKER_ATTRIBUTE, ""), (PATH_ATTRIBUTE, "missing.png")],
    );

    let overrides = StepConfigOverrides::default().with_container_class("steps");
    let expander = StepExpander::new(StepConfig::from_overrides(&overrides).unwrap());
    assert_eq!(expander.init(&mut doc, &InitGuard::new()), InitOutcome::Deferred);

    doc.finish_loading();
    assert_eq!(expander.phase(), ExpanderPhase::RemoteScriptRequested);

    let head_children = doc.element_children(doc.head());
    let script = *head_children.last().unwrap();
    assert_eq!(doc.tag_name(script), Some("script"));
    doc.dispatch(script, DomEvent::Error);
    assert_eq!(expander.phase(), ExpanderPhase::RemoteScriptFailed);

    let container = doc.element_children(doc.body())[0];
    assert_eq!(doc.get_attribute(container, "class").as_deref(), Some("steps"));

    let img = doc.element_children(container)[0];
    doc.dispatch(img, DomEvent::Error);
    assert_eq!(doc.get_attribute(img, "src").as_deref(), Some(placeholder_data_uri()));
}
