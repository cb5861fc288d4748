use std::sync::Arc;

use step_sdk::prelude::*;

#[tokio::test]
async fn test_page_and_worker_through_prelude() {
    let mut doc = VirtualDocument::new();
    let body = doc.body();
    doc.append_element(body, STEP_TAG, &[(MARKER_ATTRIBUTE, ""), (PATH_ATTRIBUTE, "a.png=>b.png")]);

    let expander = StepExpander::new(StepConfig::default());
    let outcome = expander.init(&mut doc, &InitGuard::new());
    assert_eq!(outcome, InitOutcome::Parsed(ParseSummary { replaced: 1, removed: 0 }));
    assert!(doc.to_html().contains("<span class=\"mk-step-arrow\">→</span>"));

    let fetcher = Arc::new(StaticFetcher::new().with_route("http://localhost/step-parser.js", "js"));
    let config = WorkerConfig::default().with_manifest(["/step-parser.js"]);
    let worker = AssetCacheWorker::new(
        config,
        Arc::new(InMemoryCacheStore::new()),
        fetcher,
        Arc::new(InMemoryScope::new()),
    )
    .unwrap();

    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    let response = worker
        .respond(&AssetRequest::get("http://localhost/step-parser.js").unwrap())
        .await
        .unwrap();
    assert_eq!(response.body(), b"js");
}
