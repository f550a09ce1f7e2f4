//! End-to-end tests over stub collaborators.
//!
//! These tests drive the public API only:
//! 1. Verification ranking over a stubbed search and fetcher
//! 2. Crawl bounds over randomly generated link graphs
//! 3. The research stream as a client would decode it

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use verification::{
    stores::MemoryConversationStore,
    testing::{long_content, MockFetcher, MockHadithLookup, MockSearcher, MockSummarizer},
    ClaimType, ConversationStore, Crawler, CrawlerConfig, EventCollector, EventType, FetchedPage,
    Relevance, ResearchPipeline, ResearchRequest, TraversalProfile, VerificationOrchestrator,
};

const CLAIM: &str = "believes should speak goodness silent";

#[tokio::test]
async fn test_verification_ranks_single_high_match_first() {
    let searcher = MockSearcher::new().with_links(&[
        "https://islamqa.info/answers/1",
        "https://sunnah.com/bukhari:6018",
        "https://islamweb.net/en/article/2",
    ]);
    // 4 of the 5 claim tokens
    let strong = format!(
        "Whoever believes in Allah and the Last Day should speak goodness. {}",
        long_content("speech")
    );
    let fetcher = MockFetcher::new()
        .with_page("https://islamqa.info/answers/1", long_content("trade contracts"))
        .with_page("https://sunnah.com/bukhari:6018", strong)
        .with_page("https://islamweb.net/en/article/2", long_content("fasting"));

    let verifier = VerificationOrchestrator::new(Crawler::new(searcher.clone(), fetcher));
    let response = assert_ok!(
        verifier
            .verify("speak goodness or remain silent", ClaimType::Hadith, CLAIM)
            .await
    );

    let high: Vec<_> = response
        .results
        .iter()
        .filter(|r| r.relevance == Relevance::High)
        .collect();
    assert_eq!(high.len(), 1);
    assert_eq!(response.results[0].relevance, Relevance::High);
    assert_eq!(response.results[0].url, "https://sunnah.com/bukhari:6018");
    assert_eq!(response.results[0].source, "Sunnah.com");
    assert!(response.total_found >= 1);
    assert_eq!(response.query, "speak goodness or remain silent hadith");
    assert_eq!(searcher.calls(), vec![response.query.clone()]);
}

#[tokio::test]
async fn test_verification_input_error() {
    let verifier = VerificationOrchestrator::new(Crawler::new(MockSearcher::new(), MockFetcher::new()));
    let err = assert_err!(verifier.verify("is", ClaimType::General, "is").await);
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_cancel_mid_expansion_stops_dispatch() {
    let cancel = CancellationToken::new();
    let links: Vec<String> = (0..6).map(|n| format!("https://sunnah.com/{n}")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut fetcher = MockFetcher::new()
        .with_delay(std::time::Duration::from_millis(20))
        .cancelling(cancel.clone());
    for link in &links {
        fetcher = fetcher.with_fetched(None, FetchedPage::new(link.clone(), long_content("patience")));
    }
    let crawler = Crawler::new(MockSearcher::new().with_links(&link_refs), fetcher.clone());

    let config = CrawlerConfig::default().with_max_seeds(6).with_max_pages(6).with_concurrency(2);
    let report = crawler.crawl("patience", &config, &cancel).await.unwrap();

    // the two fetches already in flight resolve; nothing new is dispatched
    assert!(report.cancelled);
    assert_eq!(fetcher.calls().len(), 2);
    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_research_stream_decodes_as_client_sees_it() {
    let store = Arc::new(MemoryConversationStore::new());
    let searcher = MockSearcher::new().with_links(&["https://seekersguidance.org/answers/zakat"]);
    let fetcher = MockFetcher::new().with_page(
        "https://seekersguidance.org/answers/zakat",
        long_content("zakat on gold"),
    );
    let pipeline = Arc::new(
        ResearchPipeline::new(
            Crawler::new(searcher, fetcher),
            Arc::new(MockHadithLookup::new()),
            Arc::new(MockSummarizer::new().with_answer("Zakat is due on gold [1].")),
        )
        .with_store(store.clone()),
    );

    let request: ResearchRequest = serde_json::from_str(
        r#"{"question":"Is zakat due on gold jewellery?","profile":"standard","sessionId":"web-1"}"#,
    )
    .unwrap();
    assert_eq!(request.profile, TraversalProfile::Standard);

    let mut rx = pipeline.research(request, CancellationToken::new());
    let mut collector = EventCollector::new();
    while let Some(event) = rx.recv().await {
        let line = format!("data: {}", serde_json::to_string(&event).unwrap());
        collector.push_line(&line);
        // noise between events is skipped
        collector.push_line("data: {not json");
    }

    assert!(collector.is_finished());
    assert_eq!(collector.events().last().map(|e| e.kind), Some(EventType::Done));
    assert_eq!(collector.response_text(), "Zakat is due on gold [1].");
    assert!(collector
        .events()
        .iter()
        .any(|e| e.source.as_ref().is_some_and(|s| s.domain == "seekersguidance.org")));

    for _ in 0..50 {
        if !store.read_by_session("web-1").await.unwrap().is_empty() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("exchange was never archived");
}

/// Random link graph over `n` sunnah.com pages.
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec(proptest::collection::vec(0..n, 0..5), n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_crawl_output_is_bounded_and_unique(
        (n, edges) in graph_strategy(),
        max_depth in 0usize..4,
        max_pages in 1usize..10,
        concurrency in 1usize..5,
    ) {
        let url = |i: usize| format!("https://sunnah.com/page/{i}");
        let mut fetcher = MockFetcher::new();
        for (i, targets) in edges.iter().enumerate() {
            let page = FetchedPage::new(url(i), format!("page {i}"))
                .with_links(targets.iter().map(|&t| url(t)));
            fetcher = fetcher.with_fetched(None, page);
        }
        let seeds: Vec<String> = (0..n.min(3)).map(url).collect();
        let seed_refs: Vec<&str> = seeds.iter().map(String::as_str).collect();
        let crawler = Crawler::new(MockSearcher::new().with_links(&seed_refs), fetcher.clone());
        let config = CrawlerConfig::from_profile(TraversalProfile::Deep)
            .with_max_depth(max_depth)
            .with_max_pages(max_pages)
            .with_concurrency(concurrency);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let report = runtime
            .block_on(crawler.crawl("q", &config, &CancellationToken::new()))
            .unwrap();

        let urls: HashSet<_> = report.pages.iter().map(|p| p.url.clone()).collect();
        prop_assert_eq!(urls.len(), report.pages.len());
        prop_assert!(report.pages.len() <= max_pages);
        prop_assert!(report.pages.iter().all(|p| p.depth <= max_depth));

        let calls = fetcher.calls();
        let distinct: HashSet<_> = calls.iter().collect();
        prop_assert_eq!(distinct.len(), calls.len());
    }
}
