//! Streaming research pipeline.
//!
//! Answers a free-form question from trusted sources and reports every stage
//! as a [`ResearchStepEvent`]:
//!
//! ```text
//! analyze -> [lookup] -> crawl -> response -> done
//! ```
//!
//! `lookup` only runs when the question cites hadith by number. A failed
//! search ends the stream with `error`. The finished exchange is archived on a
//! detached task so a slow store never delays `done`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::{detect_evidence_types, find_hadith_references, is_personal_question};
use crate::crawler::{CrawlProgress, Crawler};
use crate::hadith::{HadithLookup, HadithRecord};
use crate::registry::host_of;
use crate::relevance::{extract_snippet, relevance_ratio};
use crate::summarizers::{format_evidence_block, ExtractiveSummarizer, EVIDENCE_SEPARATOR};
use crate::traits::{
    conversation::{ConversationRecord, ConversationStore},
    fetcher::PageFetcher,
    searcher::WebSearcher,
    summarizer::Summarizer,
};
use crate::types::config::{CrawlerConfig, TraversalProfile};
use crate::types::events::{CrawlLinkStatus, EventSink, EventSource, ResearchStepEvent};
use crate::types::page::CrawledPage;
use crate::verify::MIN_QUERY_CHARS;

/// Buffer of the event channel returned by [`ResearchPipeline::research`].
pub const EVENT_BUFFER: usize = 64;

/// Most evidence blocks handed to the summarizer.
const MAX_EVIDENCE_BLOCKS: usize = 12;

const PERSONAL_NOTE: &str = "This question concerns personal circumstances. \
Please consult a qualified scholar who can consider your situation in full.";

/// A research request as received over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub profile: TraversalProfile,
    /// Groups archived exchanges; generated when absent
    #[serde(default)]
    pub session_id: Option<String>,
}

/// One piece of gathered evidence.
#[derive(Debug, Clone)]
struct Evidence {
    title: String,
    url: String,
    text: String,
}

impl From<&HadithRecord> for Evidence {
    fn from(record: &HadithRecord) -> Self {
        Self {
            title: record.title(),
            url: record.url.clone(),
            text: record.text.clone(),
        }
    }
}

impl From<&CrawledPage> for Evidence {
    fn from(page: &CrawledPage) -> Self {
        Self {
            title: page.title.clone(),
            url: page.url.clone(),
            text: page.content.clone(),
        }
    }
}

fn source_event(title: &str, url: &str, text: &str, question: &str) -> EventSource {
    EventSource {
        url: url.to_string(),
        title: title.to_string(),
        domain: host_of(url).unwrap_or_default(),
        snippet: Some(extract_snippet(text, question)),
    }
}

/// Question-answering pipeline over the trusted corpus.
pub struct ResearchPipeline<S, F> {
    crawler: Crawler<S, F>,
    hadith: Arc<dyn HadithLookup>,
    summarizer: Arc<dyn Summarizer>,
    store: Option<Arc<dyn ConversationStore>>,
    concurrency: usize,
}

impl<S, F> ResearchPipeline<S, F>
where
    S: WebSearcher + 'static,
    F: PageFetcher + 'static,
{
    pub fn new(
        crawler: Crawler<S, F>,
        hadith: Arc<dyn HadithLookup>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            crawler,
            hadith,
            summarizer,
            store: None,
            concurrency: CrawlerConfig::default().concurrency,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn crawler(&self) -> &Crawler<S, F> {
        &self.crawler
    }

    /// Run a session on a background task and return its event stream.
    ///
    /// Cancelling `cancel` or dropping the receiver stops the crawl.
    pub fn research(
        self: &Arc<Self>,
        request: ResearchRequest,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<ResearchStepEvent> {
        let (mut sink, rx) = EventSink::channel(EVENT_BUFFER);
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let session_id = request
                .session_id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            pipeline
                .run(&request.question, request.profile, &session_id, &cancel, &mut sink)
                .await;
        });
        rx
    }

    /// Run a session, writing events to `sink`.
    pub async fn run(
        &self,
        question: &str,
        profile: TraversalProfile,
        session_id: &str,
        cancel: &CancellationToken,
        sink: &mut EventSink,
    ) {
        let question = question.trim();
        if question.chars().count() < MIN_QUERY_CHARS {
            sink.send(ResearchStepEvent::error(format!(
                "Question must be at least {MIN_QUERY_CHARS} characters"
            )))
            .await;
            return;
        }

        info!(question = %question, profile = %profile, session_id = %session_id, "Research started");

        // analyze
        let personal = is_personal_question(question);
        let types = detect_evidence_types(question);
        let sought = if types.is_empty() {
            "any".to_string()
        } else {
            types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
        };
        let mut analysis = format!("Evidence sought: {sought}.");
        if personal {
            analysis.push_str(" The question concerns personal circumstances.");
        }
        sink.send(ResearchStepEvent::step_start("analyze", "Analyzing question")).await;
        sink.send(ResearchStepEvent::step_content("analyze", analysis)).await;
        sink.send(ResearchStepEvent::step_complete("analyze", "Analyzing question")).await;

        let mut evidence: Vec<Evidence> = Vec::new();
        let mut sources: Vec<EventSource> = Vec::new();

        // lookup
        let references = find_hadith_references(question);
        if !references.is_empty() {
            sink.send(ResearchStepEvent::step_start("lookup", "Looking up cited hadith")).await;
            for (collection, number) in references {
                if cancel.is_cancelled() {
                    break;
                }
                let Some(record) = self.hadith.lookup(&collection, number).await else {
                    debug!(collection = %collection, number, "Cited hadith not found");
                    continue;
                };
                let source = source_event(&record.title(), &record.url, &record.text, question);
                sink.send(ResearchStepEvent::source(source.clone())).await;
                sources.push(source);
                evidence.push(Evidence::from(&record));
            }
            sink.send(ResearchStepEvent::step_complete("lookup", "Looking up cited hadith")).await;
        }

        // crawl
        sink.send(ResearchStepEvent::step_start("crawl", "Searching trusted sources")).await;
        let config = CrawlerConfig::from_profile(profile)
            .with_concurrency(self.concurrency)
            .with_trusted_only(true);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let crawl = self.crawler.crawl_with_progress(question, &config, cancel, Some(tx));
        let forward = async {
            let mut rx = rx;
            let mut forwarded = Vec::new();
            while let Some(progress) = rx.recv().await {
                let delivered = match progress {
                    CrawlProgress::Discovered { url, depth } => {
                        sink.send(ResearchStepEvent::crawl_link(url, depth, CrawlLinkStatus::Discovered))
                            .await
                    }
                    CrawlProgress::Fetched { page } => {
                        let source = source_event(&page.title, &page.url, &page.content, question);
                        let ok = sink
                            .send(ResearchStepEvent::crawl_link(
                                page.url.clone(),
                                page.depth,
                                CrawlLinkStatus::Fetched,
                            ))
                            .await
                            && sink.send(ResearchStepEvent::source(source.clone())).await;
                        forwarded.push(source);
                        ok
                    }
                    CrawlProgress::Skipped { url, depth, .. } => {
                        sink.send(ResearchStepEvent::crawl_link(url, depth, CrawlLinkStatus::Skipped))
                            .await
                    }
                };
                // a gone consumer drops rx, which cancels the crawl
                if !delivered {
                    break;
                }
            }
            forwarded
        };
        let (report, forwarded) = tokio::join!(crawl, forward);
        sources.extend(forwarded);

        let report = match report {
            Ok(report) => report,
            Err(e) => {
                sink.send(ResearchStepEvent::error(format!("Search failed: {e}"))).await;
                return;
            }
        };
        if report.cancelled || cancel.is_cancelled() {
            info!(session_id = %session_id, "Research cancelled");
            sink.send(ResearchStepEvent::error("Research cancelled")).await;
            return;
        }
        sink.send(ResearchStepEvent::step_complete("crawl", "Searching trusted sources")).await;

        // respond
        let mut pages: Vec<(f64, &CrawledPage)> = report
            .pages
            .iter()
            .map(|p| (relevance_ratio(question, &p.content, &p.title), p))
            .collect();
        pages.sort_by(|a, b| b.0.total_cmp(&a.0));
        evidence.extend(pages.into_iter().map(|(_, p)| Evidence::from(p)));
        evidence.truncate(MAX_EVIDENCE_BLOCKS);

        let evidence_text = evidence
            .iter()
            .enumerate()
            .map(|(i, e)| format_evidence_block(i + 1, &e.title, &e.url, &e.text))
            .collect::<Vec<_>>()
            .join(EVIDENCE_SEPARATOR);

        sink.send(ResearchStepEvent::response_start()).await;
        let mut answer = match self.summarizer.summarize(question, &evidence_text).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(summarizer = self.summarizer.name(), error = %e, "Summarizer failed, quoting evidence instead");
                ExtractiveSummarizer::new()
                    .summarize(question, &evidence_text)
                    .await
                    .unwrap_or_default()
            }
        };
        if personal {
            answer.push_str("\n\n");
            answer.push_str(PERSONAL_NOTE);
        }
        sink.send(ResearchStepEvent::response_content(answer.clone())).await;
        sink.send(ResearchStepEvent::done()).await;

        info!(
            session_id = %session_id,
            sources = sources.len(),
            evidence = evidence.len(),
            "Research completed"
        );

        if let Some(store) = &self.store {
            let store = Arc::clone(store);
            let record = ConversationRecord::new(session_id, question, answer).with_sources(sources);
            tokio::spawn(async move {
                if let Err(e) = store.append(record).await {
                    warn!(error = %e, "Failed to archive conversation");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryConversationStore;
    use crate::testing::{long_content, MockFetcher, MockHadithLookup, MockSearcher, MockSummarizer};
    use crate::types::events::EventType;
    use std::time::Duration;

    fn pipeline(
        searcher: MockSearcher,
        fetcher: MockFetcher,
        summarizer: MockSummarizer,
    ) -> ResearchPipeline<MockSearcher, MockFetcher> {
        ResearchPipeline::new(
            Crawler::new(searcher, fetcher),
            Arc::new(MockHadithLookup::new()),
            Arc::new(summarizer),
        )
    }

    async fn run_to_end(
        pipeline: &ResearchPipeline<MockSearcher, MockFetcher>,
        question: &str,
    ) -> Vec<ResearchStepEvent> {
        let (mut sink, mut rx) = EventSink::channel(256);
        pipeline
            .run(question, TraversalProfile::Quick, "s1", &CancellationToken::new(), &mut sink)
            .await;
        drop(sink);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn kinds(events: &[ResearchStepEvent]) -> Vec<EventType> {
        events.iter().map(|e| e.kind).collect()
    }

    #[tokio::test]
    async fn test_short_question_emits_single_error() {
        let p = pipeline(MockSearcher::new(), MockFetcher::new(), MockSummarizer::new());
        let events = run_to_end(&p, "hi").await;
        assert_eq!(kinds(&events), vec![EventType::Error]);
    }

    #[tokio::test]
    async fn test_cancelled_session_never_searches() {
        let searcher = MockSearcher::new().with_links(&["https://islamqa.info/patience"]);
        let p = pipeline(searcher.clone(), MockFetcher::new(), MockSummarizer::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (mut sink, mut rx) = EventSink::channel(64);
        p.run("What is the reward of patience?", TraversalProfile::Quick, "s1", &cancel, &mut sink)
            .await;
        drop(sink);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(searcher.calls().is_empty());
        assert_eq!(kinds(&events).last(), Some(&EventType::Error));
        assert!(!kinds(&events).contains(&EventType::ResponseStart));
    }

    #[tokio::test]
    async fn test_full_stream_order() {
        let searcher = MockSearcher::new().with_links(&["https://islamqa.info/patience"]);
        let fetcher = MockFetcher::new().with_page("https://islamqa.info/patience", long_content("patience"));
        let summarizer = MockSummarizer::new().with_answer("Be patient [1].");
        let p = pipeline(searcher, fetcher, summarizer.clone());

        let events = run_to_end(&p, "What does the Quran say about patience?").await;
        let kinds = kinds(&events);

        assert_eq!(kinds.first(), Some(&EventType::StepStart));
        assert_eq!(kinds.last(), Some(&EventType::Done));
        assert!(!kinds.contains(&EventType::Error));
        let response_at = kinds.iter().position(|k| *k == EventType::ResponseStart).unwrap();
        let source_at = kinds.iter().position(|k| *k == EventType::Source).unwrap();
        assert!(source_at < response_at);
        assert!(kinds.contains(&EventType::CrawlLink));
        assert_eq!(
            events[response_at + 1].content.as_deref(),
            Some("Be patient [1].")
        );

        let calls = summarizer.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("https://islamqa.info/patience"));
    }

    #[tokio::test]
    async fn test_search_failure_ends_with_error() {
        let summarizer = MockSummarizer::new();
        let p = pipeline(MockSearcher::new().failing(500), MockFetcher::new(), summarizer.clone());
        let events = run_to_end(&p, "ruling on music").await;

        assert_eq!(kinds(&events).last(), Some(&EventType::Error));
        assert!(!kinds(&events).contains(&EventType::Done));
        assert!(summarizer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cited_hadith_is_looked_up() {
        let record = HadithRecord {
            collection: "bukhari".into(),
            number: 1,
            text: "Actions are judged by intentions".into(),
            grades: vec![],
            url: "https://sunnah.com/bukhari:1".into(),
        };
        let p = ResearchPipeline::new(
            Crawler::new(MockSearcher::new(), MockFetcher::new()),
            Arc::new(MockHadithLookup::new().with_record(record)),
            Arc::new(MockSummarizer::new()),
        );

        let events = run_to_end(&p, "Is Bukhari 1 authentic?").await;
        let lookup_source = events
            .iter()
            .find(|e| e.kind == EventType::Source)
            .and_then(|e| e.source.clone())
            .unwrap();
        assert_eq!(lookup_source.url, "https://sunnah.com/bukhari:1");
        assert_eq!(lookup_source.title, "Sahih al-Bukhari 1");
        assert!(events
            .iter()
            .any(|e| e.step.as_ref().is_some_and(|s| s.id == "lookup")));
    }

    #[tokio::test]
    async fn test_personal_question_gets_note_and_summarizer_fallback() {
        let searcher = MockSearcher::new().with_links(&["https://islamqa.info/zakat"]);
        let fetcher = MockFetcher::new().with_page("https://islamqa.info/zakat", long_content("zakat on savings"));
        let p = pipeline(searcher, fetcher, MockSummarizer::new().failing());

        let events = run_to_end(&p, "Should I pay zakat on my savings?").await;
        let answer = events
            .iter()
            .find(|e| e.kind == EventType::ResponseContent)
            .and_then(|e| e.content.clone())
            .unwrap();
        assert!(answer.contains("[1]"));
        assert!(answer.ends_with(PERSONAL_NOTE));
        assert_eq!(kinds(&events).last(), Some(&EventType::Done));
    }

    #[tokio::test]
    async fn test_exchange_is_archived() {
        let store = Arc::new(MemoryConversationStore::new());
        let searcher = MockSearcher::new().with_links(&["https://islamqa.info/a"]);
        let fetcher = MockFetcher::new().with_page("https://islamqa.info/a", long_content("fasting"));
        let p = pipeline(searcher, fetcher, MockSummarizer::new().with_answer("answer"))
            .with_store(store.clone());

        run_to_end(&p, "Rules of fasting while travelling").await;

        // archiving is detached from the stream
        let mut archived = Vec::new();
        for _ in 0..50 {
            archived = store.read_by_session("s1").await.unwrap();
            if !archived.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].answer, "answer");
        assert_eq!(archived[0].sources.len(), 1);
    }

    #[tokio::test]
    async fn test_research_task_streams_until_done() {
        let searcher = MockSearcher::new().with_links(&["https://islamqa.info/a"]);
        let fetcher = MockFetcher::new().with_page("https://islamqa.info/a", long_content("charity"));
        let p = Arc::new(pipeline(searcher, fetcher, MockSummarizer::new()));

        let request = ResearchRequest {
            question: "virtues of charity".into(),
            profile: TraversalProfile::Quick,
            session_id: None,
        };
        let mut rx = p.research(request, CancellationToken::new());
        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event.kind);
        }
        assert_eq!(last, Some(EventType::Done));
    }
}
