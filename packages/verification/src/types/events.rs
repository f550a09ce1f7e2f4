//! Streaming progress protocol.
//!
//! A research session produces a sequence of [`ResearchStepEvent`]s. The
//! sequence ends at the first terminal event (`done` or `error`); the
//! [`EventSink`] producer wrapper refuses anything after it, and the
//! [`EventCollector`] consumer ignores anything after it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Discriminant of a [`ResearchStepEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StepStart,
    StepContent,
    StepComplete,
    Source,
    CrawlLink,
    ResponseStart,
    ResponseContent,
    Error,
    Done,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::StepStart => "step_start",
            EventType::StepContent => "step_content",
            EventType::StepComplete => "step_complete",
            EventType::Source => "source",
            EventType::CrawlLink => "crawl_link",
            EventType::ResponseStart => "response_start",
            EventType::ResponseContent => "response_content",
            EventType::Error => "error",
            EventType::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Running,
    Complete,
}

/// A named stage of the research pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchStep {
    pub id: String,
    pub title: String,
    pub status: StepStatus,
}

/// A piece of evidence surfaced to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    pub url: String,
    pub title: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlLinkStatus {
    Discovered,
    Fetched,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlLink {
    pub url: String,
    pub depth: usize,
    pub status: CrawlLinkStatus,
}

/// Wire unit of the streaming protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchStepEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<ResearchStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EventSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_link: Option<CrawlLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResearchStepEvent {
    fn bare(kind: EventType) -> Self {
        Self {
            kind,
            step: None,
            content: None,
            source: None,
            crawl_link: None,
            error: None,
        }
    }

    pub fn step_start(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            step: Some(ResearchStep {
                id: id.into(),
                title: title.into(),
                status: StepStatus::Running,
            }),
            ..Self::bare(EventType::StepStart)
        }
    }

    pub fn step_content(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            step: Some(ResearchStep {
                id: id.into(),
                title: String::new(),
                status: StepStatus::Running,
            }),
            content: Some(content.into()),
            ..Self::bare(EventType::StepContent)
        }
    }

    pub fn step_complete(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            step: Some(ResearchStep {
                id: id.into(),
                title: title.into(),
                status: StepStatus::Complete,
            }),
            ..Self::bare(EventType::StepComplete)
        }
    }

    pub fn source(source: EventSource) -> Self {
        Self {
            source: Some(source),
            ..Self::bare(EventType::Source)
        }
    }

    pub fn crawl_link(url: impl Into<String>, depth: usize, status: CrawlLinkStatus) -> Self {
        Self {
            crawl_link: Some(CrawlLink {
                url: url.into(),
                depth,
                status,
            }),
            ..Self::bare(EventType::CrawlLink)
        }
    }

    pub fn response_start() -> Self {
        Self::bare(EventType::ResponseStart)
    }

    pub fn response_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::bare(EventType::ResponseContent)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::bare(EventType::Error)
        }
    }

    pub fn done() -> Self {
        Self::bare(EventType::Done)
    }

    /// `done` and `error` end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventType::Done | EventType::Error)
    }
}

/// Producer side of an event stream.
///
/// Drops everything sent after the first terminal event so `done`/`error`
/// is always the last thing a consumer observes.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<ResearchStepEvent>,
    terminated: bool,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<ResearchStepEvent>) -> Self {
        Self {
            tx,
            terminated: false,
        }
    }

    /// Create a sink and its receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ResearchStepEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    /// Send an event. Returns false once the stream has ended or the
    /// consumer is gone.
    pub async fn send(&mut self, event: ResearchStepEvent) -> bool {
        if self.terminated {
            return false;
        }
        if event.is_terminal() {
            self.terminated = true;
        }
        self.tx.send(event).await.is_ok()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// True when the consumer dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Parse one event from a line of the stream.
///
/// Accepts raw JSON or an SSE `data:` line. Malformed input yields `None`
/// so a single bad event never breaks the stream.
pub fn decode_event(line: &str) -> Option<ResearchStepEvent> {
    let trimmed = line.trim();
    let payload = trimmed
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(trimmed);
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping malformed event");
            None
        }
    }
}

/// Consumer-side accumulator that stops at the first terminal event.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<ResearchStepEvent>,
    finished: bool,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns true if it produced an accepted event.
    pub fn push_line(&mut self, line: &str) -> bool {
        match decode_event(line) {
            Some(event) => self.push(event),
            None => false,
        }
    }

    pub fn push(&mut self, event: ResearchStepEvent) -> bool {
        if self.finished {
            return false;
        }
        self.finished = event.is_terminal();
        self.events.push(event);
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn events(&self) -> &[ResearchStepEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ResearchStepEvent> {
        self.events
    }

    /// Concatenated `response_content` payloads.
    pub fn response_text(&self) -> String {
        self.events
            .iter()
            .filter(|e| e.kind == EventType::ResponseContent)
            .filter_map(|e| e.content.as_deref())
            .collect()
    }
}
