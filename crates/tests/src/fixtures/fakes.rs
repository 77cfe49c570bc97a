use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use translay_sync::{
    ChannelError, HostChannel, HostRequest, HostResponse, RenderSink, Segment, SourceError,
    TranscriptSource, TranscriptUpdate,
};

/// Host channel fed from a queue of scripted replies. An empty queue
/// answers with a bare success, so probes pass by default.
pub struct FakeHostChannel {
    replies: Mutex<VecDeque<Result<HostResponse, ChannelError>>>,
    requests: Mutex<Vec<HostRequest>>,
}

impl FakeHostChannel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: HostResponse) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: ChannelError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HostRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostChannel for FakeHostChannel {
    async fn request(&self, request: HostRequest) -> Result<HostResponse, ChannelError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HostResponse::ok(None)))
    }
}

/// Transcript source fed from a queue of scripted batches. An empty
/// queue answers with an empty batch.
pub struct ScriptedSource {
    batches: Mutex<VecDeque<Result<Vec<Segment>, SourceError>>>,
    since_args: Mutex<Vec<Option<String>>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            since_args: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn push_batch(&self, batch: Vec<Segment>) {
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_error(&self, error: SourceError) {
        self.batches.lock().unwrap().push_back(Err(error));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// The `since` argument of each fetch, in call order.
    pub fn since_args(&self) -> Vec<Option<String>> {
        self.since_args.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptSource for ScriptedSource {
    async fn fetch_segments(
        &self,
        _meeting_id: &str,
        since: Option<&str>,
    ) -> Result<Vec<Segment>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.since_args
            .lock()
            .unwrap()
            .push(since.map(str::to_string));
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Source whose responses are held back until the test releases them.
/// Used to race an in-flight fetch against a session reset.
pub struct GatedSource {
    gate: Semaphore,
    batch: Mutex<Vec<Segment>>,
}

impl GatedSource {
    pub fn new(batch: Vec<Segment>) -> Self {
        Self {
            gate: Semaphore::new(0),
            batch: Mutex::new(batch),
        }
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl TranscriptSource for GatedSource {
    async fn fetch_segments(
        &self,
        _meeting_id: &str,
        _since: Option<&str>,
    ) -> Result<Vec<Segment>, SourceError> {
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        Ok(self.batch.lock().unwrap().clone())
    }
}

/// Render sink that records every update it receives.
pub struct RecordingSink {
    updates: Mutex<Vec<TranscriptUpdate>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<TranscriptUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

impl RenderSink for RecordingSink {
    fn segments_updated(&self, update: &TranscriptUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

impl Default for FakeHostChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}
