use std::sync::Arc;

use tokio::time::{sleep, Duration};
use translay_sync::{
    ChannelError, HostRequest, MeetingId, SourceError, SyncConfig, SyncEngine, SyncError,
};

use crate::fixtures::fakes::{FakeHostChannel, RecordingSink, ScriptedSource};
use crate::fixtures::seg;

const MEETING: &str = "abc-defg-hij";

struct TestEngine {
    engine: Arc<SyncEngine>,
    channel: Arc<FakeHostChannel>,
    source: Arc<ScriptedSource>,
    sink: Arc<RecordingSink>,
}

fn spawn_engine() -> TestEngine {
    let channel = Arc::new(FakeHostChannel::new());
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::new());
    let engine = SyncEngine::with_source(
        channel.clone(),
        source.clone(),
        sink.clone(),
        SyncConfig::default(),
    );
    TestEngine {
        engine,
        channel,
        source,
        sink,
    }
}

/// Lets the worker task and any spawned fetch run to completion.
async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn start_sync_fetches_immediately_and_feeds_sink() {
    let t = spawn_engine();
    t.source.push_batch(vec![seg("a", 10.0, "hi")]);

    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    settle().await;

    assert_eq!(t.engine.active_session_count(), 1);
    assert_eq!(t.sink.update_count(), 1);
    assert_eq!(t.sink.updates()[0].meeting_id, MEETING);
}

#[tokio::test(start_paused = true)]
async fn restart_of_known_meeting_resumes_with_history() {
    let t = spawn_engine();
    t.source.push_batch(vec![seg("a", 10.0, "hi")]);

    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    settle().await;
    t.engine.stop_sync(MEETING).await;

    t.source
        .push_batch(vec![seg("a", 10.0, "hi"), seg("b", 12.0, "there")]);
    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    settle().await;

    assert_eq!(t.engine.active_session_count(), 1);
    let worker = t.engine.worker(MEETING).unwrap();
    let snapshot = worker.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    // "a" survived the pause and was deduplicated, not re-added.
    let last = t.sink.updates().pop().unwrap();
    assert_eq!(last.newly_added.len(), 1);
    assert_eq!(last.newly_added[0].id.as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn language_change_updates_bot_and_clears_history() {
    let t = spawn_engine();
    t.source.push_batch(vec![seg("a", 10.0, "bonjour")]);

    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    settle().await;
    let worker = t.engine.worker(MEETING).unwrap();
    assert_eq!(worker.snapshot().await.len(), 1);

    t.engine.change_language(MEETING, "fr").await.unwrap();
    assert!(worker.snapshot().await.is_empty());

    let sent_update = t.channel.requests().iter().any(|r| {
        matches!(
            r,
            HostRequest::UpdateBotConfig { meeting_id, language }
                if meeting_id == MEETING && language == "fr"
        )
    });
    assert!(sent_update);

    // Previously seen identities come back in: history was cleared.
    t.source.push_batch(vec![seg("a", 10.0, "bonjour")]);
    worker.fetch_once().await;
    assert_eq!(worker.snapshot().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_language_update_still_clears_history() {
    let t = spawn_engine();
    t.source.push_batch(vec![seg("a", 10.0, "hi")]);

    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    settle().await;
    let worker = t.engine.worker(MEETING).unwrap();
    assert_eq!(worker.snapshot().await.len(), 1);

    t.channel
        .push_error(ChannelError::Disconnected("host gone".to_string()));
    let err = t.engine.change_language(MEETING, "de").await.unwrap_err();
    assert!(matches!(err, SyncError::Channel(_)));

    assert!(worker.snapshot().await.is_empty());
    assert!(!worker.is_polling().await);
    assert!(!worker.supervisor().is_alive().await);
}

#[tokio::test(start_paused = true)]
async fn change_language_for_unknown_meeting_fails() {
    let t = spawn_engine();
    let err = t
        .engine
        .change_language("zzz-zzzz-zzz", "fr")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::UnknownSession(_)));
}

#[tokio::test(start_paused = true)]
async fn visibility_recovery_resumes_without_losing_transcript() {
    let t = spawn_engine();
    t.source.push_batch(vec![seg("a", 10.0, "hi")]);

    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    settle().await;
    let worker = t.engine.worker(MEETING).unwrap();
    assert_eq!(worker.snapshot().await.len(), 1);

    // Next fetch hits a dead channel and pauses the session.
    t.source.push_error(SourceError::Channel(ChannelError::NoResponse));
    worker.fetch_once().await;
    assert!(!worker.supervisor().is_alive().await);
    assert!(!worker.is_polling().await);

    // Tab becomes visible, the ping probe succeeds, polling resumes
    // and the already-displayed transcript is still there.
    t.source
        .push_batch(vec![seg("a", 10.0, "hi"), seg("b", 12.0, "there")]);
    t.engine.host_visible().await;
    settle().await;

    assert!(worker.supervisor().is_alive().await);
    assert!(worker.is_polling().await);
    assert_eq!(worker.snapshot().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn end_session_drops_worker_and_state() {
    let t = spawn_engine();
    t.engine.start_sync(MeetingId::new(MEETING), None).await;
    t.engine
        .start_sync(MeetingId::new("xyz-wxyz-uvw"), Some("es".to_string()))
        .await;
    settle().await;
    assert_eq!(t.engine.active_session_count(), 2);

    t.engine.end_session(MEETING);
    assert_eq!(t.engine.active_session_count(), 1);
    assert!(t.engine.worker(MEETING).is_none());

    t.engine.end_all();
    assert_eq!(t.engine.active_session_count(), 0);
}
