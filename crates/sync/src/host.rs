use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChannelError, SourceError};
use crate::ingest;
use crate::segment::Segment;

/// A request over the extension messaging channel to the background
/// host. Tagged the way the host dispatches on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostRequest {
    /// Liveness probe.
    Ping,
    /// Delegated transcript fetch; the host owns the gateway REST call.
    GetTranscript {
        meeting_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        since: Option<String>,
    },
    /// Translation language change for the meeting's bot.
    UpdateBotConfig { meeting_id: String, language: String },
}

/// The host's reply envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HostResponse {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Request/response primitive to the extension host. The channel can
/// disappear mid-call (host reloaded, page backgrounded); that surfaces
/// as [`ChannelError`] and is terminal until re-probed.
#[async_trait]
pub trait HostChannel: Send + Sync {
    async fn request(&self, request: HostRequest) -> Result<HostResponse, ChannelError>;
}

/// Pull interface to the remote transcript source.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetches segments newer than `since` (all of them when `None`).
    /// The returned batch is already normalized and may be empty.
    async fn fetch_segments(
        &self,
        meeting_id: &str,
        since: Option<&str>,
    ) -> Result<Vec<Segment>, SourceError>;
}

/// Transcript source that delegates fetching through the host channel,
/// normalizing whatever payload shape comes back.
pub struct ChannelTranscriptSource {
    channel: Arc<dyn HostChannel>,
}

impl ChannelTranscriptSource {
    pub fn new(channel: Arc<dyn HostChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl TranscriptSource for ChannelTranscriptSource {
    async fn fetch_segments(
        &self,
        meeting_id: &str,
        since: Option<&str>,
    ) -> Result<Vec<Segment>, SourceError> {
        let request = HostRequest::GetTranscript {
            meeting_id: meeting_id.to_string(),
            since: since.map(str::to_string),
        };
        let response = self.channel.request(request).await?;

        if !response.success {
            return Err(SourceError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "unspecified host error".to_string()),
            ));
        }

        Ok(response
            .data
            .as_ref()
            .map(ingest::normalize_payload)
            .unwrap_or_default())
    }
}
