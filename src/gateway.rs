//! Remote store gateway.
//!
//! Translates workspace intents into HTTP requests against the sequence
//! service and normalizes every outcome into either a typed [`Reply`] or a
//! [`GatewayError`] carrying a human-readable message.
//!
//! ## Routes
//!
//! ```text
//! GET    /sequences/                 list
//! POST   /sequences/                 create      {sequence}
//! GET    /sequences/{id}             read
//! PUT    /sequences/{id}             update      {sequence}
//! DELETE /sequences/{id}             delete
//! POST   /sequences/{id}/compress
//! GET    /sequences/{id}/decompress
//! GET    /sequences/{id}/gc
//! GET    /sequences/{id}/freq
//! POST   /sequences/{id}/motif       {pattern, use_regex}
//! ```
//!
//! Each call is a single round trip. Nothing is retried.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::{
    AnalysisKind, AnalysisPayload, MotifQuery, SequenceDetail, SequenceSummary,
};

/// Errors surfaced by a remote call. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// An analysis request, with the parameters its kind requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisCall {
    Compress,
    Decompress,
    Gc,
    Freq,
    Motif(MotifQuery),
}

impl AnalysisCall {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisCall::Compress => AnalysisKind::Compress,
            AnalysisCall::Decompress => AnalysisKind::Decompress,
            AnalysisCall::Gc => AnalysisKind::Gc,
            AnalysisCall::Freq => AnalysisKind::Freq,
            AnalysisCall::Motif(_) => AnalysisKind::Motif,
        }
    }
}

/// One remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create { sequence: String },
    Read { id: String },
    Update { id: String, sequence: String },
    Delete { id: String },
    Analyze { id: String, analysis: AnalysisCall },
}

/// Confirmed outcome of a [`Call`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Listed(Vec<SequenceSummary>),
    Created(CreatedRecord),
    Fetched(SequenceDetail),
    Updated,
    Deleted,
    Analysis(AnalysisPayload),
}

/// Acknowledgement of a create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedRecord {
    pub id: String,
}

#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    items: Option<Vec<SequenceSummary>>,
}

#[derive(Deserialize)]
struct SequenceBody {
    #[serde(default)]
    sequence: Option<String>,
}

/// JavaScript-style truthiness, used to decide whether an error field is usable.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Extracts the primary message (`detail`, then `message`) from an error body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|key| value.get(key))
        .find(|field| is_truthy(field))
        .map(|field| match field {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

/// Builds the error for a non-success response.
pub fn remote_error(status: StatusCode, body: &str) -> GatewayError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    });
    GatewayError::Remote {
        status: status.as_u16(),
        message,
    }
}

/// HTTP client bound to one service base address.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base: String,
}

impl Gateway {
    /// Creates a gateway for `base_url` with the given per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base address, without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Performs one round trip and returns the raw body of a success response.
    async fn round_trip(&self, method: Method, path: &str, body: Option<Value>) -> GatewayResult<String> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            GatewayError::Transport(e.to_string())
        })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = remote_error(status, &text);
            warn!("{} {} -> {}: {}", method, url, status.as_u16(), err);
            return Err(err);
        }
        Ok(text)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> GatewayResult<T> {
        let text = self.round_trip(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub async fn list(&self) -> GatewayResult<Vec<SequenceSummary>> {
        let envelope: ListEnvelope = self.fetch_json(Method::GET, "/sequences/", None).await?;
        Ok(envelope.items.unwrap_or_default())
    }

    pub async fn create(&self, sequence: &str) -> GatewayResult<CreatedRecord> {
        self.fetch_json(Method::POST, "/sequences/", Some(json!({ "sequence": sequence })))
            .await
    }

    pub async fn read(&self, id: &str) -> GatewayResult<SequenceDetail> {
        let body: SequenceBody = self
            .fetch_json(Method::GET, &format!("/sequences/{}", id), None)
            .await?;
        Ok(SequenceDetail {
            id: id.to_string(),
            sequence: body.sequence.unwrap_or_default(),
        })
    }

    pub async fn update(&self, id: &str, sequence: &str) -> GatewayResult<()> {
        self.round_trip(
            Method::PUT,
            &format!("/sequences/{}", id),
            Some(json!({ "sequence": sequence })),
        )
        .await
        .map(|_| ())
    }

    pub async fn delete(&self, id: &str) -> GatewayResult<()> {
        self.round_trip(Method::DELETE, &format!("/sequences/{}", id), None)
            .await
            .map(|_| ())
    }

    pub async fn analyze(&self, id: &str, analysis: &AnalysisCall) -> GatewayResult<AnalysisPayload> {
        let payload = match analysis {
            AnalysisCall::Compress => AnalysisPayload::Compress(
                self.fetch_json(Method::POST, &format!("/sequences/{}/compress", id), None)
                    .await?,
            ),
            AnalysisCall::Decompress => AnalysisPayload::Decompress(
                self.fetch_json(Method::GET, &format!("/sequences/{}/decompress", id), None)
                    .await?,
            ),
            AnalysisCall::Gc => AnalysisPayload::Gc(
                self.fetch_json(Method::GET, &format!("/sequences/{}/gc", id), None)
                    .await?,
            ),
            AnalysisCall::Freq => AnalysisPayload::Freq(
                self.fetch_json(Method::GET, &format!("/sequences/{}/freq", id), None)
                    .await?,
            ),
            AnalysisCall::Motif(query) => AnalysisPayload::Motif(
                self.fetch_json(
                    Method::POST,
                    &format!("/sequences/{}/motif", id),
                    Some(json!({ "pattern": query.pattern, "use_regex": query.use_regex })),
                )
                .await?,
            ),
        };
        Ok(payload)
    }

    /// Executes any [`Call`].
    pub async fn execute(&self, call: Call) -> GatewayResult<Reply> {
        match call {
            Call::List => self.list().await.map(Reply::Listed),
            Call::Create { sequence } => self.create(&sequence).await.map(Reply::Created),
            Call::Read { id } => self.read(&id).await.map(Reply::Fetched),
            Call::Update { id, sequence } => {
                self.update(&id, &sequence).await.map(|_| Reply::Updated)
            }
            Call::Delete { id } => self.delete(&id).await.map(|_| Reply::Deleted),
            Call::Analyze { id, analysis } => self.analyze(&id, &analysis).await.map(Reply::Analysis),
        }
    }
}
