//! Firebase Realtime Database client.
//!
//! Speaks the database's REST protocol:
//!
//! - writes are `PUT {db}/{path}.json`, replacing the node;
//! - subscriptions are `GET {db}/{path}.json` with
//!   `Accept: text/event-stream`. The server sends `put` and `patch`
//!   events carrying `{ "path": ..., "data": ... }` relative to the
//!   subscribed node, periodic `keep-alive` events, and `cancel` /
//!   `auth_revoked` when access is withdrawn.
//!
//! Each subscription mirrors its subtree locally and emits the full
//! subtree after every `put` / `patch`.

use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use super::sse::{SseDecoder, SseEvent};
use super::{RealtimeStore, Subscription, SubscriptionEvent, parse_group_snapshot, tree};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Client for one Firebase Realtime Database instance.
#[derive(Clone)]
pub struct FirebaseClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    base_url: Url,
    auth: Option<SecretString>,
}

impl FirebaseClient {
    /// Create a client for the database at `base_url`
    /// (e.g. `https://my-db-default-rtdb.firebaseio.com`).
    ///
    /// `auth` is appended as the `auth` query parameter when present
    /// (database secret or ID token).
    pub fn new(
        base_url: Url,
        auth: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            stream_http: transport.build_streaming_client()?,
            base_url: normalize_base(base_url),
            auth,
        })
    }

    /// Create a client with pre-built `reqwest::Client`s.
    pub fn with_clients(
        http: reqwest::Client,
        stream_http: reqwest::Client,
        base_url: Url,
        auth: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            stream_http,
            base_url: normalize_base(base_url),
            auth,
        }
    }

    /// The database root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// REST URL of the node at `path`: `{base}/{path}.json[?auth=...]`.
    ///
    /// Each `/`-separated segment is percent-encoded, so a key can never
    /// escape the path.
    pub fn node_url(&self, path: &str) -> Result<Url, Error> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let leaf = format!("{}.json", segments.pop().unwrap_or_default());

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(segments)
            .push(&leaf);
        if let Some(ref secret) = self.auth {
            url.query_pairs_mut()
                .append_pair("auth", secret.expose_secret());
        }
        Ok(url)
    }
}

impl RealtimeStore for FirebaseClient {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        match self.node_url(path) {
            Ok(url) => {
                let http = self.stream_http.clone();
                let path = path.to_owned();
                let task_cancel = cancel.clone();
                tokio::spawn(async move {
                    stream_task(http, url, path, tx, task_cancel).await;
                });
            }
            Err(e) => {
                let _ = tx.send(SubscriptionEvent::Error(e));
            }
        }

        Subscription::new(path, rx, cancel)
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), Error> {
        let url = self.node_url(path)?;
        debug!(path, "PUT realtime node");

        let resp = self
            .http
            .put(url)
            .json(&value)
            .send()
            .await
            .map_err(Error::Transport)?;

        check_status(resp, path).await.map(|_| ())
    }
}

// ── Stream lifecycle ─────────────────────────────────────────────────

/// Payload of `put` / `patch` events.
#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    data: Value,
}

/// Run one subscription until it fails or is cancelled. Delivers exactly
/// one terminal `Error` unless the consumer went away first.
async fn stream_task(
    http: reqwest::Client,
    url: Url,
    path: String,
    tx: mpsc::UnboundedSender<SubscriptionEvent>,
    cancel: CancellationToken,
) {
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(path = %path, "realtime subscription cancelled");
            return;
        }
        result = read_stream(&http, url, &path, &tx) => result,
    };

    if tx.is_closed() {
        return;
    }

    let err = match result {
        Ok(()) => Error::StreamClosed { path: path.clone() },
        Err(e) => e,
    };
    warn!(path = %path, error = %err, "realtime subscription failed");
    let _ = tx.send(SubscriptionEvent::Error(err));
}

async fn read_stream(
    http: &reqwest::Client,
    url: Url,
    path: &str,
    tx: &mpsc::UnboundedSender<SubscriptionEvent>,
) -> Result<(), Error> {
    info!(path, "opening realtime stream");

    let resp = http
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(Error::Transport)?;
    let resp = check_status(resp, path).await?;

    let mut mirror = Value::Null;
    let events = sse_events(resp);
    futures_util::pin_mut!(events);

    while let Some(event) = events.next().await {
        let event = event?;
        match event.event.as_str() {
            "put" | "patch" => {
                let payload: StreamPayload =
                    serde_json::from_str(&event.data).map_err(|e| Error::Deserialization {
                        message: format!("invalid {} payload: {e}", event.event),
                        body: event.data.clone(),
                    })?;
                if event.event == "put" {
                    tree::put(&mut mirror, &payload.path, payload.data);
                } else {
                    tree::patch(&mut mirror, &payload.path, payload.data);
                }
                trace!(path, relative = %payload.path, "applied {}", event.event);
                if tx
                    .send(SubscriptionEvent::Snapshot(parse_group_snapshot(&mirror)))
                    .is_err()
                {
                    return Ok(());
                }
            }
            "keep-alive" => trace!(path, "realtime keep-alive"),
            "cancel" => {
                return Err(Error::SubscriptionCancelled {
                    path: path.to_owned(),
                    reason: non_null_or(&event.data, "cancelled by server"),
                });
            }
            "auth_revoked" => {
                return Err(Error::PermissionDenied {
                    path: path.to_owned(),
                    message: non_null_or(&event.data, "credential revoked"),
                });
            }
            other => debug!(path, event = other, "ignoring realtime event"),
        }
    }

    Ok(())
}

/// Decode a response body into server-sent events.
fn sse_events(resp: reqwest::Response) -> impl Stream<Item = Result<SseEvent, Error>> {
    async_stream::try_stream! {
        let mut decoder = SseDecoder::default();
        let mut body = resp.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(Error::Transport)?;
            for event in decoder.feed(&chunk) {
                yield event;
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Map error statuses to typed errors. Firebase error bodies are
/// `{ "error": "..." }`.
async fn check_status(resp: reqwest::Response, path: &str) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}: {}", truncate(&body, 200)));

    if matches!(
        status,
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
    ) {
        return Err(Error::PermissionDenied {
            path: path.to_owned(),
            message,
        });
    }

    Err(Error::Realtime {
        path: path.to_owned(),
        message,
    })
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn non_null_or(data: &str, fallback: &str) -> String {
    let trimmed = data.trim();
    if trimmed.is_empty() || trimmed == "null" {
        fallback.to_owned()
    } else {
        trimmed.trim_matches('"').to_owned()
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
