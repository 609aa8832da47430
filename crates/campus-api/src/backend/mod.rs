// REST backend HTTP client
//
// Wraps `reqwest::Client` with URL construction and status mapping for the
// console's document backend. Endpoint groups (activities, images,
// notifications, calendar) are implemented as inherent methods in separate
// files to keep this module focused on transport mechanics.

mod activities;
mod calendar;
mod images;
pub mod models;
mod notifications;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

pub use models::{
    ActivityDoc, CalendarImport, CreateActivityRequest, CreateImageRequest, ImageDoc,
    NotificationDoc, SendNotificationRequest, YearValue,
};

/// Raw HTTP client for the console's document backend.
///
/// Every document carries a backend-assigned `_id`. Non-success statuses
/// are surfaced as [`Error::Backend`] with the server's message.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for the backend rooted at `base_url`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ping the backend. Hosted backends sleep when idle; this wakes them.
    pub async fn wakeup(&self) -> Result<(), Error> {
        let url = self.url("wakeup")?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        check_status(resp).await.map(|_| ())
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{path}`, tolerating a base with or without trailing slash.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.url(&format!("api/{path}"))
    }

    /// `{base}/api/{collection}/{id}` with `id` percent-encoded.
    pub(crate) fn item_url(&self, collection: &str, id: &str) -> Result<Url, Error> {
        let mut url = self.api_url(collection)?;
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .push(id);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        parse_json(check_status(resp).await?).await
    }

    pub(crate) async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_json(check_status(resp).await?).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        debug!("POST (multipart) {}", url);
        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_json(check_status(resp).await?).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        check_status(resp).await.map(|_| ())
    }
}

/// Map non-success statuses to [`Error::Backend`]. Express-style backends
/// answer `{ "message": "..." }` or `{ "error": "..." }`; fall back to the
/// raw body.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(serde_json::Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_owned()
            } else {
                body.clone()
            }
        });

    Err(Error::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Decode a JSON body. An empty body decodes as `null`.
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    let json = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(json).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_handles_trailing_slash() {
        let with = BackendClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://backend.example.edu/").unwrap(),
        );
        let without = BackendClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://backend.example.edu").unwrap(),
        );
        assert_eq!(
            with.api_url("activities").unwrap(),
            without.api_url("activities").unwrap()
        );
        assert_eq!(
            with.api_url("images/42").unwrap().as_str(),
            "https://backend.example.edu/api/images/42"
        );
    }

    #[test]
    fn item_url_escapes_id() {
        let client = BackendClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://backend.example.edu").unwrap(),
        );
        assert_eq!(
            client.item_url("activities", "a1?x=1#f").unwrap().as_str(),
            "https://backend.example.edu/api/activities/a1%3Fx=1%23f"
        );
        assert_eq!(
            client.item_url("images", "../42").unwrap().as_str(),
            "https://backend.example.edu/api/images/..%2F42"
        );
    }
}
