//! Shared reqwest plumbing for the marketplace backend.
//!
//! Owns the base URL, request timeout and the helpers every backend adapter
//! needs: endpoint joining, bearer headers and condensing error bodies.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::dto::ErrorEnvelopeDto;
use crate::domain::SessionToken;

const USER_AGENT: &str = concat!("agrotrace-client/", env!("CARGO_PKG_VERSION"));

/// Raw response: status plus the fully buffered body.
pub(super) struct BackendResponse {
    pub(super) status: StatusCode,
    pub(super) body: Vec<u8>,
}

/// Failure to reach the backend at all.
pub(super) struct TransportFailure {
    pub(super) timed_out: bool,
    pub(super) message: String,
}

/// Reqwest client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl BackendClient {
    /// Build a client for `base` (for example `http://127.0.0.1:5000/api`).
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| format!("backend URL '{}' cannot carry a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(super) fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub(super) fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    pub(super) fn delete(&self, url: Url) -> RequestBuilder {
        self.client.delete(url)
    }

    /// Send `request`, buffering the body whatever the status.
    pub(super) async fn execute(
        &self,
        request: RequestBuilder,
        token: Option<&SessionToken>,
    ) -> Result<BackendResponse, TransportFailure> {
        let request = match token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        };
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_failure)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_failure)?;
        Ok(BackendResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn transport_failure(error: reqwest::Error) -> TransportFailure {
    TransportFailure {
        timed_out: error.is_timeout(),
        message: error.to_string(),
    }
}

impl TransportFailure {
    pub(super) fn describe(&self) -> String {
        if self.timed_out {
            format!("request timed out: {}", self.message)
        } else {
            self.message.clone()
        }
    }
}

/// Best human-readable message for an error response.
///
/// Prefers the backend's `error` field, then its joined `errors` list, then
/// a condensed preview of the raw body.
pub(super) fn error_message(status: StatusCode, body: &[u8]) -> String {
    let from_envelope = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .and_then(ErrorEnvelopeDto::into_message);
    let detail = from_envelope.unwrap_or_else(|| body_preview(body));
    if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    }
}

/// Structured `code` field of an error response, lowercased.
pub(super) fn error_code(body: &[u8]) -> Option<String> {
    let envelope = serde_json::from_slice::<ErrorEnvelopeDto>(body).ok()?;
    envelope.code().map(str::to_ascii_lowercase)
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
