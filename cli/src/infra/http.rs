//! Blocking HTTP (ureq) bridged onto the async runtime.
//!
//! Non-2xx responses are returned, not raised: adapters decide which status
//! codes mean "rejected" and which mean "failed".

use anyhow::{Context, Result};
use base64::Engine as _;
use std::io::Read;

/// Upper bound on any response body read into memory.
const MAX_BODY_BYTES: u64 = 200 * 1024 * 1024;

/// Request payload.
#[derive(Clone)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(&'static str, String)>),
    Bytes(Vec<u8>, &'static str),
}

/// A fully read response.
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.body).context("parsing response body")
    }

    /// Fail unless the status is 2xx, quoting the service's error message.
    ///
    /// # Errors
    ///
    /// Returns an error describing `what` and the HTTP status.
    pub fn error_for_status(self, what: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self
            .json()
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();
        anyhow::bail!("{what} failed: HTTP {} {message}", self.status)
    }
}

/// `Authorization` header value for HTTP basic authentication.
#[must_use]
pub fn basic_auth(user: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {encoded}")
}

/// Send `request` with `body` on the blocking pool.
///
/// # Errors
///
/// Returns an error on transport failures (DNS, TLS, connection reset).
pub async fn send(request: ureq::Request, body: Body) -> Result<Response> {
    tokio::task::spawn_blocking(move || send_blocking(request, body))
        .await
        .context("HTTP task panicked")?
}

fn send_blocking(request: ureq::Request, body: Body) -> Result<Response> {
    let url = request.url().to_string();
    let result = match body {
        Body::Empty => request.call(),
        Body::Json(value) => request
            .set("Content-Type", "application/json")
            .send_string(&value.to_string()),
        Body::Form(pairs) => {
            let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
            request.send_form(&pairs)
        }
        Body::Bytes(bytes, content_type) => request
            .set("Content-Type", content_type)
            .send_bytes(&bytes),
    };
    let response = match result {
        Ok(r) | Err(ureq::Error::Status(_, r)) => r,
        Err(ureq::Error::Transport(e)) => {
            return Err(anyhow::anyhow!("cannot reach {url}: {e}"));
        }
    };

    let status = response.status();
    let location = response.header("Location").map(str::to_string);
    let body = read_limited(response.into_reader(), MAX_BODY_BYTES)
        .with_context(|| format!("reading response from {url}"))?;
    Ok(Response {
        status,
        location,
        body,
    })
}

/// Read the whole body, failing rather than truncating past `limit`.
fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;
    anyhow::ensure!(
        u64::try_from(body.len()).unwrap_or(u64::MAX) <= limit,
        "response body exceeds {limit} bytes"
    );
    Ok(body)
}
