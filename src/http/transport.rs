// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network transport.
//!
//! The pipeline only needs "send this request, give me status and body".
//! [`ReqwestTransport`] is the production implementation; tests plug in
//! their own.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::descriptor::{Method, OutgoingRequest, RequestBody};

/// Raw completed exchange. Any HTTP status counts as completed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange did not complete.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request could not be built: {0}")]
    Build(String),

    #[error("{0}")]
    Other(String),
}

pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: &OutgoingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// HTTP transport over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: Url,
    http: Client,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: Url, http: Client) -> Self {
        Self {
            base_url: ensure_trailing_slash(base_url),
            http,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path against the base URL, keeping any base path
    /// prefix (`https://host/backend/` + `/api/org` → `/backend/api/org`).
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Build(format!("invalid path {path}: {e}")))
    }

    fn build(&self, request: &OutgoingRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let descriptor = &request.descriptor;
        let url = self.endpoint(descriptor.path())?;

        let method = match descriptor.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, url);
        if !descriptor.query_pairs().is_empty() {
            builder = builder.query(descriptor.query_pairs());
        }
        for (name, value) in descriptor.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match descriptor.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => {
                let mut multipart = Form::new();
                for (name, value) in &form.text {
                    multipart = multipart.text(name.clone(), value.clone());
                }
                for file in &form.files {
                    let mut part =
                        Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime {
                        part = part.mime_str(mime).map_err(|e| {
                            TransportError::Build(format!("invalid mime {mime}: {e}"))
                        })?;
                    }
                    multipart = multipart.part(file.field.clone(), part);
                }
                builder.multipart(multipart)
            }
        };

        Ok(builder)
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &OutgoingRequest) -> Result<TransportResponse, TransportError> {
        let builder = self.build(request)?;
        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        debug!(
            request_id = %request.request_id,
            status,
            bytes = body.len(),
            "Transport response received"
        );

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_builder() {
        TransportError::Build(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
