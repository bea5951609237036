// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response interceptor: transport outcome → business result.
//!
//! ## Classification
//!
//! | Outcome | Result |
//! |---------|--------|
//! | transport error (timeout, connect, ...) | `Network` |
//! | HTTP 401/403 | forced expiry, `SessionExpired` |
//! | other non-2xx with envelope | `Business` with the backend message |
//! | other non-2xx without envelope | `Network` |
//! | 2xx, code == success sentinel | payload |
//! | 2xx, code != success sentinel | `Business` |
//! | 2xx, not an envelope | `InvalidResponse` |
//!
//! In dev mode business codes are not checked at all.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::descriptor::OutgoingRequest;
use super::transport::{TransportError, TransportResponse};
use crate::auth::LoginRedirect;
use crate::error::{ClientError, ClientResult};
use crate::store::SessionStore;

/// The backend's business envelope: `{ code, message, data, ... }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BusinessResponse {
    #[serde(rename = "code")]
    pub status_code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "data", default)]
    pub payload: Value,
    /// Fields some endpoints put next to `data` (e.g. `avatarUrl`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BusinessResponse {
    pub fn success(convention: SuccessConvention, payload: Value) -> Self {
        Self {
            status_code: convention.sentinel(),
            message: "success".to_string(),
            payload,
            extra: Map::new(),
        }
    }

    /// Look a field up in `data` first, then next to it.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name).or_else(|| self.extra.get(name))
    }
}

/// Which business code means success.
///
/// The backend has shipped with both `1` and `200`. One deployment uses
/// exactly one of them; the value is configured, never guessed per response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SuccessConvention {
    /// `code == 200`.
    #[default]
    Http,
    /// `code == 1`.
    Legacy,
}

impl SuccessConvention {
    pub fn sentinel(&self) -> i64 {
        match self {
            SuccessConvention::Http => 200,
            SuccessConvention::Legacy => 1,
        }
    }
}

impl FromStr for SuccessConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "200" => Ok(SuccessConvention::Http),
            "legacy" | "1" => Ok(SuccessConvention::Legacy),
            other => Err(format!("unknown success convention: {other}")),
        }
    }
}

impl std::fmt::Display for SuccessConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuccessConvention::Http => write!(f, "http"),
            SuccessConvention::Legacy => write!(f, "legacy"),
        }
    }
}

pub struct ResponseInterceptor {
    convention: SuccessConvention,
    dev_mode: bool,
    session: Arc<SessionStore>,
    redirect: Arc<LoginRedirect>,
}

impl ResponseInterceptor {
    pub fn new(
        convention: SuccessConvention,
        dev_mode: bool,
        session: Arc<SessionStore>,
        redirect: Arc<LoginRedirect>,
    ) -> Self {
        Self {
            convention,
            dev_mode,
            session,
            redirect,
        }
    }

    pub fn convention(&self) -> SuccessConvention {
        self.convention
    }

    pub fn handle(
        &self,
        request: &OutgoingRequest,
        outcome: Result<TransportResponse, TransportError>,
    ) -> ClientResult<BusinessResponse> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    operation = request.descriptor.operation(),
                    error = %e,
                    "Transport failed"
                );
                return Err(ClientError::network(None, e.to_string()));
            }
        };

        if matches!(response.status, 401 | 403) {
            return Err(self.auth_failure(request, &response));
        }

        if !response.is_success() {
            return Err(match parse_envelope(&response.body) {
                Some(envelope) => {
                    warn!(
                        request_id = %request.request_id,
                        status = response.status,
                        code = envelope.status_code,
                        message = %envelope.message,
                        "Backend rejected request"
                    );
                    ClientError::business(envelope.status_code, non_empty(envelope.message))
                }
                None => {
                    warn!(
                        request_id = %request.request_id,
                        status = response.status,
                        "Backend returned an error without a business body"
                    );
                    ClientError::network(
                        Some(response.status),
                        format!("HTTP {} from {}", response.status, request.descriptor.path()),
                    )
                }
            });
        }

        if self.dev_mode {
            return Ok(self.unchecked(&response.body));
        }

        let envelope = parse_envelope(&response.body).ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "{} did not return a business envelope",
                request.descriptor.path()
            ))
        })?;

        if envelope.status_code != self.convention.sentinel() {
            warn!(
                request_id = %request.request_id,
                code = envelope.status_code,
                message = %envelope.message,
                "Business failure"
            );
            return Err(ClientError::business(
                envelope.status_code,
                non_empty(envelope.message),
            ));
        }

        debug!(
            request_id = %request.request_id,
            operation = request.descriptor.operation(),
            "Business success"
        );
        Ok(envelope)
    }

    /// Clear the session and leave for the login surface. Safe to call from
    /// any number of concurrent responses.
    pub fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Forced expiry could not remove the persisted token");
        }
        self.redirect.to_login();
    }

    fn auth_failure(&self, request: &OutgoingRequest, response: &TransportResponse) -> ClientError {
        if request.is_anonymous() {
            // Nothing to expire: this is a rejected login or registration.
            let message = parse_envelope(&response.body)
                .map(|envelope| non_empty(envelope.message))
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return ClientError::business(i64::from(response.status), message);
        }

        let Some(token) = request.session_token.as_deref() else {
            warn!(
                request_id = %request.request_id,
                operation = request.descriptor.operation(),
                status = response.status,
                "Session rejected by backend, forcing expiry"
            );
            self.expire_session();
            return ClientError::SessionExpired;
        };

        match self.session.clear_if_token(token) {
            Ok(false) => {
                // A newer session replaced the rejected one while in flight.
                debug!(
                    request_id = %request.request_id,
                    operation = request.descriptor.operation(),
                    status = response.status,
                    "Stale token rejected, current session kept"
                );
                return ClientError::SessionExpired;
            }
            Ok(true) => {}
            Err(e) => {
                warn!(error = %e, "Forced expiry could not remove the persisted token");
            }
        }
        warn!(
            request_id = %request.request_id,
            operation = request.descriptor.operation(),
            status = response.status,
            "Session rejected by backend, forcing expiry"
        );
        self.redirect.to_login();
        ClientError::SessionExpired
    }

    /// Dev mode: trust the body. An envelope is unwrapped without looking at
    /// its code; other JSON becomes the payload as-is and anything else is
    /// passed through as a string.
    fn unchecked(&self, body: &[u8]) -> BusinessResponse {
        if let Some(envelope) = parse_envelope(body) {
            return envelope;
        }
        let payload = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(
                    error = %e,
                    bytes = body.len(),
                    "Dev response is not JSON, passing it as text"
                );
                Value::String(String::from_utf8_lossy(body).into_owned())
            }
        };
        BusinessResponse::success(self.convention, payload)
    }
}

fn parse_envelope(body: &[u8]) -> Option<BusinessResponse> {
    serde_json::from_slice::<BusinessResponse>(body).ok()
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        "Request failed".to_string()
    } else {
        message
    }
}
