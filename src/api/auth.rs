// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle: login, registration, phone binding, logout and
//! password reset. Everything here except logout is on the public allow-list.

use serde_json::json;
use tracing::{info, warn};

use super::{ops, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::http::{RequestDescriptor, Transport};
use crate::models::{
    AuthPayload, BindPhoneRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UserProfile,
};
use crate::store::Session;

impl<T: Transport> ApiClient<T> {
    /// Log in with phone or email. On success the session is established and
    /// persisted.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<UserProfile> {
        let descriptor = RequestDescriptor::post(ops::AUTH_LOGIN, "/api/login").json(request)?;
        let payload: AuthPayload = self.pipeline.call(descriptor).await?;
        self.adopt(payload)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserProfile> {
        let descriptor =
            RequestDescriptor::post(ops::AUTH_REGISTER, "/api/register").json(request)?;
        let payload: AuthPayload = self.pipeline.call(descriptor).await?;
        self.adopt(payload)
    }

    /// Bind a phone number to a new account (QQ sign-up flow).
    pub async fn bind_phone(&self, request: &BindPhoneRequest) -> ClientResult<UserProfile> {
        let descriptor = RequestDescriptor::post(ops::AUTH_BIND, "/api/bind").json(request)?;
        let payload: AuthPayload = self.pipeline.call(descriptor).await?;
        self.adopt(payload)
    }

    /// End the session. The local session is cleared whatever the backend
    /// answers; the backend error, if any, is still returned.
    pub async fn logout(&self) -> ClientResult<()> {
        if !self.is_authenticated() {
            return self.pipeline.end_session();
        }

        let result = self
            .pipeline
            .call_unit(RequestDescriptor::post(ops::AUTH_LOGOUT, "/api/logout").with_body_token())
            .await;
        if let Err(e) = &result {
            warn!(error = %e, "Logout call failed, clearing local session anyway");
        }

        self.pipeline.end_session()?;
        info!("Logged out");
        result
    }

    pub async fn send_verification_code(&self, email: &str) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(
                    ops::AUTH_SEND_VERIFICATION_CODE,
                    "/api/send-verification-code",
                )
                .json_value(json!({ "email": email })),
            )
            .await
    }

    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> ClientResult<()> {
        let descriptor =
            RequestDescriptor::post(ops::AUTH_RESET_PASSWORD, "/api/reset-password")
                .json(request)?;
        self.pipeline.call_unit(descriptor).await
    }

    fn adopt(&self, payload: AuthPayload) -> ClientResult<UserProfile> {
        let AuthPayload { token, profile } = payload;
        if token.trim().is_empty() {
            return Err(ClientError::InvalidResponse(
                "authentication succeeded without a token".to_string(),
            ));
        }
        self.pipeline
            .establish_session(Session::new(token, Some(profile.clone())))?;
        info!(nickname = %profile.nickname, "Session established");
        Ok(profile)
    }
}
