// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outgoing request interceptor: credential attachment.
//!
//! Runs synchronously before transport and performs no I/O. The session
//! token is read once per request, so a concurrent logout cannot leave a
//! request half-credentialed.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::policy::{classify, AllowList, AuthPolicy};
use super::redirect::LoginRedirect;
use crate::error::{ClientError, ClientResult};
use crate::http::descriptor::{AUTHORIZATION, REQUEST_ID};
use crate::http::{OutgoingRequest, RequestDescriptor};
use crate::store::SessionStore;

pub struct RequestInterceptor {
    session: Arc<SessionStore>,
    allow_list: AllowList,
    redirect: Arc<LoginRedirect>,
}

impl RequestInterceptor {
    pub fn new(
        session: Arc<SessionStore>,
        allow_list: AllowList,
        redirect: Arc<LoginRedirect>,
    ) -> Self {
        Self {
            session,
            allow_list,
            redirect,
        }
    }

    /// Prepare a descriptor for transmission.
    ///
    /// Rejects with [`ClientError::SessionExpired`] (and redirects to login)
    /// when the endpoint requires a session and none exists.
    pub fn intercept(&self, mut descriptor: RequestDescriptor) -> ClientResult<OutgoingRequest> {
        let policy = classify(&descriptor, &self.allow_list);
        let request_id = Uuid::new_v4();
        descriptor.set_header(REQUEST_ID, request_id.to_string());

        let session_token = self.session.token();
        let token = match policy {
            AuthPolicy::ExplicitSkip => None,
            AuthPolicy::PublicAllowList | AuthPolicy::Required => session_token.clone(),
        };

        let bearer_attached = match token {
            Some(token) => {
                descriptor.set_header(AUTHORIZATION, format!("Bearer {token}"));
                if descriptor.wants_body_token() && !descriptor.set_body_token(&token) {
                    debug!(
                        operation = descriptor.operation(),
                        "Body is not an object, token not embedded"
                    );
                }
                true
            }
            None if policy == AuthPolicy::Required => {
                warn!(
                    operation = descriptor.operation(),
                    path = descriptor.path(),
                    "No session for authenticated endpoint, request not sent"
                );
                self.redirect.to_login();
                return Err(ClientError::SessionExpired);
            }
            None => false,
        };

        debug!(
            operation = descriptor.operation(),
            method = %descriptor.method(),
            path = descriptor.path(),
            policy = %policy,
            bearer_attached,
            %request_id,
            "Request intercepted"
        );

        Ok(OutgoingRequest {
            descriptor,
            policy,
            bearer_attached,
            session_token,
            request_id,
        })
    }
}
