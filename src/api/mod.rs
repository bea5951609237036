// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Call Sites
//!
//! One method per backend operation, grouped by area:
//!
//! - `auth` - login, registration, logout, password reset
//! - `user` - profile and personal schedule
//! - `org` - organizations, membership, invitations
//! - `meeting` - availability heatmaps and meeting creation
//! - `llm` - assistant configuration
//!
//! Call sites only describe requests. Credentials, error normalization and
//! the dev switch are handled by the [`Pipeline`].

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{Pipeline, PipelineBuilder, ReqwestTransport, Transport};
use crate::storage::FileTokenStorage;
use crate::store::SessionStore;

pub mod auth;
pub mod llm;
pub mod meeting;
pub mod org;
pub mod user;

/// Operation ids. Mock fixtures are keyed by these.
pub mod ops {
    pub const AUTH_LOGIN: &str = "auth.login";
    pub const AUTH_REGISTER: &str = "auth.register";
    pub const AUTH_BIND: &str = "auth.bind";
    pub const AUTH_LOGOUT: &str = "auth.logout";
    pub const AUTH_SEND_VERIFICATION_CODE: &str = "auth.send_verification_code";
    pub const AUTH_RESET_PASSWORD: &str = "auth.reset_password";

    pub const USER_UPDATE: &str = "user.update";
    pub const USER_CHANGE_PASSWORD: &str = "user.change_password";
    pub const USER_UPLOAD_AVATAR: &str = "user.upload_avatar";
    pub const USER_QQ_AVATAR: &str = "user.qq_avatar";
    pub const USER_SCHEDULE: &str = "user.schedule";
    pub const USER_SCHEDULE_ADD: &str = "user.schedule_add";
    pub const USER_SCHEDULE_EDIT: &str = "user.schedule_edit";
    pub const USER_SCHEDULE_DELETE: &str = "user.schedule_delete";
    pub const USER_SCHEDULE_IMPORT_EXCEL: &str = "user.schedule_import_excel";
    pub const USER_SCHEDULE_IMPORT_SCHOOL: &str = "user.schedule_import_school";
    pub const USER_SCHEDULE_ADD_RECURRING: &str = "user.schedule_add_recurring";

    pub const ORG_USER_ORGS: &str = "org.user_orgs";
    pub const ORG_MEMBERS: &str = "org.members";
    pub const ORG_HEATMAP: &str = "org.heatmap";
    pub const ORG_DETAIL: &str = "org.detail";
    pub const ORG_CREATE: &str = "org.create";
    pub const ORG_UPDATE_NAME: &str = "org.update_name";
    pub const ORG_DELETE: &str = "org.delete";
    pub const ORG_SET_ADMINS: &str = "org.set_admins";
    pub const ORG_SEARCH_USERS: &str = "org.search_users";
    pub const ORG_INVITE: &str = "org.invite";
    pub const ORG_SEARCH: &str = "org.search";
    pub const ORG_JOIN_REQUEST: &str = "org.join_request";
    pub const ORG_ACCEPT_INVITATION: &str = "org.accept_invitation";
    pub const ORG_REJECT_INVITATION: &str = "org.reject_invitation";

    pub const MEETING_HEATMAP: &str = "meeting.heatmap";
    pub const MEETING_CREATE: &str = "meeting.create";

    pub const LLM_CONFIG: &str = "llm.config";
    pub const LLM_SAVE_CONFIG: &str = "llm.save_config";
}

/// Typed client for the schedule planner backend.
pub struct ApiClient<T: Transport> {
    pipeline: Pipeline<T>,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
        }
    }
}

impl<T: Transport> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl ApiClient<ReqwestTransport> {
    /// Production client: restores the persisted session and talks HTTP.
    ///
    /// Navigation and notifications default to log lines; use
    /// [`builder_from_config`] to plug in a UI.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(builder_from_config(config)?.build()))
    }
}

/// Pipeline builder preloaded from configuration.
pub fn builder_from_config(
    config: &ClientConfig,
) -> ClientResult<PipelineBuilder<ReqwestTransport>> {
    let storage = Arc::new(FileTokenStorage::new(config.token_file.clone()));
    let session = Arc::new(SessionStore::open(storage)?);
    let transport = ReqwestTransport::new(config.api_base_url.clone(), config.request_timeout)
        .map_err(|e| ClientError::network(None, e.to_string()))?;

    Ok(Pipeline::builder(transport, session)
        .environment(config.environment)
        .success_convention(config.success_convention))
}

impl<T: Transport> ApiClient<T> {
    pub fn new(pipeline: Pipeline<T>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline<T> {
        &self.pipeline
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.pipeline.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.pipeline.session().is_authenticated()
    }
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording transport shared by call-site tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use super::ApiClient;
    use crate::http::{
        OutgoingRequest, Pipeline, Transport, TransportError, TransportResponse,
    };
    use crate::mock::EnvironmentSwitch;
    use crate::store::{Session, SessionStore};

    #[derive(Clone, Default)]
    pub struct Recorder {
        sent: Arc<Mutex<Vec<OutgoingRequest>>>,
        replies: Arc<Mutex<VecDeque<TransportResponse>>>,
    }

    impl Recorder {
        pub fn reply_data(&self, data: Value) {
            self.reply(TransportResponse::json(
                200,
                &json!({"code": 200, "message": "success", "data": data}),
            ));
        }

        pub fn reply(&self, response: TransportResponse) {
            self.replies.lock().unwrap().push_back(response);
        }

        pub fn last(&self) -> OutgoingRequest {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }

        pub fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Transport for Recorder {
        async fn send(
            &self,
            request: &OutgoingRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            let next = self.replies.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| {
                TransportResponse::json(200, &json!({"code": 200, "message": "success"}))
            }))
        }
    }

    /// Production-mode client with an optional session token.
    pub fn client(token: Option<&str>) -> (ApiClient<Recorder>, Recorder) {
        let recorder = Recorder::default();
        let session = Arc::new(SessionStore::in_memory());
        if let Some(token) = token {
            session.set(Session::new(token, None)).unwrap();
        }
        let pipeline = Pipeline::builder(recorder.clone(), session)
            .environment(EnvironmentSwitch::production())
            .build();
        (ApiClient::new(pipeline), recorder)
    }

    /// Dev-mode client with the default fixtures and no session.
    pub fn dev_client() -> (ApiClient<Recorder>, Recorder) {
        let recorder = Recorder::default();
        let pipeline = Pipeline::builder(recorder.clone(), Arc::new(SessionStore::in_memory()))
            .environment(EnvironmentSwitch::development())
            .build();
        (ApiClient::new(pipeline), recorder)
    }
}
