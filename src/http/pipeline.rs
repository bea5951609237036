// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pipeline orchestration: environment switch, interceptors and transport
//! wired together behind one entry point.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::descriptor::RequestDescriptor;
use super::notify::{LogNotifier, Notifier};
use super::response::{BusinessResponse, ResponseInterceptor, SuccessConvention};
use super::transport::Transport;
use crate::auth::{AllowList, LogNavigator, LoginRedirect, Navigator, RequestInterceptor};
use crate::error::{ClientError, ClientResult};
use crate::mock::{EnvironmentSwitch, MockRegistry};
use crate::store::{Session, SessionStore};

struct Inner<T> {
    transport: T,
    session: Arc<SessionStore>,
    requests: RequestInterceptor,
    responses: ResponseInterceptor,
    environment: EnvironmentSwitch,
    mocks: MockRegistry,
    redirect: Arc<LoginRedirect>,
    notifier: Arc<dyn Notifier>,
}

/// Shared request pipeline. Cheap to clone.
pub struct Pipeline<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("environment", &self.inner.environment)
            .field("convention", &self.inner.responses.convention())
            .field("mocks", &self.inner.mocks.len())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Pipeline<T> {
    pub fn builder(transport: T, session: Arc<SessionStore>) -> PipelineBuilder<T> {
        PipelineBuilder::new(transport, session)
    }

    /// Run a call and return the whole business envelope.
    pub async fn execute_envelope(
        &self,
        descriptor: RequestDescriptor,
    ) -> ClientResult<BusinessResponse> {
        let result = self.run(descriptor).await;
        if let Err(e) = &result {
            self.inner.notifier.notify(e);
        }
        result
    }

    /// Run a call and return its payload (`data`), untouched.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> ClientResult<Value> {
        self.execute_envelope(descriptor)
            .await
            .map(|envelope| envelope.payload)
    }

    /// Run a call and decode its payload.
    pub async fn call<R: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> ClientResult<R> {
        let operation = descriptor.operation();
        let payload = self.execute(descriptor).await?;
        self.decode(operation, payload)
    }

    /// Run a call whose payload carries nothing of interest.
    pub async fn call_unit(&self, descriptor: RequestDescriptor) -> ClientResult<()> {
        self.execute_envelope(descriptor).await.map(|_| ())
    }

    /// Decode a payload obtained from [`execute`](Self::execute) or an
    /// envelope field. Failures are notified like any other rejection.
    pub fn decode<R: DeserializeOwned>(&self, operation: &str, payload: Value) -> ClientResult<R> {
        serde_json::from_value(payload).map_err(|e| {
            let error = ClientError::InvalidResponse(format!("{operation}: {e}"));
            self.inner.notifier.notify(&error);
            error
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    pub fn environment(&self) -> EnvironmentSwitch {
        self.inner.environment
    }

    pub fn success_convention(&self) -> SuccessConvention {
        self.inner.responses.convention()
    }

    /// Install a freshly obtained session and leave the login surface.
    pub fn establish_session(&self, session: Session) -> ClientResult<()> {
        self.inner.session.set(session)?;
        self.inner.redirect.rearm();
        Ok(())
    }

    /// Drop the session without navigating.
    pub fn end_session(&self) -> ClientResult<()> {
        self.inner.session.clear()?;
        Ok(())
    }

    /// Force expiry as if the backend had rejected the session.
    pub fn expire_session(&self) {
        self.inner.responses.expire_session();
    }

    async fn run(&self, descriptor: RequestDescriptor) -> ClientResult<BusinessResponse> {
        let inner = &*self.inner;

        if inner.environment.should_mock() {
            if let Some(entry) = inner.mocks.get(descriptor.operation()) {
                debug!(
                    operation = descriptor.operation(),
                    delay_ms = entry.delay.as_millis() as u64,
                    "Serving canned response"
                );
                if !entry.delay.is_zero() {
                    tokio::time::sleep(entry.delay).await;
                }
                let payload = (entry.generate)(&descriptor);
                return Ok(BusinessResponse::success(inner.responses.convention(), payload));
            }
        }

        let request = inner.requests.intercept(descriptor)?;
        let outcome = inner.transport.send(&request).await;
        inner.responses.handle(&request, outcome)
    }
}

pub struct PipelineBuilder<T: Transport> {
    transport: T,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    environment: EnvironmentSwitch,
    mocks: Option<MockRegistry>,
    convention: SuccessConvention,
    allow_list: AllowList,
}

impl<T: Transport> PipelineBuilder<T> {
    pub fn new(transport: T, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            navigator: Arc::new(LogNavigator),
            notifier: Arc::new(LogNotifier),
            environment: EnvironmentSwitch::from_build(),
            mocks: None,
            convention: SuccessConvention::default(),
            allow_list: AllowList::default(),
        }
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn environment(mut self, environment: EnvironmentSwitch) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the default fixtures served in dev mode.
    pub fn mocks(mut self, mocks: MockRegistry) -> Self {
        self.mocks = Some(mocks);
        self
    }

    pub fn success_convention(mut self, convention: SuccessConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn build(self) -> Pipeline<T> {
        let dev_mode = self.environment.should_mock();
        let mocks = match self.mocks {
            Some(mocks) => mocks,
            None if dev_mode => MockRegistry::with_defaults(),
            None => MockRegistry::empty(),
        };
        let redirect = Arc::new(LoginRedirect::new(self.navigator));

        debug!(
            dev_mode,
            convention = %self.convention,
            mocks = mocks.len(),
            "Request pipeline built"
        );

        Pipeline {
            inner: Arc::new(Inner {
                requests: RequestInterceptor::new(
                    self.session.clone(),
                    self.allow_list,
                    redirect.clone(),
                ),
                responses: ResponseInterceptor::new(
                    self.convention,
                    dev_mode,
                    self.session.clone(),
                    redirect.clone(),
                ),
                transport: self.transport,
                session: self.session,
                environment: self.environment,
                mocks,
                redirect,
                notifier: self.notifier,
            }),
        }
    }
}
