// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authenticated Request Pipeline
//!
//! Every backend call flows through the same stages:
//!
//! ```text
//! call site ─► EnvironmentSwitch ─► RequestInterceptor ─► Transport
//!                   │ (dev mock)                              │
//!                   ▼                                         ▼
//!              canned payload ◄──────────────── ResponseInterceptor
//! ```
//!
//! Call sites build a [`RequestDescriptor`] and hand it to a [`Pipeline`].
//! They get back either the business payload or a [`crate::error::ClientError`]
//! and never deal with tokens, status codes or the dev switch themselves.

pub mod descriptor;
pub mod notify;
pub mod pipeline;
pub mod response;
pub mod transport;

pub use descriptor::{
    FilePart, Method, MultipartForm, OutgoingRequest, RequestBody, RequestDescriptor,
    AUTHORIZATION, BODY_TOKEN_FIELD, REQUEST_ID,
};
pub use notify::{LogNotifier, Notifier};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use response::{BusinessResponse, ResponseInterceptor, SuccessConvention};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
