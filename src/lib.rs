// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Schedule Planner Client - Authenticated Request Pipeline
//!
//! Typed client for the schedule planner backend. Every call goes through a
//! single pipeline that attaches the session credential, normalizes the
//! backend's business envelope, and forces a return to login when the
//! session is rejected.
//!
//! ## Modules
//!
//! - `api` - Call sites, one method per backend operation
//! - `auth` - Auth policy classification, request interceptor, login redirect
//! - `http` - Descriptors, transport, response interceptor, pipeline
//! - `mock` - Build-time dev switch and canned responses
//! - `store` - Session store with durable token write-through
//! - `storage` - Durable token storage

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod mock;
pub mod models;
pub mod storage;
pub mod store;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use store::{Session, SessionStore};
