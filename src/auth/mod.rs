// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side credential handling for the Schedule Planner API.
//!
//! ## Auth Flow
//!
//! 1. Login, registration or phone binding returns a bearer token
//! 2. The token is stored in the [`SessionStore`](crate::store::SessionStore)
//!    and persisted to disk
//! 3. Every request is classified:
//!    - explicit skip → sent as-is, the call site carries its own credential
//!    - allow-listed path → sent with or without a token
//!    - everything else → token required, sent as `Authorization: Bearer <token>`
//! 4. A 401/403 from the backend clears the session and redirects to login
//!
//! ## Notes
//!
//! - No silent token refresh; an expired session always means a new login
//! - Navigation is an injected capability, see [`Navigator`]

pub mod interceptor;
pub mod policy;
pub mod redirect;

pub use interceptor::RequestInterceptor;
pub use policy::{classify, AllowList, AuthPolicy, DEFAULT_ALLOW_LIST};
pub use redirect::{ChannelNavigator, LogNavigator, LoginRedirect, Navigator, LOGIN_ROUTE};
