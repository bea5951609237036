// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoint classification: which requests need a session.

use crate::http::RequestDescriptor;

/// Paths reachable without a session.
///
/// Login, registration and phone binding establish a session; the two
/// password-recovery endpoints are used from the logged-out "forgot password"
/// surface.
pub const DEFAULT_ALLOW_LIST: &[&str] = &[
    "/api/login",
    "/api/register",
    "/api/bind",
    "/api/send-verification-code",
    "/api/reset-password",
];

/// How the pipeline treats credentials for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthPolicy {
    /// A token must be present; it is attached as a bearer header.
    #[default]
    Required,
    /// Allowed without a token; a token is still attached if present.
    PublicAllowList,
    /// Never attach a token from the session and never block. The call site
    /// carries the credential itself (usually as a `token` body field).
    ExplicitSkip,
}

impl std::fmt::Display for AuthPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthPolicy::Required => write!(f, "required"),
            AuthPolicy::PublicAllowList => write!(f, "public"),
            AuthPolicy::ExplicitSkip => write!(f, "explicit_skip"),
        }
    }
}

/// Static set of public paths. Read-only once built.
#[derive(Debug, Clone, Copy)]
pub struct AllowList {
    paths: &'static [&'static str],
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOW_LIST)
    }
}

impl AllowList {
    pub const fn new(paths: &'static [&'static str]) -> Self {
        Self { paths }
    }

    /// Exact path match, ignoring a trailing slash and any query string.
    pub fn contains(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.paths.iter().any(|allowed| normalize_path(allowed) == path)
    }

    pub fn paths(&self) -> &'static [&'static str] {
        self.paths
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// Resolve the effective policy for a request.
///
/// Precedence: an explicit skip on the descriptor, then the allow-list, then
/// `Required`. A descriptor cannot make itself public; only the allow-list can.
pub fn classify(descriptor: &RequestDescriptor, allow_list: &AllowList) -> AuthPolicy {
    if descriptor.auth_policy() == AuthPolicy::ExplicitSkip {
        AuthPolicy::ExplicitSkip
    } else if allow_list.contains(descriptor.path()) {
        AuthPolicy::PublicAllowList
    } else {
        AuthPolicy::Required
    }
}
