// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Navigation side channel to the login surface.
//!
//! The pipeline does not know about any UI framework. Whoever embeds it
//! supplies a [`Navigator`]; [`LoginRedirect`] makes sure concurrent
//! forced-expiry paths produce a single navigation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

/// Route of the login surface.
pub const LOGIN_ROUTE: &str = "/login";

/// Capability to move the UI to another route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that only logs. Used by headless clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigation requested");
    }
}

/// Navigator that forwards routes to a channel drained by the UI loop.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: &str) {
        if self.tx.send(route.to_string()).is_err() {
            debug!(route, "Navigation receiver dropped");
        }
    }
}

/// Idempotent redirect to the login surface.
///
/// The first trigger navigates and latches; later triggers are no-ops until
/// a new session is established and [`rearm`](Self::rearm) is called.
pub struct LoginRedirect {
    navigator: Arc<dyn Navigator>,
    on_login: AtomicBool,
}

impl LoginRedirect {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            on_login: AtomicBool::new(false),
        }
    }

    /// Navigate to login unless already there. Returns whether a navigation
    /// was issued.
    pub fn to_login(&self) -> bool {
        if self
            .on_login
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.navigator.navigate(LOGIN_ROUTE);
            true
        } else {
            debug!("Already on login surface, redirect skipped");
            false
        }
    }

    /// Called once the user has left the login surface with a new session.
    pub fn rearm(&self) {
        self.on_login.store(false, Ordering::Release);
    }

    pub fn is_on_login(&self) -> bool {
        self.on_login.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for LoginRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRedirect")
            .field("on_login", &self.is_on_login())
            .finish()
    }
}
