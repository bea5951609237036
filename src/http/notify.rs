// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transient user notifications for rejected calls.

use tracing::warn;

use crate::error::ClientError;

/// Surface an error to the user (toast, status bar, stderr, ...).
///
/// Called exactly once per rejected pipeline call.
pub trait Notifier: Send + Sync {
    fn notify(&self, error: &ClientError);
}

/// Default notifier: a structured `warn` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, error: &ClientError) {
        warn!(error_code = error.error_code(), "{error}");
    }
}
