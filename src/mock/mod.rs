// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Environment Switch and Mock Registry
//!
//! With the `dev` feature enabled the client answers call sites from canned
//! payloads instead of the network. The decision is made once per process by
//! [`EnvironmentSwitch`]; which payload to serve is looked up by operation id
//! in a [`MockRegistry`]. Call sites stay declarative and never check the
//! mode themselves.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::http::RequestDescriptor;

pub mod fixtures;

/// Build-time development switch. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentSwitch {
    mock: bool,
}

impl EnvironmentSwitch {
    /// The mode compiled into this binary (`--features dev`).
    pub const fn from_build() -> Self {
        Self {
            mock: cfg!(feature = "dev"),
        }
    }

    pub const fn new(mock: bool) -> Self {
        Self { mock }
    }

    pub const fn production() -> Self {
        Self::new(false)
    }

    pub const fn development() -> Self {
        Self::new(true)
    }

    pub fn should_mock(&self) -> bool {
        self.mock
    }
}

impl Default for EnvironmentSwitch {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Builds a canned payload from the request that would have been sent.
pub type MockGenerator = Arc<dyn Fn(&RequestDescriptor) -> Value + Send + Sync>;

/// One registered canned response.
#[derive(Clone)]
pub struct MockEntry {
    pub delay: Duration,
    pub generate: MockGenerator,
}

impl std::fmt::Debug for MockEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEntry")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Operation id → canned payload.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    entries: HashMap<&'static str, MockEntry>,
}

impl MockRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with canned payloads for every operation that had one in the
    /// web client.
    pub fn with_defaults() -> Self {
        fixtures::default_registry()
    }

    pub fn register<F>(&mut self, operation: &'static str, delay: Duration, generate: F)
    where
        F: Fn(&RequestDescriptor) -> Value + Send + Sync + 'static,
    {
        self.entries.insert(
            operation,
            MockEntry {
                delay,
                generate: Arc::new(generate),
            },
        );
    }

    /// Register a payload that does not depend on the request.
    pub fn register_static(&mut self, operation: &'static str, delay: Duration, payload: Value) {
        self.register(operation, delay, move |_| payload.clone());
    }

    pub fn get(&self, operation: &str) -> Option<&MockEntry> {
        self.entries.get(operation)
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.entries.contains_key(operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
