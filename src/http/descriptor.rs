// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request descriptors built by call sites.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthPolicy;
use crate::error::{ClientError, ClientResult};

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";
/// Header carrying the per-request correlation id.
pub const REQUEST_ID: &str = "x-request-id";
/// Body field used by endpoints that read the credential from the body.
pub const BODY_TOKEN_FIELD: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Multipart form body: text fields plus files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub text: BTreeMap<String, String>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.insert(name.into(), value.into());
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.map(str::to_string),
            bytes,
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// Everything needed to issue one backend call.
///
/// Built once by a call site and handed to the pipeline by value; the caller
/// never sees the intercepted version.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    operation: &'static str,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    headers: BTreeMap<String, String>,
    auth_policy: AuthPolicy,
    body_token: bool,
}

impl RequestDescriptor {
    pub fn new(operation: &'static str, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            headers: BTreeMap::new(),
            auth_policy: AuthPolicy::Required,
            body_token: false,
        }
    }

    pub fn get(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::Get, path)
    }

    pub fn post(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::Post, path)
    }

    pub fn put(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::Put, path)
    }

    pub fn delete(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::Delete, path)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Header names are case-insensitive and stored lowercase.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> ClientResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidRequest(format!("failed to encode body: {e}")))?;
        Ok(self.json_value(value))
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Opt out of session credentials; the call site carries its own.
    pub fn skip_auth(mut self) -> Self {
        self.auth_policy = AuthPolicy::ExplicitSkip;
        self
    }

    /// Also copy the session token into the body's `token` field.
    pub fn with_body_token(mut self) -> Self {
        self.body_token = true;
        self
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn auth_policy(&self) -> AuthPolicy {
        self.auth_policy
    }

    pub fn wants_body_token(&self) -> bool {
        self.body_token
    }

    /// JSON body field lookup, for mocks that echo request data.
    pub fn body_field(&self, name: &str) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(Value::Object(map)) => map.get(name),
            _ => None,
        }
    }

    pub(crate) fn set_header(&mut self, name: &str, value: String) {
        self.headers.insert(name.to_ascii_lowercase(), value);
    }

    /// Insert the credential into the body. Non-object JSON bodies are left
    /// alone; an empty body becomes `{"token": ...}`.
    pub(crate) fn set_body_token(&mut self, token: &str) -> bool {
        match &mut self.body {
            RequestBody::Empty => {
                let mut map = serde_json::Map::new();
                map.insert(BODY_TOKEN_FIELD.to_string(), Value::String(token.to_string()));
                self.body = RequestBody::Json(Value::Object(map));
                true
            }
            RequestBody::Json(Value::Object(map)) => {
                map.insert(BODY_TOKEN_FIELD.to_string(), Value::String(token.to_string()));
                true
            }
            RequestBody::Json(_) => false,
            RequestBody::Multipart(form) => {
                form.text
                    .insert(BODY_TOKEN_FIELD.to_string(), token.to_string());
                true
            }
        }
    }
}

/// A descriptor after the request interceptor ran.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub descriptor: RequestDescriptor,
    /// Effective policy resolved by the classifier.
    pub policy: AuthPolicy,
    /// Whether a session token was attached as a bearer header.
    pub bearer_attached: bool,
    /// Session token at interception time, attached or not. A 401/403 only
    /// expires the session if it still holds this token.
    pub session_token: Option<String>,
    pub request_id: Uuid,
}

impl OutgoingRequest {
    /// A public request sent without a bearer credential. An auth failure on
    /// such a request is a rejected login, not an expired session.
    pub fn is_anonymous(&self) -> bool {
        self.policy == AuthPolicy::PublicAllowList && !self.bearer_attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_fields() {
        let descriptor = RequestDescriptor::get("org.search_users", "/api/users/search")
            .query("q", "张")
            .header("X-Custom", "1");

        assert_eq!(descriptor.method(), Method::Get);
        assert_eq!(descriptor.query_pairs(), &[("q".to_string(), "张".to_string())]);
        assert_eq!(descriptor.header_value("x-custom"), Some("1"));
        assert_eq!(descriptor.auth_policy(), AuthPolicy::Required);
        assert!(!descriptor.wants_body_token());
    }

    #[test]
    fn body_token_is_inserted_into_objects() {
        let mut descriptor = RequestDescriptor::post("user.update", "/api/user/update")
            .json_value(json!({"nickname": "a", "token": "stale"}));
        assert!(descriptor.set_body_token("fresh"));
        assert_eq!(descriptor.body_field("token"), Some(&json!("fresh")));
        assert_eq!(descriptor.body_field("nickname"), Some(&json!("a")));
    }

    #[test]
    fn body_token_creates_body_when_empty() {
        let mut descriptor = RequestDescriptor::post("auth.logout", "/api/logout");
        assert!(descriptor.set_body_token("abc"));
        assert_eq!(descriptor.body(), &RequestBody::Json(json!({"token": "abc"})));
    }

    #[test]
    fn body_token_skips_arrays() {
        let mut descriptor = RequestDescriptor::post("x", "/api/x").json_value(json!([1, 2]));
        assert!(!descriptor.set_body_token("abc"));
        assert_eq!(descriptor.body(), &RequestBody::Json(json!([1, 2])));
    }

    #[test]
    fn body_token_goes_into_multipart_text() {
        let form = MultipartForm::new().file("avatar", "a.png", Some("image/png"), vec![1]);
        let mut descriptor =
            RequestDescriptor::post("user.upload_avatar", "/api/user/avatar/upload")
                .multipart(form);
        assert!(descriptor.set_body_token("abc"));
        match descriptor.body() {
            RequestBody::Multipart(form) => {
                assert_eq!(form.text.get("token").map(String::as_str), Some("abc"));
                assert_eq!(form.files.len(), 1);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
