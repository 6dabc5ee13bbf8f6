//! Stateless HTTP request builder and response parser for the admin API.
//!
//! # Design
//! `AdminClient` holds the `base_url` and the JSON-RPC call-id sequence and
//! never touches the network. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`; a `Transport` executes the round-trip in
//! between.
//!
//! Login and logout are plain form endpoints. Everything else goes through
//! a single JSON-RPC endpoint at `{base}/`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::error::{ApiError, RpcErrorKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::rpc::{RpcCall, RpcResponse};
use crate::types::{Blog, DeleteBlogArgs, User, UserWithPassword};

pub const WHOAMI: &str = "Users.Whoami";
pub const REGISTER: &str = "Users.Create";
pub const LIST_BLOGS: &str = "Blogs.List";
pub const CREATE_BLOG: &str = "Blogs.Create";
pub const UPDATE_BLOG: &str = "Blogs.Update";
pub const DELETE_BLOG: &str = "Blogs.Delete";

/// Request builder and response parser for the admin API.
///
/// Clones share the call-id sequence, so ids stay unique across every
/// handle derived from one client.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
    next_id: Arc<AtomicU64>,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn call_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    // -- login / logout ----------------------------------------------------

    pub fn build_login(&self, username: &str, password: &str) -> HttpRequest {
        let body = format!(
            "username={}&password={}",
            urlencoding::encode(username),
            urlencoding::encode(password)
        );
        HttpRequest {
            path: format!("{}/login", self.base_url),
            headers: vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }

    /// `Ok(false)` means the credentials were rejected (401), which is not a
    /// transport failure.
    pub fn parse_login(&self, response: HttpResponse) -> Result<bool, ApiError> {
        if response.status == 401 {
            return Ok(false);
        }
        if !response.is_success() {
            return Err(ApiError::LoginFailed {
                status: response.status,
            });
        }
        Ok(true)
    }

    pub fn build_logout(&self) -> HttpRequest {
        HttpRequest {
            path: format!("{}/logout", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        if !response.is_success() {
            return Err(ApiError::LogoutFailed {
                status: response.status,
            });
        }
        Ok(())
    }

    // -- JSON-RPC ----------------------------------------------------------

    /// Build an RPC call. `None` sends `params: []`, `Some(p)` sends `[p]`.
    pub fn build_call<P: Serialize>(
        &self,
        method: &str,
        params: Option<&P>,
    ) -> Result<HttpRequest, ApiError> {
        let params = match params {
            Some(p) => vec![serde_json::to_value(p).map_err(|e| ApiError::Serialization(e.to_string()))?],
            None => Vec::new(),
        };
        let call = RpcCall {
            id: self.call_id(),
            method: method.to_string(),
            params,
        };
        let body = serde_json::to_string(&call).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            path: format!("{}/", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn parse_call<T: DeserializeOwned>(
        &self,
        method: &str,
        response: HttpResponse,
    ) -> Result<T, ApiError> {
        if response.status != 200 {
            return Err(ApiError::InvalidStatus {
                status: response.status,
            });
        }
        let envelope: RpcResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        if let Some(message) = envelope.error_message() {
            return Err(ApiError::Rpc {
                method: method.to_string(),
                kind: RpcErrorKind::classify(&message),
                message,
            });
        }
        serde_json::from_value(envelope.result).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parse a call whose result carries no data.
    pub fn parse_ack(&self, method: &str, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_call::<IgnoredAny>(method, response).map(|_| ())
    }

    // -- typed wrappers ----------------------------------------------------

    pub fn build_whoami(&self) -> Result<HttpRequest, ApiError> {
        self.build_call::<()>(WHOAMI, None)
    }

    pub fn parse_whoami(&self, response: HttpResponse) -> Result<User, ApiError> {
        self.parse_call(WHOAMI, response)
    }

    pub fn build_register(&self, user: &UserWithPassword) -> Result<HttpRequest, ApiError> {
        self.build_call(REGISTER, Some(user))
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_ack(REGISTER, response)
    }

    pub fn build_list_blogs(&self) -> Result<HttpRequest, ApiError> {
        self.build_call::<()>(LIST_BLOGS, None)
    }

    /// The backend answers `null` for a user without blogs.
    pub fn parse_list_blogs(&self, response: HttpResponse) -> Result<Option<Vec<Blog>>, ApiError> {
        self.parse_call(LIST_BLOGS, response)
    }

    pub fn build_create_blog(&self, blog: &Blog) -> Result<HttpRequest, ApiError> {
        self.build_call(CREATE_BLOG, Some(blog))
    }

    pub fn parse_create_blog(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_ack(CREATE_BLOG, response)
    }

    pub fn build_update_blog(&self, blog: &Blog) -> Result<HttpRequest, ApiError> {
        self.build_call(UPDATE_BLOG, Some(blog))
    }

    pub fn parse_update_blog(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_ack(UPDATE_BLOG, response)
    }

    pub fn build_delete_blog(&self, slug: &str) -> Result<HttpRequest, ApiError> {
        let args = DeleteBlogArgs {
            slug: slug.to_string(),
        };
        self.build_call(DELETE_BLOG, Some(&args))
    }

    pub fn parse_delete_blog(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_ack(DELETE_BLOG, response)
    }
}
