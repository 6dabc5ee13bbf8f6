//! Client-side state and API layer for the blog administration console.
//!
//! # Overview
//! `AdminClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). A
//! `Transport` executes the round-trip, `Api` composes the two into async
//! calls, and `Store` keeps the current user and blog list as `Loadable`
//! state driven by those calls.
//!
//! # Design
//! - Login and logout are form endpoints; every other operation is a
//!   JSON-RPC call to `{base}/`.
//! - Errors carry a structured kind where callers branch on them
//!   (`ApiError::is_authentication_required`), never message text.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod loadable;
pub mod rpc;
pub mod store;
pub mod transport;
pub mod types;

pub use api::Api;
pub use client::AdminClient;
pub use config::ClientConfig;
pub use error::{ApiError, RpcErrorKind, StoreError};
pub use guard::{Navigation, Route};
pub use http::{HttpRequest, HttpResponse};
pub use loadable::{LoadState, Loadable};
pub use store::{sort_blogs, LoginOutcome, RegisterOutcome, State, Store};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Blog, DeleteBlogArgs, User, UserWithPassword};
