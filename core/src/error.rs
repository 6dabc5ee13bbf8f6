//! Error types for the admin API client and store.
//!
//! # Design
//! Every failure keeps a human-readable `Display` because the store surfaces
//! it verbatim through `Loadable::Error`. RPC errors additionally carry an
//! `RpcErrorKind`, classified once when the response is parsed, so callers
//! branch on the kind instead of inspecting message text.

use thiserror::Error;

/// Message the backend returns for methods called without a session.
pub const AUTHENTICATION_REQUIRED: &str = "This method requires authentication";

/// Classification of a server-reported RPC error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// The method needs a session and the request carried none.
    AuthenticationRequired,
    Other,
}

impl RpcErrorKind {
    pub fn classify(message: &str) -> Self {
        if message.contains(AUTHENTICATION_REQUIRED) {
            RpcErrorKind::AuthenticationRequired
        } else {
            RpcErrorKind::Other
        }
    }
}

/// Errors returned by `AdminClient` parse methods and by transports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS...).
    #[error("Request failed: {0}")]
    Transport(String),

    /// `/login` answered with a non-2xx status other than 401.
    #[error("Login request failed with status {status}")]
    LoginFailed { status: u16 },

    #[error("Logout request failed with status {status}")]
    LogoutFailed { status: u16 },

    /// The RPC endpoint answered with a status other than 200.
    #[error("Invalid response code: {status}")]
    InvalidStatus { status: u16 },

    /// The server processed the call and reported an error.
    #[error("RPC Error ({method}): {message}")]
    Rpc {
        method: String,
        kind: RpcErrorKind,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// True when the server rejected the call for lack of a session.
    pub fn is_authentication_required(&self) -> bool {
        matches!(
            self,
            ApiError::Rpc {
                kind: RpcErrorKind::AuthenticationRequired,
                ..
            }
        )
    }
}

/// Errors returned by the store's optimistic blog actions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The blog list was not loaded when the action started.
    #[error("Invalid base state")]
    InvalidBaseState,

    #[error(transparent)]
    Api(#[from] ApiError),
}
