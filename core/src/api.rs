//! Async admin API: request building, transport and response parsing
//! composed into one call per remote operation.
//!
//! Calls are never retried. Every failure is returned once, as an
//! `ApiError`, to the caller.

use std::time::Duration;

use crate::client::AdminClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Blog, User, UserWithPassword};

pub struct Api<T> {
    client: AdminClient,
    transport: T,
    rpc_delay: Duration,
}

impl<T: Transport> Api<T> {
    pub fn new(client: AdminClient, transport: T) -> Self {
        Self {
            client,
            transport,
            rpc_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        Self::new(AdminClient::new(&config.api_url), transport).with_rpc_delay(config.rpc_delay)
    }

    /// Hold every RPC result back for at least `delay`. Development aid for
    /// exercising loading states against a fast local backend.
    pub fn with_rpc_delay(mut self, delay: Duration) -> Self {
        self.rpc_delay = delay;
        self
    }

    /// `Ok(false)` when the server rejected the credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool, ApiError> {
        let response = self.transport.execute(self.client.build_login(username, password)).await?;
        self.client.parse_login(response)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_logout()).await?;
        self.client.parse_logout(response)
    }

    pub async fn whoami(&self) -> Result<User, ApiError> {
        let response = self.rpc(self.client.build_whoami()?).await?;
        self.client.parse_whoami(response)
    }

    pub async fn register(&self, user: &UserWithPassword) -> Result<(), ApiError> {
        let response = self.rpc(self.client.build_register(user)?).await?;
        self.client.parse_register(response)
    }

    pub async fn list_blogs(&self) -> Result<Option<Vec<Blog>>, ApiError> {
        let response = self.rpc(self.client.build_list_blogs()?).await?;
        self.client.parse_list_blogs(response)
    }

    pub async fn create_blog(&self, blog: &Blog) -> Result<(), ApiError> {
        let response = self.rpc(self.client.build_create_blog(blog)?).await?;
        self.client.parse_create_blog(response)
    }

    /// Upsert keyed by slug.
    pub async fn update_blog(&self, blog: &Blog) -> Result<(), ApiError> {
        let response = self.rpc(self.client.build_update_blog(blog)?).await?;
        self.client.parse_update_blog(response)
    }

    pub async fn delete_blog(&self, slug: &str) -> Result<(), ApiError> {
        let response = self.rpc(self.client.build_delete_blog(slug)?).await?;
        self.client.parse_delete_blog(response)
    }

    async fn rpc(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.rpc_delay.is_zero() {
            return self.transport.execute(request).await;
        }
        let (response, ()) = tokio::join!(
            self.transport.execute(request),
            tokio::time::sleep(self.rpc_delay)
        );
        response
    }
}
