//! Async endpoint registry: one method per board operation.
//!
//! Every method performs exactly one request through the shared `Transport`
//! and returns the parsed result or the failure, unchanged. No retries, no
//! timeout override, no input validation.

use std::fmt::Display;

use tracing::{debug, warn};

use crate::client::BoardClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Credentials, LoginResponse, Post, UserProfile};

#[derive(Debug, Clone)]
pub struct BoardApi<T> {
    client: BoardClient,
    transport: T,
}

impl BoardApi<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::from_config(config)?;
        let client = BoardClient::new(&config.base_url);
        let client = match &config.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        };
        Ok(Self::new(client, transport))
    }
}

impl<T: Transport> BoardApi<T> {
    pub fn new(client: BoardClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &BoardClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a registry that sends `token` on every request, sharing this
    /// one's transport.
    pub fn authenticated(&self, token: impl Into<String>) -> Self
    where
        T: Clone,
    {
        Self {
            client: self.client.with_token(token),
            transport: self.transport.clone(),
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.client.build_login(credentials)?;
        let response = self.send(request).await?;
        self.client.parse_login(response)
    }

    pub async fn get_user_profile(&self, user_id: impl Display) -> Result<UserProfile, ApiError> {
        let request = self.client.build_get_user_profile(user_id);
        let response = self.send(request).await?;
        self.client.parse_user_profile(response)
    }

    pub async fn get_global_messages(&self) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_get_global_messages();
        let response = self.send(request).await?;
        self.client.parse_messages(response)
    }

    pub async fn post_global_message(&self, content: &str) -> Result<Post, ApiError> {
        let request = self.client.build_post_global_message(content)?;
        let response = self.send(request).await?;
        self.client.parse_created_message(response)
    }

    pub async fn get_section_messages(
        &self,
        section_id: impl Display,
    ) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_get_section_messages(section_id);
        let response = self.send(request).await?;
        self.client.parse_messages(response)
    }

    pub async fn post_section_message(
        &self,
        section_id: impl Display,
        content: &str,
    ) -> Result<Post, ApiError> {
        let request = self.client.build_post_section_message(section_id, content)?;
        let response = self.send(request).await?;
        self.client.parse_created_message(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(%method, %path, status = response.status, "response received");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, %path, error = %err, "request failed");
                Err(err)
            }
        }
    }
}
