//! HTTP client for the remote auth API.

use async_trait::async_trait;
use reqwest::Client;

use cuidar_core::auth::{AuthApi, LogoutRequest, RefreshRequest, RefreshResponse};
use cuidar_core::config::SessionConfig;
use cuidar_core::error::{CuidarError, Result};

/// [`AuthApi`] over HTTP (JSON POST bodies, any 2xx is success).
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    refresh_url: String,
    logout_url: String,
}

impl HttpAuthApi {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CuidarError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            refresh_url: config.endpoint(&config.refresh_path),
            logout_url: config.endpoint(&config.logout_path),
        })
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    pub fn logout_url(&self) -> &str {
        &self.logout_url
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse> {
        tracing::debug!(url = %self.refresh_url, "Refreshing access token");

        let response = self
            .client
            .post(&self.refresh_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<RefreshResponse>()
            .await
            .map_err(|e| CuidarError::auth(format!("Malformed refresh response: {}", e)))
    }

    async fn logout(&self, request: LogoutRequest) -> Result<()> {
        tracing::debug!(url = %self.logout_url, "Logging out refresh token");

        self.client
            .post(&self.logout_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
