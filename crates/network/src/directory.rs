//! Client fuer den Verzeichnis- und Authentifizierungsdienst
//!
//! Nach erfolgreichem Login wird ein neuer Client mit Bearer-Token gebaut;
//! der Token-lose Client wird nur fuer den Login selbst benutzt.

use async_trait::async_trait;
use fernchat_core::{AuthCredentialsRequest, AuthTokenResponse, UserResponse};
use tracing::debug;

use crate::client::json_lesen;
use crate::error::{NetzwerkError, NetzwerkResult};

/// Verzeichnisdienst: Login und Benutzerliste
#[async_trait]
pub trait VerzeichnisDienst: Send + Sync {
    /// `POST /token/generate-token`
    async fn anmelden(&self, daten: &AuthCredentialsRequest) -> NetzwerkResult<AuthTokenResponse>;

    /// `GET /user`
    async fn benutzer_liste(&self) -> NetzwerkResult<Vec<UserResponse>>;

    /// `GET /user/{id}`
    async fn benutzer_laden(&self, id: &str) -> NetzwerkResult<UserResponse>;
}

/// reqwest-basierter Verzeichnis-Client
#[derive(Clone)]
pub struct HttpVerzeichnisClient {
    client: reqwest::Client,
    domain: String,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpVerzeichnisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVerzeichnisClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpVerzeichnisClient {
    pub fn mit_client(client: reqwest::Client, domain: &str, token: Option<String>) -> Self {
        Self {
            client,
            domain: domain.to_string(),
            base_url: format!("http://{domain}"),
            token,
        }
    }

    fn mit_token(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn body_lesen(&self, res: reqwest::Response) -> NetzwerkResult<String> {
        let status = res.status();
        if !status.is_success() {
            return Err(NetzwerkError::UngueltigeAntwort {
                domain: self.domain.clone(),
                status: status.as_u16(),
            });
        }
        Ok(res.text().await?)
    }
}

#[async_trait]
impl VerzeichnisDienst for HttpVerzeichnisClient {
    async fn anmelden(&self, daten: &AuthCredentialsRequest) -> NetzwerkResult<AuthTokenResponse> {
        debug!(domain = %self.domain, benutzer = %daten.username, "Login am Verzeichnisdienst");
        let res = self
            .client
            .post(format!("{}/token/generate-token", self.base_url))
            .json(daten)
            .send()
            .await?;
        json_lesen(&self.body_lesen(res).await?)
    }

    async fn benutzer_liste(&self) -> NetzwerkResult<Vec<UserResponse>> {
        let res = self
            .mit_token(self.client.get(format!("{}/user", self.base_url)))
            .send()
            .await?;
        json_lesen(&self.body_lesen(res).await?)
    }

    async fn benutzer_laden(&self, id: &str) -> NetzwerkResult<UserResponse> {
        let res = self
            .mit_token(self.client.get(format!("{}/user/{id}", self.base_url)))
            .send()
            .await?;
        json_lesen(&self.body_lesen(res).await?)
    }
}
