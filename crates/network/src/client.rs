//! HTTP-Client fuer einen einzelnen Peer-Endpunkt
//!
//! Ein [`HttpPeerClient`] ist an genau eine Domain gebunden und spricht
//! die drei POST-Routen des Peer-Protokolls. Erfolg bei Nachricht und
//! Datei ist der Klartext `OK` im Body; das wertet der Aufrufer aus.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fernchat_core::types::pfade;
use fernchat_core::{Certificate, FileRequest, MessageRequest};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::directory::{HttpVerzeichnisClient, VerzeichnisDienst};
use crate::error::{NetzwerkError, NetzwerkResult};

/// Standard-Proxy (lokaler Tor-SOCKS-Port, DNS ueber den Proxy)
pub const STANDARD_PROXY: &str = "socks5h://127.0.0.1:9050";

/// Einstellungen fuer alle ausgehenden HTTP-Clients
#[derive(Debug, Clone)]
pub struct ClientKonfiguration {
    /// SOCKS-Proxy; `None` fuer direkte Verbindungen
    pub proxy_url: Option<String>,
    /// Verbindungs- und Gesamt-Timeout
    pub timeout: Duration,
}

impl Default for ClientKonfiguration {
    fn default() -> Self {
        Self {
            proxy_url: Some(STANDARD_PROXY.into()),
            timeout: Duration::from_secs(180),
        }
    }
}

impl ClientKonfiguration {
    /// Baut einen reqwest-Client mit Proxy, Timeouts und `Accept: application/json`
    pub(crate) fn reqwest_client(&self) -> NetzwerkResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("fernchat/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .connect_timeout(self.timeout)
            .timeout(self.timeout);

        if let Some(proxy) = &self.proxy_url {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| NetzwerkError::Konfiguration(format!("Proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| NetzwerkError::Konfiguration(e.to_string()))
    }
}

/// Verbindung zu einem Endpunkt eines Abonenten
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Domain, an die der Client gebunden ist
    fn domain(&self) -> &str;

    /// Sendet eine verschluesselte Textnachricht, liefert den Antwort-Body
    async fn nachricht_senden(&self, anfrage: &MessageRequest) -> NetzwerkResult<String>;

    /// Sendet eine verschluesselte Datei, liefert den Antwort-Body
    async fn datei_senden(&self, anfrage: &FileRequest) -> NetzwerkResult<String>;

    /// Schickt das eigene Zertifikat und erhaelt das des Peers
    async fn zertifikat_senden(&self, zertifikat: &Certificate) -> NetzwerkResult<Certificate>;
}

/// Erzeugt Peer- und Verzeichnis-Clients
pub trait PeerClientFactory: Send + Sync {
    fn peer_client(&self, domain: &str) -> NetzwerkResult<Arc<dyn PeerClient>>;

    fn verzeichnis_client(
        &self,
        domain: &str,
        token: Option<String>,
    ) -> NetzwerkResult<Arc<dyn VerzeichnisDienst>>;
}

/// reqwest-basierter Peer-Client
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    client: reqwest::Client,
    domain: String,
    base_url: String,
}

impl HttpPeerClient {
    pub fn neu(domain: &str, konfiguration: &ClientKonfiguration) -> NetzwerkResult<Self> {
        Ok(Self::mit_client(konfiguration.reqwest_client()?, domain))
    }

    /// Teilt sich den Connection-Pool eines bestehenden reqwest-Clients
    pub fn mit_client(client: reqwest::Client, domain: &str) -> Self {
        Self {
            client,
            domain: domain.to_string(),
            base_url: format!("http://{domain}"),
        }
    }

    async fn post_text<T: serde::Serialize + Sync>(
        &self,
        pfad: &str,
        body: &T,
    ) -> NetzwerkResult<String> {
        let res = self
            .client
            .post(format!("{}{pfad}", self.base_url))
            .json(body)
            .send()
            .await?;

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
impl PeerClient for HttpPeerClient {
    fn domain(&self) -> &str {
        &self.domain
    }

    async fn nachricht_senden(&self, anfrage: &MessageRequest) -> NetzwerkResult<String> {
        debug!(domain = %self.domain, chat = %anfrage.chat, "Nachricht senden");
        self.post_text(pfade::NACHRICHT, anfrage).await
    }

    async fn datei_senden(&self, anfrage: &FileRequest) -> NetzwerkResult<String> {
        debug!(domain = %self.domain, datei = %anfrage.file_name, "Datei senden");
        self.post_text(pfade::DATEI, anfrage).await
    }

    async fn zertifikat_senden(&self, zertifikat: &Certificate) -> NetzwerkResult<Certificate> {
        debug!(domain = %self.domain, "Zertifikat senden");
        let body = self.post_text(pfade::ZERTIFIKAT, zertifikat).await?;
        json_lesen(&body)
    }
}

pub(crate) fn json_lesen<T: DeserializeOwned>(body: &str) -> NetzwerkResult<T> {
    Ok(serde_json::from_str(body)?)
}

/// Produktions-Fabrik: alle Clients teilen sich einen reqwest-Client
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    client: reqwest::Client,
}

impl HttpClientFactory {
    pub fn neu(konfiguration: &ClientKonfiguration) -> NetzwerkResult<Self> {
        Ok(Self {
            client: konfiguration.reqwest_client()?,
        })
    }
}

impl PeerClientFactory for HttpClientFactory {
    fn peer_client(&self, domain: &str) -> NetzwerkResult<Arc<dyn PeerClient>> {
        Ok(Arc::new(HttpPeerClient::mit_client(self.client.clone(), domain)))
    }

    fn verzeichnis_client(
        &self,
        domain: &str,
        token: Option<String>,
    ) -> NetzwerkResult<Arc<dyn VerzeichnisDienst>> {
        Ok(Arc::new(HttpVerzeichnisClient::mit_client(
            self.client.clone(),
            domain,
            token,
        )))
    }
}
