//! Knoten-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, sodass der Knoten ohne Konfigurationsdatei startet.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use fernchat_db::DatabaseConfig;
use fernchat_network::{client::STANDARD_PROXY, ClientKonfiguration};
use serde::{Deserialize, Serialize};

/// Vollstaendige Knoten-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Eingehender Peer-Router
    pub knoten: KnotenEinstellungen,
    /// Ausgehende Verbindungen (Proxy, Timeout)
    pub netzwerk: NetzwerkEinstellungen,
    pub datenbank: DatenbankEinstellungen,
    /// Zugangsdaten fuer den Verzeichnisdienst
    pub konto: KontoEinstellungen,
    pub logging: LoggingEinstellungen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnotenEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
}

impl Default for KnotenEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8888,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// `false` fuer direkte Verbindungen ohne SOCKS-Proxy
    pub proxy_aktiviert: bool,
    pub proxy_url: String,
    /// Verbindungs- und Gesamt-Timeout in Sekunden
    pub timeout_sekunden: u64,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            proxy_aktiviert: true,
            proxy_url: STANDARD_PROXY.into(),
            timeout_sekunden: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    pub wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://fernchat.db".into(),
            max_verbindungen: 5,
            wal: true,
        }
    }
}

/// Ohne Benutzername, Passwort und Domain bleibt der Knoten abgemeldet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KontoEinstellungen {
    pub benutzername: Option<String>,
    pub passwort: Option<String>,
    pub verzeichnis_domain: Option<String>,
}

impl KontoEinstellungen {
    /// `(benutzername, passwort, domain)` wenn alle drei gesetzt sind
    pub fn zugangsdaten(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.benutzername.as_deref()?,
            self.passwort.as_deref()?,
            self.verzeichnis_domain.as_deref()?,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str(&inhalt)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Konfigurationsdatei '{pfad}' nicht lesbar")),
        }
    }

    /// Bind-Adresse des Peer-Routers
    pub fn knoten_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        let adresse = format!("{}:{}", self.knoten.bind_adresse, self.knoten.port);
        adresse
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{adresse}'"))
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.wal,
        }
    }

    pub fn client_konfiguration(&self) -> ClientKonfiguration {
        ClientKonfiguration {
            proxy_url: self
                .netzwerk
                .proxy_aktiviert
                .then(|| self.netzwerk.proxy_url.clone()),
            timeout: Duration::from_secs(self.netzwerk.timeout_sekunden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.knoten.port, 8888);
        assert_eq!(cfg.datenbank.url, "sqlite://fernchat.db");
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.konto.zugangsdaten().is_none());
        assert_eq!(
            cfg.knoten_bind_adresse().unwrap(),
            "0.0.0.0:8888".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn proxy_standardmaessig_aktiv() {
        let client = ServerConfig::default().client_konfiguration();
        assert_eq!(client.proxy_url.as_deref(), Some("socks5h://127.0.0.1:9050"));
        assert_eq!(client.timeout, Duration::from_secs(180));
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [knoten]
            port = 9000

            [netzwerk]
            proxy_aktiviert = false

            [konto]
            benutzername = "alice"
            passwort = "geheim"
            verzeichnis_domain = "verzeichnis.onion"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.knoten.port, 9000);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.knoten.bind_adresse, "0.0.0.0");
        assert!(cfg.client_konfiguration().proxy_url.is_none());
        assert_eq!(
            cfg.konto.zugangsdaten(),
            Some(("alice", "geheim", "verzeichnis.onion"))
        );
    }

    #[test]
    fn unvollstaendiges_konto_ohne_login() {
        let cfg: ServerConfig = toml::from_str("[konto]\nbenutzername = \"alice\"").unwrap();
        assert!(cfg.konto.zugangsdaten().is_none());
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/fernchat.toml").unwrap();
        assert_eq!(cfg.knoten.port, 8888);
    }

    #[test]
    fn ungueltige_bind_adresse() {
        let mut cfg = ServerConfig::default();
        cfg.knoten.bind_adresse = "kein host".into();
        assert!(cfg.knoten_bind_adresse().is_err());
    }
}
