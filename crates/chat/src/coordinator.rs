//! Zustellkoordinator
//!
//! Verteilt Nachrichten, Dateien und Zertifikate an alle Endpunkte eines
//! Abonenten, nacheinander in Registrierungsreihenfolge. Einzelne
//! Endpunkt-Fehler werden protokolliert und uebersprungen:
//!
//! - Zustellung gilt als erfolgreich, sobald mindestens ein Endpunkt mit
//!   `OK` antwortet.
//! - Beim Schluesselaustausch ueberschreibt jedes brauchbare Zertifikat den
//!   vorherigen Schluessel; das Ergebnis ist der Schluessel der letzten
//!   brauchbaren Antwort.
//! - Ein Zertifikat, dessen `username` nicht zum Abonenten passt, wird
//!   verworfen. Andere Knoten legen den Schluessel in diesem Fall unter
//!   dem gemeldeten Namen ab; hier bleibt er ungenutzt.
//!
//! Abbruch wird vor jedem Endpunkt geprueft. Bereits gesendete Anfragen
//! werden nicht zurueckgenommen.

use std::sync::Arc;

use fernchat_core::{Certificate, FileRequest, MessageRequest, ERFOLGS_MARKER};
use fernchat_crypto::{KeyStore, SecretBytes};
use fernchat_network::{EndpointRegistry, NetzwerkResult, PeerClient};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ChatError, ChatResult};

/// Zu verteilender Payload
#[derive(Debug, Clone)]
pub enum Umschlag {
    Text(MessageRequest),
    Datei(FileRequest),
}

impl Umschlag {
    /// Empfaenger (Chat-Name aus Sicht des Absenders)
    pub fn chat(&self) -> &str {
        match self {
            Self::Text(m) => &m.chat,
            Self::Datei(f) => &f.chat,
        }
    }

    async fn senden(&self, client: &dyn PeerClient) -> NetzwerkResult<String> {
        match self {
            Self::Text(m) => client.nachricht_senden(m).await,
            Self::Datei(f) => client.datei_senden(f).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zustellergebnis {
    Zugestellt,
    Fehlgeschlagen,
}

/// Antwort-Body gilt als Erfolg, wenn er (ggf. als JSON-String) `OK` lautet
fn ist_erfolg(body: &str) -> bool {
    let body = body.trim();
    body == ERFOLGS_MARKER || body.trim_matches('"') == ERFOLGS_MARKER
}

pub struct Zustellkoordinator {
    registry: Arc<EndpointRegistry>,
    schluessel: Arc<KeyStore>,
}

impl Zustellkoordinator {
    pub fn neu(registry: Arc<EndpointRegistry>, schluessel: Arc<KeyStore>) -> Self {
        Self { registry, schluessel }
    }

    /// Schickt das eigene Zertifikat an alle Endpunkte von `abonent` und
    /// leitet aus jeder brauchbaren Antwort den Shared Key ab.
    pub async fn schluessel_austauschen(
        &self,
        abonent: &str,
        eigener_name: &str,
        abbruch: &CancellationToken,
    ) -> ChatResult<SecretBytes> {
        let clients = self.registry.clients_fuer(abonent)?;
        let zertifikat = Certificate {
            username: eigener_name.to_string(),
            public_key: self.schluessel.public_key_base64(),
        };

        let mut letzter: Option<SecretBytes> = None;
        for client in &clients {
            if abbruch.is_cancelled() {
                info!(abonent = %abonent, "Schluesselaustausch abgebrochen");
                break;
            }

            let antwort = match client.zertifikat_senden(&zertifikat).await {
                Ok(a) => a,
                Err(e) => {
                    warn!(
                        abonent = %abonent,
                        domain = %client.domain(),
                        fehler = %e,
                        "Zertifikat nicht zugestellt"
                    );
                    continue;
                }
            };

            if antwort.username != abonent {
                warn!(
                    abonent = %abonent,
                    domain = %client.domain(),
                    gemeldet = %antwort.username,
                    "Zertifikat gehoert zu einem anderen Benutzer, ignoriert"
                );
                continue;
            }

            match self
                .schluessel
                .schluessel_ableiten_und_speichern(&antwort.username, &antwort.public_key)
                .await
            {
                Ok(s) => {
                    debug!(abonent = %abonent, domain = %client.domain(), "Shared Key abgeleitet");
                    letzter = Some(s);
                }
                Err(e) => {
                    warn!(
                        abonent = %abonent,
                        domain = %client.domain(),
                        fehler = %e,
                        "Unbrauchbares Zertifikat"
                    );
                }
            }
        }

        letzter.ok_or_else(|| ChatError::SchluesselAustausch(abonent.to_string()))
    }

    /// Stellt den Umschlag an alle Endpunkte des Empfaengers zu
    pub async fn zustellen(
        &self,
        umschlag: &Umschlag,
        abbruch: &CancellationToken,
    ) -> ChatResult<Zustellergebnis> {
        let abonent = umschlag.chat();
        let clients = self.registry.clients_fuer(abonent)?;

        if clients.is_empty() {
            warn!(abonent = %abonent, "Keine Endpunkte registriert");
            return Ok(Zustellergebnis::Fehlgeschlagen);
        }

        let mut zugestellt = false;
        for client in &clients {
            if abbruch.is_cancelled() {
                info!(abonent = %abonent, "Zustellung abgebrochen");
                break;
            }

            match umschlag.senden(client.as_ref()).await {
                Ok(body) if ist_erfolg(&body) => {
                    debug!(abonent = %abonent, domain = %client.domain(), "Zugestellt");
                    zugestellt = true;
                }
                Ok(body) => {
                    warn!(
                        abonent = %abonent,
                        domain = %client.domain(),
                        antwort = %body,
                        "Unerwartete Antwort"
                    );
                }
                Err(e) => {
                    warn!(
                        abonent = %abonent,
                        domain = %client.domain(),
                        fehler = %e,
                        "Zustellung an Endpunkt fehlgeschlagen"
                    );
                }
            }
        }

        Ok(if zugestellt {
            Zustellergebnis::Zugestellt
        } else {
            Zustellergebnis::Fehlgeschlagen
        })
    }
}

impl std::fmt::Debug for Zustellkoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zustellkoordinator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erfolgs_marker_erkennung() {
        assert!(ist_erfolg("OK"));
        assert!(ist_erfolg("OK\n"));
        assert!(ist_erfolg("\"OK\""));
        assert!(!ist_erfolg("ok"));
        assert!(!ist_erfolg(""));
        assert!(!ist_erfolg("{\"status\":\"Internal error\"}"));
    }
}
