//! ChatService – Senden, Empfangen, Verlauf und Verzeichnis-Abgleich
//!
//! Nachrichten werden verschluesselt gespeichert und erst beim Lesen des
//! Verlaufs entschluesselt. Gesendete Nachrichten werden vor der Zustellung
//! gespeichert und bei fehlgeschlagener Zustellung wieder geloescht.

use std::sync::Arc;

use dashmap::DashMap;
use fernchat_core::{
    AuthCredentialsRequest, Certificate, EreignisBus, FileRequest, MessageRequest,
    NachrichtenEreignis, NachrichtenTyp,
};
use fernchat_crypto::{cipher, KeyStore, SecretBytes};
use fernchat_db::{
    models::{BenutzerRecord, NachrichtRecord, NeueNachricht, NeuerBenutzer},
    MessageRepository, SqliteDb, UserRepository,
};
use fernchat_network::EndpointRegistry;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coordinator::{Umschlag, Zustellergebnis, Zustellkoordinator};
use crate::error::{ChatError, ChatResult};
use crate::session::Sitzung;

/// Eine Nachricht im Verlauf mit ihrem Anzeigetext
#[derive(Debug, Clone)]
pub struct VerlaufEintrag {
    pub nachricht: NachrichtRecord,
    /// Klartext bei Text, Dateiname bei Datei; `None` wenn nicht entschluesselbar
    pub anzeige: Option<String>,
}

pub struct ChatService {
    db: Arc<SqliteDb>,
    schluessel: Arc<KeyStore>,
    registry: Arc<EndpointRegistry>,
    koordinator: Zustellkoordinator,
    sitzung: Arc<Sitzung>,
    ereignisse: EreignisBus,
    /// Ein Schluesselaustausch pro Abonent gleichzeitig
    austausch_sperren: DashMap<String, Arc<Mutex<()>>>,
}

impl ChatService {
    pub fn neu(
        db: Arc<SqliteDb>,
        schluessel: Arc<KeyStore>,
        registry: Arc<EndpointRegistry>,
        sitzung: Arc<Sitzung>,
        ereignisse: EreignisBus,
    ) -> Arc<Self> {
        let koordinator = Zustellkoordinator::neu(Arc::clone(&registry), Arc::clone(&schluessel));
        Arc::new(Self {
            db,
            schluessel,
            registry,
            koordinator,
            sitzung,
            ereignisse,
            austausch_sperren: DashMap::new(),
        })
    }

    pub fn ereignisse(&self) -> &EreignisBus {
        &self.ereignisse
    }

    pub fn sitzung(&self) -> &Sitzung {
        &self.sitzung
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Eigenes Zertifikat (angemeldeter Benutzer + eigener Public Key)
    pub fn eigenes_zertifikat(&self) -> ChatResult<Certificate> {
        Ok(Certificate {
            username: self.sitzung.benutzername_erforderlich()?,
            public_key: self.schluessel.public_key_base64(),
        })
    }

    // -----------------------------------------------------------------------
    // Schluessel
    // -----------------------------------------------------------------------

    /// Liefert den Shared Key fuer `abonent`, tauscht bei Bedarf Zertifikate aus
    pub async fn schluessel_sicherstellen(
        &self,
        abonent: &str,
        abbruch: &CancellationToken,
    ) -> ChatResult<SecretBytes> {
        let sperre = Arc::clone(
            self.austausch_sperren
                .entry(abonent.to_string())
                .or_default()
                .value(),
        );
        let _guard = sperre.lock().await;

        if let Some(s) = self.schluessel.shared_key_fuer(abonent).await? {
            return Ok(s);
        }
        self.schluessel_austauschen(abonent, abbruch).await
    }

    /// Erzwingt einen neuen Zertifikatsaustausch (ueberschreibt den Schluessel)
    pub async fn schluessel_austauschen(
        &self,
        abonent: &str,
        abbruch: &CancellationToken,
    ) -> ChatResult<SecretBytes> {
        let eigener_name = self.sitzung.benutzername_erforderlich()?;
        info!(abonent = %abonent, "Starte Schluesselaustausch");
        self.koordinator
            .schluessel_austauschen(abonent, &eigener_name, abbruch)
            .await
    }

    /// Eingehendes Zertifikat: Schluessel ableiten, eigenes Zertifikat zurueck
    pub async fn zertifikat_austauschen(&self, peer: &Certificate) -> ChatResult<Certificate> {
        let eigenes = self.eigenes_zertifikat()?;
        self.schluessel
            .schluessel_ableiten_und_speichern(&peer.username, &peer.public_key)
            .await?;
        info!(abonent = %peer.username, "Zertifikat eines Peers angenommen");
        Ok(eigenes)
    }

    // -----------------------------------------------------------------------
    // Senden
    // -----------------------------------------------------------------------

    pub async fn text_senden(
        &self,
        abonent: &str,
        text: &str,
        abbruch: &CancellationToken,
    ) -> ChatResult<NachrichtRecord> {
        if text.is_empty() {
            return Err(ChatError::UngueltigeEingabe(
                "Nachrichteninhalt darf nicht leer sein".into(),
            ));
        }

        let ich = self.lokaler_benutzer().await?;
        let partner = self.benutzer_erforderlich(abonent).await?;
        let schluessel = self.schluessel_sicherstellen(abonent, abbruch).await?;

        let iv = cipher::iv_erzeugen();
        let iv_b64 = cipher::base64_kodieren(&iv);
        let chiffrat = cipher::text_verschluesseln_base64(text, schluessel.as_bytes(), &iv)?;

        let record = self
            .db
            .nachricht_erstellen(NeueNachricht {
                sender_id: ich.id,
                sender_name: &ich.username,
                chat_id: partner.id,
                chat_name: &partner.username,
                owner_id: ich.id,
                owner_name: &ich.username,
                message_type: NachrichtenTyp::Text,
                message: Some(&chiffrat),
                file_data: None,
                file_name: None,
                iv: &iv_b64,
                unread: false,
            })
            .await?;

        let umschlag = Umschlag::Text(MessageRequest {
            username: ich.username.clone(),
            message: chiffrat,
            iv: iv_b64,
            chat: partner.username.clone(),
        });
        self.zustellen_oder_verwerfen(record, &umschlag, abbruch).await
    }

    pub async fn datei_senden(
        &self,
        abonent: &str,
        dateiname: &str,
        daten: &[u8],
        abbruch: &CancellationToken,
    ) -> ChatResult<NachrichtRecord> {
        if dateiname.trim().is_empty() {
            return Err(ChatError::UngueltigeEingabe("Dateiname darf nicht leer sein".into()));
        }

        let ich = self.lokaler_benutzer().await?;
        let partner = self.benutzer_erforderlich(abonent).await?;
        let schluessel = self.schluessel_sicherstellen(abonent, abbruch).await?;

        let iv = cipher::iv_erzeugen();
        let iv_b64 = cipher::base64_kodieren(&iv);
        let file_data = cipher::datei_verschluesseln(daten, schluessel.as_bytes(), &iv)?;

        let record = self
            .db
            .nachricht_erstellen(NeueNachricht {
                sender_id: ich.id,
                sender_name: &ich.username,
                chat_id: partner.id,
                chat_name: &partner.username,
                owner_id: ich.id,
                owner_name: &ich.username,
                message_type: NachrichtenTyp::File,
                message: None,
                file_data: Some(&file_data),
                file_name: Some(dateiname),
                iv: &iv_b64,
                unread: false,
            })
            .await?;

        let umschlag = Umschlag::Datei(FileRequest {
            username: ich.username.clone(),
            file_data,
            file_name: dateiname.to_string(),
            iv: iv_b64,
            chat: partner.username.clone(),
        });
        self.zustellen_oder_verwerfen(record, &umschlag, abbruch).await
    }

    async fn zustellen_oder_verwerfen(
        &self,
        record: NachrichtRecord,
        umschlag: &Umschlag,
        abbruch: &CancellationToken,
    ) -> ChatResult<NachrichtRecord> {
        let ergebnis = self.koordinator.zustellen(umschlag, abbruch).await;

        match ergebnis {
            Ok(Zustellergebnis::Zugestellt) => {
                self.ereignisse.senden(NachrichtenEreignis {
                    abonent: record.chat_name.clone(),
                    eigene_nachricht: true,
                });
                Ok(record)
            }
            Ok(Zustellergebnis::Fehlgeschlagen) => {
                self.db.nachricht_loeschen(record.id).await?;
                warn!(abonent = %record.chat_name, "Nicht zustellbare Nachricht verworfen");
                Err(ChatError::ZustellungFehlgeschlagen(record.chat_name))
            }
            Err(e) => {
                self.db.nachricht_loeschen(record.id).await?;
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Empfangen
    // -----------------------------------------------------------------------

    /// Speichert eine eingehende Textnachricht (verschluesselt, ungelesen)
    pub async fn nachricht_empfangen(
        &self,
        anfrage: &MessageRequest,
    ) -> ChatResult<NachrichtRecord> {
        self.eingang_speichern(
            &anfrage.username,
            NachrichtenTyp::Text,
            Some(&anfrage.message),
            None,
            None,
            &anfrage.iv,
        )
        .await
    }

    /// Speichert eine eingehende Datei (verschluesselt, ungelesen)
    pub async fn datei_empfangen(&self, anfrage: &FileRequest) -> ChatResult<NachrichtRecord> {
        self.eingang_speichern(
            &anfrage.username,
            NachrichtenTyp::File,
            None,
            Some(&anfrage.file_data),
            Some(&anfrage.file_name),
            &anfrage.iv,
        )
        .await
    }

    async fn eingang_speichern(
        &self,
        absender: &str,
        typ: NachrichtenTyp,
        message: Option<&str>,
        file_data: Option<&str>,
        file_name: Option<&str>,
        iv: &str,
    ) -> ChatResult<NachrichtRecord> {
        let ich = self.lokaler_benutzer().await?;
        let peer = self.benutzer_erforderlich(absender).await?;

        let record = self
            .db
            .nachricht_erstellen(NeueNachricht {
                sender_id: peer.id,
                sender_name: &peer.username,
                chat_id: peer.id,
                chat_name: &peer.username,
                owner_id: ich.id,
                owner_name: &ich.username,
                message_type: typ,
                message,
                file_data,
                file_name,
                iv,
                unread: true,
            })
            .await?;

        self.db.neue_nachricht_setzen(&peer.username, true).await?;
        debug!(abonent = %peer.username, typ = typ.als_str(), "Nachricht empfangen");

        self.ereignisse.senden(NachrichtenEreignis {
            abonent: peer.username,
            eigene_nachricht: false,
        });
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Verlauf und Dateien
    // -----------------------------------------------------------------------

    /// Verlauf eines Chats, aelteste zuerst, beim Lesen entschluesselt
    pub async fn chat_verlauf(&self, chat: &str) -> ChatResult<Vec<VerlaufEintrag>> {
        let ich = self.lokaler_benutzer().await?;
        let nachrichten = self.db.chat_verlauf(chat, ich.id).await?;
        let schluessel = self.schluessel.shared_key_fuer(chat).await?;

        nachrichten
            .into_iter()
            .map(|nachricht| {
                let anzeige = anzeige_text(&nachricht, schluessel.as_ref())?;
                Ok(VerlaufEintrag { nachricht, anzeige })
            })
            .collect()
    }

    /// Markiert den Chat als gelesen; Rueckgabe: Anzahl markierter Nachrichten
    pub async fn chat_gelesen(&self, chat: &str) -> ChatResult<u64> {
        let ich = self.lokaler_benutzer().await?;
        let anzahl = self.db.chat_gelesen(chat, ich.id).await?;
        self.db.neue_nachricht_setzen(chat, false).await?;
        Ok(anzahl)
    }

    /// Entschluesselt eine gespeicherte Datei; Rueckgabe: (Dateiname, Inhalt)
    pub async fn datei_herunterladen(&self, nachricht_id: Uuid) -> ChatResult<(String, Vec<u8>)> {
        let ich = self.lokaler_benutzer().await?;
        let nachricht = self
            .db
            .nachricht_laden(nachricht_id)
            .await?
            .filter(|n| n.owner_id == ich.id && n.message_type == NachrichtenTyp::File)
            .ok_or_else(|| ChatError::NachrichtNichtGefunden(nachricht_id.to_string()))?;

        let (Some(file_data), Some(file_name)) = (&nachricht.file_data, &nachricht.file_name) else {
            return Err(ChatError::NachrichtNichtGefunden(nachricht_id.to_string()));
        };

        let schluessel = self
            .schluessel
            .shared_key_fuer(&nachricht.chat_name)
            .await?
            .ok_or_else(|| ChatError::SchluesselAustausch(nachricht.chat_name.clone()))?;

        let daten = cipher::datei_entschluesseln(file_data, schluessel.as_bytes(), &nachricht.iv)?;
        Ok((file_name.clone(), daten))
    }

    /// Alle Datei-Nachrichten des lokalen Benutzers
    pub async fn dateien(&self) -> ChatResult<Vec<NachrichtRecord>> {
        let ich = self.lokaler_benutzer().await?;
        Ok(self.db.dateien(ich.id).await?)
    }

    /// Alle bekannten Chat-Partner (ohne den lokalen Benutzer)
    pub async fn chats(&self) -> ChatResult<Vec<BenutzerRecord>> {
        let ich = self.sitzung.benutzername_erforderlich()?;
        let mut benutzer = self.db.alle_benutzer().await?;
        benutzer.retain(|b| b.username != ich);
        Ok(benutzer)
    }

    // -----------------------------------------------------------------------
    // Verzeichnisdienst
    // -----------------------------------------------------------------------

    /// Login am Verzeichnisdienst, danach Abgleich der Benutzerliste
    pub async fn anmelden(
        &self,
        benutzername: &str,
        passwort: &str,
        domain: &str,
    ) -> ChatResult<()> {
        let anonym = self.registry.verzeichnis_anbinden(domain, None)?;
        let antwort = anonym
            .anmelden(&AuthCredentialsRequest {
                username: benutzername.to_string(),
                password: passwort.to_string(),
            })
            .await?;

        self.registry.verzeichnis_anbinden(domain, Some(antwort.token))?;
        self.sitzung.anmelden(&antwort.username, Some(domain));
        info!(benutzer = %antwort.username, domain = %domain, "Angemeldet");

        self.benutzerliste_aktualisieren().await?;
        Ok(())
    }

    /// Holt die Benutzerliste und baut alle Endpunkte neu auf.
    ///
    /// Schlaegt der Abruf fehl, bleiben Cache und Registry unveraendert.
    pub async fn benutzerliste_aktualisieren(&self) -> ChatResult<usize> {
        let verzeichnis = self.registry.verzeichnis()?;
        let liste = match verzeichnis.benutzer_liste().await {
            Ok(l) => l,
            Err(e) => {
                warn!(fehler = %e, "Benutzerliste nicht abrufbar");
                return Err(e.into());
            }
        };

        let neue: Vec<NeuerBenutzer<'_>> = liste
            .iter()
            .map(|u| NeuerBenutzer {
                username: &u.name,
                domains: &u.domain,
                online: u.online,
            })
            .collect();
        let gespeichert = self.db.benutzer_synchronisieren(&neue).await?;

        for benutzer in &gespeichert {
            self.registry
                .endpunkte_neu_aufbauen(&benutzer.username, &benutzer.domains);
        }

        info!(anzahl = gespeichert.len(), "Benutzerliste aktualisiert");
        Ok(gespeichert.len())
    }

    /// Gleicht einen einzelnen Benutzer mit dem Verzeichnis ab
    pub async fn benutzer_aktualisieren(&self, id: &str) -> ChatResult<BenutzerRecord> {
        let verzeichnis = self.registry.verzeichnis()?;
        let antwort = verzeichnis.benutzer_laden(id).await?;

        let mut gespeichert = self
            .db
            .benutzer_synchronisieren(&[NeuerBenutzer {
                username: &antwort.name,
                domains: &antwort.domain,
                online: antwort.online,
            }])
            .await?;
        let benutzer = gespeichert
            .pop()
            .ok_or_else(|| ChatError::UnbekannterAbonent(antwort.name.clone()))?;

        self.registry
            .endpunkte_neu_aufbauen(&benutzer.username, &benutzer.domains);
        debug!(
            benutzer = %benutzer.username,
            domains = benutzer.domains.len(),
            "Benutzer aktualisiert"
        );
        Ok(benutzer)
    }

    pub fn abmelden(&self) {
        self.sitzung.abmelden();
        self.registry.zuruecksetzen();
        info!("Abgemeldet");
    }

    // -----------------------------------------------------------------------
    // Hilfsfunktionen
    // -----------------------------------------------------------------------

    async fn lokaler_benutzer(&self) -> ChatResult<BenutzerRecord> {
        let name = self.sitzung.benutzername_erforderlich()?;
        self.benutzer_erforderlich(&name).await
    }

    async fn benutzer_erforderlich(&self, name: &str) -> ChatResult<BenutzerRecord> {
        self.db
            .benutzer_nach_name(name)
            .await?
            .ok_or_else(|| ChatError::UnbekannterAbonent(name.to_string()))
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("sitzung", &self.sitzung)
            .finish_non_exhaustive()
    }
}

/// Klartext fuer die Anzeige; ohne Shared Key bleibt ein Text leer.
/// Ein Entschluesselungsfehler bricht den ganzen Verlauf ab.
fn anzeige_text(
    nachricht: &NachrichtRecord,
    schluessel: Option<&SecretBytes>,
) -> ChatResult<Option<String>> {
    match nachricht.message_type {
        NachrichtenTyp::File => Ok(nachricht.file_name.clone()),
        NachrichtenTyp::Text => {
            let (Some(chiffrat), Some(schluessel)) = (nachricht.message.as_deref(), schluessel)
            else {
                return Ok(None);
            };
            let text =
                cipher::text_entschluesseln_base64(chiffrat, schluessel.as_bytes(), &nachricht.iv)
                    .map_err(|e| {
                        warn!(nachricht = %nachricht.id, fehler = %e, "Nicht entschluesselbar");
                        e
                    })?;
            Ok(Some(text))
        }
    }
}
