//! Persistenter Schluesselspeicher
//!
//! Haelt die Langzeit-Identitaet im Speicher und legt die per ECDH
//! abgeleiteten Shared Keys pro Abonent in der Datenbank ab. Ein neuer
//! Austausch ueberschreibt den vorherigen Schluessel des Abonenten.

use std::sync::Arc;

use fernchat_db::{
    models::NeuerAbonentSchluessel, AbonentKeyRepository, IdentityRepository, SqliteDb,
};
use tracing::{debug, error, info};

use crate::cipher::{base64_dekodieren, base64_kodieren, SCHLUESSEL_LAENGE};
use crate::error::{CryptoError, CryptoResult};
use crate::identity::Identity;
use crate::types::SecretBytes;

/// Identitaet und Shared Keys einer Installation
pub struct KeyStore {
    db: Arc<SqliteDb>,
    identity: Identity,
}

impl KeyStore {
    /// Laedt oder erzeugt die Identitaet und baut den Speicher auf
    pub async fn initialisieren(db: Arc<SqliteDb>) -> CryptoResult<Arc<Self>> {
        let identity = identitaet_sicherstellen(&db).await?;
        Ok(Arc::new(Self { db, identity }))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Eigener oeffentlicher Schluessel, Base64 (44 Zeichen)
    pub fn public_key_base64(&self) -> String {
        self.identity.public_key_base64()
    }

    /// Leitet den Shared Key fuer einen Abonenten ab und speichert ihn.
    ///
    /// Ein ungueltiger Peer-Schluessel ist ein Fehler. Scheitert nur das
    /// Speichern, wird das protokolliert und der Schluessel trotzdem
    /// zurueckgegeben.
    pub async fn schluessel_ableiten_und_speichern(
        &self,
        abonent_name: &str,
        abonent_public_key_b64: &str,
    ) -> CryptoResult<SecretBytes> {
        let shared = self.identity.diffie_hellman_base64(abonent_public_key_b64)?;
        let shared_b64 = base64_kodieren(shared.as_bytes());

        let ergebnis = self
            .db
            .schluessel_speichern(NeuerAbonentSchluessel {
                abonent_name,
                abonent_public_key: abonent_public_key_b64,
                shared_key: &shared_b64,
            })
            .await;

        match ergebnis {
            Ok(_) => debug!(abonent = %abonent_name, "Shared Key gespeichert"),
            Err(e) => error!(
                abonent = %abonent_name,
                fehler = %e,
                "Shared Key konnte nicht gespeichert werden"
            ),
        }

        Ok(shared)
    }

    /// Gespeicherter Shared Key; `None` wenn noch kein Austausch stattfand
    pub async fn shared_key_fuer(&self, abonent_name: &str) -> CryptoResult<Option<SecretBytes>> {
        let Some(record) = self.db.schluessel_laden(abonent_name).await? else {
            return Ok(None);
        };

        let bytes = base64_dekodieren(&record.shared_key)?;
        if bytes.len() != SCHLUESSEL_LAENGE {
            return Err(CryptoError::UngueltigeSchluesselLaenge {
                erwartet: SCHLUESSEL_LAENGE,
                erhalten: bytes.len(),
            });
        }
        Ok(Some(SecretBytes::new(bytes)))
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Laedt die gespeicherte Identitaet oder erzeugt beim ersten Start eine neue.
///
/// Eine unlesbare Identitaet ist ein Fehler und wird nie ersetzt.
pub async fn identitaet_sicherstellen(db: &SqliteDb) -> CryptoResult<Identity> {
    if let Some(record) = db.identitaet_laden().await? {
        return Identity::aus_base64(&record.private_key, &record.public_key);
    }

    let identity = Identity::generate();
    match db
        .identitaet_speichern(&identity.private_key_base64(), &identity.public_key_base64())
        .await
    {
        Ok(_) => {
            info!(public_key = %identity.public_key_base64(), "Neue Identitaet erzeugt");
            Ok(identity)
        }
        // Paralleler Erststart: die zuerst gespeicherte Identitaet gilt
        Err(e) if e.ist_eindeutigkeit() => {
            let record = db.identitaet_laden().await?.ok_or_else(|| {
                CryptoError::IdentitaetBeschaedigt("Identitaet nach Konflikt nicht lesbar".into())
            })?;
            Identity::aus_base64(&record.private_key, &record.public_key)
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Arc<KeyStore> {
        let db = Arc::new(SqliteDb::in_memory().await.unwrap());
        KeyStore::initialisieren(db).await.unwrap()
    }

    #[tokio::test]
    async fn identitaet_bleibt_stabil() {
        let db = Arc::new(SqliteDb::in_memory().await.unwrap());
        let erste = KeyStore::initialisieren(Arc::clone(&db)).await.unwrap();
        let zweite = KeyStore::initialisieren(db).await.unwrap();
        assert_eq!(erste.public_key_base64(), zweite.public_key_base64());
        assert_eq!(erste.public_key_base64().len(), 44);
    }

    #[tokio::test]
    async fn beschaedigte_identitaet_wird_nicht_ersetzt() {
        let db = SqliteDb::in_memory().await.unwrap();
        db.identitaet_speichern("kaputt", "auch kaputt").await.unwrap();

        let err = identitaet_sicherstellen(&db).await.unwrap_err();
        assert!(matches!(err, CryptoError::IdentitaetBeschaedigt(_)));
    }

    #[tokio::test]
    async fn shared_key_ableiten_und_laden() {
        let alice = store().await;
        let bob = Identity::generate();

        assert!(alice.shared_key_fuer("bob").await.unwrap().is_none());

        let abgeleitet = alice
            .schluessel_ableiten_und_speichern("bob", &bob.public_key_base64())
            .await
            .unwrap();
        let geladen = alice.shared_key_fuer("bob").await.unwrap().unwrap();
        assert_eq!(abgeleitet, geladen);

        let erwartet = bob
            .diffie_hellman(&alice.identity().public_key_bytes())
            .unwrap();
        assert_eq!(geladen, erwartet);
    }

    #[tokio::test]
    async fn erneuter_austausch_ueberschreibt() {
        let alice = store().await;
        let bob_alt = Identity::generate();
        let bob_neu = Identity::generate();

        alice
            .schluessel_ableiten_und_speichern("bob", &bob_alt.public_key_base64())
            .await
            .unwrap();
        let neu = alice
            .schluessel_ableiten_und_speichern("bob", &bob_neu.public_key_base64())
            .await
            .unwrap();

        assert_eq!(alice.shared_key_fuer("bob").await.unwrap().unwrap(), neu);
    }

    #[tokio::test]
    async fn speicherfehler_liefert_schluessel_trotzdem() {
        let db = Arc::new(SqliteDb::in_memory().await.unwrap());
        let alice = KeyStore::initialisieren(Arc::clone(&db)).await.unwrap();
        sqlx::query("DROP TABLE abonent_keys")
            .execute(db.pool())
            .await
            .unwrap();

        let bob = Identity::generate();
        let abgeleitet = alice
            .schluessel_ableiten_und_speichern("bob", &bob.public_key_base64())
            .await
            .expect("Speicherfehler darf nicht durchschlagen");

        let erwartet = bob
            .diffie_hellman(&alice.identity().public_key_bytes())
            .unwrap();
        assert_eq!(abgeleitet, erwartet);
    }

    #[tokio::test]
    async fn ungueltiger_peer_schluessel_ist_fehler() {
        let alice = store().await;
        let err = alice
            .schluessel_ableiten_und_speichern("bob", "nicht base64")
            .await
            .unwrap_err();
        assert!(matches!(err, CryptoError::KeyExchange(_)));
        assert!(alice.shared_key_fuer("bob").await.unwrap().is_none());
    }
}
