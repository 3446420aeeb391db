//! Langzeit-Identitaetsschluessel (X25519)
//!
//! Jede Installation besitzt genau ein X25519-Schluessel-Paar. Der
//! oeffentliche Schluessel wird beim Zertifikatsaustausch an Peers
//! geschickt, der private Schluessel verlaesst die Installation nie.
//! Das ECDH-Ergebnis wird ohne weitere Ableitung als AES-256-Schluessel
//! verwendet.

use base64::Engine as _;
use rand_core::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};
use crate::types::SecretBytes;

/// Schluessel-Laenge fuer X25519 (privat, oeffentlich und Shared Secret)
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Langzeit-Identitaet einer Installation (X25519)
pub struct Identity {
    secret: StaticSecret,
    public: PublicKey,
}

impl Identity {
    /// Generiert ein neues Schluessel-Paar aus dem OS-CSPRNG
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Erstellt eine Identity aus einem privaten Schluessel (32 Bytes)
    pub fn from_bytes(bytes: [u8; SCHLUESSEL_LAENGE]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Stellt eine gespeicherte Identitaet wieder her und prueft,
    /// dass der gespeicherte oeffentliche Schluessel zum privaten passt.
    pub fn aus_base64(private_b64: &str, public_b64: &str) -> CryptoResult<Self> {
        let private = dekodieren_32(private_b64)
            .map_err(|e| CryptoError::IdentitaetBeschaedigt(format!("privater Schluessel: {e}")))?;
        let public = dekodieren_32(public_b64).map_err(|e| {
            CryptoError::IdentitaetBeschaedigt(format!("oeffentlicher Schluessel: {e}"))
        })?;

        let identity = Self::from_bytes(private);
        if identity.public_key_bytes() != public {
            return Err(CryptoError::IdentitaetBeschaedigt(
                "oeffentlicher Schluessel passt nicht zum privaten".into(),
            ));
        }
        Ok(identity)
    }

    /// Gibt den privaten Schluessel als Bytes zurueck (fuer Persistenz)
    pub fn private_key_bytes(&self) -> [u8; SCHLUESSEL_LAENGE] {
        self.secret.to_bytes()
    }

    pub fn public_key_bytes(&self) -> [u8; SCHLUESSEL_LAENGE] {
        self.public.to_bytes()
    }

    /// Oeffentlicher Schluessel, Base64 mit Padding (44 Zeichen)
    pub fn public_key_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.public_key_bytes())
    }

    pub fn private_key_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.private_key_bytes())
    }

    /// ECDH mit dem oeffentlichen Schluessel eines Peers.
    ///
    /// Schluessel niedriger Ordnung liefern ein nicht-beitragendes
    /// Ergebnis und werden abgelehnt.
    pub fn diffie_hellman(
        &self,
        peer_public: &[u8; SCHLUESSEL_LAENGE],
    ) -> CryptoResult<SecretBytes> {
        let peer = PublicKey::from(*peer_public);
        let shared = self.secret.diffie_hellman(&peer);
        if !shared.was_contributory() {
            return Err(CryptoError::KeyExchange(
                "oeffentlicher Schluessel des Peers ist unbrauchbar".into(),
            ));
        }
        Ok(SecretBytes::from(shared.to_bytes()))
    }

    /// ECDH mit einem Base64-kodierten Peer-Schluessel (Wire-Format)
    pub fn diffie_hellman_base64(&self, peer_public_b64: &str) -> CryptoResult<SecretBytes> {
        let peer = dekodieren_32(peer_public_b64)
            .map_err(|e| CryptoError::KeyExchange(format!("ungueltiger Peer-Schluessel: {e}")))?;
        self.diffie_hellman(&peer)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity {{ public_key: {} }}", self.public_key_base64())
    }
}

/// Dekodiert Base64 und erzwingt genau 32 Bytes
pub(crate) fn dekodieren_32(b64: &str) -> CryptoResult<[u8; SCHLUESSEL_LAENGE]> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(b64)?;
    let erhalten = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::UngueltigeSchluesselLaenge {
            erwartet: SCHLUESSEL_LAENGE,
            erhalten,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oeffentlicher_schluessel_hat_44_zeichen() {
        let identity = Identity::generate();
        let b64 = identity.public_key_base64();
        assert_eq!(b64.len(), 44);
        assert!(b64.ends_with('='));
    }

    #[test]
    fn ecdh_beide_seiten_gleich() {
        let alice = Identity::generate();
        let bob = Identity::generate();

        let s_alice = alice.diffie_hellman(&bob.public_key_bytes()).unwrap();
        let s_bob = bob.diffie_hellman(&alice.public_key_bytes()).unwrap();

        assert_eq!(s_alice, s_bob);
        assert_eq!(s_alice.len(), 32);
    }

    #[test]
    fn identity_base64_roundtrip() {
        let identity = Identity::generate();
        let restored =
            Identity::aus_base64(&identity.private_key_base64(), &identity.public_key_base64())
                .unwrap();
        assert_eq!(restored.public_key_bytes(), identity.public_key_bytes());
    }

    #[test]
    fn vertauschte_schluessel_werden_erkannt() {
        let identity = Identity::generate();
        let err =
            Identity::aus_base64(&identity.public_key_base64(), &identity.private_key_base64())
                .unwrap_err();
        assert!(matches!(err, CryptoError::IdentitaetBeschaedigt(_)));
    }

    #[test]
    fn kaputtes_base64_ist_beschaedigt() {
        let err = Identity::aus_base64("kein base64!", "auch nicht").unwrap_err();
        assert!(matches!(err, CryptoError::IdentitaetBeschaedigt(_)));
    }

    #[test]
    fn peer_schluessel_falscher_laenge_abgelehnt() {
        let identity = Identity::generate();
        let err = identity.diffie_hellman_base64("AAAA").unwrap_err();
        assert!(matches!(err, CryptoError::KeyExchange(_)));
    }

    #[test]
    fn null_schluessel_ist_unbrauchbar() {
        let identity = Identity::generate();
        assert!(identity.diffie_hellman(&[0u8; 32]).is_err());
    }
}
