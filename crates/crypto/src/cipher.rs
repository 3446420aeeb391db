//! AES-256-CBC mit PKCS#7-Padding
//!
//! Text wird direkt verschluesselt. Dateien werden vor der Verschluesselung
//! Base64-kodiert und das Chiffrat danach erneut Base64-kodiert; diese
//! doppelte Kodierung ist Teil des Wire-Formats und muss erhalten bleiben.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine as _;
use rand_core::{OsRng, RngCore};

use crate::error::{CryptoError, CryptoResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const SCHLUESSEL_LAENGE: usize = 32;
pub const IV_LAENGE: usize = 16;
const BLOCK_GROESSE: usize = 16;

/// Erzeugt einen frischen IV aus dem OS-CSPRNG
pub fn iv_erzeugen() -> [u8; IV_LAENGE] {
    let mut iv = [0u8; IV_LAENGE];
    OsRng.fill_bytes(&mut iv);
    iv
}

fn laengen_pruefen(schluessel: &[u8], iv: &[u8]) -> CryptoResult<()> {
    if schluessel.len() != SCHLUESSEL_LAENGE {
        return Err(CryptoError::UngueltigeSchluesselLaenge {
            erwartet: SCHLUESSEL_LAENGE,
            erhalten: schluessel.len(),
        });
    }
    if iv.len() != IV_LAENGE {
        return Err(CryptoError::UngueltigeIvLaenge {
            erwartet: IV_LAENGE,
            erhalten: iv.len(),
        });
    }
    Ok(())
}

/// Verschluesselt beliebige Bytes (AES-256-CBC, PKCS#7)
pub fn verschluesseln(klartext: &[u8], schluessel: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>> {
    laengen_pruefen(schluessel, iv)?;
    let encryptor = Aes256CbcEnc::new_from_slices(schluessel, iv)
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    let len = klartext.len();
    // Platz fuer bis zu einen vollen Padding-Block
    let mut buffer = vec![0u8; len + BLOCK_GROESSE];
    buffer[..len].copy_from_slice(klartext);

    let chiffrat = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, len)
        .map_err(|_| CryptoError::Verschluesselung("Padding fehlgeschlagen".into()))?;
    Ok(chiffrat.to_vec())
}

/// Entschluesselt und entfernt das Padding
pub fn entschluesseln(chiffrat: &[u8], schluessel: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>> {
    laengen_pruefen(schluessel, iv)?;
    if chiffrat.is_empty() || chiffrat.len() % BLOCK_GROESSE != 0 {
        return Err(CryptoError::Entschluesselung(format!(
            "Chiffrat-Laenge {} ist kein Vielfaches von {BLOCK_GROESSE}",
            chiffrat.len()
        )));
    }

    let decryptor = Aes256CbcDec::new_from_slices(schluessel, iv)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?;

    let mut buffer = chiffrat.to_vec();
    let klartext = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| CryptoError::Entschluesselung("Padding ungueltig".into()))?;
    Ok(klartext.to_vec())
}

/// Verschluesselt Text; Rueckgabe ist das Chiffrat als Base64 (Wire-Format)
pub fn text_verschluesseln_base64(
    text: &str,
    schluessel: &[u8],
    iv: &[u8],
) -> CryptoResult<String> {
    let chiffrat = verschluesseln(text.as_bytes(), schluessel, iv)?;
    Ok(base64_kodieren(&chiffrat))
}

/// Entschluesselt ein Base64-Chiffrat mit Base64-IV zu Text
pub fn text_entschluesseln_base64(
    chiffrat_b64: &str,
    schluessel: &[u8],
    iv_b64: &str,
) -> CryptoResult<String> {
    let chiffrat = base64_dekodieren(chiffrat_b64)?;
    let iv = base64_dekodieren(iv_b64)?;
    let klartext = entschluesseln(&chiffrat, schluessel, &iv)?;
    String::from_utf8(klartext)
        .map_err(|e| CryptoError::UngueltigeDaten(format!("Klartext ist kein UTF-8: {e}")))
}

/// Datei-Verschluesselung: base64(encrypt(base64(bytes)))
pub fn datei_verschluesseln(daten: &[u8], schluessel: &[u8], iv: &[u8]) -> CryptoResult<String> {
    let innen = base64_kodieren(daten);
    let chiffrat = verschluesseln(innen.as_bytes(), schluessel, iv)?;
    Ok(base64_kodieren(&chiffrat))
}

/// Umkehrung von [`datei_verschluesseln`]
pub fn datei_entschluesseln(
    file_data_b64: &str,
    schluessel: &[u8],
    iv_b64: &str,
) -> CryptoResult<Vec<u8>> {
    let chiffrat = base64_dekodieren(file_data_b64)?;
    let iv = base64_dekodieren(iv_b64)?;
    let innen = entschluesseln(&chiffrat, schluessel, &iv)?;
    Ok(base64::engine::general_purpose::STANDARD.decode(innen)?)
}

/// Standard-Base64 mit Padding, ohne Zeilenumbrueche
pub fn base64_kodieren(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn base64_dekodieren(b64: &str) -> CryptoResult<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(b64)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn roundtrip_text() {
        let iv = iv_erzeugen();
        let chiffrat = verschluesseln(b"Hallo Bob", &KEY, &iv).unwrap();
        assert_eq!(chiffrat.len() % 16, 0);
        assert_eq!(entschluesseln(&chiffrat, &KEY, &iv).unwrap(), b"Hallo Bob");
    }

    #[test]
    fn volle_bloecke_bekommen_extra_padding() {
        let iv = iv_erzeugen();
        let chiffrat = verschluesseln(&[1u8; 32], &KEY, &iv).unwrap();
        assert_eq!(chiffrat.len(), 48);
        assert_eq!(entschluesseln(&chiffrat, &KEY, &iv).unwrap(), vec![1u8; 32]);
    }

    #[test]
    fn deterministisch_bei_gleichem_iv() {
        let iv = [3u8; 16];
        let a = verschluesseln(b"gleich", &KEY, &iv).unwrap();
        let b = verschluesseln(b"gleich", &KEY, &iv).unwrap();
        assert_eq!(a, b);
        assert_ne!(iv_erzeugen(), iv_erzeugen());
    }

    #[test]
    fn falsche_schluessel_laenge() {
        let err = verschluesseln(b"x", &[0u8; 16], &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::UngueltigeSchluesselLaenge { erwartet: 32, erhalten: 16 }
        ));
    }

    #[test]
    fn falsche_iv_laenge() {
        let err = entschluesseln(&[0u8; 16], &KEY, &[0u8; 12]).unwrap_err();
        assert!(matches!(err, CryptoError::UngueltigeIvLaenge { erwartet: 16, erhalten: 12 }));
    }

    #[test]
    fn abgeschnittenes_chiffrat_abgelehnt() {
        let iv = iv_erzeugen();
        let chiffrat = verschluesseln(b"etwas laengerer Text", &KEY, &iv).unwrap();
        let err = entschluesseln(&chiffrat[..chiffrat.len() - 1], &KEY, &iv).unwrap_err();
        assert!(matches!(err, CryptoError::Entschluesselung(_)));
    }

    #[test]
    fn text_base64_wrapper() {
        let iv = iv_erzeugen();
        let chiffrat = text_verschluesseln_base64("Grüße", &KEY, &iv).unwrap();
        let text = text_entschluesseln_base64(&chiffrat, &KEY, &base64_kodieren(&iv)).unwrap();
        assert_eq!(text, "Grüße");
    }

    #[test]
    fn datei_doppelt_base64() {
        let iv = iv_erzeugen();
        let daten = vec![0u8, 159, 146, 150, 255];
        let file_data = datei_verschluesseln(&daten, &KEY, &iv).unwrap();

        // Die innere Schicht ist selbst Base64
        let innen = entschluesseln(&base64_dekodieren(&file_data).unwrap(), &KEY, &iv).unwrap();
        assert_eq!(innen, base64_kodieren(&daten).as_bytes());

        let zurueck = datei_entschluesseln(&file_data, &KEY, &base64_kodieren(&iv)).unwrap();
        assert_eq!(zurueck, daten);
    }

    #[test]
    fn ungueltiges_utf8_nach_entschluesselung() {
        let iv = iv_erzeugen();
        let chiffrat = verschluesseln(&[0xFF, 0xFE], &KEY, &iv).unwrap();
        let err =
            text_entschluesseln_base64(&base64_kodieren(&chiffrat), &KEY, &base64_kodieren(&iv))
                .unwrap_err();
        assert!(matches!(err, CryptoError::UngueltigeDaten(_)));
    }
}
