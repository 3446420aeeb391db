//! Sitzung des lokalen Benutzers

use parking_lot::RwLock;

use crate::error::{ChatError, ChatResult};

#[derive(Debug, Clone)]
struct Angemeldet {
    benutzername: String,
    verzeichnis_domain: Option<String>,
}

/// Der angemeldete lokale Benutzer; geteilt zwischen Service und Router
#[derive(Debug, Default)]
pub struct Sitzung {
    inhalt: RwLock<Option<Angemeldet>>,
}

impl Sitzung {
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn anmelden(&self, benutzername: &str, verzeichnis_domain: Option<&str>) {
        *self.inhalt.write() = Some(Angemeldet {
            benutzername: benutzername.to_string(),
            verzeichnis_domain: verzeichnis_domain.map(str::to_string),
        });
    }

    pub fn abmelden(&self) {
        *self.inhalt.write() = None;
    }

    pub fn benutzername(&self) -> Option<String> {
        self.inhalt.read().as_ref().map(|a| a.benutzername.clone())
    }

    /// Benutzername oder [`ChatError::NichtAngemeldet`]
    pub fn benutzername_erforderlich(&self) -> ChatResult<String> {
        self.benutzername().ok_or(ChatError::NichtAngemeldet)
    }

    pub fn verzeichnis_domain(&self) -> Option<String> {
        self.inhalt
            .read()
            .as_ref()
            .and_then(|a| a.verzeichnis_domain.clone())
    }
}
