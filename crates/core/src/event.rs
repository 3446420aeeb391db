//! Ereignis-Bus fuer neue Nachrichten
//!
//! Ersetzt Listener-Listen durch einen tokio-Broadcast-Kanal. Ereignisse
//! werden erst gesendet, nachdem eine Nachricht erfolgreich gespeichert
//! (eingehend) bzw. zugestellt (ausgehend) wurde.

use tokio::sync::broadcast;

/// Standard-Kapazitaet des Broadcast-Kanals
const STANDARD_KAPAZITAET: usize = 256;

/// Eine neue Nachricht im Chat mit `abonent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NachrichtenEreignis {
    /// Name des Chat-Partners
    pub abonent: String,
    /// true = selbst gesendet, false = vom Peer empfangen
    pub eigene_nachricht: bool,
}

/// Verteilt `NachrichtenEreignis`se an alle Abonnenten
#[derive(Debug, Clone)]
pub struct EreignisBus {
    sender: broadcast::Sender<NachrichtenEreignis>,
}

impl EreignisBus {
    pub fn neu() -> Self {
        Self::mit_kapazitaet(STANDARD_KAPAZITAET)
    }

    pub fn mit_kapazitaet(kapazitaet: usize) -> Self {
        let (sender, _) = broadcast::channel(kapazitaet);
        Self { sender }
    }

    /// Sendet ein Ereignis; ohne Abonnenten wird es verworfen
    pub fn senden(&self, ereignis: NachrichtenEreignis) {
        if self.sender.send(ereignis).is_err() {
            tracing::trace!("Keine Abonnenten fuer Nachrichten-Ereignis");
        }
    }

    /// Abonniert alle zukuenftigen Ereignisse
    pub fn abonnieren(&self) -> broadcast::Receiver<NachrichtenEreignis> {
        self.sender.subscribe()
    }
}

impl Default for EreignisBus {
    fn default() -> Self {
        Self::neu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn abonnent_erhaelt_ereignis() {
        let bus = EreignisBus::neu();
        let mut rx = bus.abonnieren();

        bus.senden(NachrichtenEreignis {
            abonent: "bob".into(),
            eigene_nachricht: false,
        });

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.abonent, "bob");
        assert!(!ev.eigene_nachricht);
    }

    #[test]
    fn senden_ohne_abonnenten_ist_kein_fehler() {
        let bus = EreignisBus::neu();
        bus.senden(NachrichtenEreignis {
            abonent: "bob".into(),
            eigene_nachricht: true,
        });
    }
}
