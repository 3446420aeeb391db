//! Schnittstelle zwischen Router und Nachrichtenverwaltung

use async_trait::async_trait;
use fernchat_chat::ChatService;
use fernchat_core::{Certificate, FileRequest, MessageRequest};

use crate::error::InboundResult;

/// Verarbeitet eingehende Peer-Anfragen
#[async_trait]
pub trait PeerEmpfaenger: Send + Sync {
    /// Speichert eine Textnachricht unveraendert (verschluesselt)
    async fn nachricht_empfangen(&self, anfrage: MessageRequest) -> InboundResult<()>;

    /// Speichert eine Datei unveraendert (verschluesselt)
    async fn datei_empfangen(&self, anfrage: FileRequest) -> InboundResult<()>;

    /// Leitet den Shared Key ab und liefert das eigene Zertifikat
    async fn zertifikat_austauschen(&self, zertifikat: Certificate) -> InboundResult<Certificate>;
}

#[async_trait]
impl PeerEmpfaenger for ChatService {
    async fn nachricht_empfangen(&self, anfrage: MessageRequest) -> InboundResult<()> {
        ChatService::nachricht_empfangen(self, &anfrage).await?;
        Ok(())
    }

    async fn datei_empfangen(&self, anfrage: FileRequest) -> InboundResult<()> {
        ChatService::datei_empfangen(self, &anfrage).await?;
        Ok(())
    }

    async fn zertifikat_austauschen(&self, zertifikat: Certificate) -> InboundResult<Certificate> {
        Ok(ChatService::zertifikat_austauschen(self, &zertifikat).await?)
    }
}
